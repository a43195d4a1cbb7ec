pub mod dialogs;
pub mod docks;
pub mod editor;
pub mod sidebar;

use iced::widget::{Space, column, container, mouse_area, row, stack};
use iced::{Background, Color, Element, Length};

use crate::app::{App, Message};

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let palette = self.palette;

        let sidebar: Element<'_, Message> = if self.controller.sidebar_visible() {
            self.view_sidebar()
        } else {
            Space::new(0, 0).into()
        };

        let content = column![
            self.view_menu_bar(),
            row![sidebar, self.view_main_area()].height(Length::Fill),
            self.view_status_bar(),
        ];

        let main_view: Element<'_, Message> = container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_| container::Style {
                background: Some(Background::Color(palette.background)),
                ..Default::default()
            })
            .into();

        let tracked_view: Element<'_, Message> =
            mouse_area(main_view).on_move(Message::MouseMoved).into();

        let window = if self.about_visible {
            modal(tracked_view, self.view_about_modal(), Message::HideAbout)
        } else if self.new_folder.is_some() {
            modal(
                tracked_view,
                self.view_new_folder_modal(),
                Message::CreateFolderCancel,
            )
        } else if self.tree_menu.is_some() {
            popup(tracked_view, self.view_tree_menu(), Message::HideTreeMenu)
        } else if self.active_menu.is_some() {
            popup(tracked_view, self.view_menu_dropdown(), Message::CloseMenu)
        } else {
            tracked_view
        };

        match self.controller.zoom_label() {
            Some(label) => stack![window, self.view_zoom_indicator(label)].into(),
            None => window,
        }
    }
}

/// Dialog over a dimmed window; clicking outside dismisses it.
fn modal<'a>(
    base: Element<'a, Message>,
    dialog: Element<'a, Message>,
    on_dismiss: Message,
) -> Element<'a, Message> {
    stack![
        base,
        mouse_area(
            container(Space::new(Length::Fill, Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(|_| container::Style {
                    background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.5))),
                    ..Default::default()
                })
        )
        .on_press(on_dismiss),
        dialog,
    ]
    .into()
}

/// Dropdown over the live window; a click that nothing else takes closes it.
fn popup<'a>(
    base: Element<'a, Message>,
    menu: Element<'a, Message>,
    on_dismiss: Message,
) -> Element<'a, Message> {
    stack![
        mouse_area(
            container(Space::new(Length::Fill, Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
        )
        .on_press(on_dismiss),
        base,
        menu,
    ]
    .into()
}
