use iced::widget::{Space, button, column, container, row, text, text_input};
use iced::{Background, Border, Color, Element, Length, Padding, Theme};
use textedit_core::status;

use crate::app::update::folder_input_id;
use crate::app::{App, Message};
use crate::theme::Palette;

impl App {
    pub fn view_new_folder_modal(&self) -> Element<'_, Message> {
        let palette = self.palette;
        let name = self.new_folder.as_deref().unwrap_or_default();

        let modal_content = column![
            text("New Folder").size(16).color(palette.text),
            Space::with_height(12),
            text(format!("Create in: {}", self.controller.tree().root().display()))
                .size(12)
                .color(palette.text_muted),
            Space::with_height(8),
            text_input("Folder name", name)
                .id(folder_input_id())
                .on_input(Message::FolderNameChanged)
                .on_submit(Message::CreateFolderConfirm)
                .padding(Padding::from([8, 12]))
                .size(13),
            Space::with_height(16),
            row![
                secondary_button(palette, "Cancel", Message::CreateFolderCancel),
                Space::with_width(12),
                primary_button(palette, "Create", Message::CreateFolderConfirm),
            ]
            .align_y(iced::Alignment::Center),
        ]
        .padding(24)
        .width(Length::Fixed(380.0));

        centered(palette, modal_content.into())
    }

    pub fn view_about_modal(&self) -> Element<'_, Message> {
        let palette = self.palette;
        let (heading, body) = status::ABOUT
            .split_once("\n\n")
            .unwrap_or((status::APP_NAME, status::ABOUT));

        let modal_content = column![
            text(heading).size(20).color(palette.accent),
            Space::with_height(12),
            text(body).size(13).color(palette.text_secondary),
            Space::with_height(12),
            text(format!("Version {}", env!("CARGO_PKG_VERSION")))
                .size(12)
                .color(palette.text_muted),
            Space::with_height(20),
            primary_button(palette, "Close", Message::HideAbout),
        ]
        .padding(24)
        .width(Length::Fixed(360.0))
        .align_x(iced::Alignment::Center);

        centered(palette, modal_content.into())
    }

    /// Zoom percentage in the middle of the window.
    pub fn view_zoom_indicator<'a>(&self, label: &'a str) -> Element<'a, Message> {
        let palette = self.palette;

        container(
            container(text(label).size(18).color(palette.text))
                .padding(Padding::from([12, 24]))
                .style(move |_| container::Style {
                    background: Some(Background::Color(Color {
                        a: 0.9,
                        ..palette.chrome
                    })),
                    border: Border {
                        color: palette.border,
                        width: 1.0,
                        radius: 8.0.into(),
                    },
                    ..Default::default()
                }),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
    }
}

fn centered(palette: Palette, content: Element<'_, Message>) -> Element<'_, Message> {
    container(container(content).style(move |_| container::Style {
        background: Some(Background::Color(palette.chrome)),
        border: Border {
            color: palette.border,
            width: 1.0,
            radius: 8.0.into(),
        },
        ..Default::default()
    }))
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .into()
}

fn primary_button<'a>(palette: Palette, label: &'a str, message: Message) -> Element<'a, Message> {
    button(text(label).size(13).color(Color::WHITE))
        .padding(Padding::from([8, 20]))
        .style(move |_: &Theme, status: button::Status| {
            let bg = match status {
                button::Status::Hovered => Color {
                    a: 0.85,
                    ..palette.accent
                },
                _ => palette.accent,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: Color::WHITE,
                border: Border {
                    radius: 4.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }
        })
        .on_press(message)
        .into()
}

fn secondary_button<'a>(palette: Palette, label: &'a str, message: Message) -> Element<'a, Message> {
    button(text(label).size(13).color(palette.text))
        .padding(Padding::from([8, 20]))
        .style(move |_: &Theme, status: button::Status| {
            let bg = match status {
                button::Status::Hovered => palette.hover,
                _ => palette.sidebar,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: palette.text,
                border: Border {
                    color: palette.border,
                    width: 1.0,
                    radius: 4.0.into(),
                },
                ..Default::default()
            }
        })
        .on_press(message)
        .into()
}
