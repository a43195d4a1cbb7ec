use iced::widget::{Column, Row, Space, button, column, container, horizontal_space, row, text};
use iced::{Background, Border, Color, Element, Length, Padding, Theme};
use textedit_core::{Command, Menu, MenuEntry};

use crate::app::{App, Message};
use crate::theme::Palette;

impl App {
    pub fn view_menu_bar(&self) -> Element<'_, Message> {
        let palette = self.palette;
        let mut menu_items: Vec<Element<'_, Message>> = Vec::new();

        for menu in Menu::ALL {
            let is_active = self.active_menu == Some(menu);

            let menu_btn = button(text(menu.label()).size(12).color(if is_active {
                palette.text
            } else {
                palette.text_secondary
            }))
            .padding(Padding::from([6, 10]))
            .style(move |_: &Theme, status: button::Status| {
                let bg = if is_active {
                    palette.active
                } else {
                    match status {
                        button::Status::Hovered => palette.hover,
                        _ => palette.chrome,
                    }
                };
                button::Style {
                    background: Some(Background::Color(bg)),
                    text_color: palette.text,
                    border: Border {
                        radius: 4.0.into(),
                        ..Default::default()
                    },
                    ..Default::default()
                }
            })
            .on_press(Message::ToggleMenu(menu));

            menu_items.push(menu_btn.into());
        }

        menu_items.push(horizontal_space().into());

        let menu_bar = Row::with_children(menu_items)
            .spacing(2)
            .padding(Padding::from([4, 8]))
            .align_y(iced::Alignment::Center);

        container(menu_bar)
            .width(Length::Fill)
            .height(Length::Fixed(32.0))
            .style(move |_| container::Style {
                background: Some(Background::Color(palette.chrome)),
                border: Border {
                    color: palette.border,
                    width: 1.0,
                    radius: 0.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    /// One dropdown row: label, shortcut, and the command it runs.
    fn menu_item<'a>(palette: Palette, command: Command, shortcut: String) -> Element<'a, Message> {
        button(
            row![
                text(command.display_name()).size(12).color(palette.text),
                horizontal_space(),
                text(shortcut).size(11).color(palette.text_muted),
            ]
            .width(Length::Fill)
            .align_y(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(Padding::from([6, 16]))
        .style(move |_: &Theme, status: button::Status| {
            let bg = match status {
                button::Status::Hovered => palette.hover,
                _ => Color::TRANSPARENT,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: palette.text,
                border: Border::default(),
                ..Default::default()
            }
        })
        .on_press(Message::Command(command))
        .into()
    }

    fn menu_separator<'a>(palette: Palette) -> Element<'a, Message> {
        container(Space::new(Length::Fill, 1))
            .padding(Padding::from([4, 8]))
            .style(move |_| container::Style {
                background: Some(Background::Color(palette.border)),
                ..Default::default()
            })
            .into()
    }

    pub fn view_menu_dropdown(&self) -> Element<'_, Message> {
        let Some(menu) = self.active_menu else {
            return Space::new(0, 0).into();
        };
        let palette = self.palette;
        let keymap = self.controller.keymap();

        let items: Vec<Element<'_, Message>> = menu
            .entries()
            .iter()
            .map(|entry| match *entry {
                MenuEntry::Item(command) => Self::menu_item(
                    palette,
                    command,
                    keymap.shortcut_for(command).unwrap_or_default(),
                ),
                MenuEntry::Separator => Self::menu_separator(palette),
            })
            .collect();

        let menu_content = Column::with_children(items)
            .width(Length::Fixed(240.0))
            .padding(4);

        let menu_offset_x = match menu {
            Menu::File => 8.0,
            Menu::Edit => 48.0,
            Menu::View => 90.0,
            Menu::Help => 136.0,
        };

        let menu_box = container(menu_content).style(move |_| container::Style {
            background: Some(Background::Color(palette.chrome)),
            border: Border {
                color: palette.border,
                width: 1.0,
                radius: 6.0.into(),
            },
            ..Default::default()
        });

        column![
            Space::with_height(Length::Fixed(32.0)),
            row![Space::with_width(Length::Fixed(menu_offset_x)), menu_box],
        ]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }

    /// Cursor position, encoding and file type of the active tab.
    pub fn view_status_bar(&self) -> Element<'_, Message> {
        let palette = self.palette;
        let status = self.controller.status();

        let mut items = row![text(status.position_label()).size(12).color(palette.text)]
            .spacing(16)
            .align_y(iced::Alignment::Center);

        if let Some(message) = &self.find.status {
            items = items.push(text(message.clone()).size(12).color(palette.text_secondary));
        }

        let read_only = self
            .controller
            .tabs()
            .current_editor()
            .is_some_and(|viewport| viewport.is_read_only());
        if read_only {
            items = items.push(text("Read Only").size(12).color(palette.text_secondary));
        }

        let bar = items
            .push(horizontal_space())
            .push(text(status.encoding).size(12).color(palette.text))
            .push(text(status.file_type).size(12).color(palette.text))
            .padding(Padding::from([4, 12]));

        container(bar)
            .width(Length::Fill)
            .height(Length::Fixed(28.0))
            .style(move |_| container::Style {
                background: Some(Background::Color(palette.accent)),
                ..Default::default()
            })
            .into()
    }
}
