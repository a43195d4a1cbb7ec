use iced::widget::{Column, Space, button, column, container, mouse_area, row, scrollable, text};
use iced::{Background, Border, Color, Element, Font, Length, Padding, Theme};
use textedit_core::{Command, FileNode};

use crate::app::{App, Message};
use crate::theme::Palette;

impl App {
    pub fn view_sidebar(&self) -> Element<'_, Message> {
        let palette = self.palette;
        let tree = self.controller.tree();

        let header = container(
            text(tree.root_name().to_uppercase())
                .size(11)
                .color(palette.text_secondary),
        )
        .padding(Padding::from([10, 12]))
        .width(Length::Fill)
        .style(move |_| container::Style {
            background: Some(Background::Color(palette.chrome)),
            ..Default::default()
        });

        let active_path = self.controller.tabs().current_path();
        let rows = tree.rows();

        let file_content: Element<'_, Message> = if rows.is_empty() {
            container(
                column![
                    Space::with_height(40),
                    text("Folder is empty").size(13).color(palette.text_muted),
                    Space::with_height(16),
                    button(text("Open Folder").size(13).color(palette.accent))
                        .padding(Padding::from([8, 16]))
                        .style(move |_, status| {
                            let bg = match status {
                                button::Status::Hovered => palette.hover,
                                _ => palette.sidebar,
                            };
                            button::Style {
                                background: Some(Background::Color(bg)),
                                text_color: palette.accent,
                                border: Border {
                                    color: palette.accent,
                                    width: 1.0,
                                    radius: 4.0.into(),
                                },
                                ..Default::default()
                            }
                        })
                        .on_press(Message::Command(Command::OpenFolder)),
                ]
                .align_x(iced::Alignment::Center)
                .width(Length::Fill),
            )
            .height(Length::Fill)
            .into()
        } else {
            let items: Vec<Element<'_, Message>> = rows
                .into_iter()
                .enumerate()
                .map(|(row, node)| {
                    let is_active = active_path == Some(node.path.as_path());
                    file_row(palette, row, node, is_active)
                })
                .collect();

            scrollable(Column::with_children(items).spacing(1).width(Length::Fill))
                .height(Length::Fill)
                .into()
        };

        container(column![header, file_content])
            .width(Length::Fixed(self.sidebar_width))
            .height(Length::Fill)
            .style(move |_| container::Style {
                background: Some(Background::Color(palette.sidebar)),
                border: Border {
                    color: palette.border,
                    width: 1.0,
                    radius: 0.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    /// Right-click menu of a tree row, at the pointer.
    pub fn view_tree_menu(&self) -> Element<'_, Message> {
        let Some(menu) = self.tree_menu else {
            return Space::new(0, 0).into();
        };
        let palette = self.palette;
        let is_dir = self.controller.tree().is_dir(menu.row);

        let menu_btn_style = move |_: &Theme, status: button::Status| -> button::Style {
            let bg = match status {
                button::Status::Hovered => palette.hover,
                _ => palette.chrome,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: palette.text,
                border: Border::default(),
                ..Default::default()
            }
        };

        let items = column![
            button(
                text(if is_dir { "Expand / Collapse" } else { "Open" })
                    .size(12)
                    .color(palette.text)
            )
            .width(Length::Fill)
            .padding(Padding::from([6, 12]))
            .style(menu_btn_style)
            .on_press(Message::OpenTreeRow),
            button(text("Delete").size(12).color(palette.error))
                .width(Length::Fill)
                .padding(Padding::from([6, 12]))
                .style(menu_btn_style)
                .on_press(Message::DeleteTreeRow),
        ]
        .width(Length::Fixed(160.0));

        let menu_box = container(items).padding(4).style(move |_| container::Style {
            background: Some(Background::Color(palette.chrome)),
            border: Border {
                color: palette.border,
                width: 1.0,
                radius: 4.0.into(),
            },
            ..Default::default()
        });

        column![
            Space::with_height(Length::Fixed(menu.position.y)),
            row![Space::with_width(Length::Fixed(menu.position.x)), menu_box],
        ]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
    }
}

fn file_row<'a>(palette: Palette, row: usize, node: &FileNode, is_active: bool) -> Element<'a, Message> {
    let icon = if node.is_dir {
        if node.expanded { "[-]" } else { "[+]" }
    } else {
        file_icon(node.extension())
    };

    let bg = if is_active {
        palette.active
    } else {
        Color::TRANSPARENT
    };
    let indent = f32::from(node.depth) * 16.0 + 8.0;

    let item_btn = button(
        row![
            Space::with_width(Length::Fixed(indent)),
            text(icon).size(12).font(Font::MONOSPACE).color(palette.text_muted),
            Space::with_width(6),
            text(node.name.clone()).size(13).color(if is_active {
                palette.text
            } else {
                palette.text_secondary
            }),
        ]
        .align_y(iced::Alignment::Center),
    )
    .width(Length::Fill)
    .padding(Padding::from([4, 0]))
    .style(move |_, status| {
        let hover_bg = match status {
            button::Status::Hovered => palette.hover,
            _ => bg,
        };
        button::Style {
            background: Some(Background::Color(hover_bg)),
            text_color: palette.text,
            border: Border::default(),
            ..Default::default()
        }
    })
    .on_press(Message::TreeRowClicked(row));

    mouse_area(item_btn)
        .on_right_press(Message::ShowTreeMenu(row))
        .into()
}

fn file_icon(extension: Option<&str>) -> &'static str {
    match extension.map(str::to_ascii_lowercase).as_deref() {
        Some("py") => " py",
        Some("js" | "ts") => " js",
        Some("html") => " <>",
        Some("css") => " cs",
        Some("json") => " {}",
        Some("md") => " md",
        Some("txt") => " tx",
        _ => "  .",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_icon() {
        assert_eq!(file_icon(Some("PY")), " py");
        assert_eq!(file_icon(Some("ts")), " js");
        assert_eq!(file_icon(None), "  .");
    }
}
