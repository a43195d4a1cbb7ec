use iced::alignment::Horizontal;
use iced::widget::text::{LineHeight, Wrapping};
use iced::widget::{
    Column, Row, Space, button, column, container, horizontal_space, row, scrollable, stack, text,
    text_editor, text_input,
};
use iced::{Background, Border, Color, Element, Font, Length, Padding, Pixels, Theme};
use textedit_core::EditorViewport;

use crate::app::update::{FIND_BAR_HEIGHT, find_input_id};
use crate::app::{App, EditorView, Message};
use crate::theme::Palette;

/// Gap between the line numbers and the text.
const GUTTER_PADDING: f32 = 8.0;

pub fn editor_scroll_id() -> scrollable::Id {
    scrollable::Id::new("editor-scroll")
}

impl App {
    pub fn view_main_area(&self) -> Element<'_, Message> {
        let mut items: Vec<Element<'_, Message>> = vec![self.view_tabs()];
        if self.find.visible {
            items.push(self.view_find_bar());
        }
        items.push(self.view_editor());

        Column::with_children(items)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn view_tabs(&self) -> Element<'_, Message> {
        let palette = self.palette;
        let tabs = self.controller.tabs();
        let active = tabs.active();

        let mut tabs_vec: Vec<Element<'_, Message>> = tabs
            .iter()
            .enumerate()
            .map(|(ordinal, entry)| make_tab(palette, entry.title(), ordinal, active == Some(ordinal)))
            .collect();
        tabs_vec.push(horizontal_space().into());

        let tabs_row = Row::with_children(tabs_vec)
            .spacing(1)
            .align_y(iced::Alignment::End);

        container(tabs_row)
            .width(Length::Fill)
            .height(36)
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

    pub fn view_find_bar(&self) -> Element<'_, Message> {
        let palette = self.palette;

        let bar = row![
            text_input("Find", &self.find.query)
                .id(find_input_id())
                .on_input(Message::FindChanged)
                .on_submit(Message::FindNext)
                .padding(Padding::from([4, 8]))
                .size(13)
                .width(Length::Fixed(220.0)),
            text_input("Replace", &self.find.replacement)
                .on_input(Message::ReplaceChanged)
                .on_submit(Message::ReplaceOne)
                .padding(Padding::from([4, 8]))
                .size(13)
                .width(Length::Fixed(220.0)),
            bar_button(palette, "Find Next", Message::FindNext),
            bar_button(palette, "Replace", Message::ReplaceOne),
            bar_button(palette, "Replace All", Message::ReplaceAll),
            horizontal_space(),
            bar_button(palette, "x", Message::CloseFind),
        ]
        .spacing(6)
        .padding(Padding::from([6, 10]))
        .align_y(iced::Alignment::Center);

        container(bar)
            .width(Length::Fill)
            .height(Length::Fixed(FIND_BAR_HEIGHT))
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

    /// Line-number gutter and text of the active tab.
    ///
    /// Both sit in one scrollable so they move together. The gutter only
    /// holds labels for the rows in view; a spacer stands in for the rest.
    pub fn view_editor(&self) -> Element<'_, Message> {
        let palette = self.palette;
        let view = self.active_id().and_then(|id| self.views.get(&id));
        let (Some(viewport), Some(view)) = (self.controller.tabs().current_editor(), view) else {
            return container(text("No file open").size(16).color(palette.text_muted))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };

        let height = viewport.content_height().max(self.editor_height());

        let body = row![
            gutter(palette, viewport, height),
            stack![current_line_layer(palette, viewport, height), text_area(palette, viewport, view)],
        ];

        container(
            scrollable(body)
                .id(editor_scroll_id())
                .on_scroll(Message::EditorScrolled)
                .width(Length::Fill)
                .height(Length::Fill),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .style(move |_| container::Style {
            background: Some(Background::Color(palette.background)),
            ..Default::default()
        })
        .into()
    }
}

fn make_tab<'a>(palette: Palette, title: &'a str, ordinal: usize, is_active: bool) -> Element<'a, Message> {
    let close_btn = button(text("x").size(12).color(palette.text_muted))
        .padding(Padding::from([2, 6]))
        .style(move |_, status| {
            let bg = match status {
                button::Status::Hovered => palette.hover,
                _ => Color::TRANSPARENT,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: palette.text,
                border: Border {
                    radius: 2.0.into(),
                    ..Default::default()
                },
                ..Default::default()
            }
        })
        .on_press(Message::CloseTab(ordinal));

    let tab_content = row![
        text(title).size(13).color(if is_active {
            palette.text
        } else {
            palette.text_secondary
        }),
        Space::with_width(8),
        close_btn,
    ]
    .align_y(iced::Alignment::Center);

    let bg = if is_active {
        palette.background
    } else {
        palette.chrome
    };

    button(tab_content)
        .padding(Padding::from([8, 14]))
        .style(move |_, status| {
            let hover_bg = match status {
                button::Status::Hovered if !is_active => palette.hover,
                _ => bg,
            };
            button::Style {
                background: Some(Background::Color(hover_bg)),
                text_color: palette.text,
                border: Border {
                    color: if is_active {
                        palette.accent
                    } else {
                        Color::TRANSPARENT
                    },
                    width: if is_active { 2.0 } else { 0.0 },
                    radius: 0.0.into(),
                },
                ..Default::default()
            }
        })
        .on_press(Message::TabSelected(ordinal))
        .into()
}

fn bar_button<'a>(palette: Palette, label: &'a str, message: Message) -> Element<'a, Message> {
    button(text(label).size(12).color(palette.text))
        .padding(Padding::from([4, 10]))
        .style(move |_: &Theme, status: button::Status| {
            let bg = match status {
                button::Status::Hovered => palette.hover,
                _ => palette.active,
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
        .on_press(message)
        .into()
}

fn gutter<'a>(palette: Palette, viewport: &EditorViewport, height: f32) -> Element<'a, Message> {
    let metrics = viewport.font_metrics();
    let line_height = metrics.line_height;
    let first = viewport.visible_lines().start;

    let mut labels = column![Space::with_height(Length::Fixed(first as f32 * line_height))];
    for label in viewport.gutter_labels() {
        labels = labels.push(
            container(
                text(label.number.to_string())
                    .font(Font::MONOSPACE)
                    .size(metrics.pixel_size)
                    .line_height(LineHeight::Absolute(Pixels(line_height)))
                    .color(palette.gutter_text),
            )
            .width(Length::Fill)
            .height(Length::Fixed(line_height))
            .align_x(Horizontal::Right),
        );
    }

    container(labels.padding(Padding {
        right: GUTTER_PADDING,
        ..Padding::ZERO
    }))
    .width(Length::Fixed(viewport.gutter_width()))
    .height(Length::Fixed(height))
    .style(move |_| container::Style {
        background: Some(Background::Color(palette.background)),
        ..Default::default()
    })
    .into()
}

/// Bottom layer of the text area. Its size is the size of the whole stack.
fn current_line_layer<'a>(palette: Palette, viewport: &EditorViewport, height: f32) -> Element<'a, Message> {
    let band: Element<'a, Message> = match viewport.current_line_highlight() {
        Some(highlight) => column![
            Space::with_height(Length::Fixed(highlight.top)),
            container(Space::new(Length::Fill, Length::Fixed(highlight.height))).style(move |_| {
                container::Style {
                    background: Some(Background::Color(palette.current_line)),
                    ..Default::default()
                }
            }),
        ]
        .into(),
        None => Space::new(Length::Fill, Length::Fill).into(),
    };

    container(band)
        .width(Length::Fill)
        .height(Length::Fixed(height))
        .into()
}

fn text_area<'a>(palette: Palette, viewport: &EditorViewport, view: &'a EditorView) -> Element<'a, Message> {
    let metrics = viewport.font_metrics();

    text_editor(&view.content)
        .font(Font::MONOSPACE)
        .size(metrics.pixel_size)
        .line_height(LineHeight::Absolute(Pixels(metrics.line_height)))
        .wrapping(Wrapping::None)
        .padding(0)
        .height(Length::Fill)
        .style(move |_: &Theme, _status| text_editor::Style {
            background: Background::Color(Color::TRANSPARENT),
            border: Border {
                width: 0.0,
                radius: 0.0.into(),
                color: Color::TRANSPARENT,
            },
            icon: palette.text_muted,
            placeholder: palette.text_muted,
            value: palette.text,
            selection: palette.selection,
        })
        .on_action(Message::EditorAction)
        .into()
}
