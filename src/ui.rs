pub mod exercise;
pub mod results;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::app::{App, AppState};
use crate::clipboard::ClipboardSurface;
use crate::clock::Clock;

pub(crate) const HORIZONTAL_MARGIN: u16 = 5;
pub(crate) const VERTICAL_MARGIN: u16 = 1;

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

impl<C: Clock, S: ClipboardSurface + Clone> Widget for &App<C, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state() {
            AppState::Exercise => exercise::render(self, area, buf),
            AppState::Results => match self.result() {
                Some(result) => results::render(result, area, buf),
                None => exercise::render(self, area, buf),
            },
        }
    }
}

/// Flatten a buffer into one string per row, for assertions.
#[cfg(test)]
pub(crate) fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
                .collect::<String>()
        })
        .collect()
}
