#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

use crate::models::{Conversation, Message, Speaker};
use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Scrollbar, ScrollbarOrientation},
};

use super::{Scroll, utils};

/// Renders the turns of the displayed conversation. Lines are rebuilt only
/// when the conversation or the width changes.
#[derive(Default)]
pub struct Transcript {
    lines: Vec<Line<'static>>,
    key: Option<(String, usize, i64)>,
    width: usize,
    pub scroll: Scroll,
}

impl Transcript {
    pub fn render(&mut self, f: &mut Frame, area: Rect, convo: Option<&Conversation>) {
        let title = convo.map(|c| c.title()).unwrap_or_default();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .padding(Padding::horizontal(1))
            .title(Line::from(format!(" {} ", title)).bold());
        let inner = block.inner(area);

        self.sync(convo, inner.width as usize, inner.height as usize);

        let visible = self
            .lines
            .iter()
            .skip(self.scroll.position)
            .take(inner.height as usize)
            .cloned()
            .collect::<Vec<_>>();
        f.render_widget(Paragraph::new(visible).block(block), area);

        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut self.scroll.scrollbar_state,
        );
    }

    fn sync(&mut self, convo: Option<&Conversation>, width: usize, height: usize) {
        let key = convo.map(|c| (c.id().to_string(), c.len(), c.updated_at().timestamp_millis()));
        let switched = key.as_ref().map(|k| &k.0) != self.key.as_ref().map(|k| &k.0);
        if key == self.key && width == self.width {
            self.scroll.set_state(self.lines.len(), height);
            return;
        }

        self.lines = match convo {
            Some(convo) => build_lines(convo.messages(), width),
            None => vec![],
        };
        self.key = key;
        self.width = width;
        self.scroll.set_state(self.lines.len(), height);
        if switched {
            self.scroll.last();
        }
    }
}

pub(crate) fn build_lines(messages: &[Message], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines = vec![];
    for message in messages {
        let color = speaker_color(message.speaker());
        lines.push(Line::from(vec![
            Span::styled("┃ ", Style::default().fg(color)),
            Span::styled(message.speaker().label().to_string(), Style::default().fg(color)).bold(),
        ]));
        let style = match message.speaker() {
            Speaker::Notice => Style::default().italic().dim(),
            _ => Style::default(),
        };
        lines.extend(utils::wrap_text(message.text(), width, style));
        lines.push(Line::default());
    }
    lines
}

fn speaker_color(speaker: &Speaker) -> Color {
    match speaker {
        Speaker::User => Color::LightGreen,
        Speaker::Assistant => Color::LightBlue,
        Speaker::Notice => Color::Gray,
        Speaker::Other(_) => Color::Yellow,
    }
}
