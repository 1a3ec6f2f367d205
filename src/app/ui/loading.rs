use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
};

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Shown in place of the input box while a reply is pending
#[derive(Default)]
pub struct Loading<'a> {
    text: Line<'a>,
    frame: usize,
}

impl<'a> Loading<'a> {
    pub fn new(text: impl Into<Line<'a>>) -> Loading<'a> {
        Loading {
            text: text.into(),
            frame: 0,
        }
    }

    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn render(&self, frame: &mut Frame, rect: Rect) {
        let spinner = SPINNER[(self.frame / 3) % SPINNER.len()];
        let mut line = Line::from(Span::raw(format!("{} ", spinner)));
        line.spans.extend(self.text.spans.iter().cloned());

        frame.render_widget(
            Paragraph::new(Text::from(vec![line]))
                .style(Style {
                    add_modifier: Modifier::ITALIC,
                    ..Default::default()
                })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .padding(Padding::new(1, 1, 0, 0)),
                ),
            rect,
        );
    }
}
