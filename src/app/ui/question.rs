use crate::models::Event;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    text::{Line, Text},
    widgets::{Block, BorderType, Borders, Clear, Padding},
};
use ratatui_macros::span;
use tui_textarea::Key;

use super::utils;

#[derive(Debug, PartialEq, Eq)]
pub enum Answer {
    Pending,
    Yes,
    No,
    Cancelled,
}

/// Yes/no popup
#[derive(Default)]
pub struct Question<'a> {
    showing: bool,
    question: Line<'a>,
    title: Option<Line<'a>>,
}

impl<'a> Question<'a> {
    pub fn with_title(mut self, title: impl Into<Line<'a>>) -> Question<'a> {
        self.title = Some(title.into());
        self
    }

    pub fn showing(&self) -> bool {
        self.showing
    }

    pub fn open(&mut self, question: impl Into<Line<'a>>) {
        self.question = question.into();
        self.showing = true;
    }

    pub fn close(&mut self) {
        self.showing = false;
    }

    pub fn handle_key_event(&mut self, event: &Event) -> Answer {
        let answer = match event {
            Event::KeyboardEsc => Answer::Cancelled,
            Event::KeyboardCharInput(input) => match input.key {
                Key::Char('y') | Key::Char('Y') => Answer::Yes,
                Key::Char('n') | Key::Char('N') => Answer::No,
                Key::Char('q') => Answer::Cancelled,
                _ => Answer::Pending,
            },
            _ => Answer::Pending,
        };
        if answer != Answer::Pending {
            self.showing = false;
        }
        answer
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        if !self.showing || area.width < 10 {
            return;
        }

        let max_width = (area.width as f32 * 0.6).ceil() as u16;
        let lines = utils::split_to_lines(self.question.spans.clone(), (max_width - 4) as usize);
        let area = utils::fixed_popup_area(area, 60, lines.len() as u16 + 2);

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .padding(Padding::symmetric(1, 0))
            .title_bottom(vec![
                span!(" "),
                span!("y").green().bold(),
                span!(" yes, ").white(),
                span!("n").green().bold(),
                span!(" no, ").white(),
                span!("Esc").green().bold(),
                span!(" to cancel ").white(),
            ])
            .title_alignment(Alignment::Center)
            .border_style(Style::default().light_blue());

        if let Some(title) = &self.title {
            block = block
                .title(title.clone())
                .title_alignment(Alignment::Center);
        }

        f.render_widget(Clear, area);
        let inner = block.inner(area);
        f.render_widget(block, area);
        f.render_widget(Text::from(lines), inner);
    }
}
