use crate::models::Event;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, Clear, Padding, Widget},
};
use ratatui_macros::span;
use tui_textarea::{CursorMove, TextArea};

#[derive(Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Pending,
    Submitted(String),
    Cancelled,
}

/// Single line popup asking for a title, a system prompt or a path
pub struct InputBox<'a> {
    showing: bool,
    input: TextArea<'a>,

    title: String,
    placeholder: String,
}

impl<'a> InputBox<'a> {
    pub fn showing(&self) -> bool {
        self.showing
    }

    pub fn open(&mut self, title: &str, placeholder: &str, text: &str) {
        self.title = format!(" {} ", title);
        self.placeholder = placeholder.to_string();
        self.input = self.build_input(text);
        self.showing = true;
    }

    pub fn close(&mut self) {
        self.showing = false;
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        if !self.showing {
            return;
        }

        f.render_widget(Clear, area);
        self.input.render(area, f.buffer_mut());
    }

    pub fn handle_key_event(&mut self, event: &Event) -> InputOutcome {
        match event {
            Event::KeyboardEnter => {
                self.showing = false;
                InputOutcome::Submitted(self.input.lines().join(" "))
            }
            Event::KeyboardEsc => {
                self.showing = false;
                InputOutcome::Cancelled
            }
            Event::KeyboardPaste(text) => {
                self.input.insert_str(text.replace(['\r', '\n'], " "));
                InputOutcome::Pending
            }
            Event::KeyboardCharInput(input) => {
                self.input.input(input.clone());
                InputOutcome::Pending
            }
            _ => InputOutcome::Pending,
        }
    }

    fn build_input(&self, text: &str) -> TextArea<'a> {
        let mut text_area = TextArea::new(vec![text.to_string()]);
        let block = Block::default()
            .title(Line::from(self.title.clone()).bold())
            .title_bottom(Line::from(vec![
                span!(" "),
                span!("Enter").green().bold(),
                span!(" to confirm, ").white(),
                span!("Esc").green().bold(),
                span!(" to cancel ").white(),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::LightMagenta))
            .padding(Padding::symmetric(1, 0));
        text_area.set_block(block);
        text_area.set_placeholder_text(self.placeholder.clone());
        text_area.move_cursor(CursorMove::End);
        text_area
    }
}

impl Default for InputBox<'_> {
    fn default() -> Self {
        Self {
            showing: false,
            input: TextArea::default(),
            title: " Input ".to_string(),
            placeholder: "Type here...".to_string(),
        }
    }
}
