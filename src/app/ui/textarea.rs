#[cfg(test)]
#[path = "textarea_test.rs"]
mod tests;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    widgets::{Block, BorderType, Borders, Padding},
};
use tui_textarea::{Input, TextArea};

use super::utils::truncate;

const PLACEHOLDER: &str = "Ask Gemini anything, Enter to send...";
const TARGET_MAX_WIDTH: usize = 24;

/// Rows the composer grows to, borders included
pub const MAX_HEIGHT: u16 = 10;

/// Multi-line composer for the next message
pub struct MessageInput<'a> {
    textarea: TextArea<'a>,
    target: String,
}

impl MessageInput<'_> {
    /// Names the conversation the message goes to in the border
    pub fn set_target(&mut self, title: &str) {
        if self.target == title {
            return;
        }
        self.target = title.to_string();
        self.textarea.set_block(block(&self.target));
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn input(&mut self, input: Input) {
        self.textarea.input(input);
    }

    /// Inserts pasted text, normalizing line endings
    pub fn paste(&mut self, text: &str) {
        self.textarea
            .insert_str(text.replace("\r\n", "\n").replace('\r', "\n"));
    }

    pub fn new_line(&mut self) {
        self.textarea.insert_newline();
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn clear(&mut self) {
        self.textarea = build(&self.target);
    }

    pub fn height(&self) -> u16 {
        (self.textarea.lines().len() as u16)
            .saturating_add(2)
            .min(MAX_HEIGHT)
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        f.render_widget(&self.textarea, area);
    }
}

impl Default for MessageInput<'_> {
    fn default() -> Self {
        Self {
            textarea: build(""),
            target: String::new(),
        }
    }
}

fn build<'a>(target: &str) -> TextArea<'a> {
    let mut textarea = TextArea::default();
    textarea.set_block(block(target));
    textarea.set_placeholder_text(PLACEHOLDER);
    textarea
}

fn block<'a>(target: &str) -> Block<'a> {
    let title = if target.is_empty() {
        " Message ".to_string()
    } else {
        format!(" Message to {} ", truncate(target, TARGET_MAX_WIDTH))
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title_alignment(Alignment::Left)
        .padding(Padding::horizontal(1))
}
