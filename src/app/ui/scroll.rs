#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;

use ratatui::widgets::ScrollbarState;

const PAGE_SIZE: usize = 10;

/// Vertical scroll over a list of rendered lines
#[derive(Debug, Default)]
pub struct Scroll {
    list_len: usize,
    viewport_len: usize,
    pub position: usize,
    pub scrollbar_state: ScrollbarState,
}

impl Scroll {
    pub fn up(&mut self) {
        self.position = self.position.saturating_sub(1);
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn page_up(&mut self) {
        for _ in 0..PAGE_SIZE {
            self.up();
        }
    }

    pub fn down(&mut self) {
        self.position = (self.position + 1).min(self.max_position());
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn page_down(&mut self) {
        for _ in 0..PAGE_SIZE {
            self.down();
        }
    }

    fn max_position(&self) -> usize {
        self.list_len.saturating_sub(self.viewport_len)
    }

    pub fn is_position_at_last(&self) -> bool {
        self.position == self.max_position()
    }

    pub fn last(&mut self) {
        self.position = self.max_position();
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    /// Updates the content size. The position sticks to the bottom when it
    /// was already there.
    pub fn set_state(&mut self, list_len: usize, viewport_len: usize) {
        let follow = self.is_position_at_last();
        self.list_len = list_len;
        self.viewport_len = viewport_len;
        self.scrollbar_state = self.scrollbar_state.content_length(self.max_position().max(1));
        if follow || self.position > self.max_position() {
            self.last();
        }
    }
}
