#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

use crate::config::constants::MODELS;
use crate::models::{Event, GenerationParams};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Padding, Row, Table, TableState},
};
use ratatui_macros::span;
use tui_textarea::Key;

const FIELDS: usize = 3;

#[derive(Debug, PartialEq)]
pub enum SettingsOutcome {
    Pending,
    Applied(GenerationParams),
    Cancelled,
}

/// Edits a draft of the generation parameters. Nothing changes until the
/// draft is applied.
pub struct SettingsScreen {
    showing: bool,
    draft: GenerationParams,
    state: TableState,
}

impl SettingsScreen {
    pub fn showing(&self) -> bool {
        self.showing
    }

    pub fn open(&mut self, params: &GenerationParams) {
        self.draft = params.clone();
        self.state.select(Some(0));
        self.showing = true;
    }

    pub fn draft(&self) -> &GenerationParams {
        &self.draft
    }

    fn selected(&self) -> usize {
        self.state.selected().unwrap_or(0).min(FIELDS - 1)
    }

    fn next_row(&mut self) {
        self.state.select(Some((self.selected() + 1).min(FIELDS - 1)));
    }

    fn prev_row(&mut self) {
        self.state.select(Some(self.selected().saturating_sub(1)));
    }

    fn change(&mut self, forward: bool) {
        let steps = if forward { 1 } else { -1 };
        match self.selected() {
            0 if forward => self.draft.next_model(),
            0 => self.draft.prev_model(),
            1 => self.draft.step_temperature(steps),
            _ => self.draft.step_top_p(steps),
        }
    }

    pub fn handle_key_event(&mut self, event: &Event) -> SettingsOutcome {
        match event {
            Event::KeyboardEnter => {
                self.showing = false;
                return SettingsOutcome::Applied(self.draft.clone());
            }
            Event::KeyboardEsc | Event::KeyboardCtrlT => {
                self.showing = false;
                return SettingsOutcome::Cancelled;
            }
            Event::UiScrollDown | Event::KeyboardTab => self.next_row(),
            Event::UiScrollUp | Event::KeyboardBackTab => self.prev_row(),
            Event::KeyboardCharInput(input) => match input.key {
                Key::Char('j') => self.next_row(),
                Key::Char('k') => self.prev_row(),
                Key::Char('l') | Key::Char('+') | Key::Right => self.change(true),
                Key::Char('h') | Key::Char('-') | Key::Left => self.change(false),
                Key::Char('q') => {
                    self.showing = false;
                    return SettingsOutcome::Cancelled;
                }
                _ => {}
            },
            _ => {}
        }
        SettingsOutcome::Pending
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        if !self.showing {
            return;
        }

        let instructions = vec![
            " ".into(),
            span!("↑/k/↓/j").green().bold(),
            span!(" to move, ").white(),
            span!("←/h/→/l").green().bold(),
            span!(" to change, ").white(),
            span!("Enter").green().bold(),
            span!(" to apply, ").white(),
            span!("Esc").green().bold(),
            span!(" to cancel ").white(),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::LightBlue))
            .padding(Padding::symmetric(1, 1))
            .title(Line::from(" Settings ").bold())
            .title_alignment(Alignment::Center)
            .title_bottom(Line::from(instructions));
        f.render_widget(Clear, area);

        let selected_row_style = Style::default()
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD);
        let table = Table::new(
            build_rows(&self.draft),
            [Constraint::Length(14), Constraint::Fill(1)],
        )
        .block(block)
        .row_highlight_style(selected_row_style);
        f.render_stateful_widget(table, area, &mut self.state);
    }
}

impl Default for SettingsScreen {
    fn default() -> Self {
        Self {
            showing: false,
            draft: GenerationParams::default(),
            state: TableState::default().with_selected(0),
        }
    }
}

fn build_rows<'a>(params: &GenerationParams) -> Vec<Row<'a>> {
    let models = MODELS
        .iter()
        .map(|model| {
            if *model == params.model() {
                Span::styled(format!("[{}]", model), Style::default().bold().red())
            } else {
                Span::styled(format!(" {} ", model), Style::default().dim())
            }
        })
        .collect::<Vec<_>>();

    vec![
        Row::new(vec![Cell::from("Model"), Cell::from(Line::from(models))]),
        Row::new(vec![
            Cell::from("Temperature"),
            Cell::from(format!("◀ {:.2} ▶", params.temperature())),
        ]),
        Row::new(vec![
            Cell::from("Top P"),
            Cell::from(format!("◀ {:.2} ▶", params.top_p())),
        ]),
    ]
}
