use crate::models::{Conversation, GenerationParams};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Padding, Paragraph},
};
use ratatui_macros::span;

use super::utils;

/// Generation parameters on top, conversation list below
#[derive(Default)]
pub struct Sidebar {
    state: ListState,
}

impl Sidebar {
    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        params: &GenerationParams,
        conversations: &[&Conversation],
        current_id: Option<&str>,
    ) {
        let [params_area, list_area] =
            Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).areas(area);

        let params_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .padding(Padding::horizontal(1))
            .title(Line::from(" Settings ").bold());
        let params_lines = vec![
            Line::from(vec![span!("Model ").dim(), span!(params.model().to_string()).bold()]),
            Line::from(vec![
                span!("Temperature ").dim(),
                span!(format!("{:.2}", params.temperature())),
            ]),
            Line::from(vec![
                span!("Top P ").dim(),
                span!(format!("{:.2}", params.top_p())),
            ]),
        ];
        f.render_widget(Paragraph::new(params_lines).block(params_block), params_area);

        let max_width = list_area.width.saturating_sub(4) as usize;
        let items = conversations
            .iter()
            .map(|c| ListItem::new(utils::truncate(c.title(), max_width)))
            .collect::<Vec<_>>();
        let selected = current_id.and_then(|id| conversations.iter().position(|c| c.id() == id));
        self.state.select(selected);

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .padding(Padding::horizontal(1))
                    .title(Line::from(format!(" Chats ({}) ", conversations.len())).bold()),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            );
        f.render_stateful_widget(list, list_area, &mut self.state);
    }
}
