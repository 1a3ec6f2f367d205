use once_cell::sync::Lazy;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
};
use ratatui_macros::span;

static KEY_BINDINGS: Lazy<Vec<KeyBinding>> = Lazy::new(build_key_bindings);

struct KeyBinding {
    key: &'static str,
    description: &'static str,
}

fn build_key_bindings() -> Vec<KeyBinding> {
    [
        ("Enter", "Send"),
        ("Alt+Enter", "Newline"),
        ("Tab", "Next chat"),
        ("^N", "New"),
        ("^R", "Rename"),
        ("^P", "Prompt"),
        ("^T", "Settings"),
        ("^S", "Export"),
        ("^O", "Import"),
        ("^K", "Reload key"),
        ("^Q", "Quit"),
    ]
    .into_iter()
    .map(|(key, description)| KeyBinding { key, description })
    .collect()
}

/// One line summary of the key bindings, cut to the available width
pub fn render_help_line(frame: &mut Frame, area: Rect) {
    let key_style = Style::default()
        .fg(Color::LightGreen)
        .add_modifier(Modifier::BOLD);

    let mut spans: Vec<Span> = vec![];
    let mut width = 0;
    for binding in KEY_BINDINGS.iter() {
        let len = binding.key.len() + binding.description.len() + 4;
        if width + len > area.width as usize {
            break;
        }
        width += len;
        spans.push(Span::styled(binding.key, key_style));
        spans.push(" ".into());
        spans.push(span!(binding.description).white());
        spans.push(" | ".into());
    }
    spans.pop();

    frame.render_widget(Line::from(spans), area);
}
