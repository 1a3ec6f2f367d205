#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::Style,
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

pub fn popup_area(area: Rect, percent_width: u16, percent_height: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_width)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// A popup with a fixed height, centered horizontally and placed at the
/// upper third of `area`
pub fn fixed_popup_area(area: Rect, percent_width: u16, height: u16) -> Rect {
    let width = ((area.width as u32 * percent_width as u32) / 100) as u16;
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 3;
    Rect::new(x, y, width, height)
}

pub fn notice_area(area: Rect, percent_width: u16) -> Rect {
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_width)]).flex(Flex::End);
    let [area] = horizontal.areas(area);
    area
}

/// Word wraps a single line of spans. Styles are kept on every piece.
pub fn split_to_lines<'a>(text: impl Into<Line<'a>>, max_width: usize) -> Vec<Line<'a>> {
    let mut lines = vec![];
    let mut line = vec![];
    let mut line_char_count = 0;

    for word in split_spans(text) {
        if line_char_count + word.content.width() > max_width && !line.is_empty() {
            lines.push(Line::from(line));
            line = vec![];
            line_char_count = 0;
        }
        line_char_count += word.width();
        line.push(word);
    }
    if !line.is_empty() {
        lines.push(Line::from(line));
    }
    lines
}

/// Word wraps a multi-line text. Empty lines are kept.
pub fn wrap_text<'a>(text: &str, max_width: usize, style: Style) -> Vec<Line<'a>> {
    let mut lines = vec![];
    for raw in text.lines() {
        let wrapped = split_to_lines(Span::styled(raw.to_string(), style), max_width);
        if wrapped.is_empty() {
            lines.push(Line::default());
        } else {
            lines.extend(wrapped);
        }
    }
    lines
}

fn split_spans<'a>(input: impl Into<Line<'a>>) -> Vec<Span<'a>> {
    let mut spans = vec![];
    input.into().spans.into_iter().for_each(|item| {
        spans.extend(split_span_by_space(item));
    });
    spans
}

fn split_span_by_space(span: Span) -> Vec<Span> {
    let mut spans = vec![];
    let s = span.content.to_string();
    let mut in_word = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == ' ' {
            if in_word {
                spans.push(Span::styled(s[start..i].to_string(), span.style));
                in_word = false;
            }
            let space_end = i + c.len_utf8();
            spans.push(Span::styled(s[i..space_end].to_string(), span.style));
            start = space_end;
        } else if !in_word {
            start = i;
            in_word = true;
        }
    }
    if in_word {
        spans.push(Span::styled(s[start..].to_string(), span.style));
    }
    spans
        .into_iter()
        .filter(|s| s.content.width() > 0)
        .collect()
}

/// Repeats `text` as many times as the first number minus all the others,
/// nothing when the result is not positive
pub fn repeat_from_substactions(text: &str, subs: Vec<usize>) -> String {
    let mut subs = subs.into_iter();
    let Some(first) = subs.next() else {
        return String::new();
    };
    let count = subs.fold(first as i64, |acc, n| acc - n as i64);
    if count <= 0 {
        return String::new();
    }
    text.repeat(count as usize)
}

/// Cuts `text` to at most `max_width` columns, marking the cut with `…`
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        if out.width() + c.to_string().width() + 1 > max_width {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}
