#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use crate::{config::constants::FRAME_DURATION, models::Event};
use crossterm::event::{Event as CrosstermEvent, EventStream, KeyCode, MouseEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time;
use tui_textarea::{Input, Key};

/// Merges terminal input, internal events and the frame tick into a single
/// stream consumed by the interactive loop.
pub struct EventService {
    crossterm_events: EventStream,
    event_rx: mpsc::UnboundedReceiver<Event>,
    event_tx: mpsc::UnboundedSender<Event>,
}

impl EventService {
    pub fn event_tx(&self) -> mpsc::UnboundedSender<Event> {
        self.event_tx.clone()
    }

    pub async fn next(&mut self) -> Event {
        loop {
            let e = tokio::select! {
                event = self.event_rx.recv() => event,
                event = self.crossterm_events.next().fuse() => match event {
                    Some(Ok(input)) => map_crossterm(input),
                    Some(Err(err)) => {
                        log::warn!("Failed to read terminal event: {}", err);
                        None
                    }
                    None => None
                },
                _ = time::sleep(FRAME_DURATION) => Some(Event::UiTick)
            };

            if let Some(event) = e {
                return event;
            }
        }
    }
}

impl Default for EventService {
    fn default() -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
        Self {
            crossterm_events: EventStream::new(),
            event_rx,
            event_tx,
        }
    }
}

pub(crate) fn map_crossterm(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Paste(text) => Some(Event::KeyboardPaste(text)),
        CrosstermEvent::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::ScrollUp => Some(Event::UiScrollUp),
            MouseEventKind::ScrollDown => Some(Event::UiScrollDown),
            _ => None,
        },
        CrosstermEvent::Key(key_event) if key_event.code == KeyCode::BackTab => {
            Some(Event::KeyboardBackTab)
        }
        CrosstermEvent::Key(key_event) => map_input(key_event.into()),
        _ => None,
    }
}

pub(crate) fn map_input(input: Input) -> Option<Event> {
    if input.key == Key::Enter && (input.shift || input.alt) {
        return Some(Event::KeyboardNewLine);
    }

    if input.ctrl {
        return match input.key {
            Key::Char('u') => Some(Event::UiScrollPageUp),
            Key::Char('d') => Some(Event::UiScrollPageDown),
            Key::Char('q') => Some(Event::Quit),
            Key::Char('c') => Some(Event::KeyboardCtrlC),
            Key::Char('n') => Some(Event::KeyboardCtrlN),
            Key::Char('r') => Some(Event::KeyboardCtrlR),
            Key::Char('p') => Some(Event::KeyboardCtrlP),
            Key::Char('t') => Some(Event::KeyboardCtrlT),
            Key::Char('s') => Some(Event::KeyboardCtrlS),
            Key::Char('o') => Some(Event::KeyboardCtrlO),
            Key::Char('k') => Some(Event::KeyboardCtrlK),
            // Everything else is an editing shortcut of the text area
            _ => Some(Event::KeyboardCharInput(input)),
        };
    }

    match input.key {
        Key::Esc => Some(Event::KeyboardEsc),
        Key::Enter => Some(Event::KeyboardEnter),
        Key::Tab if input.shift => Some(Event::KeyboardBackTab),
        Key::Tab => Some(Event::KeyboardTab),
        Key::Up => Some(Event::UiScrollUp),
        Key::Down => Some(Event::UiScrollDown),
        Key::PageUp => Some(Event::UiScrollPageUp),
        Key::PageDown => Some(Event::UiScrollPageDown),
        Key::MouseScrollUp => Some(Event::UiScrollUp),
        Key::MouseScrollDown => Some(Event::UiScrollDown),
        _ => Some(Event::KeyboardCharInput(input)),
    }
}
