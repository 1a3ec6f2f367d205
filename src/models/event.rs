use std::sync::Arc;

use tokio::sync::mpsc;
use tui_textarea::Input;

use super::{GenerationOutcome, NoticeMessage};

#[derive(Debug)]
pub enum Event {
    Notice(NoticeMessage),

    GenerationCompleted(GenerationOutcome),

    KeyboardCharInput(Input),
    KeyboardEsc,
    KeyboardEnter,
    KeyboardNewLine,
    KeyboardTab,
    KeyboardBackTab,
    KeyboardCtrlC,
    KeyboardCtrlN,
    KeyboardCtrlR,
    KeyboardCtrlP,
    KeyboardCtrlT,
    KeyboardCtrlS,
    KeyboardCtrlO,
    KeyboardCtrlK,
    KeyboardPaste(String),

    Quit,

    UiTick,
    UiScrollUp,
    UiScrollDown,
    UiScrollPageUp,
    UiScrollPageDown,
}

#[async_trait::async_trait]
pub trait EventTx {
    async fn send(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>>;
}

#[async_trait::async_trait]
impl EventTx for mpsc::Sender<Event> {
    async fn send(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>> {
        self.send(event).await
    }
}

#[async_trait::async_trait]
impl EventTx for mpsc::UnboundedSender<Event> {
    async fn send(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>> {
        self.send(event)
    }
}

pub type ArcEventTx = Arc<dyn EventTx + Send + Sync>;
