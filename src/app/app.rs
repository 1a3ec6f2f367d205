use std::io;
use std::path::PathBuf;

use crate::config::resolve_path;
use crate::models::{Event, NoticeMessage};
use crate::storage::ImportMode;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use eyre::Result;
use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    layout::{Alignment, Constraint, Layout},
    prelude::{Backend, CrosstermBackend},
    style::Stylize,
    text::Line,
    widgets::Paragraph,
};
use ratatui_macros::span;
use tokio_util::sync::CancellationToken;

use crate::app::{
    controller::{ChatController, SendRejection},
    ui::{
        Answer, Dim, InputBox, InputOutcome, Loading, MessageInput, Notice, Question, SettingsOutcome,
        SettingsScreen, Sidebar, Transcript, help, utils,
    },
};

use super::services::EventService;

const MIN_WIDTH: u16 = 60;
const SIDEBAR_WIDTH: u16 = 28;

/// What the input popup is currently asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompting {
    NewConversation,
    Rename,
    SystemPrompt,
    ImportPath,
}

pub struct App<'a> {
    controller: ChatController,
    events: &'a mut EventService,

    input: MessageInput<'a>,
    sidebar: Sidebar,
    transcript: Transcript,

    input_box: InputBox<'a>,
    prompting: Option<Prompting>,
    question: Question<'a>,
    pending_import: Option<PathBuf>,
    settings: SettingsScreen,

    notice: Notice,
    loading: Loading<'a>,

    cancel_token: CancellationToken,
}

impl<'a> App<'a> {
    pub fn new(
        controller: ChatController,
        events: &'a mut EventService,
        cancel_token: CancellationToken,
    ) -> App<'a> {
        App {
            controller,
            events,
            input: MessageInput::default(),
            sidebar: Sidebar::default(),
            transcript: Transcript::default(),
            input_box: InputBox::default(),
            prompting: None,
            question: Question::default().with_title(" Import "),
            pending_import: None,
            settings: SettingsScreen::default(),
            notice: Notice::default(),
            loading: Loading::new(vec![
                span!("Gemini is thinking... Press ").gray(),
                span!("Ctrl+q").green().bold(),
                span!(" to quit").gray(),
            ]),
            cancel_token,
        }
    }

    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    pub async fn run(&mut self) -> Result<()> {
        let stdout = io::stdout();
        let mut stdout = stdout.lock();

        enable_raw_mode()?;
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;

        let term_backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(term_backend)?;
        let result = self.start_loop(&mut terminal).await;

        self.cancel_token.cancel();

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )?;

        terminal.show_cursor()?;
        result
    }

    async fn start_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            self.render(terminal)?;
            let event = self.events.next().await;
            if self.handle_event(event) {
                return Ok(());
            }
        }
    }

    /// Returns true when the application should stop
    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Quit | Event::KeyboardCtrlC => return true,

            Event::GenerationCompleted(outcome) => {
                if !self.controller.handle_completion(outcome) {
                    log::debug!("Reply dropped, its conversation is gone");
                }
                return false;
            }

            Event::Notice(msg) => {
                self.notice.add_message(msg);
                return false;
            }

            Event::UiTick => {
                self.loading.tick();
                return false;
            }

            _ => {}
        }

        if self.input_box.showing() {
            let outcome = self.input_box.handle_key_event(&event);
            self.handle_input_box(outcome);
            return false;
        }

        if self.question.showing() {
            let answer = self.question.handle_key_event(&event);
            self.handle_import_answer(answer);
            return false;
        }

        if self.settings.showing() {
            if let SettingsOutcome::Applied(params) = self.settings.handle_key_event(&event) {
                self.notice.info(format!("Using {}", params));
                self.controller.set_params(params);
            }
            return false;
        }

        self.handle_input_event(event);
        false
    }

    fn handle_input_event(&mut self, event: Event) {
        match event {
            Event::KeyboardCharInput(c) => {
                if !self.controller.is_waiting() {
                    self.input.input(c);
                }
            }

            Event::KeyboardPaste(text) => {
                if !self.controller.is_waiting() {
                    self.input.paste(&text);
                }
            }

            Event::KeyboardNewLine => {
                if !self.controller.is_waiting() {
                    self.input.new_line();
                }
            }

            Event::KeyboardEnter => self.handle_send(),

            Event::KeyboardTab => self.controller.switch_next(),
            Event::KeyboardBackTab => self.controller.switch_prev(),

            Event::KeyboardCtrlN => self.open_input(
                Prompting::NewConversation,
                "New conversation",
                "Title of the conversation",
                "",
            ),

            Event::KeyboardCtrlR => {
                let Some(title) = self.controller.current().map(|c| c.title().to_string()) else {
                    self.notice.warning("There is no conversation to rename");
                    return;
                };
                self.open_input(Prompting::Rename, "Rename", "New title", &title);
            }

            Event::KeyboardCtrlP => {
                let prompt = self
                    .controller
                    .current()
                    .map(|c| c.system_prompt().to_string())
                    .unwrap_or_default();
                self.open_input(
                    Prompting::SystemPrompt,
                    "System prompt",
                    "Instruction for this conversation, empty for none",
                    &prompt,
                );
            }

            Event::KeyboardCtrlT => self.settings.open(self.controller.params()),

            Event::KeyboardCtrlS => match self.controller.export_current() {
                Ok(path) => self.notice.info(format!("Exported to {}", path.display())),
                Err(err) => {
                    log::error!("Failed to export conversation: {:#}", err);
                    self.notice.error(format!("Export failed: {:#}", err));
                }
            },

            Event::KeyboardCtrlO => {
                let dir = format!("{}/", self.controller.history_dir().display());
                self.open_input(
                    Prompting::ImportPath,
                    "Import",
                    "Path of the conversation file",
                    &dir,
                );
            }

            Event::KeyboardCtrlK => {
                if let Err(err) = self.controller.reload_credential() {
                    log::error!("Failed to reload credential: {:#}", err);
                    self.notice.error(format!("Failed to reload API key: {:#}", err));
                }
            }

            Event::UiScrollDown => self.transcript.scroll.down(),
            Event::UiScrollUp => self.transcript.scroll.up(),
            Event::UiScrollPageDown => self.transcript.scroll.page_down(),
            Event::UiScrollPageUp => self.transcript.scroll.page_up(),
            _ => {}
        }
    }

    fn handle_send(&mut self) {
        let text = self.input.text();
        match self.controller.send(&text) {
            Ok(_) => {
                self.input.clear();
                self.transcript.scroll.last();
            }
            Err(SendRejection::EmptyInput) => {}
            Err(SendRejection::Busy) => self
                .notice
                .warning("Waiting for Gemini to respond, please wait..."),
        }
    }

    fn open_input(&mut self, prompting: Prompting, title: &str, placeholder: &str, text: &str) {
        self.prompting = Some(prompting);
        self.input_box.open(title, placeholder, text);
    }

    fn handle_input_box(&mut self, outcome: InputOutcome) {
        let text = match outcome {
            InputOutcome::Pending => return,
            InputOutcome::Cancelled => {
                self.prompting = None;
                return;
            }
            InputOutcome::Submitted(text) => text,
        };

        match self.prompting.take() {
            Some(Prompting::NewConversation) => {
                if self.controller.new_conversation(&text).is_some() {
                    self.notice.info(format!("Created \"{}\"", text.trim()));
                }
            }

            Some(Prompting::Rename) => match self.controller.rename(&text) {
                Ok(true) => self.notice.info(format!("Renamed to \"{}\"", text.trim())),
                Ok(false) => {}
                Err(err) => log::warn!("Failed to rename: {}", err),
            },

            Some(Prompting::SystemPrompt) => match self.controller.set_system_prompt(&text) {
                Ok(()) if text.trim().is_empty() => self.notice.info("System prompt cleared"),
                Ok(()) => self.notice.info("System prompt updated"),
                Err(err) => log::warn!("Failed to set the system prompt: {}", err),
            },

            Some(Prompting::ImportPath) => {
                let path = text.trim();
                if path.is_empty() {
                    return;
                }
                let path = match resolve_path(path) {
                    Ok(path) => PathBuf::from(path),
                    Err(err) => {
                        self.notice.error(format!("Invalid path: {:#}", err));
                        return;
                    }
                };
                if !path.is_file() {
                    self.notice
                        .error(format!("{} is not a file", path.display()));
                    return;
                }
                self.question.open(Line::from(vec![
                    span!("Replace every conversation in memory with "),
                    span!(path.display().to_string()).bold(),
                    span!("? Answer "),
                    span!("n").bold(),
                    span!(" to append it instead."),
                ]));
                self.pending_import = Some(path);
            }

            None => {}
        }
    }

    fn handle_import_answer(&mut self, answer: Answer) {
        let mode = match answer {
            Answer::Pending => return,
            Answer::Cancelled => {
                self.pending_import = None;
                return;
            }
            Answer::Yes => ImportMode::Replace,
            Answer::No => ImportMode::Append,
        };
        let Some(path) = self.pending_import.take() else {
            return;
        };

        match self.controller.import_file(&path, mode) {
            Ok(_) => {
                let title = self
                    .controller
                    .current()
                    .map(|c| c.title().to_string())
                    .unwrap_or_default();
                self.notice
                    .add_message(NoticeMessage::info(format!("Imported \"{}\"", title)));
            }
            Err(err) => {
                log::error!("Failed to import {}: {}", path.display(), err);
                self.notice.error(format!("Import failed: {}", err));
            }
        }
    }

    fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal.draw(|f| {
            let area = f.area();
            if area.width < MIN_WIDTH {
                f.render_widget(
                    Paragraph::new(utils::split_to_lines(
                        format!(
                            "I'm too small, make me bigger! I need at least {} cells (current: {})",
                            MIN_WIDTH, area.width
                        ),
                        area.width.saturating_sub(2) as usize,
                    ))
                    .alignment(Alignment::Left),
                    area,
                );
                return;
            }

            let [sidebar_area, main_area] =
                Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
                    .areas(area);

            let textarea_len = self.input.height();
            let [prompt_area, transcript_area, input_area, help_area] = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Max(textarea_len),
                Constraint::Length(1),
            ])
            .areas(main_area);

            let sidebar = self.controller.sidebar();
            self.sidebar.render(
                f,
                sidebar_area,
                self.controller.params(),
                &sidebar,
                self.controller.current_id(),
            );

            let convo = self.controller.current();
            self.input
                .set_target(convo.map(|c| c.title()).unwrap_or_default());
            let prompt = convo.map(|c| c.system_prompt()).unwrap_or_default();
            let prompt_line = if prompt.is_empty() {
                Line::from(vec![span!(" System prompt: ").dim(), span!("none").dim().italic()])
            } else {
                Line::from(vec![
                    span!(" System prompt: ").dim(),
                    span!(utils::truncate(prompt, prompt_area.width.saturating_sub(17) as usize)),
                ])
            };
            f.render_widget(prompt_line, prompt_area);

            self.transcript.render(f, transcript_area, convo);

            if self.controller.is_waiting() {
                self.loading.render(f, input_area);
            } else {
                self.input.render(f, input_area);
            }
            help::render_help_line(f, help_area);

            if self.input_box.showing() || self.question.showing() || self.settings.showing() {
                f.dim_bg();
            }
            self.input_box
                .render(f, utils::fixed_popup_area(area, 60, 3));
            self.question.render(f, area);
            self.settings
                .render(f, utils::fixed_popup_area(area, 60, 7));

            self.notice.render(f, utils::notice_area(area, 30));
        })?;
        Ok(())
    }
}
