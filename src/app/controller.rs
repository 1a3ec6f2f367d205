#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;

use std::path::{Path, PathBuf};

use eyre::{Context, Result, bail};
use tokio::sync::mpsc;

use crate::{
    config::constants::{CREDENTIAL_FILE_PATH, ERROR_PREFIX, HISTORY_DIR},
    models::{
        Action, Conversation, GenerationOutcome, GenerationParams, GenerationRequest, Message,
        NotFoundError, PersistenceError, Speaker,
    },
    storage::{ConversationStore, ImportMode, export_conversation, import_conversation},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// A reply is pending for the conversation with this id
    Awaiting(String),
}

/// Why a message was not sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    EmptyInput,
    Busy,
}

/// Owns every conversation and the generation settings. Remote calls are
/// handed to the action service and their results come back through
/// [`ChatController::handle_completion`].
pub struct ChatController {
    store: ConversationStore,
    current: Option<String>,
    params: GenerationParams,
    state: SessionState,
    action_tx: mpsc::UnboundedSender<Action>,
    history_dir: PathBuf,
    credential_path: String,
}

impl ChatController {
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            store: ConversationStore::default(),
            current: None,
            params: GenerationParams::default(),
            state: SessionState::Idle,
            action_tx,
            history_dir: PathBuf::from(HISTORY_DIR),
            credential_path: CREDENTIAL_FILE_PATH.to_string(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = dir.into();
        self
    }

    pub fn with_credential_path(mut self, path: &str) -> Self {
        self.credential_path = path.to_string();
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.state, SessionState::Awaiting(_))
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn history_dir(&self) -> &Path {
        &self.history_dir
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.current.as_deref().and_then(|id| self.store.get(id))
    }

    /// Conversations as shown in the sidebar, the most recent one first
    pub fn sidebar(&self) -> Vec<&Conversation> {
        self.store
            .list_ordered()
            .iter()
            .rev()
            .filter_map(|id| self.store.get(id))
            .collect()
    }

    /// Makes sure there is a conversation to talk in, creating the
    /// placeholder `New Chat` when needed. Returns its id.
    pub fn ensure_conversation(&mut self) -> String {
        if let Some(id) = self.current.as_ref().filter(|id| self.store.contains(id)) {
            return id.clone();
        }
        let id = self.store.insert(Conversation::new_hello());
        log::debug!("Created placeholder conversation {}", id);
        self.current = Some(id.clone());
        id
    }

    /// Appends the user turn and dispatches the request. Returns the id of
    /// the conversation the reply will land in.
    pub fn send(&mut self, text: &str) -> Result<String, SendRejection> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendRejection::EmptyInput);
        }
        if self.is_waiting() {
            log::debug!("A reply is still pending, refusing to send");
            return Err(SendRejection::Busy);
        }

        let id = self.ensure_conversation();
        let Ok(convo) = self.store.get_mut(&id) else {
            return Err(SendRejection::Busy);
        };

        let history = convo.messages().to_vec();
        convo.append_message(Message::new_user(text));

        let req = GenerationRequest {
            conversation_id: id.clone(),
            history,
            prompt: text.to_string(),
            system_instruction: convo.system_prompt().to_string(),
            params: self.params.clone(),
        };

        if let Err(err) = self.action_tx.send(Action::Generate(req)) {
            log::error!("Failed to dispatch generation request: {}", err);
            self.append_reply(&id, Err(format!("{}", err)));
            return Ok(id);
        }

        self.state = SessionState::Awaiting(id.clone());
        Ok(id)
    }

    /// Applies a finished request. Returns false when the conversation was
    /// removed in the meantime and the reply has been dropped.
    pub fn handle_completion(&mut self, outcome: GenerationOutcome) -> bool {
        self.state = SessionState::Idle;

        let GenerationOutcome {
            conversation_id,
            result,
        } = outcome;
        if !self.store.contains(&conversation_id) {
            log::debug!(
                "Dropping reply for vanished conversation {}",
                conversation_id
            );
            return false;
        }

        self.append_reply(&conversation_id, result.map_err(|err| err.message));
        true
    }

    fn append_reply(&mut self, id: &str, result: Result<String, String>) {
        let Ok(convo) = self.store.get_mut(id) else {
            return;
        };
        let text = match result {
            Ok(text) => text,
            Err(message) => format!("{}{}", ERROR_PREFIX, message),
        };
        convo.append_message(Message::new(Speaker::Assistant, text));
        if convo.derive_title() {
            log::debug!("Conversation {} titled {}", id, convo.title());
        }
    }

    /// Creates an empty conversation and makes it current. A blank title
    /// cancels the operation.
    pub fn new_conversation(&mut self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let id = self.store.create(title);
        self.current = Some(id.clone());
        Some(id)
    }

    pub fn rename(&mut self, title: &str) -> Result<bool, NotFoundError> {
        let Some(id) = self.current.clone() else {
            return Ok(false);
        };
        self.store.rename(&id, title)
    }

    pub fn switch(&mut self, id: &str) -> Result<(), NotFoundError> {
        if !self.store.contains(id) {
            return Err(NotFoundError(id.to_string()));
        }
        self.current = Some(id.to_string());
        Ok(())
    }

    /// Moves down the sidebar, wrapping around
    pub fn switch_next(&mut self) {
        self.switch_by(1);
    }

    /// Moves up the sidebar, wrapping around
    pub fn switch_prev(&mut self) {
        self.switch_by(-1);
    }

    fn switch_by(&mut self, offset: isize) {
        let ids = self
            .sidebar()
            .iter()
            .map(|c| c.id().to_string())
            .collect::<Vec<_>>();
        if ids.is_empty() {
            return;
        }
        let len = ids.len() as isize;
        // Without a current conversation, next lands on the first entry and
        // prev on the last one
        let pos = match self
            .current
            .as_ref()
            .and_then(|current| ids.iter().position(|id| id == current))
        {
            Some(pos) => pos as isize,
            None if offset > 0 => -1,
            None => 0,
        };
        let next = (pos + offset).rem_euclid(len) as usize;
        self.current = Some(ids[next].clone());
    }

    pub fn set_system_prompt(&mut self, prompt: &str) -> Result<(), NotFoundError> {
        let id = self.ensure_conversation();
        self.store.set_system_prompt(&id, prompt.trim())
    }

    pub fn set_model(&mut self, model: &str) -> bool {
        let ok = self.params.set_model(model);
        if !ok {
            log::warn!("Model {} is not allowed", model);
        }
        ok
    }

    pub fn set_temperature(&mut self, value: f32) {
        self.params.set_temperature(value);
    }

    pub fn set_top_p(&mut self, value: f32) {
        self.params.set_top_p(value);
    }

    pub fn set_params(&mut self, params: GenerationParams) {
        self.params = params;
    }

    /// Writes the current conversation into the history directory
    pub fn export_current(&self) -> Result<PathBuf> {
        self.export_current_to(&self.history_dir)
    }

    pub fn export_current_to(&self, dir: &Path) -> Result<PathBuf> {
        let Some(convo) = self.current() else {
            bail!("there is no conversation to export");
        };
        export_conversation(dir, convo).wrap_err("exporting conversation")
    }

    /// Loads a conversation file and makes it current. On failure the
    /// collection is left untouched.
    pub fn import_file(&mut self, path: &Path, mode: ImportMode) -> Result<String, PersistenceError> {
        let convo = import_conversation(path)?;
        let id = self.store.import(convo, mode);
        self.current = Some(id.clone());
        Ok(id)
    }

    /// Asks the action service to read the credential file again
    pub fn reload_credential(&self) -> Result<()> {
        self.action_tx
            .send(Action::ReloadCredential(self.credential_path.clone()))
            .wrap_err("sending reload request")?;
        Ok(())
    }
}
