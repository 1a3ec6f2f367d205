#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::collections::{HashMap, HashSet};

use crate::models::{Conversation, Message, NotFoundError, Speaker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Drop every conversation in memory and keep only the imported one
    Replace,
    /// Keep existing conversations next to the imported one
    Append,
}

/// In-memory collection of conversations, iterated in insertion order.
#[derive(Debug, Default)]
pub struct ConversationStore {
    order: Vec<String>,
    conversations: HashMap<String, Conversation>,
}

impl ConversationStore {
    pub fn create(&mut self, title: impl Into<String>) -> String {
        self.insert(Conversation::new(title))
    }

    /// Inserts a conversation built by the caller. A conversation without
    /// an id, or with an id already in use, receives a fresh one.
    pub fn insert(&mut self, mut conversation: Conversation) -> String {
        if conversation.id().is_empty() || self.contains(conversation.id()) {
            conversation.set_id(uuid::Uuid::new_v4().to_string());
        }
        let id = conversation.id().to_string();
        self.order.push(id.clone());
        self.conversations.insert(id.clone(), conversation);
        id
    }

    pub fn append(
        &mut self,
        id: &str,
        speaker: Speaker,
        text: impl Into<String>,
    ) -> Result<(), NotFoundError> {
        self.get_mut(id)?.append_message(Message::new(speaker, text));
        Ok(())
    }

    /// Renames the conversation. Blank titles and unchanged titles are
    /// ignored. Returns true if the title was updated.
    pub fn rename(&mut self, id: &str, title: &str) -> Result<bool, NotFoundError> {
        let conversation = self.get_mut(id)?;
        let title = title.trim();
        if title.is_empty() || title == conversation.title() {
            return Ok(false);
        }
        conversation.set_title(title);
        Ok(true)
    }

    pub fn set_system_prompt(&mut self, id: &str, prompt: &str) -> Result<(), NotFoundError> {
        self.get_mut(id)?.set_system_prompt(prompt);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Conversation, NotFoundError> {
        self.conversations
            .get_mut(id)
            .ok_or_else(|| NotFoundError(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.conversations.contains_key(id)
    }

    /// Conversation ids in insertion order, the most recent one last
    pub fn list_ordered(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.order.iter().filter_map(|id| self.conversations.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.conversations.clear();
    }

    /// Adds an imported conversation. Its title is suffixed with `_1`,
    /// `_2`, ... until it no longer collides with a title in memory.
    pub fn import(&mut self, mut conversation: Conversation, mode: ImportMode) -> String {
        if mode == ImportMode::Replace {
            self.clear();
        }

        let titles = self
            .conversations
            .values()
            .map(|c| c.title())
            .collect::<HashSet<_>>();
        let title = unique_name(conversation.title(), |candidate| titles.contains(candidate));
        if title != conversation.title() {
            log::debug!(
                "Imported title {} collides, renamed to {}",
                conversation.title(),
                title
            );
            conversation.set_title(title);
        }

        conversation.set_id("");
        self.insert(conversation)
    }
}

/// Returns `base` if it is free, otherwise the first free `base_N`
pub(crate) fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut i = 1;
    loop {
        let candidate = format!("{base}_{i}");
        if !taken(&candidate) {
            return candidate;
        }
        i += 1;
    }
}
