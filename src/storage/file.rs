#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::{
    fs::OpenOptions,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Conversation, ConversationFile, PersistenceError};

static ILLEGAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("valid filename regex"));

/// Replaces characters which are not allowed in file names with `_`
pub fn safe_file_stem(title: &str) -> String {
    ILLEGAL_CHARS.replace_all(title, "_").into_owned()
}

/// Writes the conversation as pretty printed JSON into `dir`, named after its
/// title. An existing file is never overwritten: `_1`, `_2`, ... is appended
/// to the name until a free one is found. Returns the written path.
pub fn export_conversation(dir: &Path, convo: &Conversation) -> Result<PathBuf, PersistenceError> {
    std::fs::create_dir_all(dir).map_err(|source| PersistenceError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let payload = serde_json::to_vec_pretty(&ConversationFile::from(convo)).map_err(|source| {
        PersistenceError::Malformed {
            path: dir.to_path_buf(),
            source,
        }
    })?;

    let stem = safe_file_stem(convo.title());
    let mut i = 0;
    loop {
        let name = if i == 0 {
            format!("{stem}.json")
        } else {
            format!("{stem}_{i}.json")
        };
        let path = dir.join(name);

        // create_new fails when the file already exists
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                i += 1;
                continue;
            }
            Err(source) => return Err(PersistenceError::Write { path, source }),
        };

        write_or_remove(file, &path, &payload)?;
        log::info!("Exported conversation {} to {}", convo.id(), path.display());
        return Ok(path);
    }
}

/// Writes `payload` into the freshly created `path`. A partial file is
/// removed so the name stays free for the next export.
fn write_or_remove<W: Write>(mut writer: W, path: &Path, payload: &[u8]) -> Result<(), PersistenceError> {
    let Err(source) = writer.write_all(payload).and_then(|_| writer.flush()) else {
        return Ok(());
    };
    drop(writer);
    if let Err(err) = std::fs::remove_file(path) {
        log::warn!("Failed to remove partial export {}: {}", path.display(), err);
    }
    Err(PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a conversation file. The result carries a fresh id; title
/// collisions are resolved by the store when the record is imported.
pub fn import_conversation(path: &Path) -> Result<Conversation, PersistenceError> {
    let raw = std::fs::read_to_string(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| PersistenceError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    let file = ConversationFile::from_value(&value).ok_or_else(|| PersistenceError::NotAnObject {
        path: path.to_path_buf(),
    })?;

    log::info!(
        "Imported conversation \"{}\" with {} messages from {}",
        file.title,
        file.messages.len(),
        path.display()
    );
    Ok(Conversation::from(file))
}
