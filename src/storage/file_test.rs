use crate::models::{Message, Speaker};

use super::*;

fn sample_conversation(title: &str) -> Conversation {
    Conversation::new(title)
        .with_messages(vec![
            Message::new_notice("Hello!"),
            Message::new_user("Hi\nthere"),
            Message::new_assistant("Hello, \"friend\" 👋"),
            Message::new(Speaker::Other("Narrator".to_string()), "…"),
        ])
        .with_system_prompt("Speak like a pirate")
}

#[test]
fn test_safe_file_stem() {
    assert_eq!(safe_file_stem("plain title"), "plain title");
    assert_eq!(
        safe_file_stem(r#"a\b/c:d*e?f"g<h>i|j"#),
        "a_b_c_d_e_f_g_h_i_j"
    );
    assert_eq!(safe_file_stem("旅行计划"), "旅行计划");

    let stem = safe_file_stem(r#"\/:*?"<>|"#);
    assert!(!stem.contains(['\\', '/', ':', '*', '?', '"', '<', '>', '|']));
}

#[test]
fn test_export_import_round_trip() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let convo = sample_conversation("Pirate talk");

    let path = export_conversation(dir.path(), &convo).expect("failed to export");
    assert_eq!(path, dir.path().join("Pirate talk.json"));

    let imported = import_conversation(&path).expect("failed to import");
    assert_eq!(imported.title(), convo.title());
    assert_eq!(imported.messages(), convo.messages());
    assert_eq!(imported.system_prompt(), convo.system_prompt());
    assert_ne!(imported.id(), convo.id());
}

#[test]
fn test_export_never_overwrites() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let first = sample_conversation("Same");
    let second = Conversation::new("Same").with_messages(vec![Message::new_user("other")]);

    let first_path = export_conversation(dir.path(), &first).expect("failed to export");
    let second_path = export_conversation(dir.path(), &second).expect("failed to export");
    let third_path = export_conversation(dir.path(), &second).expect("failed to export");

    assert_eq!(first_path, dir.path().join("Same.json"));
    assert_eq!(second_path, dir.path().join("Same_1.json"));
    assert_eq!(third_path, dir.path().join("Same_2.json"));

    let first_back = import_conversation(&first_path).unwrap();
    assert_eq!(first_back.messages(), first.messages());
    let second_back = import_conversation(&second_path).unwrap();
    assert_eq!(second_back.messages(), second.messages());
}

#[test]
fn test_export_sanitizes_file_name() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let convo = sample_conversation("What is 1/2? <math>");

    let path = export_conversation(&dir.path().join("nested"), &convo).expect("failed to export");
    assert_eq!(path.parent().unwrap(), dir.path().join("nested"));
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "What is 1_2_ _math_.json"
    );

    // The title itself is kept as is inside the file
    let imported = import_conversation(&path).unwrap();
    assert_eq!(imported.title(), "What is 1/2? <math>");
}

#[test]
fn test_import_fixture() {
    let convo = import_conversation(Path::new("./testdata/conversation.json"))
        .expect("failed to import fixture");

    assert_eq!(convo.title(), "Weekend trip");
    assert_eq!(convo.system_prompt(), "You are a travel agent.");
    assert_eq!(convo.len(), 3);
    assert_eq!(convo.messages()[0].speaker(), &Speaker::Notice);
    assert_eq!(convo.messages()[1].speaker(), &Speaker::User);
    assert_eq!(convo.messages()[2].speaker(), &Speaker::Assistant);
    assert_eq!(convo.messages()[2].text(), "How about the mountains?");
}

#[test]
fn test_import_tolerates_missing_fields() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{"title": "Partial", "messages": null}"#).unwrap();

    let convo = import_conversation(&path).expect("failed to import");
    assert_eq!(convo.title(), "Partial");
    assert!(convo.is_empty());
    assert_eq!(convo.system_prompt(), "");
}

#[test]
fn test_import_errors() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        import_conversation(&missing),
        Err(PersistenceError::Read { .. })
    ));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(
        import_conversation(&broken),
        Err(PersistenceError::Malformed { .. })
    ));

    let list = dir.path().join("list.json");
    std::fs::write(&list, r#"[["You", "Hi"]]"#).unwrap();
    assert!(matches!(
        import_conversation(&list),
        Err(PersistenceError::NotAnObject { .. })
    ));
}

#[test]
fn test_round_trip_keeps_padded_title() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut store = crate::storage::ConversationStore::default();
    let id = store.create("  spaced  ");

    let path = export_conversation(dir.path(), store.get(&id).unwrap()).expect("failed to export");
    let imported = import_conversation(&path).expect("failed to import");
    assert_eq!(imported.title(), "  spaced  ");
}

struct BrokenWriter;

impl Write for BrokenWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("disk full"))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_failed_write_removes_partial_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("Notes.json");
    std::fs::write(&path, "{").unwrap();

    let err = write_or_remove(BrokenWriter, &path, b"{}").unwrap_err();
    assert!(matches!(err, PersistenceError::Write { .. }));
    assert!(!path.exists());

    // The name is free again for the next export
    let convo = sample_conversation("Notes");
    let exported = export_conversation(dir.path(), &convo).expect("failed to export");
    assert_eq!(exported, path);
}
