use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::services::action::generate;
use crate::backend::{ArcBackend, MockBackend};
use crate::config::constants::{DEFAULT_TITLE, HELLO_MESSAGE};
use crate::models::GenerationError;

use super::*;

fn controller() -> (ChatController, UnboundedReceiver<Action>) {
    let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();
    (ChatController::new(action_tx), action_rx)
}

fn next_request(action_rx: &mut UnboundedReceiver<Action>) -> GenerationRequest {
    match action_rx.try_recv().expect("no action was dispatched") {
        Action::Generate(req) => req,
        other => panic!("unexpected action {:?}", other),
    }
}

fn turns(convo: &Conversation) -> Vec<(String, String)> {
    convo.messages().iter().map(<(String, String)>::from).collect()
}

fn reply(conversation_id: &str, text: &str) -> GenerationOutcome {
    GenerationOutcome {
        conversation_id: conversation_id.to_string(),
        result: Ok(text.to_string()),
    }
}

#[test]
fn test_send_rejects_empty_input() {
    let (mut controller, mut action_rx) = controller();

    assert_eq!(controller.send(""), Err(SendRejection::EmptyInput));
    assert_eq!(controller.send("  \n\t"), Err(SendRejection::EmptyInput));

    assert!(controller.store().is_empty());
    assert!(action_rx.try_recv().is_err());
    assert_eq!(controller.state(), &SessionState::Idle);
}

#[test]
fn test_send_creates_placeholder_conversation() {
    let (mut controller, mut action_rx) = controller();

    let id = controller.send(" Hi ").expect("send should succeed");
    assert_eq!(controller.current_id(), Some(id.as_str()));
    assert_eq!(controller.state(), &SessionState::Awaiting(id.clone()));

    let convo = controller.current().unwrap();
    assert_eq!(convo.title(), DEFAULT_TITLE);
    assert_eq!(
        turns(convo),
        vec![
            ("System".to_string(), HELLO_MESSAGE.to_string()),
            ("You".to_string(), "Hi".to_string()),
        ]
    );

    // The request carries everything but the new user turn
    let req = next_request(&mut action_rx);
    assert_eq!(req.conversation_id, id);
    assert_eq!(req.prompt, "Hi");
    assert_eq!(req.history, vec![Message::new_notice(HELLO_MESSAGE)]);
    assert_eq!(req.params, GenerationParams::default());
}

#[test]
fn test_send_refused_while_awaiting() {
    let (mut controller, mut action_rx) = controller();

    let id = controller.send("first").unwrap();
    let _ = next_request(&mut action_rx);

    assert_eq!(controller.send("second"), Err(SendRejection::Busy));
    assert!(action_rx.try_recv().is_err());
    assert_eq!(controller.current().unwrap().user_turns(), 1);

    assert!(controller.handle_completion(reply(&id, "ok")));
    assert_eq!(controller.state(), &SessionState::Idle);
    assert!(controller.send("second").is_ok());
}

#[test]
fn test_create_send_receive() {
    let (mut controller, mut action_rx) = controller();

    let id = controller.new_conversation("Greetings").unwrap();
    controller.send("Hi").unwrap();
    let req = next_request(&mut action_rx);
    assert!(req.history.is_empty());

    assert!(controller.handle_completion(reply(&id, "Hello!")));

    let convo = controller.store().get(&id).unwrap();
    assert_eq!(
        turns(convo),
        vec![
            ("You".to_string(), "Hi".to_string()),
            ("Gemini".to_string(), "Hello!".to_string()),
        ]
    );
    assert_eq!(convo.title(), "Greetings");
}

#[tokio::test]
async fn test_round_trip_through_backend() {
    let mut backend = MockBackend::new();
    backend
        .expect_configure()
        .returning(|_, _| Box::pin(async { true }));
    backend
        .expect_generate()
        .withf(|history, prompt, _, _| history.len() == 2 && prompt == "And you?")
        .returning(|_, _, _, _| Box::pin(async { Ok("Fine, thanks.".to_string()) }));
    let backend: ArcBackend = Arc::new(backend);

    let (mut controller, mut action_rx) = controller();
    let id = controller.new_conversation("Small talk").unwrap();
    controller.send("How are you?").unwrap();
    let _ = next_request(&mut action_rx);
    controller.handle_completion(reply(&id, "Great!"));

    controller.send("And you?").unwrap();
    let outcome = generate(&backend, next_request(&mut action_rx)).await;
    assert!(controller.handle_completion(outcome));

    let convo = controller.current().unwrap();
    assert_eq!(convo.len(), 4);
    assert_eq!(convo.last_message().unwrap().text(), "Fine, thanks.");
}

#[test]
fn test_completion_for_removed_conversation_is_dropped() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let (mut controller, mut action_rx) = controller();

    let id = controller.send("Hi").unwrap();
    let _ = next_request(&mut action_rx);

    // Replacing the collection removes the pending conversation
    let path = controller.export_current_to(dir.path()).unwrap();
    let imported = controller.import_file(&path, ImportMode::Replace).unwrap();
    assert!(!controller.store().contains(&id));

    assert!(!controller.handle_completion(reply(&id, "late")));
    assert_eq!(controller.state(), &SessionState::Idle);
    assert_eq!(controller.store().len(), 1);
    assert_eq!(controller.store().get(&imported).unwrap().len(), 2);
}

#[test]
fn test_error_reply_becomes_assistant_turn() {
    let (mut controller, mut action_rx) = controller();

    let id = controller.send("Hi").unwrap();
    let _ = next_request(&mut action_rx);
    controller.handle_completion(GenerationOutcome {
        conversation_id: id.clone(),
        result: Err(GenerationError::new("quota exceeded")),
    });

    let last = controller.current().unwrap().last_message().unwrap().clone();
    assert_eq!(last.speaker(), &Speaker::Assistant);
    assert_eq!(last.text(), "An error occurred: quota exceeded");
    assert_eq!(controller.state(), &SessionState::Idle);
}

#[test]
fn test_auto_title() {
    let (mut controller, mut action_rx) = controller();

    let id = controller
        .send("Please explain the borrow checker to me in detail")
        .unwrap();
    let _ = next_request(&mut action_rx);
    controller.handle_completion(reply(&id, "Sure"));
    assert_eq!(
        controller.current().unwrap().title(),
        "Please explain the borrow chec"
    );

    // Only the first exchange names the conversation
    controller.send("Another question").unwrap();
    let _ = next_request(&mut action_rx);
    controller.handle_completion(reply(&id, "Sure"));
    assert_eq!(
        controller.current().unwrap().title(),
        "Please explain the borrow chec"
    );
}

#[test]
fn test_auto_title_on_error_reply() {
    let (mut controller, mut action_rx) = controller();

    let id = controller.send("Hello there").unwrap();
    let _ = next_request(&mut action_rx);
    controller.handle_completion(GenerationOutcome {
        conversation_id: id,
        result: Err(GenerationError::new("boom")),
    });
    assert_eq!(controller.current().unwrap().title(), "Hello there");
}

#[test]
fn test_auto_title_keeps_manual_rename() {
    let (mut controller, mut action_rx) = controller();

    controller.ensure_conversation();
    assert_eq!(controller.rename("Trip plans"), Ok(true));
    let id = controller.send("Where should we go?").unwrap();
    let _ = next_request(&mut action_rx);
    controller.handle_completion(reply(&id, "Somewhere warm"));

    assert_eq!(controller.current().unwrap().title(), "Trip plans");
}

#[test]
fn test_new_conversation_with_blank_title_is_cancelled() {
    let (mut controller, _action_rx) = controller();

    assert_eq!(controller.new_conversation("   "), None);
    assert!(controller.store().is_empty());
    assert_eq!(controller.current_id(), None);
}

#[test]
fn test_switch() {
    let (mut controller, _action_rx) = controller();

    let a = controller.new_conversation("a").unwrap();
    let b = controller.new_conversation("b").unwrap();
    let c = controller.new_conversation("c").unwrap();

    let sidebar = controller
        .sidebar()
        .iter()
        .map(|c| c.title().to_string())
        .collect::<Vec<_>>();
    assert_eq!(sidebar, vec!["c", "b", "a"]);
    assert_eq!(controller.current_id(), Some(c.as_str()));

    controller.switch_next();
    assert_eq!(controller.current_id(), Some(b.as_str()));
    controller.switch_next();
    assert_eq!(controller.current_id(), Some(a.as_str()));
    controller.switch_next();
    assert_eq!(controller.current_id(), Some(c.as_str()));
    controller.switch_prev();
    assert_eq!(controller.current_id(), Some(a.as_str()));

    controller.switch(&b).unwrap();
    assert_eq!(controller.current_id(), Some(b.as_str()));
    assert!(controller.switch("missing").is_err());
    assert_eq!(controller.current_id(), Some(b.as_str()));
}

#[test]
fn test_system_prompt_is_sent_with_request() {
    let (mut controller, mut action_rx) = controller();

    controller.new_conversation("French").unwrap();
    controller.set_system_prompt("  Answer in French ").unwrap();
    assert_eq!(
        controller.current().unwrap().system_prompt(),
        "Answer in French"
    );

    controller.send("Hi").unwrap();
    let req = next_request(&mut action_rx);
    assert_eq!(req.system_instruction, "Answer in French");
}

#[test]
fn test_generation_params() {
    let (mut controller, mut action_rx) = controller();

    assert!(controller.set_model("gemini-2.5-pro"));
    assert!(!controller.set_model("gpt-4"));
    controller.set_temperature(1.7);
    controller.set_top_p(-0.2);

    assert_eq!(controller.params().model(), "gemini-2.5-pro");
    assert_eq!(controller.params().temperature(), 1.0);
    assert_eq!(controller.params().top_p(), 0.0);

    controller.send("Hi").unwrap();
    let req = next_request(&mut action_rx);
    assert_eq!(req.params.model(), "gemini-2.5-pro");
    assert_eq!(req.params.temperature(), 1.0);
}

#[test]
fn test_export_and_import_append() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let (controller, _action_rx) = controller();
    let mut controller = controller.with_history_dir(dir.path());

    assert!(controller.export_current().is_err());

    controller.new_conversation("Notes").unwrap();
    controller.set_system_prompt("Be terse").unwrap();
    let path = controller.export_current().unwrap();
    assert_eq!(path, dir.path().join("Notes.json"));

    let id = controller.import_file(&path, ImportMode::Append).unwrap();
    assert_eq!(controller.store().len(), 2);
    assert_eq!(controller.current_id(), Some(id.as_str()));

    let imported = controller.current().unwrap();
    assert_eq!(imported.title(), "Notes_1");
    assert_eq!(imported.system_prompt(), "Be terse");
}

#[test]
fn test_failed_import_leaves_collection_untouched() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let (mut controller, _action_rx) = controller();

    let id = controller.new_conversation("Keep me").unwrap();
    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "not json").unwrap();

    assert!(controller.import_file(&broken, ImportMode::Replace).is_err());
    assert_eq!(controller.store().len(), 1);
    assert_eq!(controller.current_id(), Some(id.as_str()));
}

#[test]
fn test_reload_credential() {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let controller = ChatController::new(action_tx).with_credential_path("/etc/gemchat/api.txt");

    controller.reload_credential().unwrap();
    match action_rx.try_recv().unwrap() {
        Action::ReloadCredential(path) => assert_eq!(path, "/etc/gemchat/api.txt"),
        other => panic!("unexpected action {:?}", other),
    }

    drop(action_rx);
    assert!(controller.reload_credential().is_err());
}
