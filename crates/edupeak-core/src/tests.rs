use super::collection::*;
use super::message::*;
use super::responder::*;
use super::session::*;

#[test]
fn test_message_creation() {
    let msg = Message::new_user("Hello world");
    assert_eq!(msg.role, MessageRole::User);
    assert_eq!(msg.content, "Hello world");
    assert!(msg.image.is_none());
    assert!(!msg.id.is_empty());

    let reply = Message::new_assistant("Hi!");
    assert!(reply.is_assistant());
    assert_ne!(msg.id, reply.id);
}

#[test]
fn test_image_ref_media_type() {
    assert_eq!(ImageRef::new("graph.PNG").media_type.as_deref(), Some("image/png"));
    assert_eq!(ImageRef::new("notes.jpeg").media_type.as_deref(), Some("image/jpeg"));
    assert!(ImageRef::new("README").media_type.is_none());
}

#[test]
fn test_truncate_with_ellipsis() {
    assert_eq!(truncate_with_ellipsis("short", 30), "short");
    assert_eq!(
        truncate_with_ellipsis("exactly thirty characters long", 30),
        "exactly thirty characters long"
    );
    assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
    // Multi-byte characters count as one each
    assert_eq!(
        truncate_with_ellipsis("\u{00CC}b\u{00E9}\u{00E8}\u{00E8}r\u{00E8}", 3),
        "\u{00CC}b\u{00E9}..."
    );
}

#[test]
fn test_new_session_defaults() {
    let mut sessions = SessionCollection::new();
    let session = sessions.create_session().clone();
    assert_eq!(session.title(), DEFAULT_TITLE);
    assert_eq!(session.title(), "New Chat");
    assert_eq!(session.message_count(), 0);
    assert!(session.preview().is_none());
    assert_eq!(sessions.current_id(), Some(session.id()));
}

#[test]
fn test_title_derived_from_first_user_message() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();

    let session = sessions
        .append_message(
            &id,
            Message::new_user("Explain opportunity cost in 40+ characters of text"),
        )
        .unwrap();

    assert_eq!(session.title(), "Explain opportunity cost in 40...");
    assert_eq!(session.message_count(), 1);
}

#[test]
fn test_short_first_message_title_kept_whole() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();
    let session = sessions
        .append_message(&id, Message::new_user("  Photosynthesis?  "))
        .unwrap();
    assert_eq!(session.title(), "Photosynthesis?");
}

#[test]
fn test_title_changes_only_once() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();

    sessions.append_message(&id, Message::new_assistant("Welcome back!"));
    assert_eq!(sessions.get(&id).unwrap().title(), DEFAULT_TITLE);

    sessions.append_message(&id, Message::new_user("First question"));
    sessions.append_message(&id, Message::new_assistant("An answer"));
    sessions.append_message(&id, Message::new_user("Second question, much longer"));
    assert_eq!(sessions.get(&id).unwrap().title(), "First question");
}

#[test]
fn test_no_auto_title_after_manual_rename_to_default() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();
    sessions.append_message(&id, Message::new_user("Calculus help"));
    sessions.rename(&id, DEFAULT_TITLE).unwrap();

    sessions.append_message(&id, Message::new_user("Another question"));
    assert_eq!(sessions.get(&id).unwrap().title(), DEFAULT_TITLE);
}

#[test]
fn test_blank_first_message_keeps_default_title() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();
    let session = sessions
        .append_message(
            &id,
            Message::new_user_with_image("   ", ImageRef::new("chart.png")),
        )
        .unwrap();
    assert_eq!(session.title(), DEFAULT_TITLE);
}

#[test]
fn test_first_text_message_titles_after_image_only_start() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();
    sessions.append_message(&id, Message::new_user_with_image("", ImageRef::new("graph.png")));
    sessions.append_message(&id, Message::new_assistant("The image shows a line graph."));

    let session = sessions
        .append_message(&id, Message::new_user("What does this graph say about demand?"))
        .unwrap();
    assert_eq!(session.title(), "What does this graph say about...");

    let session = sessions
        .append_message(&id, Message::new_user("And supply?"))
        .unwrap();
    assert_eq!(session.title(), "What does this graph say about...");
}

#[test]
fn test_append_preserves_order() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();

    let msgs: Vec<Message> = (0..10)
        .map(|i| {
            if i % 2 == 0 {
                Message::new_user(format!("question {i}"))
            } else {
                Message::new_assistant(format!("answer {i}"))
            }
        })
        .collect();
    for m in &msgs {
        sessions.append_message(&id, m.clone());
    }

    let stored = sessions.get(&id).unwrap().messages();
    assert_eq!(stored, msgs.as_slice());
}

#[test]
fn test_append_to_unknown_session_is_noop() {
    let mut sessions = SessionCollection::new();
    sessions.create_session();
    let before = sessions.clone();
    assert!(sessions
        .append_message("missing", Message::new_user("hi"))
        .is_none());
    assert_eq!(sessions, before);
}

#[test]
fn test_create_inserts_at_front() {
    let mut sessions = SessionCollection::new();
    let first = sessions.create_session().id().to_string();
    let second = sessions.create_session().id().to_string();

    assert_eq!(sessions.sessions()[0].id(), second);
    assert_eq!(sessions.sessions()[1].id(), first);
    assert_eq!(sessions.current_id(), Some(second.as_str()));
}

#[test]
fn test_select_unknown_is_noop() {
    let mut sessions = SessionCollection::new();
    let a = sessions.create_session().id().to_string();
    let b = sessions.create_session().id().to_string();

    assert!(!sessions.select("nope"));
    assert_eq!(sessions.current_id(), Some(b.as_str()));

    assert!(sessions.select(&a));
    assert_eq!(sessions.current_id(), Some(a.as_str()));
}

#[test]
fn test_delete_current_moves_to_other_session() {
    let mut sessions = SessionCollection::new();
    let x = sessions.create_session().id().to_string();
    let s = sessions.create_session().id().to_string();
    sessions.append_message(&s, Message::new_user("A"));
    sessions.append_message(&s, Message::new_assistant("B"));
    assert_eq!(sessions.current_id(), Some(s.as_str()));

    let deletion = sessions.delete(&s).unwrap();
    assert_eq!(deletion.removed.message_count(), 2);
    assert!(deletion.current_changed);
    assert!(deletion.replacement.is_none());
    assert_eq!(sessions.current_id(), Some(x.as_str()));
    assert_eq!(sessions.len(), 1);
}

#[test]
fn test_delete_non_current_keeps_current() {
    let mut sessions = SessionCollection::new();
    let a = sessions.create_session().id().to_string();
    let b = sessions.create_session().id().to_string();

    let deletion = sessions.delete(&a).unwrap();
    assert!(!deletion.current_changed);
    assert_eq!(sessions.current_id(), Some(b.as_str()));
}

#[test]
fn test_delete_last_session_creates_replacement() {
    let mut sessions = SessionCollection::new();
    let only = sessions.create_session().id().to_string();

    let deletion = sessions.delete(&only).unwrap();
    let replacement = deletion.replacement.expect("replacement session");
    assert_ne!(replacement, only);
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions.current_id(), Some(replacement.as_str()));
    assert_eq!(sessions.current().unwrap().title(), DEFAULT_TITLE);
}

#[test]
fn test_delete_unknown_is_noop() {
    let mut sessions = SessionCollection::new();
    sessions.create_session();
    let before = sessions.clone();
    assert!(sessions.delete("missing").is_none());
    assert_eq!(sessions, before);
}

#[test]
fn test_never_empty_across_create_delete_sequences() {
    let mut sessions = SessionCollection::new();
    sessions.ensure_session();

    // Deterministic mix of creates and deletes of current / oldest sessions
    for step in 0..60u32 {
        match step % 5 {
            0 | 3 => {
                sessions.create_session();
            }
            1 => {
                let id = sessions.current_id().unwrap().to_string();
                sessions.delete(&id);
            }
            2 => {
                let id = sessions.sessions().last().unwrap().id().to_string();
                sessions.delete(&id);
            }
            _ => {
                let ids: Vec<String> =
                    sessions.sessions().iter().map(|s| s.id().to_string()).collect();
                for id in ids {
                    sessions.delete(&id);
                }
            }
        }

        assert!(!sessions.is_empty(), "empty after step {step}");
        let current = sessions.current_id().expect("current id");
        assert!(sessions.contains(current), "dangling current after step {step}");
    }
}

#[test]
fn test_from_parts_repairs_stale_current() {
    let a = ChatSession::new();
    let b = ChatSession::new();
    let a_id = a.id().to_string();
    let b_id = b.id().to_string();

    let sessions = SessionCollection::from_parts(vec![a.clone(), b.clone()], Some("gone".into()));
    assert_eq!(sessions.current_id(), Some(a_id.as_str()));

    let sessions = SessionCollection::from_parts(vec![a, b], Some(b_id.clone()));
    assert_eq!(sessions.current_id(), Some(b_id.as_str()));

    let empty = SessionCollection::from_parts(vec![], Some("gone".into()));
    assert!(empty.current_id().is_none());
}

#[test]
fn test_ensure_session_only_when_empty() {
    let mut sessions = SessionCollection::new();
    let created = sessions.ensure_session();
    assert!(created.is_some());
    assert!(sessions.ensure_session().is_none());
    assert_eq!(sessions.len(), 1);
}

#[test]
fn test_find_by_prefix() {
    let mut sessions = SessionCollection::new();
    let a = sessions.create_session().id().to_string();
    let b = sessions.create_session().id().to_string();

    assert_eq!(sessions.find_by_prefix(&a).unwrap().id(), a);
    assert!(sessions.find_by_prefix("").is_none());

    let common = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count();
    if common > 0 {
        assert!(sessions.find_by_prefix(&a[..common]).is_none());
    }
    assert_eq!(sessions.find_by_prefix(&b[..common + 1]).unwrap().id(), b);
}

#[test]
fn test_rename() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();

    assert!(sessions.rename(&id, "   ").is_none());
    assert!(sessions.rename("missing", "Title").is_none());
    assert_eq!(sessions.rename(&id, " Algebra ").unwrap().title(), "Algebra");
    assert!(sessions.rename(&id, "Algebra").is_none());
}

#[test]
fn test_preview_uses_first_user_message() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();
    sessions.append_message(&id, Message::new_assistant("Hello!"));
    sessions.append_message(
        &id,
        Message::new_user("Tell me about Nigeria's path to independence in 1960"),
    );

    assert_eq!(
        sessions.get(&id).unwrap().preview().as_deref(),
        Some("Tell me about Nigeria's path t...")
    );
}

#[test]
fn test_response_request_lookback() {
    let mut sessions = SessionCollection::new();
    let id = sessions.create_session().id().to_string();
    sessions.append_message(&id, Message::new_user("What is inflation?"));
    sessions.append_message(&id, Message::new_assistant("Inflation is rising prices."));
    let latest = Message::new_user("explain simpler");
    let session = sessions.append_message(&id, latest.clone()).unwrap();

    let request = ResponseRequest::from_session(session, &latest);
    assert_eq!(request.text, "explain simpler");
    assert_eq!(
        request.previous_reply.as_deref(),
        Some("Inflation is rising prices.")
    );
}

#[test]
fn test_message_serialization_shape() {
    let msg = Message::new_user_with_image("look", ImageRef::new("diagram.png"));
    let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["role"], "user");
    assert_eq!(json["image"]["fileName"], "diagram.png");
    assert!(json["timestamp"].is_string());

    let plain = serde_json::to_value(Message::new_assistant("ok")).unwrap();
    assert!(plain.get("image").is_none());
}
