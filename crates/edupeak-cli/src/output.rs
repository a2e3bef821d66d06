use chrono::Local;
use edupeak_core::message::{Message, MessageRole};
use edupeak_core::session::ChatSession;

/// Short id shown in listings.
pub fn short_id(id: &str) -> &str {
    let end = id.char_indices().nth(8).map(|(i, _)| i).unwrap_or(id.len());
    &id[..end]
}

pub fn print_message(message: &Message) {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    let (label, color) = match message.role {
        MessageRole::User => ("you", "32"),
        MessageRole::Assistant => ("cortex", "36"),
    };
    println!("\x1b[90m{time}\x1b[0m \x1b[{color};1m{label}\x1b[0m");
    if let Some(image) = &message.image {
        println!("\x1b[90m[image: {}]\x1b[0m", image.file_name);
    }
    if !message.content.is_empty() {
        println!("{}", message.content);
    }
    println!();
}

pub fn print_session_list(sessions: &[ChatSession], current_id: Option<&str>) {
    for s in sessions {
        let marker = if Some(s.id()) == current_id { " *" } else { "" };
        let updated = s.updated_at().with_timezone(&Local).format("%Y-%m-%d %H:%M");
        println!(
            "  \x1b[90m{}\x1b[0m  {}{}  ({} msgs, {})",
            short_id(s.id()),
            s.title(),
            marker,
            s.message_count(),
            updated
        );
        if let Some(preview) = s.preview() {
            println!("            \x1b[90m{preview}\x1b[0m");
        }
    }
}

pub fn print_greeting() {
    println!("\x1b[36;1mcortex\x1b[0m");
    println!("{}\n", edupeak_chat::GREETING);
}
