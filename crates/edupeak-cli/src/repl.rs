use anyhow::Result;
use edupeak_core::message::ImageRef;
use std::io::{self, Write};
use std::path::Path;

use super::output::{print_greeting, print_message, print_session_list, short_id};

pub async fn run(mut app: super::App) -> Result<()> {
    println!("\x1b[1medupeak\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    println!("Replies: \x1b[36m{}\x1b[0m", app.chat.responder_name());
    println!(
        "Storage: \x1b[36m{:?}\x1b[0m ({})",
        app.config.storage.backend,
        app.config.data_path().display()
    );
    println!("Type \x1b[33m/help\x1b[0m for commands, \x1b[33mCtrl-D\x1b[0m to exit.\n");

    show_current(&app);

    loop {
        eprint!("\x1b[32;1medupeak>\x1b[0m ");
        io::stderr().flush().ok();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                // EOF (Ctrl-D)
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match handle_command(input, &mut app).await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    eprintln!("\x1b[31mCommand error: {e}\x1b[0m");
                    continue;
                }
            }
        }

        send(&mut app, input, None).await;
    }

    Ok(())
}

async fn send(app: &mut super::App, text: &str, image: Option<ImageRef>) {
    eprint!("\x1b[90mThinking...\x1b[0m");
    io::stderr().flush().ok();

    let result = app.chat.send(text, image).await;
    eprint!("\r\x1b[K");

    match result {
        Ok(outcome) => {
            println!();
            print_message(&outcome.reply);
        }
        Err(e) => eprintln!("\x1b[31m{e}\x1b[0m"),
    }
}

fn show_current(app: &super::App) {
    let Some(session) = app.chat.store().current() else {
        return;
    };
    println!("Session: \x1b[90m{}\x1b[0m  {}\n", short_id(session.id()), session.title());
    if session.is_empty() {
        print_greeting();
    } else {
        for message in session.messages() {
            print_message(message);
        }
    }
}

fn resolve(app: &super::App, prefix: &str) -> Result<String> {
    app.chat
        .store()
        .find_by_prefix(prefix)
        .map(|s| s.id().to_string())
        .ok_or_else(|| anyhow::anyhow!("No session matches '{prefix}'"))
}

async fn handle_command(input: &str, app: &mut super::App) -> Result<bool> {
    let (command, arg) = match input.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (input, ""),
    };

    match command {
        "/help" | "/h" => {
            println!("\x1b[1mCommands:\x1b[0m");
            println!("  /help                 Show this help");
            println!("  /new                  Start a new chat");
            println!("  /sessions             List chats");
            println!("  /switch <id>          Switch to a chat (id prefix)");
            println!("  /delete [id]          Delete a chat (default: current)");
            println!("  /rename <title>       Rename the current chat");
            println!("  /history              Show the current chat");
            println!("  /image <path> [text]  Send an image with optional text");
            println!("  /exit                 Exit");
            Ok(true)
        }
        "/exit" | "/quit" | "/q" => {
            println!("Goodbye!");
            Ok(false)
        }
        "/new" | "/n" => {
            app.chat.store_mut().create_session().await;
            show_current(app);
            Ok(true)
        }
        "/sessions" | "/s" => {
            let store = app.chat.store();
            print_session_list(store.sessions(), store.current_id());
            Ok(true)
        }
        "/switch" => {
            if arg.is_empty() {
                anyhow::bail!("Usage: /switch <id-prefix>");
            }
            let id = resolve(app, arg)?;
            app.chat.store_mut().select_session(&id).await;
            show_current(app);
            Ok(true)
        }
        "/delete" => {
            let id = if arg.is_empty() {
                app.chat
                    .store()
                    .current_id()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow::anyhow!("No current session"))?
            } else {
                resolve(app, arg)?
            };
            app.chat.store_mut().delete_session(&id).await;
            println!("Deleted {}.\n", short_id(&id));
            show_current(app);
            Ok(true)
        }
        "/rename" => {
            if arg.is_empty() {
                anyhow::bail!("Usage: /rename <title>");
            }
            let id = app.chat.store_mut().ensure_current().await.id().to_string();
            if let Some(session) = app.chat.store_mut().rename_session(&id, arg).await {
                println!("Renamed to \"{}\".", session.title());
            }
            Ok(true)
        }
        "/history" => {
            show_current(app);
            Ok(true)
        }
        "/image" => {
            let (path, text) = match arg.split_once(char::is_whitespace) {
                Some((path, text)) => (path, text.trim()),
                None => (arg, ""),
            };
            if path.is_empty() {
                anyhow::bail!("Usage: /image <path> [text]");
            }
            let path = Path::new(path);
            if !path.is_file() {
                anyhow::bail!("No such file: {}", path.display());
            }
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow::anyhow!("Not a file path: {}", path.display()))?;
            send(app, text, Some(ImageRef::new(file_name))).await;
            Ok(true)
        }
        _ => {
            eprintln!("Unknown command: {input}. Type /help for available commands.");
            Ok(true)
        }
    }
}
