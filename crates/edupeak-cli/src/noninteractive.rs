use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct JsonOutput<'a> {
    session_id: &'a str,
    title: &'a str,
    responder: &'a str,
    content: &'a str,
    fell_back: bool,
}

pub async fn run(mut app: super::App, prompt: String, output_format: super::OutputFormat) -> Result<()> {
    let outcome = match app.chat.send(&prompt, None).await {
        Ok(outcome) => outcome,
        Err(e) => match output_format {
            super::OutputFormat::Json => {
                let output = serde_json::json!({ "error": e.to_string() });
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }
            super::OutputFormat::Text => return Err(anyhow::anyhow!("{e}")),
        },
    };

    match output_format {
        super::OutputFormat::Text => {
            println!("{}", outcome.reply.content);
        }
        super::OutputFormat::Json => {
            let output = JsonOutput {
                session_id: outcome.session.id(),
                title: outcome.session.title(),
                responder: app.chat.responder_name(),
                content: &outcome.reply.content,
                fell_back: outcome.fell_back,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
