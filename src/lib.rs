pub mod cli;
pub mod math;
pub mod models;
pub mod replay;
pub mod state;
pub mod store;

use cli::Args;
use log::{ error, info };
use models::message::{ MessageRole, ModelConversation };
use models::session::SessionData;
use serde::Serialize;
use std::error::Error;

#[derive(Serialize)]
struct ReplayOutput<'a> {
    session_id: &'a str,
    prompt: &'a str,
    conversations: &'a [ModelConversation],
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Session Store Type: {}", args.store_type);
    if args.store_type == "api" {
        info!("API Base URL: {}", args.api_base_url);
    } else {
        info!("Data Directory: {}", args.data_dir);
    }
    info!("Duplicate Window: {}ms", args.duplicate_window_ms);
    info!("Output Format: {}", args.output_format);
    info!("-------------------------");

    let store = store::initialize_session_store(&args)?;

    if args.list {
        let summaries = store.list_sessions().await?;
        if summaries.is_empty() {
            println!("No saved sessions.");
        }
        for summary in summaries {
            println!("{}  {}", summary.id, summary.title);
        }
        return Ok(());
    }

    let session_id = args.session_id
        .as_deref()
        .ok_or("either --session-id or --list is required")?;

    let session = match store.fetch_session(session_id).await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to load session '{}': {}", session_id, e);
            return Err(Box::new(e));
        }
    };

    let conversations = replay::rebuild_conversations_with_window(
        &session.messages,
        &session.model_ids,
        args.duplicate_window_ms
    );

    match args.output_format.to_lowercase().as_str() {
        "json" => print_json(&session, &conversations)?,
        _ => print_text(&session, &conversations),
    }

    Ok(())
}

fn print_json(
    session: &SessionData,
    conversations: &[ModelConversation]
) -> Result<(), serde_json::Error> {
    let output = ReplayOutput {
        session_id: &session.id,
        prompt: &session.prompt,
        conversations,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(session: &SessionData, conversations: &[ModelConversation]) {
    println!("Session: {}", session.id);
    println!("Prompt: {}", session.prompt);
    for conv in conversations {
        let badge = if conv.errored { " [error]" } else { "" };
        println!("\n=== {}{} ===", conv.model_id, badge);
        if conv.messages.is_empty() {
            println!("(no responses)");
            continue;
        }
        for msg in &conv.messages {
            let speaker = match msg.role {
                MessageRole::User => "You",
                MessageRole::Assistant => conv.model_id.as_str(),
            };
            println!("{}: {}", speaker, msg.content);
        }
    }
}
