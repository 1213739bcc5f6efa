//! `scribe sessions` subcommands.

use anyhow::Result;
use scribe_core::SessionId;
use scribe_engine::EngineConfig;

use super::chat_engine;
use crate::cli::SessionsAction;
use crate::output;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub async fn handle(config: &EngineConfig, action: SessionsAction) -> Result<()> {
    match action {
        SessionsAction::List { owner } => list(config, &owner).await,
        SessionsAction::Show { owner, session } => show(config, &owner, session).await,
        SessionsAction::Delete { owner, session } => delete(config, &owner, session).await,
    }
}

async fn list(config: &EngineConfig, owner: &str) -> Result<()> {
    let engine = chat_engine(config)?;
    let sessions = engine.list_sessions(owner).await?;

    if sessions.is_empty() && !output::is_json() {
        output::dim(&format!("No sessions for {owner}"));
        return Ok(());
    }

    let mut table = output::table(&["Session", "Last message", "Turns", "Updated"]);
    for s in &sessions {
        output::table_row(
            &mut table,
            s.session_id.as_str(),
            &[
                s.last_message_preview.clone(),
                s.message_count.to_string(),
                s.last_timestamp.format(TIME_FORMAT).to_string(),
            ],
        );
    }
    output::table_print(&table, &sessions);
    Ok(())
}

async fn show(config: &EngineConfig, owner: &str, session: String) -> Result<()> {
    let engine = chat_engine(config)?;
    let session_id = SessionId::from(session);
    let history = engine.get_session_history(owner, &session_id).await?;

    if output::is_json() {
        output::text_block("", &history);
        return Ok(());
    }
    if history.is_empty() {
        output::dim(&format!("Session {session_id} has no messages"));
        return Ok(());
    }

    output::header(&format!("Session {session_id}"));
    for entry in &history {
        println!();
        output::kv(
            entry.role.as_str(),
            &entry.timestamp.format(TIME_FORMAT).to_string(),
        );
        println!("{}", entry.content);
    }
    Ok(())
}

async fn delete(config: &EngineConfig, owner: &str, session: String) -> Result<()> {
    let engine = chat_engine(config)?;
    let session_id = SessionId::from(session);
    let response = engine.delete_session(owner, &session_id).await?;

    if output::is_json() {
        output::text_block("", &response);
    } else {
        output::success(&format!(
            "Deleted {} message(s) from session {session_id}",
            response.deleted_count
        ));
    }
    Ok(())
}
