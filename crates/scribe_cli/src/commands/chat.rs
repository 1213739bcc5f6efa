//! `scribe chat`

use anyhow::Result;
use scribe_core::SessionId;
use scribe_engine::{ChatRequest, EngineConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::chat_engine;
use crate::output;

pub async fn handle(
    config: &EngineConfig,
    owner: String,
    session: Option<String>,
    message: String,
    report_context: Option<String>,
) -> Result<()> {
    let engine = chat_engine(config)?;
    let request = ChatRequest {
        owner_id: owner,
        session_id: session.map(SessionId::from),
        message,
        report_context_id: report_context,
    };

    // Ctrl-C aborts generation; nothing is written for an aborted exchange.
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, cancelling chat");
                cancel.cancel();
            }
        })
    };

    let spinner = output::spinner("Thinking");
    let result = engine.chat_with_cancel(request, Some(&cancel)).await;
    output::spinner_done(&spinner);
    watcher.abort();

    let response = result?;
    if output::is_json() {
        output::text_block(&response.text, &response);
        return Ok(());
    }

    println!("{}", response.text);
    println!();
    output::dim(&format!("session {}", response.session_id));
    if let Some(warning) = &response.persistence_warning {
        output::warning(warning);
    }
    Ok(())
}
