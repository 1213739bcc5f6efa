//! `scribe report`, `summary`, `recommendations` and `block`.

use std::path::Path;

use anyhow::Result;
use scribe_engine::{build_fallback_report, Clock, EngineConfig, SystemClock, TextResponse};

use super::{generation_engine, load_event, report_engine};
use crate::output;

pub async fn full(config: &EngineConfig, event: &Path, offline: bool) -> Result<()> {
    let event = load_event(event)?;

    let response = if offline {
        TextResponse {
            text: build_fallback_report(&event, SystemClock.today()),
        }
    } else {
        let engine = report_engine(config);
        let spinner = output::spinner(&format!("Writing report for {}", event.title));
        let response = engine.generate_full_report(&event).await;
        output::spinner_done(&spinner);
        response
    };

    output::text_block(&response.text, &response);
    Ok(())
}

pub async fn summary(config: &EngineConfig, event: &Path) -> Result<()> {
    let event = load_event(event)?;
    let engine = generation_engine(config)?;

    let spinner = output::spinner("Summarizing");
    let result = engine.generate_summary(&event).await;
    output::spinner_done(&spinner);

    let response = result?;
    output::text_block(&response.text, &response);
    Ok(())
}

pub async fn recommendations(config: &EngineConfig, event: &Path) -> Result<()> {
    let event = load_event(event)?;
    let engine = generation_engine(config)?;

    let spinner = output::spinner("Drafting recommendations");
    let result = engine.generate_recommendations(&event).await;
    output::spinner_done(&spinner);

    let response = result?;
    output::text_block(&response.text, &response);
    Ok(())
}

pub async fn block(config: &EngineConfig, block_type: &str, context: &str) -> Result<()> {
    let engine = generation_engine(config)?;

    let spinner = output::spinner(&format!("Drafting {block_type} block"));
    let result = engine.generate_block_content(block_type, context).await;
    output::spinner_done(&spinner);

    let response = result?;
    output::text_block(&response.text, &response);
    Ok(())
}
