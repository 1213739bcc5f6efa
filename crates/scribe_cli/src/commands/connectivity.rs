//! `scribe connectivity`

use anyhow::{bail, Result};
use scribe_engine::EngineConfig;

use super::generation_engine;
use crate::output;

pub async fn handle(config: &EngineConfig) -> Result<()> {
    let engine = generation_engine(config)?;
    let backend = engine.generation().backend_id().to_string();

    let spinner = output::spinner(&format!("Contacting {backend}"));
    let response = engine.test_connectivity().await;
    output::spinner_done(&spinner);

    if output::is_json() {
        output::text_block("", &response);
    }
    if !response.connected {
        bail!("{backend} ({}) is not reachable", config.effective_model());
    }
    if !output::is_json() {
        output::success(&format!("{backend} ({}) is reachable", config.effective_model()));
    }
    Ok(())
}
