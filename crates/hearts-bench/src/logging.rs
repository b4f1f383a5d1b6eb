use std::fs::{self, File};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::ResolvedOutputs;

/// Installs a JSON subscriber writing to `outputs.events`. `RUST_LOG`, when
/// set, takes precedence over `level`. Keep the guard alive for the run.
pub fn init_logging(level: Option<Level>, outputs: &ResolvedOutputs) -> Result<Option<WorkerGuard>> {
    let Some(level) = level else {
        return Ok(None);
    };

    fs::create_dir_all(&outputs.dir)
        .with_context(|| format!("creating output directory {}", outputs.dir.display()))?;
    let file = File::create(&outputs.events)
        .with_context(|| format!("creating event log {}", outputs.events.display()))?;
    let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let installed = fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .with_writer(writer)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(target: "hearts_bench::run", path = %outputs.events.display(), "event log opened");
    }
    Ok(Some(guard))
}
