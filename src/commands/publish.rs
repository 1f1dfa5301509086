use super::chrome::open_profile;
use crate::browser::automation::{self, CdpSurface};
use crate::browser::chrome::{self, ChromeSession, SessionMode};
use crate::cli::RunArgs;
use crate::engine::{AlwaysContinue, BatchRunner, FailurePrompt, RunReport, StdinPrompt};
use crate::platforms::youtube::{StudioCatalog, UrlGate};
use anyhow::{Context, Result};
use log::info;
use std::time::Duration;

const ATTACH_READY_TIMEOUT_SECS: u64 = 10;

/// `run` subcommand: connect to Studio and publish the listed drafts.
pub async fn run(args: &RunArgs) -> Result<RunReport> {
    let config = args.resolve_config()?;

    let port = match args.port {
        Some(port) => {
            let session = ChromeSession {
                port,
                mode: SessionMode::Attached,
            };
            chrome::wait_for_chrome_ready(
                &session,
                None,
                Duration::from_secs(ATTACH_READY_TIMEOUT_SECS),
            )
            .await?
        }
        None => open_profile(&args.browser).await?.port,
    };

    info!("[run] connecting to Chrome on port {}", port);
    let (_browser, page) = automation::connect_to_chrome(port).await?;
    let surface = CdpSurface::new(page);

    let catalog = StudioCatalog::default();
    let gate = UrlGate::new()?;
    let prompt: Box<dyn FailurePrompt> = if config.ask_on_error {
        Box::new(StdinPrompt)
    } else {
        Box::new(AlwaysContinue)
    };

    let runner = BatchRunner::new(&surface, &catalog, &gate, &config, prompt.as_ref());
    let report = runner.run().await.context("Run aborted")?;
    Ok(report)
}

/// Text or JSON rendering of the final report.
pub fn render_report(report: &RunReport, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(report).context("Failed to encode report")
    } else {
        Ok(report.summary())
    }
}
