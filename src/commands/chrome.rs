use crate::browser::chrome::{self, ChromeSession};
use crate::cli::BrowserArgs;
use crate::platforms::{youtube, PlatformInfo};
use anyhow::Result;
use log::info;
use serde::Serialize;
use std::time::Duration;

const OPEN_READY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
pub struct ChromeStatus {
    pub found: bool,
    pub path: Option<String>,
    pub error: Option<String>,
    pub platform: PlatformInfo,
}

pub fn detect_chrome() -> ChromeStatus {
    let platform = youtube::info();
    match chrome::detect_chrome() {
        Ok(path) => ChromeStatus {
            found: true,
            path: Some(path.to_string_lossy().to_string()),
            error: None,
            platform,
        },
        Err(e) => ChromeStatus {
            found: false,
            path: None,
            error: Some(e.to_string()),
            platform,
        },
    }
}

/// Attach to or launch Chrome on the profile and wait until it has a page.
pub async fn open_profile(args: &BrowserArgs) -> Result<ChromeSession> {
    let chrome_path = chrome::detect_chrome()?;
    let profile_dir = chrome::profile_dir(&args.profile)?;
    let mut session = chrome::prepare_chrome_session(&chrome_path, &profile_dir, &args.url).await?;
    session.port = chrome::wait_for_chrome_ready(
        &session,
        Some(&profile_dir),
        Duration::from_secs(OPEN_READY_TIMEOUT_SECS),
    )
    .await?;
    info!(
        "[chrome] profile {} ready on port {} ({:?})",
        args.profile, session.port, session.mode
    );
    Ok(session)
}

/// `open` subcommand: leave a signed-in-able Chrome running for the operator.
pub async fn open(args: &BrowserArgs) -> Result<()> {
    let session = open_profile(args).await?;
    let platform = youtube::info();
    println!(
        "Chrome is running on debugging port {} with profile '{}'.",
        session.port, args.profile
    );
    println!(
        "Sign in to {} ({}) if needed, then open one of:",
        platform.name, platform.login_url
    );
    for page in platform.accepted_pages {
        println!("  {}", page);
    }
    println!("Filter the list to drafts and start `studio-draft-publisher run`.");
    Ok(())
}
