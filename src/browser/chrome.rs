use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const DEBUG_PORT_START: u16 = 9300;
const DEBUG_PORT_END: u16 = 9800;
const READY_POLL_MS: u64 = 500;

#[derive(Debug, Deserialize)]
struct CdpTarget {
    #[serde(rename = "type")]
    target_type: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Attached to a Chrome already running with a debugging port.
    Attached,
    /// Started a fresh Chrome for the profile.
    Launched,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChromeSession {
    pub port: u16,
    pub mode: SessionMode,
}

/// First free localhost port in the debugging range.
pub fn allocate_port() -> Result<u16> {
    for port in DEBUG_PORT_START..=DEBUG_PORT_END {
        if TcpListener::bind(("127.0.0.1", port)).is_ok() {
            return Ok(port);
        }
    }

    bail!(
        "No free Chrome debugging port in range {}-{}",
        DEBUG_PORT_START,
        DEBUG_PORT_END
    )
}

/// Locate a Chrome or Chromium binary for this OS.
pub fn detect_chrome() -> Result<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ];
        for p in &paths {
            let path = PathBuf::from(p);
            if path.exists() {
                return Ok(path);
            }
        }
        if let Ok(path) = which::which("google-chrome") {
            return Ok(path);
        }
    }

    #[cfg(target_os = "windows")]
    {
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];
        for p in &paths {
            let path = PathBuf::from(p);
            if path.exists() {
                return Ok(path);
            }
        }
        if let Ok(path) = which::which("chrome") {
            return Ok(path);
        }
    }

    #[cfg(target_os = "linux")]
    {
        let names = [
            "google-chrome",
            "google-chrome-stable",
            "chromium-browser",
            "chromium",
        ];
        for name in &names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }
    }

    bail!("Could not find Chrome. Install Google Chrome or pass --port to attach to a running one.")
}

/// `~/.studio-draft-publisher/profiles`, created on demand.
pub fn profiles_base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Cannot find home directory")?;
    let base = home.join(".studio-draft-publisher").join("profiles");
    std::fs::create_dir_all(&base)
        .with_context(|| format!("Cannot create {}", base.display()))?;
    Ok(base)
}

/// Profile directory for `name` under `base`. Names are single path components.
pub fn profile_dir_in(base: &Path, name: &str) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("Invalid profile name: {:?}", name);
    }
    let dir = base.join(name);
    std::fs::create_dir_all(&dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    Ok(dir)
}

pub fn profile_dir(name: &str) -> Result<PathBuf> {
    profile_dir_in(&profiles_base_dir()?, name)
}

/// Start Chrome on a free debugging port with `url` open. The child is left
/// running after this process exits.
pub fn launch_chrome_with_debug(chrome_path: &Path, profile_dir: &Path, url: &str) -> Result<u16> {
    let port = allocate_port()?;
    info!(
        "[chrome] launching profile={} port={} url={}",
        profile_dir.display(),
        port,
        url
    );

    let child = Command::new(chrome_path)
        .arg(format!("--user-data-dir={}", profile_dir.display()))
        .arg(format!("--remote-debugging-port={}", port))
        .arg("--new-window")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-default-apps")
        .arg("--disable-background-timer-throttling")
        .arg("--disable-backgrounding-occluded-windows")
        .arg("--disable-renderer-backgrounding")
        .arg(format!("--window-size={},{}", 1440, 900))
        .arg(url)
        .spawn()
        .context("Failed to launch Chrome")?;

    info!("[chrome] started pid={} port={}", child.id(), port);
    Ok(port)
}

/// Attach to the profile's running debuggable Chrome, or launch one.
pub async fn prepare_chrome_session(
    chrome_path: &Path,
    profile_dir: &Path,
    url: &str,
) -> Result<ChromeSession> {
    if let Some(port) = discover_profile_debug_port(profile_dir).await {
        info!(
            "[chrome] attaching to running session profile={} port={}",
            profile_dir.display(),
            port
        );
        return Ok(ChromeSession {
            port,
            mode: SessionMode::Attached,
        });
    }

    if is_profile_busy(profile_dir) {
        bail!(
            "Profile {} is open in a Chrome without a debugging port. Close that window and retry.",
            profile_dir.display()
        );
    }

    let port = launch_chrome_with_debug(chrome_path, profile_dir, url)?;
    Ok(ChromeSession {
        port,
        mode: SessionMode::Launched,
    })
}

/// Poll the debugging endpoint until Chrome has a page target. Returns the
/// port actually serving the profile, which can differ after rediscovery.
pub async fn wait_for_chrome_ready(
    session: &ChromeSession,
    profile_dir: Option<&Path>,
    timeout: Duration,
) -> Result<u16> {
    let start = tokio::time::Instant::now();
    let mut active_port = session.port;
    let mut saw_version = false;
    let mut rediscovered = profile_dir.is_none();

    loop {
        if start.elapsed() > timeout {
            if saw_version {
                bail!(
                    "Chrome answers on port {} but opened no page within {}s",
                    active_port,
                    timeout.as_secs()
                );
            }
            bail!(
                "Chrome was not ready on port {} within {}s",
                active_port,
                timeout.as_secs()
            );
        }

        if is_port_version_ready(active_port).await {
            saw_version = true;
            match page_targets(active_port).await {
                Ok(urls) if !urls.is_empty() => {
                    info!("[chrome] ready on port {} ({} page(s))", active_port, urls.len());
                    return Ok(active_port);
                }
                Ok(_) => debug!("[chrome] port {} has no page target yet", active_port),
                Err(e) => debug!("[chrome] page list on port {} failed: {:#}", active_port, e),
            }
        }

        if !rediscovered {
            if let Some(dir) = profile_dir {
                if let Some(found) = discover_profile_debug_port(dir).await {
                    if found != active_port {
                        warn!("[chrome] profile is served on port {} not {}", found, active_port);
                        active_port = found;
                    }
                }
            }
            rediscovered = true;
        }

        tokio::time::sleep(Duration::from_millis(READY_POLL_MS)).await;
    }
}

/// Debugging port of a Chrome already running this profile, if reachable.
pub async fn discover_profile_debug_port(profile_dir: &Path) -> Option<u16> {
    let mut candidates: BTreeSet<u16> = BTreeSet::new();
    if let Some(port) = read_devtools_active_port(profile_dir) {
        candidates.insert(port);
    }
    candidates.extend(running_profile_debug_ports(profile_dir));

    for port in candidates {
        if is_port_version_ready(port).await {
            return Some(port);
        }
    }
    None
}

fn read_devtools_active_port(profile_dir: &Path) -> Option<u16> {
    let body = std::fs::read_to_string(profile_dir.join("DevToolsActivePort")).ok()?;
    body.lines().next()?.trim().parse::<u16>().ok()
}

#[cfg(unix)]
fn running_profile_debug_ports(profile_dir: &Path) -> Vec<u16> {
    let output = match Command::new("ps").args(["-ax", "-o", "command="]).output() {
        Ok(output) if output.status.success() => output,
        _ => return Vec::new(),
    };

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| matches_profile_user_data_dir(line, profile_dir))
        .filter_map(|line| extract_flag_u16(line, "--remote-debugging-port="))
        .collect()
}

#[cfg(not(unix))]
fn running_profile_debug_ports(_profile_dir: &Path) -> Vec<u16> {
    Vec::new()
}

fn matches_profile_user_data_dir(cmdline: &str, profile_dir: &Path) -> bool {
    let profile = profile_dir.to_string_lossy();
    [
        format!("--user-data-dir={}", profile),
        format!("--user-data-dir=\"{}\"", profile),
        format!("--user-data-dir='{}'", profile),
    ]
    .iter()
    .any(|flag| cmdline.contains(flag.as_str()))
}

fn extract_flag_u16(cmdline: &str, prefix: &str) -> Option<u16> {
    cmdline
        .split_whitespace()
        .filter_map(|token| token.strip_prefix(prefix))
        .find_map(|raw| raw.trim_matches('"').trim_matches('\'').parse::<u16>().ok())
}

async fn is_port_version_ready(port: u16) -> bool {
    let version_url = format!("http://127.0.0.1:{}/json/version", port);
    match reqwest::get(&version_url).await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

/// URLs of the open page targets on `port`.
pub async fn page_targets(port: u16) -> Result<Vec<String>> {
    let list_url = format!("http://127.0.0.1:{}/json/list", port);
    let resp = reqwest::get(&list_url)
        .await
        .context("Chrome json/list request failed")?;
    if !resp.status().is_success() {
        return Ok(Vec::new());
    }
    let targets: Vec<CdpTarget> = resp.json().await.context("Malformed json/list")?;
    Ok(targets
        .into_iter()
        .filter(|t| t.target_type == "page")
        .map(|t| t.url)
        .collect())
}

fn has_singleton_artifacts(profile_dir: &Path) -> bool {
    ["SingletonLock", "SingletonCookie", "SingletonSocket"]
        .iter()
        .any(|name| profile_dir.join(name).symlink_metadata().is_ok())
}

fn singleton_lock_pid(profile_dir: &Path) -> Option<u32> {
    let target = std::fs::read_link(profile_dir.join("SingletonLock")).ok()?;
    let name = target.file_name()?.to_string_lossy().into_owned();
    name.rsplit('-').next()?.parse::<u32>().ok()
}

#[cfg(unix)]
fn is_pid_running(pid: u32) -> bool {
    let pid_text = pid.to_string();
    match Command::new("ps").args(["-p", &pid_text, "-o", "pid="]).output() {
        Ok(output) => {
            output.status.success() && !String::from_utf8_lossy(&output.stdout).trim().is_empty()
        }
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_pid_running(_pid: u32) -> bool {
    false
}

/// True when another Chrome holds the profile lock.
pub fn is_profile_busy(profile_dir: &Path) -> bool {
    if !has_singleton_artifacts(profile_dir) {
        return false;
    }
    match singleton_lock_pid(profile_dir) {
        Some(pid) => is_pid_running(pid),
        None => true,
    }
}
