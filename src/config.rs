use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

/// Publish-access tier applied to every processed draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Unlisted,
    Private,
}

impl Visibility {
    /// Value of the `name` attribute on the matching radio button.
    pub fn radio_name(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Unlisted => "UNLISTED",
            Self::Private => "PRIVATE",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.radio_name())
    }
}

/// How many drafts a run may process. Zero or negative input means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum BatchLimit {
    #[default]
    Unbounded,
    Count(NonZeroUsize),
}

impl BatchLimit {
    pub fn reached(&self, processed: usize) -> bool {
        match self {
            Self::Unbounded => false,
            Self::Count(n) => processed >= n.get(),
        }
    }
}

impl From<i64> for BatchLimit {
    fn from(raw: i64) -> Self {
        usize::try_from(raw)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self::Count)
            .unwrap_or(Self::Unbounded)
    }
}

impl From<BatchLimit> for i64 {
    fn from(limit: BatchLimit) -> Self {
        match limit {
            BatchLimit::Unbounded => -1,
            BatchLimit::Count(n) => i64::try_from(n.get()).unwrap_or(i64::MAX),
        }
    }
}

impl fmt::Display for BatchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("all"),
            Self::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Per-phase wait budgets, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Delays {
    #[serde(rename = "delayBetweenVideos")]
    pub between_items_ms: u64,
    #[serde(rename = "dialogLoadDelay")]
    pub dialog_load_ms: u64,
    #[serde(rename = "dropdownDelay")]
    pub dropdown_ms: u64,
    #[serde(rename = "tabSwitchDelay")]
    pub tab_switch_ms: u64,
    #[serde(rename = "pageLoadDelay")]
    pub page_load_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            between_items_ms: 500,
            dialog_load_ms: 1500,
            dropdown_ms: 500,
            tab_switch_ms: 750,
            page_load_ms: 2500,
        }
    }
}

impl Delays {
    pub fn between_items(&self) -> Duration {
        Duration::from_millis(self.between_items_ms)
    }

    pub fn dialog_load(&self) -> Duration {
        Duration::from_millis(self.dialog_load_ms)
    }

    pub fn dropdown(&self) -> Duration {
        Duration::from_millis(self.dropdown_ms)
    }

    pub fn tab_switch(&self) -> Duration {
        Duration::from_millis(self.tab_switch_ms)
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }
}

/// Everything a run needs to know up front. Built once, then only borrowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunConfig {
    /// Empty means the playlist step is skipped.
    pub playlist_name: String,
    pub visibility: Visibility,
    pub set_not_for_kids: bool,
    pub batch_size: BatchLimit,
    pub auto_pagination: bool,
    /// Rows per page to select in the table footer before starting.
    pub page_size: Option<u32>,
    pub ask_on_error: bool,
    #[serde(flatten)]
    pub delays: Delays,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            playlist_name: String::new(),
            visibility: Visibility::default(),
            set_not_for_kids: true,
            batch_size: BatchLimit::default(),
            auto_pagination: true,
            page_size: None,
            ask_on_error: false,
            delays: Delays::default(),
        }
    }
}

impl RunConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&body)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn playlist(&self) -> Option<&str> {
        let name = self.playlist_name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}
