use crate::config::{BatchLimit, RunConfig, Visibility};
use crate::platforms::youtube::STUDIO_URL;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "studio-draft-publisher")]
#[command(version, about = "Publish YouTube Studio drafts in bulk", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish the drafts listed on the open Studio content page
    Run(RunArgs),

    /// Launch Chrome on a profile so you can sign in and open the draft list
    Open(BrowserArgs),

    /// Print where Chrome was found, as JSON
    DetectChrome,
}

#[derive(Args, Clone)]
pub struct BrowserArgs {
    /// Chrome profile name under ~/.studio-draft-publisher/profiles
    #[arg(long, default_value = "default", env = "STUDIO_PUBLISHER_PROFILE")]
    pub profile: String,

    /// Page to open when Chrome has to be launched
    #[arg(long, default_value = STUDIO_URL)]
    pub url: String,
}

#[derive(Args)]
pub struct RunArgs {
    /// Attach to a Chrome already listening on this debugging port
    #[arg(long, conflicts_with = "profile")]
    pub port: Option<u16>,

    #[command(flatten)]
    pub browser: BrowserArgs,

    /// JSON settings file (camelCase keys); flags override it
    #[arg(long, env = "STUDIO_PUBLISHER_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub visibility: Option<Visibility>,

    /// Playlist to add every draft to
    #[arg(long)]
    pub playlist: Option<String>,

    /// Leave the made-for-kids answer as it is
    #[arg(long)]
    pub kids_unset: bool,

    /// Stop after this many drafts; 0 or less means all
    #[arg(long, allow_negative_numbers = true)]
    pub batch_size: Option<i64>,

    /// Stay on the current page of the list
    #[arg(long)]
    pub no_pagination: bool,

    /// Rows per page to pick in the list footer before starting
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Ask whether to keep going after a draft fails
    #[arg(long)]
    pub ask_on_error: bool,

    #[arg(long, value_name = "MS")]
    pub delay_between_ms: Option<u64>,

    #[arg(long, value_name = "MS")]
    pub delay_dialog_ms: Option<u64>,

    #[arg(long, value_name = "MS")]
    pub delay_dropdown_ms: Option<u64>,

    #[arg(long, value_name = "MS")]
    pub delay_tab_ms: Option<u64>,

    #[arg(long, value_name = "MS")]
    pub delay_page_ms: Option<u64>,

    /// Print the final report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Defaults, then the `--config` file, then flags.
    pub fn resolve_config(&self) -> Result<RunConfig> {
        let base = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::default(),
        };
        Ok(self.apply(base))
    }

    fn apply(&self, mut cfg: RunConfig) -> RunConfig {
        if let Some(v) = self.visibility {
            cfg.visibility = v;
        }
        if let Some(name) = &self.playlist {
            cfg.playlist_name = name.clone();
        }
        if self.kids_unset {
            cfg.set_not_for_kids = false;
        }
        if let Some(n) = self.batch_size {
            cfg.batch_size = BatchLimit::from(n);
        }
        if self.no_pagination {
            cfg.auto_pagination = false;
        }
        if self.page_size.is_some() {
            cfg.page_size = self.page_size;
        }
        if self.ask_on_error {
            cfg.ask_on_error = true;
        }

        let delays = &mut cfg.delays;
        let overrides = [
            (self.delay_between_ms, &mut delays.between_items_ms),
            (self.delay_dialog_ms, &mut delays.dialog_load_ms),
            (self.delay_dropdown_ms, &mut delays.dropdown_ms),
            (self.delay_tab_ms, &mut delays.tab_switch_ms),
            (self.delay_page_ms, &mut delays.page_load_ms),
        ];
        for (flag, slot) in overrides {
            if let Some(ms) = flag {
                *slot = ms;
            }
        }
        cfg
    }
}
