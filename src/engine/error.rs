use thiserror::Error;

/// Conditions that end a run before any draft is touched.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("not a Studio content or playlist list page: {url}")]
    WrongPage { url: String },

    #[error("no drafts found; filter the list to drafts and let the page finish loading")]
    NoDrafts,

    #[error("browser page unavailable: {0:#}")]
    Surface(#[source] anyhow::Error),
}
