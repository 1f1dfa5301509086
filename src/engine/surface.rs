use super::lookup::{Element, ElementHandle, Lookup};
use anyhow::Result;
use async_trait::async_trait;

/// The live page as the engine sees it.
///
/// Implementations answer lookups with fresh snapshots every time they are
/// called; nothing may be cached between calls, because processing a draft
/// mutates the list the next lookup reads.
#[async_trait]
pub trait Surface: Send + Sync {
    async fn current_url(&self) -> Result<String>;

    /// All elements matched by `lookup`, in document order.
    async fn query(&self, lookup: &Lookup) -> Result<Vec<Element>>;

    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<()>;

    /// Fails when the handle no longer names an attached element.
    async fn click(&self, handle: &ElementHandle) -> Result<()>;

    /// Dispatches an Escape keydown to the document.
    async fn press_escape(&self) -> Result<()>;

    /// Scrolls the first element matching `selector` to its bottom.
    /// Returns false when there is no such element.
    async fn scroll_to_end(&self, selector: &str) -> Result<bool>;

    async fn body_contains(&self, text: &str) -> Result<bool>;
}
