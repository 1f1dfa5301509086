use super::lookup::Element;
use super::surface::Surface;
use anyhow::{Context, Result};
use log::debug;
use std::time::Duration;

pub const SCROLL_SETTLE_MS: u64 = 300;
pub const CLICK_SETTLE_MS: u64 = 1000;
pub const DISMISS_SETTLE_MS: u64 = 500;

/// Clicks that wait for the UI to react, and the Escape fallback.
pub struct Actions<'a> {
    surface: &'a dyn Surface,
}

impl<'a> Actions<'a> {
    pub fn new(surface: &'a dyn Surface) -> Self {
        Self { surface }
    }

    /// Scrolls `element` into view, clicks it, and lets the UI settle.
    pub async fn click(&self, element: &Element, what: &str) -> Result<()> {
        debug!("[action] click {} ({})", what, element.handle);
        self.surface
            .scroll_into_view(&element.handle)
            .await
            .with_context(|| format!("Failed to scroll {} into view", what))?;
        pause(Duration::from_millis(SCROLL_SETTLE_MS)).await;
        self.surface
            .click(&element.handle)
            .await
            .with_context(|| format!("Failed to click {}", what))?;
        pause(Duration::from_millis(CLICK_SETTLE_MS)).await;
        Ok(())
    }

    pub async fn dismiss(&self) -> Result<()> {
        self.surface
            .press_escape()
            .await
            .context("Failed to dispatch Escape")?;
        pause(Duration::from_millis(DISMISS_SETTLE_MS)).await;
        Ok(())
    }

    pub async fn scroll_to_end(&self, selector: &str) -> Result<bool> {
        self.surface
            .scroll_to_end(selector)
            .await
            .with_context(|| format!("Failed to scroll {}", selector))
    }
}

pub async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
