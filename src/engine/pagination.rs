use super::actions::{pause, Actions};
use super::resolver::Resolver;
use super::surface::Surface;
use crate::config::RunConfig;
use crate::platforms::youtube::StudioCatalog;
use anyhow::Result;
use log::{info, warn};

/// Moves through the content list's pages.
pub struct Paginator<'a> {
    resolver: Resolver<'a>,
    actions: Actions<'a>,
    catalog: &'a StudioCatalog,
    config: &'a RunConfig,
}

impl<'a> Paginator<'a> {
    pub fn new(surface: &'a dyn Surface, catalog: &'a StudioCatalog, config: &'a RunConfig) -> Self {
        Self {
            resolver: Resolver::new(surface),
            actions: Actions::new(surface),
            catalog,
            config,
        }
    }

    /// True when a visible, enabled next-page control exists.
    pub async fn has_more(&self) -> bool {
        self.resolver.resolve(&self.catalog.next_page).await.is_some()
    }

    /// Clicks next-page and waits for the new rows. Callers must re-query
    /// the work list afterwards.
    pub async fn advance(&self) -> Result<bool> {
        if !self.config.auto_pagination {
            return Ok(false);
        }
        let Some(next) = self.resolver.resolve(&self.catalog.next_page).await else {
            info!("[pages] already on the last page");
            return Ok(false);
        };
        info!("[pages] going to the next page");
        self.actions.click(&next, "next page").await?;
        pause(self.config.delays.page_load()).await;
        Ok(true)
    }

    /// Picks `rows` in the rows-per-page menu. Returns whether it was applied.
    pub async fn apply_page_size(&self, rows: u32) -> Result<bool> {
        let Some(trigger) = self.resolver.resolve(&self.catalog.page_size_trigger).await else {
            info!("[pages] rows-per-page menu not found, keeping the default");
            return Ok(false);
        };
        self.actions.click(&trigger, "rows per page").await?;
        pause(self.config.delays.dropdown()).await;

        match self.resolver.resolve(&self.catalog.page_size_option(rows)).await {
            Some(option) => {
                self.actions.click(&option, "rows per page option").await?;
                pause(self.config.delays.page_load()).await;
                info!("[pages] showing {} rows per page", rows);
                Ok(true)
            }
            None => {
                warn!("[pages] no {} rows option, keeping the default", rows);
                self.actions.dismiss().await?;
                Ok(false)
            }
        }
    }
}
