use super::actions::pause;
use super::error::RunError;
use super::item::{DraftWorkflow, ItemOutcome};
use super::lookup::ElementHandle;
use super::pagination::Paginator;
use super::prompt::FailurePrompt;
use super::resolver::Resolver;
use super::surface::Surface;
use crate::config::RunConfig;
use crate::platforms::youtube::{StudioCatalog, UrlGate};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashSet;

/// Counters owned by the batch runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Drafts found by the latest discovery (start of run or page change).
    pub discovered: usize,
}

impl RunStatistics {
    fn record(&mut self, outcome: &ItemOutcome) {
        self.attempted += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub stats: RunStatistics,
    pub pages_visited: usize,
    pub stopped_by_operator: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn summary(&self) -> String {
        let elapsed = self.finished_at - self.started_at;
        let mut out = format!(
            "Succeeded: {}\nFailed: {}\nTotal: {}\nPages: {}\nElapsed: {}s",
            self.stats.succeeded,
            self.stats.failed,
            self.stats.attempted,
            self.pages_visited,
            elapsed.num_seconds()
        );
        if self.stopped_by_operator {
            out.push_str("\nStopped by operator");
        }
        out
    }
}

/// Runs the draft workflow across the list until the batch limit or the
/// last reachable draft.
pub struct BatchRunner<'a> {
    surface: &'a dyn Surface,
    catalog: &'a StudioCatalog,
    gate: &'a UrlGate,
    config: &'a RunConfig,
    prompt: &'a dyn FailurePrompt,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        surface: &'a dyn Surface,
        catalog: &'a StudioCatalog,
        gate: &'a UrlGate,
        config: &'a RunConfig,
        prompt: &'a dyn FailurePrompt,
    ) -> Self {
        Self {
            surface,
            catalog,
            gate,
            config,
            prompt,
        }
    }

    pub async fn run(&self) -> Result<RunReport, RunError> {
        let started_at = Utc::now();
        let url = self.surface.current_url().await.map_err(RunError::Surface)?;
        let Some(page_kind) = self.gate.classify(&url) else {
            error!("[run] refusing to start on {}", url);
            return Err(RunError::WrongPage { url });
        };
        info!("[run] starting on {:?} page {}", page_kind, url);

        let paginator = Paginator::new(self.surface, self.catalog, self.config);
        let workflow = DraftWorkflow::new(self.surface, self.catalog, self.config, self.prompt);
        let limit = self.config.batch_size;

        if let Some(rows) = self.config.page_size {
            if let Err(e) = paginator.apply_page_size(rows).await {
                warn!("[pages] could not set rows per page: {:#}", e);
            }
        }

        let mut stats = RunStatistics {
            discovered: self.remaining(&HashSet::new()).await,
            ..Default::default()
        };
        let mut pages_visited = 1;

        while stats.discovered == 0 && self.config.auto_pagination && paginator.has_more().await {
            info!("[run] no drafts on this page, trying the next one");
            if !self.advance(&paginator).await {
                break;
            }
            pages_visited += 1;
            stats.discovered = self.remaining(&HashSet::new()).await;
        }

        if stats.discovered == 0 {
            error!("[run] no drafts found");
            return Err(RunError::NoDrafts);
        }

        info!(
            "[run] visibility={} playlist={} not_for_kids={} batch={} pagination={} drafts_on_page={}",
            self.config.visibility,
            self.config.playlist().unwrap_or("(skip)"),
            self.config.set_not_for_kids,
            limit,
            self.config.auto_pagination,
            stats.discovered
        );

        let mut stopped_by_operator = false;
        'pages: loop {
            info!("[run] page {}", pages_visited);
            // Processed rows may stay listed; the workflow skips past them.
            let mut handled = HashSet::new();

            while !limit.reached(stats.attempted) {
                if self.remaining(&handled).await == 0 {
                    info!("[run] no drafts left on this page");
                    break;
                }
                let Some(outcome) = workflow.process(stats.attempted + 1, &mut handled).await else {
                    break;
                };
                stats.record(&outcome);
                if let ItemOutcome::UserStop { .. } = outcome {
                    warn!("[run] stopped by operator");
                    stopped_by_operator = true;
                    break 'pages;
                }
                if limit.reached(stats.attempted) {
                    break;
                }
                pause(self.config.delays.between_items()).await;
            }

            if limit.reached(stats.attempted) {
                info!("[run] batch limit of {} reached", limit);
                break;
            }
            if !self.config.auto_pagination || !paginator.has_more().await {
                break;
            }
            if !self.advance(&paginator).await {
                break;
            }
            pages_visited += 1;
            stats.discovered = self.remaining(&HashSet::new()).await;
        }

        let report = RunReport {
            stats,
            pages_visited,
            stopped_by_operator,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            "[run] done: succeeded={} failed={} total={}",
            stats.succeeded, stats.failed, stats.attempted
        );
        Ok(report)
    }

    /// Live count of drafts not yet tried on this page.
    async fn remaining(&self, handled: &HashSet<ElementHandle>) -> usize {
        Resolver::new(self.surface)
            .resolve_all(&self.catalog.edit_action)
            .await
            .iter()
            .filter(|edit| !handled.contains(&edit.handle))
            .count()
    }

    async fn advance(&self, paginator: &Paginator<'_>) -> bool {
        match paginator.advance().await {
            Ok(moved) => moved,
            Err(e) => {
                warn!("[pages] could not change page: {:#}", e);
                false
            }
        }
    }
}
