use super::actions::{pause, Actions};
use super::lookup::{Element, ElementHandle};
use super::prompt::{Decision, FailurePrompt};
use super::resolver::Resolver;
use super::surface::Surface;
use super::waiter;
use crate::config::RunConfig;
use crate::platforms::youtube::StudioCatalog;
use anyhow::{bail, Result};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::time::Duration;

pub const EDITOR_TIMEOUT_SECS: u64 = 5;
pub const PLAYLIST_LIST_TIMEOUT_SECS: u64 = 3;
pub const PUBLISH_CONFIRM_TIMEOUT_SECS: u64 = 30;
pub const PUBLISH_CONFIRM_POLL_MS: u64 = 500;
pub const STEP_PAUSE_MS: u64 = 500;
pub const CLOSE_SETTLE_MS: u64 = 300;
pub const NEXT_STEP_ATTEMPTS: usize = 3;

/// What happened to one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Success,
    Failure { reason: String },
    /// The draft failed and the operator asked to end the batch.
    UserStop { reason: String },
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Drives a single draft from its list row to a closed share dialog.
pub struct DraftWorkflow<'a> {
    resolver: Resolver<'a>,
    actions: Actions<'a>,
    catalog: &'a StudioCatalog,
    config: &'a RunConfig,
    prompt: &'a dyn FailurePrompt,
}

impl<'a> DraftWorkflow<'a> {
    pub fn new(
        surface: &'a dyn Surface,
        catalog: &'a StudioCatalog,
        config: &'a RunConfig,
        prompt: &'a dyn FailurePrompt,
    ) -> Self {
        Self {
            resolver: Resolver::new(surface),
            actions: Actions::new(surface),
            catalog,
            config,
            prompt,
        }
    }

    /// Processes the first draft on the page that is not in `handled`.
    ///
    /// `handled` holds the rows already processed on this page. A row can stay
    /// listed after it was processed (a failed save, or a save that keeps it a
    /// draft), so it is skipped by handle. The list is queried fresh here; no
    /// position is carried over from an earlier draft. `None` means every
    /// listed row was handled. The processed row is added to `handled`.
    pub async fn process(
        &self,
        number: usize,
        handled: &mut HashSet<ElementHandle>,
    ) -> Option<ItemOutcome> {
        let edit = self.locate(handled).await?;
        handled.insert(edit.handle.clone());
        info!("[draft {}] processing", number);

        let outcome = match self.drive(number, &edit).await {
            Ok(()) => {
                info!("[draft {}] published", number);
                ItemOutcome::Success
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                error!("[draft {}] failed: {}", number, reason);
                self.close_dialogs(number).await;
                match self.prompt.decide(number, &reason).await {
                    Decision::Continue => ItemOutcome::Failure { reason },
                    Decision::Stop => ItemOutcome::UserStop { reason },
                }
            }
        };
        Some(outcome)
    }

    async fn locate(&self, handled: &HashSet<ElementHandle>) -> Option<Element> {
        self.resolver
            .resolve_all(&self.catalog.edit_action)
            .await
            .into_iter()
            .find(|edit| !handled.contains(&edit.handle))
    }

    async fn drive(&self, number: usize, edit: &Element) -> Result<()> {
        // Step 1: open the draft in the editor dialog
        self.open_editor(number, edit).await?;

        // Step 2: details step, playlist then audience
        self.apply_playlist(number).await?;
        self.apply_classification(number).await?;

        // Step 3: visibility step, by tab or by walking "next"
        self.switch_to_visibility_step(number).await?;
        pause(self.config.delays.tab_switch()).await;
        self.apply_visibility(number).await?;

        // Step 4: save; a missing save control fails the draft
        self.save(number).await?;

        // Step 5: wait for the share dialog, then close whatever is open
        self.confirm_publish(number).await;
        self.close_dialogs(number).await;
        Ok(())
    }

    async fn open_editor(&self, number: usize, edit: &Element) -> Result<()> {
        self.actions.click(edit, "edit draft").await?;

        // The dialog may render late; carry on either way
        let timeout = Duration::from_secs(EDITOR_TIMEOUT_SECS);
        if self
            .resolver
            .wait_for(&self.catalog.editor_surface, timeout)
            .await
            .is_none()
        {
            warn!(
                "[draft {}] editor not seen within {}s, continuing",
                number, EDITOR_TIMEOUT_SECS
            );
        }
        pause(self.config.delays.dialog_load()).await;
        Ok(())
    }

    async fn apply_playlist(&self, number: usize) -> Result<()> {
        let Some(name) = self.config.playlist() else {
            return Ok(());
        };
        info!("[draft {}] playlist: {}", number, name);

        let Some(section) = self.resolver.locate(&self.catalog.playlist_section).await else {
            warn!("[draft {}] playlist section not found, skipping", number);
            return Ok(());
        };
        if section.text.contains(name) {
            info!("[draft {}] already in playlist {}", number, name);
            return Ok(());
        }

        let Some(trigger) = self.resolver.resolve(&self.catalog.playlist_trigger).await else {
            warn!("[draft {}] playlist dropdown not found, skipping", number);
            return Ok(());
        };
        self.actions.click(&trigger, "playlist dropdown").await?;
        pause(self.config.delays.dropdown()).await;

        // Wait for the list to render before looking for the option

        let list_timeout = Duration::from_secs(PLAYLIST_LIST_TIMEOUT_SECS);
        if self
            .resolver
            .wait_for(&self.catalog.playlist_list, list_timeout)
            .await
            .is_none()
        {
            debug!("[draft {}] playlist list not seen, looking for the option anyway", number);
        }
        pause(Duration::from_millis(STEP_PAUSE_MS)).await;

        let Some(option) = self.resolver.resolve(&self.catalog.playlist_option(name)).await else {
            warn!("[draft {}] playlist \"{}\" not found", number, name);
            let closed = match self.resolver.resolve(&self.catalog.playlist_cancel).await {
                Some(cancel) => self.actions.click(&cancel, "playlist cancel").await,
                None => self.actions.dismiss().await,
            };
            if let Err(e) = closed {
                debug!("[draft {}] {:#}", number, e);
            }
            return Ok(());
        };

        if option.checked {
            info!("[draft {}] playlist {} already ticked", number, name);
        } else {
            self.actions.click(&option, "playlist option").await?;
            info!("[draft {}] ticked playlist {}", number, name);
        }

        // Close the dropdown with Done
        pause(Duration::from_millis(STEP_PAUSE_MS)).await;
        if let Some(done) = self.resolver.resolve(&self.catalog.playlist_done).await {
            if let Err(e) = self.actions.click(&done, "playlist done").await {
                debug!("[draft {}] {:#}", number, e);
            }
        }
        Ok(())
    }

    async fn apply_classification(&self, number: usize) -> Result<()> {
        if !self.config.set_not_for_kids {
            return Ok(());
        }

        // The audience radios sit at the bottom of the details step.
        match self.actions.scroll_to_end(self.catalog.scroll_container).await {
            Ok(true) => pause(Duration::from_millis(200)).await,
            Ok(false) => {}
            Err(e) => debug!("[draft {}] scroll failed: {:#}", number, e),
        }

        let Some(radio) = self.resolver.resolve(&self.catalog.not_for_kids).await else {
            warn!("[draft {}] \"not made for kids\" option not found", number);
            return Ok(());
        };
        if radio.checked {
            info!("[draft {}] already marked not made for kids", number);
            return Ok(());
        }
        self.actions.click(&radio, "not made for kids").await?;
        info!("[draft {}] marked not made for kids", number);
        Ok(())
    }

    /// Returns whether the visibility step is showing. Not reaching it is
    /// only a warning; the visibility option lookup will then miss.
    async fn switch_to_visibility_step(&self, number: usize) -> Result<bool> {
        pause(Duration::from_millis(STEP_PAUSE_MS)).await;

        let Some(step) = self.resolver.locate(&self.catalog.visibility_step).await else {
            warn!("[draft {}] visibility step not found", number);
            return Ok(false);
        };
        if step.active {
            return Ok(true);
        }
        if step.enabled {
            self.actions.click(&step, "visibility step").await?;
            return Ok(true);
        }

        // Locked tab: advance one step at a time until it becomes active
        info!("[draft {}] visibility step disabled, walking with next", number);
        for attempt in 1..=NEXT_STEP_ATTEMPTS {
            let Some(next) = self.resolver.resolve(&self.catalog.next_step).await else {
                warn!("[draft {}] next button unavailable (attempt {})", number, attempt);
                break;
            };
            self.actions.click(&next, "next step").await?;
            pause(self.config.delays.tab_switch()).await;

            let reached = self
                .resolver
                .locate(&self.catalog.visibility_step)
                .await
                .is_some_and(|step| step.active);
            if reached {
                info!("[draft {}] reached visibility step after {} next click(s)", number, attempt);
                return Ok(true);
            }
        }

        warn!("[draft {}] could not reach the visibility step", number);
        Ok(false)
    }

    async fn apply_visibility(&self, number: usize) -> Result<()> {
        let visibility = self.config.visibility;
        let target = self.catalog.visibility_option(visibility);
        let Some(radio) = self.resolver.resolve(&target).await else {
            warn!("[draft {}] {} option not found", number, visibility);
            return Ok(());
        };
        if radio.checked {
            info!("[draft {}] already {}", number, visibility);
            return Ok(());
        }
        self.actions.click(&radio, "visibility option").await?;
        info!("[draft {}] selected {}", number, visibility);
        Ok(())
    }

    async fn save(&self, number: usize) -> Result<()> {
        pause(Duration::from_millis(STEP_PAUSE_MS)).await;
        match self.resolver.resolve(&self.catalog.save).await {
            Some(button) => {
                info!("[draft {}] saving", number);
                self.actions.click(&button, "save").await
            }
            None => bail!("save control not found or disabled"),
        }
    }

    async fn confirm_publish(&self, number: usize) {
        // Either the share dialog or a "published" notice counts
        let timeout = Duration::from_secs(PUBLISH_CONFIRM_TIMEOUT_SECS);
        let interval = Duration::from_millis(PUBLISH_CONFIRM_POLL_MS);
        let signal = waiter::wait_until(timeout, interval, || async {
            if self.resolver.resolve(&self.catalog.share_surface).await.is_some() {
                return Some("share dialog".to_string());
            }
            self.resolver
                .body_text_hit(&self.catalog.published_texts)
                .await
                .map(|text| format!("text \"{}\"", text))
        })
        .await;

        match signal {
            Some(signal) => info!("[draft {}] publish confirmed by {}", number, signal),
            None => warn!(
                "[draft {}] no publish confirmation within {}s, assuming it went through",
                number, PUBLISH_CONFIRM_TIMEOUT_SECS
            ),
        }
    }

    /// Best-effort teardown of whatever dialog is showing. Never fails.
    async fn close_dialogs(&self, number: usize) {
        // Share dialog first; its close button also closes the editor
        if let Some(close) = self.resolver.resolve(&self.catalog.share_close).await {
            if let Err(e) = self.actions.click(&close, "share dialog close").await {
                debug!("[draft {}] {:#}", number, e);
            }
            pause(Duration::from_millis(STEP_PAUSE_MS)).await;
            return;
        }

        // Otherwise close icons and the close button, then Escape
        for icon in self.resolver.resolve_all(&self.catalog.close_icon).await {
            if let Err(e) = self.actions.click(&icon, "close icon").await {
                debug!("[draft {}] {:#}", number, e);
            }
            pause(Duration::from_millis(CLOSE_SETTLE_MS)).await;
        }

        if let Some(close) = self.resolver.resolve(&self.catalog.close_by_id).await {
            if let Err(e) = self.actions.click(&close, "close button").await {
                debug!("[draft {}] {:#}", number, e);
            }
        }

        if let Err(e) = self.actions.dismiss().await {
            debug!("[draft {}] {:#}", number, e);
        }
    }
}
