//! In-memory Studio content list and draft editor for driving the engine.
#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use studio_draft_publisher_lib::engine::{
    Decision, Element, ElementHandle, FailurePrompt, Lookup, Surface,
};
use studio_draft_publisher_lib::platforms::youtube::selectors as s;

pub const CHANNEL_URL: &str = "https://studio.youtube.com/channel/UC123/videos/upload?filter=drafts";
pub const PLAYLIST_NAME: &str = "Vlogs";

#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub id: String,
    pub published: bool,
    pub playlists: Vec<String>,
    pub not_for_kids: bool,
    pub visibility: Option<String>,
    /// Save control never appears for this draft.
    pub save_broken: bool,
    /// Visibility tab stays disabled until reached with "next".
    pub steps_locked: bool,
    /// Number of "next" clicks from the details step to visibility.
    pub steps_to_visibility: u8,
    /// The editor offers no "next" button.
    pub next_missing: bool,
    /// Save succeeds but the video stays a listed draft.
    pub sticky: bool,
    /// Save publishes but no share dialog follows.
    pub no_share: bool,
}

impl Draft {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            steps_to_visibility: 3,
            ..Default::default()
        }
    }

    pub fn broken(mut self) -> Self {
        self.save_broken = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.steps_locked = true;
        self
    }

    /// Locked, and "next" has to be clicked `steps` times.
    pub fn far(mut self, steps: u8) -> Self {
        self.steps_locked = true;
        self.steps_to_visibility = steps;
        self
    }

    pub fn without_next(mut self) -> Self {
        self.next_missing = true;
        self
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    pub fn without_share(mut self) -> Self {
        self.no_share = true;
        self
    }

    pub fn already_configured(mut self, visibility: &str) -> Self {
        self.not_for_kids = true;
        self.playlists.push(PLAYLIST_NAME.to_string());
        self.visibility = Some(visibility.to_string());
        self
    }
}

#[derive(Debug, Default)]
struct State {
    pages: Vec<Vec<Draft>>,
    page: usize,
    editing: Option<usize>,
    step: u8,
    playlist_open: bool,
    share_open: bool,
    rows_menu_open: bool,
    rows_per_page: Option<u32>,
    playlist_cancel_missing: bool,
    failing: Vec<String>,
    escapes: usize,
    clicks: Vec<String>,
}

impl State {
    fn draft(&self) -> Option<&Draft> {
        self.editing.map(|i| &self.pages[self.page][i])
    }

    fn draft_mut(&mut self) -> Option<&mut Draft> {
        let (page, idx) = (self.page, self.editing?);
        self.pages.get_mut(page)?.get_mut(idx)
    }

    fn on_visibility_step(&self) -> bool {
        self.draft()
            .is_some_and(|d| self.step >= d.steps_to_visibility)
    }

    fn close_editor(&mut self) {
        self.editing = None;
        self.step = 0;
        self.playlist_open = false;
        self.share_open = false;
    }
}

pub struct FakeStudio {
    url: String,
    state: Mutex<State>,
}

fn el(handle: impl Into<String>) -> Element {
    Element {
        handle: ElementHandle(handle.into()),
        visible: true,
        enabled: true,
        checked: false,
        active: false,
        text: String::new(),
    }
}

impl FakeStudio {
    pub fn new(pages: Vec<Vec<Draft>>) -> Self {
        Self::at(CHANNEL_URL, pages)
    }

    pub fn at(url: &str, pages: Vec<Vec<Draft>>) -> Self {
        Self {
            url: url.to_string(),
            state: Mutex::new(State {
                pages,
                ..Default::default()
            }),
        }
    }

    /// The playlist dialog has no cancel button; only Escape closes it.
    pub fn without_playlist_cancel(self) -> Self {
        self.state.lock().unwrap().playlist_cancel_missing = true;
        self
    }

    /// Clicks on `handle` are recorded and then fail.
    pub fn failing_clicks_on(self, handle: &str) -> Self {
        self.state.lock().unwrap().failing.push(handle.to_string());
        self
    }

    pub fn escapes(&self) -> usize {
        self.state.lock().unwrap().escapes
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn clicked(&self, handle: &str) -> usize {
        self.clicks().iter().filter(|c| c.as_str() == handle).count()
    }

    pub fn draft(&self, id: &str) -> Draft {
        let state = self.state.lock().unwrap();
        state
            .pages
            .iter()
            .flatten()
            .find(|d| d.id == id)
            .cloned()
            .unwrap()
    }

    pub fn rows_per_page(&self) -> Option<u32> {
        self.state.lock().unwrap().rows_per_page
    }

    pub fn current_page(&self) -> usize {
        self.state.lock().unwrap().page
    }

    fn css(&self, state: &State, selector: &str) -> Vec<Element> {
        let editing = state.draft();
        match selector {
            s::EDITOR_DIALOG => editing.map(|_| el("editor")).into_iter().collect(),
            s::PLAYLIST_SECTION => editing
                .map(|d| Element {
                    text: format!("Playlists {}", d.playlists.join(", ")),
                    ..el("playlist-section")
                })
                .into_iter()
                .collect(),
            s::PLAYLIST_TRIGGER => editing.map(|_| el("playlist-trigger")).into_iter().collect(),
            s::PLAYLIST_LIST if state.playlist_open => vec![el("playlist-list")],
            s::PLAYLIST_DONE if state.playlist_open => vec![el("playlist-done")],
            s::PLAYLIST_CANCEL if state.playlist_open && !state.playlist_cancel_missing => {
                vec![el("playlist-cancel")]
            }
            s::NOT_FOR_KIDS_RADIO => editing
                .map(|d| Element {
                    checked: d.not_for_kids,
                    ..el("kids")
                })
                .into_iter()
                .collect(),
            s::VISIBILITY_STEP => editing
                .map(|d| Element {
                    enabled: !d.steps_locked,
                    active: state.on_visibility_step(),
                    ..el("vis-tab")
                })
                .into_iter()
                .collect(),
            s::NEXT_STEP => editing
                .filter(|d| !d.next_missing)
                .map(|_| el("next"))
                .into_iter()
                .collect(),
            s::SAVE_BUTTON => editing
                .filter(|d| !d.save_broken)
                .map(|_| el("save"))
                .into_iter()
                .collect(),
            s::SHARE_URL if state.share_open => vec![el("share")],
            s::SHARE_CLOSE_ICON if state.share_open => vec![el("share-close")],
            s::CLOSE_ICON => editing
                .filter(|_| !state.share_open)
                .map(|_| el("editor-close"))
                .into_iter()
                .collect(),
            s::NEXT_PAGE if state.page + 1 < state.pages.len() => vec![el("next-page")],
            s::PAGE_SIZE_FOOTER => vec![el("rows-trigger")],
            other => match (editing, other.strip_prefix(r#"tp-yt-paper-radio-button[name=""#)) {
                (Some(d), Some(rest)) if state.on_visibility_step() => {
                    let name = rest.trim_end_matches("\"]");
                    vec![Element {
                        checked: d.visibility.as_deref() == Some(name),
                        ..el(format!("radio:{}", name))
                    }]
                }
                _ => Vec::new(),
            },
        }
    }

    fn apply_click(state: &mut State, handle: &str) -> Result<()> {
        if let Some(id) = handle.strip_prefix("edit:") {
            let page = state.page;
            let Some(idx) = state.pages[page].iter().position(|d| d.id == id) else {
                bail!("stale handle {}", handle);
            };
            state.editing = Some(idx);
            state.step = 0;
            return Ok(());
        }
        if let Some(name) = handle.strip_prefix("playlist:") {
            if let Some(d) = state.draft_mut() {
                d.playlists.push(name.to_string());
            }
            return Ok(());
        }
        if let Some(rows) = handle.strip_prefix("rows:") {
            state.rows_per_page = rows.parse().ok();
            state.rows_menu_open = false;
            return Ok(());
        }
        if let Some(name) = handle.strip_prefix("radio:") {
            if let Some(d) = state.draft_mut() {
                d.visibility = Some(name.to_string());
            }
            return Ok(());
        }
        match handle {
            "rows-trigger" => state.rows_menu_open = true,
            "playlist-trigger" => state.playlist_open = true,
            "playlist-done" | "playlist-cancel" => state.playlist_open = false,
            "kids" => {
                if let Some(d) = state.draft_mut() {
                    d.not_for_kids = true;
                }
            }
            "vis-tab" => {
                if let Some(steps) = state.draft().map(|d| d.steps_to_visibility) {
                    state.step = steps;
                }
            }
            "next" => state.step += 1,
            "save" => {
                let Some(d) = state.draft_mut() else {
                    bail!("save clicked outside the editor");
                };
                d.published = !d.sticky;
                let share = !d.no_share;
                state.share_open = share;
            }
            "share-close" | "editor-close" => state.close_editor(),
            "next-page" => {
                state.page += 1;
                state.close_editor();
            }
            other => bail!("unknown handle {}", other),
        }
        Ok(())
    }
}

#[async_trait]
impl Surface for FakeStudio {
    async fn current_url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    async fn query(&self, lookup: &Lookup) -> Result<Vec<Element>> {
        let state = self.state.lock().unwrap();
        let found = match lookup {
            Lookup::InContainer { container, .. } if container == s::VIDEO_ROW => state.pages
                [state.page]
                .iter()
                .filter(|d| !d.published)
                .map(|d| el(format!("edit:{}", d.id)))
                .collect(),
            Lookup::Css { selector } => self.css(&state, selector),
            Lookup::Text {
                scope,
                texts,
                exact: false,
            } if scope == s::PLAYLIST_OPTION && state.playlist_open => texts
                .iter()
                .filter(|t| t.as_str() == PLAYLIST_NAME)
                .map(|t| Element {
                    checked: state.draft().is_some_and(|d| d.playlists.contains(t)),
                    text: t.clone(),
                    ..el(format!("playlist:{}", t))
                })
                .collect(),
            Lookup::Text {
                scope,
                texts,
                exact: true,
            } if scope == s::MENU_ITEM && state.rows_menu_open => texts
                .iter()
                .filter(|t| ["10", "30", "50"].contains(&t.as_str()))
                .map(|t| el(format!("rows:{}", t)))
                .collect(),
            _ => Vec::new(),
        };
        Ok(found)
    }

    async fn scroll_into_view(&self, _handle: &ElementHandle) -> Result<()> {
        Ok(())
    }

    async fn click(&self, handle: &ElementHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(handle.as_str().to_string());
        if state.failing.iter().any(|h| h == handle.as_str()) {
            bail!("click on {} intercepted", handle);
        }
        Self::apply_click(&mut state, handle.as_str())
    }

    async fn press_escape(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.escapes += 1;
        state.playlist_open = false;
        state.rows_menu_open = false;
        Ok(())
    }

    async fn scroll_to_end(&self, _selector: &str) -> Result<bool> {
        Ok(true)
    }

    async fn body_contains(&self, _text: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Answers every failure with the same decision and counts the calls.
pub struct ScriptedPrompt {
    pub decision: Decision,
    pub asked: Mutex<Vec<usize>>,
}

impl ScriptedPrompt {
    pub fn new(decision: Decision) -> Self {
        Self {
            decision,
            asked: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl FailurePrompt for ScriptedPrompt {
    async fn decide(&self, item_number: usize, _reason: &str) -> Decision {
        self.asked.lock().unwrap().push(item_number);
        self.decision
    }
}
