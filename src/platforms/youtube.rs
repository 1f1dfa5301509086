use super::traits::PlatformInfo;
use crate::config::Visibility;
use crate::engine::lookup::{Lookup, Target};
use anyhow::{Context, Result};
use regex::Regex;

pub const STUDIO_URL: &str = "https://studio.youtube.com";

pub fn info() -> PlatformInfo {
    PlatformInfo {
        id: "youtube",
        name: "YouTube Studio",
        login_url: "https://accounts.google.com",
        home_url: STUDIO_URL,
        accepted_pages: &[
            "https://studio.youtube.com/channel/<CHANNEL_ID>/videos/upload",
            "https://studio.youtube.com/playlist/<PLAYLIST_ID>/videos",
        ],
    }
}

/// Stable structural selectors. Text fallbacks live in [`labels`].
pub mod selectors {
    pub const VIDEO_ROW: &str = "ytcp-video-row";
    pub const EDIT_LINK: &str = r#"a[href*="/video/"][href*="/edit"]"#;
    pub const EDIT_DRAFT_BUTTON: &str = "ytcp-button.edit-draft-button";
    pub const RENDER_STATUS_BUTTON: &str = ".render-status-content ytcp-button";
    pub const ROW_BUTTON: &str = "ytcp-button";
    pub const ANY_BUTTON: &str = "button, ytcp-button";

    pub const EDITOR_DIALOG: &str = "ytcp-uploads-dialog";
    pub const ANY_DIALOG: &str = r#"dialog, ytcp-dialog, [role="dialog"]"#;
    pub const SCROLLABLE_CONTENT: &str = "#scrollable-content";

    pub const PLAYLIST_SECTION: &str = "ytcp-video-metadata-playlists";
    pub const PLAYLIST_TRIGGER: &str = "ytcp-video-metadata-playlists ytcp-dropdown-trigger";
    pub const PLAYLIST_LIST: &str = "#playlists-list, ytcp-playlist-dialog";
    pub const PLAYLIST_OPTION: &str = "label.ytcp-checkbox-group";
    pub const PLAYLIST_DONE: &str = ".done-button";
    pub const PLAYLIST_DIALOG_DONE: &str = "ytcp-playlist-dialog #done-button";
    pub const PLAYLIST_DONE_LABEL: &str = r#"ytcp-button[label="Done"]"#;
    pub const PLAYLIST_FOOTER_LAST: &str =
        "ytcp-playlist-dialog .ytcp-playlist-dialog-content + div ytcp-button:last-child";
    pub const PLAYLIST_CANCEL: &str = "ytcp-playlist-dialog #cancel-button";
    pub const PLAYLIST_FOOTER_FIRST: &str =
        "ytcp-playlist-dialog .ytcp-playlist-dialog-content + div ytcp-button:first-child";
    pub const PLAYLIST_DIALOG_BUTTONS: &str =
        "ytcp-playlist-dialog ytcp-button, ytcp-playlist-dialog button";

    pub const RADIO_BUTTON: &str = "tp-yt-paper-radio-button";
    /// Label line only; the radio's full text also carries its description.
    pub const RADIO_LABEL: &str = "tp-yt-paper-radio-button #radioLabel";
    pub const NOT_FOR_KIDS_RADIO: &str =
        r#"tp-yt-paper-radio-button[name="VIDEO_MADE_FOR_KIDS_NOT_MFK"]"#;

    pub const VISIBILITY_STEP: &str = "#step-badge-3";
    pub const STEPPER_TABS: &str = r#"ytcp-stepper [role="tab"], ytcp-stepper button"#;
    pub const NEXT_STEP: &str = "#next-button";
    pub const NEXT_STEP_BUTTON: &str = "ytcp-button#next-button";
    pub const NEXT_STEP_TEST_ID: &str = r#"[test-id="NEXT_STEP_BUTTON"]"#;

    pub const SAVE_BUTTON: &str = "#save-button";
    pub const PUBLISH_BUTTON: &str = "#publish-button";
    pub const DONE_BUTTON: &str = "#done-button";

    pub const SHARE_URL: &str = "ytcp-video-share-dialog #share-url";
    pub const SHARE_DIALOG: &str = "ytcp-video-share-dialog";
    pub const SHARE_CLOSE_ICON: &str = "ytcp-video-share-dialog #close-icon-button";
    pub const SHARE_CLOSE_BUTTON: &str = "ytcp-video-share-dialog #close-button";
    pub const CLOSE_ICON: &str = r#"ytcp-icon-button[icon="close"]"#;
    pub const CLOSE_BY_ID: &str = "#close-button";

    pub const NEXT_PAGE: &str = "ytcp-icon-button#navigate-after";
    pub const PAGE_SIZE_FOOTER: &str = ".ytcp-table-footer ytcp-dropdown-trigger";
    pub const PAGE_SIZE_PAGINATOR: &str = "ytcp-table-paginator ytcp-dropdown-trigger";
    pub const MENU_ITEM: &str = "tp-yt-paper-item";

    pub fn visibility_radio(name: &str) -> String {
        format!(r#"tp-yt-paper-radio-button[name="{}"]"#, name)
    }
}

/// Localized strings used when structural lookups miss (en, zh-TW, zh-CN).
pub mod labels {
    pub const EDIT_DRAFT: &[&str] = &["Edit draft", "編輯草稿", "编辑草稿"];
    pub const DONE: &[&str] = &["Done", "完成"];
    pub const CANCEL: &[&str] = &["Cancel", "取消"];
    pub const NOT_FOR_KIDS: &[&str] = &[
        "No, it's not made for kids",
        "否，這部影片不是為兒童打造的內容",
        "否，内容不是面向儿童的",
    ];
    pub const VISIBILITY_STEP: &[&str] = &["Visibility", "瀏覽權限", "公开范围"];
    pub const NEXT: &[&str] = &["Next", "繼續", "下一步"];
    pub const SAVE: &[&str] = &["Save", "Publish", "Done", "儲存", "發布", "保存", "发布"];
    pub const PUBLIC: &[&str] = &["Public", "公開", "公开"];
    pub const UNLISTED: &[&str] = &["Unlisted", "不公開", "不公开列出"];
    pub const PRIVATE: &[&str] = &["Private", "私人", "私享"];
    pub const PUBLISHED: &[&str] = &["Video published", "影片已發布", "视频已发布"];
}

/// Semantic targets of the Studio content list and its draft editor.
#[derive(Debug, Clone)]
pub struct StudioCatalog {
    pub edit_action: Target,
    pub editor_surface: Target,
    pub playlist_section: Target,
    pub playlist_trigger: Target,
    pub playlist_list: Target,
    pub playlist_done: Target,
    pub playlist_cancel: Target,
    pub not_for_kids: Target,
    pub visibility_step: Target,
    pub next_step: Target,
    pub save: Target,
    pub share_surface: Target,
    pub share_close: Target,
    pub close_icon: Target,
    pub close_by_id: Target,
    pub next_page: Target,
    pub page_size_trigger: Target,
    pub scroll_container: &'static str,
    pub published_texts: Vec<String>,
}

impl Default for StudioCatalog {
    fn default() -> Self {
        use selectors as s;

        Self {
            edit_action: Target::new(
                "edit draft",
                vec![Lookup::InContainer {
                    container: s::VIDEO_ROW.into(),
                    anchor: Some(s::EDIT_LINK.into()),
                    candidates: vec![
                        s::EDIT_DRAFT_BUTTON.into(),
                        s::RENDER_STATUS_BUTTON.into(),
                        s::ROW_BUTTON.into(),
                    ],
                }],
            )
            .or_text(Lookup::text_equals(s::ANY_BUTTON, labels::EDIT_DRAFT.iter().copied())),
            editor_surface: Target::css("editor", &[s::EDITOR_DIALOG, s::ANY_DIALOG]),
            playlist_section: Target::css("playlist section", &[s::PLAYLIST_SECTION]),
            playlist_trigger: Target::css("playlist dropdown", &[s::PLAYLIST_TRIGGER]),
            playlist_list: Target::css("playlist list", &[s::PLAYLIST_LIST]),
            playlist_done: Target::css(
                "playlist done",
                &[
                    s::PLAYLIST_DONE,
                    s::PLAYLIST_DIALOG_DONE,
                    s::PLAYLIST_DONE_LABEL,
                    s::PLAYLIST_FOOTER_LAST,
                ],
            )
            .or_text(Lookup::text_equals(
                s::PLAYLIST_DIALOG_BUTTONS,
                labels::DONE.iter().copied(),
            )),
            playlist_cancel: Target::css(
                "playlist cancel",
                &[s::PLAYLIST_CANCEL, s::PLAYLIST_FOOTER_FIRST],
            )
            .or_text(Lookup::text_equals(
                s::PLAYLIST_DIALOG_BUTTONS,
                labels::CANCEL.iter().copied(),
            )),
            not_for_kids: Target::css("not made for kids", &[s::NOT_FOR_KIDS_RADIO])
                .or_text(Lookup::text_contains(
                    s::RADIO_BUTTON,
                    labels::NOT_FOR_KIDS.iter().copied(),
                )),
            visibility_step: Target::css("visibility step", &[s::VISIBILITY_STEP]).or_text(
                Lookup::text_equals(s::STEPPER_TABS, labels::VISIBILITY_STEP.iter().copied()),
            ),
            next_step: Target::css(
                "next step",
                &[s::NEXT_STEP, s::NEXT_STEP_BUTTON, s::NEXT_STEP_TEST_ID],
            )
            .or_text(Lookup::text_equals(s::ANY_BUTTON, labels::NEXT.iter().copied())),
            save: Target::css("save", &[s::SAVE_BUTTON, s::PUBLISH_BUTTON, s::DONE_BUTTON])
                .or_text(Lookup::text_equals(s::ANY_BUTTON, labels::SAVE.iter().copied())),
            share_surface: Target::css("share dialog", &[s::SHARE_URL, s::SHARE_DIALOG]),
            share_close: Target::css(
                "share dialog close",
                &[s::SHARE_CLOSE_ICON, s::SHARE_CLOSE_BUTTON],
            ),
            close_icon: Target::css("close icon", &[s::CLOSE_ICON]),
            close_by_id: Target::css("close button", &[s::CLOSE_BY_ID]),
            next_page: Target::css("next page", &[s::NEXT_PAGE]),
            page_size_trigger: Target::css(
                "rows per page",
                &[s::PAGE_SIZE_FOOTER, s::PAGE_SIZE_PAGINATOR],
            ),
            scroll_container: s::SCROLLABLE_CONTENT,
            published_texts: labels::PUBLISHED.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl StudioCatalog {
    pub fn playlist_option(&self, name: &str) -> Target {
        Target::new(
            "playlist option",
            vec![Lookup::text_contains(selectors::PLAYLIST_OPTION, [name])],
        )
    }

    pub fn visibility_option(&self, visibility: Visibility) -> Target {
        let localized = match visibility {
            Visibility::Public => labels::PUBLIC,
            Visibility::Unlisted => labels::UNLISTED,
            Visibility::Private => labels::PRIVATE,
        };
        Target::new(
            "visibility option",
            vec![Lookup::css(selectors::visibility_radio(visibility.radio_name()))],
        )
        .or_text(Lookup::text_equals(
            selectors::RADIO_LABEL,
            localized.iter().copied(),
        ))
    }

    pub fn page_size_option(&self, rows: u32) -> Target {
        Target::new(
            "rows per page option",
            vec![Lookup::text_equals(selectors::MENU_ITEM, [rows.to_string()])],
        )
    }
}

/// Which list the operator started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioPage {
    ChannelContent,
    Playlist,
}

/// Recognizes the content-list addresses a run may start from.
#[derive(Debug, Clone)]
pub struct UrlGate {
    channel_content: Regex,
    playlist: Regex,
}

impl UrlGate {
    pub fn new() -> Result<Self> {
        Ok(Self {
            channel_content: Regex::new(r"^https://studio\.youtube\.com/channel/[^/]+/videos")
                .context("Invalid channel content URL pattern")?,
            playlist: Regex::new(r"^https://studio\.youtube\.com/playlist/[^/]+/videos")
                .context("Invalid playlist URL pattern")?,
        })
    }

    pub fn classify(&self, url: &str) -> Option<StudioPage> {
        if self.channel_content.is_match(url) {
            Some(StudioPage::ChannelContent)
        } else if self.playlist.is_match(url) {
            Some(StudioPage::Playlist)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_accepts_content_and_playlist_lists() {
        let gate = UrlGate::new().unwrap();
        assert_eq!(
            gate.classify("https://studio.youtube.com/channel/UC123/videos/upload?filter=draft"),
            Some(StudioPage::ChannelContent)
        );
        assert_eq!(
            gate.classify("https://studio.youtube.com/playlist/PL9/videos"),
            Some(StudioPage::Playlist)
        );
    }

    #[test]
    fn gate_rejects_other_pages() {
        let gate = UrlGate::new().unwrap();
        assert_eq!(gate.classify("https://studio.youtube.com/channel/UC123/analytics"), None);
        assert_eq!(gate.classify("https://www.youtube.com/channel/UC123/videos"), None);
        assert_eq!(gate.classify("http://studio.youtube.com/channel/UC123/videos"), None);
    }

    #[test]
    fn structural_strategies_precede_text() {
        let catalog = StudioCatalog::default();
        for target in [
            &catalog.edit_action,
            &catalog.save,
            &catalog.not_for_kids,
            &catalog.next_step,
            &catalog.playlist_done,
        ] {
            let first_text = target
                .strategies
                .iter()
                .position(Lookup::is_textual)
                .unwrap_or(target.strategies.len());
            assert!(
                target.strategies[first_text..].iter().all(Lookup::is_textual),
                "{} mixes text before structure",
                target.name
            );
            assert!(first_text > 0, "{} starts with text", target.name);
        }
    }

    #[test]
    fn visibility_option_uses_radio_name_first() {
        let target = StudioCatalog::default().visibility_option(Visibility::Private);
        assert_eq!(
            target.strategies[0],
            Lookup::css(r#"tp-yt-paper-radio-button[name="PRIVATE"]"#)
        );
        assert!(target.strategies[1].is_textual());
    }

    #[test]
    fn visibility_text_fallback_matches_the_label_exactly() {
        let target = StudioCatalog::default().visibility_option(Visibility::Public);
        match &target.strategies[1] {
            Lookup::Text { scope, texts, exact } => {
                assert_eq!(scope, selectors::RADIO_LABEL);
                assert!(scope.ends_with("#radioLabel"));
                assert!(*exact);
                assert!(texts.iter().any(|t| t == "公開"));
                assert!(!texts.iter().any(|t| t == "不公開"));
            }
            other => panic!("unexpected fallback {}", other),
        }
    }
}
