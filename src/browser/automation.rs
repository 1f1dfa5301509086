use crate::engine::lookup::{Element, ElementHandle, Lookup};
use crate::engine::surface::Surface;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use log::{debug, info};

const HANDLE_ATTR: &str = "data-draft-publisher-handle";

/// Page-side half of [`Surface::query`]. Tags every returned node with a
/// handle attribute so later actions can find the same node again.
const QUERY_JS: &str = r#"
(function(lookup, handleAttr) {
    const normalize = (value) => (value || '').replace(/\s+/g, ' ').trim();
    const seqKey = '__draftPublisherHandleSeq';

    function queryAll(root, selector) {
        try {
            return Array.from(root.querySelectorAll(selector));
        } catch (_) {
            return [];
        }
    }

    function isVisible(el) {
        if (!el || !el.isConnected || el.offsetParent === null) return false;
        const style = window.getComputedStyle(el);
        if (!style || style.visibility === 'hidden' || style.display === 'none') return false;
        return el.getClientRects().length > 0;
    }

    function isEnabled(el) {
        return !el.hasAttribute('disabled')
            && el.disabled !== true
            && el.getAttribute('aria-disabled') !== 'true';
    }

    function isChecked(el) {
        const own = el.hasAttribute('checked') || el.hasAttribute('aria-checked');
        let box = own ? el : el.querySelector('[aria-checked], [checked], ytcp-checkbox-lit');
        // A radio label reports the state of its radio
        if (!box) box = el.closest('tp-yt-paper-radio-button, [role="radio"]');
        if (!box) return false;
        return box.hasAttribute('checked') || box.getAttribute('aria-checked') === 'true';
    }

    function isActive(el) {
        return el.hasAttribute('active') || el.getAttribute('aria-selected') === 'true';
    }

    function describe(el) {
        let handle = el.getAttribute(handleAttr);
        if (!handle) {
            window[seqKey] = (window[seqKey] || 0) + 1;
            handle = String(window[seqKey]);
            el.setAttribute(handleAttr, handle);
        }
        return {
            handle,
            visible: isVisible(el),
            enabled: isEnabled(el),
            checked: isChecked(el),
            active: isActive(el),
            text: normalize(el.textContent).slice(0, 500)
        };
    }

    let found = [];
    if (lookup.kind === 'css') {
        found = queryAll(document, lookup.selector);
    } else if (lookup.kind === 'in_container') {
        for (const container of queryAll(document, lookup.container)) {
            if (lookup.anchor && queryAll(container, lookup.anchor).length === 0) continue;
            let pick = null;
            for (const sel of lookup.candidates || []) {
                pick = queryAll(container, sel).find((el) => isVisible(el) && isEnabled(el)) || null;
                if (pick) break;
            }
            if (pick && !found.includes(pick)) found.push(pick);
        }
    } else if (lookup.kind === 'text') {
        found = queryAll(document, lookup.scope).filter((el) => {
            const text = normalize(el.textContent);
            return (lookup.texts || []).some((t) => lookup.exact ? text === t : text.includes(t));
        });
    }

    return JSON.stringify(found.map(describe));
})(__LOOKUP__, __HANDLE_ATTR__)
"#;

/// Connect to an already-running Chrome and pick the Studio tab if there is one.
pub async fn connect_to_chrome(port: u16) -> Result<(Browser, Page)> {
    let debug_url = format!("http://127.0.0.1:{}", port);

    let (browser, mut handler) = Browser::connect(&debug_url)
        .await
        .with_context(|| format!("Failed to connect to Chrome on port {}", port))?;

    // Drive the CDP handler in the background
    tokio::spawn(async move {
        while let Some(_event) = handler.next().await {}
    });

    // Prefer the Studio tab, else the first open page
    let pages = browser.pages().await.context("Failed to list Chrome pages")?;
    let mut chosen = None;
    for page in &pages {
        let url = page.url().await.ok().flatten().unwrap_or_default();
        if url.contains("studio.youtube.com") {
            chosen = Some(page.clone());
            break;
        }
    }
    let page = match chosen {
        Some(page) => page,
        None => pages.into_iter().next().context("No pages found in Chrome")?,
    };

    info!("Connected to Chrome CDP on port {}", port);
    Ok((browser, page))
}

/// [`Surface`] backed by a live Chrome tab.
#[derive(Clone)]
pub struct CdpSurface {
    page: Page,
}

impl CdpSurface {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn eval_string(&self, js: &str) -> Result<String> {
        self.page
            .evaluate(js)
            .await
            .context("Failed to execute JavaScript")?
            .into_value::<String>()
            .context("JavaScript returned a non-string value")
    }

    async fn eval_bool(&self, js: &str) -> Result<bool> {
        self.page
            .evaluate(js)
            .await
            .context("Failed to execute JavaScript")?
            .into_value::<bool>()
            .context("JavaScript returned a non-boolean value")
    }

    /// Runs `body` with `el` bound to the handle's node; returns false if the
    /// node is gone.
    async fn with_handle(&self, handle: &ElementHandle, body: &str) -> Result<bool> {
        // Look the node up again by its handle attribute
        let js = format!(
            r#"
            (function() {{
                const el = document.querySelector('[{}="' + {} + '"]');
                if (!el || !el.isConnected) return false;
                {}
                return true;
            }})()
            "#,
            HANDLE_ATTR,
            js_string(handle.as_str())?,
            body
        );
        self.eval_bool(&js).await
    }
}

#[async_trait]
impl Surface for CdpSurface {
    async fn current_url(&self) -> Result<String> {
        self.eval_string("window.location.href").await
    }

    async fn query(&self, lookup: &Lookup) -> Result<Vec<Element>> {
        // The script returns JSON text, parsed here into element snapshots
        let js = query_script(lookup)?;
        let raw = self.eval_string(&js).await?;
        let found: Vec<Element> =
            serde_json::from_str(&raw).with_context(|| format!("Malformed query result for {}", lookup))?;
        debug!("[cdp] {} -> {} match(es)", lookup, found.len());
        Ok(found)
    }

    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<()> {
        if !self
            .with_handle(handle, "el.scrollIntoView({ behavior: 'smooth', block: 'center' });")
            .await?
        {
            bail!("element {} is no longer attached", handle);
        }
        Ok(())
    }

    async fn click(&self, handle: &ElementHandle) -> Result<()> {
        if !self.with_handle(handle, "el.click();").await? {
            bail!("element {} is no longer attached", handle);
        }
        Ok(())
    }

    async fn press_escape(&self) -> Result<()> {
        // Studio listens on document for Escape to close popups
        self.eval_bool(
            "document.dispatchEvent(new KeyboardEvent('keydown', { key: 'Escape', code: 'Escape', keyCode: 27, bubbles: true })) || true",
        )
        .await?;
        Ok(())
    }

    async fn scroll_to_end(&self, selector: &str) -> Result<bool> {
        let js = format!(
            r#"
            (function() {{
                let el = null;
                try {{ el = document.querySelector({}); }} catch (_) {{ return false; }}
                if (!el) return false;
                el.scrollTop = el.scrollHeight;
                return true;
            }})()
            "#,
            js_string(selector)?
        );
        self.eval_bool(&js).await
    }

    async fn body_contains(&self, text: &str) -> Result<bool> {
        let js = format!(
            "!!(document.body && (document.body.textContent || '').includes({}))",
            js_string(text)?
        );
        self.eval_bool(&js).await
    }
}

/// Fills [`QUERY_JS`] for one lookup. The handle attribute goes in first so
/// that lookup text is never rewritten.
fn query_script(lookup: &Lookup) -> Result<String> {
    let js = QUERY_JS
        .replace("__HANDLE_ATTR__", &js_string(HANDLE_ATTR)?)
        .replace("__LOOKUP__", &serde_json::to_string(lookup)?);
    Ok(js)
}

/// Quotes `value` as a JavaScript string literal.
fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value).context("Failed to encode JavaScript string")
}
