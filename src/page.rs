//! Snapshot-then-act session over one page.
//!
//! Each extraction is a pure function of the current page state and explicit
//! parameters: evaluate, build, classify, optionally act. Nothing persists
//! between calls; the returned [`Snapshot`] belongs to the caller, and
//! actions take it back by reference so a stale map is always the caller's
//! explicit choice, never hidden session state. Callers must serialize
//! snapshot-then-act sequences against the same page.

use crate::bridge::PageBridge;
use crate::dom::{DomSnapshotBuilder, RawSnapshot, Snapshot};
use crate::error::{Result, SnapshotError};
use crate::frames::FrameFilter;
use crate::highlight::HighlightRenderer;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The extraction script, injected through the bridge in one round trip.
pub const EXTRACT_SCRIPT: &str = include_str!("dom/extract_dom.js");

/// Trivial round trip used to detect a crashed or detached page context
/// before paying for the real extraction.
const SANITY_SCRIPT: &str = "() => 1 + 1";

const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(3);

/// Parameters of one snapshot capture.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOptions {
    /// Draw debug overlays over addressable elements after the capture.
    pub highlight_elements: bool,

    /// Index to emphasize when highlighting.
    pub focus_element: Option<usize>,

    /// Pixel margin added around the viewport when deciding which
    /// interactive elements are addressable. Negative disables the
    /// viewport gate entirely.
    pub viewport_expansion: i64,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            highlight_elements: false,
            focus_element: None,
            viewport_expansion: 0,
        }
    }
}

impl SnapshotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlight_elements(mut self, highlight: bool) -> Self {
        self.highlight_elements = highlight;
        self
    }

    pub fn focus_element(mut self, index: usize) -> Self {
        self.focus_element = Some(index);
        self
    }

    pub fn viewport_expansion(mut self, pixels: i64) -> Self {
        self.viewport_expansion = pixels;
        self
    }
}

/// Blank placeholder pages carry no content worth an evaluation round trip.
pub fn is_blank_url(url: &str) -> bool {
    let trimmed = url.trim();
    trimmed.is_empty()
        || trimmed.starts_with("about:blank")
        || trimmed == "about:srcdoc"
        || trimmed == "chrome://newtab/"
}

/// One page, one bridge: snapshot capture plus index-addressed actions.
pub struct PageSession<B: PageBridge> {
    bridge: B,
    action_timeout: Duration,
}

impl<B: PageBridge> PageSession<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }

    /// Bound on the locate wait inside `click`/`type_text`.
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Capture one snapshot of the page.
    ///
    /// Blank placeholder pages short-circuit to [`Snapshot::blank`] without
    /// touching the bridge's evaluator. Otherwise the context is sanity
    /// checked with a trivial evaluation first: a wrong answer means the
    /// execution context is crashed or detached, which no retry here can
    /// fix.
    pub async fn get_snapshot(&self, options: SnapshotOptions) -> Result<Snapshot> {
        let url = self.bridge.current_url().await?;
        if is_blank_url(&url) {
            log::debug!("blank page {}, returning minimal snapshot", url);
            return Ok(Snapshot::blank());
        }

        let sanity = self.bridge.evaluate(SANITY_SCRIPT, Value::Null).await?;
        if sanity != Value::from(2) {
            return Err(SnapshotError::Evaluation(format!(
                "page context failed sanity check, got {} for 1 + 1",
                sanity
            )));
        }

        let payload = self.bridge.evaluate(EXTRACT_SCRIPT, Value::Null).await?;
        let raw: RawSnapshot = serde_json::from_value(payload)
            .map_err(|e| SnapshotError::Structural(format!("extraction payload malformed: {}", e)))?;

        let snapshot = DomSnapshotBuilder::new(options.viewport_expansion).build(raw)?;
        log::debug!(
            "snapshot of {}: {} nodes, {} addressable",
            url,
            snapshot.tree.len(),
            snapshot.selector_map.len()
        );

        if options.highlight_elements {
            HighlightRenderer::draw(&self.bridge, &snapshot, options.focus_element).await?;
        }
        Ok(snapshot)
    }

    /// Click the element at `index`.
    ///
    /// An index missing from the map is a hard error; the caller must be
    /// able to tell "bad reference" from "nothing happened". A present index
    /// whose xpath no longer resolves (the page mutated) returns
    /// `Ok(false)`; take a fresh snapshot before retrying.
    pub async fn click(&self, snapshot: &Snapshot, index: usize) -> Result<bool> {
        let xpath = snapshot
            .xpath_of(index)
            .ok_or(SnapshotError::IndexNotFound(index))?;
        let clicked = self
            .bridge
            .click_by_xpath(xpath, self.action_timeout)
            .await?;
        if !clicked {
            log::debug!("click [{}] failed to resolve {}", index, xpath);
        }
        Ok(clicked)
    }

    /// Clear the element at `index` and type `text` into it. Same contract
    /// as [`click`](Self::click).
    pub async fn type_text(&self, snapshot: &Snapshot, index: usize, text: &str) -> Result<bool> {
        let xpath = snapshot
            .xpath_of(index)
            .ok_or(SnapshotError::IndexNotFound(index))?;
        let typed = self
            .bridge
            .type_by_xpath(xpath, text, self.action_timeout)
            .await?;
        if !typed {
            log::debug!("type [{}] failed to resolve {}", index, xpath);
        }
        Ok(typed)
    }

    /// Navigable cross-origin frame URLs: visible, not ad/tracking, host
    /// differing from the page's. Same-origin frames are already part of
    /// the main tree.
    pub async fn list_cross_origin_frames(&self) -> Result<Vec<String>> {
        let url = self.bridge.current_url().await?;
        let frames = self.bridge.frames().await?;
        Ok(FrameFilter::new(&url).cross_origin_urls(&frames))
    }

    /// Write a page screenshot to `path` (format chosen by extension).
    ///
    /// With `highlight` set and a snapshot to draw from, index overlays are
    /// injected for the capture and removed afterwards. Removal runs even
    /// when the capture fails, so no styling outlives this call.
    pub async fn screenshot(
        &self,
        snapshot: Option<&Snapshot>,
        path: &Path,
        highlight: bool,
    ) -> Result<PathBuf> {
        let overlay = match (highlight, snapshot) {
            (true, Some(snapshot)) => {
                HighlightRenderer::draw(&self.bridge, snapshot, None).await?;
                true
            }
            _ => false,
        };

        let captured = self.bridge.capture_screenshot().await;
        if overlay {
            if let Err(e) = HighlightRenderer::clear(&self.bridge).await {
                log::warn!("failed to remove highlight overlay: {}", e);
            }
        }
        let png = captured?;

        let img = image::load_from_memory(&png)
            .map_err(|e| SnapshotError::Screenshot(format!("decoding capture: {}", e)))?;
        img.save(path)
            .map_err(|e| SnapshotError::Screenshot(format!("writing {}: {}", path.display(), e)))?;
        Ok(path.to_path_buf())
    }

    /// Remove any debug overlay left by `get_snapshot` with
    /// `highlight_elements`.
    pub async fn remove_highlights(&self) -> Result<()> {
        HighlightRenderer::clear(&self.bridge).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_options_builder() {
        let options = SnapshotOptions::new()
            .highlight_elements(true)
            .focus_element(4)
            .viewport_expansion(500);

        assert!(options.highlight_elements);
        assert_eq!(options.focus_element, Some(4));
        assert_eq!(options.viewport_expansion, 500);

        let defaults = SnapshotOptions::default();
        assert!(!defaults.highlight_elements);
        assert_eq!(defaults.focus_element, None);
        assert_eq!(defaults.viewport_expansion, 0);
    }

    #[test]
    fn test_blank_url_detection() {
        assert!(is_blank_url("about:blank"));
        assert!(is_blank_url("about:blank#frame"));
        assert!(is_blank_url(""));
        assert!(is_blank_url("  "));
        assert!(is_blank_url("chrome://newtab/"));
        assert!(!is_blank_url("https://example.com"));
        assert!(!is_blank_url("about:config"));
    }
}
