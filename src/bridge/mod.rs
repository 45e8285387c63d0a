//! Page evaluation bridge.
//!
//! The snapshot core never talks to a browser directly. Everything it needs
//! from the live page goes through [`PageBridge`]: one evaluation round trip
//! for the extraction script, frame enumeration, and the xpath-based locate
//! primitives used at action time. [`cdp::CdpBridge`] is the production
//! implementation over Chrome DevTools Protocol; tests substitute a mock.

pub mod cdp;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub use cdp::CdpBridge;

/// A sub-frame of the page, as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInfo {
    /// Frame source URL. May be empty for srcdoc/blank frames.
    #[serde(default)]
    pub url: String,

    /// Whether the frame occupies visible space on the page.
    #[serde(default, rename = "isVisible")]
    pub is_visible: bool,
}

/// Capabilities the snapshot core consumes from the live page.
///
/// `evaluate` executes a script (a JS function source) with JSON arguments
/// and returns its JSON-serializable result. One evaluation call is atomic
/// with respect to page-side script, but the DOM may still mutate between a
/// snapshot and a later `click_by_xpath`/`type_by_xpath` call; the locate
/// primitives therefore report staleness as `Ok(false)` rather than an error.
#[async_trait]
pub trait PageBridge: Send + Sync {
    /// Execute a script in the page context and return its result.
    async fn evaluate(&self, script: &str, args: Value) -> Result<Value>;

    /// URL of the page the bridge is attached to.
    async fn current_url(&self) -> Result<String>;

    /// Enumerate the page's sub-frames with their URLs and visibility.
    async fn frames(&self) -> Result<Vec<FrameInfo>>;

    /// Re-locate an element by xpath within `timeout` and click it.
    /// Returns `Ok(false)` if the element could not be resolved in time.
    async fn click_by_xpath(&self, xpath: &str, timeout: Duration) -> Result<bool>;

    /// Re-locate an element by xpath, clear it, and type `text` into it.
    /// Returns `Ok(false)` if the element could not be resolved in time.
    async fn type_by_xpath(&self, xpath: &str, text: &str, timeout: Duration) -> Result<bool>;

    /// Capture a screenshot of the page as PNG bytes.
    async fn capture_screenshot(&self) -> Result<Vec<u8>>;
}
