//! Chrome DevTools Protocol implementation of [`PageBridge`].

use crate::bridge::{FrameInfo, PageBridge};
use crate::error::{Result, SnapshotError};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Element, Tab};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How often the bounded xpath wait re-polls the page.
const LOCATE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Script used by [`PageBridge::frames`]. Runs in the top-level context, so
/// it can read each frame's `src` attribute and geometry but not the content
/// of cross-origin frames.
const FRAMES_SCRIPT: &str = r#"
() => Array.from(document.querySelectorAll('iframe, frame')).map((f) => {
    const rect = f.getBoundingClientRect();
    const style = window.getComputedStyle(f);
    return {
        url: f.src || '',
        isVisible: rect.width > 0 && rect.height > 0
            && style.display !== 'none' && style.visibility !== 'hidden',
    };
})
"#;

/// [`PageBridge`] backed by a `headless_chrome` tab.
///
/// CDP calls are synchronous and expected to return quickly; the only place
/// this bridge actually waits is the xpath locate loop, which yields through
/// the tokio timer between polls.
pub struct CdpBridge {
    tab: Arc<Tab>,
}

impl CdpBridge {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    /// The underlying tab, for callers that need host operations outside the
    /// bridge contract (navigation, tab lifecycle).
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Poll `find_element_by_xpath` until the deadline. Returns `None` on
    /// timeout; per-poll misses are expected while the page settles.
    async fn locate(&self, xpath: &str, timeout: Duration) -> Option<Element<'_>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.tab.find_element_by_xpath(xpath) {
                Ok(element) => return Some(element),
                Err(e) => {
                    if Instant::now() >= deadline {
                        log::debug!("xpath {} did not resolve within {:?}: {}", xpath, timeout, e);
                        return None;
                    }
                    tokio::time::sleep(LOCATE_POLL_INTERVAL).await;
                }
            }
        }
    }
}

#[async_trait]
impl PageBridge for CdpBridge {
    async fn evaluate(&self, script: &str, args: Value) -> Result<Value> {
        // Wrap the function source in an immediate call and stringify the
        // result, so arbitrarily nested structures survive the CDP value
        // channel intact.
        let args_json = serde_json::to_string(&args)
            .map_err(|e| SnapshotError::Evaluation(format!("args not serializable: {}", e)))?;
        let expression = format!("JSON.stringify(({})({}))", script, args_json);

        let remote = self
            .tab
            .evaluate(&expression, false)
            .map_err(|e| SnapshotError::Evaluation(format!("script execution failed: {}", e)))?;

        match remote.value {
            // undefined stringifies to nothing; report it as JSON null.
            None => Ok(Value::Null),
            Some(Value::String(json_str)) => serde_json::from_str(&json_str)
                .map_err(|e| SnapshotError::Evaluation(format!("result not valid JSON: {}", e))),
            Some(other) => Err(SnapshotError::Evaluation(format!(
                "expected stringified result, got {}",
                other
            ))),
        }
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    async fn frames(&self) -> Result<Vec<FrameInfo>> {
        let value = self.evaluate(FRAMES_SCRIPT, Value::Null).await?;
        serde_json::from_value(value)
            .map_err(|e| SnapshotError::Bridge(format!("frame list malformed: {}", e)))
    }

    async fn click_by_xpath(&self, xpath: &str, timeout: Duration) -> Result<bool> {
        let Some(element) = self.locate(xpath, timeout).await else {
            return Ok(false);
        };
        match element.click() {
            Ok(_) => Ok(true),
            Err(e) => {
                // Element found but gone by click time: the page mutated
                // underneath us. Stale, not structural.
                log::debug!("click on {} failed after locate: {}", xpath, e);
                Ok(false)
            }
        }
    }

    async fn type_by_xpath(&self, xpath: &str, text: &str, timeout: Duration) -> Result<bool> {
        let Some(element) = self.locate(xpath, timeout).await else {
            return Ok(false);
        };

        // Focus, clear any existing value, then send the text.
        if element.click().is_err() {
            log::debug!("focus click on {} failed", xpath);
            return Ok(false);
        }
        let cleared = element.call_js_fn(
            "function() { if ('value' in this) { this.value = ''; } }",
            vec![],
            false,
        );
        if let Err(e) = cleared {
            log::debug!("clearing {} failed: {}", xpath, e);
            return Ok(false);
        }

        match element.type_into(text) {
            Ok(_) => Ok(true),
            Err(e) => {
                log::debug!("typing into {} failed: {}", xpath, e);
                Ok(false)
            }
        }
    }

    async fn capture_screenshot(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| SnapshotError::Screenshot(format!("capture failed: {}", e)))
    }
}
