//! Visual overlays for debugging snapshots.
//!
//! Boxes and index labels are drawn into a single container element with a
//! fixed id, so removal is one node removal and can never leave residual
//! styling behind. Screenshot capture drives draw/clear around the capture
//! and clears even when the capture fails.

use crate::bridge::PageBridge;
use crate::dom::Snapshot;
use crate::error::Result;
use serde_json::{json, Value};

/// Id of the overlay container injected into the page.
pub const HIGHLIGHT_CONTAINER_ID: &str = "domsnap-highlight-container";

const DRAW_SCRIPT: &str = r#"
(payload) => {
    const existing = document.getElementById(payload.containerId);
    if (existing) existing.remove();

    const container = document.createElement('div');
    container.id = payload.containerId;
    container.style.position = 'fixed';
    container.style.top = '0';
    container.style.left = '0';
    container.style.width = '0';
    container.style.height = '0';
    container.style.pointerEvents = 'none';
    container.style.zIndex = '2147483647';
    document.body.appendChild(container);

    for (const el of payload.elements) {
        const color = el.focused ? '#ff4444' : '#4488ff';

        const box = document.createElement('div');
        box.style.position = 'fixed';
        box.style.left = el.x + 'px';
        box.style.top = el.y + 'px';
        box.style.width = el.width + 'px';
        box.style.height = el.height + 'px';
        box.style.border = '2px solid ' + color;
        box.style.backgroundColor = color + '22';
        box.style.pointerEvents = 'none';
        container.appendChild(box);

        const label = document.createElement('div');
        label.textContent = String(el.index);
        label.style.position = 'fixed';
        label.style.left = el.x + 'px';
        label.style.top = Math.max(0, el.y - 16) + 'px';
        label.style.background = color;
        label.style.color = 'white';
        label.style.fontSize = '12px';
        label.style.fontFamily = 'monospace';
        label.style.padding = '0 3px';
        label.style.pointerEvents = 'none';
        container.appendChild(label);
    }
    return payload.elements.length;
}
"#;

const REMOVE_SCRIPT: &str = r#"
(containerId) => {
    const container = document.getElementById(containerId);
    if (container) { container.remove(); return true; }
    return false;
}
"#;

pub struct HighlightRenderer;

impl HighlightRenderer {
    /// Overlay every addressable element of `snapshot`. The focused index,
    /// if any, gets a distinct color. Returns how many boxes were drawn.
    pub async fn draw<B: PageBridge>(
        bridge: &B,
        snapshot: &Snapshot,
        focus: Option<usize>,
    ) -> Result<usize> {
        let payload = overlay_payload(snapshot, focus);
        let drawn = bridge.evaluate(DRAW_SCRIPT, payload).await?;
        Ok(drawn.as_u64().unwrap_or(0) as usize)
    }

    /// Remove the overlay container. Idempotent.
    pub async fn clear<B: PageBridge>(bridge: &B) -> Result<()> {
        bridge
            .evaluate(REMOVE_SCRIPT, Value::String(HIGHLIGHT_CONTAINER_ID.to_string()))
            .await?;
        Ok(())
    }
}

/// Build the draw payload from a snapshot. Entries without host geometry
/// cannot be drawn and are skipped.
fn overlay_payload(snapshot: &Snapshot, focus: Option<usize>) -> Value {
    let elements: Vec<Value> = snapshot
        .entries()
        .iter()
        .filter_map(|entry| {
            let bbox = entry.bounding_box?;
            Some(json!({
                "index": entry.index,
                "x": bbox.x,
                "y": bbox.y,
                "width": bbox.width,
                "height": bbox.height,
                "focused": focus == Some(entry.index),
            }))
        })
        .collect();
    json!({ "containerId": HIGHLIGHT_CONTAINER_ID, "elements": elements })
}
