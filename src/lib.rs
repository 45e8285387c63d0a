//! # domsnap
//!
//! DOM snapshot and interactive-element indexing for browser automation.
//!
//! A live page is mutable and hostile to addressing; this crate turns it
//! into a stable, self-contained snapshot a planner (scripted flow or AI
//! decision loop) can act on: one evaluation round trip captures the page
//! structure as a flat node map, the builder reconstructs a typed tree,
//! the classifier decides which elements are actionable and assigns them
//! small-integer highlight indices, and the session resolves those indices
//! back to live elements for click/type, tolerating the staleness that
//! inevitably creeps in between snapshot and action.
//!
//! ## Capturing a snapshot
//!
//! ```rust,no_run
//! use domsnap::{CdpBridge, PageSession, SnapshotOptions};
//! use headless_chrome::Browser;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let browser = Browser::default()?;
//! let tab = browser.new_tab()?;
//! tab.navigate_to("https://example.com")?;
//! tab.wait_until_navigated()?;
//!
//! let session = PageSession::new(CdpBridge::new(tab));
//! let snapshot = session
//!     .get_snapshot(SnapshotOptions::new().viewport_expansion(500))
//!     .await?;
//!
//! // Indexed one-line summaries, ready for a planner or LLM prompt.
//! println!("{}", snapshot.describe_elements());
//! # Ok(())
//! # }
//! ```
//!
//! ## Acting on an index
//!
//! ```rust,no_run
//! # use domsnap::{CdpBridge, PageSession, SnapshotOptions};
//! # async fn run(session: PageSession<CdpBridge>) -> domsnap::Result<()> {
//! let snapshot = session.get_snapshot(SnapshotOptions::default()).await?;
//! if !session.click(&snapshot, 3).await? {
//!     // The page mutated under us; re-snapshot before retrying.
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Indices are valid for one snapshot only. A failed resolution returns
//! `Ok(false)` rather than an error, so planners can branch without
//! unwinding; only a structurally bad index (`IndexNotFound`) or a crashed
//! page context (`Evaluation`) is an error.
//!
//! ## Module overview
//!
//! - [`bridge`]: the page-evaluation capability the core consumes, plus the
//!   Chrome DevTools Protocol implementation
//! - [`dom`]: snapshot model (node sum type, arena tree, builder,
//!   interactivity classifier, selector map)
//! - [`frames`]: cross-origin frame listing with ad/tracking filtering
//! - [`highlight`]: debug overlays, drawn and fully removed
//! - [`page`]: the snapshot-then-act session facade
//! - [`error`]: error types and result alias

pub mod bridge;
pub mod dom;
pub mod error;
pub mod frames;
pub mod highlight;
pub mod page;

pub use bridge::{CdpBridge, FrameInfo, PageBridge};
pub use dom::{
    BoundingBox, DomNode, DomSnapshotBuilder, DomTree, ElementNode, NodeId, SelectorEntry,
    SelectorMap, Snapshot, TextNode, ViewportInfo,
};
pub use error::{Result, SnapshotError};
pub use frames::FrameFilter;
pub use highlight::HighlightRenderer;
pub use page::{PageSession, SnapshotOptions, EXTRACT_SCRIPT};
