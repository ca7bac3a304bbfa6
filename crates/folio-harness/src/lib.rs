#![forbid(unsafe_code)]

//! Deterministic test harness for the Folio page controller.
//!
//! - **Synthetic page**: an in-memory [`folio_core::Dom`] with document-space
//!   layout ([`synthetic`]).
//! - **Observer simulation**: threshold-crossing visibility entries computed
//!   from that layout ([`observer`]).
//! - **Scenarios**: JSONL-scripted sessions with record/replay and
//!   serializable snapshots ([`scenario`]).
//!
//! # Quick Start
//!
//! ```ignore
//! use folio_core::PageConfig;
//! use folio_harness::scenario::{ScenarioEvent, Session};
//! use folio_harness::synthetic::portfolio;
//!
//! let (page, _nodes) = portfolio();
//! let mut session = Session::start(page, PageConfig::default()).unwrap();
//! session.apply(&ScenarioEvent::Scroll { y: 3000.0 });
//! assert_eq!(session.snapshot().active_links, vec!["#skills"]);
//! ```

pub mod logging;
pub mod observer;
pub mod scenario;
pub mod selector;
pub mod synthetic;

pub use scenario::{PageSnapshot, ScenarioEvent, Session, parse_jsonl, replay, to_jsonl};
pub use synthetic::{PortfolioNodes, SyntheticPage, portfolio};
