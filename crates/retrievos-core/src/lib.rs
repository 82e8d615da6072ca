//! Client-side state for the retrievos vulnerability dashboard.
//!
//! Everything a UI needs between the raw API payloads and the pixels:
//!
//! - **[`ViewModel`]** owns one batch's device snapshot plus filter and
//!   sort state, and derives the ordered row set on demand. The last row set
//!   it produced is retained verbatim so exports match what is on screen.
//!
//! - **Export pipeline** ([`export`]): a fixed 18-column CSV codec, a JSON
//!   serializer for the raw device objects, and the [`ExportGate`] state
//!   machine (trusted-gesture check, burst circuit breaker, throttle,
//!   in-flight guard).
//!
//! - **[`persist`]**: tolerant codec for the `dashState` blob and the
//!   shareable query string.
//!
//! - **[`Dashboard`]**: dispatcher over the closed set of [`UserAction`]s.
//!   Each action mutates state synchronously and returns [`Effect`]s for the
//!   caller to carry out (render, persist, fetch, deliver, notify). Fetches
//!   are tagged with a [`BatchTicket`] so late responses for a batch that is
//!   no longer selected are dropped.

pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod model;
pub mod persist;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Credentials, DashboardConfig, TlsVerification};
pub use dashboard::fetch::{self, BatchTicket, FetchPayload, FetchRequest, FetchResponse};
pub use dashboard::{Dashboard, Effect, Notice, NoticeLevel, Panel, TextFilter, UserAction};
pub use error::CoreError;
pub use export::gate::{ExportGate, GateDecision, GateState, Gesture, RejectReason};
pub use export::{ExportArtifact, ExportDelivery, ExportFormat};
pub use model::{
    Column, CveCounts, CveDetail, CveEntry, CveLookup, Designation, Device, FieldValue, LogLine,
    RecommendationClass, Severity, SeveritySet, TrendPoint,
};
pub use persist::{MemoryStateStore, StateStore, UiState};
pub use view::{Direction, FilterState, SortState, Summary, UpgradeSplit, ViewModel};

// Wire types that pass through untouched.
pub use retrievos_api::types::{BatchSummary, RunMode, RunStatus, TimelineEntry};
