//! Actions flowing through the TUI loop.
//!
//! Screens never touch the `Dashboard` directly: they emit
//! `Action::User`, the app dispatches it, and fresh state comes back as an
//! `Action::ViewChanged` snapshot.

use std::sync::Arc;

use retrievos_core::{
    CveCounts, Device, FetchResponse, FilterState, Panel, SortState, Summary, TrendPoint,
    UpgradeSplit, UserAction,
};

use crate::screen::ScreenId;

/// Everything a screen needs to draw, captured after each state change.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub rows: Arc<Vec<Arc<Device>>>,
    pub filter: FilterState,
    pub sort: SortState,
    pub batch: Option<String>,
    pub batches: Vec<String>,
    pub summary: Summary,
    pub severity_totals: CveCounts,
    pub upgrade_split: UpgradeSplit,
    pub trend: Vec<TrendPoint>,
    pub light: bool,
    pub condensed: bool,
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,
    OpenBatchPicker,
    ShowQuery,
    CloseModal,

    // ── Dashboard ─────────────────────────────────────────────────
    /// A user action for the dashboard dispatcher.
    User(UserAction),
    /// A fetch finished (possibly for a stale selection).
    Fetched(Box<FetchResponse>),
    /// New state snapshot for the screens.
    ViewChanged(Arc<DashboardView>),
    /// The device drawer on the devices screen.
    ShowDevice(Arc<Device>),
    /// Any other detail panel, shown as a modal.
    ShowPanel(Box<Panel>),
}
