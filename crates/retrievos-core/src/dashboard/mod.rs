// ── Dashboard dispatcher ──
//
// Owns the view model, the batch selection and the export gate. Each
// `UserAction` is applied synchronously and answered with a list of
// `Effect`s; the caller renders, persists, fetches and delivers. Fetch
// results come back through `receive`.

pub mod fetch;

use std::sync::Arc;
use std::time::Instant;

use retrievos_api::types::{BatchSummary, TimelineEntry};
use tracing::{debug, info};

use self::fetch::{BatchTicket, FetchPayload, FetchRequest, FetchResponse};
use crate::convert::device_snapshot;
use crate::export::gate::{DISABLED_NOTICE, ExportGate, GateDecision, GateState, Gesture};
use crate::export::{self, ExportArtifact, ExportDelivery, ExportFormat};
use crate::model::{Column, CveLookup, Designation, Device, LogLine, Severity, TrendPoint};
use crate::persist::UiState;
use crate::view::{FilterState, ViewModel};

// ── Actions ──────────────────────────────────────────────────────────

/// Which free-text filter a `SetFilter` targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFilter {
    Host,
    Model,
    Recommendation,
}

/// Everything a user can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Initial load; also what `Refresh` does.
    Start,
    Refresh,
    SelectBatch(String),
    SetFilter(TextFilter, String),
    ToggleSeverity(Severity),
    ClearFilters,
    Sort(Column),
    ToggleTheme,
    ToggleDensity,
    Export {
        format: ExportFormat,
        delivery: ExportDelivery,
        gesture: Gesture,
    },
    OpenDevice(String),
    OpenTimeline(String),
    OpenCves(String),
    ViewLog,
    ViewMail,
    OpenDesignation(String),
}

// ── Effects ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user. Sticky notices stay until the session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub sticky: bool,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            sticky: false,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
            sticky: false,
        }
    }
}

/// Detail views opened on top of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Device(Arc<Device>),
    Timeline {
        host: String,
        entries: Vec<TimelineEntry>,
    },
    Cves(CveLookup),
    Log {
        batch: String,
        lines: Vec<LogLine>,
    },
    Mail {
        batch: String,
        text: String,
    },
    Designation {
        code: String,
        info: Option<&'static Designation>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Rows or aggregates changed; redraw from `Dashboard::rows`.
    Render,
    /// Write `blob` to the state store and expose `query` as the share link.
    Persist { blob: String, query: String },
    Fetch(FetchRequest),
    Deliver(ExportArtifact),
    Show(Panel),
    Notice(Notice),
}

// ── Dashboard ────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Dashboard {
    view: ViewModel,
    batches: Vec<String>,
    current_batch: Option<String>,
    generation: u64,
    summaries: Vec<BatchSummary>,
    summaries_limit: u32,
    gate: ExportGate,
    light_theme: bool,
    condensed: bool,
}

impl Dashboard {
    /// Build from restored UI state.
    pub fn new(state: UiState, summaries_limit: u32) -> Self {
        let mut view = ViewModel::new();
        *view.filter_mut() = state.filter;
        *view.sort_mut() = state.sort;
        view.compute_rows();

        Self {
            view,
            batches: Vec::new(),
            current_batch: state.batch,
            generation: 0,
            summaries: Vec::new(),
            summaries_limit,
            gate: ExportGate::new(),
            light_theme: state.light_theme,
            condensed: state.condensed,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    /// The rows currently on screen.
    pub fn rows(&self) -> &Arc<Vec<Arc<Device>>> {
        self.view.last_rendered()
    }

    pub fn batches(&self) -> &[String] {
        &self.batches
    }

    pub fn current_batch(&self) -> Option<&str> {
        self.current_batch.as_deref()
    }

    pub fn summaries(&self) -> &[BatchSummary] {
        &self.summaries
    }

    pub fn trend(&self) -> Vec<TrendPoint> {
        TrendPoint::series(&self.summaries)
    }

    pub fn gate_state(&self, now: Instant) -> GateState {
        self.gate.state(now)
    }

    pub fn light_theme(&self) -> bool {
        self.light_theme
    }

    pub fn condensed(&self) -> bool {
        self.condensed
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            batch: self.current_batch.clone(),
            filter: self.view.filter().clone(),
            sort: *self.view.sort(),
            light_theme: self.light_theme,
            condensed: self.condensed,
        }
    }

    /// Ticket for the current selection.
    pub fn ticket(&self) -> Option<BatchTicket> {
        self.current_batch.as_ref().map(|batch| BatchTicket {
            batch: batch.clone(),
            generation: self.generation,
        })
    }

    fn persist(&self) -> Effect {
        let state = self.ui_state();
        Effect::Persist {
            blob: state.to_blob(),
            query: state.to_query(),
        }
    }

    fn is_current(&self, ticket: &BatchTicket) -> bool {
        ticket.generation == self.generation
            && self.current_batch.as_deref() == Some(ticket.batch.as_str())
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    pub fn dispatch(&mut self, action: UserAction, now: Instant) -> Vec<Effect> {
        match action {
            UserAction::Start | UserAction::Refresh => self.reload(),
            UserAction::SelectBatch(batch) => self.select_batch(batch),
            UserAction::SetFilter(field, value) => {
                let filter = self.view.filter_mut();
                match field {
                    TextFilter::Host => filter.host = value,
                    TextFilter::Model => filter.model = value,
                    TextFilter::Recommendation => filter.recommendation = value,
                }
                self.rerender()
            }
            UserAction::ToggleSeverity(sev) => {
                self.view.filter_mut().severities.toggle(sev);
                self.rerender()
            }
            UserAction::ClearFilters => {
                *self.view.filter_mut() = FilterState::default();
                self.rerender()
            }
            UserAction::Sort(column) => {
                self.view.sort_mut().toggle(column);
                self.rerender()
            }
            UserAction::ToggleTheme => {
                self.light_theme = !self.light_theme;
                vec![self.persist(), Effect::Render]
            }
            UserAction::ToggleDensity => {
                self.condensed = !self.condensed;
                vec![self.persist(), Effect::Render]
            }
            UserAction::Export {
                format,
                delivery,
                gesture,
            } => self.export(format, delivery, gesture, now),
            UserAction::OpenDevice(host) => match self.view.device(&host) {
                Some(device) => vec![Effect::Show(Panel::Device(Arc::clone(device)))],
                None => vec![Effect::Show(Panel::Cves(CveLookup::NoRecord { host }))],
            },
            UserAction::OpenTimeline(host) => vec![Effect::Fetch(FetchRequest::Timeline { host })],
            UserAction::OpenCves(host) => match self.ticket() {
                Some(ticket) => vec![Effect::Fetch(FetchRequest::Cves { ticket, host })],
                None => vec![Effect::Show(Panel::Cves(CveLookup::NoRecord { host }))],
            },
            UserAction::ViewLog => self.batch_fetch(FetchRequest::Log),
            UserAction::ViewMail => self.batch_fetch(FetchRequest::Mail),
            UserAction::OpenDesignation(code) => {
                let info = Designation::lookup(&code);
                vec![Effect::Show(Panel::Designation {
                    code: code.trim().to_uppercase(),
                    info,
                })]
            }
        }
    }

    fn reload(&mut self) -> Vec<Effect> {
        self.generation += 1;
        let mut effects = vec![
            Effect::Fetch(FetchRequest::Batches),
            Effect::Fetch(FetchRequest::Summaries {
                limit: self.summaries_limit,
            }),
        ];
        if let Some(ticket) = self.ticket() {
            effects.push(Effect::Fetch(FetchRequest::Devices(ticket)));
        }
        effects
    }

    fn select_batch(&mut self, batch: String) -> Vec<Effect> {
        info!(%batch, "batch selected");
        self.current_batch = Some(batch);
        self.generation += 1;
        let mut effects = vec![self.persist()];
        if let Some(ticket) = self.ticket() {
            effects.push(Effect::Fetch(FetchRequest::Devices(ticket)));
        }
        effects
    }

    fn rerender(&mut self) -> Vec<Effect> {
        self.view.compute_rows();
        vec![self.persist(), Effect::Render]
    }

    fn batch_fetch(&self, request: fn(BatchTicket) -> FetchRequest) -> Vec<Effect> {
        match self.ticket() {
            Some(ticket) => vec![Effect::Fetch(request(ticket))],
            None => vec![Effect::Notice(Notice::warning("No batch selected"))],
        }
    }

    fn export(
        &mut self,
        format: ExportFormat,
        delivery: ExportDelivery,
        gesture: Gesture,
        now: Instant,
    ) -> Vec<Effect> {
        match self.gate.attempt(gesture, now) {
            GateDecision::Accepted => {
                match export::build(self.rows(), self.current_batch(), format, delivery) {
                    Ok(artifact) => vec![Effect::Deliver(artifact)],
                    Err(e) => vec![Effect::Notice(Notice::error(e.to_string()))],
                }
            }
            GateDecision::Rejected(reason) if reason.is_terminal() => {
                vec![Effect::Notice(Notice {
                    level: NoticeLevel::Warning,
                    message: DISABLED_NOTICE.into(),
                    sticky: true,
                })]
            }
            GateDecision::Rejected(_) => Vec::new(),
        }
    }

    // ── Responses ────────────────────────────────────────────────────

    /// Apply a fetch result. Responses for a superseded batch selection
    /// are dropped without effect.
    pub fn receive(&mut self, response: FetchResponse) -> Vec<Effect> {
        let FetchResponse { request, result } = response;

        if let Some(ticket) = request.ticket() {
            if !self.is_current(ticket) {
                debug!(
                    batch = %ticket.batch,
                    generation = ticket.generation,
                    current = self.generation,
                    "dropping stale response"
                );
                return Vec::new();
            }
        }

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => return vec![Effect::Notice(Notice::error(e.to_string()))],
        };

        match (request, payload) {
            (_, FetchPayload::Batches(batches)) => {
                self.batches = batches;
                if self.current_batch.is_none() {
                    if let Some(first) = self.batches.first().cloned() {
                        return self.select_batch(first);
                    }
                }
                vec![Effect::Render]
            }
            (_, FetchPayload::Summaries(summaries)) => {
                self.summaries = summaries;
                vec![Effect::Render]
            }
            (_, FetchPayload::Devices(records)) => {
                debug!(count = records.len(), "devices loaded");
                self.view.set_devices(device_snapshot(records));
                self.view.compute_rows();
                vec![Effect::Render]
            }
            (FetchRequest::Cves { host, .. }, FetchPayload::Cves(rows)) => {
                vec![Effect::Show(Panel::Cves(CveLookup::find(&rows, &host)))]
            }
            (FetchRequest::Log(ticket), FetchPayload::Log(text)) => vec![Effect::Show(Panel::Log {
                batch: ticket.batch,
                lines: LogLine::parse(&text),
            })],
            (FetchRequest::Mail(ticket), FetchPayload::Mail(text)) => {
                vec![Effect::Show(Panel::Mail {
                    batch: ticket.batch,
                    text,
                })]
            }
            (FetchRequest::Timeline { host }, FetchPayload::Timeline(entries)) => {
                vec![Effect::Show(Panel::Timeline { host, entries })]
            }
            (request, _) => {
                debug!(?request, "response payload does not match request");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use retrievos_api::types::{CveItem, DeviceRecord, HostCves};
    use serde_json::{Value, json};

    use super::*;
    use crate::error::CoreError;
    use crate::view::{Direction, SortState};

    fn records(values: Vec<Value>) -> Vec<DeviceRecord> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(m) => m,
                _ => panic!("fixture must be an object"),
            })
            .collect()
    }

    fn batch_devices() -> Vec<DeviceRecord> {
        records(vec![
            json!({"host": "sw1", "model": "C9300", "upgrade_recommended": true,
                   "cve_counts": {"Critical": 2}}),
            json!({"host": "sw2", "model": "C9200", "upgrade_recommended": false,
                   "cve_counts": {"High": 1}}),
            json!({"host": "rtr1", "model": "ISR4451", "upgrade_recommended": true,
                   "cve_counts": {}}),
        ])
    }

    fn fetches(effects: &[Effect]) -> Vec<&FetchRequest> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Fetch(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn devices_ticket(effects: &[Effect]) -> BatchTicket {
        fetches(effects)
            .into_iter()
            .find_map(|r| match r {
                FetchRequest::Devices(t) => Some(t.clone()),
                _ => None,
            })
            .unwrap()
    }

    fn ok(request: FetchRequest, payload: FetchPayload) -> FetchResponse {
        FetchResponse {
            request,
            result: Ok(payload),
        }
    }

    fn hosts(dash: &Dashboard) -> Vec<String> {
        dash.rows().iter().map(|d| d.host().to_owned()).collect()
    }

    /// A dashboard with `2024-01-01` selected and loaded.
    fn loaded() -> (Dashboard, Instant) {
        let now = Instant::now();
        let mut dash = Dashboard::new(UiState::default(), 30);
        let effects = dash.dispatch(UserAction::SelectBatch("2024-01-01".into()), now);
        let ticket = devices_ticket(&effects);
        dash.receive(ok(
            FetchRequest::Devices(ticket),
            FetchPayload::Devices(batch_devices()),
        ));
        (dash, now)
    }

    // ── Loading ─────────────────────────────────────────────────────

    #[test]
    fn start_without_batch_selects_most_recent() {
        let now = Instant::now();
        let mut dash = Dashboard::new(UiState::default(), 30);
        let effects = dash.dispatch(UserAction::Start, now);
        assert_eq!(
            fetches(&effects),
            vec![&FetchRequest::Batches, &FetchRequest::Summaries { limit: 30 }]
        );

        let effects = dash.receive(ok(
            FetchRequest::Batches,
            FetchPayload::Batches(vec!["2024-02-01".into(), "2024-01-01".into()]),
        ));
        assert_eq!(dash.current_batch(), Some("2024-02-01"));
        assert_eq!(devices_ticket(&effects).batch, "2024-02-01");
    }

    #[test]
    fn start_with_restored_batch_loads_it_directly() {
        let state = UiState {
            batch: Some("2024-01-01".into()),
            ..UiState::default()
        };
        let mut dash = Dashboard::new(state, 10);
        let effects = dash.dispatch(UserAction::Start, Instant::now());
        assert_eq!(devices_ticket(&effects).batch, "2024-01-01");

        let effects = dash.receive(ok(
            FetchRequest::Batches,
            FetchPayload::Batches(vec!["2024-02-01".into()]),
        ));
        assert_eq!(effects, vec![Effect::Render]);
        assert_eq!(dash.current_batch(), Some("2024-01-01"));
    }

    #[test]
    fn summary_for_loaded_batch() {
        let (dash, _) = loaded();
        let summary = dash.view().summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.needing_upgrade, 2);
        assert_eq!(summary.with_critical_cves, 1);
        assert_eq!(hosts(&dash), vec!["sw1", "sw2", "rtr1"]);
    }

    // ── Stale responses ─────────────────────────────────────────────

    #[test]
    fn response_for_previous_batch_is_dropped() {
        let now = Instant::now();
        let mut dash = Dashboard::new(UiState::default(), 30);
        let first = devices_ticket(&dash.dispatch(UserAction::SelectBatch("A".into()), now));
        let second = devices_ticket(&dash.dispatch(UserAction::SelectBatch("B".into()), now));

        // B arrives first, then the slow A response
        dash.receive(ok(
            FetchRequest::Devices(second),
            FetchPayload::Devices(records(vec![json!({"host": "from-b"})])),
        ));
        let effects = dash.receive(ok(
            FetchRequest::Devices(first),
            FetchPayload::Devices(records(vec![json!({"host": "from-a"})])),
        ));

        assert!(effects.is_empty());
        assert_eq!(hosts(&dash), vec!["from-b"]);
    }

    #[test]
    fn reselecting_same_batch_invalidates_older_request() {
        let now = Instant::now();
        let mut dash = Dashboard::new(UiState::default(), 30);
        let old = devices_ticket(&dash.dispatch(UserAction::SelectBatch("A".into()), now));
        let _new = devices_ticket(&dash.dispatch(UserAction::SelectBatch("A".into()), now));

        let effects = dash.receive(ok(
            FetchRequest::Devices(old),
            FetchPayload::Devices(batch_devices()),
        ));
        assert!(effects.is_empty());
        assert!(dash.rows().is_empty());
    }

    #[test]
    fn stale_errors_are_dropped_too() {
        let now = Instant::now();
        let mut dash = Dashboard::new(UiState::default(), 30);
        let old = devices_ticket(&dash.dispatch(UserAction::SelectBatch("A".into()), now));
        dash.dispatch(UserAction::SelectBatch("B".into()), now);

        let effects = dash.receive(FetchResponse {
            request: FetchRequest::Devices(old),
            result: Err(CoreError::Timeout { timeout_secs: 30 }),
        });
        assert!(effects.is_empty());
    }

    #[test]
    fn network_error_is_a_notice_and_keeps_rows() {
        let (mut dash, now) = loaded();
        let effects = dash.dispatch(UserAction::Refresh, now);
        let ticket = devices_ticket(&effects);

        let effects = dash.receive(FetchResponse {
            request: FetchRequest::Devices(ticket),
            result: Err(CoreError::Api {
                message: "Internal Server Error".into(),
                status: Some(500),
            }),
        });
        assert_eq!(
            effects,
            vec![Effect::Notice(Notice::error("Internal Server Error"))]
        );
        assert_eq!(hosts(&dash).len(), 3);
    }

    // ── Filters / sort ──────────────────────────────────────────────

    #[test]
    fn filter_actions_recompute_and_persist() {
        let (mut dash, now) = loaded();
        let effects = dash.dispatch(UserAction::SetFilter(TextFilter::Model, "c9".into()), now);
        assert!(matches!(&effects[0], Effect::Persist { query, .. } if query.contains("model=c9")));
        assert_eq!(effects[1], Effect::Render);
        assert_eq!(hosts(&dash), vec!["sw1", "sw2"]);

        dash.dispatch(UserAction::ToggleSeverity(Severity::Critical), now);
        // all minus Critical: High/Medium/Low
        assert_eq!(hosts(&dash), vec!["sw2"]);

        dash.dispatch(UserAction::ClearFilters, now);
        assert_eq!(hosts(&dash).len(), 3);
    }

    #[test]
    fn sort_action_toggles_direction() {
        let (mut dash, now) = loaded();
        dash.dispatch(UserAction::Sort(Column::Host), now);
        assert_eq!(hosts(&dash), vec!["rtr1", "sw1", "sw2"]);
        dash.dispatch(UserAction::Sort(Column::Host), now);
        assert_eq!(hosts(&dash), vec!["sw2", "sw1", "rtr1"]);
        assert_eq!(
            dash.ui_state().sort,
            SortState::by(Column::Host, Direction::Descending)
        );
    }

    #[test]
    fn theme_and_density_persist() {
        let (mut dash, now) = loaded();
        dash.dispatch(UserAction::ToggleTheme, now);
        let effects = dash.dispatch(UserAction::ToggleDensity, now);
        let Effect::Persist { blob, .. } = &effects[0] else {
            panic!("expected persist");
        };
        let state = UiState::from_blob(Some(blob.as_str()));
        assert!(state.light_theme);
        assert!(state.condensed);
        assert_eq!(state.batch.as_deref(), Some("2024-01-01"));
    }

    // ── Export ──────────────────────────────────────────────────────

    fn export(gesture: Gesture, format: ExportFormat) -> UserAction {
        UserAction::Export {
            format,
            delivery: ExportDelivery::Save,
            gesture,
        }
    }

    #[test]
    fn export_uses_rendered_rows_and_batch_name() {
        let (mut dash, now) = loaded();
        dash.dispatch(UserAction::SetFilter(TextFilter::Host, "sw".into()), now);
        dash.dispatch(UserAction::Sort(Column::CveCritical), now);

        let effects = dash.dispatch(export(Gesture::Trusted, ExportFormat::Csv), now);
        let [Effect::Deliver(artifact)] = effects.as_slice() else {
            panic!("expected a delivery, got {effects:?}");
        };
        assert_eq!(artifact.file_name, "devices_2024-01-01.csv");
        assert_eq!(artifact.rows, 2);
        let hosts: Vec<_> = artifact
            .content
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(hosts, vec!["sw2", "sw1"]);
    }

    #[test]
    fn synthetic_export_does_nothing() {
        let (mut dash, now) = loaded();
        assert!(
            dash.dispatch(export(Gesture::Synthetic, ExportFormat::Json), now)
                .is_empty()
        );
    }

    #[test]
    fn burst_of_exports_disables_with_sticky_notice() {
        let (mut dash, now) = loaded();
        let mut last = Vec::new();
        for i in 0..6 {
            last = dash.dispatch(
                export(Gesture::Trusted, ExportFormat::Csv),
                now + Duration::from_millis(i * 50),
            );
        }
        assert_eq!(
            last,
            vec![Effect::Notice(Notice {
                level: NoticeLevel::Warning,
                message: DISABLED_NOTICE.into(),
                sticky: true,
            })]
        );
        assert_eq!(dash.gate_state(now + Duration::from_secs(60)), GateState::Disabled);
        assert!(
            dash.dispatch(
                export(Gesture::Trusted, ExportFormat::Csv),
                now + Duration::from_secs(60)
            )
            .is_empty()
        );
    }

    // ── Detail panels ───────────────────────────────────────────────

    #[test]
    fn cve_lookup_for_host_without_record() {
        let (mut dash, now) = loaded();
        let effects = dash.dispatch(UserAction::OpenCves("rtr1".into()), now);
        let [Effect::Fetch(request)] = effects.as_slice() else {
            panic!("expected a fetch");
        };

        let rows = vec![HostCves {
            host: "sw1".into(),
            cves: [("Critical".to_string(), vec![CveItem {
                id: "CVE-2024-1".into(),
                ..CveItem::default()
            }])]
            .into_iter()
            .collect(),
        }];
        let effects = dash.receive(ok(request.clone(), FetchPayload::Cves(rows)));
        assert_eq!(
            effects,
            vec![Effect::Show(Panel::Cves(CveLookup::NoRecord {
                host: "rtr1".into()
            }))]
        );
    }

    #[test]
    fn log_panel_flags_warnings() {
        let (mut dash, now) = loaded();
        let effects = dash.dispatch(UserAction::ViewLog, now);
        let [Effect::Fetch(request)] = effects.as_slice() else {
            panic!("expected a fetch");
        };
        let effects = dash.receive(ok(
            request.clone(),
            FetchPayload::Log("start\nWARNING: host slow".into()),
        ));
        let [Effect::Show(Panel::Log { batch, lines })] = effects.as_slice() else {
            panic!("expected log panel");
        };
        assert_eq!(batch, "2024-01-01");
        assert!(!lines[0].warning);
        assert!(lines[1].warning);
    }

    #[test]
    fn log_without_batch_warns() {
        let mut dash = Dashboard::new(UiState::default(), 30);
        assert_eq!(
            dash.dispatch(UserAction::ViewLog, Instant::now()),
            vec![Effect::Notice(Notice::warning("No batch selected"))]
        );
    }

    #[test]
    fn designation_panel_uses_dictionary() {
        let mut dash = Dashboard::new(UiState::default(), 30);
        let effects = dash.dispatch(UserAction::OpenDesignation("md".into()), Instant::now());
        let [Effect::Show(Panel::Designation { code, info })] = effects.as_slice() else {
            panic!("expected designation panel");
        };
        assert_eq!(code, "MD");
        assert_eq!(info.map(|d| d.title), Some("Maintenance Deployment (MD)"));
    }

    #[test]
    fn device_panel_shares_the_snapshot() {
        let (mut dash, now) = loaded();
        let effects = dash.dispatch(UserAction::OpenDevice("sw2".into()), now);
        let [Effect::Show(Panel::Device(device))] = effects.as_slice() else {
            panic!("expected device panel");
        };
        assert!(Arc::ptr_eq(device, dash.view().device("sw2").unwrap()));
    }
}
