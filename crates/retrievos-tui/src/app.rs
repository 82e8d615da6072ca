//! Application core: event loop, screen management and the bridge between
//! key presses and the dashboard dispatcher.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use retrievos_api::DashboardClient;
use retrievos_core::persist::STATE_KEY;
use retrievos_core::{
    Dashboard, Effect, ExportArtifact, ExportDelivery, ExportFormat, FetchRequest, GateState,
    Gesture, Notice, NoticeLevel, Panel, StateStore, UiState, UserAction,
};

use crate::action::{Action, DashboardView};
use crate::component::Component;
use crate::deliver;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme::{self, Palette};
use crate::tui::Tui;
use crate::widgets::modal::{self, Modal};
use crate::widgets::notice::{self, Toast};

/// Startup knobs resolved from the config file and flags.
#[derive(Debug, Clone)]
pub struct StartOptions {
    pub summaries_limit: u32,
    pub export_dir: PathBuf,
    /// Fire one synthetic CSV export once the first device list arrives.
    pub export_on_start: bool,
}

/// Top-level application state and event loop.
pub struct App {
    dashboard: Dashboard,
    client: DashboardClient,
    store: Box<dyn StateStore>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    active_screen: ScreenId,
    running: bool,
    modal: Option<Modal>,
    modal_scroll: u16,
    toast: Option<Toast>,
    /// Last sticky notice, kept in the status bar for the session.
    sticky: Option<Notice>,
    /// Share link for the current state.
    query: String,
    pending_fetches: usize,
    throbber: ThrobberState,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Cancels fetches still in flight when the app exits.
    fetch_cancel: CancellationToken,
    export_dir: PathBuf,
    export_on_start: bool,
}

fn export_action(format: ExportFormat, delivery: ExportDelivery, gesture: Gesture) -> Action {
    Action::User(UserAction::Export {
        format,
        delivery,
        gesture,
    })
}

impl App {
    pub fn new(
        client: DashboardClient,
        store: Box<dyn StateStore>,
        state: UiState,
        options: StartOptions,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();
        let query = state.to_query();

        Self {
            dashboard: Dashboard::new(state, options.summaries_limit),
            client,
            store,
            screens,
            active_screen: ScreenId::default(),
            running: true,
            modal: None,
            modal_scroll: 0,
            toast: None,
            sticky: None,
            query,
            pending_fetches: 0,
            throbber: ThrobberState::default(),
            action_tx,
            action_rx,
            fetch_cancel: CancellationToken::new(),
            export_dir: options.export_dir,
            export_on_start: options.export_on_start,
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        self.publish_view()?;
        self.action_tx.send(Action::User(UserAction::Start))?;

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(..) | Event::Render => self.action_tx.send(Action::Render)?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                let render = matches!(action, Action::Render);
                self.process_action(action)?;
                if render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.fetch_cancel.cancel();
        drop(tui);
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Map a key press to an action. Open modals take all input; then a
    /// screen editing text; then global keys; then the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if let Some(ref mut open) = self.modal {
            return Ok(Self::handle_modal_key(open, &mut self.modal_scroll, key));
        }

        let capturing = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.capturing_input());

        if !capturing {
            let global = match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Tab => Some(Action::SwitchScreen(self.active_screen.next())),
                KeyCode::Char('?') => Some(Action::ToggleHelp),
                KeyCode::Char('b') => Some(Action::OpenBatchPicker),
                KeyCode::Char('y') => Some(Action::ShowQuery),
                KeyCode::Char('t') => Some(Action::User(UserAction::ToggleTheme)),
                KeyCode::Char('D') => Some(Action::User(UserAction::ToggleDensity)),
                KeyCode::Char('r') => Some(Action::User(UserAction::Refresh)),
                KeyCode::Char('e') => Some(export_action(
                    ExportFormat::Csv,
                    ExportDelivery::Save,
                    Gesture::Trusted,
                )),
                KeyCode::Char('E') => Some(export_action(
                    ExportFormat::Csv,
                    ExportDelivery::Preview,
                    Gesture::Trusted,
                )),
                KeyCode::Char('J') => Some(export_action(
                    ExportFormat::Json,
                    ExportDelivery::Save,
                    Gesture::Trusted,
                )),
                KeyCode::Char('L') => Some(Action::User(UserAction::ViewLog)),
                KeyCode::Char('M') => Some(Action::User(UserAction::ViewMail)),
                _ => None,
            };
            if global.is_some() {
                return Ok(global);
            }
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    fn handle_modal_key(open: &mut Modal, scroll: &mut u16, key: KeyEvent) -> Option<Action> {
        if let Modal::Batches {
            batches, selected, ..
        } = open
        {
            return match key.code {
                KeyCode::Char('j') | KeyCode::Down => {
                    *selected = (*selected + 1).min(batches.len().saturating_sub(1));
                    None
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    *selected = selected.saturating_sub(1);
                    None
                }
                KeyCode::Enter => batches
                    .get(*selected)
                    .map(|b| Action::User(UserAction::SelectBatch(b.clone()))),
                KeyCode::Esc | KeyCode::Char('q' | 'b') => Some(Action::CloseModal),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                *scroll = scroll.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                *scroll = scroll.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                *scroll = scroll.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                *scroll = scroll.saturating_sub(10);
                None
            }
            KeyCode::Char('g') => {
                *scroll = 0;
                None
            }
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q' | '?') => Some(Action::CloseModal),
            _ => None,
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    fn process_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Render => {}

            Action::Tick => {
                if self.pending_fetches > 0 {
                    self.throbber.calc_next();
                }
                if self.toast.as_ref().is_some_and(|t| t.expired(Instant::now())) {
                    self.toast = None;
                }
            }

            Action::SwitchScreen(target) => {
                if target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::ToggleHelp => {
                self.modal = match self.modal {
                    Some(Modal::Help) => None,
                    _ => Some(Modal::Help),
                };
                self.modal_scroll = 0;
            }

            Action::OpenBatchPicker => {
                let batches = self.dashboard.batches().to_vec();
                if batches.is_empty() {
                    self.raise(Notice::warning("No batches loaded yet"));
                } else {
                    let current = self.dashboard.current_batch().map(str::to_owned);
                    let selected = current
                        .as_ref()
                        .and_then(|c| batches.iter().position(|b| b == c))
                        .unwrap_or(0);
                    self.open_modal(Modal::Batches {
                        batches,
                        current,
                        selected,
                    });
                }
            }

            Action::ShowQuery => self.open_modal(Modal::Query(self.query.clone())),

            Action::CloseModal => {
                self.modal = None;
                self.modal_scroll = 0;
            }

            Action::User(user) => {
                if matches!(user, UserAction::SelectBatch(_)) && self.is_picker_open() {
                    self.modal = None;
                }
                let effects = self.dashboard.dispatch(user, Instant::now());
                self.apply_effects(effects)?;
            }

            Action::Fetched(response) => {
                self.pending_fetches = self.pending_fetches.saturating_sub(1);
                let devices = matches!(response.request, FetchRequest::Devices(_))
                    && response.result.is_ok();
                let effects = self.dashboard.receive(*response);
                let applied = !effects.is_empty();
                self.apply_effects(effects)?;

                if devices && applied && self.export_on_start {
                    self.export_on_start = false;
                    info!("requesting export on start");
                    self.action_tx.send(export_action(
                        ExportFormat::Csv,
                        ExportDelivery::Save,
                        Gesture::Synthetic,
                    ))?;
                }
            }

            Action::ViewChanged(_) => {
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(&action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::ShowDevice(_) => {
                self.process_action(Action::SwitchScreen(ScreenId::Devices))?;
                if let Some(screen) = self.screens.get_mut(&ScreenId::Devices) {
                    if let Some(follow_up) = screen.update(&action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::ShowPanel(panel) => self.open_modal(Modal::Panel(*panel)),
        }
        Ok(())
    }

    /// Carry out what the dashboard asked for.
    fn apply_effects(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Render => self.publish_view()?,
                Effect::Persist { blob, query } => {
                    self.store.save(STATE_KEY, &blob);
                    self.query = query;
                }
                Effect::Fetch(request) => {
                    self.pending_fetches += 1;
                    crate::data_bridge::spawn_fetch(
                        self.client.clone(),
                        request,
                        self.action_tx.clone(),
                        self.fetch_cancel.clone(),
                    );
                }
                Effect::Deliver(artifact) => self.deliver(artifact),
                Effect::Show(Panel::Device(device)) => {
                    self.action_tx.send(Action::ShowDevice(device))?;
                }
                Effect::Show(panel) => self.action_tx.send(Action::ShowPanel(Box::new(panel)))?,
                Effect::Notice(notice) => self.raise(notice),
            }
        }
        Ok(())
    }

    fn deliver(&mut self, artifact: ExportArtifact) {
        match artifact.delivery {
            ExportDelivery::Save => match deliver::save(&self.export_dir, &artifact) {
                Ok(path) => self.raise(Notice {
                    level: NoticeLevel::Info,
                    message: format!("Saved {} rows to {}", artifact.rows, path.display()),
                    sticky: false,
                }),
                Err(e) => {
                    warn!(error = %e, "export write failed");
                    self.raise(Notice::error(format!("Export failed: {e}")));
                }
            },
            ExportDelivery::Preview => self.open_modal(Modal::Preview(artifact)),
        }
    }

    /// Snapshot dashboard state for the screens.
    fn publish_view(&mut self) -> Result<()> {
        let view = self.dashboard.view();
        let snapshot = DashboardView {
            rows: Arc::clone(self.dashboard.rows()),
            filter: view.filter().clone(),
            sort: *view.sort(),
            batch: self.dashboard.current_batch().map(str::to_owned),
            batches: self.dashboard.batches().to_vec(),
            summary: view.summary(),
            severity_totals: view.severity_totals(),
            upgrade_split: view.upgrade_split(),
            trend: self.dashboard.trend(),
            light: self.dashboard.light_theme(),
            condensed: self.dashboard.condensed(),
        };
        self.action_tx.send(Action::ViewChanged(Arc::new(snapshot)))?;
        Ok(())
    }

    fn raise(&mut self, notice: Notice) {
        if notice.sticky {
            self.sticky = Some(notice.clone());
        }
        self.toast = Some(Toast::new(notice, Instant::now()));
    }

    fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
        self.modal_scroll = 0;
    }

    fn is_picker_open(&self) -> bool {
        self.modal.as_ref().is_some_and(Modal::is_picker)
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let pal = theme::palette(self.dashboard.light_theme());
        frame.render_widget(Paragraph::new("").style(pal.base()), area);

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1], pal);
        self.render_status_bar(frame, layout[2], pal);

        // Overlays, topmost last
        if let Some(ref toast) = self.toast {
            notice::render(frame, area, pal, &toast.notice);
        }
        if let Some(ref open) = self.modal {
            modal::render(frame, area, pal, open, self.modal_scroll);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect, pal: &Palette) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                Line::from(Span::styled(
                    format!(" {} ", id.label()),
                    pal.tab(id == self.active_screen),
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", pal.key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, pal: &Palette) {
        let chunks = Layout::horizontal([Constraint::Length(14), Constraint::Min(1)]).split(area);

        if self.pending_fetches > 0 {
            let throbber = Throbber::default()
                .label("loading")
                .style(pal.key_hint())
                .throbber_style(Style::default().fg(pal.accent));
            frame.render_stateful_widget(throbber, chunks[0], &mut self.throbber.clone());
        }

        let batch = self.dashboard.current_batch().unwrap_or("no batch");
        let export = match self.dashboard.gate_state(Instant::now()) {
            GateState::Idle => Span::styled("export ready", Style::default().fg(pal.ok)),
            GateState::Cooling => Span::styled("export cooling", Style::default().fg(pal.warn)),
            GateState::Disabled => Span::styled("export off", Style::default().fg(pal.error)),
        };

        let mut spans = vec![
            Span::styled("▸ ", pal.key_hint()),
            Span::styled(batch.to_owned(), Style::default().fg(pal.accent)),
            Span::styled(" │ ", pal.key_hint()),
            export,
        ];
        if let Some(ref sticky) = self.sticky {
            spans.push(Span::styled(" │ ", pal.key_hint()));
            spans.push(Span::styled(
                sticky.message.clone(),
                Style::default().fg(pal.warn),
            ));
        }
        spans.push(Span::styled(
            " │ ? help  b batch  y link  q quit",
            pal.key_hint(),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use retrievos_core::{DashboardConfig, FetchPayload, FetchResponse, MemoryStateStore};

    use super::*;

    /// Shares one in-memory store between the app and the test.
    struct SharedStore(Arc<MemoryStateStore>);

    impl StateStore for SharedStore {
        fn load(&self, key: &str) -> Option<String> {
            self.0.load(key)
        }

        fn save(&self, key: &str, value: &str) {
            self.0.save(key, value);
        }
    }

    fn app_with(export_dir: PathBuf) -> (App, Arc<MemoryStateStore>) {
        let store = Arc::new(MemoryStateStore::default());
        let app = App::new(
            DashboardConfig::default().client().unwrap(),
            Box::new(SharedStore(Arc::clone(&store))),
            UiState::default(),
            StartOptions {
                summaries_limit: 30,
                export_dir,
                export_on_start: false,
            },
        );
        (app, store)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn user(action: Option<Action>) -> UserAction {
        match action {
            Some(Action::User(a)) => a,
            other => panic!("expected a user action, got {other:?}"),
        }
    }

    #[test]
    fn export_keys_are_trusted_gestures() {
        let (mut app, _) = app_with(PathBuf::from("."));
        assert_eq!(
            user(app.handle_key_event(key('e')).unwrap()),
            UserAction::Export {
                format: ExportFormat::Csv,
                delivery: ExportDelivery::Save,
                gesture: Gesture::Trusted,
            }
        );
        assert_eq!(
            user(app.handle_key_event(key('E')).unwrap()),
            UserAction::Export {
                format: ExportFormat::Csv,
                delivery: ExportDelivery::Preview,
                gesture: Gesture::Trusted,
            }
        );
        assert_eq!(
            user(app.handle_key_event(key('J')).unwrap()),
            UserAction::Export {
                format: ExportFormat::Json,
                delivery: ExportDelivery::Save,
                gesture: Gesture::Trusted,
            }
        );
    }

    #[test]
    fn filter_editing_shadows_global_keys() {
        let (mut app, _) = app_with(PathBuf::from("."));
        assert!(app.handle_key_event(key('/')).unwrap().is_none());
        assert_eq!(
            user(app.handle_key_event(key('q')).unwrap()),
            UserAction::SetFilter(retrievos_core::TextFilter::Host, "q".into())
        );
    }

    #[test]
    fn theme_toggle_persists_and_publishes() {
        let (mut app, store) = app_with(PathBuf::from("."));
        app.process_action(Action::User(UserAction::ToggleTheme)).unwrap();

        let blob = store.load(STATE_KEY).unwrap();
        assert!(UiState::restore(Some(blob.as_str()), None).light_theme);

        match app.action_rx.try_recv().unwrap() {
            Action::ViewChanged(view) => assert!(view.light),
            other => panic!("expected a view snapshot, got {other:?}"),
        }
    }

    #[test]
    fn trusted_preview_opens_modal() {
        let (mut app, _) = app_with(PathBuf::from("."));
        let preview = app.handle_key_event(key('E')).unwrap().unwrap();
        app.process_action(preview).unwrap();
        assert!(matches!(app.modal, Some(Modal::Preview(_))));

        app.process_action(Action::CloseModal).unwrap();
        assert!(app.modal.is_none());
    }

    #[test]
    fn trusted_save_writes_into_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(dir.path().to_path_buf());
        let save = app.handle_key_event(key('e')).unwrap().unwrap();
        app.process_action(save).unwrap();
        assert!(dir.path().join("devices_latest.csv").exists());
        assert_eq!(app.toast.unwrap().notice.level, NoticeLevel::Info);
    }

    #[test]
    fn synthetic_export_delivers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(dir.path().to_path_buf());
        app.process_action(export_action(
            ExportFormat::Csv,
            ExportDelivery::Save,
            Gesture::Synthetic,
        ))
        .unwrap();
        assert!(!dir.path().join("devices_latest.csv").exists());
        assert!(app.modal.is_none());
    }

    #[tokio::test]
    async fn batch_picker_selects_and_closes() {
        let (mut app, _) = app_with(PathBuf::from("."));
        app.process_action(Action::Fetched(Box::new(FetchResponse {
            request: FetchRequest::Batches,
            result: Ok(FetchPayload::Batches(vec!["b2".into(), "b1".into()])),
        })))
        .unwrap();
        assert_eq!(app.dashboard.current_batch(), Some("b2"));

        app.process_action(Action::OpenBatchPicker).unwrap();
        assert!(app.is_picker_open());

        assert!(app.handle_key_event(key('j')).unwrap().is_none());
        let select = app.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        let select = select.unwrap().unwrap();
        assert_eq!(user(Some(select.clone())), UserAction::SelectBatch("b1".into()));

        app.process_action(select).unwrap();
        assert!(app.modal.is_none());
        assert_eq!(app.dashboard.current_batch(), Some("b1"));
    }

    #[test]
    fn picker_without_batches_raises_warning() {
        let (mut app, _) = app_with(PathBuf::from("."));
        app.process_action(Action::OpenBatchPicker).unwrap();
        assert!(app.modal.is_none());
        assert_eq!(app.toast.unwrap().notice.level, NoticeLevel::Warning);
    }
}
