//! Devices screen: filter bar, sortable table and the device drawer.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use strum::IntoEnumIterator;

use retrievos_core::{Column, Device, Severity, TextFilter, UserAction};

use crate::action::{Action, DashboardView};
use crate::component::Component;
use crate::theme::{self, Palette};
use crate::widgets::cells;

const DRAWER_HEIGHT: u16 = 9;

pub struct DevicesScreen {
    focused: bool,
    view: Arc<DashboardView>,
    table_state: TableState,
    drawer: Option<Arc<Device>>,
    editing: Option<TextFilter>,
    host_input: String,
    model_input: String,
    rec_input: String,
    column_cursor: usize,
}

fn next_field(field: TextFilter) -> TextFilter {
    match field {
        TextFilter::Host => TextFilter::Model,
        TextFilter::Model => TextFilter::Recommendation,
        TextFilter::Recommendation => TextFilter::Host,
    }
}

fn severity_for_key(c: char) -> Option<Severity> {
    match c {
        '1' => Some(Severity::Critical),
        '2' => Some(Severity::High),
        '3' => Some(Severity::Medium),
        '4' => Some(Severity::Low),
        _ => None,
    }
}

impl DevicesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            view: Arc::new(DashboardView::default()),
            table_state: TableState::default().with_selected(Some(0)),
            drawer: None,
            editing: None,
            host_input: String::new(),
            model_input: String::new(),
            rec_input: String::new(),
            column_cursor: 0,
        }
    }

    fn rows(&self) -> &[Arc<Device>] {
        &self.view.rows
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_device(&self) -> Option<&Arc<Device>> {
        self.rows().get(self.selected_index())
    }

    fn selected_host(&self) -> Option<String> {
        self.selected_device().map(|d| d.host().to_owned())
    }

    fn select(&mut self, idx: usize) {
        let clamped = idx.min(self.rows().len().saturating_sub(1));
        self.table_state.select(Some(clamped));
    }

    fn move_selection(&mut self, delta: isize) {
        let next = self.selected_index().saturating_add_signed(delta);
        self.select(next);
    }

    fn columns(&self) -> &'static [Column] {
        cells::table_columns(self.view.condensed)
    }

    fn cursor_column(&self) -> Column {
        let cols = self.columns();
        cols[self.column_cursor.min(cols.len() - 1)]
    }

    fn input_mut(&mut self, field: TextFilter) -> &mut String {
        match field {
            TextFilter::Host => &mut self.host_input,
            TextFilter::Model => &mut self.model_input,
            TextFilter::Recommendation => &mut self.rec_input,
        }
    }

    fn sync_inputs(&mut self) {
        self.host_input.clone_from(&self.view.filter.host);
        self.model_input.clone_from(&self.view.filter.model);
        self.rec_input.clone_from(&self.view.filter.recommendation);
    }

    fn handle_editing_key(&mut self, field: TextFilter, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing = None;
                None
            }
            KeyCode::Tab => {
                self.editing = Some(next_field(field));
                None
            }
            KeyCode::Backspace => {
                let input = self.input_mut(field);
                input.pop()?;
                let value = input.clone();
                Some(Action::User(UserAction::SetFilter(field, value)))
            }
            KeyCode::Char(c) => {
                let input = self.input_mut(field);
                input.push(c);
                let value = input.clone();
                Some(Action::User(UserAction::SetFilter(field, value)))
            }
            _ => None,
        }
    }

    fn with_host(&self, make: fn(String) -> UserAction) -> Option<Action> {
        self.selected_host().map(|h| Action::User(make(h)))
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect, pal: &Palette) {
        let input = |label: &str, value: &str, field: TextFilter| {
            let active = self.editing == Some(field);
            let shown = if active {
                format!("{value}▏")
            } else if value.is_empty() {
                "·".to_owned()
            } else {
                value.to_owned()
            };
            vec![
                Span::styled(format!(" {label} "), pal.key_hint()),
                Span::styled(
                    format!("[{shown}]"),
                    if active {
                        pal.table_selected()
                    } else {
                        Style::default().fg(pal.accent)
                    },
                ),
            ]
        };

        let mut first = Vec::new();
        first.extend(input("Host", &self.host_input, TextFilter::Host));
        first.extend(input("Model", &self.model_input, TextFilter::Model));
        first.extend(input("Rec", &self.rec_input, TextFilter::Recommendation));

        let mut second = vec![Span::styled(" Severity ", pal.key_hint())];
        for (i, sev) in Severity::iter().enumerate() {
            let on = self.view.filter.severities.contains(sev);
            let style = if on {
                Style::default()
                    .fg(pal.severity(sev))
                    .add_modifier(Modifier::BOLD)
            } else {
                pal.key_hint().add_modifier(Modifier::CROSSED_OUT)
            };
            second.push(Span::styled(format!("{}:{sev} ", i + 1), style));
        }
        let sort = match self.view.sort.key {
            Some(key) => cells::header_label(key, &self.view.sort),
            None => "as received".to_owned(),
        };
        second.push(Span::styled("  Sort ", pal.key_hint()));
        second.push(Span::styled(sort, Style::default().fg(pal.accent)));

        frame.render_widget(
            Paragraph::new(vec![Line::from(first), Line::from(second)]),
            area,
        );
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, pal: &Palette) {
        let columns = self.columns();
        let cursor = self.cursor_column();

        let header = Row::new(columns.iter().map(|&c| {
            let style = if c == cursor {
                pal.table_header().add_modifier(Modifier::REVERSED)
            } else {
                pal.table_header()
            };
            Cell::from(cells::header_label(c, &self.view.sort)).style(style)
        }));

        let rows: Vec<Row> = self
            .rows()
            .iter()
            .map(|dev| {
                Row::new(columns.iter().map(|&c| {
                    let text = cells::cell_text(dev, c);
                    let style = match c.severity() {
                        Some(sev) if dev.cve_counts().get(sev) > 0 => {
                            Style::default().fg(pal.severity(sev))
                        }
                        _ if c == Column::Recommendation => {
                            pal.recommendation(dev.recommendation_class())
                        }
                        _ if c == Column::Host => Style::default().fg(pal.accent),
                        _ => Style::default(),
                    };
                    Cell::from(text).style(style)
                }))
                .style(pal.table_row())
            })
            .collect();

        let widths: Vec<Constraint> = columns
            .iter()
            .map(|c| match c {
                Column::Host => Constraint::Min(16),
                Column::Recommendation => Constraint::Min(18),
                Column::Model | Column::CurrentVersion | Column::RecommendedVersion => {
                    Constraint::Length(14)
                }
                _ => Constraint::Length(7),
            })
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(pal.table_selected())
            .highlight_symbol("▸");

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_drawer(&self, frame: &mut Frame, area: Rect, pal: &Palette, device: &Device) {
        let block = Block::default()
            .title(format!(" {} ", device.host()))
            .title_style(pal.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(pal.border(true));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let field = |label: &str, column: Column| {
            Line::from(vec![
                Span::styled(format!("  {label:<13}"), pal.key_hint()),
                Span::styled(cells::cell_text(device, column), pal.table_row()),
            ])
        };
        let info = vec![
            field("Model", Column::Model),
            field("Platform", Column::Platform),
            field("Version", Column::CurrentVersion),
            field("Recommended", Column::RecommendedVersion),
            field("Designation", Column::ReleaseDesignation),
            field("End of life", Column::EndOfLife),
            field("Uptime", Column::Uptime),
        ];
        frame.render_widget(Paragraph::new(info), halves[0]);

        let histogram = device.severity_histogram();
        let max = histogram
            .iter()
            .map(|&(_, n)| u64::from(n))
            .max()
            .unwrap_or(0);
        let bar_width = halves[1].width.saturating_sub(18);
        let mut bars = vec![Line::styled("  CVEs by severity", pal.title())];
        for (sev, n) in histogram {
            bars.push(Line::from(vec![
                Span::styled(format!("  {:<9}", sev.to_string()), pal.key_hint()),
                Span::styled(
                    cells::bar(u64::from(n), max, bar_width),
                    Style::default().fg(pal.severity(sev)),
                ),
                Span::styled(format!(" {n}"), pal.table_row()),
            ]));
        }
        frame.render_widget(Paragraph::new(bars), halves[1]);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect, pal: &Palette) {
        let hint = |k: &str, what: &str| {
            [
                Span::styled(format!(" {k} "), pal.key_hint_key()),
                Span::styled(format!("{what} "), pal.key_hint()),
            ]
        };
        let spans: Vec<Span> = if self.editing.is_some() {
            [hint("Tab", "next field"), hint("Enter/Esc", "done")]
                .into_iter()
                .flatten()
                .collect()
        } else {
            [
                hint("/", "filter"),
                hint("1-4", "severity"),
                hint("←/→ s", "sort"),
                hint("Enter", "drawer"),
                hint("c", "CVEs"),
                hint("T", "timeline"),
                hint("e/E/J", "export"),
            ]
            .into_iter()
            .flatten()
            .collect()
        };
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for DevicesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(field) = self.editing {
            return Ok(self.handle_editing_key(field, key));
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('g') => {
                self.select(0);
                None
            }
            KeyCode::Char('G') => {
                self.select(usize::MAX);
                None
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(10);
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(-10);
                None
            }
            KeyCode::Char('/') => {
                self.editing = Some(TextFilter::Host);
                None
            }
            KeyCode::Char(c @ '1'..='4') => {
                severity_for_key(c).map(|sev| Action::User(UserAction::ToggleSeverity(sev)))
            }
            KeyCode::Char('x') => Some(Action::User(UserAction::ClearFilters)),
            KeyCode::Left | KeyCode::Char('h') => {
                self.column_cursor = self.column_cursor.saturating_sub(1);
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.column_cursor = (self.column_cursor + 1).min(self.columns().len() - 1);
                None
            }
            KeyCode::Char('s') => Some(Action::User(UserAction::Sort(self.cursor_column()))),
            KeyCode::Enter => {
                let open_for_selected = self.drawer.as_ref().map(|d| d.host().to_owned())
                    == self.selected_host();
                if open_for_selected && self.drawer.is_some() {
                    self.drawer = None;
                    None
                } else {
                    self.with_host(UserAction::OpenDevice)
                }
            }
            KeyCode::Esc => {
                self.drawer = None;
                None
            }
            KeyCode::Char('c') => self.with_host(UserAction::OpenCves),
            KeyCode::Char('T') => self.with_host(UserAction::OpenTimeline),
            KeyCode::Char('i') => self
                .selected_device()
                .and_then(|d| d.release_designation().map(|c| c.into_owned()))
                .map(|code| Action::User(UserAction::OpenDesignation(code))),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ViewChanged(view) => {
                self.view = Arc::clone(view);
                self.select(self.selected_index());
                if self.editing.is_none() {
                    self.sync_inputs();
                }
                self.column_cursor = self.column_cursor.min(self.columns().len() - 1);
                // Keep the drawer on the same host across reloads.
                if let Some(host) = self.drawer.as_ref().map(|d| d.host().to_owned()) {
                    self.drawer = self.rows().iter().find(|d| d.host() == host).cloned();
                }
            }
            Action::ShowDevice(device) => {
                self.drawer = Some(Arc::clone(device));
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let pal = theme::palette(self.view.light);
        let shown = self.rows().len();
        let title = format!(
            " Devices · {} ({shown} of {}) ",
            self.view.batch.as_deref().unwrap_or("no batch"),
            self.view.summary.total
        );
        let block = Block::default()
            .title(title)
            .title_style(pal.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(pal.border(self.focused))
            .style(pal.base());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let drawer_height = if self.drawer.is_some() { DRAWER_HEIGHT } else { 0 };
        let layout = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(drawer_height),
            Constraint::Length(1),
        ])
        .split(inner);

        self.render_filter_bar(frame, layout[0], pal);
        if self.rows().is_empty() {
            let msg = if self.view.summary.total == 0 {
                "  No devices in this batch"
            } else {
                "  No devices match the current filters"
            };
            frame.render_widget(Paragraph::new(Line::styled(msg, pal.key_hint())), layout[1]);
        } else {
            self.render_table(frame, layout[1], pal);
        }
        if let Some(ref device) = self.drawer {
            self.render_drawer(frame, layout[2], pal, device);
        }
        self.render_hints(frame, layout[3], pal);
    }

    fn capturing_input(&self) -> bool {
        self.editing.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
