//! Overview screen: header counters, severity totals, upgrade split and
//! the cross-batch trend.
//!
//! ┌─ Overview ────────────────────────────────────────────────────────┐
//! │  Devices 142   Need upgrade 37   With critical CVEs 9             │
//! │ ┌─ CVEs by severity ──────┐ ┌─ Upgrade split ───────────────────┐ │
//! │ │ Critical ██████    41   │ │ Upgrade  ████████          37     │ │
//! │ │ High     ██████████ 88  │ │ Stay     ███████████████  105     │ │
//! │ └─────────────────────────┘ └───────────────────────────────────┘ │
//! │ ┌─ Trend ───────────────────────────────────────────────────────┐ │
//! │ │  critical devices + high CVEs per batch, oldest first         │ │
//! │ └───────────────────────────────────────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────────────┘

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph};

use crate::action::{Action, DashboardView};
use crate::component::Component;
use crate::theme::{self, Palette};
use crate::widgets::cells;

pub struct OverviewScreen {
    focused: bool,
    view: Arc<DashboardView>,
}

/// `(x, y)` points for a trend series, x being the batch index.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn series(view: &DashboardView, pick: fn(&retrievos_core::TrendPoint) -> u64) -> Vec<(f64, f64)> {
    view.trend
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, pick(p) as f64))
        .collect()
}

impl OverviewScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            view: Arc::new(DashboardView::default()),
        }
    }

    fn panel<'a>(&self, title: &'a str, pal: &Palette) -> Block<'a> {
        Block::default()
            .title(title)
            .title_style(pal.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(pal.border(false))
    }

    fn render_counters(&self, frame: &mut Frame, area: Rect, pal: &Palette) {
        let summary = self.view.summary;
        let counter = |label: &str, value: usize, style: Style| {
            [
                Span::styled(format!("  {label} "), pal.key_hint()),
                Span::styled(value.to_string(), style.add_modifier(Modifier::BOLD)),
            ]
        };
        let spans: Vec<Span> = [
            counter("Devices", summary.total, Style::default().fg(pal.accent)),
            counter(
                "Need upgrade",
                summary.needing_upgrade,
                Style::default().fg(pal.warn),
            ),
            counter(
                "With critical CVEs",
                summary.with_critical_cves,
                Style::default().fg(pal.critical),
            ),
        ]
        .into_iter()
        .flatten()
        .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_severity_totals(&self, frame: &mut Frame, area: Rect, pal: &Palette) {
        let block = self.panel(" CVEs by severity ", pal);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let totals = self.view.severity_totals;
        let max = totals.iter().map(|(_, n)| u64::from(n)).max().unwrap_or(0);
        let width = inner.width.saturating_sub(20);
        let lines: Vec<Line> = totals
            .iter()
            .map(|(sev, n)| {
                Line::from(vec![
                    Span::styled(format!("  {:<9}", sev.to_string()), pal.key_hint()),
                    Span::styled(
                        cells::bar(u64::from(n), max, width),
                        Style::default().fg(pal.severity(sev)),
                    ),
                    Span::styled(format!(" {n}"), pal.table_row()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_upgrade_split(&self, frame: &mut Frame, area: Rect, pal: &Palette) {
        let block = self.panel(" Upgrade split ", pal);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let split = self.view.upgrade_split;
        let need = u64::try_from(split.need).unwrap_or(u64::MAX);
        let same = u64::try_from(split.same).unwrap_or(u64::MAX);
        let max = need.max(same);
        let width = inner.width.saturating_sub(20);
        let lines = vec![
            Line::from(vec![
                Span::styled("  Upgrade  ", pal.key_hint()),
                Span::styled(cells::bar(need, max, width), Style::default().fg(pal.warn)),
                Span::styled(format!(" {need}"), pal.table_row()),
            ]),
            Line::from(vec![
                Span::styled("  Stay     ", pal.key_hint()),
                Span::styled(cells::bar(same, max, width), Style::default().fg(pal.ok)),
                Span::styled(format!(" {same}"), pal.table_row()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn render_trend(&self, frame: &mut Frame, area: Rect, pal: &Palette) {
        let block = self.panel(" Trend ", pal);

        if self.view.trend.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  No batch summaries yet").style(pal.key_hint()),
                inner,
            );
            return;
        }

        let critical = series(&self.view, |p| p.devices_with_critical);
        let high = series(&self.view, |p| p.total_high);
        let y_max = critical
            .iter()
            .chain(&high)
            .map(|&(_, y)| y)
            .fold(0.0f64, f64::max)
            * 1.1;
        let x_max = (self.view.trend.len().saturating_sub(1)) as f64;

        let datasets = vec![
            Dataset::default()
                .name("High CVEs")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(pal.high))
                .data(&high),
            Dataset::default()
                .name("Devices with critical")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(pal.critical))
                .data(&critical),
        ];

        let first = self.view.trend.first().map_or("", |p| p.batch.as_str());
        let last = self.view.trend.last().map_or("", |p| p.batch.as_str());

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(pal.muted))
                    .bounds([0.0, x_max.max(1.0)])
                    .labels([Span::raw(first.to_owned()), Span::raw(last.to_owned())]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(pal.muted))
                    .bounds([0.0, y_max.max(1.0)])
                    .labels([Span::raw("0"), Span::raw(format!("{:.0}", y_max.max(1.0)))]),
            );
        frame.render_widget(chart, area);
    }
}

impl Component for OverviewScreen {
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::ViewChanged(view) = action {
            self.view = Arc::clone(view);
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let pal = theme::palette(self.view.light);
        let title = format!(
            " Overview · {} ",
            self.view.batch.as_deref().unwrap_or("no batch")
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

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Min(6),
        ])
        .split(inner);
        let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        self.render_counters(frame, rows[0], pal);
        self.render_severity_totals(frame, halves[0], pal);
        self.render_upgrade_split(frame, halves[1], pal);
        self.render_trend(frame, rows[2], pal);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
