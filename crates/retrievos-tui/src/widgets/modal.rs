//! Modal overlays: detail panels, export preview, share link, batch
//! picker and help.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use retrievos_core::{CveLookup, Designation, ExportArtifact, FieldValue, Panel, TimelineEntry};

use super::cells::{EMPTY, or_empty};
use crate::theme::Palette;

#[derive(Debug, Clone)]
pub enum Modal {
    Panel(Panel),
    Preview(ExportArtifact),
    Query(String),
    Batches {
        batches: Vec<String>,
        current: Option<String>,
        selected: usize,
    },
    Help,
}

impl Modal {
    pub fn title(&self) -> String {
        match self {
            Self::Panel(panel) => match panel {
                Panel::Device(d) => format!(" {} ", d.host()),
                Panel::Timeline { host, .. } => format!(" Timeline · {host} "),
                Panel::Cves(CveLookup::Found(detail)) => {
                    format!(" CVEs · {} ({}) ", detail.host, detail.total())
                }
                Panel::Cves(CveLookup::NoRecord { host }) => format!(" CVEs · {host} "),
                Panel::Log { batch, .. } => format!(" Log · {batch} "),
                Panel::Mail { batch, .. } => format!(" Mail · {batch} "),
                Panel::Designation { code, .. } => format!(" Designation · {code} "),
            },
            Self::Preview(artifact) => format!(
                " {} · {} rows · {} ",
                artifact.file_name,
                artifact.rows,
                artifact.mime()
            ),
            Self::Query(_) => " Share link ".into(),
            Self::Batches { .. } => " Select batch ".into(),
            Self::Help => " Keyboard Shortcuts ".into(),
        }
    }

    pub fn lines(&self, pal: &Palette) -> Vec<Line<'static>> {
        match self {
            Self::Panel(panel) => panel_lines(panel, pal),
            Self::Preview(artifact) => artifact
                .content
                .lines()
                .map(|l| Line::from(l.to_owned()))
                .collect(),
            Self::Query(query) => vec![
                Line::from(""),
                if query.is_empty() {
                    Line::styled("  (no batch or filters set)", pal.key_hint())
                } else {
                    Line::styled(format!("  ?{query}"), pal.title())
                },
                Line::from(""),
                Line::styled("  Start with: retrievos-tui --link '<query>'", pal.key_hint()),
            ],
            Self::Batches {
                batches,
                current,
                selected,
            } => batches
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    let marker = if current.as_deref() == Some(b.as_str()) {
                        "●"
                    } else {
                        " "
                    };
                    let style = if i == *selected {
                        pal.table_selected()
                    } else {
                        pal.table_row()
                    };
                    Line::styled(format!(" {marker} {b}"), style)
                })
                .collect(),
            Self::Help => help_lines(pal),
        }
    }

    /// Batch pickers drive their own selection; others only scroll.
    pub fn is_picker(&self) -> bool {
        matches!(self, Self::Batches { .. })
    }
}

fn panel_lines(panel: &Panel, pal: &Palette) -> Vec<Line<'static>> {
    match panel {
        Panel::Device(d) => vec![Line::from(format!(
            "  {}  {}",
            d.host(),
            or_empty(&d.column(retrievos_core::Column::Model))
        ))],
        Panel::Timeline { host, entries } => timeline_lines(host, entries, pal),
        Panel::Cves(CveLookup::NoRecord { host }) => {
            vec![Line::styled(format!("  No record for {host}"), pal.key_hint())]
        }
        Panel::Cves(CveLookup::Found(detail)) => {
            if detail.total() == 0 {
                return vec![Line::styled("  No CVEs listed", pal.key_hint())];
            }
            let mut lines = Vec::new();
            for (severity, entries) in &detail.groups {
                lines.push(Line::styled(
                    format!("  {severity} ({})", entries.len()),
                    Style::default()
                        .fg(pal.severity(*severity))
                        .add_modifier(Modifier::BOLD),
                ));
                for e in entries {
                    lines.push(Line::from(vec![
                        Span::styled(format!("    {:<18}", e.id), pal.title()),
                        Span::styled(e.title.clone(), pal.table_row()),
                    ]));
                    if let Some(ref link) = e.link {
                        lines.push(Line::styled(format!("      {link}"), pal.key_hint()));
                    }
                }
            }
            lines
        }
        Panel::Log { lines, .. } => lines
            .iter()
            .map(|l| {
                let style = if l.warning {
                    pal.log_warning()
                } else {
                    pal.table_row()
                };
                Line::styled(l.text.clone(), style)
            })
            .collect(),
        Panel::Mail { text, .. } => text.lines().map(|l| Line::from(l.to_owned())).collect(),
        Panel::Designation { code, info } => match info {
            Some(d) => vec![
                Line::from(""),
                Line::styled(format!("  {} · {}", d.code, d.title), pal.title()),
                Line::from(""),
                Line::styled(format!("  {}", d.description), pal.table_row()),
            ],
            None => vec![
                Line::from(""),
                Line::styled(format!("  {}", Designation::notice(code)), pal.key_hint()),
            ],
        },
    }
}

fn timeline_lines(host: &str, entries: &[TimelineEntry], pal: &Palette) -> Vec<Line<'static>> {
    if entries.is_empty() {
        return vec![Line::styled(format!("  No history for {host}"), pal.key_hint())];
    }
    let text = |v: Option<&String>| v.map_or_else(|| EMPTY.to_owned(), Clone::clone);
    let count = |v: Option<u64>| v.map_or_else(|| EMPTY.to_owned(), |n| n.to_string());

    let mut lines = vec![Line::styled(
        format!(
            "  {:<22} {:<14} {:<14} {:<6} {:>5} {:>5} {:>6}",
            "Batch", "Version", "Recommended", "Desig", "Crit", "High", "CPU"
        ),
        pal.table_header(),
    )];
    for e in entries {
        let upgrade = e.upgrade_recommended.unwrap_or(false);
        lines.push(Line::styled(
            format!(
                "  {:<22} {:<14} {:<14} {:<6} {:>5} {:>5} {:>6}",
                e.batch_ts,
                text(e.version.as_ref()),
                text(e.recommended_version.as_ref()),
                text(e.release_designation.as_ref()),
                count(e.critical_cves),
                count(e.high_cves),
                or_empty(&FieldValue::from_value(e.cpu_usage.as_ref())),
            ),
            if upgrade {
                Style::default().fg(pal.warn)
            } else {
                pal.table_row()
            },
        ));
    }
    lines
}

fn help_lines(pal: &Palette) -> Vec<Line<'static>> {
    let section = |name: &str| Line::styled(format!("  {name}"), pal.title());
    let key = |k: &str, what: &str| {
        Line::from(vec![
            Span::styled(format!("  {k:<10}"), pal.key_hint_key()),
            Span::styled(what.to_owned(), pal.key_hint()),
        ])
    };
    vec![
        Line::from(""),
        section("Navigation"),
        key("Tab", "Switch screen"),
        key("j/k ↑/↓", "Move selection"),
        key("g/G", "Top / bottom"),
        key("Enter", "Device drawer"),
        key("b", "Pick batch"),
        key("Esc", "Close"),
        Line::from(""),
        section("Filters"),
        key("/", "Edit host, model, recommendation (Tab cycles)"),
        key("1-4", "Toggle Critical / High / Medium / Low"),
        key("x", "Clear filters"),
        key("←/→ s", "Pick column, sort by it"),
        Line::from(""),
        section("Details"),
        key("c", "CVEs of selected device"),
        key("T", "Timeline of selected device"),
        key("i", "Designation info"),
        key("L / M", "Batch log / report mail"),
        Line::from(""),
        section("Export & view"),
        key("e / J", "Save CSV / JSON"),
        key("E", "Preview CSV"),
        key("y", "Share link"),
        key("t / D", "Theme / density"),
        key("r", "Refresh"),
        key("q", "Quit"),
    ]
}

/// Draw a modal centered over `area`.
pub fn render(frame: &mut Frame, area: Rect, pal: &Palette, modal: &Modal, scroll: u16) {
    let (width, height) = match modal {
        Modal::Query(_) => (70, 8),
        Modal::Batches { batches, .. } => {
            (40, u16::try_from(batches.len()).unwrap_or(u16::MAX).saturating_add(2))
        }
        Modal::Help => (64, 32),
        _ => (area.width.saturating_sub(8), area.height.saturating_sub(4)),
    };
    let modal_area = super::centered(area, width, height);

    frame.render_widget(Clear, modal_area);
    let block = Block::default()
        .title(modal.title())
        .title_style(pal.title())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(pal.border(true))
        .style(pal.base());

    let para = Paragraph::new(modal.lines(pal))
        .block(block)
        .scroll((scroll, 0));
    let para = if matches!(modal, Modal::Preview(_) | Modal::Panel(Panel::Log { .. })) {
        para
    } else {
        para.wrap(Wrap { trim: false })
    };
    frame.render_widget(para, modal_area);
}
