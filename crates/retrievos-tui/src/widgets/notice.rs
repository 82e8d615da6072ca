//! Notice toast in the bottom-right corner.

use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use retrievos_core::{Notice, NoticeLevel};

use crate::theme::Palette;

/// How long a non-sticky notice stays up.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// A notice and when it was raised.
#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    pub raised: Instant,
}

impl Toast {
    pub fn new(notice: Notice, raised: Instant) -> Self {
        Self { notice, raised }
    }

    pub fn expired(&self, now: Instant) -> bool {
        !self.notice.sticky && now.duration_since(self.raised) >= NOTICE_TTL
    }
}

pub fn render(frame: &mut Frame, area: Rect, pal: &Palette, notice: &Notice) {
    let msg_len = u16::try_from(notice.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 64).min(area.width);
    let height = if msg_len.saturating_add(6) > width { 4 } else { 3 };

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (color, icon) = match notice.level {
        NoticeLevel::Error => (pal.error, "✗"),
        NoticeLevel::Warning => (pal.warn, "!"),
        NoticeLevel::Info => (pal.accent, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(pal.base());

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notice.message.as_str(), pal.table_row()),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(block).wrap(Wrap { trim: true }),
        toast_area,
    );
}
