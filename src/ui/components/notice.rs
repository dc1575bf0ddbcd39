use std::time::{Duration, Instant};

use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const VISIBLE_FOR: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A one-shot toast shown over the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    shown_at: Instant,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into(), shown_at: Instant::now() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into(), shown_at: Instant::now() }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= VISIBLE_FOR
    }
}

/// Top-right corner below the first row, or `None` when the terminal is too small.
fn notice_area(size: Rect) -> Option<Rect> {
    let width = size.width.min(60);
    let height = 3.min(size.height.saturating_sub(1));
    if width == 0 || height == 0 {
        return None;
    }
    Some(Rect {
        x: size.x + size.width.saturating_sub(width + 1),
        y: size.y + 1,
        width,
        height,
    })
}

pub fn render_notice<B: Backend>(frame: &mut Frame<B>, notice: &Notice) {
    let Some(area) = notice_area(frame.size()) else {
        return;
    };

    let (title, color) = match notice.kind {
        NoticeKind::Success => ("Done", Color::Green),
        NoticeKind::Error => ("Error", Color::Red),
    };

    let toast = Paragraph::new(notice.message.as_str())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(toast, area);
}
