//! Transient notices
//!
//! One notice at a time: a new notice replaces the current one, and each
//! expires a fixed delay after it was shown whatever happens in between.

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::NOTICE_TTL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub shown_at: Instant,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Holder for the single visible notice.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    current: Option<Notice>,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(NOTICE_TTL)
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.show(NoticeKind::Success, text.into(), Instant::now());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.show(NoticeKind::Error, text.into(), Instant::now());
    }

    pub fn show(&mut self, kind: NoticeKind, text: String, now: Instant) {
        tracing::debug!(kind = ?kind, notice = %text, "notice shown");
        self.current = Some(Notice {
            kind,
            text,
            shown_at: now,
        });
    }

    /// Visible notice right now
    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    /// Visible notice at `now`; expired notices are hidden
    pub fn current_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < self.ttl)
    }

    /// Last notice shown, expired or not
    pub fn last(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
