//! User-facing notices.
//!
//! The dashboard never surfaces failures as errors past its boundary; they
//! become [`Notice`]s delivered to a [`Notifier`]. [`NoticeBoard`] is the
//! in-memory notifier used by the runtime: it keeps the most recent notices
//! and lets success/info notices expire after a display window while errors
//! stay until dismissed.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long success and info notices stay visible.
pub const NOTICE_DISPLAY_SECS: i64 = 5;

/// Maximum number of notices retained by a [`NoticeBoard`].
const MAX_NOTICES: usize = 16;

// ── Notice ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A human-readable message for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Whether the notice should still be shown at `now`.
    ///
    /// Errors never expire on their own.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        match self.level {
            NoticeLevel::Error => true,
            NoticeLevel::Info | NoticeLevel::Success => {
                now - self.created_at < Duration::seconds(NOTICE_DISPLAY_SECS)
            }
        }
    }
}

// ── Notifier ──────────────────────────────────────────────────────────────────

/// Receiver of human-readable notices. Not a control surface: implementors
/// only display or record what they are given.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

// ── NoticeBoard ───────────────────────────────────────────────────────────────

/// Bounded in-memory notifier.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// All retained notices, oldest first.
    pub fn all(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Notices still visible at `now`, oldest first.
    pub fn visible_at(&self, now: DateTime<Utc>) -> Vec<Notice> {
        self.notices
            .iter()
            .filter(|n| n.is_visible_at(now))
            .cloned()
            .collect()
    }

    /// The most recent notice, if any.
    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    /// Drop expired notices.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.notices.retain(|n| n.is_visible_at(now));
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::error!(message = %notice.message, "notice"),
            _ => tracing::info!(message = %notice.message, "notice"),
        }
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
