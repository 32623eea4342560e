//! Transient user-facing messages.

use std::fmt;
use std::time::{Duration, Instant};

/// How long an info notice stays visible.
pub const INFO_TIMEOUT: Duration = Duration::from_secs(6);
/// How long an error notice stays visible.
pub const ERROR_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
    /// Work in progress; stays until replaced.
    Pending,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Error => "error",
            Self::Pending => "doing",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub created: Instant,
    pub timeout: Option<Duration>,
}

impl Notice {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.timeout
            .is_some_and(|timeout| now.saturating_duration_since(self.created) >= timeout)
    }
}

/// The single notice slot of a console. Posting replaces the previous
/// notice.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    current: Option<Notice>,
}

impl Notices {
    pub fn info(&mut self, text: impl Into<String>) {
        self.post(NoticeLevel::Info, text.into(), Some(INFO_TIMEOUT));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.post(NoticeLevel::Error, text.into(), Some(ERROR_TIMEOUT));
    }

    pub fn doing(&mut self, text: impl Into<String>) {
        self.post(NoticeLevel::Pending, text.into(), None);
    }

    pub fn reset(&mut self) {
        self.current = None;
    }

    /// The visible notice at `now`; expired notices are dropped.
    pub fn current_at(&mut self, now: Instant) -> Option<&Notice> {
        if self
            .current
            .as_ref()
            .is_some_and(|notice| notice.is_expired_at(now))
        {
            self.current = None;
        }
        self.current.as_ref()
    }

    pub fn current(&mut self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    /// The last posted notice, expired or not.
    pub fn last(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    fn post(&mut self, level: NoticeLevel, text: String, timeout: Option<Duration>) {
        match level {
            NoticeLevel::Error => tracing::warn!(notice = %text, "error notice"),
            _ => tracing::debug!(level = %level, notice = %text, "notice"),
        }
        self.current = Some(Notice {
            level,
            text,
            created: Instant::now(),
            timeout,
        });
    }
}
