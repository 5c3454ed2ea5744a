//! Transient status notices.
//!
//! Notices are what a reader would see in the corner of the page. Here they
//! are logged as they are raised and kept in order for the run summary.

use std::time::Duration;

/// How a notice is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Loading,
    Success,
    Error,
}

/// One status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    /// How long the notice stays up; `None` keeps it until replaced.
    pub duration: Option<Duration>,
}

impl Notice {
    pub fn new(message: impl Into<String>, severity: Severity, duration: Option<Duration>) -> Self {
        Notice {
            message: message.into(),
            severity,
            duration,
        }
    }
}

/// Ordered record of every notice raised during a run.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    history: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notice: Notice) {
        match notice.severity {
            Severity::Error => log::warn!("{}", notice.message),
            Severity::Loading => log::debug!("{}", notice.message),
            Severity::Info | Severity::Success => log::info!("{}", notice.message),
        }
        self.history.push(notice);
    }

    pub fn history(&self) -> &[Notice] {
        &self.history
    }

    /// The notice currently on screen, if any.
    pub fn latest(&self) -> Option<&Notice> {
        self.history.last()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.history.iter().any(|notice| notice.message == message)
    }
}
