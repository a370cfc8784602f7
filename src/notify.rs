use std::collections::VecDeque;

use crate::error::UniverseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// CSS class suffix and accent color used by the popup.
    pub fn class(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn accent(self) -> &'static str {
        match self {
            Severity::Info => "#00ffff",
            Severity::Success => "#66ff66",
            Severity::Warning => "#ffaa00",
            Severity::Error => "#ff6666",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub expires_at_ms: f64,
}

/// Transient popups. New entries wait in `pending` until the DOM layer
/// drains them; shown entries are expired by time.
#[derive(Debug, Default)]
pub struct Notifier {
    lifetime_ms: f64,
    pending: VecDeque<Notification>,
    shown: Vec<Notification>,
}

impl Notifier {
    pub fn new(lifetime_ms: f64) -> Self {
        Self {
            lifetime_ms,
            ..Self::default()
        }
    }

    pub fn push(&mut self, now_ms: f64, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        log::debug!("notify[{}]: {message}", severity.class());
        self.pending.push_back(Notification {
            message,
            severity,
            expires_at_ms: now_ms + self.lifetime_ms,
        });
    }

    pub fn error(&mut self, now_ms: f64, err: &UniverseError) {
        let severity = match err {
            UniverseError::EmptyInput => Severity::Warning,
            _ => Severity::Error,
        };
        self.push(now_ms, severity, user_message(err));
    }

    /// Hands over everything not yet displayed.
    pub fn drain_pending(&mut self) -> Vec<Notification> {
        let fresh: Vec<_> = self.pending.drain(..).collect();
        self.shown.extend(fresh.iter().cloned());
        fresh
    }

    /// Drops popups whose lifetime has passed, displayed or not, and returns
    /// how many went.
    pub fn expire(&mut self, now_ms: f64) -> usize {
        let before = self.shown.len() + self.pending.len();
        self.shown.retain(|n| n.expires_at_ms > now_ms);
        self.pending.retain(|n| n.expires_at_ms > now_ms);
        before - self.shown.len() - self.pending.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.shown.iter().chain(self.pending.iter())
    }
}

fn user_message(err: &UniverseError) -> String {
    match err {
        UniverseError::DuplicateUser(_) => "Username already exists.".to_string(),
        UniverseError::BadCredentials => "Incorrect password.".to_string(),
        UniverseError::EmptyInput => "Please enter a mission description.".to_string(),
        UniverseError::PasswordMismatch => "Passwords do not match.".to_string(),
        UniverseError::NoSession => "Please log in first.".to_string(),
        UniverseError::RendererUnavailable => {
            "3D parallax renderer unavailable, showing the depth layout in normal rendering.".to_string()
        }
        UniverseError::Storage(err) => format!("Could not save your missions: {err}"),
    }
}
