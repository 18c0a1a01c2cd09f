//! Focus-session state machine: idle, solo, or team, with a wall-clock
//! timer, a bounded participant roster, and a navigation guard.
//!
//! One instance per UI context; nothing here is shared across tabs or
//! users, so there is no locking. Time is always passed in, never read
//! from a clock, so every transition is deterministic under test.

use crate::error::SessionError;
use chrono::{DateTime, Utc};

pub const TEAM_CAPACITY: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Idle,
    Solo,
    Team,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionMode::Idle => "idle",
            SessionMode::Solo => "solo",
            SessionMode::Team => "team",
        };
        f.write_str(name)
    }
}

/// Serializable view of the session for the UI.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub elapsed_seconds: i64,
    pub participants: Vec<String>,
    pub running: bool,
}

#[derive(Debug, Clone)]
pub struct FocusSession {
    mode: SessionMode,
    /// Timer origin while running: `now - already_elapsed`. Resuming
    /// re-captures it so suspension never drifts from wall clock.
    origin: Option<DateTime<Utc>>,
    elapsed_seconds: i64,
    /// Insertion-ordered; the owner is always first.
    participants: Vec<String>,
    pinned: Option<String>,
    pending_destination: Option<String>,
    running: bool,
}

impl FocusSession {
    pub fn new() -> Self {
        Self {
            mode: SessionMode::Idle,
            origin: None,
            elapsed_seconds: 0,
            participants: Vec::new(),
            pinned: None,
            pending_destination: None,
            running: false,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed_seconds
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn pinned(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    /// Start a solo or team session. Only legal from `Idle`; elapsed time
    /// resets and the roster is seeded with the owner.
    pub fn start(
        &mut self,
        mode: SessionMode,
        owner: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.mode != SessionMode::Idle || mode == SessionMode::Idle {
            return Err(SessionError::InvalidTransition {
                from: self.mode.to_string(),
                to: mode.to_string(),
            });
        }
        self.mode = mode;
        self.elapsed_seconds = 0;
        self.origin = Some(now);
        self.participants = vec![owner.to_string()];
        self.pinned = None;
        self.pending_destination = None;
        self.running = true;
        Ok(())
    }

    /// Back to `Idle` from any state: timer, roster, pin, and any pending
    /// navigation are all cleared unconditionally.
    pub fn end(&mut self) {
        *self = Self::new();
    }

    pub fn add_participant(&mut self, id: &str) -> Result<(), SessionError> {
        if self.mode != SessionMode::Team {
            return Err(SessionError::NotTeamSession);
        }
        if self.participants.iter().any(|p| p == id) {
            return Err(SessionError::AlreadyJoined(id.to_string()));
        }
        if self.participants.len() >= TEAM_CAPACITY {
            return Err(SessionError::TeamFull { capacity: TEAM_CAPACITY });
        }
        self.participants.push(id.to_string());
        Ok(())
    }

    /// Removing the pinned participant also clears the pin.
    pub fn remove_participant(&mut self, id: &str) -> Result<(), SessionError> {
        if self.mode != SessionMode::Team {
            return Err(SessionError::NotTeamSession);
        }
        let Some(idx) = self.participants.iter().position(|p| p == id) else {
            return Err(SessionError::UnknownParticipant(id.to_string()));
        };
        self.participants.remove(idx);
        if self.pinned.as_deref() == Some(id) {
            self.pinned = None;
        }
        Ok(())
    }

    pub fn pin(&mut self, id: &str) -> Result<(), SessionError> {
        if self.mode != SessionMode::Team {
            return Err(SessionError::NotTeamSession);
        }
        if !self.participants.iter().any(|p| p == id) {
            return Err(SessionError::UnknownParticipant(id.to_string()));
        }
        self.pinned = Some(id.to_string());
        Ok(())
    }

    /// Bank the elapsed time and stop the timer. The mode does not change;
    /// a paused team session is still a team session.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.running {
            self.elapsed_seconds = self.compute_elapsed(now);
            self.origin = None;
            self.running = false;
        }
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.mode != SessionMode::Idle && !self.running {
            self.origin = Some(now - chrono::Duration::seconds(self.elapsed_seconds));
            self.running = true;
        }
    }

    /// Recompute elapsed time from the origin. The per-second UI tick calls
    /// this; it is safe to call at any cadence.
    pub fn tick(&mut self, now: DateTime<Utc>) -> i64 {
        if self.running {
            self.elapsed_seconds = self.compute_elapsed(now);
        }
        self.elapsed_seconds
    }

    fn compute_elapsed(&self, now: DateTime<Utc>) -> i64 {
        match self.origin {
            Some(origin) => (now - origin).num_seconds().max(0),
            None => self.elapsed_seconds,
        }
    }

    /// Navigation guard. While the timer is running the destination is held
    /// for confirmation and `true` is returned; otherwise navigation is free
    /// to proceed immediately.
    pub fn request_navigation(&mut self, destination: &str) -> bool {
        if self.running {
            self.pending_destination = Some(destination.to_string());
            true
        } else {
            false
        }
    }

    pub fn pending_destination(&self) -> Option<&str> {
        self.pending_destination.as_deref()
    }

    /// Confirming ends the session and yields the held destination.
    pub fn confirm_navigation(&mut self) -> Option<String> {
        let destination = self.pending_destination.take();
        if destination.is_some() {
            self.end();
        }
        destination
    }

    pub fn cancel_navigation(&mut self) {
        self.pending_destination = None;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            elapsed_seconds: self.elapsed_seconds,
            participants: self.participants.clone(),
            running: self.running,
        }
    }
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::new()
    }
}
