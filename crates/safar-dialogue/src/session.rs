// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user in-memory session.

use std::time::{Duration, Instant};

use crate::draft::Draft;
use crate::state::DialogueState;

/// The admin's document-forwarding session, opened by `/send_ticket`.
///
/// The session is owned state, not a flag: it knows who it targets and when
/// it was last used, and it expires after the configured idle timeout so a
/// forgotten session cannot leak later messages to a user.
#[derive(Debug, Clone)]
pub struct ForwardSession {
    pub target: i64,
    pub last_active: Instant,
}

impl ForwardSession {
    pub fn new(target: i64) -> Self {
        Self {
            target,
            last_active: Instant::now(),
        }
    }

    pub fn expired(&self, timeout: Duration) -> bool {
        self.last_active.elapsed() >= timeout
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

/// Everything the engine remembers about one user between messages.
#[derive(Debug, Default)]
pub struct Session {
    /// Current dialogue state; `None` outside any flow.
    pub state: Option<DialogueState>,
    /// Fields collected for the in-progress draft.
    pub draft: Draft,
    /// Page the user last viewed in the merged request list.
    pub page: usize,
    /// Active forwarding session (admin only).
    pub forward: Option<ForwardSession>,
}

impl Session {
    /// Leave the current flow, keeping the reusable identity prefill.
    pub fn end_flow(&mut self) {
        self.state = None;
        self.draft.keep_identity();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_session_expires_after_idle() {
        let mut fwd = ForwardSession::new(42);
        assert!(!fwd.expired(Duration::from_secs(900)));
        assert!(fwd.expired(Duration::ZERO));
        fwd.touch();
        assert!(!fwd.expired(Duration::from_secs(900)));
    }

    #[test]
    fn end_flow_keeps_identity() {
        let mut session = Session::default();
        session.state = Some(DialogueState::Reason);
        session.draft.name = "Иванова Мария".to_string();
        session.draft.route = "А - Б".to_string();

        session.end_flow();
        assert!(session.state.is_none());
        assert_eq!(session.draft.name, "Иванова Мария");
        assert!(session.draft.route.is_empty());
    }
}
