// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confirmation flow for destructive or surprising actions.
//!
//! An action is parked with [`ConfirmState::request`] and only handed back
//! for execution by [`ConfirmState::confirm`]. Cancelling, or requesting a
//! different action, discards whatever was pending.

use std::io::{self, BufRead, IsTerminal, Write};

use lockbox_core::{LockboxError, PlaintextEntry};

/// Something that needs an explicit yes before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Save an entry whose service name is already in the vault.
    SaveDuplicate(PlaintextEntry),
    /// Discard every record.
    ClearVault,
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::SaveDuplicate(entry) => format!(
                "An entry for '{}' already exists. Save another one?",
                entry.service
            ),
            PendingAction::ClearVault => {
                "Delete every entry in the vault? This cannot be undone.".to_string()
            }
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum ConfirmState {
    #[default]
    Idle,
    PendingConfirmation(PendingAction),
}

impl ConfirmState {
    /// Park `action`, replacing anything already pending.
    pub fn request(&mut self, action: PendingAction) {
        *self = ConfirmState::PendingConfirmation(action);
    }

    /// Release the pending action for execution and return to idle.
    pub fn confirm(&mut self) -> Option<PendingAction> {
        match std::mem::take(self) {
            ConfirmState::PendingConfirmation(action) => Some(action),
            ConfirmState::Idle => None,
        }
    }

    /// Drop the pending action, if any.
    pub fn cancel(&mut self) {
        *self = ConfirmState::Idle;
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        match self {
            ConfirmState::PendingConfirmation(action) => Some(action),
            ConfirmState::Idle => None,
        }
    }
}

/// Ask the user to confirm `action`.
///
/// `assume_yes` answers for them. Without a terminal there is nobody to ask,
/// so the answer must come from `--yes`.
pub fn ask(action: &PendingAction, assume_yes: bool) -> Result<bool, LockboxError> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(LockboxError::Validation(format!(
            "{} Re-run with --yes to confirm non-interactively.",
            action.prompt()
        )));
    }

    print!("{} [y/N]: ", action.prompt());
    io::stdout()
        .flush()
        .map_err(|e| LockboxError::Internal(format!("failed to write prompt: {e}")))?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| LockboxError::Internal(format!("failed to read answer: {e}")))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duplicate() -> PendingAction {
        PendingAction::SaveDuplicate(PlaintextEntry::new("gmail", "alice", "pw"))
    }

    #[test]
    fn starts_idle() {
        let state = ConfirmState::default();
        assert_eq!(state, ConfirmState::Idle);
        assert!(state.pending().is_none());
    }

    #[test]
    fn request_then_confirm_releases_action_once() {
        let mut state = ConfirmState::Idle;
        state.request(duplicate());
        assert_eq!(state.pending(), Some(&duplicate()));

        assert_eq!(state.confirm(), Some(duplicate()));
        assert_eq!(state, ConfirmState::Idle);
        assert_eq!(state.confirm(), None);
    }

    #[test]
    fn cancel_discards_pending_action() {
        let mut state = ConfirmState::Idle;
        state.request(PendingAction::ClearVault);
        state.cancel();
        assert_eq!(state, ConfirmState::Idle);
        assert_eq!(state.confirm(), None);
    }

    #[test]
    fn new_request_replaces_old_one() {
        let mut state = ConfirmState::Idle;
        state.request(duplicate());
        state.request(PendingAction::ClearVault);
        assert_eq!(state.pending(), Some(&PendingAction::ClearVault));
        assert_eq!(state.confirm(), Some(PendingAction::ClearVault));
    }

    #[test]
    fn prompts_name_the_service() {
        assert!(duplicate().prompt().contains("'gmail'"));
        assert!(PendingAction::ClearVault.prompt().contains("cannot be undone"));
    }

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn assume_yes_skips_prompt() {
        assert!(ask(&PendingAction::ClearVault, true).unwrap());
    }
}
