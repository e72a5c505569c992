//! # Process State
//!
//! [`ProcessState<T>`] is the envelope around one asynchronously loaded value: the
//! `loading` / `success` / `error` flags, the number of in-flight processes and the
//! last known value.
//!
//! A state only changes through [`ProcessState::apply`], which takes a [`Transition`].
//! Reducers never touch the flags directly.
//!
//! ## Transition Table
//!
//! | Transition | `processes_count` | `loading` | `success` | `error` | `value` |
//! |------------|-------------------|-----------|-----------|---------|---------|
//! | `Start` | `+1` | `true` | kept | `false` | kept |
//! | `Success(v)` | `-1` (floor 0) | `count > 0` | `true` | `false` | `Some(v)` |
//! | `Fail(e)` | `-1` (floor 0) | `count > 0` | `false` | `true` | kept |
//! | `Finish` | `-1` (floor 0) | `count > 0` | `true` | `false` | kept |
//! | `Reset` | `0` | `false` | `false` | `false` | kept |
//!
//! A failed refresh never erases the last good value. Only removing the key from the
//! [`KeyedStore`](crate::KeyedStore) does that.

use serde::{Deserialize, Serialize};

/// Lifecycle envelope of a single keyed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessState<T> {
    pub loading: bool,
    pub success: bool,
    pub error: bool,
    pub processes_count: u32,
    pub value: Option<T>,
}

impl<T> Default for ProcessState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            success: false,
            error: false,
            processes_count: 0,
            value: None,
        }
    }
}

/// A reducer-level change applied to one [`ProcessState`].
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<T> {
    /// A load, create or update was triggered.
    Start,
    /// The triggered process finished with a value.
    Success(T),
    /// The triggered process finished without producing a value.
    Finish,
    /// The triggered process failed. The payload is the failure reason, kept for logging.
    Fail(String),
    /// Clear in-flight and outcome flags, keep the cached value.
    Reset,
}

impl<T> Transition<T> {
    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Success(_) => "success",
            Transition::Finish => "finish",
            Transition::Fail(_) => "fail",
            Transition::Reset => "reset",
        }
    }
}

impl<T> ProcessState<T> {
    /// Applies a transition according to the table in the module docs.
    pub fn apply(&mut self, transition: Transition<T>) {
        match transition {
            Transition::Start => {
                self.processes_count += 1;
                self.loading = true;
                self.error = false;
            }
            Transition::Success(value) => {
                self.processes_count = self.processes_count.saturating_sub(1);
                self.loading = self.processes_count > 0;
                self.success = true;
                self.error = false;
                self.value = Some(value);
            }
            Transition::Finish => {
                self.processes_count = self.processes_count.saturating_sub(1);
                self.loading = self.processes_count > 0;
                self.success = true;
                self.error = false;
            }
            Transition::Fail(_) => {
                self.processes_count = self.processes_count.saturating_sub(1);
                self.loading = self.processes_count > 0;
                self.success = false;
                self.error = true;
            }
            Transition::Reset => {
                self.processes_count = 0;
                self.loading = false;
                self.success = false;
                self.error = false;
            }
        }
    }

    /// `true` when nothing is in flight for this entity.
    pub fn is_stable(&self) -> bool {
        self.processes_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zeroed() {
        let state = ProcessState::<String>::default();
        assert!(!state.loading);
        assert!(!state.success);
        assert!(!state.error);
        assert_eq!(state.processes_count, 0);
        assert_eq!(state.value, None);
        assert!(state.is_stable());
    }

    #[test]
    fn test_start_then_success() {
        let mut state = ProcessState::default();
        state.apply(Transition::Start);
        assert!(state.loading);
        assert_eq!(state.processes_count, 1);

        state.apply(Transition::Success("cart".to_string()));
        assert!(!state.loading);
        assert!(state.success);
        assert_eq!(state.processes_count, 0);
        assert_eq!(state.value.as_deref(), Some("cart"));
    }

    #[test]
    fn test_failed_refresh_keeps_value() {
        let mut state = ProcessState::default();
        state.apply(Transition::Start);
        state.apply(Transition::Success(7));

        state.apply(Transition::Start);
        // Refresh in progress keeps the previous success visible
        assert!(state.success);
        state.apply(Transition::Fail("timeout".into()));

        assert!(state.error);
        assert!(!state.success);
        assert_eq!(state.value, Some(7));
    }

    #[test]
    fn test_overlapping_processes_keep_loading() {
        let mut state = ProcessState::default();
        state.apply(Transition::Start);
        state.apply(Transition::Start);
        state.apply(Transition::Success(1));
        assert!(state.loading);
        assert_eq!(state.processes_count, 1);

        state.apply(Transition::Fail("boom".into()));
        assert!(!state.loading);
        assert_eq!(state.processes_count, 0);
    }

    #[test]
    fn test_processes_count_never_negative() {
        let mut state = ProcessState::<u8>::default();
        state.apply(Transition::Fail("stray".into()));
        state.apply(Transition::Success(1));
        assert_eq!(state.processes_count, 0);

        // 3 starts, 5 ends: count = max(0, ...) at every step
        let script = [
            Transition::Start,
            Transition::Start,
            Transition::Success(2),
            Transition::Fail("x".into()),
            Transition::Fail("y".into()),
            Transition::Start,
            Transition::Success(3),
        ];
        let mut expected: u32 = 0;
        for transition in script {
            match transition {
                Transition::Start => expected += 1,
                _ => expected = expected.saturating_sub(1),
            }
            state.apply(transition);
            assert_eq!(state.processes_count, expected);
        }
    }

    #[test]
    fn test_finish_ends_process_without_value() {
        let mut state = ProcessState::<u8>::default();
        state.apply(Transition::Start);
        state.apply(Transition::Finish);
        assert!(state.is_stable());
        assert!(!state.loading);
        assert!(state.success);
        assert_eq!(state.value, None);
    }

    #[test]
    fn test_reset_keeps_value() {
        let mut state = ProcessState::default();
        state.apply(Transition::Start);
        state.apply(Transition::Success("v"));
        state.apply(Transition::Start);
        state.apply(Transition::Start);

        state.apply(Transition::Reset);
        assert_eq!(state, ProcessState {
            loading: false,
            success: false,
            error: false,
            processes_count: 0,
            value: Some("v"),
        });
    }
}
