//! Member-picker selection state.
//!
//! One [`SelectionBuffer`] exists per open picker. Each select event fully
//! replaces the buffer (no accumulation across events), and confirming an
//! empty buffer is rejected before any send is attempted. The
//! [`SessionStore`] keys buffers by the picker message and enforces the
//! 180-second inactivity timeout; expired sessions read as absent, which
//! leaves the stale components inert.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::announce::UserRef;

pub const MIN_SELECTION: usize = 1;
pub const MAX_SELECTION: usize = 25;
pub const PICKER_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickerError {
    #[error("no members selected")]
    EmptySelection,
    #[error("selection exceeds {MAX_SELECTION} members")]
    TooManySelected,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionBuffer {
    selected: Vec<UserRef>,
}

impl SelectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire selection with the latest set from the platform.
    pub fn replace(&mut self, selected: Vec<UserRef>) {
        self.selected = selected;
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Validates the buffer for sending and hands back the members in
    /// selection order. The 25-member ceiling is enforced by the select
    /// component itself; rechecking here keeps the invariant local.
    pub fn confirm(&self) -> Result<&[UserRef], PickerError> {
        if self.selected.is_empty() {
            return Err(PickerError::EmptySelection);
        }
        if self.selected.len() > MAX_SELECTION {
            return Err(PickerError::TooManySelected);
        }

        Ok(&self.selected)
    }
}

struct Session {
    invoker: UserRef,
    buffer: SelectionBuffer,
    last_activity: Instant,
}

/// Selection buffers keyed by picker message id.
///
/// Sessions are independent per interaction; there is no cross-guild or
/// cross-user sharing. Expired entries are pruned on every access.
pub struct SessionStore {
    sessions: HashMap<u64, Session>,
    timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_timeout(PICKER_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { sessions: HashMap::new(), timeout }
    }

    pub fn open(&mut self, message_id: u64, invoker: UserRef, now: Instant) {
        self.prune(now);
        self.sessions.insert(
            message_id,
            Session { invoker, buffer: SelectionBuffer::new(), last_activity: now },
        );
    }

    /// Records the latest selection; returns false for unknown or expired
    /// sessions (the caller acknowledges and otherwise ignores those).
    pub fn record_selection(
        &mut self,
        message_id: u64,
        selected: Vec<UserRef>,
        now: Instant,
    ) -> bool {
        self.prune(now);
        match self.sessions.get_mut(&message_id) {
            Some(session) => {
                session.buffer.replace(selected);
                session.last_activity = now;
                true
            }
            None => false,
        }
    }

    /// Removes the session and returns its invoker and validated selection.
    /// `Ok(None)` means the session is unknown or expired.
    pub fn take_confirmed(
        &mut self,
        message_id: u64,
        now: Instant,
    ) -> Result<Option<(UserRef, Vec<UserRef>)>, PickerError> {
        self.prune(now);
        let Some(session) = self.sessions.get(&message_id) else {
            return Ok(None);
        };

        session.buffer.confirm()?;
        let session = self.sessions.remove(&message_id);
        Ok(session.map(|session| (session.invoker, session.buffer.selected)))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn prune(&mut self, now: Instant) {
        let timeout = self.timeout;
        self.sessions
            .retain(|_, session| now.duration_since(session.last_activity) < timeout);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{PickerError, SelectionBuffer, SessionStore, MAX_SELECTION};
    use crate::announce::UserRef;

    fn users(ids: &[u64]) -> Vec<UserRef> {
        ids.iter().copied().map(UserRef::new).collect()
    }

    #[test]
    fn empty_selection_is_rejected_on_confirm() {
        let buffer = SelectionBuffer::new();
        assert_eq!(buffer.confirm(), Err(PickerError::EmptySelection));
    }

    #[test]
    fn replace_discards_the_previous_selection() {
        let mut buffer = SelectionBuffer::new();
        buffer.replace(users(&[1, 2, 3]));
        buffer.replace(users(&[4]));

        assert_eq!(buffer.confirm().expect("non-empty"), users(&[4]).as_slice());
    }

    #[test]
    fn confirm_preserves_selection_order() {
        let mut buffer = SelectionBuffer::new();
        buffer.replace(users(&[7, 2, 9]));

        assert_eq!(buffer.confirm().expect("non-empty"), users(&[7, 2, 9]).as_slice());
    }

    #[test]
    fn oversized_selection_is_rejected() {
        let mut buffer = SelectionBuffer::new();
        buffer.replace((1..=(MAX_SELECTION as u64 + 1)).map(UserRef::new).collect());

        assert_eq!(buffer.confirm(), Err(PickerError::TooManySelected));
    }

    #[test]
    fn store_round_trips_a_session() {
        let mut store = SessionStore::new();
        let now = Instant::now();

        store.open(10, UserRef::new(9), now);
        assert!(store.record_selection(10, users(&[1, 2]), now));

        let (invoker, selected) =
            store.take_confirmed(10, now).expect("valid selection").expect("live session");
        assert_eq!(invoker, UserRef::new(9));
        assert_eq!(selected, users(&[1, 2]));
        assert!(store.is_empty());
    }

    #[test]
    fn confirm_without_selection_keeps_the_session_open() {
        let mut store = SessionStore::new();
        let now = Instant::now();

        store.open(10, UserRef::new(9), now);
        assert_eq!(store.take_confirmed(10, now), Err(PickerError::EmptySelection));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn expired_sessions_read_as_absent() {
        let mut store = SessionStore::with_timeout(Duration::from_secs(180));
        let opened = Instant::now();

        store.open(10, UserRef::new(9), opened);
        store.record_selection(10, users(&[1]), opened);

        let later = opened + Duration::from_secs(181);
        assert!(!store.record_selection(10, users(&[2]), later));
        assert_eq!(store.take_confirmed(10, later), Ok(None));
        assert!(store.is_empty());
    }

    #[test]
    fn activity_extends_the_session_deadline() {
        let mut store = SessionStore::with_timeout(Duration::from_secs(180));
        let opened = Instant::now();

        store.open(10, UserRef::new(9), opened);
        let midway = opened + Duration::from_secs(100);
        assert!(store.record_selection(10, users(&[1]), midway));

        // 179 s since the last activity, 279 s since open: still live.
        let near_deadline = midway + Duration::from_secs(179);
        let confirmed = store.take_confirmed(10, near_deadline).expect("valid selection");
        assert!(confirmed.is_some());
    }

    #[test]
    fn sessions_are_independent_per_picker_message() {
        let mut store = SessionStore::new();
        let now = Instant::now();

        store.open(10, UserRef::new(1), now);
        store.open(20, UserRef::new(2), now);
        store.record_selection(10, users(&[5]), now);
        store.record_selection(20, users(&[6]), now);

        let (_, first) = store.take_confirmed(10, now).expect("valid").expect("live");
        let (_, second) = store.take_confirmed(20, now).expect("valid").expect("live");
        assert_eq!(first, users(&[5]));
        assert_eq!(second, users(&[6]));
    }
}
