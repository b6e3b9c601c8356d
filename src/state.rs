use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::config::AppConfig;
use crate::session::SessionManager;

/// Managed application state. The session mutex serializes all
/// session-mutating calls; the save flag rejects a second save while one is
/// in flight (an explicit guard, not UI discipline).
pub struct AppState {
    pub session: Mutex<SessionManager>,
    pub config: Mutex<AppConfig>,
    /// Path of the currently staged recording copy; replaced on each stop.
    pub staged_recording: Mutex<Option<PathBuf>>,
    save_in_flight: AtomicBool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(SessionManager::new()),
            // Config will be loaded properly in setup, but we need a default here
            config: Mutex::new(AppConfig::default()),
            staged_recording: Mutex::new(None),
            save_in_flight: AtomicBool::new(false),
        }
    }

    /// Claims the single save slot. Returns `None` while another save runs;
    /// dropping the guard releases the slot.
    pub fn try_begin_save(&self) -> Option<SaveGuard<'_>> {
        if self
            .save_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(SaveGuard { state: self })
        } else {
            None
        }
    }
}

pub struct SaveGuard<'a> {
    state: &'a AppState,
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.state.save_in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_slot_is_exclusive() {
        let state = AppState::new();

        let guard = state.try_begin_save().unwrap();
        assert!(state.try_begin_save().is_none());

        drop(guard);
        assert!(state.try_begin_save().is_some());
    }
}
