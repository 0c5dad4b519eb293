use std::sync::Arc;

use chrono::Local;

use crate::state::keys::{
    END_DATE, ITIN_DATETIME, ITIN_END_DATE, ITIN_INITIALIZED, ITIN_KEY, ITIN_START_DATE,
    START_DATE, SYSTEM_TIME,
};
use crate::state::{SessionId, SessionStateService, StateRecord, StateValue};

use super::profile::{ProfileLoader, ProfileState};

/// Seeds a session's state from the profile exactly once.
#[derive(Debug)]
pub struct MemoryBootstrap {
    state: Arc<SessionStateService>,
    loader: ProfileLoader,
}

impl MemoryBootstrap {
    pub fn new(state: Arc<SessionStateService>, loader: ProfileLoader) -> Self {
        Self { state, loader }
    }

    /// Initialize per-session state. Safe to call repeatedly; guarded by
    /// `_itin_initialized`. Profile problems never fail the call: the session
    /// still ends up initialized with `_time` set.
    pub fn bootstrap(&self, session_id: &SessionId) {
        let record = self.state.get_or_init(session_id);
        let _guard = record.lock_bootstrap();
        if record.is_true(ITIN_INITIALIZED) {
            tracing::debug!(session = %session_id, "session already initialized");
            return;
        }

        let profile = self.loader.load();
        set_initial_states(&profile, &record, local_timestamp());
        tracing::info!(session = %session_id, keys = profile.len(), "session state bootstrapped");
    }
}

fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

/// Merge `source` into `target` and derive the itinerary date keys.
fn set_initial_states(source: &ProfileState, target: &StateRecord, now: String) {
    target.insert_if_absent(SYSTEM_TIME, now);
    target.insert(ITIN_INITIALIZED, true);

    for (key, value) in source {
        if key == ITIN_INITIALIZED {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }

    if let Some(StateValue::Map(itinerary)) = source.get(ITIN_KEY) {
        if let Some(start) = itinerary.get(START_DATE) {
            target.insert(ITIN_START_DATE, start.clone());
            target.insert(ITIN_DATETIME, start.clone());
        }
        if let Some(end) = itinerary.get(END_DATE) {
            target.insert(ITIN_END_DATE, end.clone());
        }
    }
}
