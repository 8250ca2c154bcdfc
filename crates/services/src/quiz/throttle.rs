use chrono::{DateTime, Duration, Utc};
use quiz_core::model::SessionId;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::QuizServiceError;

/// Per-session debounce for rapid repeated input (double taps).
#[derive(Debug)]
pub struct EventThrottle {
    min_interval: Duration,
    last_accepted: Mutex<HashMap<SessionId, DateTime<Utc>>>,
}

impl EventThrottle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    /// Drop the record for a session that ended or restarted.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Poisoned` if the lock is poisoned.
    pub fn forget(&self, id: SessionId) -> Result<(), QuizServiceError> {
        self.last_accepted
            .lock()
            .map_err(|e| QuizServiceError::Poisoned(e.to_string()))?
            .remove(&id);
        Ok(())
    }

    /// Number of sessions with a recorded event.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.last_accepted.lock().map_or(0, |guard| guard.len())
    }

    /// Returns false when `now` falls within the interval of the last accepted event.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Poisoned` if the lock is poisoned.
    pub fn admit(&self, id: SessionId, now: DateTime<Utc>) -> Result<bool, QuizServiceError> {
        let mut guard = self
            .last_accepted
            .lock()
            .map_err(|e| QuizServiceError::Poisoned(e.to_string()))?;
        if let Some(last) = guard.get(&id) {
            if now - *last < self.min_interval {
                return Ok(false);
            }
        }
        guard.insert(id, now);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn rejects_events_inside_interval_per_session() {
        let throttle = EventThrottle::new(Duration::milliseconds(800));
        let a = SessionId::new(1);
        let b = SessionId::new(2);
        let now = fixed_now();

        assert!(throttle.admit(a, now).unwrap());
        assert!(!throttle.admit(a, now + Duration::milliseconds(300)).unwrap());
        assert!(throttle.admit(b, now + Duration::milliseconds(300)).unwrap());
        assert!(throttle.admit(a, now + Duration::milliseconds(800)).unwrap());
        assert_eq!(throttle.tracked(), 2);

        throttle.forget(a).unwrap();
        assert_eq!(throttle.tracked(), 1);
        assert!(throttle.admit(a, now + Duration::milliseconds(900)).unwrap());
    }
}
