//! Test doubles shared by unit tests across the crate.
//!
//! Only compiled for `cfg(test)`.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::SessionClaims;
use crate::domain::ports::{TokenCodec, TokenCodecError};

/// Clock whose current instant only moves when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Unsigned codec that renders claims as JSON.
///
/// Lets domain tests inspect token contents without a signing secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTokenCodec;

impl TokenCodec for JsonTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> Result<String, TokenCodecError> {
        serde_json::to_string(claims).map_err(|err| TokenCodecError::signing(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, TokenCodecError> {
        serde_json::from_str(token).map_err(|err| TokenCodecError::invalid(err.to_string()))
    }
}
