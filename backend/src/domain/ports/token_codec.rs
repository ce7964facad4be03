//! Port for signing and verifying session tokens.
//!
//! The codec only checks signatures and structure. Expiry, token kind and
//! revocation are checked by the session service against its own clock.

use crate::domain::SessionClaims;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token codecs.
    pub enum TokenCodecError {
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } => "session token rejected: {message}",
        /// Signing failed.
        Signing { message: String } => "session token signing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &SessionClaims) -> Result<String, TokenCodecError>;

    fn decode(&self, token: &str) -> Result<SessionClaims, TokenCodecError>;
}
