//! Account registration, login and session token lifecycle.
//!
//! Tokens come in access/refresh pairs sharing a session id (`sid`) equal to
//! the refresh token's `jti`. Refreshing or logging out adds that id to the
//! blacklist, which retires the refresh token and every access token minted
//! alongside it.
//!
//! Password hashing runs on the blocking thread pool. Logins for unknown
//! usernames verify against a dummy hash so they cost the same as a wrong
//! password.

use std::fmt;
use std::sync::{Arc, OnceLock};

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    CredentialHasher, CredentialHasherError, NewUser, TokenBlacklist, TokenBlacklistError,
    TokenCodec, TokenCodecError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, PasswordHash, Registration, SessionClaims, TokenKind, TokenPair,
    TokenPolicy, User, UserId,
};

const DUMMY_PASSWORD: &str = "faultline-unknown-user";

/// Collaborators required by [`SessionService`].
#[derive(Clone)]
pub struct SessionServiceDeps {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub codec: Arc<dyn TokenCodec>,
    pub blacklist: Arc<dyn TokenBlacklist>,
    pub clock: Arc<dyn Clock>,
}

/// Issues, rotates, revokes and verifies session tokens.
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    codec: Arc<dyn TokenCodec>,
    blacklist: Arc<dyn TokenBlacklist>,
    clock: Arc<dyn Clock>,
    policy: TokenPolicy,
    dummy_hash: Arc<OnceLock<PasswordHash>>,
}

#[derive(Debug)]
enum Rejection {
    Undecodable,
    WrongKind,
    Expired,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undecodable => write!(f, "token is invalid"),
            Self::WrongKind => write!(f, "token has wrong type"),
            Self::Expired => write!(f, "token is expired"),
        }
    }
}

impl SessionService {
    pub fn new(deps: SessionServiceDeps, policy: TokenPolicy) -> Self {
        let SessionServiceDeps {
            users,
            hasher,
            codec,
            blacklist,
            clock,
        } = deps;
        Self {
            users,
            hasher,
            codec,
            blacklist,
            clock,
            policy,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Create an account and its default profile.
    pub async fn register(&self, registration: &Registration) -> Result<User, Error> {
        let password = registration.password().to_owned();
        let password_hash = self
            .run_hasher(move |hasher| hasher.hash(&password))
            .await?;
        let new_user = NewUser {
            id: UserId::random(),
            username: registration.username().clone(),
            password_hash,
        };
        let user = self.users.create(&new_user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), "registered user");
        Ok(user)
    }

    /// Exchange valid credentials for a fresh token pair.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<TokenPair, Error> {
        let stored = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_user_error)?;
        let password = credentials.password().to_owned();
        let Some(stored) = stored else {
            let dummy_hash = Arc::clone(&self.dummy_hash);
            self.run_hasher(move |hasher| verify_dummy(hasher, &dummy_hash, &password))
                .await?;
            return Err(invalid_credentials());
        };
        let password_hash = stored.password_hash.clone();
        let verified = self
            .run_hasher(move |hasher| hasher.verify(&password, &password_hash))
            .await?;
        if !verified {
            return Err(invalid_credentials());
        }
        let pair = self.issue_pair(*stored.user.id())?;
        info!(user_id = %stored.user.id(), "user logged in");
        Ok(pair)
    }

    /// Rotate a refresh token.
    ///
    /// The presented token is blacklisted before the new pair is signed.
    /// Only the caller whose insert wins gets a pair, so concurrent reuse of
    /// one refresh token yields exactly one success.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, Error> {
        let claims = self
            .decode_checked(refresh_token, TokenKind::Refresh)
            .map_err(|rejection| Error::unauthorized(rejection.to_string()))?;
        let newly_revoked = self
            .blacklist
            .revoke(claims.jti, claims.expires_at())
            .await
            .map_err(map_blacklist_error)?;
        if !newly_revoked {
            warn!(user_id = %claims.sub, "refresh token reuse rejected");
            return Err(Error::unauthorized("token is blacklisted"));
        }
        self.issue_pair(claims.sub)
    }

    /// Revoke the caller's refresh token.
    ///
    /// Revoking an already revoked token succeeds. Tokens that fail to
    /// decode, are not refresh tokens, or belong to another user are
    /// rejected as invalid requests.
    pub async fn logout(&self, user: &UserId, refresh_token: &str) -> Result<(), Error> {
        let claims = self
            .decode_checked(refresh_token, TokenKind::Refresh)
            .map_err(|rejection| Error::invalid_request(rejection.to_string()))?;
        if &claims.sub != user {
            warn!(user_id = %user, "logout attempted with another user's token");
            return Err(Error::invalid_request(
                "token does not belong to the current user",
            ));
        }
        self.blacklist
            .revoke(claims.jti, claims.expires_at())
            .await
            .map_err(map_blacklist_error)?;
        info!(user_id = %user, "user logged out");
        Ok(())
    }

    /// Resolve the user behind a bearer access token.
    pub async fn authenticate(&self, access_token: &str) -> Result<UserId, Error> {
        let claims = self
            .decode_checked(access_token, TokenKind::Access)
            .map_err(|rejection| Error::unauthorized(rejection.to_string()))?;
        let revoked = self
            .blacklist
            .is_revoked(claims.sid)
            .await
            .map_err(map_blacklist_error)?;
        if revoked {
            return Err(Error::unauthorized("session has been revoked"));
        }
        Ok(claims.sub)
    }

    async fn run_hasher<T, F>(&self, operation: F) -> Result<T, Error>
    where
        F: FnOnce(&dyn CredentialHasher) -> Result<T, CredentialHasherError> + Send + 'static,
        T: Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || operation(&*hasher))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(map_hasher_error)
    }

    fn issue_pair(&self, user: UserId) -> Result<TokenPair, Error> {
        let (access, refresh) = self.policy.claims_for(user, self.clock.utc());
        Ok(TokenPair {
            access: self.codec.encode(&access).map_err(map_codec_error)?,
            refresh: self.codec.encode(&refresh).map_err(map_codec_error)?,
        })
    }

    fn decode_checked(&self, token: &str, expected: TokenKind) -> Result<SessionClaims, Rejection> {
        let claims = self
            .codec
            .decode(token)
            .map_err(|_| Rejection::Undecodable)?;
        if claims.typ != expected {
            return Err(Rejection::WrongKind);
        }
        if claims.is_expired_at(self.clock.utc()) {
            return Err(Rejection::Expired);
        }
        Ok(claims)
    }
}

/// Spend one verification on a hash no password matches.
fn verify_dummy(
    hasher: &dyn CredentialHasher,
    dummy_hash: &OnceLock<PasswordHash>,
    password: &str,
) -> Result<bool, CredentialHasherError> {
    let dummy = match dummy_hash.get() {
        Some(hash) => hash,
        None => {
            let hash = hasher.hash(DUMMY_PASSWORD)?;
            dummy_hash.get_or_init(|| hash)
        }
    };
    hasher.verify(password, dummy)
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateUsername { .. } => {
            Error::conflict("a user with that username already exists")
        }
    }
}

fn map_blacklist_error(error: TokenBlacklistError) -> Error {
    match error {
        TokenBlacklistError::Connection { message } => Error::service_unavailable(message),
        TokenBlacklistError::Query { message } => Error::internal(message),
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(error.to_string())
}

fn map_codec_error(error: TokenCodecError) -> Error {
    Error::internal(error.to_string())
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
