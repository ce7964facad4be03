//! Cryptographic adapters: password hashing and session token signing.

mod argon2_hasher;
mod jwt_token_codec;

pub use argon2_hasher::Argon2CredentialHasher;
pub use jwt_token_codec::JwtTokenCodec;
