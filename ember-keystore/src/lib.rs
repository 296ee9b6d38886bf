//! Password-encrypted on-disk key store implementing the Web3 Secret
//! Storage Definition (PBKDF2 + AES-128-CBC variant), with an in-memory
//! cache of decrypted secrets.
//!
//! [`codec`] encrypts and decrypts a single secret under a passphrase;
//! [`SecretStore`] manages a directory of `<uuid>.json` key files and
//! delegates the per-entry crypto to the codec.
#![deny(missing_docs)]

pub mod codec;
mod error;
mod json;
mod serde_utils;
mod store;

pub use error::Error;
pub use json::{CipherParams, Crypto, KdfParams, KeyFile};
pub use store::{default_keys_dir, SecretStore};
pub use uuid::Uuid;

/// Parses a key id from its canonical lowercase `8-4-4-4-12` text form.
///
/// # Errors
/// Returns [`Error::MalformedUuid`] for anything that is not a well-formed
/// UUID.
pub fn parse_id(text: &str) -> Result<Uuid, Error> {
    Ok(Uuid::parse_str(text)?)
}
