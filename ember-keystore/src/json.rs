use crate::serde_utils;
use ember_primitives::{H128, H256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An on-disk key file: `{"crypto": …, "id": …, "version": 3}`.
///
/// The writer always emits lowercase `version: 3`; the reader also accepts
/// the legacy value `2` and the capitalized `Version` spelling found in
/// files written by early clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFile {
    /// The encrypted payload.
    pub crypto: Crypto,
    /// The key id; also the file stem.
    pub id: Uuid,
    /// Secret Storage Definition version.
    #[serde(alias = "Version")]
    pub version: u64,
}

/// The `crypto` object of a key file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crypto {
    /// Symmetric cipher name; this store writes `aes-128-cbc`.
    pub cipher: String,
    /// The encrypted secret.
    #[serde(with = "serde_utils::bytes")]
    pub ciphertext: Vec<u8>,
    /// Cipher parameters.
    pub cipherparams: CipherParams,
    /// Key derivation function name; this store writes `pbkdf2`.
    pub kdf: String,
    /// Key derivation parameters.
    pub kdfparams: KdfParams,
    /// `keccak256(derived-key tail ‖ ciphertext)`.
    #[serde(with = "serde_utils::h256")]
    pub mac: H256,
}

/// Parameters of the symmetric cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherParams {
    /// CBC initialization vector.
    #[serde(with = "serde_utils::h128")]
    pub iv: H128,
}

/// Parameters of the key derivation function. Scrypt parameters parse so
/// that foreign key files surface as [`Error::UnsupportedKdf`] rather than
/// a JSON error, but this store never derives from them.
///
/// [`Error::UnsupportedKdf`]: crate::Error::UnsupportedKdf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KdfParams {
    /// PBKDF2 parameters.
    Pbkdf2 {
        /// Pseudo-random function; this store requires `hmac-sha256`.
        prf: String,
        /// Iteration count.
        c: u32,
        /// Salt fed to the prf.
        #[serde(with = "serde_utils::bytes")]
        salt: Vec<u8>,
        /// Derived key length in bytes.
        dklen: u32,
    },
    /// Scrypt parameters (recognized, never derived from).
    Scrypt {
        /// CPU/memory cost.
        n: u64,
        /// Block size.
        r: u32,
        /// Parallelization.
        p: u32,
        /// Salt.
        #[serde(with = "serde_utils::bytes")]
        salt: Vec<u8>,
        /// Derived key length in bytes.
        dklen: u32,
    },
}
