use thiserror::Error;

/// Errors raised by the key file codec and the secret store.
#[derive(Debug, Error)]
pub enum Error {
    /// The key file uses a kdf (or prf) this store does not implement.
    #[error("unsupported kdf")]
    UnsupportedKdf,

    /// The key file uses a cipher this store does not implement.
    #[error("unsupported cipher")]
    UnsupportedCipher,

    /// The derived MAC does not match the stored one. A wrong passphrase
    /// and a corrupted file are indistinguishable by design.
    #[error("mac mismatch (wrong passphrase or corrupted key file)")]
    MacMismatch,

    /// The ciphertext decrypted to an invalid PKCS#7 padding.
    #[error("invalid ciphertext padding")]
    InvalidPadding,

    /// The key file declares a version other than 2 or 3.
    #[error("unsupported key file version {0}")]
    UnsupportedVersion(u64),

    /// A key id is not a well-formed UUID.
    #[error("malformed uuid: {0}")]
    MalformedUuid(#[from] uuid::Error),

    /// A key file is not well-formed JSON for the Secret Storage schema.
    #[error("malformed key file: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// The requested key id is not present in the store.
    #[error("key not found in store")]
    KeyNotFound,

    /// The decrypted plaintext is not a usable secret.
    #[error(transparent)]
    Crypto(#[from] ember_crypto::Error),

    /// Reading or writing the backing directory failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// No platform configuration directory to place the default keys
    /// directory under.
    #[error("no platform config directory")]
    NoConfigDir,
}
