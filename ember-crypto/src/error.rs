use thiserror::Error;

/// Errors raised by key handling and elliptic-curve operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The secret scalar is zero or not below the group order.
    #[error("invalid secret key")]
    InvalidSecret,

    /// The public key bytes do not encode a point on the curve.
    #[error("invalid public key")]
    InvalidPublic,

    /// The signature is malformed or cannot be recovered from.
    #[error("invalid signature")]
    InvalidSignature,

    /// The message is not a valid 32-byte digest.
    #[error("invalid message")]
    InvalidMessage,
}

impl From<libsecp256k1::Error> for Error {
    fn from(err: libsecp256k1::Error) -> Self {
        match err {
            libsecp256k1::Error::InvalidSecretKey => Self::InvalidSecret,
            libsecp256k1::Error::InvalidPublicKey | libsecp256k1::Error::InvalidAffine => {
                Self::InvalidPublic
            },
            libsecp256k1::Error::InvalidMessage => Self::InvalidMessage,
            _ => Self::InvalidSignature,
        }
    }
}
