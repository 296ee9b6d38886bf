use crate::Error;
use core::{fmt, str::FromStr};
use ember_primitives::H256;
use zeroize::Zeroize;

/// A secp256k1 scalar private key. Invariant: `0 < secret < n`.
///
/// The backing bytes are wiped when the value is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(H256);

impl Secret {
    /// Generates a fresh secret from the operating system RNG.
    ///
    /// Samples outside `(0, n)` are rejected and redrawn; rejection happens
    /// with probability ~2^-128.
    #[must_use]
    pub fn random() -> Self {
        loop {
            let candidate = H256::random();
            if libsecp256k1::SecretKey::parse(candidate.as_fixed_bytes()).is_ok() {
                return Self(candidate);
            }
        }
    }

    /// Imports a secret from raw bytes, enforcing length and range.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSecret`] unless `bytes` is exactly 32 bytes
    /// encoding a scalar in `(0, n)`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 32 {
            return Err(Error::InvalidSecret);
        }
        let hash = H256::from_slice(bytes);
        libsecp256k1::SecretKey::parse(hash.as_fixed_bytes())?;
        Ok(Self(hash))
    }

    /// The raw scalar bytes, big-endian.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub(crate) fn to_secp(&self) -> Result<libsecp256k1::SecretKey, Error> {
        Ok(libsecp256k1::SecretKey::parse(self.0.as_fixed_bytes())?)
    }
}

impl FromStr for Secret {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let hash = H256::from_str(src).map_err(|_| Error::InvalidSecret)?;
        Self::from_slice(hash.as_bytes())
    }
}

// The scalar must never leak through debug output.
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret").finish_non_exhaustive()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.as_bytes_mut().zeroize();
    }
}
