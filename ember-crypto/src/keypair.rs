use crate::{address, ec, Error, Secret};
use core::{fmt, str::FromStr};
use ember_primitives::{Address, Public};

/// A secp256k1 key pair: the secret scalar together with its derived public
/// key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret: Secret,
    public: Public,
}

impl KeyPair {
    /// Builds a key pair from a secret, deriving the public key.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSecret`] if the secret is outside `(0, n)`.
    pub fn from_secret(secret: Secret) -> Result<Self, Error> {
        let public = ec::public_from_secret(&secret)?;
        Ok(Self { secret, public })
    }

    /// Generates a new random key pair from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        // Secret::random only yields scalars in (0, n), so the first
        // iteration succeeds.
        loop {
            if let Ok(keypair) = Self::from_secret(Secret::random()) {
                return keypair;
            }
        }
    }

    /// The secret key.
    #[must_use]
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// The public key: uncompressed `X || Y` without the `0x04` tag.
    #[must_use]
    pub fn public(&self) -> &Public {
        &self.public
    }

    /// The address of the public key.
    #[must_use]
    pub fn address(&self) -> Address {
        address::from_public(&self.public)
    }
}

impl FromStr for KeyPair {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Self::from_secret(src.parse()?)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
