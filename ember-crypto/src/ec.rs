//! Elliptic-curve operations over the process-wide secp256k1 context.
//!
//! The underlying multiplication tables are baked into the binary
//! (`libsecp256k1`'s static context), immutable, and safe for concurrent
//! readers; nothing here holds interior mutability.

use crate::{Error, Secret, Signature, SECP256K1N, SECP256K1N_HALF};
use ember_primitives::{Public, PublicCompressed, H256, U256};

/// Derives the uncompressed public key for a secret.
///
/// The returned bytes are the affine `X || Y` coordinates with the leading
/// `0x04` tag stripped.
///
/// # Errors
/// Returns [`Error::InvalidSecret`] if the secret is outside `(0, n)`.
pub fn public_from_secret(secret: &Secret) -> Result<Public, Error> {
    let pubkey = libsecp256k1::PublicKey::from_secret_key(&secret.to_secp()?);
    let serialized = pubkey.serialize();
    Ok(Public::from_slice(&serialized[1..]))
}

/// Derives the 33-byte compressed public key for a secret; the first byte is
/// `0x02` when `Y` is even, `0x03` otherwise.
///
/// # Errors
/// Returns [`Error::InvalidSecret`] if the secret is outside `(0, n)`.
pub fn public_compressed_from_secret(secret: &Secret) -> Result<PublicCompressed, Error> {
    let pubkey = libsecp256k1::PublicKey::from_secret_key(&secret.to_secp()?);
    Ok(PublicCompressed::from(pubkey.serialize_compressed()))
}

/// Decompresses a 33-byte public key.
///
/// # Errors
/// Returns [`Error::InvalidPublic`] if the bytes do not parse as a curve
/// point.
pub fn public_from_compressed(public: &PublicCompressed) -> Result<Public, Error> {
    let pubkey = libsecp256k1::PublicKey::parse_compressed(public.as_fixed_bytes())?;
    let serialized = pubkey.serialize();
    Ok(Public::from_slice(&serialized[1..]))
}

/// Signs a 32-byte message hash, producing a recoverable signature in the
/// canonical low-s form.
///
/// Nonces are deterministic per RFC 6979. If the underlying primitive
/// returns `s > n/2`, the signature is rewritten as `(r, n - s, v ^ 1)`, so
/// the post-condition `s ≤ n/2`, `v ∈ {0, 1}` always holds.
///
/// # Errors
/// Returns [`Error::InvalidSecret`] if the secret is outside `(0, n)`.
pub fn sign(secret: &Secret, message: &H256) -> Result<Signature, Error> {
    let msg = libsecp256k1::Message::parse(message.as_fixed_bytes());
    let (sig, recovery_id) = libsecp256k1::sign(&msg, &secret.to_secp()?);

    let data = sig.serialize();
    let r = H256::from_slice(&data[0..32]);
    let s = H256::from_slice(&data[32..64]);
    let signature = Signature::from_rsv(&r, &s, recovery_id.serialize());
    if signature.is_low_s() {
        Ok(signature)
    } else {
        let low_s = H256::from(SECP256K1N - U256::from(s));
        Ok(Signature::from_rsv(&r, &low_s, signature.v() ^ 1))
    }
}

/// Recovers the public key that produced `signature` over `message`.
///
/// # Errors
/// Returns [`Error::InvalidSignature`] if `v > 3`, the compact bytes are
/// malformed, or the signature is mathematically unrecoverable.
pub fn recover(signature: &Signature, message: &H256) -> Result<Public, Error> {
    let recovery_id = libsecp256k1::RecoveryId::parse(signature.v())?;
    let sig = libsecp256k1::Signature::parse_overflowing_slice(&signature.as_bytes()[0..64])?;
    let msg = libsecp256k1::Message::parse(message.as_fixed_bytes());
    let pubkey = libsecp256k1::recover(&msg, &sig, &recovery_id)?;
    let serialized = pubkey.serialize();
    Ok(Public::from_slice(&serialized[1..]))
}

/// Checks a recoverable signature by recovering the signer and comparing.
///
/// A zero (sentinel) `public` never verifies, since recovery cannot yield
/// the zero key.
///
/// # Errors
/// Returns [`Error::InvalidSignature`] if the signature bytes are malformed.
pub fn verify(public: &Public, signature: &Signature, message: &H256) -> Result<bool, Error> {
    Ok(recover(signature, message)? == *public)
}

/// Standard (non-recoverable) ECDSA verification of a 64-byte `r || s`
/// signature under a compressed public key.
///
/// # Errors
/// Returns [`Error::InvalidPublic`] if the key does not parse and
/// [`Error::InvalidSignature`] if the signature bytes are out of range.
pub fn verify_compressed(
    public: &PublicCompressed,
    signature: &[u8; 64],
    message: &H256,
) -> Result<bool, Error> {
    let pubkey = libsecp256k1::PublicKey::parse_compressed(public.as_fixed_bytes())?;
    let sig = libsecp256k1::Signature::parse_standard(signature)?;
    let msg = libsecp256k1::Message::parse(message.as_fixed_bytes());
    Ok(libsecp256k1::verify(&msg, &sig, &pubkey))
}

/// Whether a scalar lies in the canonical low-s half of the range.
#[must_use]
pub fn is_low_s(s: &U256) -> bool {
    *s <= SECP256K1N_HALF
}
