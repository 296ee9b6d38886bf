use crate::{SECP256K1N, SECP256K1N_HALF};
use core::fmt;
use ember_primitives::{H256, H520, U256};

/// A recoverable ECDSA signature.
///
/// The flat 65-byte form `r || s || v` is canonical; the `r`, `s` and `v`
/// accessors are views into it. After signing, `v` is the recovery id in
/// `{0, 1}` (chain-id folding per EIP-155 is a higher-layer concern).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature(pub H520);

impl Signature {
    /// Assembles a signature from its `r`, `s` and `v` components.
    #[must_use]
    pub fn from_rsv(r: &H256, s: &H256, v: u8) -> Self {
        let mut out = H520::zero();
        out.0[0..32].copy_from_slice(r.as_bytes());
        out.0[32..64].copy_from_slice(s.as_bytes());
        out.0[64] = v;
        Self(out)
    }

    /// The `r` component, big-endian.
    #[must_use]
    pub fn r(&self) -> &[u8] {
        &self.0[0..32]
    }

    /// The `s` component, big-endian.
    #[must_use]
    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    /// The recovery id.
    #[must_use]
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Whether `s` lies in the canonical low-s half of the range.
    #[must_use]
    pub fn is_low_s(&self) -> bool {
        U256::from_big_endian(self.s()) <= SECP256K1N_HALF
    }

    /// Whether all components are in range: `v ≤ 1` and `0 < r, s < n`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let r = U256::from_big_endian(self.r());
        let s = U256::from_big_endian(self.s());
        self.v() <= 1 && !r.is_zero() && r < SECP256K1N && !s.is_zero() && s < SECP256K1N
    }

    /// The flat 65-byte wire form.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<H520> for Signature {
    fn from(bytes: H520) -> Self {
        Self(bytes)
    }
}

impl From<Signature> for H520 {
    fn from(signature: Signature) -> Self {
        signature.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("r", &H256::from_slice(self.r()))
            .field("s", &H256::from_slice(self.s()))
            .field("v", &self.v())
            .finish()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn components_view_the_flat_form() {
        let r = H256::from(hex!(
            "74ce2198225fb75ba25ff998f912ebc7ba8351056b3398a73eb2680cd8a0729a"
        ));
        let s = H256::from(hex!(
            "426cff41ea4656f1517ebf685bc2841e9156eb5e9119833f822aef5d9ca36491"
        ));
        let signature = Signature::from_rsv(&r, &s, 1);
        assert_eq!(signature.r(), r.as_bytes());
        assert_eq!(signature.s(), s.as_bytes());
        assert_eq!(signature.v(), 1);
        assert!(signature.is_valid());
        assert!(signature.is_low_s());
    }

    #[test]
    fn zero_components_are_invalid() {
        assert!(!Signature::default().is_valid());
    }

    #[test]
    fn out_of_range_components_are_invalid() {
        let order = H256::from(hex!(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        ));
        let one = H256::from_low_u64_be(1);
        assert!(!Signature::from_rsv(&order, &one, 0).is_valid());
        assert!(!Signature::from_rsv(&one, &order, 0).is_valid());
        assert!(!Signature::from_rsv(&one, &one, 2).is_valid());
        assert!(Signature::from_rsv(&one, &one, 1).is_valid());
    }

    #[test]
    fn high_s_is_flagged() {
        // n/2 + 1 is the smallest non-canonical s
        let high = H256::from(hex!(
            "7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a1"
        ));
        let one = H256::from_low_u64_be(1);
        assert!(!Signature::from_rsv(&one, &high, 0).is_low_s());
        assert!(Signature::from_rsv(&one, &one, 0).is_low_s());
    }
}
