// ignore clippy warnings in `construct_fixed_hash!` macro.
#![allow(clippy::pedantic, clippy::assign_op_pattern, clippy::non_canonical_clone_impl)]

use fixed_hash::*;
use impl_rlp::impl_fixed_hash_rlp;
use impl_serde::impl_fixed_hash_serde;

// Aliases for the key material each width carries.
pub type Address = H160;
pub type Public = H512;
pub type PublicCompressed = H264;

macro_rules! impl_hash {
    ($hash:ident, $n_bytes:expr) => {
        construct_fixed_hash! { pub struct $hash($n_bytes); }

        impl_fixed_hash_rlp!($hash, $n_bytes);
        impl_fixed_hash_serde!($hash, $n_bytes);

        impl $hash {
            /// Builds a hash from a shorter byte string by zero-padding on
            /// the left. Inputs longer than the hash keep their rightmost
            /// bytes.
            #[must_use]
            pub fn right_align(bytes: &[u8]) -> Self {
                let mut out = Self::zero();
                let len = core::cmp::min(bytes.len(), $n_bytes);
                out.0[$n_bytes - len..].copy_from_slice(&bytes[bytes.len() - len..]);
                out
            }
        }
    };
}

impl_hash!(H128, 16);
impl_hash!(H160, 20);
impl_hash!(H256, 32);
impl_hash!(H264, 33);
impl_hash!(H512, 64);
impl_hash!(H520, 65);
