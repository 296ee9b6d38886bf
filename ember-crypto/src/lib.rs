//! secp256k1 identity primitives for the ember node: key pairs, recoverable
//! ECDSA signatures in the canonical low-s form, and address derivation.
#![deny(missing_docs)]

pub mod address;
pub mod ec;
mod error;
mod keypair;
mod secret;
mod signature;

pub use ember_primitives::{Address, Public, PublicCompressed, H256, H520, U256};
pub use error::Error;
pub use keypair::KeyPair;
pub use secret::Secret;
pub use signature::Signature;

/// The secp256k1 group order `n`.
pub const SECP256K1N: U256 = U256([
    0xbfd2_5e8c_d036_4141,
    0xbaae_dce6_af48_a03b,
    0xffff_ffff_ffff_fffe,
    0xffff_ffff_ffff_ffff,
]);

/// `n / 2`, the upper bound of the canonical low-s range.
pub const SECP256K1N_HALF: U256 = U256([
    0xdfe9_2f46_681b_20a0,
    0x5d57_6e73_57a4_501d,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
]);
