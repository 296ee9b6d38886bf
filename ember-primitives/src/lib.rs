//! Byte-oriented primitive types shared across the ember crates: fixed-width
//! hashes with hex I/O and secure random generation, and 256-bit unsigned
//! integers.

mod hash;
mod uint;

pub use hash::{Address, Public, PublicCompressed, H128, H160, H256, H264, H512, H520};
pub use uint::U256;
