use crate::hash::H256;

pub use primitive_types::U256;

impl From<H256> for U256 {
    fn from(value: H256) -> Self {
        Self::from_big_endian(value.as_bytes())
    }
}

impl<'a> From<&'a H256> for U256 {
    fn from(value: &'a H256) -> Self {
        Self::from_big_endian(value.as_bytes())
    }
}

impl From<U256> for H256 {
    fn from(value: U256) -> Self {
        let mut out = Self::zero();
        value.to_big_endian(out.as_bytes_mut());
        out
    }
}
