//! Serde helpers for the unprefixed hex fields of key files. An optional
//! `0x` prefix is tolerated on input.

/// `Vec<u8>` as unprefixed hex.
pub mod bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let value = String::deserialize(deserializer)?;
        hex::decode(value.trim_start_matches("0x")).map_err(de::Error::custom)
    }
}

/// `H128` as unprefixed hex (32 hex chars).
pub mod h128 {
    use ember_primitives::H128;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &H128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value.as_bytes()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<H128, D::Error> {
        let value = String::deserialize(deserializer)?;
        let bytes = hex::decode(value.trim_start_matches("0x")).map_err(de::Error::custom)?;
        if bytes.len() != 16 {
            return Err(de::Error::invalid_length(bytes.len(), &"16 bytes"));
        }
        Ok(H128::from_slice(&bytes))
    }
}

/// `H256` as unprefixed hex (64 hex chars).
pub mod h256 {
    use ember_primitives::H256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &H256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value.as_bytes()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<H256, D::Error> {
        let value = String::deserialize(deserializer)?;
        let bytes = hex::decode(value.trim_start_matches("0x")).map_err(de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(de::Error::invalid_length(bytes.len(), &"32 bytes"));
        }
        Ok(H256::from_slice(&bytes))
    }
}
