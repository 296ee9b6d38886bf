//! Ethereum address derivation: externally-owned accounts, CREATE contract
//! addresses and the EIP-55 checksummed text form.

use crate::{ec, Error, Secret};
use ember_primitives::{Address, Public, H256, U256};
use rlp::RlpStream;
use sha3::{Digest, Keccak256};

fn keccak256(data: impl AsRef<[u8]>) -> H256 {
    let hash: [u8; 32] = Keccak256::digest(data).into();
    H256::from(hash)
}

/// The address of a public key: the rightmost 20 bytes of
/// `keccak256(X || Y)`.
#[must_use]
pub fn from_public(public: &Public) -> Address {
    let hash = keccak256(public.as_bytes());
    Address::from_slice(&hash[12..])
}

/// The address of the public key derived from `secret`.
///
/// # Errors
/// Returns [`Error::InvalidSecret`] if the secret is outside `(0, n)`.
pub fn from_secret(secret: &Secret) -> Result<Address, Error> {
    Ok(from_public(&ec::public_from_secret(secret)?))
}

/// The CREATE contract address: the rightmost 20 bytes of
/// `keccak256(rlp([sender, nonce]))`.
///
/// The nonce is RLP-encoded as a minimal big-endian integer; zero becomes
/// the empty byte string.
#[must_use]
pub fn for_contract(sender: &Address, nonce: &U256) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(sender);
    stream.append(nonce);
    let hash = keccak256(stream.out());
    Address::from_slice(&hash[12..])
}

/// Formats an address in the EIP-55 mixed-case checksum form.
#[must_use]
pub fn to_checksum_string(address: &Address) -> String {
    let encoded = hex::encode(address.as_bytes());
    let hashed = hex::encode(Keccak256::digest(encoded.as_bytes()));
    let mut result = String::with_capacity(42);
    result.push_str("0x");
    for (nibble_index, mut character) in encoded.chars().enumerate() {
        if character.is_alphabetic()
            && hashed.as_bytes()[nibble_index] as char > '7'
        {
            character = character.to_ascii_uppercase();
        }
        result.push(character);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyPair;
    use hex_literal::hex;

    #[test]
    fn address_matches_keccak_of_public() {
        let keypair = KeyPair::generate();
        let hash = keccak256(keypair.public().as_bytes());
        assert_eq!(keypair.address(), Address::from_slice(&hash[12..]));
        assert_eq!(from_secret(keypair.secret()).unwrap(), keypair.address());
    }

    #[test]
    fn contract_address_for_known_sender() {
        let sender = Address::from(hex!("6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0"));
        assert_eq!(
            for_contract(&sender, &U256::zero()),
            hex!("cd234a471b72ba2f1ccf0a70fcaba648a5eecd8d").into()
        );
        assert_eq!(
            for_contract(&sender, &U256::one()),
            hex!("343c43a37d37dff08ae8c4a11544c718abb4fcf8").into()
        );
    }

    #[test]
    fn checksum_test_vectors() {
        let vectors = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];
        for vector in vectors {
            let address = Address::from_slice(&hex::decode(&vector[2..]).unwrap());
            assert_eq!(to_checksum_string(&address), vector);
        }
    }
}
