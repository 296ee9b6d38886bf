//! Encrypts and decrypts a single secret under a passphrase, producing the
//! `crypto` object of a Secret Storage key file.
//!
//! This is the PBKDF2 + AES-128-CBC variant with the pre-standard MAC: the
//! MAC input is the *last 16 bytes of the derived key* followed by the
//! ciphertext. Files written with the later "second half of a 32-byte
//! derived key" convention do not verify here, and vice versa.

use crate::{CipherParams, Crypto, Error, KdfParams};
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use ember_primitives::{H128, H256};
use sha3::{Digest, Keccak256};
use zeroize::{Zeroize, Zeroizing};

/// Cipher name this codec writes and accepts.
pub const CIPHER_AES_128_CBC: &str = "aes-128-cbc";
/// Kdf name this codec writes and accepts.
pub const KDF_PBKDF2: &str = "pbkdf2";
/// Prf name this codec writes and accepts.
pub const PRF_HMAC_SHA256: &str = "hmac-sha256";

const KDF_ITERATIONS: u32 = 262_144;
const DERIVED_KEY_LEN: u32 = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Encrypts `plain` under `passphrase` with a random salt and iv.
#[must_use]
pub fn encrypt(plain: &[u8], passphrase: &str) -> Crypto {
    encrypt_with(H256::random(), H128::random(), plain, passphrase)
}

/// Encrypts `plain` under `passphrase` with caller-chosen salt and iv.
///
/// Deterministic: the same inputs produce a byte-identical `crypto` object.
#[must_use]
pub fn encrypt_with(salt: H256, iv: H128, plain: &[u8], passphrase: &str) -> Crypto {
    let derived = derive_key(passphrase, salt.as_bytes(), KDF_ITERATIONS, DERIVED_KEY_LEN);
    let aes_key = aes_key_from_derived(&derived);

    let ciphertext = Aes128CbcEnc::new((&*aes_key).into(), iv.as_fixed_bytes().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plain);
    let mac = mac(&derived, &ciphertext);

    Crypto {
        cipher: CIPHER_AES_128_CBC.to_string(),
        ciphertext,
        cipherparams: CipherParams { iv },
        kdf: KDF_PBKDF2.to_string(),
        kdfparams: KdfParams::Pbkdf2 {
            prf: PRF_HMAC_SHA256.to_string(),
            c: KDF_ITERATIONS,
            salt: salt.as_bytes().to_vec(),
            dklen: DERIVED_KEY_LEN,
        },
        mac,
    }
}

/// Decrypts a `crypto` object with `passphrase`.
///
/// # Errors
/// - [`Error::UnsupportedKdf`] unless the kdf is pbkdf2 over hmac-sha256.
/// - [`Error::MacMismatch`] when the recomputed MAC differs from the stored
///   one; a wrong passphrase and a corrupted file are indistinguishable.
/// - [`Error::UnsupportedCipher`] unless the cipher is aes-128-cbc.
pub fn decrypt(crypto: &Crypto, passphrase: &str) -> Result<Zeroizing<Vec<u8>>, Error> {
    let (c, salt, dklen) = match &crypto.kdfparams {
        KdfParams::Pbkdf2 { prf, c, salt, dklen }
            if crypto.kdf == KDF_PBKDF2 && prf == PRF_HMAC_SHA256 =>
        {
            (*c, salt.as_slice(), *dklen)
        },
        _ => return Err(Error::UnsupportedKdf),
    };

    let derived = derive_key(passphrase, salt, c, dklen);
    if mac(&derived, &crypto.ciphertext) != crypto.mac {
        return Err(Error::MacMismatch);
    }
    if crypto.cipher != CIPHER_AES_128_CBC {
        return Err(Error::UnsupportedCipher);
    }

    let aes_key = aes_key_from_derived(&derived);
    let plain = Aes128CbcDec::new((&*aes_key).into(), crypto.cipherparams.iv.as_fixed_bytes().into())
        .decrypt_padded_vec_mut::<Pkcs7>(&crypto.ciphertext)
        .map_err(|_| Error::InvalidPadding)?;
    Ok(Zeroizing::new(plain))
}

fn derive_key(passphrase: &str, salt: &[u8], iterations: u32, dklen: u32) -> Zeroizing<Vec<u8>> {
    let mut derived = Zeroizing::new(vec![0u8; dklen as usize]);
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(passphrase.as_bytes(), salt, iterations, &mut derived);
    derived
}

/// The AES key is the right-aligned 16 bytes of the keccak of the
/// right-aligned 16 bytes of the derived key.
fn aes_key_from_derived(derived: &[u8]) -> Zeroizing<[u8; 16]> {
    let mut block = H128::right_align(derived);
    let mut hash: [u8; 32] = Keccak256::digest(block.as_bytes()).into();
    let key = Zeroizing::new(*H128::right_align(&hash).as_fixed_bytes());
    block.as_bytes_mut().zeroize();
    hash.zeroize();
    key
}

/// `keccak256(last 16 bytes of the derived key ‖ ciphertext)`.
fn mac(derived: &[u8], ciphertext: &[u8]) -> H256 {
    let tail = &derived[derived.len().saturating_sub(16)..];
    let mut hasher = Keccak256::new();
    hasher.update(tail);
    hasher.update(ciphertext);
    let hash: [u8; 32] = hasher.finalize().into();
    H256::from(hash)
}
