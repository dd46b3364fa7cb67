//! Digest, encoding and AES-CFB helpers.

use crate::error::{ComponentsError, Result};
use aes::{Aes128, Aes192, Aes256};
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Digest;

pub const AES_BLOCK_SIZE: usize = 16;

pub fn md5_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(md5::Md5::digest(data.as_ref()))
}

pub fn sha1_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(sha1::Sha1::digest(data.as_ref()))
}

pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(sha2::Sha256::digest(data.as_ref()))
}

pub fn sha512_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(sha2::Sha512::digest(data.as_ref()))
}

pub fn base64_encode(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(data)
}

pub fn base64_decode(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|err| ComponentsError::Crypto(format!("base64 decode: {err}")))
}

pub fn base64_decode_string(encoded: &str) -> Result<String> {
    String::from_utf8(base64_decode(encoded)?)
        .map_err(|err| ComponentsError::Crypto(format!("base64 decode: {err}")))
}

/// URL-safe alphabet, padded.
pub fn base64_url_encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE.encode(data)
}

pub fn base64_url_decode(encoded: &str) -> Result<Vec<u8>> {
    URL_SAFE
        .decode(encoded)
        .map_err(|err| ComponentsError::Crypto(format!("base64 url decode: {err}")))
}

pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|err| ComponentsError::Crypto(format!("random bytes: {err}")))?;
    Ok(buf)
}

/// Random base64 text cut to exactly `len` characters.
pub fn random_string(len: usize) -> Result<String> {
    let mut encoded = base64_encode(random_bytes((len * 3).div_ceil(4))?);
    encoded.truncate(len);
    Ok(encoded)
}

/// Maps an arbitrary passphrase onto an AES key: short keys are hashed with
/// SHA-256, longer ones truncated to the next smaller key size.
pub fn normalize_aes_key(key: &[u8]) -> Vec<u8> {
    match key.len() {
        0..=15 => sha2::Sha256::digest(key).to_vec(),
        16 => key.to_vec(),
        17..=24 => key[..16].to_vec(),
        25..=32 => key[..24].to_vec(),
        _ => key[..32].to_vec(),
    }
}

/// AES-CFB with a random IV prepended to the ciphertext. The key must be
/// 16, 24 or 32 bytes.
pub fn aes_encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let mut out = random_bytes(AES_BLOCK_SIZE)?;
    out.extend_from_slice(plaintext);
    let (iv, body) = out.split_at_mut(AES_BLOCK_SIZE);
    match key.len() {
        16 => cfb_mode::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| invalid_key_size(key.len()))?
            .encrypt(body),
        24 => cfb_mode::Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| invalid_key_size(key.len()))?
            .encrypt(body),
        32 => cfb_mode::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| invalid_key_size(key.len()))?
            .encrypt(body),
        n => return Err(invalid_key_size(n)),
    }
    Ok(out)
}

pub fn aes_decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < AES_BLOCK_SIZE {
        return Err(ComponentsError::Crypto("ciphertext too short".to_string()));
    }
    let (iv, body) = ciphertext.split_at(AES_BLOCK_SIZE);
    let mut out = body.to_vec();
    match key.len() {
        16 => cfb_mode::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| invalid_key_size(key.len()))?
            .decrypt(&mut out),
        24 => cfb_mode::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| invalid_key_size(key.len()))?
            .decrypt(&mut out),
        32 => cfb_mode::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| invalid_key_size(key.len()))?
            .decrypt(&mut out),
        n => return Err(invalid_key_size(n)),
    }
    Ok(out)
}

/// Encrypts with a normalized passphrase and base64-encodes the result.
pub fn aes_encrypt_string(plaintext: &str, key: &str) -> Result<String> {
    let key = normalize_aes_key(key.as_bytes());
    Ok(base64_encode(aes_encrypt(plaintext.as_bytes(), &key)?))
}

pub fn aes_decrypt_string(ciphertext: &str, key: &str) -> Result<String> {
    let key = normalize_aes_key(key.as_bytes());
    let plain = aes_decrypt(&base64_decode(ciphertext)?, &key)?;
    String::from_utf8(plain).map_err(|err| ComponentsError::Crypto(format!("aes decrypt: {err}")))
}

fn invalid_key_size(len: usize) -> ComponentsError {
    ComponentsError::Crypto(format!("invalid AES key size {len}"))
}
