//! AES-256-CBC encrypt/decrypt with PKCS7 padding.
//!
//! Wire format (must interoperate with ciphertexts already stored by
//! existing clients): `base64(ivHex + "::" + base64(ciphertext))`,
//! with a 64-character hex key (32 bytes) and a fresh random 16-byte
//! IV per encryption.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Validate a 64-hex-character key and decode it to 32 bytes.
pub fn parse_key(key_hex: &str) -> Result<Vec<u8>> {
    let key = hex::decode(key_hex).context("Encryption key is not valid hex")?;
    if key.len() != 32 {
        bail!("Encryption key must be 32 bytes (64 hex chars), got {}", key.len());
    }
    Ok(key)
}

/// Generate a fresh 256-bit key as 64 hex characters.
pub fn generate_key() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// Encrypt a plaintext under the given hex key.
pub fn encrypt(plaintext: &str, key_hex: &str) -> Result<String> {
    let key = parse_key(key_hex)?;
    let iv: [u8; 16] = rand::random();

    let cipher = Aes256CbcEnc::new_from_slices(&key, &iv)
        .map_err(|e| anyhow!("Failed to initialize cipher: {e}"))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let combined = format!("{}::{}", hex::encode(iv), BASE64.encode(ciphertext));
    Ok(BASE64.encode(combined))
}

/// Decrypt data produced by [`encrypt`] (or by a compatible client).
pub fn decrypt(encrypted: &str, key_hex: &str) -> Result<String> {
    let key = parse_key(key_hex)?;

    let decoded = BASE64
        .decode(encrypted)
        .context("Invalid base64 in encrypted data")?;
    let decoded = String::from_utf8(decoded).context("Invalid cipher envelope")?;

    let (iv_hex, ct_b64) = decoded
        .split_once("::")
        .ok_or_else(|| anyhow!("Invalid cipher format - expected IV::encrypted"))?;

    let iv = hex::decode(iv_hex).context("Invalid IV hex")?;
    let ciphertext = BASE64.decode(ct_b64).context("Invalid ciphertext base64")?;

    let cipher = Aes256CbcDec::new_from_slices(&key, &iv)
        .map_err(|e| anyhow!("Failed to initialize cipher: {e}"))?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| anyhow!("Decryption failed - invalid key or corrupted data"))?;

    String::from_utf8(plaintext).context("Decrypted data is not valid UTF-8")
}
