//! AES-CBC encryption and decryption of strings.
//!
//! # Ciphertext format
//!
//! ```text
//! fixed IV:  base64(AES-CBC-PKCS7(plaintext))
//! random IV: base64(iv || AES-CBC-PKCS7(plaintext))
//! ```
//!
//! The fixed-IV form matches `openssl enc -aes-256-cbc -K <key> -iv <iv> -base64`
//! and the usual CryptoJS `AES.encrypt(message, key, { iv })` output.
//!
//! **Known weaknesses of the fixed-IV mode.** Equal plaintexts produce equal
//! ciphertexts, so ciphertext equality leaks plaintext equality. There is no
//! authentication tag: a corrupted ciphertext may decrypt to garbage instead
//! of failing. Callers that need either property must use `IvMode::Random`
//! and an external MAC, or a different cipher.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::WorkflowError;
use rand::RngCore;
use tracing::error;

use crate::config::{Config, IvMode};

/// Byte length of an AES-CBC initialisation vector (one block).
pub const IV_LEN: usize = 16;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    fn from_len(len: usize) -> Option<Self> {
        match len {
            16 => Some(KeySize::Aes128),
            24 => Some(KeySize::Aes192),
            32 => Some(KeySize::Aes256),
            _ => None,
        }
    }
}

/// Decoded key and IV.
///
/// The buffers are overwritten with zeroes on drop and never printed.
struct KeyMaterial {
    key: Box<[u8]>,
    iv: [u8; IV_LEN],
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.key.iter_mut().for_each(|b| *b = 0);
        self.iv.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// String cipher bound to one key, one IV and one [`IvMode`].
#[derive(Debug)]
pub struct SymmetricCipher {
    material: KeyMaterial,
    size: KeySize,
    mode: IvMode,
}

impl SymmetricCipher {
    /// Build a cipher from the base64 key material in `cfg`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Config`] if either value is not valid base64,
    /// if the key is not 16, 24 or 32 bytes, or if the IV is not [`IV_LEN`] bytes.
    pub fn from_config(cfg: &Config) -> Result<Self, WorkflowError> {
        Self::from_base64(&cfg.aes_secret_key, &cfg.aes_iv, cfg.aes_iv_mode)
    }

    /// Build a cipher from base64-encoded key and IV strings.
    pub fn from_base64(key_b64: &str, iv_b64: &str, mode: IvMode) -> Result<Self, WorkflowError> {
        let key = STANDARD
            .decode(key_b64.trim())
            .map_err(|e| config_error(format!("AES_SECRET_KEY is not valid base64: {e}")))?;
        let iv = STANDARD
            .decode(iv_b64.trim())
            .map_err(|e| config_error(format!("AES_IV is not valid base64: {e}")))?;
        Self::new(key, &iv, mode)
    }

    fn new(key: Vec<u8>, iv: &[u8], mode: IvMode) -> Result<Self, WorkflowError> {
        let size = KeySize::from_len(key.len()).ok_or_else(|| {
            config_error(format!(
                "AES key must decode to 16, 24 or 32 bytes, got {}",
                key.len()
            ))
        })?;
        let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| {
            config_error(format!(
                "AES IV must decode to {IV_LEN} bytes, got {}",
                iv.len()
            ))
        })?;
        Ok(Self {
            material: KeyMaterial {
                key: key.into_boxed_slice(),
                iv,
            },
            size,
            mode,
        })
    }

    /// Encrypt a UTF-8 string and return base64 ciphertext.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Crypto`] only if the block cipher rejects the
    /// stored key or IV, which the constructor already rules out.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, WorkflowError> {
        match self.mode {
            IvMode::Fixed => {
                let ciphertext = self.encrypt_with_iv(plaintext.as_bytes(), &self.material.iv)?;
                Ok(STANDARD.encode(ciphertext))
            }
            IvMode::Random => {
                let mut iv = [0u8; IV_LEN];
                rand::thread_rng().fill_bytes(&mut iv);
                let ciphertext = self.encrypt_with_iv(plaintext.as_bytes(), &iv)?;
                let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
                out.extend_from_slice(&iv);
                out.extend_from_slice(&ciphertext);
                Ok(STANDARD.encode(out))
            }
        }
    }

    /// Decrypt a base64 ciphertext and return the plaintext bytes, base64-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Format`] if the input is not base64 or not a
    /// whole number of blocks, and [`WorkflowError::Crypto`] if the padding
    /// is invalid. A successful return does not prove the ciphertext is intact.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, WorkflowError> {
        self.decrypt_bytes(ciphertext).map(|p| STANDARD.encode(p))
    }

    /// Decrypt a base64 ciphertext and return the plaintext as UTF-8 text.
    pub fn decrypt_utf8(&self, ciphertext: &str) -> Result<String, WorkflowError> {
        let plaintext = self.decrypt_bytes(ciphertext)?;
        String::from_utf8(plaintext).map_err(|e| {
            let err = WorkflowError::Format(format!("plaintext is not valid UTF-8: {e}"));
            error!(error = %err, kind = err.kind(), "decrypted bytes are not text");
            err
        })
    }

    fn decrypt_bytes(&self, ciphertext: &str) -> Result<Vec<u8>, WorkflowError> {
        let raw = STANDARD.decode(ciphertext.trim()).map_err(|e| {
            let err = WorkflowError::Format(format!("ciphertext is not valid base64: {e}"));
            error!(error = %err, kind = err.kind(), "AES decrypt rejected input");
            err
        })?;

        let (iv, body) = match self.mode {
            IvMode::Fixed => (self.material.iv, raw.as_slice()),
            IvMode::Random => {
                if raw.len() < IV_LEN {
                    let err = WorkflowError::Format(format!(
                        "ciphertext is shorter than the {IV_LEN}-byte IV prefix"
                    ));
                    error!(error = %err, kind = err.kind(), "AES decrypt rejected input");
                    return Err(err);
                }
                let (prefix, rest) = raw.split_at(IV_LEN);
                let mut iv = [0u8; IV_LEN];
                iv.copy_from_slice(prefix);
                (iv, rest)
            }
        };

        if body.is_empty() || body.len() % BLOCK_LEN != 0 {
            let err = WorkflowError::Format(format!(
                "ciphertext length {} is not a positive multiple of {BLOCK_LEN}",
                body.len()
            ));
            error!(error = %err, kind = err.kind(), "AES decrypt rejected input");
            return Err(err);
        }

        self.decrypt_with_iv(body, &iv).map_err(|err| {
            error!(error = %err, kind = err.kind(), "AES decrypt failed");
            err
        })
    }

    fn encrypt_with_iv(&self, plaintext: &[u8], iv: &[u8; IV_LEN]) -> Result<Vec<u8>, WorkflowError> {
        let key = &self.material.key;
        let out = match self.size {
            KeySize::Aes128 => cbc::Encryptor::<aes::Aes128>::new_from_slices(key, iv)
                .map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
            KeySize::Aes192 => cbc::Encryptor::<aes::Aes192>::new_from_slices(key, iv)
                .map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
            KeySize::Aes256 => cbc::Encryptor::<aes::Aes256>::new_from_slices(key, iv)
                .map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        };
        out.map_err(|e| WorkflowError::Crypto(format!("AES key setup failed: {e}")))
    }

    fn decrypt_with_iv(&self, ciphertext: &[u8], iv: &[u8; IV_LEN]) -> Result<Vec<u8>, WorkflowError> {
        let key = &self.material.key;
        let out = match self.size {
            KeySize::Aes128 => cbc::Decryptor::<aes::Aes128>::new_from_slices(key, iv)
                .map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
            KeySize::Aes192 => cbc::Decryptor::<aes::Aes192>::new_from_slices(key, iv)
                .map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
            KeySize::Aes256 => cbc::Decryptor::<aes::Aes256>::new_from_slices(key, iv)
                .map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
        };
        out.map_err(|e| WorkflowError::Crypto(format!("AES key setup failed: {e}")))?
            .map_err(|_| WorkflowError::Crypto("invalid PKCS#7 padding".into()))
    }
}

fn config_error(msg: String) -> WorkflowError {
    let err = WorkflowError::Config(msg);
    error!(error = %err, kind = err.kind(), "invalid AES key material");
    err
}
