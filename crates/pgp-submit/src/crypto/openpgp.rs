//! Single-recipient OpenPGP encryption of JSON payloads and decryption of
//! armored messages.

use std::path::Path;

use common::WorkflowError;
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::types::{PublicKeyTrait, SecretKeyTrait};
use pgp::{ArmorOptions, Deserializable, Message, SignedPublicKey, SignedSecretKey};
use serde::Serialize;
use tracing::{debug, error};

use super::keyfile::{import_key, ArmoredKey, KeyKind};

/// Passphrase used to unlock private keys. Only unprotected keys are supported.
pub const EMPTY_PASSPHRASE: &str = "";

/// Session cipher for outgoing messages.
const SESSION_ALGORITHM: SymmetricKeyAlgorithm = SymmetricKeyAlgorithm::AES256;

/// Serialise `object` to JSON and encrypt it to the public key at `public_key_path`.
///
/// JSON keys keep insertion order. When `log_plaintext` is set the serialised
/// payload is logged at debug level; leave it off outside local debugging.
///
/// # Errors
///
/// Returns [`WorkflowError::Io`] or [`WorkflowError::Format`] if the key cannot
/// be imported, and [`WorkflowError::Crypto`] if encryption fails.
pub async fn encrypt_object<T>(
    object: &T,
    public_key_path: impl AsRef<Path>,
    log_plaintext: bool,
) -> Result<String, WorkflowError>
where
    T: Serialize + ?Sized,
{
    let plaintext = serde_json::to_string(object).map_err(|e| {
        let err = WorkflowError::Format(format!("payload is not serialisable as JSON: {e}"));
        error!(error = %err, kind = err.kind(), "error encrypting object with PGP");
        err
    })?;
    if log_plaintext {
        debug!(plaintext = %plaintext, "serialised payload");
    }

    let key = import_key(public_key_path).await?;

    encrypt_text(&plaintext, &key).map_err(|err| {
        error!(error = %err, kind = err.kind(), "error encrypting object with PGP");
        err
    })
}

/// Encrypt `plaintext` to a single recipient and return the armored message.
///
/// The first encryption-capable subkey is used; a primary key is used only
/// when it can encrypt itself (e.g. RSA).
pub fn encrypt_text(plaintext: &str, key: &ArmoredKey) -> Result<String, WorkflowError> {
    if key.kind != KeyKind::Public {
        return Err(WorkflowError::Format(
            "expected a public key, found a private key".into(),
        ));
    }
    let (public_key, _headers) = SignedPublicKey::from_string(&key.text)
        .map_err(|e| WorkflowError::Format(format!("invalid public key: {e}")))?;

    let message = Message::new_literal("", plaintext);
    let subkey = public_key
        .public_subkeys
        .iter()
        .find(|k| k.is_encryption_key());
    let encrypted = match subkey {
        Some(subkey) => {
            message.encrypt_to_keys_seipdv1(rand::thread_rng(), SESSION_ALGORITHM, &[subkey])
        }
        None if public_key.is_encryption_key() => {
            message.encrypt_to_keys_seipdv1(rand::thread_rng(), SESSION_ALGORITHM, &[&public_key])
        }
        None => {
            return Err(WorkflowError::Crypto(
                "public key has no encryption-capable key".into(),
            ))
        }
    }
    .map_err(|e| WorkflowError::Crypto(format!("encryption failed: {e}")))?;

    encrypted
        .to_armored_string(ArmorOptions::default())
        .map_err(|e| WorkflowError::Crypto(format!("failed to armor message: {e}")))
}

/// Decrypt an armored message with the unprotected private key at `private_key_path`.
///
/// # Errors
///
/// Returns [`WorkflowError::Io`] or [`WorkflowError::Format`] if the key or
/// message cannot be read or parsed, and [`WorkflowError::Crypto`] if the key
/// is passphrase-protected or does not match the message recipient.
pub async fn decrypt_message(
    armored_message: &str,
    private_key_path: impl AsRef<Path>,
) -> Result<String, WorkflowError> {
    let key = import_key(private_key_path).await?;

    decrypt_text(armored_message, &key).map_err(|err| {
        error!(error = %err, kind = err.kind(), "error decrypting PGP message");
        err
    })
}

/// Decrypt an armored message with an already imported private key.
pub fn decrypt_text(armored_message: &str, key: &ArmoredKey) -> Result<String, WorkflowError> {
    if key.kind != KeyKind::Secret {
        return Err(WorkflowError::Format(
            "expected a private key, found a public key".into(),
        ));
    }
    let (secret_key, _headers) = SignedSecretKey::from_string(&key.text)
        .map_err(|e| WorkflowError::Format(format!("invalid private key: {e}")))?;

    // Fails here for passphrase-protected keys.
    secret_key
        .unlock(|| EMPTY_PASSPHRASE.to_string(), |_| Ok(()))
        .map_err(|e| {
            WorkflowError::Crypto(format!(
                "failed to unlock private key with the empty passphrase: {e}"
            ))
        })?;

    let (message, _headers) = Message::from_string(armored_message)
        .map_err(|e| WorkflowError::Format(format!("invalid armored message: {e}")))?;

    let (decrypted, _key_ids) = message
        .decrypt(|| EMPTY_PASSPHRASE.to_string(), &[&secret_key])
        .map_err(|e| WorkflowError::Crypto(format!("decryption failed: {e}")))?;

    let content = decrypted
        .get_content()
        .map_err(|e| WorkflowError::Crypto(format!("failed to read decrypted content: {e}")))?
        .ok_or_else(|| WorkflowError::Format("decrypted message has no literal data".into()))?;

    String::from_utf8(content)
        .map_err(|e| WorkflowError::Format(format!("decrypted content is not UTF-8: {e}")))
}
