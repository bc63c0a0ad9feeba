//! OpenPGP key import, single-recipient encryption, decryption, and armor handling.
//!
//! This module is free of HTTP dependencies. Every function logs its failure
//! where it is detected and returns the [`common::WorkflowError`] unchanged.
//!
//! # Invariants
//!
//! - Keys are parsed once per operation and never cached.
//! - Only unprotected private keys are supported; decryption always unlocks
//!   with the empty passphrase.
//! - Payload plaintext is logged only when explicitly enabled.

pub mod armor;
pub mod keyfile;
pub mod openpgp;

pub use openpgp::{decrypt_message, encrypt_object};
