//! `aes-cipher` — AES-CBC string encryption utility.
//!
//! Startup sequence:
//! 1. Load and validate [`config::Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Decode the key material into a [`cipher::SymmetricCipher`].
//! 4. Run the requested command and print the result to stdout.

mod cipher;
mod config;
mod telemetry;

use anyhow::Result;
use tracing::{debug, error};

use cipher::SymmetricCipher;

fn print_usage() {
    eprintln!(
        "Usage: aes-cipher <command> <input>\n\nCommands:\n  encrypt <plaintext>\n  decrypt <base64-ciphertext>        prints plaintext bytes as base64\n  decrypt-text <base64-ciphertext>   prints plaintext as UTF-8\n\nEnvironment:\n  AES_SECRET_KEY  base64 key (16, 24 or 32 bytes)\n  AES_IV          base64 IV (16 bytes)\n  AES_IV_MODE     fixed | random (default fixed)\n  LOG_LEVEL       default info"
    );
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        print_usage();
        std::process::exit(2);
    }

    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: aes-cipher configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 3. Key material
    // -----------------------------------------------------------------------
    let cipher = SymmetricCipher::from_config(&cfg)?;
    debug!(iv_mode = ?cfg.aes_iv_mode, "key material loaded");

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    let input = &args[2];
    let output = match args[1].as_str() {
        "encrypt" => cipher.encrypt(input),
        "decrypt" => cipher.decrypt(input),
        "decrypt-text" => cipher.decrypt_utf8(input),
        _ => {
            print_usage();
            std::process::exit(2);
        }
    };

    match output {
        Ok(text) => {
            println!("{text}");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, kind = e.kind(), command = %args[1], "command failed");
            Err(e.into())
        }
    }
}
