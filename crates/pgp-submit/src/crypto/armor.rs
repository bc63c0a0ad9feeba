//! ASCII armor framing.
//!
//! Some receivers want only the base64 body of an armored message. Slicing a
//! fixed number of characters off each end only works while the producer
//! emits no armor headers, so the body is located by structure instead:
//!
//! ```text
//! -----BEGIN PGP MESSAGE-----   <- dropped
//! Comment: optional             <- dropped
//!                               <- dropped (separator)
//! wcBMA...                      <- kept
//! =njUN                         <- kept (checksum, when present)
//! -----END PGP MESSAGE-----     <- dropped
//! ```

use common::WorkflowError;

const BEGIN_PREFIX: &str = "-----BEGIN ";
const DASHES: &str = "-----";

/// Return the body lines of an armored block joined with `\n`.
///
/// # Errors
///
/// Returns [`WorkflowError::Format`] if the BEGIN line, the blank separator,
/// the matching END line, or the body is missing.
pub fn armor_body(armored: &str) -> Result<String, WorkflowError> {
    let mut lines = armored.lines().map(str::trim_end);

    let begin = lines
        .by_ref()
        .find(|l| !l.is_empty())
        .ok_or_else(|| format_error("armored text is empty"))?;
    let label = begin
        .strip_prefix(BEGIN_PREFIX)
        .and_then(|rest| rest.strip_suffix(DASHES))
        .ok_or_else(|| format_error("missing armor BEGIN line"))?;

    // Armor headers run up to the first blank line.
    let mut separated = false;
    for line in lines.by_ref() {
        if line.is_empty() {
            separated = true;
            break;
        }
        if !line.contains(": ") {
            return Err(format_error("missing blank line after armor headers"));
        }
    }
    if !separated {
        return Err(format_error("missing blank line after armor headers"));
    }

    let footer = format!("-----END {label}-----");
    let mut body = Vec::new();
    for line in lines {
        if line == footer {
            if body.is_empty() {
                return Err(format_error("armor body is empty"));
            }
            return Ok(body.join("\n"));
        }
        body.push(line);
    }
    Err(format_error("missing armor END line"))
}

fn format_error(msg: &str) -> WorkflowError {
    WorkflowError::Format(msg.to_string())
}
