//! Content identifier of a query
//!
//! SHA-256 over the fields that make two queries "the same question":
//! participants, framing text, limits and prerequisites. Sent time and reply
//! state never enter the hash, so a question asked again in a later session
//! gets the identifier it had before.

use crate::values::Value;
use sha2::{Digest, Sha256};

const FIELD_SEPARATOR: [u8; 1] = [0x1f];

pub(crate) fn compute(
    sender: &str,
    recipient: &str,
    foreword: Option<&str>,
    question: Option<&str>,
    afterword: Option<&str>,
    limits: &[Value],
    prerequisite_ids: &[String],
) -> String {
    let mut hasher = Sha256::new();
    for field in [
        Some(sender),
        Some(recipient),
        foreword,
        question,
        afterword,
    ] {
        hasher.update(field.unwrap_or_default().as_bytes());
        hasher.update(FIELD_SEPARATOR);
    }

    let limits_json = serde_json::to_string(limits).unwrap_or_default();
    hasher.update(limits_json.as_bytes());
    hasher.update(FIELD_SEPARATOR);

    for id in prerequisite_ids {
        hasher.update(id.as_bytes());
        hasher.update(FIELD_SEPARATOR);
    }

    format!("{:x}", hasher.finalize())
}
