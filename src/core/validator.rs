//! Credential validation
//!
//! Every string typed into a form field passes through [`validate`] before
//! it is allowed anywhere near the network. The allowlist patterns are the
//! real control; the suspicious-token scan in front of them is a coarse
//! extra layer.

use crate::error::ValidationError;
use crate::types::CredentialKind;
use regex::Regex;
use std::sync::LazyLock;

/// Absolute upper bound on any credential input, in characters
pub const MAX_INPUT_LENGTH: usize = 250;

/// Google API key: "AIza" + 35 characters
static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^AIza[0-9A-Za-z_-]{35}$").expect("Invalid regex"));

/// YouTube channel id: "UC" + 22 characters
static CHANNEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UC[0-9A-Za-z_-]{22}$").expect("Invalid regex"));

/// Injection-looking fragments, matched against the lowercased input
const SUSPICIOUS_TOKENS: &[&str] = &[
    "--",
    ";--",
    ";",
    "/*",
    "*/",
    "xp_",
    "drop ",
    "union ",
    " or ",
    " and ",
    "' or '1'='1",
    "\" or \"1\"=\"1",
];

/// Trim and check a raw credential.
///
/// Checks run in a fixed order and the first failure wins: missing, too
/// long, suspicious content, then the allowlist pattern for `kind`. On
/// success the trimmed input is returned untouched.
pub fn validate(raw: &str, kind: CredentialKind) -> Result<String, ValidationError> {
    let cleaned = raw.trim();

    match check(cleaned, kind) {
        Ok(()) => Ok(cleaned.to_string()),
        Err(reason) => {
            let length = cleaned.chars().count();
            match reason {
                ValidationError::SuspiciousContent => tracing::warn!(
                    kind = %kind,
                    reason = ?reason.code(),
                    length,
                    "Rejected input that looks malicious"
                ),
                _ => tracing::info!(
                    kind = %kind,
                    reason = ?reason.code(),
                    length,
                    "Credential validation failed"
                ),
            }
            Err(reason)
        }
    }
}

fn check(cleaned: &str, kind: CredentialKind) -> Result<(), ValidationError> {
    if cleaned.is_empty() {
        return Err(ValidationError::Missing);
    }
    if cleaned.chars().count() > MAX_INPUT_LENGTH {
        return Err(ValidationError::TooLong);
    }
    if looks_malicious(cleaned) {
        return Err(ValidationError::SuspiciousContent);
    }

    let pattern = match kind {
        CredentialKind::ApiKey => &API_KEY_RE,
        CredentialKind::ChannelId => &CHANNEL_ID_RE,
    };
    if !pattern.is_match(cleaned) {
        return Err(ValidationError::FormatInvalid(kind));
    }

    Ok(())
}

/// Embedded spaces, control characters, or a known injection fragment
fn looks_malicious(s: &str) -> bool {
    if s.contains(' ') {
        return true;
    }
    if s.chars().any(|c| (c as u32) < 32) {
        return true;
    }
    let low = s.to_lowercase();
    SUSPICIOUS_TOKENS.iter().any(|token| low.contains(token))
}
