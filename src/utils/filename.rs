use regex::Regex;
use std::sync::LazyLock;
use crate::errors::XaiError;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid regex"));

const FALLBACK_NAME: &str = "upload";
const MAX_NAME_LEN: usize = 120;

/// Reduce a client-supplied filename to a safe single path component:
/// directories are dropped, whitespace becomes `_`, anything outside
/// `[A-Za-z0-9_.-]` is removed and leading dots are stripped.
pub fn secure_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let spaced: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&spaced, "");
    let trimmed = cleaned.trim_start_matches(['.', '_']);

    if trimmed.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    // Keep the tail so the extension survives truncation.
    let len = trimmed.len();
    if len > MAX_NAME_LEN {
        trimmed[len - MAX_NAME_LEN..].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Patient ids name a directory under `explanations/`; reject anything
/// that could escape it.
pub fn validate_path_segment(value: &str) -> Result<(), XaiError> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if invalid {
        return Err(XaiError::validation("Invalid patientId"));
    }
    Ok(())
}
