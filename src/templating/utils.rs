//! Helpers shared by the manifest and payload renderers.

use base64::Engine;
use regex::Regex;
use std::sync::LazyLock;

use crate::core::{CseError, Result};

/// cloud-init instance-data expressions (`{{ ds.meta_data.hostname }}`,
/// `{{ v1.local_hostname }}`). They use Tera's own delimiters but must reach
/// the node unrendered.
static INSTANCE_DATA_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{-?\s*(?:ds|v1)\.[^}]*\}\}").expect("instance-data pattern is valid")
});

/// Wrap cloud-init instance-data expressions in `{% raw %}` blocks so Tera
/// passes them through verbatim.
pub fn escape_instance_data(template: &str) -> String {
    INSTANCE_DATA_EXPRESSION.replace_all(template, "{% raw %}${0}{% endraw %}").into_owned()
}

/// Encode `raw` as the body of a JSON string literal.
///
/// The result can be placed between double quotes inside a JSON document.
/// `<`, `>` and `&` are kept as they are; only JSON's mandatory escapes are
/// applied. Trailing whitespace of the encoded form is dropped.
///
/// # Errors
///
/// Returns [`CseError::EncodingFailure`] if the encoder output is not a
/// quoted string.
pub fn encode_json_string(raw: &str) -> Result<String> {
    let encoded = serde_json::to_string(raw).map_err(|e| CseError::EncodingFailure {
        reason: e.to_string(),
    })?;

    encoded
        .trim()
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(|s| s.trim_end().to_string())
        .ok_or_else(|| CseError::EncodingFailure {
            reason: "the encoder did not produce a quoted string".to_string(),
        })
}

/// Standard base64 with padding.
pub fn base64_encode(value: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(value)
}

/// Flatten a Tera error and its sources into one line.
///
/// Tera's top-level message only says which template failed; the useful part
/// (missing variable, syntax position) is in the source chain.
pub fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error;

    let mut messages = vec![error.to_string()];
    let mut current: Option<&dyn Error> = error.source();
    while let Some(err) = current {
        let message = err.to_string();
        if !message.trim().is_empty() {
            messages.push(message);
        }
        current = err.source();
    }
    messages.join(": ")
}
