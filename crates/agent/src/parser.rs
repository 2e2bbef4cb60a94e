//! Tool-call extraction and best-effort JSON repair.
//!
//! Small instruction-tuned models emit tool calls as a sentinel-delimited
//! segment inside otherwise free-form text:
//!
//! ```text
//! <start_function_call>call: get_cluster_status {"cluster_id": "prod"}<end_function_call>
//! ```
//!
//! The same models routinely garble the argument JSON (unquoted keys,
//! unquoted string values, stray tokenizer artifacts), so a strict parse
//! is followed by one bounded repair pass and one retry. Repair is a
//! fixed, ordered set of four textual rules, not a general-purpose
//! parser; anything it cannot recover is reported as an unrecoverable
//! parse failure and the caller degrades to the plain-text path.

use regex_lite::Regex;
use steward_core::JsonMap;
use thiserror::Error;

/// Sentinel opening a function-call segment in generator output.
pub const CALL_START: &str = "<start_function_call>";
/// Sentinel closing a function-call segment.
pub const CALL_END: &str = "<end_function_call>";
/// Label token prefixing the tool name inside the segment.
const CALL_LABEL: &str = "call:";

/// Known non-JSON artifact tokens the tokenizer leaks into arguments.
const ARTIFACT_TOKENS: &[&str] = &["<escape>"];

/// A tool call extracted from raw generator text.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// The tool name named by the model.
    pub name: String,
    /// The parsed argument object (empty for zero-argument calls).
    pub arguments: JsonMap,
}

/// Unrecoverable extraction failure. Non-fatal to the request: callers
/// emit an `invalid_json` drift signal and treat the thought as plain
/// text.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("unrecoverable call arguments: {0}")]
    InvalidJson(String),
}

/// Extract a tool call from raw generator text.
///
/// Returns `Ok(None)` when the text carries no call sentinel (a plain
/// natural-language answer). Tool-name membership is deliberately not
/// checked here; the dispatch decision belongs to the loop controller.
pub fn parse_tool_call(raw: &str) -> Result<Option<ToolInvocation>, ParseError> {
    let Some(start) = raw.find(CALL_START) else {
        return Ok(None);
    };

    let segment = &raw[start + CALL_START.len()..];
    // A missing end sentinel consumes the rest of the text.
    let segment = match segment.find(CALL_END) {
        Some(end) => &segment[..end],
        None => segment,
    };

    let body = segment.trim();
    let body = body.strip_prefix(CALL_LABEL).unwrap_or(body).trim_start();

    let Some(brace) = body.find('{') else {
        // Zero-argument call: the whole body is the name.
        let name = body.trim();
        if name.is_empty() {
            return Err(ParseError::InvalidJson("empty call segment".into()));
        }
        return Ok(Some(ToolInvocation {
            name: name.to_string(),
            arguments: JsonMap::new(),
        }));
    };

    let name = body[..brace].trim();
    if name.is_empty() {
        return Err(ParseError::InvalidJson(
            "missing tool name before arguments".into(),
        ));
    }
    let args_text = &body[brace..];

    let arguments = match parse_arguments(args_text) {
        Ok(map) => map,
        Err(first_err) => {
            tracing::warn!(
                tool = %name,
                "malformed call arguments, attempting repair: {first_err}"
            );
            let repaired = repair_json(args_text);
            parse_arguments(&repaired)
                .map_err(|_| ParseError::InvalidJson(first_err.to_string()))?
        }
    };

    Ok(Some(ToolInvocation {
        name: name.to_string(),
        arguments,
    }))
}

fn parse_arguments(text: &str) -> Result<JsonMap, String> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("arguments are not a JSON object: {other}")),
        Err(e) => Err(e.to_string()),
    }
}

/// Apply the four repair rules, in order:
///
/// 1. strip known artifact tokens (`<escape>`);
/// 2. quote bare identifier keys (after `{` or `,`) followed by a colon;
/// 3. quote bare alphanumeric/underscore scalar values before `,` or `}`;
/// 4. quote a bare trailing scalar value at end-of-string.
///
/// Rules 3 and 4 leave tokens that already are valid JSON scalars
/// (numbers, `true`, `false`, `null`) untouched, and text that already
/// parses as JSON is returned unchanged, so repairing valid input never
/// changes its parsed value.
pub fn repair_json(input: &str) -> String {
    if serde_json::from_str::<serde_json::Value>(input).is_ok() {
        return input.to_string();
    }

    let mut text = input.to_string();

    // 1. Tokenizer artifacts
    for artifact in ARTIFACT_TOKENS {
        text = text.replace(artifact, "");
    }

    // 2. Unquoted keys: `{cluster_id:` -> `{"cluster_id":`
    let key_re = Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:").unwrap();
    text = key_re.replace_all(&text, "${1}\"${2}\":").into_owned();

    // 3. Unquoted string values: `: prod,` -> `: "prod",`
    let value_re = Regex::new(r":\s*([A-Za-z_0-9]+)\s*([,}])").unwrap();
    text = value_re
        .replace_all(&text, |caps: &regex_lite::Captures<'_>| {
            let token = &caps[1];
            if is_json_scalar(token) {
                caps[0].to_string()
            } else {
                format!(": \"{}\"{}", token, &caps[2])
            }
        })
        .into_owned();

    // 4. Unquoted trailing value: `: prod` at end-of-string
    let tail_re = Regex::new(r":\s*([A-Za-z_0-9]+)\s*$").unwrap();
    text = tail_re
        .replace_all(&text, |caps: &regex_lite::Captures<'_>| {
            let token = &caps[1];
            if is_json_scalar(token) {
                caps[0].to_string()
            } else {
                format!(": \"{token}\"")
            }
        })
        .into_owned();

    text
}

/// Whether a bare token is already a valid JSON scalar on its own.
fn is_json_scalar(token: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(token).is_ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────
