//! Turning the model's free-text reply into a [`FormSchema`].
//!
//! Models are asked to answer in bare JSON but routinely wrap it in a
//! markdown fence with a `json` language tag. Cleanup is deliberately
//! literal:
//!
//! 1. remove every "```" marker
//! 2. remove the first literal `json` (the fence's language tag)
//! 3. drop invisible characters (BOM, zero-width spaces) and trim
//!
//! then decode. Step 2 is position-blind: a reply with no fence but a label
//! containing "json" loses that first occurrence, which is the contract the
//! prompts were written against.

use crate::error::FormsError;
use crate::schema::{FieldKind, FormField, FormSchema, SchemaOutcome};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

const FENCE: &str = "```";
const LANGUAGE_TAG: &str = "json";

/// Clean up a raw reply so it can be decoded as JSON.
pub fn clean_response(raw: &str) -> String {
    let s = raw.replace(FENCE, "");
    let s = s.replacen(LANGUAGE_TAG, "", 1);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

static RE_INVISIBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{200B}\x{200C}\x{200D}\x{2060}\x{FEFF}]").unwrap());

fn remove_invisible_chars(input: &str) -> String {
    RE_INVISIBLE.replace_all(input, "").to_string()
}

/// Clean and decode a reply as a [`FormSchema`].
///
/// # Errors
/// [`FormsError::Decode`] when the cleaned text is not a JSON object with
/// `title` and `fields`.
pub fn parse_schema(raw: &str) -> Result<FormSchema, FormsError> {
    let cleaned = clean_response(raw);
    serde_json::from_str(&cleaned).map_err(|e| decode_error(e.to_string(), raw))
}

/// Wire shape of a reply: either a schema or a refusal.
#[derive(Debug, Deserialize)]
struct WireReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    fields: Option<Vec<FormField>>,
}

/// Clean and decode a reply into a [`SchemaOutcome`].
///
/// A refusal is recognised by `"status": "invalid"`. Older replies that put
/// the word `Invalid` in the title are also treated as refusals, with the
/// title as the reason.
pub fn decode_outcome(raw: &str) -> Result<SchemaOutcome, FormsError> {
    let cleaned = clean_response(raw);
    let reply: WireReply =
        serde_json::from_str(&cleaned).map_err(|e| decode_error(e.to_string(), raw))?;

    if reply
        .status
        .as_deref()
        .is_some_and(|s| s.trim().eq_ignore_ascii_case("invalid"))
    {
        let reason = reply
            .reason
            .filter(|r| !r.trim().is_empty())
            .or(reply.title)
            .unwrap_or_else(|| "input is not about a form".to_string());
        warn!("Model refused the input: {}", reason);
        return Ok(SchemaOutcome::Refusal { reason });
    }

    let title = reply
        .title
        .ok_or_else(|| decode_error("missing field `title`".to_string(), raw))?;

    if title.contains("Invalid") {
        warn!("Model refused the input via title: {}", title);
        return Ok(SchemaOutcome::Refusal { reason: title });
    }

    let fields = reply
        .fields
        .ok_or_else(|| decode_error("missing field `fields`".to_string(), raw))?;

    let unknown = fields.iter().filter(|f| !f.kind.is_known()).count();
    if unknown > 0 {
        debug!("{} of {} fields have unrecognised types", unknown, fields.len());
    }

    Ok(SchemaOutcome::Schema(FormSchema {
        title,
        description: reply.description.unwrap_or_default(),
        fields,
    }))
}

fn decode_error(detail: String, raw: &str) -> FormsError {
    FormsError::Decode {
        detail,
        raw: raw.to_string(),
    }
}

/// Kinds present in a schema, for logging and the CLI summary.
pub fn field_kinds(schema: &FormSchema) -> Vec<&FieldKind> {
    schema.fields.iter().map(|f| &f.kind).collect()
}
