//! Form schema data model.
//!
//! The model replies with JSON shaped like
//!
//! ```json
//! {
//!   "title": "Contact",
//!   "description": "Get in touch",
//!   "fields": [ { "label": "Name", "type": "text" } ]
//! }
//! ```
//!
//! which decodes into [`FormSchema`]. Field types are a closed enum with an
//! explicit [`FieldKind::Unknown`] arm; what happens to unknown types is the
//! renderer's [`crate::config::UnknownFieldPolicy`], not an accident of a
//! missing match arm.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A form as described by the model: title, description, ordered fields.
///
/// `fields` order is display order and submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<FormField>,
}

/// One field of a form. Labels are display names and may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

impl FormField {
    pub fn new(label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }
}

/// Declared type of a form field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Textarea,
    /// Anything the model invented (`"date"`, `"checkbox"`, …), kept verbatim.
    Unknown(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Number => "number",
            FieldKind::Textarea => "textarea",
            FieldKind::Unknown(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldKind::Unknown(_))
    }
}

impl From<String> for FieldKind {
    /// Case-insensitive; spaces, `_` and `-` are ignored so the model's
    /// "text area" / "text_area" spellings map to [`FieldKind::Textarea`].
    fn from(raw: String) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "text" => FieldKind::Text,
            "email" => FieldKind::Email,
            "number" => FieldKind::Number,
            "textarea" => FieldKind::Textarea,
            _ => FieldKind::Unknown(raw),
        }
    }
}

impl From<&str> for FieldKind {
    fn from(raw: &str) -> Self {
        FieldKind::from(raw.to_string())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of asking the model for a schema.
///
/// A refusal is a successful reply that says "this is not a form"; it is
/// routed to the warning screen rather than treated as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SchemaOutcome {
    Schema(FormSchema),
    Refusal { reason: String },
}

impl SchemaOutcome {
    pub fn schema(&self) -> Option<&FormSchema> {
        match self {
            SchemaOutcome::Schema(s) => Some(s),
            SchemaOutcome::Refusal { .. } => None,
        }
    }

    pub fn is_refusal(&self) -> bool {
        matches!(self, SchemaOutcome::Refusal { .. })
    }
}

/// Values entered in the Fill stage, keyed by field label, in schema order.
///
/// Inserting a label that is already present overwrites its value but keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    entries: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormSubmission {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut submission = FormSubmission::new();
        for (k, v) in iter {
            submission.insert(k, v);
        }
        submission
    }
}

impl Serialize for FormSubmission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_kind_from_model_spellings() {
        assert_eq!(FieldKind::from("text"), FieldKind::Text);
        assert_eq!(FieldKind::from("Email"), FieldKind::Email);
        assert_eq!(FieldKind::from("NUMBER"), FieldKind::Number);
        assert_eq!(FieldKind::from("text area"), FieldKind::Textarea);
        assert_eq!(FieldKind::from("text_area"), FieldKind::Textarea);
        assert_eq!(FieldKind::from("bogus"), FieldKind::Unknown("bogus".into()));
    }

    #[test]
    fn unknown_kind_keeps_original_spelling() {
        let kind = FieldKind::from("Date-Picker");
        assert_eq!(kind.as_str(), "Date-Picker");
        assert!(!kind.is_known());
    }

    #[test]
    fn field_deserialises_type_key() {
        let f: FormField = serde_json::from_str(r#"{"label":"Age","type":"number"}"#).unwrap();
        assert_eq!(f, FormField::new("Age", FieldKind::Number));
    }

    #[test]
    fn schema_description_defaults_to_empty() {
        let s: FormSchema =
            serde_json::from_str(r#"{"title":"T","fields":[]}"#).unwrap();
        assert_eq!(s.description, "");
    }

    #[test]
    fn submission_serialises_in_insertion_order() {
        let sub: FormSubmission = [("Zeta", "1"), ("Alpha", "2")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&sub).unwrap(),
            r#"{"Zeta":"1","Alpha":"2"}"#
        );
    }

    #[test]
    fn submission_duplicate_label_overwrites_in_place() {
        let mut sub = FormSubmission::new();
        sub.insert("Name", "a");
        sub.insert("Email", "b");
        sub.insert("Name", "c");
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.iter().collect::<Vec<_>>(), vec![("Name", "c"), ("Email", "b")]);
    }

    #[test]
    fn outcome_accessors() {
        let refusal = SchemaOutcome::Refusal {
            reason: "not a form".into(),
        };
        assert!(refusal.is_refusal());
        assert!(refusal.schema().is_none());
    }
}
