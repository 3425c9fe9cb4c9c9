//! Form rendering: schema → widgets.
//!
//! The renderer is front-end agnostic. It decides *which* widget each field
//! gets and holds the values typed into a live form; the terminal UI in
//! [`crate::ui`] only draws what it is given.
//!
//! | FieldKind         | WidgetKind   |
//! |-------------------|--------------|
//! | Text, Email       | SingleLine   |
//! | Number            | Numeric      |
//! | Textarea          | MultiLine    |
//! | Unknown           | see [`UnknownFieldPolicy`] |
//!
//! Type names are matched after [`FieldKind`] normalisation: case is ignored
//! and spaces, `_` and `-` are removed, so `"TEXT"` is `Text` and
//! `"text area"` / `"text_area"` are `Textarea`. Anything else is `Unknown`.

use crate::config::UnknownFieldPolicy;
use crate::error::FormsError;
use crate::schema::{FieldKind, FormSchema, FormSubmission};
use tracing::warn;

/// Input widget shown for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    SingleLine,
    Numeric,
    MultiLine,
}

impl WidgetKind {
    /// Widget for a field kind; `None` for unknown kinds.
    pub fn for_field(kind: &FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Text | FieldKind::Email => Some(WidgetKind::SingleLine),
            FieldKind::Number => Some(WidgetKind::Numeric),
            FieldKind::Textarea => Some(WidgetKind::MultiLine),
            FieldKind::Unknown(_) => None,
        }
    }

    /// Whether `c` may be appended to `current`.
    ///
    /// Numeric widgets keep the buffer a prefix of a decimal number: an
    /// optional leading `-`, digits, at most one `.`.
    pub fn accepts(self, current: &str, c: char) -> bool {
        match self {
            WidgetKind::Numeric => match c {
                '0'..='9' => true,
                '-' => current.is_empty(),
                '.' => !current.contains('.'),
                _ => false,
            },
            WidgetKind::SingleLine => c != '\n',
            WidgetKind::MultiLine => true,
        }
    }

    /// The value as submitted. A numeric buffer with no digits (`-`, `.`,
    /// `-.`) submits as empty.
    pub fn finish(self, value: &str) -> String {
        match self {
            WidgetKind::Numeric if !value.chars().any(|c| c.is_ascii_digit()) => String::new(),
            _ => value.to_string(),
        }
    }
}

/// Preview (disabled widgets) or live (editable, keyed) rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Preview,
    Live,
}

/// One rendered input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    /// `f_{field_index}`; stable across renders of the same schema.
    pub key: String,
    /// Index of the field in `FormSchema::fields`.
    pub field_index: usize,
    pub label: String,
    pub kind: WidgetKind,
    pub disabled: bool,
}

/// Widget key for the field at `index`.
pub fn widget_key(index: usize) -> String {
    format!("f_{index}")
}

/// A schema laid out as widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedForm {
    pub title: String,
    pub description: String,
    pub widgets: Vec<Widget>,
}

/// Lay out `schema` as widgets.
///
/// Unknown field types are omitted under [`UnknownFieldPolicy::Drop`] and
/// fail with [`FormsError::UnknownFieldType`] under
/// [`UnknownFieldPolicy::Reject`].
pub fn render(
    schema: &FormSchema,
    mode: RenderMode,
    policy: UnknownFieldPolicy,
) -> Result<RenderedForm, FormsError> {
    let disabled = mode == RenderMode::Preview;
    let mut widgets = Vec::with_capacity(schema.fields.len());

    for (idx, field) in schema.fields.iter().enumerate() {
        match WidgetKind::for_field(&field.kind) {
            Some(kind) => widgets.push(Widget {
                key: widget_key(idx),
                field_index: idx,
                label: field.label.clone(),
                kind,
                disabled,
            }),
            None => match policy {
                UnknownFieldPolicy::Drop => {
                    warn!("Dropping field '{}' with unsupported type '{}'", field.label, field.kind);
                }
                UnknownFieldPolicy::Reject => {
                    return Err(FormsError::UnknownFieldType {
                        label: field.label.clone(),
                        kind: field.kind.to_string(),
                    });
                }
            },
        }
    }

    Ok(RenderedForm {
        title: schema.title.clone(),
        description: schema.description.clone(),
        widgets,
    })
}

impl RenderedForm {
    /// Plain-text rendering for non-interactive output.
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n{}\n", self.title, self.description);
        for w in &self.widgets {
            let hint = match w.kind {
                WidgetKind::SingleLine => "[ ________________ ]",
                WidgetKind::Numeric => "[ 0.00          +- ]",
                WidgetKind::MultiLine => "[ ________________ ]\n    [ ________________ ]",
            };
            out.push_str(&format!("\n  {}\n    {}\n", w.label, hint));
        }
        out
    }
}

/// An editable form in the Fill stage.
#[derive(Debug, Clone)]
pub struct LiveForm {
    form: RenderedForm,
    values: Vec<String>,
    /// Every schema label, including fields that got no widget.
    labels: Vec<String>,
    active: usize,
}

impl LiveForm {
    pub fn new(schema: &FormSchema, policy: UnknownFieldPolicy) -> Result<Self, FormsError> {
        let form = render(schema, RenderMode::Live, policy)?;
        let values = vec![String::new(); form.widgets.len()];
        Ok(Self {
            form,
            values,
            labels: schema.fields.iter().map(|f| f.label.clone()).collect(),
            active: 0,
        })
    }

    pub fn form(&self) -> &RenderedForm {
        &self.form
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.form.widgets
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.values[i].as_str())
    }

    pub fn value_at(&self, widget: usize) -> Option<&str> {
        self.values.get(widget).map(String::as_str)
    }

    /// Set the value of the widget with `key`. Returns false for unknown keys.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.position(key) {
            Some(i) => {
                self.values[i] = value.into();
                true
            }
            None => false,
        }
    }

    /// Set the value of the `widget`-th rendered widget.
    pub fn set_value_at(&mut self, widget: usize, value: impl Into<String>) -> bool {
        match self.values.get_mut(widget) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.form.widgets.iter().position(|w| w.key == key)
    }

    /// Index (into `widgets()`) of the focused widget.
    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_widget(&self) -> Option<&Widget> {
        self.form.widgets.get(self.active)
    }

    pub fn next_field(&mut self) {
        let count = self.form.widgets.len();
        if count > 0 {
            self.active = (self.active + 1) % count;
        }
    }

    pub fn prev_field(&mut self) {
        let count = self.form.widgets.len();
        if count > 0 {
            self.active = if self.active == 0 { count - 1 } else { self.active - 1 };
        }
    }

    pub fn reset_focus(&mut self) {
        self.active = 0;
    }

    pub fn focus_last(&mut self) {
        self.active = self.form.widgets.len().saturating_sub(1);
    }

    /// Type into the focused widget. Characters the widget does not accept
    /// are ignored.
    pub fn push_char(&mut self, c: char) {
        if let Some(w) = self.form.widgets.get(self.active) {
            if w.kind.accepts(&self.values[self.active], c) {
                self.values[self.active].push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(v) = self.values.get_mut(self.active) {
            v.pop();
        }
    }

    /// Clear every value and focus the first widget.
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(String::clear);
        self.active = 0;
    }

    /// Pair every schema field with its value, in schema order.
    ///
    /// Fields dropped for an unknown type have no widget and submit an empty
    /// value.
    pub fn submit(&self) -> FormSubmission {
        let mut widgets = self.form.widgets.iter().zip(&self.values).peekable();
        self.labels
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                let value = match widgets.next_if(|(w, _)| w.field_index == idx) {
                    Some((w, v)) => w.kind.finish(v),
                    None => String::new(),
                };
                (label.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FormField;
    use pretty_assertions::assert_eq;

    fn contact() -> FormSchema {
        FormSchema {
            title: "Contact".into(),
            description: "d".into(),
            fields: vec![
                FormField::new("Name", FieldKind::Text),
                FormField::new("Age", FieldKind::Number),
            ],
        }
    }

    #[test]
    fn dispatch_table() {
        assert_eq!(WidgetKind::for_field(&FieldKind::Text), Some(WidgetKind::SingleLine));
        assert_eq!(WidgetKind::for_field(&FieldKind::Email), Some(WidgetKind::SingleLine));
        assert_eq!(WidgetKind::for_field(&FieldKind::Number), Some(WidgetKind::Numeric));
        assert_eq!(WidgetKind::for_field(&FieldKind::Textarea), Some(WidgetKind::MultiLine));
        assert_eq!(WidgetKind::for_field(&FieldKind::Unknown("x".into())), None);
    }

    #[test]
    fn preview_widgets_are_disabled() {
        let form = render(&contact(), RenderMode::Preview, UnknownFieldPolicy::Drop).unwrap();
        assert_eq!(form.widgets.len(), 2);
        assert!(form.widgets.iter().all(|w| w.disabled));
    }

    #[test]
    fn unknown_type_dropped_without_error() {
        let schema = FormSchema {
            title: "T".into(),
            description: String::new(),
            fields: vec![FormField::new("Weird", FieldKind::from("bogus"))],
        };
        let form = render(&schema, RenderMode::Preview, UnknownFieldPolicy::Drop).unwrap();
        assert!(form.widgets.is_empty());
    }

    #[test]
    fn unknown_type_rejected_by_policy() {
        let schema = FormSchema {
            title: "T".into(),
            description: String::new(),
            fields: vec![FormField::new("Weird", FieldKind::from("bogus"))],
        };
        let err = render(&schema, RenderMode::Preview, UnknownFieldPolicy::Reject).unwrap_err();
        assert!(matches!(err, FormsError::UnknownFieldType { ref kind, .. } if kind == "bogus"));
    }

    #[test]
    fn keys_follow_schema_index_across_dropped_fields() {
        let schema = FormSchema {
            title: "T".into(),
            description: String::new(),
            fields: vec![
                FormField::new("A", FieldKind::Text),
                FormField::new("B", FieldKind::from("date")),
                FormField::new("C", FieldKind::Textarea),
            ],
        };
        let form = render(&schema, RenderMode::Live, UnknownFieldPolicy::Drop).unwrap();
        let keys: Vec<_> = form.widgets.iter().map(|w| w.key.as_str()).collect();
        assert_eq!(keys, vec!["f_0", "f_2"]);
        assert!(form.widgets.iter().all(|w| !w.disabled));
    }

    #[test]
    fn contact_submission_in_order() {
        let mut live = LiveForm::new(&contact(), UnknownFieldPolicy::Drop).unwrap();
        assert!(live.set_value("f_0", "Alice"));
        assert!(live.set_value("f_1", "30"));
        let sub = live.submit();
        assert_eq!(
            serde_json::to_string(&sub).unwrap(),
            r#"{"Name":"Alice","Age":"30"}"#
        );
    }

    #[test]
    fn numeric_widget_filters_input() {
        let mut live = LiveForm::new(&contact(), UnknownFieldPolicy::Drop).unwrap();
        live.next_field();
        for c in "3a0.5".chars() {
            live.push_char(c);
        }
        assert_eq!(live.value("f_1"), Some("30.5"));
    }

    #[test]
    fn numeric_widget_keeps_a_partial_number() {
        let mut live = LiveForm::new(&contact(), UnknownFieldPolicy::Drop).unwrap();
        live.next_field();
        for c in "-.-..3-".chars() {
            live.push_char(c);
        }
        assert_eq!(live.value("f_1"), Some("-.3"));
        assert_eq!(live.submit().get("Age"), Some("-.3"));
        assert!("-.3".parse::<f64>().is_ok());
    }

    #[test]
    fn numeric_without_digits_submits_empty() {
        let mut live = LiveForm::new(&contact(), UnknownFieldPolicy::Drop).unwrap();
        live.next_field();
        live.push_char('-');
        live.push_char('.');
        assert_eq!(live.submit().get("Age"), Some(""));
    }

    #[test]
    fn dropped_fields_submit_empty_in_schema_order() {
        let schema = FormSchema {
            title: "T".into(),
            description: String::new(),
            fields: vec![
                FormField::new("A", FieldKind::Text),
                FormField::new("B", FieldKind::from("date")),
                FormField::new("C", FieldKind::Textarea),
            ],
        };
        let mut live = LiveForm::new(&schema, UnknownFieldPolicy::Drop).unwrap();
        live.set_value("f_0", "a");
        live.set_value("f_2", "c");
        assert_eq!(
            serde_json::to_string(&live.submit()).unwrap(),
            r#"{"A":"a","B":"","C":"c"}"#
        );
    }

    #[test]
    fn type_names_are_normalised_before_dispatch() {
        assert_eq!(WidgetKind::for_field(&FieldKind::from("TEXT")), Some(WidgetKind::SingleLine));
        assert_eq!(WidgetKind::for_field(&FieldKind::from("text area")), Some(WidgetKind::MultiLine));
        assert_eq!(WidgetKind::for_field(&FieldKind::from("date")), None);
    }

    #[test]
    fn field_navigation_wraps() {
        let mut live = LiveForm::new(&contact(), UnknownFieldPolicy::Drop).unwrap();
        live.prev_field();
        assert_eq!(live.active(), 1);
        live.next_field();
        assert_eq!(live.active(), 0);
    }

    #[test]
    fn reset_clears_values() {
        let mut live = LiveForm::new(&contact(), UnknownFieldPolicy::Drop).unwrap();
        live.push_char('x');
        live.reset();
        assert_eq!(live.value("f_0"), Some(""));
    }

    #[test]
    fn set_value_unknown_key() {
        let mut live = LiveForm::new(&contact(), UnknownFieldPolicy::Drop).unwrap();
        assert!(!live.set_value("f_9", "nope"));
        assert!(live.set_value_at(1, "41"));
        assert!(!live.set_value_at(2, "nope"));
        assert_eq!(live.value("f_1"), Some("41"));
    }

    #[test]
    fn text_rendering_lists_labels() {
        let form = render(&contact(), RenderMode::Preview, UnknownFieldPolicy::Drop).unwrap();
        let text = form.to_text();
        assert!(text.starts_with("Contact\nd\n"));
        assert!(text.contains("  Name\n"));
        assert!(text.contains("  Age\n"));
    }
}
