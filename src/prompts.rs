//! Prompts for turning an image or a description into a form schema.
//!
//! Both variants show the model the exact JSON shape we decode (few-shot by
//! example, nothing is schema-enforced on the provider side) and the shape of
//! a refusal. [`crate::pipeline::parse`] is the other half of this contract.

use crate::error::FormsError;
use crate::schema::{FieldKind, FormField, FormSchema};

/// Example reply embedded in both prompts.
pub const EXAMPLE_RESPONSE: &str = r#"{
    "title": "Form title",
    "description": "A description about what form is for",
    "fields": [
        { "label": "Field 1 Name", "type": "text" },
        { "label": "Field 2 Name", "type": "number" }
    ]
}"#;

/// Reply the model must send when the input is not about a form.
pub const REFUSAL_RESPONSE: &str = r#"{ "status": "invalid", "reason": "Why the input is not a form" }"#;

/// Instruction sent together with the uploaded image.
pub const IMAGE_PROMPT: &str = r#"You are going to help me create a form. For this task you will be given an image of a form. Your task is to identify all the fields the form should have as shown in the image, along with their type such as text, email, textarea, number and so on. Once you have found all the fields and figured out their types, you have to respond with the data in JSON format as shown in the next example."#;

/// Instruction sent before the user's description.
pub const TEXT_PROMPT: &str = r#"You are going to help me create a form. For this task you will be given a description about the form and its fields. Your task is to identify all the fields the form should have based on the given description along with their type such as text, email, textarea, number and so on. Once you have found all the fields and figured out their types, you have to respond with the data in JSON format as shown in the next example."#;

/// Copyable example descriptions shown on the intake screen.
pub const EXAMPLE_DESCRIPTIONS: &[&str] = &[
    "Please create a contact form having name, email, and message fields.",
    "I am an event manager. I would like to create a signup form for an event. The form should ask for details like name, email, job role, and company name.",
];

/// Warning shown when the model refuses the input.
pub const REFUSAL_MESSAGE: &str = "Sorry! We couldn't build a form based on your input. Please make sure that you upload an image with a form or enter details such as what fields it should have while describing your form. This app can only handle form related inputs.";

fn response_contract(subject: &str) -> String {
    format!(
        "Example Response Format:\n{EXAMPLE_RESPONSE}\n\n\
         You should only respond in JSON format. If the given {subject} is not about a form \
         then respond with exactly this JSON instead:\n{REFUSAL_RESPONSE}"
    )
}

/// Full prompt for the image variant. The image travels as an attachment.
pub fn image_prompt() -> String {
    format!("{IMAGE_PROMPT}\n{}", response_contract("image"))
}

/// Full prompt for the text variant.
///
/// The description is trimmed and bounded to `max_chars` characters.
pub fn text_prompt(description: &str, max_chars: usize) -> Result<String, FormsError> {
    let description = validate_description(description, max_chars)?;
    Ok(format!(
        "{TEXT_PROMPT}\n{}\n\nDescription:\n\n{description}",
        response_contract("data")
    ))
}

/// Trim the description and enforce the character bound.
pub fn validate_description(description: &str, max_chars: usize) -> Result<&str, FormsError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(FormsError::EmptyDescription);
    }
    let len = trimmed.chars().count();
    if len > max_chars {
        return Err(FormsError::DescriptionTooLong { len, max: max_chars });
    }
    Ok(trimmed)
}

/// The schema the intake screen shows as an illustration.
pub fn example_schema() -> FormSchema {
    FormSchema {
        title: "Form Example Title".to_string(),
        description: "Example Form".to_string(),
        fields: vec![
            FormField::new("Name", FieldKind::Text),
            FormField::new("E-Mail", FieldKind::Email),
            FormField::new("Message", FieldKind::Textarea),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_response_is_valid_schema_json() {
        let schema: FormSchema = serde_json::from_str(EXAMPLE_RESPONSE).unwrap();
        assert_eq!(schema.fields.len(), 2);
        assert_eq!(schema.fields[1].kind, FieldKind::Number);
    }

    #[test]
    fn both_variants_carry_the_contract() {
        let image = image_prompt();
        let text = text_prompt("a contact form", 256).unwrap();
        for p in [&image, &text] {
            assert!(p.contains(EXAMPLE_RESPONSE));
            assert!(p.contains(REFUSAL_RESPONSE));
            assert!(p.contains("only respond in JSON"));
        }
        assert!(image.contains("image of a form"));
        assert!(text.ends_with("a contact form"));
    }

    #[test]
    fn description_is_trimmed() {
        let p = text_prompt("   survey with 3 questions \n", 256).unwrap();
        assert!(p.ends_with("Description:\n\nsurvey with 3 questions"));
    }

    #[test]
    fn empty_description_rejected() {
        assert!(matches!(
            text_prompt("   ", 256),
            Err(FormsError::EmptyDescription)
        ));
    }

    #[test]
    fn description_bound_counts_chars_not_bytes() {
        let ok = "é".repeat(256);
        assert!(validate_description(&ok, 256).is_ok());
        let too_long = "é".repeat(257);
        assert!(matches!(
            validate_description(&too_long, 256),
            Err(FormsError::DescriptionTooLong { len: 257, max: 256 })
        ));
    }

    #[test]
    fn examples_fit_the_bound() {
        for ex in EXAMPLE_DESCRIPTIONS {
            assert!(validate_description(ex, 256).is_ok(), "{ex}");
        }
    }
}
