//! Per-session state: which screen is showing and what the model returned.
//!
//! A [`SessionContext`] is created when the session starts, passed to every
//! handler, and dropped when the session ends. Stage changes are
//! unconditional: moving to Preview without an outcome is allowed and shows
//! an empty preview.

use crate::config::UnknownFieldPolicy;
use crate::error::FormsError;
use crate::prompts::REFUSAL_MESSAGE;
use crate::render::{render, LiveForm, RenderMode, RenderedForm};
use crate::schema::SchemaOutcome;
use tracing::debug;

/// The three screens, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Stage {
    #[default]
    Intake = 0,
    Preview = 1,
    Fill = 2,
}

impl TryFrom<u8> for Stage {
    type Error = FormsError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(Stage::Intake),
            1 => Ok(Stage::Preview),
            2 => Ok(Stage::Fill),
            other => Err(FormsError::InvalidStage(other)),
        }
    }
}

/// What the Preview screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewView {
    /// The model refused; show the fixed warning and a Try Again button.
    Refusal { message: &'static str, reason: String },
    /// A disabled rendering of the schema.
    Form(RenderedForm),
    /// Nothing generated yet.
    Empty,
}

/// Session state plus the transitions the UI buttons trigger.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    stage: Stage,
    outcome: Option<SchemaOutcome>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn outcome(&self) -> Option<&SchemaOutcome> {
        self.outcome.as_ref()
    }

    /// Set the stage. No guards.
    pub fn set_stage(&mut self, stage: Stage) {
        if self.stage != stage {
            debug!("Stage {:?} → {:?}", self.stage, stage);
        }
        self.stage = stage;
    }

    /// Set the stage by index (0, 1 or 2).
    pub fn set_stage_index(&mut self, n: u8) -> Result<(), FormsError> {
        self.set_stage(Stage::try_from(n)?);
        Ok(())
    }

    /// Replace the stored outcome with a fresh generation result.
    pub fn store_outcome(&mut self, outcome: SchemaOutcome) {
        self.outcome = Some(outcome);
    }

    /// "Continue" on the intake screen.
    pub fn continue_to_preview(&mut self) {
        self.set_stage(Stage::Preview);
    }

    /// "Try Again" on the preview screen.
    pub fn try_again(&mut self) {
        self.set_stage(Stage::Intake);
    }

    /// "Fill Form" on the preview screen.
    pub fn fill_form(&mut self) {
        self.set_stage(Stage::Fill);
    }

    /// "Start Over" after submission.
    pub fn start_over(&mut self) {
        self.set_stage(Stage::Intake);
    }

    /// View for the Preview screen.
    pub fn preview(&self, policy: UnknownFieldPolicy) -> Result<PreviewView, FormsError> {
        match self.outcome {
            None => Ok(PreviewView::Empty),
            Some(SchemaOutcome::Refusal { ref reason }) => Ok(PreviewView::Refusal {
                message: REFUSAL_MESSAGE,
                reason: reason.clone(),
            }),
            Some(SchemaOutcome::Schema(ref schema)) => {
                Ok(PreviewView::Form(render(schema, RenderMode::Preview, policy)?))
            }
        }
    }

    /// A fresh live form for the Fill screen; `None` unless a schema is stored.
    pub fn live_form(&self, policy: UnknownFieldPolicy) -> Result<Option<LiveForm>, FormsError> {
        match self.outcome.as_ref().and_then(SchemaOutcome::schema) {
            Some(schema) => Ok(Some(LiveForm::new(schema, policy)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, FormField, FormSchema};

    fn schema() -> SchemaOutcome {
        SchemaOutcome::Schema(FormSchema {
            title: "Contact".into(),
            description: "d".into(),
            fields: vec![FormField::new("Name", FieldKind::Text)],
        })
    }

    #[test]
    fn starts_at_intake_without_outcome() {
        let s = SessionContext::new();
        assert_eq!(s.stage(), Stage::Intake);
        assert!(s.outcome().is_none());
    }

    #[test]
    fn set_stage_is_idempotent() {
        let mut s = SessionContext::new();
        s.store_outcome(schema());
        s.set_stage(Stage::Preview);
        let once = (s.stage(), s.outcome().cloned());
        s.set_stage(Stage::Preview);
        assert_eq!((s.stage(), s.outcome().cloned()), once);
    }

    #[test]
    fn set_stage_has_no_guards() {
        let mut s = SessionContext::new();
        s.set_stage(Stage::Fill);
        assert_eq!(s.stage(), Stage::Fill);
        assert!(s.live_form(UnknownFieldPolicy::Drop).unwrap().is_none());
    }

    #[test]
    fn stage_index_bounds() {
        let mut s = SessionContext::new();
        s.set_stage_index(2).unwrap();
        assert_eq!(s.stage(), Stage::Fill);
        assert!(matches!(s.set_stage_index(3), Err(FormsError::InvalidStage(3))));
        assert_eq!(s.stage(), Stage::Fill);
    }

    #[test]
    fn refusal_routes_to_warning_then_back_to_intake() {
        let mut s = SessionContext::new();
        s.store_outcome(SchemaOutcome::Refusal {
            reason: "Invalid input".into(),
        });
        s.continue_to_preview();
        match s.preview(UnknownFieldPolicy::Drop).unwrap() {
            PreviewView::Refusal { message, reason } => {
                assert_eq!(message, REFUSAL_MESSAGE);
                assert_eq!(reason, "Invalid input");
            }
            other => panic!("expected refusal, got {other:?}"),
        }
        s.try_again();
        assert_eq!(s.stage(), Stage::Intake);
    }

    #[test]
    fn full_cycle() {
        let mut s = SessionContext::new();
        s.store_outcome(schema());
        s.continue_to_preview();
        assert!(matches!(
            s.preview(UnknownFieldPolicy::Drop).unwrap(),
            PreviewView::Form(_)
        ));
        s.fill_form();
        assert_eq!(s.stage(), Stage::Fill);
        assert!(s.live_form(UnknownFieldPolicy::Drop).unwrap().is_some());
        s.start_over();
        assert_eq!(s.stage(), Stage::Intake);
    }

    #[test]
    fn empty_preview() {
        let s = SessionContext::new();
        assert_eq!(s.preview(UnknownFieldPolicy::Drop).unwrap(), PreviewView::Empty);
    }
}
