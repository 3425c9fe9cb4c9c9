//! Terminal UI state and key handling.
//!
//! [`App`] owns the [`SessionContext`] and everything the three screens need
//! between frames. Key handling never awaits: a key that should start a model
//! call returns [`Command::Generate`] and the event loop runs the call, then
//! hands the result back through [`App::apply_generation`].

use crate::config::{UnknownFieldPolicy, DEFAULT_MAX_DESCRIPTION_CHARS};
use crate::error::FormsError;
use crate::generate::FormRequest;
use crate::output::Generation;
use crate::prompts::EXAMPLE_DESCRIPTIONS;
use crate::render::{LiveForm, WidgetKind};
use crate::schema::FormSubmission;
use crate::session::{PreviewView, SessionContext, Stage};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

/// What the event loop should do after a key press.
#[derive(Debug, Clone)]
pub enum Command {
    /// Run one generation, showing the "Working…" screen meanwhile.
    Generate(FormRequest),
    Quit,
}

/// Focusable parts of the intake screen, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakeFocus {
    #[default]
    ImagePath,
    Description,
    Examples,
    Continue,
}

impl IntakeFocus {
    fn next(self) -> Self {
        match self {
            IntakeFocus::ImagePath => IntakeFocus::Description,
            IntakeFocus::Description => IntakeFocus::Examples,
            IntakeFocus::Examples => IntakeFocus::Continue,
            IntakeFocus::Continue => IntakeFocus::ImagePath,
        }
    }

    fn prev(self) -> Self {
        match self {
            IntakeFocus::ImagePath => IntakeFocus::Continue,
            IntakeFocus::Description => IntakeFocus::ImagePath,
            IntakeFocus::Examples => IntakeFocus::Description,
            IntakeFocus::Continue => IntakeFocus::Examples,
        }
    }
}

/// Text typed on the intake screen.
#[derive(Debug, Clone, Default)]
pub struct IntakeState {
    pub focus: IntakeFocus,
    pub image_path: String,
    pub description: String,
    pub selected_example: usize,
    /// A generation finished since this screen was last entered.
    pub generated: bool,
}

/// One line of feedback under the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// Preview screen buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewButton {
    TryAgain,
    FillForm,
}

pub struct App {
    session: SessionContext,
    policy: UnknownFieldPolicy,
    max_description_chars: usize,
    clipboard: bool,
    pub intake: IntakeState,
    preview_button: PreviewButton,
    live: Option<LiveForm>,
    /// `true` when the Submit button (not a field) has focus.
    submit_focused: bool,
    submission: Option<FormSubmission>,
    working: bool,
    status: Option<StatusLine>,
    splash: bool,
    should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new(UnknownFieldPolicy::default(), DEFAULT_MAX_DESCRIPTION_CHARS)
    }
}

impl App {
    pub fn new(policy: UnknownFieldPolicy, max_description_chars: usize) -> Self {
        Self {
            session: SessionContext::new(),
            policy,
            max_description_chars,
            clipboard: true,
            intake: IntakeState::default(),
            preview_button: PreviewButton::FillForm,
            live: None,
            submit_focused: false,
            submission: None,
            working: false,
            status: None,
            splash: false,
            should_quit: false,
        }
    }

    /// Disable copying examples to the system clipboard.
    pub fn without_clipboard(mut self) -> Self {
        self.clipboard = false;
        self
    }

    /// Open on the landing screen instead of intake.
    pub fn with_splash(mut self) -> Self {
        self.splash = true;
        self
    }

    // ── Accessors used by drawing ────────────────────────────────────────

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    pub fn policy(&self) -> UnknownFieldPolicy {
        self.policy
    }

    pub fn max_description_chars(&self) -> usize {
        self.max_description_chars
    }

    pub fn preview_button(&self) -> PreviewButton {
        self.preview_button
    }

    pub fn live_form(&self) -> Option<&LiveForm> {
        self.live.as_ref()
    }

    pub fn submit_focused(&self) -> bool {
        self.submit_focused
    }

    pub fn submission(&self) -> Option<&FormSubmission> {
        self.submission.as_ref()
    }

    pub fn is_working(&self) -> bool {
        self.working
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn showing_splash(&self) -> bool {
        self.splash
    }

    /// Continue is live only after a generation in the current intake visit.
    pub fn can_continue(&self) -> bool {
        self.intake.generated && self.session.outcome().is_some()
    }

    /// Current preview, or the render error as text.
    pub fn preview(&self) -> Result<PreviewView, FormsError> {
        self.session.preview(self.policy)
    }

    // ── Generation round trip ────────────────────────────────────────────

    /// Show the "Working…" screen until [`App::apply_generation`] runs.
    pub fn begin_generation(&mut self) {
        self.working = true;
        self.intake.generated = false;
        self.status = None;
    }

    /// Store a finished generation.
    ///
    /// Input errors stay on the intake screen as a status line. Transport,
    /// decode and config errors are returned for the caller to end the
    /// session with.
    pub fn apply_generation(&mut self, result: Result<Generation, FormsError>) -> Result<(), FormsError> {
        self.working = false;
        match result {
            Ok(generation) => {
                let mut text = match &generation.image {
                    Some(image) => format!("Received {} ({}x{}). ", image.name, image.width, image.height),
                    None => String::new(),
                };
                match generation.outcome.schema() {
                    Some(schema) => text.push_str(&format!(
                        "Generated \"{}\" with {} fields. Press Continue.",
                        schema.title,
                        schema.fields.len()
                    )),
                    None => text.push_str("The model could not build a form. Press Continue."),
                }
                self.session.store_outcome(generation.outcome);
                self.intake.generated = true;
                self.status = Some(StatusLine { text, is_error: false });
                self.intake.focus = IntakeFocus::Continue;
                Ok(())
            }
            Err(e) if e.is_input_error() => {
                warn!("Intake rejected: {}", e);
                self.status = Some(StatusLine {
                    text: e.to_string(),
                    is_error: true,
                });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // ── Keys ─────────────────────────────────────────────────────────────

    /// Handle one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Some(Command::Quit);
        }
        if self.working {
            return None;
        }
        if self.splash {
            match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.splash = false,
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Some(Command::Quit);
                }
                _ => {}
            }
            return None;
        }

        match self.session.stage() {
            Stage::Intake => self.handle_intake_key(key),
            Stage::Preview => {
                self.handle_preview_key(key);
                None
            }
            Stage::Fill => {
                self.handle_fill_key(key);
                None
            }
        }
    }

    fn handle_intake_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return Some(Command::Quit);
            }
            KeyCode::Tab | KeyCode::Down if self.intake.focus != IntakeFocus::Examples => {
                self.intake.focus = self.intake.focus.next();
            }
            KeyCode::BackTab | KeyCode::Up if self.intake.focus != IntakeFocus::Examples => {
                self.intake.focus = self.intake.focus.prev();
            }
            KeyCode::Tab => self.intake.focus = self.intake.focus.next(),
            KeyCode::BackTab => self.intake.focus = self.intake.focus.prev(),
            KeyCode::Down => {
                self.intake.selected_example = (self.intake.selected_example + 1) % EXAMPLE_DESCRIPTIONS.len();
            }
            KeyCode::Up => {
                self.intake.selected_example = self
                    .intake
                    .selected_example
                    .checked_sub(1)
                    .unwrap_or(EXAMPLE_DESCRIPTIONS.len() - 1);
            }
            KeyCode::Enter => return self.activate_intake(),
            KeyCode::Backspace => match self.intake.focus {
                IntakeFocus::ImagePath => {
                    self.intake.image_path.pop();
                }
                IntakeFocus::Description => {
                    self.intake.description.pop();
                }
                _ => {}
            },
            KeyCode::Char(c) => match self.intake.focus {
                IntakeFocus::ImagePath => self.intake.image_path.push(c),
                IntakeFocus::Description => {
                    if self.intake.description.chars().count() < self.max_description_chars {
                        self.intake.description.push(c);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        None
    }

    fn activate_intake(&mut self) -> Option<Command> {
        match self.intake.focus {
            IntakeFocus::ImagePath => {
                let source = self.intake.image_path.trim().to_string();
                if source.is_empty() {
                    self.status = Some(StatusLine {
                        text: "Enter a path or URL to a PNG or JPEG image".to_string(),
                        is_error: true,
                    });
                    return None;
                }
                Some(Command::Generate(FormRequest::ImageSource(source)))
            }
            IntakeFocus::Description => {
                Some(Command::Generate(FormRequest::Text(self.intake.description.clone())))
            }
            IntakeFocus::Examples => {
                self.copy_example();
                None
            }
            IntakeFocus::Continue => {
                if !self.can_continue() {
                    self.status = Some(StatusLine {
                        text: "Generate a form first: press Enter on the image path or the description".to_string(),
                        is_error: true,
                    });
                    return None;
                }
                self.preview_button = PreviewButton::FillForm;
                self.session.continue_to_preview();
                None
            }
        }
    }

    fn copy_example(&mut self) {
        let example = EXAMPLE_DESCRIPTIONS[self.intake.selected_example % EXAMPLE_DESCRIPTIONS.len()];
        self.intake.description = example.chars().take(self.max_description_chars).collect();
        self.intake.focus = IntakeFocus::Description;

        let text = if self.clipboard {
            match copy_to_clipboard(example) {
                Ok(()) => "Example copied to the description and the clipboard",
                Err(e) => {
                    debug!("Clipboard unavailable: {}", e);
                    "Example copied to the description"
                }
            }
        } else {
            "Example copied to the description"
        };
        self.status = Some(StatusLine {
            text: text.to_string(),
            is_error: false,
        });
    }

    fn handle_preview_key(&mut self, key: KeyEvent) {
        let has_form = matches!(self.preview(), Ok(PreviewView::Form(_)));
        if !has_form {
            self.preview_button = PreviewButton::TryAgain;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right if has_form => {
                self.preview_button = match self.preview_button {
                    PreviewButton::TryAgain => PreviewButton::FillForm,
                    PreviewButton::FillForm => PreviewButton::TryAgain,
                };
            }
            KeyCode::Esc => self.try_again(),
            KeyCode::Enter => match self.preview_button {
                PreviewButton::TryAgain => self.try_again(),
                PreviewButton::FillForm => self.fill_form(),
            },
            _ => {}
        }
    }

    fn try_again(&mut self) {
        self.session.try_again();
        self.status = None;
        self.intake.focus = IntakeFocus::ImagePath;
        self.intake.generated = false;
    }

    fn fill_form(&mut self) {
        match self.session.live_form(self.policy) {
            Ok(live) => {
                self.live = live;
                self.submit_focused = self.live.as_ref().is_none_or(|l| l.widgets().is_empty());
                self.submission = None;
                self.session.fill_form();
            }
            Err(e) => {
                self.status = Some(StatusLine {
                    text: e.to_string(),
                    is_error: true,
                });
            }
        }
    }

    fn handle_fill_key(&mut self, key: KeyEvent) {
        if self.submission.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.start_over();
            }
            return;
        }

        let Some(live) = self.live.as_mut() else {
            if key.code == KeyCode::Enter {
                self.submission = Some(FormSubmission::new());
            }
            return;
        };
        let count = live.widgets().len();
        let multiline = live.active_widget().map(|w| w.kind) == Some(WidgetKind::MultiLine);

        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                if self.submit_focused {
                    self.submit_focused = count == 0;
                    live.reset_focus();
                } else if live.active() + 1 == count {
                    self.submit_focused = true;
                } else {
                    live.next_field();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if self.submit_focused {
                    self.submit_focused = count == 0;
                    live.focus_last();
                } else if live.active() == 0 {
                    self.submit_focused = true;
                } else {
                    live.prev_field();
                }
            }
            KeyCode::Enter if self.submit_focused => self.submit(),
            KeyCode::Enter if multiline => live.push_char('\n'),
            KeyCode::Enter => {
                if live.active() + 1 == count {
                    self.submit_focused = true;
                } else {
                    live.next_field();
                }
            }
            KeyCode::Backspace if !self.submit_focused => live.pop_char(),
            KeyCode::Char(c) if !self.submit_focused => live.push_char(c),
            _ => {}
        }
    }

    fn submit(&mut self) {
        if let Some(live) = self.live.as_mut() {
            let submission = live.submit();
            debug!("Submitted {} values", submission.len());
            live.reset();
            self.submission = Some(submission);
        }
    }

    fn start_over(&mut self) {
        self.session.start_over();
        self.live = None;
        self.submission = None;
        self.submit_focused = false;
        self.status = None;
        self.intake = IntakeState::default();
    }
}

fn copy_to_clipboard(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::GenerationStats;
    use crate::pipeline::gateway::Endpoint;
    use crate::schema::{FieldKind, FormField, FormSchema, SchemaOutcome};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn generation(outcome: SchemaOutcome) -> Generation {
        Generation {
            outcome,
            raw: String::new(),
            endpoint: Endpoint::Text,
            image: None,
            stats: GenerationStats::default(),
        }
    }

    fn refusal() -> SchemaOutcome {
        SchemaOutcome::Refusal {
            reason: "Invalid input".into(),
        }
    }

    fn tab_to_continue(app: &mut App) {
        for _ in 0..3 {
            app.handle_key(key(KeyCode::Tab));
        }
        assert_eq!(app.intake.focus, IntakeFocus::Continue);
    }

    fn contact() -> SchemaOutcome {
        SchemaOutcome::Schema(FormSchema {
            title: "Contact".into(),
            description: "d".into(),
            fields: vec![
                FormField::new("Name", FieldKind::Text),
                FormField::new("Age", FieldKind::Number),
            ],
        })
    }

    #[test]
    fn description_enter_requests_text_generation() {
        let mut app = App::default().without_clipboard();
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "contact form");
        match app.handle_key(key(KeyCode::Enter)) {
            Some(Command::Generate(FormRequest::Text(t))) => assert_eq!(t, "contact form"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn description_is_bounded() {
        let mut app = App::new(UnknownFieldPolicy::Drop, 5).without_clipboard();
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "abcdefgh");
        assert_eq!(app.intake.description, "abcde");
    }

    #[test]
    fn image_path_enter_requests_image_generation() {
        let mut app = App::default().without_clipboard();
        type_str(&mut app, "form.png");
        assert!(matches!(
            app.handle_key(key(KeyCode::Enter)),
            Some(Command::Generate(FormRequest::ImageSource(ref s))) if s == "form.png"
        ));
    }

    #[test]
    fn empty_image_path_sets_status() {
        let mut app = App::default().without_clipboard();
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert!(app.status().unwrap().is_error);
    }

    #[test]
    fn example_is_copied_into_description() {
        let mut app = App::default().without_clipboard();
        app.intake.focus = IntakeFocus::Examples;
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.intake.description, EXAMPLE_DESCRIPTIONS[1]);
        assert_eq!(app.intake.focus, IntakeFocus::Description);
    }

    #[test]
    fn input_error_stays_on_intake() {
        let mut app = App::default().without_clipboard();
        app.begin_generation();
        app.apply_generation(Err(FormsError::EmptyDescription)).unwrap();
        assert!(!app.is_working());
        assert_eq!(app.stage(), Stage::Intake);
        assert!(app.status().unwrap().is_error);
    }

    #[test]
    fn transport_error_is_returned() {
        let mut app = App::default().without_clipboard();
        let err = app
            .apply_generation(Err(FormsError::Transport {
                message: "down".into(),
            }))
            .unwrap_err();
        assert!(matches!(err, FormsError::Transport { .. }));
    }

    #[test]
    fn refusal_then_try_again() {
        let mut app = App::default().without_clipboard();
        app.apply_generation(Ok(generation(SchemaOutcome::Refusal {
            reason: "Invalid input".into(),
        })))
        .unwrap();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.stage(), Stage::Preview);
        assert!(matches!(app.preview(), Ok(PreviewView::Refusal { .. })));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.stage(), Stage::Intake);
    }

    #[test]
    fn fill_and_submit_contact_form() {
        let mut app = App::default().without_clipboard();
        app.apply_generation(Ok(generation(contact()))).unwrap();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.preview_button(), PreviewButton::FillForm);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.stage(), Stage::Fill);

        type_str(&mut app, "Alice");
        app.handle_key(key(KeyCode::Enter));
        type_str(&mut app, "3x0");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.submit_focused());
        app.handle_key(key(KeyCode::Enter));

        let sub = app.submission().unwrap();
        assert_eq!(
            serde_json::to_string(sub).unwrap(),
            r#"{"Name":"Alice","Age":"30"}"#
        );

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.stage(), Stage::Intake);
        assert!(app.submission().is_none());
    }

    #[test]
    fn ctrl_c_quits_anywhere() {
        let mut app = App::default().without_clipboard();
        app.begin_generation();
        let cmd = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(cmd, Some(Command::Quit)));
        assert!(app.should_quit());
    }

    #[test]
    fn continue_before_any_generation_does_nothing() {
        let mut app = App::default().without_clipboard();
        assert!(!app.can_continue());
        tab_to_continue(&mut app);
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        assert_eq!(app.stage(), Stage::Intake);
        assert!(app.status().unwrap().is_error);
    }

    #[test]
    fn try_again_then_continue_does_not_replay_the_refusal() {
        let mut app = App::default().without_clipboard();
        app.apply_generation(Ok(generation(refusal()))).unwrap();
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.preview(), Ok(PreviewView::Refusal { .. })));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.stage(), Stage::Intake);

        tab_to_continue(&mut app);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.stage(), Stage::Intake);
        assert!(!app.can_continue());
    }

    #[test]
    fn start_over_requires_a_new_generation() {
        let mut app = App::default().without_clipboard();
        app.apply_generation(Ok(generation(contact()))).unwrap();
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::BackTab));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.stage(), Stage::Intake);

        tab_to_continue(&mut app);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.stage(), Stage::Intake);
    }

    #[test]
    fn failed_regeneration_disables_continue() {
        let mut app = App::default().without_clipboard();
        app.apply_generation(Ok(generation(contact()))).unwrap();
        assert!(app.can_continue());
        app.begin_generation();
        app.apply_generation(Err(FormsError::EmptyDescription)).unwrap();
        assert!(!app.can_continue());
    }

    #[test]
    fn image_generation_names_the_upload() {
        let mut app = App::default().without_clipboard();
        let mut gen = generation(contact());
        gen.image = Some(crate::output::SourceImage {
            name: "scan.png".into(),
            width: 800,
            height: 600,
        });
        app.apply_generation(Ok(gen)).unwrap();
        assert!(app.status().unwrap().text.starts_with("Received scan.png (800x600). Generated"));
    }

    #[test]
    fn splash_waits_for_enter() {
        let mut app = App::default().without_clipboard().with_splash();
        type_str(&mut app, "abc");
        assert!(app.showing_splash());
        assert_eq!(app.intake.image_path, "");
        app.handle_key(key(KeyCode::Enter));
        assert!(!app.showing_splash());
        assert_eq!(app.stage(), Stage::Intake);
    }

    #[test]
    fn splash_esc_quits() {
        let mut app = App::default().without_clipboard().with_splash();
        assert!(matches!(app.handle_key(key(KeyCode::Esc)), Some(Command::Quit)));
    }

    #[test]
    fn keys_ignored_while_working() {
        let mut app = App::default().without_clipboard();
        app.begin_generation();
        type_str(&mut app, "abc");
        assert_eq!(app.intake.image_path, "");
    }
}
