//! CLI binary for nextgen-forms.
//!
//! With `--describe` or `--image` it makes one generation and prints the
//! result. Without them it opens the interactive terminal UI.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use indicatif::{ProgressBar, ProgressStyle};
use nextgen_forms::prompts::{EXAMPLE_DESCRIPTIONS, REFUSAL_MESSAGE};
use nextgen_forms::ui::{self, App, Command};
use nextgen_forms::{
    render, write_schema_to_file, Endpoint, FormGenerator, FormRequest, GenerationProgressCallback, GeneratorConfig,
    ProgressCallback, RenderMode, SchemaOutcome, UnknownFieldPolicy,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while the single model call is in flight.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::hidden();
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        Arc::new(Self { bar })
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_request_start(&self, endpoint: Endpoint) {
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.set_prefix("Working…");
        self.bar.set_message(format!("asking the {endpoint} model"));
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_request_complete(&self, endpoint: Endpoint, reply_len: usize, duration_ms: u64, refused: bool) {
        self.bar.finish_and_clear();
        let mark = if refused { yellow("⚠") } else { green("✓") };
        eprintln!(
            "{} {} model replied  {}  {}",
            mark,
            endpoint,
            dim(&format!("{reply_len} chars")),
            dim(&format!("{:.1}s", duration_ms as f64 / 1000.0)),
        );
    }

    fn on_request_error(&self, endpoint: Endpoint, error: &str) {
        self.bar.finish_and_clear();
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        eprintln!("{} {} model: {}", red("✗"), endpoint, red(&msg));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive terminal UI
  nextforms

  # Generate from a description and print a preview
  nextforms --describe "A contact form with name, email and message"

  # Generate from a picture of a paper form, save the schema as JSON
  nextforms --image scan.jpg --output contact.json

  # Image from a URL, JSON on stdout
  nextforms --image https://example.com/form.png --json

  # Print the built-in example descriptions
  nextforms --examples

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override the model of both endpoints
  RUST_LOG                Log filter (interactive mode logs to --log-file)
"#;

/// Generate fillable forms from an image or a description using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "nextforms",
    version,
    about = "Generate fillable forms from an image or a description using an LLM",
    long_about = "Turn a picture of a form (PNG/JPEG, local path or URL) or a short description \
into a form schema with a hosted language model, preview it, fill it in and see the submitted \
values. Runs an interactive terminal UI unless --describe or --image is given.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Describe the form in words (at most 256 characters).
    #[arg(long, conflicts_with = "image")]
    describe: Option<String>,

    /// Local path or HTTP/HTTPS URL of a PNG or JPEG image of a form.
    #[arg(long)]
    image: Option<String>,

    /// Print the generated schema as JSON instead of a preview.
    #[arg(long, env = "NEXTFORMS_JSON")]
    json: bool,

    /// Also write the schema as JSON to this file.
    #[arg(short, long, env = "NEXTFORMS_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the example descriptions and exit.
    #[arg(long)]
    examples: bool,

    /// Model for image input (default: gpt-4o).
    #[arg(long, env = "NEXTFORMS_VISION_MODEL")]
    vision_model: Option<String>,

    /// Model for text input (default: gpt-4-turbo).
    #[arg(long, env = "NEXTFORMS_TEXT_MODEL")]
    text_model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "NEXTFORMS_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max output tokens for image requests.
    #[arg(long, env = "NEXTFORMS_IMAGE_MAX_TOKENS", default_value_t = 500)]
    image_max_tokens: usize,

    /// Max output tokens for text requests.
    #[arg(long, env = "NEXTFORMS_TEXT_MAX_TOKENS", default_value_t = 500)]
    text_max_tokens: usize,

    /// What to do with field types other than text, email, number, textarea.
    #[arg(long, env = "NEXTFORMS_UNKNOWN_FIELDS", value_enum, default_value = "drop")]
    unknown_fields: UnknownFieldsArg,

    /// HTTP download timeout in seconds for image URLs.
    #[arg(long, env = "NEXTFORMS_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Model call timeout in seconds (0 = no timeout).
    #[arg(long, env = "NEXTFORMS_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Write logs here in interactive mode.
    #[arg(long, env = "NEXTFORMS_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Disable the spinner.
    #[arg(long, env = "NEXTFORMS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NEXTFORMS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "NEXTFORMS_QUIET")]
    quiet: bool,
}

impl Cli {
    fn one_shot(&self) -> Option<FormRequest> {
        if let Some(ref text) = self.describe {
            return Some(FormRequest::Text(text.clone()));
        }
        self.image.clone().map(FormRequest::ImageSource)
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum UnknownFieldsArg {
    Drop,
    Reject,
}

impl From<UnknownFieldsArg> for UnknownFieldPolicy {
    fn from(v: UnknownFieldsArg) -> Self {
        match v {
            UnknownFieldsArg::Drop => UnknownFieldPolicy::Drop,
            UnknownFieldsArg::Reject => UnknownFieldPolicy::Reject,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.examples {
        for example in EXAMPLE_DESCRIPTIONS {
            println!("{example}");
        }
        return Ok(());
    }

    match cli.one_shot() {
        Some(request) => run_one_shot(&cli, request).await,
        None => {
            init_tui_logging(&cli)?;
            let config = build_config(&cli, None)?;
            if let Err(err) = run_tui(config).await {
                eprintln!("Error: {err:?}");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Map CLI args to `GeneratorConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GeneratorConfig> {
    let mut builder = GeneratorConfig::builder()
        .temperature(cli.temperature)
        .image_max_tokens(cli.image_max_tokens)
        .text_max_tokens(cli.text_max_tokens)
        .unknown_fields(cli.unknown_fields.clone().into())
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.vision_model {
        builder = builder.vision_model(model);
    }
    if let Some(ref model) = cli.text_model {
        builder = builder.text_model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

// ── One-shot mode ────────────────────────────────────────────────────────────

async fn run_one_shot(cli: &Cli, request: FormRequest) -> Result<()> {
    // The spinner provides the feedback that matters; INFO logs would
    // interleave with it.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, progress_cb)?;
    let policy = config.unknown_fields;

    let generator = FormGenerator::from_config(config).context("Failed to set up the model provider")?;
    let generation = generator.generate(request).await.context("Form generation failed")?;

    let schema = match generation.outcome {
        SchemaOutcome::Schema(ref schema) => schema,
        SchemaOutcome::Refusal { ref reason } => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&generation.outcome).context("Failed to serialise output")?
                );
            }
            eprintln!("{} {}", yellow("⚠"), REFUSAL_MESSAGE);
            if !cli.quiet {
                eprintln!("   {}", dim(&format!("model said: {reason}")));
            }
            std::process::exit(2);
        }
    };

    if let Some(ref path) = cli.output {
        write_schema_to_file(schema, path)
            .await
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        if !cli.quiet {
            eprintln!("{}  schema  →  {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(schema).context("Failed to serialise schema")?
        );
    } else {
        let preview = render(schema, RenderMode::Preview, policy).context("Failed to render the form")?;
        print!("{}", preview.to_text());
        if !cli.quiet {
            eprintln!(
                "{}",
                dim(&format!(
                    "{} fields via {} in {}ms",
                    preview.widgets.len(),
                    generation.stats.model,
                    generation.stats.duration_ms
                ))
            );
        }
    }

    Ok(())
}

// ── Interactive mode ─────────────────────────────────────────────────────────

/// Logging must not touch the alternate screen: write to `--log-file`, or to
/// `nextforms.log` when only `RUST_LOG` is set, or nowhere.
fn init_tui_logging(cli: &Cli) -> Result<()> {
    let path = match (&cli.log_file, std::env::var_os("RUST_LOG")) {
        (Some(path), _) => path.clone(),
        (None, Some(_)) => PathBuf::from("nextforms.log"),
        (None, None) => return Ok(()),
    };
    let file = std::fs::File::create(&path).with_context(|| format!("Failed to open log file {}", path.display()))?;
    let default = if cli.verbose { "nextgen_forms=debug" } else { "nextgen_forms=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}

async fn run_tui(config: GeneratorConfig) -> Result<()> {
    let mut app = App::new(config.unknown_fields, config.max_description_chars).with_splash();
    // Resolve the provider before touching the terminal so setup errors print normally.
    let generator = FormGenerator::from_config(config).context("Failed to set up the model provider")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &generator).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    generator: &FormGenerator,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key) {
                    Some(Command::Quit) => return Ok(()),
                    Some(Command::Generate(request)) => {
                        app.begin_generation();
                        terminal.draw(|frame| ui::draw(frame, app))?;
                        let result = generator.generate(request).await;
                        app.apply_generation(result).context("Form generation failed")?;
                    }
                    None => {}
                }
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
