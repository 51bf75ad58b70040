//! CLI binary for jobsnap.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables onto the config types and prints results.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use jobsnap::confirm::confirm_fields;
use jobsnap::{
    archive, compress_blocking, compress_file, document_filename, enrich_descriptions, extract, AcceptExtracted,
    ArchiveConfig, BoundedDocument, CompressionBudget, CompressionProgress, FieldConfirmer,
    LlmSummarizer, NotionConfig, NotionStore, PageRenderer, ProgressCallback, SavedCapture,
    StdinConfirmer, SummaryConfig,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

/// Spinner that shows the current compression attempt.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(budget: &CompressionBudget) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Compressing");
        bar.set_message(format!("target ≤ {:.2} MB", budget.max_megabytes()));
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn hidden() -> Arc<Self> {
        Arc::new(Self {
            bar: ProgressBar::hidden(),
        })
    }
}

impl CompressionProgress for CliProgress {
    fn on_attempt(&self, attempt: u32, width: u32, height: u32) {
        self.bar
            .set_message(format!("attempt {attempt}: {width}×{height}"));
    }

    fn on_attempt_complete(&self, attempt: u32, bytes: u64) {
        self.bar.println(format!(
            "  {} attempt {attempt}  {}",
            dim("·"),
            dim(&format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0)))
        ));
    }

    fn on_accepted(&self, _document: &BoundedDocument) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Archive a listing captured by an external browser
  jobsnap archive https://acme.wd5.myworkdayjobs.com/jobs/123 \
      --screenshot captures/listing.png --html captures/listing.html

  # Accept the extracted fields without prompting, keep the PDF
  jobsnap archive <URL> --screenshot shot.png --html page.html --yes --keep

  # Only look at what the extractor finds
  jobsnap extract <URL> --html page.html --json

  # Compress a screenshot into a ≤ 2 MB PDF
  jobsnap compress shot.png -o listing.pdf --max-mb 2

  # Fill in missing company descriptions
  jobsnap describe --provider groq

ENVIRONMENT VARIABLES:
  NOTION_TOKEN                Notion integration token
  NOTION_DATABASE_ID          Target database
  NOTION_VERSION              Notion-Version header (default 2022-06-28)
  NOTION_FILES_PROPERTY_NAME  Files property for the PDF (default Description; empty disables)
  MAX_PDF_MB                  Document size budget in MB (default 5)
  EDGEQUAKE_PROVIDER          LLM provider for `describe`
  EDGEQUAKE_MODEL             LLM model for `describe`
  GROQ_API_KEY, OPENAI_API_KEY, …  provider credentials
"#;

/// Archive job listings as size-bounded PDFs in a Notion database.
#[derive(Parser, Debug)]
#[command(
    name = "jobsnap",
    version,
    about = "Archive job listings as size-bounded PDFs in a Notion database",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "JOBSNAP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "JOBSNAP_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract, confirm, compress, upload, and create a record.
    Archive(ArchiveArgs),
    /// Print the title and company found in saved HTML.
    Extract(ExtractArgs),
    /// Compress a screenshot into a size-bounded PDF.
    Compress(CompressArgs),
    /// Generate missing company descriptions for existing records.
    Describe(DescribeArgs),
}

#[derive(Args, Debug)]
struct NotionArgs {
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    notion_token: Option<String>,

    #[arg(long, env = "NOTION_DATABASE_ID")]
    database_id: Option<String>,

    #[arg(long, env = "NOTION_VERSION", default_value = "2022-06-28")]
    notion_version: String,
}

impl NotionArgs {
    fn store(&self) -> Result<NotionStore> {
        let (Some(token), Some(db)) = (self.notion_token.as_deref(), self.database_id.as_deref())
        else {
            bail!("NOTION_TOKEN and NOTION_DATABASE_ID must be set (environment or flags)");
        };
        let config = NotionConfig::new(token, db).with_api_version(&self.notion_version);
        NotionStore::new(config).context("Failed to set up the Notion client")
    }
}

#[derive(Args, Debug)]
struct ArchiveArgs {
    /// Job listing URL.
    url: String,

    /// Full-page screenshot of the listing (PNG or JPEG).
    #[arg(long)]
    screenshot: PathBuf,

    /// Rendered HTML of the listing.
    #[arg(long)]
    html: PathBuf,

    /// Accept extracted title and company without prompting.
    #[arg(short, long)]
    yes: bool,

    /// Create the record without uploading the PDF.
    #[arg(long)]
    no_upload: bool,

    /// Extract and compress only; touch nothing remote.
    #[arg(long)]
    dry_run: bool,

    /// Keep the generated PDF after a successful upload.
    #[arg(long)]
    keep: bool,

    /// Directory for the generated PDF.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Files property the PDF is attached to; empty disables attaching.
    #[arg(long, env = "NOTION_FILES_PROPERTY_NAME", default_value = "Description")]
    files_property: String,

    /// Document size budget in megabytes.
    #[arg(long, env = "MAX_PDF_MB", default_value_t = 5.0)]
    max_mb: f64,

    #[command(flatten)]
    notion: NotionArgs,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// URL the HTML was served from.
    url: String,

    /// Saved HTML file.
    #[arg(long)]
    html: PathBuf,

    /// Print the full result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Screenshot to compress.
    input: PathBuf,

    /// Output PDF path.
    #[arg(short, long)]
    output: PathBuf,

    /// Document size budget in megabytes.
    #[arg(long, env = "MAX_PDF_MB", default_value_t = 5.0)]
    max_mb: f64,
}

#[derive(Args, Debug)]
struct DescribeArgs {
    /// LLM provider (groq, openai, anthropic, …). Auto-detected if unset.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Longest description kept, in characters.
    #[arg(long, default_value_t = 400)]
    max_chars: usize,

    #[command(flatten)]
    notion: NotionArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Archive(args) => run_archive(args, cli.quiet).await,
        Command::Extract(args) => run_extract(args),
        Command::Compress(args) => run_compress(args, cli.quiet).await,
        Command::Describe(args) => run_describe(args, cli.quiet).await,
    }
}

fn progress_for(budget: &CompressionBudget, quiet: bool) -> ProgressCallback {
    if quiet {
        CliProgress::hidden()
    } else {
        CliProgress::new(budget)
    }
}

fn archive_config(args: &ArchiveArgs) -> Result<ArchiveConfig> {
    ArchiveConfig::builder()
        .budget(CompressionBudget::from_megabytes(args.max_mb))
        .files_property(Some(args.files_property.clone()))
        .upload_document(!args.no_upload)
        .output_dir(&args.output_dir)
        .build()
        .context("Invalid archive configuration")
}

fn report_document(doc: &BoundedDocument, budget: &CompressionBudget) {
    let size = format!("{:.2} MB", doc.size_megabytes());
    let size = if doc.within_budget() {
        green(&size)
    } else {
        yellow(&format!("{size} (over {:.2} MB budget)", budget.max_megabytes()))
    };
    eprintln!(
        "{} PDF {}  {}  {}",
        green("✓"),
        bold(&doc.path.display().to_string()),
        size,
        dim(&format!("{}×{}, {} attempts", doc.width, doc.height, doc.attempts.len()))
    );
}

async fn run_archive(args: ArchiveArgs, quiet: bool) -> Result<()> {
    let config = archive_config(&args)?;
    let capture = SavedCapture::new(&args.screenshot, &args.html)
        .render(&args.url)
        .await
        .context("Failed to load the capture")?;

    let mut confirmer: Box<dyn FieldConfirmer> = if args.yes {
        Box::new(AcceptExtracted)
    } else {
        Box::new(StdinConfirmer::stdio())
    };
    let progress = progress_for(&config.budget, quiet);

    if args.dry_run {
        let fields = confirm_fields(extract(&capture.html, &capture.source_url), confirmer.as_mut());
        let name = document_filename(
            chrono::Local::now().date_naive(),
            &fields.company,
            &fields.title,
        );
        let out = config.output_dir.join(name);
        let doc = compress_blocking(capture.bitmap, out, &config, progress).await?;
        if !quiet {
            eprintln!("{} {} at {}", dim("dry run:"), bold(&fields.title), bold(&fields.company));
            report_document(&doc, &config.budget);
        }
        return Ok(());
    }

    let store = args.notion.store()?;
    let outcome = archive(&capture, &config, confirmer.as_mut(), &store, progress).await?;

    if !quiet {
        eprintln!(
            "{} {} at {}",
            green("✓"),
            bold(outcome.title()),
            bold(outcome.company())
        );
        report_document(&outcome.document, &config.budget);
        eprintln!("{} Notion page {}", green("✓"), bold(&outcome.record_id));
    }

    if !args.keep && outcome.attachment.is_some() {
        remove_quietly(&outcome.document.path);
    }
    Ok(())
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        eprintln!("{} could not delete {}: {e}", yellow("⚠"), path.display());
    }
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    let html = std::fs::read_to_string(&args.html)
        .with_context(|| format!("Failed to read {}", args.html.display()))?;
    let result = extract(&html, &args.url);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Title:   {}  {}", result.title, dim(&format!("({:?})", result.title_source)));
        println!("Company: {}  {}", result.company, dim(&format!("({:?})", result.company_source)));
    }
    Ok(())
}

async fn run_compress(args: CompressArgs, quiet: bool) -> Result<()> {
    let config = ArchiveConfig::builder()
        .budget(CompressionBudget::from_megabytes(args.max_mb))
        .upload_document(false)
        .build()
        .context("Invalid compression budget")?;
    let progress = progress_for(&config.budget, quiet);

    let input = args.input.clone();
    let output = args.output.clone();
    let task_config = config.clone();
    let doc = tokio::task::spawn_blocking(move || {
        compress_file(&input, &output, &task_config, progress.as_ref())
    })
    .await
    .context("Compression task failed")??;

    if !quiet {
        report_document(&doc, &config.budget);
    }
    Ok(())
}

async fn run_describe(args: DescribeArgs, quiet: bool) -> Result<()> {
    let store = args.notion.store()?;
    let summary = SummaryConfig {
        provider_name: args.provider.clone(),
        model: args.model.clone(),
        max_chars: args.max_chars,
        ..SummaryConfig::default()
    };
    let summarizer = LlmSummarizer::from_config(summary)?;
    let stats = enrich_descriptions(&store, &summarizer).await?;

    if !quiet {
        eprintln!("{} Done.", green("✓"));
        eprintln!("   Updated pages:                {}", stats.updated);
        eprintln!("   Skipped (no Company):         {}", stats.skipped_no_company);
        eprintln!("   Skipped (already has desc):   {}", stats.skipped_has_description);
        eprintln!("   Skipped (no description):     {}", stats.skipped_no_summary);
        eprintln!("   Failed updates:               {}", stats.failed);
    }
    Ok(())
}
