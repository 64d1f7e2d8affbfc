//! ctfexport CLI - CMS entry export tool
//!
//! Exports entries to Excel workbooks, prints reference trees, and renders
//! rich-text documents to Markdown or HTML.

mod logger;

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use ctfexport::export::{
    export_entries, find_all_linked_references_in, parse_entry_ids, ExportOptions, RichTextFormat,
    Visit, VisitOutcome, DEFAULT_LOCALE, DEFAULT_SHEET_NAME,
};
use ctfexport::source::{ContentfulClient, EntrySource, ExportFile};
use ctfexport::{Config, Node};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Export CMS entries to Excel workbooks
#[derive(Parser)]
#[command(
    name = "ctfexport",
    version,
    about = "Export CMS entries to Excel workbooks",
    long_about = "ctfexport - Export content entries to XLSX for review and translation.\n\n\
                  One row per field, one column per locale. Rich-text fields can be \
                  written as JSON, Markdown, or HTML."
)]
struct Cli {
    /// Config file (default: ~/.ctfexport.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export entries to an XLSX workbook
    Export {
        /// Comma-separated entry ids
        entry_ids: String,

        /// Output file (default: ctf-export-<first id>.xlsx)
        file: Option<PathBuf>,

        /// Also export every entry the given entries link to
        #[arg(short, long)]
        recursive: bool,

        /// Content type not to follow when exporting recursively
        #[arg(long = "exclude-type", value_name = "ID", value_delimiter = ',')]
        exclude_types: Vec<String>,

        /// How rich-text fields are written
        #[arg(long, default_value = "json")]
        rich_text: RichTextMode,

        /// Locale column to export (default: all locales)
        #[arg(long = "locale", value_name = "CODE", value_delimiter = ',')]
        locales: Vec<String>,

        /// Only export this field
        #[arg(long = "field", value_name = "ID", value_delimiter = ',')]
        fields: Vec<String>,

        /// Read entries from a space export file instead of the API
        #[arg(long, value_name = "EXPORT_JSON")]
        from_file: Option<PathBuf>,

        /// Environment id, overrides the config file
        #[arg(short, long)]
        env: Option<String>,

        /// Worksheet name
        #[arg(long, default_value = DEFAULT_SHEET_NAME)]
        sheet_name: String,

        /// Don't open the workbook after saving
        #[arg(long)]
        no_open: bool,
    },

    /// Show the reference tree of an entry
    #[command(visible_alias = "references")]
    Refs {
        /// Entry id
        entry_id: String,

        /// Content type not to follow
        #[arg(long = "exclude-type", value_name = "ID", value_delimiter = ',')]
        exclude_types: Vec<String>,

        /// Read entries from a space export file instead of the API
        #[arg(long, value_name = "EXPORT_JSON")]
        from_file: Option<PathBuf>,

        /// Environment id, overrides the config file
        #[arg(short, long)]
        env: Option<String>,
    },

    /// Render a rich-text JSON document
    Render {
        /// Input file path
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "markdown")]
        format: RenderFormat,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Store the management token, space, and environment
    Configure {
        /// Content management token
        #[arg(long)]
        token: Option<String>,

        /// Space id
        #[arg(long)]
        space: Option<String>,

        /// Environment id
        #[arg(long)]
        env: Option<String>,

        /// Default locale columns for exports
        #[arg(long = "locale", value_name = "CODE", value_delimiter = ',')]
        locales: Vec<String>,

        /// Check the token against the API before saving
        #[arg(long)]
        verify: bool,
    },

    /// Show version information
    Version,
}

/// Rich-text cell format
#[derive(Clone, ValueEnum)]
enum RichTextMode {
    /// Compact JSON of the document tree
    Json,
    /// Markdown
    Markdown,
    /// HTML
    Html,
}

impl From<RichTextMode> for RichTextFormat {
    fn from(mode: RichTextMode) -> Self {
        match mode {
            RichTextMode::Json => RichTextFormat::Json,
            RichTextMode::Markdown => RichTextFormat::Markdown,
            RichTextMode::Html => RichTextFormat::Html,
        }
    }
}

/// Rich-text render target
#[derive(Clone, ValueEnum)]
enum RenderFormat {
    /// Markdown
    Markdown,
    /// HTML
    Html,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli.config.unwrap_or_else(Config::default_path);

    match cli.command {
        Commands::Export {
            entry_ids,
            file,
            recursive,
            exclude_types,
            rich_text,
            locales,
            fields,
            from_file,
            env,
            sheet_name,
            no_open,
        } => {
            let ids = parse_entry_ids(&entry_ids);
            let first = match ids.first() {
                Some(id) => id.clone(),
                None => return Err("no entry ids given".into()),
            };

            let config = Config::load(&config_path)?.apply_env();
            let source = open_source(&config, from_file.as_deref(), env)?;
            let source: &dyn EntrySource = source.as_ref();

            let locales = if locales.is_empty() {
                config.locales.clone()
            } else {
                locales
            };
            let options = ExportOptions::new()
                .with_locales(locales)
                .with_rich_text(rich_text.into())
                .with_recursive(recursive)
                .with_excluded_types(exclude_types)
                .with_fields(fields)
                .with_sheet_name(sheet_name);

            let pb = create_spinner("Fetching entries...");
            let export = export_entries(&source, &ids, &options)?;
            pb.finish_and_clear();

            print_visits(&export.visits);
            for id in &export.missing {
                logger::warn(format!("Entry {} not found", id.cyan()));
            }

            if export.is_empty() {
                println!("No file created. Could not find entries.");
                return Ok(());
            }

            let file = file.unwrap_or_else(|| PathBuf::from(format!("ctf-export-{}.xlsx", first)));
            println!(
                "Saving {} with {}",
                file.display().to_string().cyan(),
                format!("{} entries", export.entries.len()).yellow()
            );
            export.to_workbook()?.save(&file)?;
            logger::succeed(format!("workbook saved {}", file.display().to_string().cyan()));

            if !no_open {
                logger::info(format!("Opening {}", file.display().to_string().cyan()));
                if let Err(e) = open_file(&file) {
                    logger::warn(format!("Could not open {}: {}", file.display(), e));
                }
            }
        }

        Commands::Refs {
            entry_id,
            exclude_types,
            from_file,
            env,
        } => {
            let config = Config::load(&config_path)?.apply_env();
            let source = open_source(&config, from_file.as_deref(), env)?;
            let source: &dyn EntrySource = source.as_ref();

            let pb = create_spinner("Walking references...");
            let linked = find_all_linked_references_in(&source, &entry_id, &exclude_types, DEFAULT_LOCALE);
            pb.finish_and_clear();

            print_visits(&linked.visits);

            println!("\n{}", "References".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Entries".bold(), linked.entries.len());
            println!("{}: {}", "Assets".bold(), linked.assets.len());
        }

        Commands::Render {
            input,
            format,
            output,
        } => {
            let json = fs::read_to_string(&input)?;
            let doc = Node::from_json(&json)?;

            let rendered = match format {
                RenderFormat::Markdown => ctfexport::to_markdown(&doc),
                RenderFormat::Html => ctfexport::to_html(&doc),
            };
            write_output(output.as_ref(), &rendered)?;

            if let Some(path) = output {
                logger::succeed(format!("Rendered to {}", path.display()));
            }
        }

        Commands::Configure {
            token,
            space,
            env,
            locales,
            verify,
        } => {
            let mut config = Config::load(&config_path)?;
            if let Some(token) = token {
                config.cma_token = token;
            }
            if let Some(space) = space {
                config.space_id = space;
            }
            if let Some(env) = env {
                config.env_id = env;
            }
            if !locales.is_empty() {
                config.locales = locales;
            }

            if verify {
                let pb = create_spinner("Checking token...");
                let result = ContentfulClient::from_config(&config).and_then(|c| c.verify_token());
                pb.finish_and_clear();
                let name = result?;
                logger::succeed(format!("Token accepted for {}", name.yellow()));
            }

            config.save(&config_path)?;
            logger::succeed(format!("Configuration saved to {}", config_path.display()));

            println!("{}: {}", "Token".bold(), config.masked_token());
            println!("{}: {}", "Space".bold(), config.space_id);
            println!("{}: {}", "Environment".bold(), config.env_id());
            if !config.locales.is_empty() {
                println!("{}: {}", "Locales".bold(), config.locales.join(", "));
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn open_source(
    config: &Config,
    from_file: Option<&Path>,
    env: Option<String>,
) -> Result<Box<dyn EntrySource>, Box<dyn std::error::Error>> {
    if let Some(path) = from_file {
        return Ok(Box::new(ExportFile::open(path)?));
    }

    let mut config = config.clone();
    if let Some(env) = env {
        config.env_id = env;
    }
    Ok(Box::new(ContentfulClient::from_config(&config)?))
}

/// Print the walk log as an indented tree.
fn print_visits(visits: &[Visit]) {
    for visit in visits {
        let indent = "  ".repeat(visit.depth);
        match &visit.outcome {
            VisitOutcome::Found { content_type, name } => {
                println!("{}{}[{}] {}", indent, visit.id, content_type.blue(), name.yellow());
            }
            VisitOutcome::Skipped { content_type, name } => {
                println!("{}{}[{}] {}", indent, visit.id, content_type.blue(), name.yellow());
                println!("{}skipping...", indent);
            }
            VisitOutcome::Missing { reason: None } => {
                logger::warn(format!("{}{} not found", indent, visit.id));
            }
            VisitOutcome::Missing { reason: Some(reason) } => {
                logger::error(format!("{}{}: {}", indent, visit.id, reason));
            }
        }
    }
}

/// Open a file with the platform's default handler (macOS and Windows).
fn open_file(path: &Path) -> io::Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        return Ok(());
    };
    let path = path.canonicalize()?;
    Command::new(opener).arg(path).spawn()?;
    Ok(())
}

fn print_version() {
    println!("{} {}", "ctfexport".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("CMS entry export to XLSX");
    println!();
    println!("Rich text: JSON, Markdown, HTML");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}", content)?;
            if !content.ends_with('\n') {
                writeln!(handle)?;
            }
        }
    }
    Ok(())
}
