use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use promptbench::app::Session;
use promptbench::kernel::services::adapters::{
    ensure_settings_file, export_project, load_project_dir, load_settings, HttpGenerator,
};
use promptbench::kernel::services::ports::Settings;
use promptbench::kernel::{build_preview, Action, NotifyLevel, Store, WorkspaceState};
use promptbench::logging::{self, LineSource};

const EXPORT_WAIT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(
    name = "promptbench",
    about = "Generate, preview and export prompt-built web projects",
    version
)]
struct Cli {
    /// Mirror internal log lines to stderr; console entries print either way.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a project from a prompt using the configured backend.
    Generate(GenerateArgs),
    /// Build the preview document for a project directory.
    Preview(PreviewArgs),
    /// Pack a project directory into a ZIP archive.
    Export(ExportArgs),
    /// Print the workspace tree a project directory imports as.
    Tree(TreeArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// What to build.
    prompt: String,
    /// Directory for the exported archive.
    #[arg(long, value_name = "DIR", default_value = ".")]
    out: PathBuf,
    /// Write the preview document to this file.
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,
    /// Export the generated project as a ZIP archive.
    #[arg(long)]
    export: bool,
    /// Archive name without extension; defaults to the configured project name.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args)]
struct PreviewArgs {
    dir: PathBuf,
    /// Output file; stdout when omitted.
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    dir: PathBuf,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, value_name = "DIR", default_value = ".")]
    out: PathBuf,
}

#[derive(Args)]
struct TreeArgs {
    dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = ensure_settings_file() {
        eprintln!("settings unavailable: {err}");
    }
    let settings = load_settings();

    let mut guard = logging::init(&settings.log_filter);
    if cli.verbose {
        if let Some(guard) = guard.as_mut() {
            eprintln!("logging to {}", guard.log_dir().display());
            if let Some(rx) = guard.take_lines() {
                // Console entries are printed with the session output.
                std::thread::spawn(move || {
                    for line in rx.iter().filter(|l| l.source == LineSource::Internal) {
                        eprintln!("{}", line.text);
                    }
                });
            }
        }
    }

    match cli.command {
        Commands::Generate(args) => run_generate(args, &settings),
        Commands::Preview(args) => run_preview(args),
        Commands::Export(args) => run_export(args, &settings),
        Commands::Tree(args) => run_tree(args),
    }
}

fn run_generate(args: GenerateArgs, settings: &Settings) -> Result<()> {
    let generator = HttpGenerator::new(settings.generation.clone())?;
    let mut session = Session::new(Arc::new(generator), &args.out)
        .context("failed to start async runtime")?;

    session.dispatch(Action::RunPrompt {
        prompt: args.prompt,
    });
    let wait = Duration::from_secs(settings.generation.timeout_secs.saturating_add(5));
    let idle = session.wait_idle(wait);
    print_console(&session);

    if !idle || session.state().generating {
        bail!("generation did not finish within {}s", wait.as_secs());
    }
    if report_notices(&mut session) {
        bail!("generation failed");
    }

    if let Some(path) = args.preview {
        match &session.state().preview {
            Some(doc) => {
                write_file(&path, &doc.html)?;
                println!("preview written to {}", path.display());
            }
            None => println!("nothing to preview"),
        }
    }

    if args.export {
        let project_name = args
            .name
            .unwrap_or_else(|| settings.export.project_name.clone());
        session.dispatch(Action::Export { project_name });
        if !session.wait_idle(EXPORT_WAIT) {
            bail!("export did not finish");
        }
        if report_notices(&mut session) {
            bail!("export failed");
        }
        if let Some(entry) = session.state().console.last() {
            println!("{}", entry.message());
        }
    }
    Ok(())
}

fn run_preview(args: PreviewArgs) -> Result<()> {
    let files = load_project_dir(&args.dir)
        .with_context(|| format!("failed to read {}", args.dir.display()))?;
    let Some(doc) = build_preview(&files) else {
        bail!("no previewable entry in {}", args.dir.display());
    };
    tracing::info!(entry = doc.entry(), live = doc.is_live(), "preview built");

    match args.output {
        Some(path) => {
            write_file(&path, &doc.html)?;
            println!("{} -> {}", doc.entry(), path.display());
        }
        None => println!("{}", doc.html),
    }
    Ok(())
}

fn run_export(args: ExportArgs, settings: &Settings) -> Result<()> {
    let files = load_project_dir(&args.dir)
        .with_context(|| format!("failed to read {}", args.dir.display()))?;
    let name = args
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| settings.export.project_name.clone());
    let dest = export_project(&files, &args.out, name.trim())?;
    println!("exported {} files to {}", files.len(), dest.display());
    Ok(())
}

fn run_tree(args: TreeArgs) -> Result<()> {
    let files = load_project_dir(&args.dir)
        .with_context(|| format!("failed to read {}", args.dir.display()))?;
    let mut store = Store::new(WorkspaceState::new());
    store.dispatch(Action::LoadProject { files });

    for row in store.state().tree.rows() {
        let indent = "  ".repeat(usize::from(row.depth));
        let suffix = if row.is_folder { "/" } else { "" };
        println!("{indent}{}{suffix}", row.name);
    }
    for entry in store.state().console.entries() {
        if entry.message().starts_with("Skipped ") {
            eprintln!("warning: {}", entry.message());
        }
    }
    Ok(())
}

fn print_console(session: &Session) {
    for entry in session.state().console.entries() {
        println!(
            "[{}] {:<7} {}",
            entry.timestamp().format("%H:%M:%S"),
            entry.category().label(),
            entry.message()
        );
    }
}

/// Prints pending notices; returns `true` if any was an error.
fn report_notices(session: &mut Session) -> bool {
    let mut failed = false;
    for notice in session.take_notices() {
        match notice.level {
            NotifyLevel::Error => {
                failed = true;
                eprintln!("error: {}", notice.message);
            }
            NotifyLevel::Info | NotifyLevel::Success => println!("{}", notice.message),
        }
    }
    failed
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
