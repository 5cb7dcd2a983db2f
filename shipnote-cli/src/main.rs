mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use fs_err as fs;
use shipnote_changelog as changelog;
use shipnote_git::RevisionInspector;
use shipnote_message::ProjectContext;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "shipnote",
    version,
    about = "Compose release notification payloads from changelog and git facts."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the configured message and print its JSON payload.
    Compose(ComposeArgs),
    /// Extract the changelog section for a version.
    Changelog(ChangelogArgs),
    /// Name the most recent ref reachable from the repository head.
    Describe(DescribeArgs),
}

#[derive(Debug, Parser)]
struct ComposeArgs {
    /// Project directory (default: current directory).
    #[arg(long, default_value = ".")]
    project_dir: Utf8PathBuf,

    /// Message definition file (default: <project_dir>/shipnote.toml).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Write the payload here instead of stdout.
    #[arg(long)]
    out: Option<Utf8PathBuf>,

    /// Override the webhook from the definition file.
    #[arg(long)]
    webhook: Option<String>,
}

#[derive(Debug, Parser)]
struct ChangelogArgs {
    /// Project directory (default: current directory).
    #[arg(long, default_value = ".")]
    project_dir: Utf8PathBuf,

    /// Changelog file (default: <project_dir>/CHANGELOG.md).
    #[arg(long)]
    file: Option<Utf8PathBuf>,

    /// Version whose section is extracted.
    #[arg(long)]
    version: String,

    /// Treat lines starting with this literal prefix as version lines. Repeatable.
    #[arg(long = "starts-with")]
    starts_with: Vec<String>,

    /// Treat lines wholly matching this regex as version lines. Repeatable.
    #[arg(long = "matcher")]
    matchers: Vec<String>,
}

#[derive(Debug, Parser)]
struct DescribeArgs {
    /// Where to start looking for the repository (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Print branch, head commit and description as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Changelog(args) => cmd_changelog(args),
        Command::Describe(args) => cmd_describe(args),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let config_path = args
        .config
        .unwrap_or_else(|| args.project_dir.join(config::CONFIG_FILE_NAME));
    let definition = config::load(&config_path)?;

    let project = ProjectContext::new(
        definition.project.name.clone(),
        definition.project.group.clone(),
        definition.project.version.clone(),
        args.project_dir,
    );
    let mut message = config::build_message(&definition, project)?;
    if let Some(url) = args.webhook {
        message.set_webhook(url);
    }

    let draft = message.resolve()?;
    if let Some(url) = &draft.webhook {
        info!("payload is addressed to {url}");
    }

    let json = serde_json::to_string_pretty(&draft.payload)?;
    match args.out {
        Some(path) => {
            fs::write(&path, format!("{json}\n")).with_context(|| format!("write {path}"))?;
            info!("payload written to {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_changelog(args: ChangelogArgs) -> anyhow::Result<()> {
    let mut matchers = Vec::new();
    for prefix in &args.starts_with {
        matchers.push(changelog::starts_with_matcher(prefix));
    }
    for pattern in &args.matchers {
        let matcher = changelog::whole_line_matcher(pattern)
            .with_context(|| format!("invalid version line pattern {pattern:?}"))?;
        matchers.push(matcher);
    }

    let file = match args.file {
        Some(file) if file.is_absolute() => file,
        Some(file) => args.project_dir.join(file),
        None => args.project_dir.join(changelog::DEFAULT_FILE_NAME),
    };
    let section = changelog::read_section(&file, &args.version, &matchers)
        .with_context(|| format!("extract changelog for {} from {file}", args.version))?;
    println!("{section}");
    Ok(())
}

fn cmd_describe(args: DescribeArgs) -> anyhow::Result<()> {
    let inspector = RevisionInspector::open(&args.repo_root)?;
    let description = inspector.describe_all_always()?;

    if args.json {
        let head = inspector.last_commit()?;
        let value = serde_json::json!({
            "describe": description,
            "branch": inspector.current_branch_name()?,
            "commit": head.as_ref().map(|commit| commit.sha1.as_str()),
            "author": head.as_ref().map(|commit| commit.author_email.as_str()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{description}");
    }
    Ok(())
}
