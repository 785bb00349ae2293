//! `dita-migrate`: command-line host for topic-map migrations

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use dita_content::TITLE_PLACEHOLDER;
use dita_project::{MigrationConfig, ProjectGraph};
use dita_rename::{rename_images, rename_topics, BatchSlot};
use tracing_subscriber::EnvFilter;

/// Printed output of one command and whether any file failed
struct CommandOutput {
    text: String,
    failed: bool,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self { text, failed: false }
    }
}

fn map_arg() -> Arg {
    Arg::new("map")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Root map of the project")
}

fn cli() -> Command {
    Command::new("dita-migrate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate DITA topic maps to canonical content types")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("discover")
                .about("Classify and normalize every topic, then list them")
                .arg(map_arg()),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename topics after their titles")
                .arg(map_arg()),
        )
        .subcommand(
            Command::new("images")
                .about("Rename figure images after their captions")
                .arg(map_arg())
                .arg(
                    Arg::new("prefix")
                        .long("prefix")
                        .required(true)
                        .help("Project prefix for image names"),
                ),
        )
        .subcommand(
            Command::new("fill-shortdescs")
                .about("Apply typical short descriptions")
                .arg(map_arg()),
        )
        .subcommand(
            Command::new("status")
                .about("List topics that still need attention")
                .arg(map_arg())
                .arg(
                    Arg::new("write")
                        .long("write")
                        .action(ArgAction::SetTrue)
                        .help("Also write the status file next to the map"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<MigrationConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => MigrationConfig::load(path).context("loading configuration"),
        None => Ok(MigrationConfig::new()),
    }
}

fn discover(map: &Path, config: &MigrationConfig) -> anyhow::Result<ProjectGraph> {
    ProjectGraph::discover(map, config).with_context(|| format!("discovering {}", map.display()))
}

fn list_topics(graph: &ProjectGraph) -> CommandOutput {
    let mut text = String::new();
    for (_, topic) in graph.topics() {
        let title = topic.title();
        let _ = writeln!(
            text,
            "{:<10} {:<5} {}  {}",
            topic.kind().to_string(),
            if topic.is_normalized() { "ok" } else { "review" },
            topic.file_name(),
            title.as_deref().unwrap_or(TITLE_PLACEHOLDER),
        );
    }
    for issue in graph.issues() {
        let _ = writeln!(text, "unreadable {}: {}", issue.path.display(), issue.message);
    }
    let _ = write!(
        text,
        "{} topics, {} images, {} need attention",
        graph.topic_count(),
        graph.images().len(),
        graph.problem_topics().len()
    );
    CommandOutput {
        text,
        failed: !graph.issues().is_empty(),
    }
}

fn list_problems(graph: &ProjectGraph, write: bool) -> anyhow::Result<CommandOutput> {
    let mut text = String::new();
    for problem in graph.problem_topics() {
        let mut notes = Vec::new();
        if problem.missing_title {
            notes.push("title");
        }
        if problem.missing_short_description {
            notes.push("short description");
        }
        if problem.has_draft_comments {
            notes.push("draft comments");
        }
        let _ = writeln!(text, "{} ({})", problem.path.display(), notes.join(", "));
    }
    if write {
        let path = graph.write_status_file().context("writing status file")?;
        let _ = write!(text, "Wrote {}", path.display());
    }
    Ok(CommandOutput::ok(text))
}

/// Run one subcommand to completion on the calling thread
fn execute(command: &str, args: &ArgMatches, config: &MigrationConfig) -> anyhow::Result<CommandOutput> {
    let map = args
        .get_one::<PathBuf>("map")
        .context("missing map argument")?;
    let mut graph = discover(map, config)?;

    match command {
        "discover" => Ok(list_topics(&graph)),
        "rename" => {
            let report = rename_topics(&mut graph);
            Ok(CommandOutput {
                text: report.to_string(),
                failed: report.has_failures(),
            })
        }
        "images" => {
            let prefix = args
                .get_one::<String>("prefix")
                .context("missing --prefix")?;
            let report = rename_images(&mut graph, prefix);
            Ok(CommandOutput {
                text: report.to_string(),
                failed: report.has_failures(),
            })
        }
        "fill-shortdescs" => {
            let edited = graph.fill_typical_short_descriptions();
            let mut text = edited.join("\n");
            if !text.is_empty() {
                text.push('\n');
            }
            let _ = write!(text, "{} topics edited", edited.len());
            Ok(CommandOutput::ok(text))
        }
        "status" => list_problems(&graph, args.get_flag("write")),
        other => anyhow::bail!("unknown command {other}"),
    }
}

async fn run(matches: ArgMatches) -> anyhow::Result<bool> {
    let Some((command, args)) = matches.subcommand() else {
        anyhow::bail!("no command given");
    };
    let config = load_config(args)?;
    let command = command.to_string();
    let args = args.clone();

    tracing::debug!("Starting {}", command);
    let slot = BatchSlot::new();
    let output = slot
        .spawn(move || execute(&command, &args, &config))?
        .result()
        .await??;

    println!("{}", output.text);
    Ok(!output.failed)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match run(matches).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
