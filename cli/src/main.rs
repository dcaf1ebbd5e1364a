//! Papergraph CLI: populate the paper graph from feeds and run the fixed queries

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use papergraph::{
    run_batch, AppConfig, FileSink, GraphStatistics, MemorySink, PatternQuery, PopulateReport,
    QueryOutcome, ResultSink, Session, TeeSink,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "papergraph", version, about = "Paper graph ingestion and query CLI")]
struct Cli {
    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Table,
    Json,
}

/// Overrides for values normally taken from the config file
#[derive(Args)]
struct Overrides {
    /// Folder holding the feed files
    #[arg(long)]
    data: Option<PathBuf>,

    /// Snapshot file backing the graph
    #[arg(long)]
    store: Option<PathBuf>,

    /// Result log (appended to)
    #[arg(long)]
    log: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut AppConfig) {
        if let Some(data) = self.data {
            config.data_dir = data;
        }
        if let Some(store) = self.store {
            config.store_path = Some(store);
        }
        if let Some(log) = self.log {
            config.result_log = log;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Populate from the feeds, then run the configured queries
    Run {
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Populate from the feeds only
    Load {
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Run one query against a saved store
    Query {
        #[command(subcommand)]
        query: QueryCommand,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print node and edge counts of a saved store
    Stats {
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Subcommand)]
enum QueryCommand {
    /// Authors and reviewer of a paper
    Q1 { title: String },
    /// Papers published at a conference
    Q2 { conference: String },
    /// Papers written by an author
    Q3 { author: String },
    /// Papers of a journal volume reviewed by a friend of their author
    Q4 { journal: String, volume: u32 },
}

impl From<QueryCommand> for PatternQuery {
    fn from(cmd: QueryCommand) -> Self {
        match cmd {
            QueryCommand::Q1 { title } => PatternQuery::Q1 { title },
            QueryCommand::Q2 { conference } => PatternQuery::Q2 { conference },
            QueryCommand::Q3 { author } => PatternQuery::Q3 { author },
            QueryCommand::Q4 { journal, volume } => PatternQuery::Q4 { journal, volume },
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };

    let (command, overrides) = match cli.command {
        Commands::Run { overrides } => (Command::Run, overrides),
        Commands::Load { overrides } => (Command::Load, overrides),
        Commands::Query { query, overrides } => (Command::Query(query.into()), overrides),
        Commands::Stats { overrides } => (Command::Stats, overrides),
    };
    overrides.apply(&mut config);
    config.validate()?;

    init_tracing(&config.log_level);

    match command {
        Command::Run => run_all(&config, &cli.format),
        Command::Load => run_load(&config, &cli.format),
        Command::Query(query) => run_query(&config, &query, &cli.format),
        Command::Stats => run_stats(&config, &cli.format),
    }
}

enum Command {
    Run,
    Load,
    Query(PatternQuery),
    Stats,
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_all(config: &AppConfig, format: &OutputFormat) -> Result<()> {
    if config.queries.is_empty() {
        warn!("No queries configured; only populating");
    }

    let mut sink = TeeSink::new(FileSink::open(&config.result_log)?, MemorySink::new());
    let (report, outcomes) = run_batch(config, &mut sink)
        .with_context(|| format!("running batch over {}", config.data_dir.display()))?;
    let (_, echoed) = sink.into_inner();

    print_report(&report, format)?;
    print_outcomes(&outcomes, &echoed, format)?;
    info!(
        "Appended {} result rows to {}",
        outcomes.iter().map(|o| o.rows.len()).sum::<usize>(),
        config.result_log.display()
    );
    Ok(())
}

fn run_load(config: &AppConfig, format: &OutputFormat) -> Result<()> {
    if config.store_path.is_none() {
        warn!("No store configured; the loaded graph is discarded on exit");
    }

    let mut session = Session::from_config(config)?;
    let report = session
        .populate(&config.feed_paths())
        .with_context(|| format!("populating from {}", config.data_dir.display()))?;
    print_report(&report, format)?;
    session.close()?;
    Ok(())
}

fn run_query(config: &AppConfig, query: &PatternQuery, format: &OutputFormat) -> Result<()> {
    let Some(store) = &config.store_path else {
        bail!("query needs a saved store; pass --store or set store_path");
    };
    let session = Session::open(store)?;

    let mut sink = TeeSink::new(FileSink::open(&config.result_log)?, MemorySink::new());
    let outcome = session.query(query);
    sink.emit_outcome(&outcome)?;
    sink.flush()?;
    let (_, echoed) = sink.into_inner();

    print_outcomes(std::slice::from_ref(&outcome), &echoed, format)
}

fn run_stats(config: &AppConfig, format: &OutputFormat) -> Result<()> {
    let Some(store) = &config.store_path else {
        bail!("stats needs a saved store; pass --store or set store_path");
    };
    let session = Session::open(store)?;
    print_statistics(&session.store().statistics(), format)
}

/// Text output repeats exactly what went to the result log
fn print_outcomes(outcomes: &[QueryOutcome], echoed: &MemorySink, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcomes)?);
        }
        OutputFormat::Table => {
            for outcome in outcomes {
                let mut table = Table::new();
                table.set_content_arrangement(ContentArrangement::Dynamic);
                table.set_header(vec![outcome.kind.to_string()]);
                for row in &outcome.rows {
                    table.add_row(row.fields.iter().map(|f| f.to_string()).collect::<Vec<_>>());
                }
                println!("{}", table);
            }
        }
        OutputFormat::Text => {
            for line in echoed.lines() {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn print_report(report: &PopulateReport, format: &OutputFormat) -> Result<()> {
    let feeds = [&report.conferences, &report.journals, &report.friendships];
    match format {
        OutputFormat::Json => {
            let value: Vec<_> = feeds
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "feed": r.feed.to_string(),
                        "records": r.records,
                        "malformed": r.malformed,
                        "nodes_created": r.nodes_created,
                        "nodes_reused": r.nodes_reused,
                        "edges_created": r.edges_created,
                        "relationships_skipped": r.relationships_skipped,
                        "stopped_at_blank": r.stopped_at_blank,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec![
                "Feed", "Records", "Malformed", "Nodes created", "Nodes reused", "Edges", "Skipped",
            ]);
            for r in feeds {
                table.add_row(vec![
                    r.feed.to_string(),
                    r.records.to_string(),
                    r.malformed.to_string(),
                    r.nodes_created.to_string(),
                    r.nodes_reused.to_string(),
                    r.edges_created.to_string(),
                    r.relationships_skipped.to_string(),
                ]);
            }
            println!("{}", table);
        }
        OutputFormat::Text => {
            for r in feeds {
                println!("{}", r);
            }
        }
    }
    Ok(())
}

fn print_statistics(stats: &GraphStatistics, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "nodes": stats.node_count,
                "edges": stats.edge_count,
                "nodes_per_label": stats.nodes_per_label,
                "edges_per_type": stats.edges_per_type,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Kind", "Name", "Count"]);
            for (label, count) in &stats.nodes_per_label {
                table.add_row(vec!["node".to_string(), label.to_string(), count.to_string()]);
            }
            for (edge_type, count) in &stats.edges_per_type {
                table.add_row(vec!["edge".to_string(), edge_type.to_string(), count.to_string()]);
            }
            println!("{}", table);
            println!("{} node(s), {} edge(s)", stats.node_count, stats.edge_count);
        }
        OutputFormat::Text => {
            println!("Nodes: {}", stats.node_count);
            for (label, count) in &stats.nodes_per_label {
                println!("  {:<12} {}", label, count);
            }
            println!("Edges: {}", stats.edge_count);
            for (edge_type, count) in &stats.edges_per_type {
                println!("  {:<12} {}", edge_type, count);
            }
        }
    }
    Ok(())
}
