//! Analysis Engine demo CLI: loads one file into a Session and answers
//! questions against it, standing in for the HTTP layer spec.md §6
//! explicitly leaves out of scope.
//!
//! Usage:
//!     nlq-engine data.csv --question "total sales by region"
//!     nlq-engine data.csv   # interactive, one question per line on stdin

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use nlq_connectors::connector_for_path;
use nlq_engine::{AnalysisEngine, EngineConfig};

#[derive(Parser, Debug)]
#[command(name = "nlq-engine", about = "Natural-language analysis engine demo CLI")]
struct Args {
    /// Data file to load into a Session (csv, tsv, json, ndjson, parquet, xlsx)
    file: PathBuf,

    /// Ask a single question and exit, instead of reading stdin
    #[arg(long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nlq_engine::init_tracing();

    let args = Args::parse();

    let mut connector = connector_for_path(&args.file)?;
    connector.connect()?;
    let datasets = connector.load()?;
    connector.close();
    let dataset = datasets
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("{} produced no datasets", args.file.display()))?;

    tracing::info!(dataset = %dataset.name, rows = dataset.row_count(), "loaded dataset");

    let engine = AnalysisEngine::new(EngineConfig::from_env())?;
    let session_id = engine.create_session(dataset)?;

    if let Some(question) = args.question {
        ask(&engine, &session_id, &question).await?;
        return Ok(());
    }

    let stdin = std::io::stdin();
    print!("> ");
    std::io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let question = line?;
        if question.trim().is_empty() {
            print!("> ");
            std::io::stdout().flush()?;
            continue;
        }
        ask(&engine, &session_id, &question).await?;
        print!("> ");
        std::io::stdout().flush()?;
    }

    Ok(())
}

async fn ask(
    engine: &AnalysisEngine,
    session_id: &nlq_protocol::SessionId,
    question: &str,
) -> anyhow::Result<()> {
    let response = engine.process_query(session_id, question).await?;
    let analysis = engine.narrate(&response, question).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    println!("{}", analysis);
    println!("visualization_available: {}", response.visualization_available());
    Ok(())
}
