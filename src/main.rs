use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ragtutor::cli::{run_ingest, run_remove, run_search, run_stats, Args, Command};
use ragtutor::RagConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Ingest {
            file,
            title,
            grade,
            topic,
            source,
        } => {
            run_ingest(
                &args.index,
                args.config.as_deref(),
                &file,
                &title,
                grade,
                &topic,
                &source,
            )
            .await
        }
        Command::Search {
            query,
            grade,
            topic,
            source,
            top_k,
            json,
            context,
        } => {
            run_search(
                &args.index,
                args.config.as_deref(),
                &query,
                grade,
                topic,
                source,
                top_k,
                json,
                context,
            )
            .await
        }
        Command::Remove { document_id } => {
            let config = RagConfig::load_or_default(args.config.as_deref())?;
            run_remove(&args.index, &document_id, config.embedder.dimensions).await
        }
        Command::Stats => {
            let config = RagConfig::load_or_default(args.config.as_deref())?;
            run_stats(&args.index, config.embedder.dimensions).await
        }
    }
}
