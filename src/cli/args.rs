use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::Grade;

#[derive(Parser)]
#[command(
    name = "ragtutor",
    version,
    about = "RAG context pipeline for Cong Nghe study materials"
)]
pub struct Args {
    /// Path to the local index file
    #[arg(long, global = true, default_value = "ragtutor-index.json")]
    pub index: PathBuf,

    /// Optional TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ingest an extracted plain-text document into the index
    Ingest {
        /// Path to the extracted text file
        file: PathBuf,

        /// Document title shown in attributions
        #[arg(long)]
        title: String,

        /// Grade level: 10, 11 or 12
        #[arg(long)]
        grade: Grade,

        #[arg(long, default_value = "")]
        topic: String,

        /// Publisher or origin label
        #[arg(long, default_value = "")]
        source: String,
    },

    /// Retrieve the most relevant chunks for a query
    Search {
        query: String,

        #[arg(long)]
        grade: Option<Grade>,

        #[arg(long)]
        topic: Option<String>,

        #[arg(long)]
        source: Option<String>,

        /// Maximum number of results
        #[arg(long, default_value_t = 5)]
        top_k: usize,

        /// Print raw results as JSON
        #[arg(long)]
        json: bool,

        /// Print the assembled context block instead of a result list
        #[arg(long)]
        context: bool,
    },

    /// Remove a document and all of its chunks from the index
    Remove { document_id: String },

    /// Show index statistics
    Stats,
}
