use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::RagConfig;
use crate::embedder::{create_embedder, Embedder};
use crate::index::{LocalIndex, VectorIndex};
use crate::ingest::Ingestor;
use crate::types::{Document, Grade};

static INGEST: Emoji<'_, '_> = Emoji("📚 ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "");

#[allow(clippy::too_many_arguments)]
pub async fn run_ingest(
    index_path: &Path,
    config_path: Option<&Path>,
    file: &Path,
    title: &str,
    grade: Grade,
    topic: &str,
    source: &str,
) -> Result<()> {
    let config = RagConfig::load_or_default(config_path)?;

    // Extraction from PDF/DOCX happens upstream; this consumes plain text.
    let text = fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;

    let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&config.embedder)?);
    embedder.health_check().await?;

    let index: Arc<dyn VectorIndex> = Arc::new(LocalIndex::new(
        index_path.to_path_buf(),
        config.embedder.dimensions,
    ));
    index.load().await?;

    let document = Document::new(title, grade, topic, source, &text);
    let ingestor = Ingestor::new(
        Arc::clone(&embedder),
        Arc::clone(&index),
        config.chunking.options(),
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid spinner template"),
    );
    pb.set_message(format!("{}Ingesting {}...", INGEST, file.display()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let chunks = ingestor.ingest(&document, &text).await?;
    index.persist().await?;

    pb.finish_and_clear();

    println!("\n{}Ingested {}\n", SUCCESS, style(title).yellow().bold());
    println!("  Document id: {}", style(&document.id).green());
    println!("  Grade:       {}", document.grade);
    println!("  Chunks:      {}", style(chunks.len()).cyan());

    Ok(())
}
