use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use console::{style, Emoji};

use crate::config::RagConfig;
use crate::context::build_context_string;
use crate::embedder::{create_embedder, Embedder};
use crate::index::{LocalIndex, VectorIndex};
use crate::retriever::Retriever;
use crate::types::{Grade, RetrieveFilters};

static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "");
static BOOK: Emoji<'_, '_> = Emoji("📖 ", "");

#[allow(clippy::too_many_arguments)]
pub async fn run_search(
    index_path: &Path,
    config_path: Option<&Path>,
    query: &str,
    grade: Option<Grade>,
    topic: Option<String>,
    source: Option<String>,
    top_k: usize,
    json: bool,
    context: bool,
) -> Result<()> {
    if !index_path.exists() {
        anyhow::bail!(
            "No index found at {}. Run `ragtutor ingest` first.",
            index_path.display()
        );
    }

    let config = RagConfig::load_or_default(config_path)?;

    let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&config.embedder)?);
    let index: Arc<dyn VectorIndex> = Arc::new(LocalIndex::new(
        index_path.to_path_buf(),
        config.embedder.dimensions,
    ));
    index.load().await?;

    let retriever = Retriever::new(embedder, index)
        .with_timeout(Duration::from_secs(config.retrieval.timeout_secs));

    let filters = RetrieveFilters {
        grade,
        topic,
        source,
    };
    let filters = (!filters.is_empty()).then_some(filters);

    let results = retriever.retrieve_context(query, filters, top_k).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if context {
        let block = build_context_string(&results);
        if !block.is_empty() {
            println!("{}", block);
        }
        return Ok(());
    }

    if results.is_empty() {
        println!("No relevant chunks for: {}", style(query).italic());
        return Ok(());
    }

    println!(
        "\n{}Found {} chunks for: {}\n",
        SEARCH,
        style(results.len()).cyan(),
        style(query).yellow().bold()
    );

    for (i, result) in results.iter().enumerate() {
        println!(
            "{} {}. {} {}",
            BOOK,
            style(i + 1).dim(),
            style(&result.document.title).green(),
            style(format!(
                "(lớp {}, đoạn {}/{})",
                result.document.grade,
                result.chunk.chunk_index + 1,
                result.chunk.total_chunks
            ))
            .dim()
        );
        println!("   Score: {}", style(format!("{:.3}", result.score)).cyan());

        let preview: String = result.chunk.content.chars().take(200).collect();
        let suffix = if result.chunk.content.chars().count() > 200 {
            "..."
        } else {
            ""
        };
        println!("   {}{}", style(preview).dim(), suffix);
        println!();
    }

    Ok(())
}
