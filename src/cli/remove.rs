use std::path::Path;

use anyhow::Result;
use console::{style, Emoji};

use crate::index::{LocalIndex, VectorIndex};

static TRASH: Emoji<'_, '_> = Emoji("🗑  ", "");

/// Cascade-deletes a document's chunks. Works directly against the index;
/// no embedder is needed for removal.
pub async fn run_remove(index_path: &Path, document_id: &str, dimensions: usize) -> Result<()> {
    if !index_path.exists() {
        anyhow::bail!("No index found at {}.", index_path.display());
    }

    let index = LocalIndex::new(index_path.to_path_buf(), dimensions);
    index.load().await?;

    let deleted = index.delete_by_document(document_id).await?;
    index.persist().await?;

    if deleted == 0 {
        println!("No chunks found for document {}", style(document_id).dim());
    } else {
        println!(
            "{}Removed {} chunks of document {}",
            TRASH,
            style(deleted).cyan(),
            style(document_id).green()
        );
    }

    Ok(())
}
