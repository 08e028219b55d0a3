use std::path::Path;

use anyhow::Result;
use console::{style, Emoji};

use crate::index::{LocalIndex, VectorIndex};

static STATS: Emoji<'_, '_> = Emoji("📊 ", "");

pub async fn run_stats(index_path: &Path, dimensions: usize) -> Result<()> {
    let index = LocalIndex::new(index_path.to_path_buf(), dimensions);
    index.load().await?;

    let stats = index.stats().await?;

    println!("\n{}Index: {}\n", STATS, style(index_path.display()).green());
    println!("  Documents:  {}", style(stats.total_documents).cyan());
    println!("  Chunks:     {}", style(stats.total_chunks).cyan());
    println!("  Size:       {} bytes", style(stats.index_size_bytes).cyan());
    match stats.last_updated {
        Some(updated) => println!("  Updated:    {}", updated.to_rfc3339()),
        None => println!("  Updated:    never"),
    }

    Ok(())
}
