//! `testbed categories` and `testbed inspect`.

use std::path::Path;

use testbed_core::load_categories;
use testbed_store::read_snapshot;

pub(crate) fn print_categories(path: &Path) -> anyhow::Result<()> {
    let categories = load_categories(path)
        .map_err(|e| anyhow::anyhow!("failed to load categories from {}: {e}", path.display()))?;

    println!("{} categories in {}", categories.len(), path.display());
    for category in &categories {
        let filter = &category.filter;
        println!(
            "  {}: tagged={} count={} min_score={} accepted={} page_size={} max_pages={}",
            category.name,
            filter.tagged(),
            category.count,
            filter.min_score(),
            filter.require_accepted_answer(),
            filter.page_size(),
            filter.max_pages()
        );
    }
    Ok(())
}

pub(crate) fn print_snapshot(path: &Path) -> anyhow::Result<()> {
    let snapshot = read_snapshot(path)?;
    let answered = snapshot
        .questions
        .iter()
        .filter(|q| q.accepted_answer.is_some())
        .count();

    println!(
        "{}: {} questions from {} fetched at {}",
        path.display(),
        snapshot.count,
        snapshot.source,
        snapshot.fetched_at.to_rfc3339()
    );
    println!("with accepted answer: {answered}");
    println!("category distribution:");
    for (name, count) in snapshot.category_counts() {
        println!("  {name}: {count}");
    }
    Ok(())
}
