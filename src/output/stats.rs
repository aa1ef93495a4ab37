//! Statistics reporting.

use console::style;

use crate::download::BatchSummary;

/// Print the totals of a finished batch.
pub fn print_batch_summary(summary: &BatchSummary) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Batch Statistics:").bold());
    println!("  Attempted:  {}", summary.attempted);
    println!("  Downloaded: {}", style(summary.succeeded).green());
    println!("  Skipped:    {} (duplicates)", style(summary.duplicates).yellow());
    println!("  Skipped:    {} (unsupported or empty)", summary.skipped);
    if summary.failed > 0 {
        println!("  Failed:     {}", style(summary.failed).red());
        println!("  Failures logged to {}", summary.ledger.display());
    }
    if let Some(reason) = &summary.aborted {
        println!("  {} {}", style("Aborted:").red().bold(), reason);
    }
    println!("{}", style("═".repeat(50)).dim());
}
