//! Console output utilities.

use std::path::Path;

use console::style;

use crate::download::PostOutcome;
use crate::media::{HostType, PostDescriptor};

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     reddit-media-dl                                   ║
║     Batch downloader for linked reddit media          ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(input: &Path, download_dir: &Path, posts: usize, workers: usize) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Input: {} ({} posts)", input.display(), posts);
    println!("  Directory: {}", download_dir.display());
    println!("  Workers: {}", workers);
    println!();
}

/// Print the result line for one post.
///
/// `duplicates` is the running count of posts already on disk.
pub fn print_post_result(
    index: usize,
    total: usize,
    post: &PostDescriptor,
    host: HostType,
    outcome: &PostOutcome,
    duplicates: u64,
) {
    println!(
        "{} {} {}",
        style(format!("({}/{})", index, total)).dim(),
        post.permalink(),
        style(host.to_string().to_uppercase()).bold()
    );

    match outcome {
        PostOutcome::Downloaded(paths) => {
            for path in paths {
                println!("  {} {}", style("Downloaded").green(), path.display());
            }
        }
        PostOutcome::Duplicate(path) => {
            println!(
                "  {} {} ({} so far)",
                style("Already downloaded").yellow(),
                path.display(),
                duplicates
            );
        }
        PostOutcome::Skipped(reason) => {
            println!("  {} {}", style("Skipped").dim(), reason);
        }
        PostOutcome::Failed { reason, fatal } => {
            let label = if *fatal { "Fatal" } else { "Failed" };
            println!("  {} {}", style(label).red().bold(), reason);
        }
    }
}
