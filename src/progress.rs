//! Progress reporting for the indexing run
//!
//! Provides a live spinner via indicatif plus the styled header and summary
//! printed around a run.

use crate::driver::RunStats;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays run status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, processed: u64, failed: u64, bytes: u64, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            processed as f64 / secs
        } else {
            0.0
        };

        let msg = format!(
            "Files: {} | Failed: {} | Data: {} | Rate: {:.0}/s",
            format_number(processed),
            format_number(failed),
            format_size(bytes, BINARY),
            rate,
        );
        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Print a header at the start of a run
pub fn print_header(root: &str, backend: &str, engine: &str, languages: &[String], output: &str) {
    println!();
    println!(
        "{} {}",
        style("ocr-indexer").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root);
    println!("  {} {}", style("Backend:").bold(), backend);
    println!("  {} {}", style("Engine:").bold(), engine);
    println!("  {} {}", style("Languages:").bold(), languages.join(", "));
    println!("  {} {}", style("Output:").bold(), output);
    println!();
}

/// Print a summary of the run results
pub fn print_summary(stats: &RunStats, output: &str, output_size: Option<u64>) {
    let duration_secs = stats.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        stats.processed as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    if stats.completed {
        println!("{}", style("Indexing Complete").green().bold());
    } else {
        println!("{}", style("Indexing Interrupted").yellow().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Files:").bold(),
        format_number(stats.processed)
    );
    println!(
        "  {} {}",
        style("Data:").bold(),
        format_size(stats.bytes, BINARY)
    );
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if stats.failed > 0 {
        println!(
            "  {} {}",
            style("Failed:").yellow().bold(),
            format_number(stats.failed)
        );
    }
    if stats.duplicates > 0 {
        println!(
            "  {} {}",
            style("Duplicates:").yellow().bold(),
            format_number(stats.duplicates)
        );
    }
    if let Some(size) = output_size {
        println!(
            "  {} {} ({})",
            style("Index:").bold(),
            output,
            format_size(size, BINARY)
        );
    } else {
        println!("  {} {}", style("Index:").bold(), output);
    }
    println!();
}

/// Print the result list of a search run
pub fn print_search_results(term: &str, matches: &[String], total: usize, duration: Duration) {
    println!();
    println!(
        "{} '{}' matched {} of {} indexed images in {:.1?}",
        style("Search:").bold(),
        term,
        format_number(matches.len() as u64),
        format_number(total as u64),
        duration
    );
    if !matches.is_empty() {
        println!("{}", style("─".repeat(50)).dim());
        for path in matches {
            println!("  {path}");
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
