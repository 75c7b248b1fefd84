//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a byte progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Space saved, as a percentage of the uncompressed size.
pub fn format_ratio(uncompressed: u64, compressed: u64) -> String {
    if uncompressed == 0 {
        return "n/a".to_string();
    }
    format!(
        "{:.1}% saved",
        (1.0 - compressed as f64 / uncompressed as f64) * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(0, 10), "n/a");
        assert_eq!(format_ratio(100, 25), "75.0% saved");
        assert_eq!(format_ratio(100, 110), "-10.0% saved");
    }
}
