//! Progress bar for batch annotation

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over `total` batches, or a hidden one when `visible` is false
pub fn batch_progress(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] \
             {pos}/{len} batches ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message("Annotating variants");
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_progress_has_length() {
        let pb = batch_progress(12, true);
        assert_eq!(pb.length(), Some(12));
        pb.finish_and_clear();
    }

    #[test]
    fn test_hidden_progress() {
        let pb = batch_progress(12, false);
        assert!(pb.is_hidden());
    }
}
