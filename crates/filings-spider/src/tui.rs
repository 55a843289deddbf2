use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress over the date windows of one search; hidden unless running in tui mode.
pub(crate) fn window_progress(len: usize, tui: bool) -> ProgressBar {
    if !tui {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_bar()
        .template(
            "{msg} {spinner:.magenta}\n\
            [{elapsed_precise:.magenta}] |{bar:40.cyan/blue}| {pos}/{len} windows \
            [ETA: {eta:.blue}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    let pb = ProgressBar::new(len as u64).with_style(style);
    pb.set_message("preparing search ...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
