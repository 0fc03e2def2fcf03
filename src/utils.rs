use indicatif::{ProgressBar, ProgressStyle};

/// Returns a progress bar tracking the given number of iterations,
/// or a hidden one when verbosity is disabled.
pub(crate) fn get_loading_bar(verbose: bool, desc: &str, total_iterations: usize) -> ProgressBar {
    if verbose {
        let pb = ProgressBar::new(total_iterations as u64);
        pb.set_style(ProgressStyle::default_bar().template(&format!(
            "{} {{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] ({{pos}}/{{len}}, ETA {{eta}})",
            desc
        )));
        pb
    } else {
        ProgressBar::hidden()
    }
}
