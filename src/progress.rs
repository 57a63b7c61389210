use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const BAR_CHARS: &str = "█▓░";

/// Progress bar counting processed items (files, genomes, records). Falls
/// back to a spinner when the total is unknown. Hidden when `quiet` is set so
/// logs and piped output stay clean.
pub fn count_progress_bar(
    label: impl Into<String>,
    unit_label: &str,
    total_items: Option<u64>,
    quiet: bool,
) -> ProgressBar {
    let label = label.into();
    let pb = match total_items {
        Some(total) => {
            let pb = ProgressBar::new(total);
            let template = format!(
                "{{prefix:.bold.dim}} {{spinner:.green}} [{{elapsed_precise}}] {{wide_bar:.cyan/blue}} {{pos}}/{{len}} {unit_label} {{msg}}",
            );
            let style = ProgressStyle::with_template(&template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars(BAR_CHARS);
            pb.set_style(style);
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            let template = format!(
                "{{prefix:.bold.dim}} {{spinner:.green}} [{{elapsed_precise}}] {{pos}} {unit_label} processed {{msg}}",
            );
            pb.set_style(
                ProgressStyle::with_template(&template)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    };
    if quiet {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        pb.enable_steady_tick(Duration::from_millis(75));
    }
    pb.set_prefix(label);
    pb
}
