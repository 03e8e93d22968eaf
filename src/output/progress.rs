use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_red, bright_yellow};

/// Spinner shown on stderr while releases are being fetched
pub struct FetchProgress {
    pb: ProgressBar,
}

impl FetchProgress {
    pub fn start(project_count: usize, limit: usize) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {msg} {spinner}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(
            bright_yellow(format!(
                "Fetching up to {limit} releases for {project_count} project(s)"
            ))
            .to_string(),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(self, reported: usize, failed: usize) {
        if failed == 0 {
            self.pb.finish_with_message(
                bright_green(format!("Fetched releases for {reported} project(s) ✓")).to_string(),
            );
        } else {
            self.pb.finish_with_message(
                bright_red(format!(
                    "Fetched releases for {reported} project(s), {failed} failed ✗"
                ))
                .to_string(),
            );
        }
        eprintln!();
    }

    pub fn abandon(self) {
        self.pb
            .abandon_with_message(bright_red("Fetching releases failed ✗").to_string());
        eprintln!();
    }
}
