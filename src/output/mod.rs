mod exports;
mod progress;
mod releases;
mod styling;
mod tables;

pub use exports::export_reports;
pub use progress::FetchProgress;

use styling::{dim, magenta_bold};

/// Prints the relreport banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📦 relreport"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab Release Report")
    );
}
