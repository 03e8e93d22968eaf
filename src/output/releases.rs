use std::fmt::Write;

use crate::report::ProjectReport;

use super::styling::{bright, dim};
use super::tables::{content_cell, create_cyan_header, create_table};

pub const RELEASE_COLUMNS: [&str; 6] = ["Tag", "Name", "CreatedAt", "QS_Tag", "Content", "Link"];

/// Renders one project's release table, headed by the project name.
///
/// The whole block is built in memory so concurrent projects never interleave
/// on stdout.
pub fn render_report(report: &ProjectReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", bright(&report.project.name).underlined());

    let mut table = create_table();
    table.set_header(create_cyan_header(&RELEASE_COLUMNS));

    for row in &report.releases {
        table.add_row(vec![
            comfy_table::Cell::new(&row.tag),
            comfy_table::Cell::new(&row.name),
            comfy_table::Cell::new(&row.created_at),
            comfy_table::Cell::new(&row.qs_tag),
            content_cell(&row.content),
            comfy_table::Cell::new(&row.link),
        ]);
    }

    let _ = writeln!(output, "{table}");

    if report.releases.is_empty() {
        let _ = writeln!(output, "  {}", dim("No releases found"));
    }

    output
}
