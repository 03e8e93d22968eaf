use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
///
/// Wrapping is disabled: release links must stay on one line to remain
/// clickable.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Disabled);
    table
}

pub fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Non-empty ticket labels are highlighted.
pub fn content_cell(content: &str) -> Cell {
    if content.is_empty() {
        Cell::new(content)
    } else {
        Cell::new(content).fg(TableColor::Yellow)
    }
}
