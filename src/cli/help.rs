//! CLI help: command listing shown when no command is given.

use crate::kernel::{CommandSource, CommandSummary};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

/// Render the available commands as a table.
pub fn render_listing(summaries: &[CommandSummary]) -> String {
    if summaries.is_empty() {
        return "No commands available".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Command", "Aliases", "Source", "Description"]);

    for summary in summaries {
        let source = match summary.source {
            CommandSource::Local => "local",
            CommandSource::Manifest => "manifest",
        };
        table.add_row(vec![
            Cell::new(&summary.name),
            Cell::new(summary.aliases.join(", ")),
            Cell::new(source),
            Cell::new(&summary.description),
        ]);
    }

    format!("Available commands:\n{}", table)
}
