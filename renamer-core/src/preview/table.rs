use crate::plan::PlanResult;
use comfy_table::{Cell, Color, ColumnConstraint, ContentArrangement, Table, Width};
use std::fmt::Write;
use std::io::{self, IsTerminal};

const NAME_WIDTH: u16 = 40;
const REASON_WIDTH: u16 = 60;

fn new_table(use_color: bool, widths: &[u16]) -> Table {
    let mut table = Table::new();

    if io::stdout().is_terminal() {
        table.set_content_arrangement(ContentArrangement::Dynamic);
    } else {
        // Stable layout for pipes and tests
        table.set_content_arrangement(ContentArrangement::Disabled);
        table.set_constraints(
            widths
                .iter()
                .map(|width| ColumnConstraint::Absolute(Width::Fixed(*width))),
        );
    }

    if use_color {
        table.enforce_styling();
    }

    table
}

fn header(table: &mut Table, titles: &[&str], use_color: bool) {
    if use_color {
        table.set_header(titles.iter().map(|title| Cell::new(title).fg(Color::Cyan)));
    } else {
        table.set_header(titles.iter().copied());
    }
}

/// Render the operations of a plan as a table, followed by a second table
/// listing the conflicts if there are any.
pub fn render_table(plan: &PlanResult, use_color: bool) -> String {
    let mut output = String::new();

    if plan.is_empty() {
        output.push_str("Nothing to rename\n");
        return output;
    }

    if !plan.operations.is_empty() {
        let mut table = new_table(use_color, &[NAME_WIDTH, NAME_WIDTH, NAME_WIDTH]);
        header(&mut table, &["Old name", "New name", "Source"], use_color);

        for op in &plan.operations {
            let source = op.source_name.as_deref().unwrap_or("");
            if use_color {
                table.add_row(vec![
                    Cell::new(&op.old_name),
                    Cell::new(&op.new_name).fg(Color::Green),
                    Cell::new(source),
                ]);
            } else {
                table.add_row(vec![op.old_name.as_str(), op.new_name.as_str(), source]);
            }
        }

        writeln!(output, "{table}").unwrap();
    }

    if plan.has_conflicts() {
        let mut table = new_table(use_color, &[NAME_WIDTH, NAME_WIDTH, REASON_WIDTH]);
        header(&mut table, &["File", "Would become", "Conflict"], use_color);

        for conflict in &plan.conflicts {
            if use_color {
                table.add_row(vec![
                    Cell::new(&conflict.target_name),
                    Cell::new(&conflict.new_name),
                    Cell::new(&conflict.reason).fg(Color::Red),
                ]);
            } else {
                table.add_row(vec![
                    conflict.target_name.as_str(),
                    conflict.new_name.as_str(),
                    conflict.reason.as_str(),
                ]);
            }
        }

        writeln!(output, "{table}").unwrap();
    }

    writeln!(
        output,
        "Renames: {}  Conflicts: {}",
        plan.operations.len(),
        plan.conflicts.len()
    )
    .unwrap();

    output
}
