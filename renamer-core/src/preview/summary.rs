use crate::plan::PlanResult;
use nu_ansi_term::{Color as AnsiColor, Style};
use std::fmt::Write;

fn paint(text: &str, style: Style, use_color: bool) -> String {
    if use_color {
        style.paint(text).to_string()
    } else {
        text.to_string()
    }
}

/// Render the plan as one line per rename and per conflict
pub fn render_summary(plan: &PlanResult, use_color: bool) -> String {
    let mut output = String::new();

    writeln!(output, "[PLAN SUMMARY]").unwrap();
    writeln!(output, "Renames: {}", plan.operations.len()).unwrap();
    writeln!(output, "Conflicts: {}", plan.conflicts.len()).unwrap();

    if !plan.operations.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "[RENAMES]").unwrap();
        let arrow = paint("->", Style::new().fg(AnsiColor::Green), use_color);
        for op in &plan.operations {
            writeln!(output, "{} {} {}", op.old_name, arrow, op.new_name).unwrap();
        }
    }

    if plan.has_conflicts() {
        writeln!(output).unwrap();
        writeln!(output, "[CONFLICTS]").unwrap();
        let marker = paint("✗", Style::new().fg(AnsiColor::Red).bold(), use_color);
        for conflict in &plan.conflicts {
            writeln!(
                output,
                "{} {} -> {} ({})",
                marker, conflict.target_name, conflict.new_name, conflict.reason
            )
            .unwrap();
        }
    }

    output
}
