// src/errors/report.rs
//! Rendering of miette diagnostics.

use std::io::IsTerminal;

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, ThemeCharacters, ThemeStyles};

fn handler(color: bool) -> GraphicalReportHandler {
    let theme = if color {
        GraphicalTheme {
            characters: ThemeCharacters::unicode(),
            styles: ThemeStyles::ansi(),
        }
    } else {
        GraphicalTheme {
            characters: ThemeCharacters::ascii(),
            styles: ThemeStyles::none(),
        }
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Render to stderr, with unicode and colors only on a terminal.
pub fn render_to_stderr(report: &dyn Diagnostic) {
    let handler = handler(std::io::stderr().is_terminal());
    let mut output = String::new();
    if handler.render_report(&mut output, report).is_ok() {
        eprint!("{output}");
    }
}

/// Render without colors.
pub fn render_to_string(report: &dyn Diagnostic) -> String {
    let mut output = String::new();
    let _ = handler(false).render_report(&mut output, report);
    output
}
