//! Text output formatting with colors.

use bchydro_core::{ReportField, UsageReport};
use chrono::Local;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Placeholder for a field the portal did not supply.
const MISSING: &str = "—";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    label_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            label_width: 22,
        }
    }

    /// Formats a report, one line per field.
    pub fn format_report(
        &self,
        report: &UsageReport,
        subscriber_id: Option<&str>,
        stale: bool,
    ) -> String {
        let mut lines = Vec::new();

        let mut header = self.bold("BC Hydro Usage");
        if let Some(id) = subscriber_id {
            header.push_str(&format!(" ({})", self.cyan(id)));
        }
        if stale {
            header.push_str(&format!(" {}", self.yellow("[stale]")));
        }
        lines.push(header);
        lines.push("─".repeat(40));

        for field in ReportField::ALL {
            let label = format!("{}:", field.display_name());
            let value = match field.select(report) {
                Some(value) => value.to_string(),
                None => self.dim(MISSING),
            };
            lines.push(format!("{label:<width$} {value}", width = self.label_width));
        }

        let fetched = report.fetched_at.with_timezone(&Local);
        lines.push(String::new());
        lines.push(self.dim(&format!("Updated {}", fetched.format("%Y-%m-%d %H:%M:%S"))));

        if !report.skipped_points.is_empty() {
            lines.push(self.dim(&format!(
                "{} non-metered point(s) ignored",
                report.skipped_points.len()
            )));
        }

        lines.join("\n")
    }

    /// Formats a successful credential check.
    pub fn format_check_ok(&self, username: &str, subscriber_id: &str) -> String {
        format!(
            "{} Logged in as {} (service location {})",
            self.green("✓"),
            self.bold(username),
            self.cyan(subscriber_id)
        )
    }

    /// Formats an error message.
    pub fn format_error(&self, context: &str, error: &str) -> String {
        format!("{}: {} - {}", self.bold(context), self.red("Error"), error)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}
