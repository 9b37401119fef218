//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the deep-research CLI.
//! Status lines go to stderr so stdout carries only command results.

use owo_colors::OwoColorize;

use crate::workflows::ProgressEvent;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        if self.colored {
            eprintln!(
                "\n   {} {}\n",
                "deep-research".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            eprintln!("\n   deep-research v{}\n", env!("CARGO_PKG_VERSION"));
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✓".green().bold(), message.green());
        } else {
            eprintln!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "•".blue(), message);
        } else {
            eprintln!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            eprintln!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a workflow stage line
    pub fn stage(&self, stage: &str, message: &str) {
        if self.colored {
            eprintln!(
                "  {} {}",
                format!("[{}]", stage).dimmed(),
                message.bright_white()
            );
        } else {
            eprintln!("  [{}] {}", stage, message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            eprintln!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            eprintln!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file skipped message
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            eprintln!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            eprintln!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            eprintln!("\n  {}", title.bright_white().bold().underline());
        } else {
            eprintln!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            eprintln!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            eprintln!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            eprintln!("    {} {}", "•".blue(), item);
        } else {
            eprintln!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            eprintln!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            eprintln!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            eprintln!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            eprintln!("     $ {}", cmd);
        }
    }

    /// Print completion message with next steps
    pub fn complete(&self, message: &str) {
        if self.colored {
            eprintln!("\n  {} {}", "🚀".green(), message.bright_green().bold());
        } else {
            eprintln!("\n  [DONE] {}", message);
        }
    }

    /// Render one progress notification from a running workflow.
    /// `Done` is left to the caller, which prints the report itself.
    pub fn progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Planning { iteration } => {
                self.stage("plan", &format!("Planning search queries (iteration {})", iteration));
            }
            ProgressEvent::Searching { queries } => {
                self.stage("search", &format!("Running {} searches", queries.len()));
                for item in queries {
                    if item.query.is_empty() {
                        self.warning(&item.reason);
                    } else {
                        self.list_item(&item.query);
                    }
                }
            }
            ProgressEvent::Reviewing {
                iteration,
                summaries,
            } => {
                self.stage(
                    "review",
                    &format!(
                        "Reviewing {} summaries after iteration {}",
                        summaries, iteration
                    ),
                );
            }
            ProgressEvent::Writing { drafts } => {
                self.stage("draft", &format!("Writing {} candidate reports", drafts));
            }
            ProgressEvent::Evaluating { candidates } => {
                self.stage("evaluate", &format!("Scoring {} candidates", candidates));
            }
            ProgressEvent::Done { .. } => {}
        }
    }

    /// Print the final report. The report is the only thing written to
    /// stdout; every status line goes to stderr.
    pub fn report(&self, report: &str) {
        self.header("Report");
        eprintln!();
        println!("{}", report);
    }
}
