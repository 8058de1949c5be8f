//! Step-by-step progress log.

use std::fmt::Display;

use colored::Colorize;

/// Outcome of one step.
pub struct StepResult {
    pub name: String,
    pub passed: bool,
    pub message: Option<String>,
}

/// Progress log for one tool run
#[derive(Default)]
pub struct Report {
    results: Vec<StepResult>,
}

impl Report {
    pub fn new(title: &str) -> Self {
        println!("{}", title.bold());
        println!();
        Self::default()
    }

    /// Record a finished step and print its outcome.
    ///
    /// Returns the step's value when it succeeded so callers can carry on
    /// with `let Some(x) = report.step(..) else { .. }`.
    pub fn step<T, E: Display>(&mut self, name: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => {
                println!("  {} ... {}", name, "OK".green());
                self.results.push(StepResult {
                    name: name.to_string(),
                    passed: true,
                    message: None,
                });
                Some(value)
            }
            Err(e) => {
                let message = e.to_string();
                println!("  {} ... {}", name, message.red().bold());
                self.results.push(StepResult {
                    name: name.to_string(),
                    passed: false,
                    message: Some(message),
                });
                None
            }
        }
    }

    /// Print a value read from the device.
    pub fn value(&self, label: &str, value: impl Display) {
        println!("      {}: {}", label, value.to_string().cyan());
    }

    /// Print a line that is neither a step nor a value.
    pub fn note(&self, message: impl Display) {
        println!("  {}", message);
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Print the summary of every recorded step.
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("{}", "Summary".bold());
        println!("{}", "=".repeat(60));

        for result in &self.results {
            if result.passed {
                println!("  {} {}", "[OK]".green().bold(), result.name);
            } else {
                println!("  {} {}", "[FAILED]".red().bold(), result.name);
                if let Some(msg) = &result.message {
                    println!("           {}", msg.red());
                }
            }
        }

        let failed = self.failed();
        let passed = self.results.len() - failed;
        println!("{}", "-".repeat(60));
        println!(
            "  Total: {} succeeded, {} failed",
            passed.to_string().green(),
            if failed > 0 {
                failed.to_string().red()
            } else {
                failed.to_string().normal()
            }
        );
        println!("{}", "=".repeat(60));
    }
}
