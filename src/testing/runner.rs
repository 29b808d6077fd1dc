//! Sequential suite runner
//!
//! Registers every conversation as a test case, then drives the orchestrator
//! through suite setup, one setup/run/teardown cycle per case, and suite
//! teardown, printing progress as it goes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::Colorize;
use tracing::warn;

use crate::bot::TestMyBot;
use crate::common::{Error, Result};
use crate::convo::{assert_reply, AssertFn, FailFn};
use crate::suite::{TestCase, TestOutcome};

/// Options for a suite run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only run test cases whose name contains this string
    pub filter: Option<String>,
    /// Print descriptions, sources and conversation failures
    pub verbose: bool,
}

/// Result of a single test case
#[derive(Debug)]
pub struct CaseReport {
    pub name: String,
    pub source: PathBuf,
    pub passed: bool,
    pub error: Option<String>,
    pub duration: Duration,
}

/// Result of a suite run
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
    /// Set when suite teardown failed
    pub teardown_error: Option<String>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    /// Every case passed and teardown was clean
    pub fn success(&self) -> bool {
        self.failed() == 0 && self.teardown_error.is_none()
    }
}

/// Run every conversation known to `bot` as a test case
///
/// A failing suite setup is returned as an error since no case can run
/// without a container. Everything after that is recorded in the report.
pub async fn run_suite(bot: &mut TestMyBot, options: &RunOptions) -> Result<SuiteReport> {
    let verbose = options.verbose;
    let on_assert: Arc<AssertFn> = Arc::new(assert_reply);
    let on_fail: Arc<FailFn> = Arc::new(move |reason: &str| {
        if verbose {
            println!("    {} {}", "!".yellow(), reason.dimmed());
        }
    });

    let mut cases: Vec<TestCase> = Vec::new();
    bot.setup_test_suite(|_, case| cases.push(case), on_assert, on_fail)?;
    if let Some(filter) = &options.filter {
        cases.retain(|case| case.name().contains(filter.as_str()));
    }

    println!(
        "\n{} {} test case(s)",
        "Running Suite:".blue().bold(),
        cases.len().to_string().white().bold()
    );

    println!("\n{}", "Setup:".cyan());
    bot.before_all().await?;
    println!("  {} Container built", "✓".green());

    println!("\n{}", "Test Cases:".cyan());
    let mut report = SuiteReport::default();
    for case in &cases {
        let case_report = run_case(bot, case, verbose).await;
        match &case_report.error {
            None => println!(
                "  {} {} {}",
                "✓".green(),
                case_report.name,
                format!("({} ms)", case_report.duration.as_millis()).dimmed()
            ),
            Some(e) => println!("  {} {}: {}", "✗".red(), case_report.name, e),
        }
        report.cases.push(case_report);
    }

    println!("\n{}", "Teardown:".cyan());
    match bot.after_all().await {
        Ok(()) => println!("  {} Container cleaned", "✓".green()),
        Err(e) => {
            println!("  {} Container clean failed: {}", "✗".red(), e);
            report.teardown_error = Some(e.to_string());
        }
    }

    let summary = format!("{} passed, {} failed", report.passed(), report.failed());
    if report.success() {
        println!("\n{} {}\n", "✓".green().bold(), summary.green().bold());
    } else {
        println!("\n{} {}\n", "✗".red().bold(), summary.red().bold());
    }

    Ok(report)
}

/// Case setup, body and teardown for one test case
async fn run_case(bot: &mut TestMyBot, case: &TestCase, verbose: bool) -> CaseReport {
    if verbose {
        println!("  {} {}", "·".dimmed(), case.source().display().to_string().dimmed());
        if let Some(desc) = &case.convo().description {
            println!("    {}", desc.dimmed());
        }
    }

    let started = Instant::now();
    let mut result = match bot.before_each().await {
        Ok(()) => {
            let mut outcome = None;
            case.run(bot, |o| outcome = Some(o)).await;
            outcome
                .map(TestOutcome::into_result)
                .unwrap_or_else(|| {
                    Err(Error::Internal(
                        "test case reported no outcome".to_string(),
                    ))
                })
        }
        Err(e) => Err(e),
    };

    if let Err(e) = bot.after_each().await {
        if result.is_ok() {
            result = Err(e);
        } else {
            warn!(case = %case.name(), error = %e, "case teardown failed after a failed case");
        }
    }

    CaseReport {
        name: case.name().to_string(),
        source: case.source().to_path_buf(),
        passed: result.is_ok(),
        error: result.err().map(|e| e.to_string()),
        duration: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str, passed: bool) -> CaseReport {
        CaseReport {
            name: name.to_string(),
            source: PathBuf::from(format!("{name}.convo.yml")),
            passed,
            error: (!passed).then(|| "boom".to_string()),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_report_counts() {
        let report = SuiteReport {
            cases: vec![case("a", true), case("b", false), case("c", true)],
            teardown_error: None,
        };
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.success());
    }

    #[test]
    fn test_teardown_error_fails_report() {
        let report = SuiteReport {
            cases: vec![case("a", true)],
            teardown_error: Some("clean failed".to_string()),
        };
        assert!(!report.success());
        assert!(SuiteReport::default().success());
    }
}
