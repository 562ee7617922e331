//! Output formatting

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use sqlscope_core::{Engine, QueryVerdict, SchemaResource};

use crate::args::OutputFormat;

/// Verdict for one input file
#[derive(Debug, Serialize)]
pub struct FileVerdict {
    pub file: String,
    #[serde(flatten)]
    pub verdict: QueryVerdict,
}

/// Referenced tables for one input file
#[derive(Debug, Serialize)]
pub struct FileResources {
    pub file: String,
    pub resources: Vec<SchemaResource>,
}

/// Output formatter for analysis reports
pub struct OutputFormatter {
    format: OutputFormat,
    engine: Engine,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, engine: Engine) -> Self {
        Self { format, engine }
    }

    pub fn print_verdicts(&self, reports: &[FileVerdict]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for report in reports {
                    println!(
                        "{}: {}",
                        report.file,
                        describe_verdict(&report.verdict)
                    );
                }
                Ok(())
            }
            OutputFormat::Json => self.print_json(reports),
        }
    }

    pub fn print_resources(&self, reports: &[FileResources]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for report in reports {
                    println!("{} ({} table(s)):", report.file, report.resources.len());
                    for resource in &report.resources {
                        println!("  {}", resource);
                    }
                }
                Ok(())
            }
            OutputFormat::Json => self.print_json(reports),
        }
    }

    fn print_json<T: Serialize>(&self, reports: &[T]) -> Result<()> {
        let output = serde_json::json!({
            "engine": self.engine,
            "files": reports,
        });
        let text = serde_json::to_string_pretty(&output).into_diagnostic()?;
        println!("{}", text);
        Ok(())
    }
}

fn describe_verdict(verdict: &QueryVerdict) -> &'static str {
    match (verdict.read_only, verdict.executable) {
        (true, true) => "\x1b[32mread-only\x1b[0m",
        (true, false) => "\x1b[33mread-only, changes session state\x1b[0m",
        (false, true) => "\x1b[33mexecutes statements (EXPLAIN ANALYZE)\x1b[0m",
        (false, false) => "\x1b[31mrejected\x1b[0m",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_verdict_json_shape() {
        let report = FileVerdict {
            file: "q.sql".to_string(),
            verdict: QueryVerdict::new(true, false),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "file": "q.sql", "read_only": true, "executable": false })
        );
    }

    #[test]
    fn test_describe_verdict_labels() {
        assert!(describe_verdict(&QueryVerdict::REJECTED).contains("rejected"));
        assert!(describe_verdict(&QueryVerdict::new(true, true)).contains("read-only"));
    }
}
