use std::collections::BTreeMap;

use console::style;

use crate::types::ReviewVerdict;

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn field(&self, key: &str, value: impl std::fmt::Display) {
        println!("  {:<14} {}", style(key).dim(), value);
    }

    /// Generated files with their sizes in characters
    pub fn files(&self, sizes: &BTreeMap<String, usize>) {
        self.section(&format!("Files ({})", sizes.len()));
        for (name, chars) in sizes {
            println!("  {:<24} {:>7} chars", name, chars);
        }
    }

    pub fn review(&self, verdict: &ReviewVerdict, fallback: bool) {
        self.section("Review");
        let score = match verdict.overall_score {
            80..=100 => style(verdict.overall_score).green(),
            60..=79 => style(verdict.overall_score).yellow(),
            _ => style(verdict.overall_score).red(),
        };
        self.field("Score", score);
        self.field(
            "Deployable",
            if verdict.deployment_ready { "yes" } else { "no" },
        );
        if fallback {
            self.warning("Review answer was not structured; using placeholder verdict");
        }
        for issue in &verdict.security_issues {
            println!("  {} {}", style("security").red(), issue);
        }
        for issue in &verdict.quality_issues {
            println!("  {} {}", style("quality").yellow(), issue);
        }
        for feature in &verdict.missing_features {
            println!("  {} {}", style("missing").cyan(), feature);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
