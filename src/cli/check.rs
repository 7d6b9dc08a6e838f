//! `whitelabel check`: compile the rule table and report what would be
//! skipped at runtime.

use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::config::WhitelabelConfig;
use crate::log;
use crate::rules::{Fixups, RuleTable};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CheckReport {
    pub rules: usize,
    pub invalid: Vec<InvalidEntry>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct InvalidEntry {
    /// `rules[3]` or `fixups`
    pub location: String,
    pub selector: String,
    pub reason: String,
}

pub fn check_config(config: &WhitelabelConfig) -> CheckReport {
    let rules = RuleTable::compile(&config.rules);
    let fixups = Fixups::from_config(&config.fixups);

    let mut invalid: Vec<InvalidEntry> = rules
        .iter()
        .enumerate()
        .filter_map(|(index, rule)| {
            rule.matcher().err().map(|reason| InvalidEntry {
                location: format!("rules[{index}]"),
                selector: rule.selector().to_owned(),
                reason: reason.to_owned(),
            })
        })
        .collect();
    invalid.extend(fixups.invalid().into_iter().map(|(selector, reason)| InvalidEntry {
        location: "fixups".to_owned(),
        selector: selector.to_owned(),
        reason: reason.to_owned(),
    }));

    // Unparsable selectors are already listed above.
    let diag = config.diagnose();
    let warnings = diag
        .warnings()
        .iter()
        .filter(|w| {
            let field = w.field.as_str();
            !invalid.iter().any(|e| {
                field
                    .strip_prefix(e.location.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
            })
        })
        .map(|w| format!("{}: {}", w.field.as_str(), w.message))
        .collect();

    CheckReport {
        rules: rules.len(),
        invalid,
        warnings,
    }
}

pub fn run(config: &WhitelabelConfig, json: bool) -> Result<()> {
    let report = check_config(config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.invalid.is_empty() {
        bail!("{} selector(s) will be skipped at runtime", report.invalid.len());
    }
    Ok(())
}

fn print_report(report: &CheckReport) {
    for entry in &report.invalid {
        log!("check"; "{} `{}`: {}", entry.location.bright_blue(), entry.selector, entry.reason.red());
    }
    for warning in &report.warnings {
        log!("warning"; "{}", warning);
    }
    if report.invalid.is_empty() {
        log!("check"; "{} rules ok", report.rules);
    }
}
