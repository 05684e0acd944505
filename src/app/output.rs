//! Rendering assessments for the terminal.

use colored::*;
use serde::Serialize;

use crate::config::OutputFormat;
use crate::engine::Assessment;
use crate::error_handling::InvalidInputError;
use crate::scoring::RiskLevel;
use crate::signals::{SignalName, SignalValue};

#[derive(Serialize)]
struct AssessmentLine<'a> {
    input: &'a str,
    #[serde(flatten)]
    assessment: &'a Assessment,
}

#[derive(Serialize)]
struct ErrorLine<'a> {
    input: &'a str,
    error: String,
}

/// Renders the outcome for one raw input in the requested format.
pub fn render(
    raw: &str,
    result: &Result<Assessment, InvalidInputError>,
    format: OutputFormat,
) -> String {
    match (format, result) {
        (OutputFormat::Plain, Ok(assessment)) => render_plain(raw, assessment),
        (OutputFormat::Plain, Err(error)) => format!(
            "⚠️ {}  {}",
            error.to_string().yellow(),
            format!("(input: {raw:?})").dimmed()
        ),
        (OutputFormat::Json, Ok(assessment)) => json_line(&AssessmentLine {
            input: raw,
            assessment,
        }),
        (OutputFormat::Json, Err(error)) => json_line(&ErrorLine {
            input: raw,
            error: error.to_string(),
        }),
    }
}

fn json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to serialize output line: {}", e);
        String::from("{}")
    })
}

/// Multi-line, colored report for one assessment.
pub fn render_plain(raw: &str, assessment: &Assessment) -> String {
    let (badge, level) = match assessment.risk_level() {
        RiskLevel::Safe => ("🟢", "SAFE".green().bold()),
        RiskLevel::Suspicious => ("🟡", "SUSPICIOUS".yellow().bold()),
        RiskLevel::Malicious => ("🔴", "MALICIOUS".red().bold()),
    };

    let mut lines = vec![format!(
        "{} {} {}/100  {}",
        badge,
        level,
        assessment.score(),
        raw
    )];

    if let Some(SignalValue::Chain(chain)) = assessment
        .signals()
        .get(SignalName::RedirectChain)
        .and_then(|entry| entry.value())
    {
        lines.push(format!(
            "   {} {} ({} redirect{}, {})",
            "→".cyan(),
            assessment.final_url(),
            chain.redirect_count(),
            if chain.redirect_count() == 1 { "" } else { "s" },
            chain.termination()
        ));
        if let Some(failure) = chain.failure() {
            lines.push(format!("     {}", failure.message.dimmed()));
        }
    } else {
        lines.push(format!("   {} {}", "→".cyan(), assessment.final_url()));
    }

    for adjustment in assessment.adjustments() {
        let delta = format!("{:+}", adjustment.delta);
        let delta = if adjustment.delta >= 0 {
            delta.green()
        } else {
            delta.red()
        };
        lines.push(format!("   {:>4} {}", delta, adjustment.reason));
    }

    for (name, entry) in assessment.signals().degraded() {
        lines.push(format!(
            "   {} {} {}: {}",
            "?".yellow(),
            name,
            entry.status(),
            entry.detail().unwrap_or_default()
        ));
    }

    lines.join("\n")
}
