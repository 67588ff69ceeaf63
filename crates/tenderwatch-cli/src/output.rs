use std::io::Write;

use owo_colors::OwoColorize;
use tenderwatch_core::RiskLevel;
use tenderwatch_ingest::ProcessOutcome;

/// How many flags to show per document.
const TOP_FLAGS: usize = 3;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the per-document banner before processing starts.
pub fn print_document_header(
    w: &mut dyn Write,
    display_name: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    let sep = "=".repeat(60);
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "Processing: {}", display_name.bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "Processing: {}", display_name)?;
        writeln!(w, "{}", sep)?;
    }
    Ok(())
}

/// Print the structured processing result: parsed summary fields, the
/// overall risk assessment, and the top flags with their findings.
pub fn print_report(
    w: &mut dyn Write,
    outcome: &ProcessOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    let record = &outcome.record;
    writeln!(w, "Document Type: {}", record.document_type)?;
    writeln!(w, "Vendor: {}", record.vendor)?;
    writeln!(w, "Total: ${:.2}", record.total)?;
    writeln!(w, "Date: {}", record.date.as_deref().unwrap_or("-"))?;

    let assessment = &outcome.assessment;
    writeln!(w)?;
    if color.enabled() {
        let level = match assessment.level {
            RiskLevel::Critical => assessment.level.to_string().red().bold().to_string(),
            RiskLevel::High => assessment.level.to_string().red().to_string(),
            RiskLevel::Medium => assessment.level.to_string().yellow().to_string(),
            RiskLevel::Low => assessment.level.to_string().green().to_string(),
        };
        writeln!(
            w,
            "Risk Assessment: {} (Score: {})",
            level, assessment.score
        )?;
    } else {
        writeln!(
            w,
            "Risk Assessment: {} (Score: {})",
            assessment.level, assessment.score
        )?;
    }
    writeln!(w, "Description: {}", assessment.description)?;

    if outcome.flags.is_empty() {
        writeln!(w)?;
        writeln!(w, "No suspicious patterns detected.")?;
        return Ok(());
    }

    writeln!(w)?;
    writeln!(w, "Detailed Findings:")?;
    for (i, flag) in outcome.flags.iter().take(TOP_FLAGS).enumerate() {
        writeln!(w)?;
        writeln!(
            w,
            "{}. Comparison with Document ID {} ({}) - Risk Score: {}",
            i + 1,
            flag.existing_doc_id,
            flag.existing_vendor,
            flag.risk_score
        )?;
        for issue in &flag.issues {
            writeln!(w, "   - {}", issue)?;
        }
    }
    if outcome.flags.len() > TOP_FLAGS {
        writeln!(w)?;
        writeln!(
            w,
            "({} further flagged documents not shown)",
            outcome.flags.len() - TOP_FLAGS
        )?;
    }
    Ok(())
}

/// Print a per-document processing error; the batch continues.
pub fn print_processing_error(
    w: &mut dyn Write,
    display_name: &str,
    error: &dyn std::fmt::Display,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "{} {}: {}",
            "ERROR".red().bold(),
            display_name,
            error
        )?;
    } else {
        writeln!(w, "ERROR {}: {}", display_name, error)?;
    }
    Ok(())
}
