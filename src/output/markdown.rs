//! Markdown run report
//!
//! Counts, the reason discovery stopped, and one section per record with its
//! qualification text.

use crate::harvest::HarvestReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const NO_MINIMUM: &str = "No minimum qualifications specified.";
const NO_PREFERRED: &str = "No preferred qualifications specified.";

/// Writes the markdown report of a run
///
/// # Arguments
///
/// * `report` - The finished run
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_markdown_report(report: &HarvestReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run as markdown
pub fn format_markdown_report(report: &HarvestReport) -> String {
    let mut md = String::new();

    md.push_str("# Job Harvest Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Strategy**: {}\n", report.strategy));
    if !report.keyword.is_empty() {
        md.push_str(&format!("- **Keyword**: {}\n", report.keyword));
    }
    if let Some(location) = &report.location {
        md.push_str(&format!("- **Location**: {}\n", location));
    }
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n\n",
        report.duration_seconds()
    ));

    // Counts
    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    if let Some(discovery) = &report.discovery {
        md.push_str(&format!("| Pages | {} |\n", discovery.pages));
        if discovery.scrolls > 0 {
            md.push_str(&format!("| Scrolls | {} |\n", discovery.scrolls));
        }
        md.push_str(&format!("| Cards seen | {} |\n", discovery.cards_seen));
        md.push_str(&format!("| Duplicates | {} |\n", report.duplicates));
        md.push_str(&format!("| Rejected | {} |\n", report.rejected));
        if discovery.filtered_out > 0 {
            md.push_str(&format!(
                "| Filtered by keyword | {} |\n",
                discovery.filtered_out
            ));
        }
    }
    md.push_str(&format!("| Records | {} |\n", report.records.len()));
    if report.enriched() {
        md.push_str(&format!("| Enriched | {} |\n", report.enrichment.enriched));
        md.push_str(&format!(
            "| Enrichment failures | {} |\n",
            report.enrichment.failed
        ));
    }
    md.push('\n');

    if let Some(discovery) = &report.discovery {
        md.push_str(&format!("**Discovery ended**: {}", discovery.end));
        if report.is_partial() {
            md.push_str(" (partial results)");
        }
        md.push_str("\n\n");
    }

    // Records
    md.push_str("## Jobs\n\n");
    if report.records.is_empty() {
        md.push_str("No jobs found.\n");
    }
    for (index, detail) in report.records.iter().enumerate() {
        let record = &detail.record;
        md.push_str(&format!("### {}. {}\n\n", index + 1, record.title));
        md.push_str(&format!(
            "- **Department/Company**: {}\n",
            record.department_or_company
        ));
        md.push_str(&format!("- **Location**: {}\n", record.location));
        md.push_str(&format!("- **Posted**: {}\n", record.posted_age));
        md.push_str(&format!("- **URL**: {}\n\n", record.url));

        if report.enriched() {
            md.push_str("#### Minimum Qualifications\n\n");
            md.push_str(or_placeholder(&detail.minimum_qualifications, NO_MINIMUM));
            md.push_str("\n\n#### Preferred Qualifications\n\n");
            md.push_str(or_placeholder(&detail.preferred_qualifications, NO_PREFERRED));
            md.push_str("\n\n");
        }
    }

    md
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() {
        placeholder
    } else {
        text
    }
}
