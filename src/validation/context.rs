// Assembling the idea context fed to every prompt

use crate::models::{IdeaContext, StageRecord, ValidationReport};

/// Build the idea context from whatever the pipeline has produced so far.
///
/// Title and summary come from the ideate stage (output first, then the
/// stage input as it was submitted), falling back to the project name.
/// The latest validation report, when present, is condensed into prior
/// feedback for the next round of prompts.
pub fn build_idea_context(
    project_name: &str,
    ideate: Option<&StageRecord>,
    latest_report: Option<&ValidationReport>,
) -> IdeaContext {
    let title = ideate
        .and_then(|record| field_from_stage(record, "title"))
        .unwrap_or_else(|| project_name.to_string());
    let summary = ideate
        .and_then(|record| field_from_stage(record, "summary"))
        .unwrap_or_default();

    IdeaContext {
        title,
        summary,
        prior_feedback: latest_report.map(summarize_report),
    }
}

/// Pull a string field from a stage record, preferring output over input
fn field_from_stage(record: &StageRecord, field: &str) -> Option<String> {
    for blob in [record.output.as_ref(), record.input.as_ref()]
        .into_iter()
        .flatten()
    {
        if let Some(value) = blob.get(field).and_then(|v| v.as_str()) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Condense a validation report into a short prior-feedback paragraph:
/// the overall verdict plus the two weakest sections with their summaries.
pub fn summarize_report(report: &ValidationReport) -> String {
    let mut ranked: Vec<_> = report.sections.iter().collect();
    ranked.sort_by_key(|(_, result)| result.score);

    let mut lines = vec![format!(
        "Latest validation: confidence {}/100, recommendation {}.",
        report.overall_confidence, report.recommendation
    )];
    for (dimension, result) in ranked.into_iter().take(2) {
        lines.push(format!(
            "{} scored {}: {}",
            dimension.display_name(),
            result.score,
            result.summary
        ));
    }
    lines.join(" ")
}
