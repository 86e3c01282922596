//! Section scorers for the validation stage
//!
//! Seven independent dimensions are scored against one idea, fanned out
//! concurrently and merged once all of them land. Any single failure fails
//! the whole report: a partial report would skew the aggregate confidence.

mod aggregator;
mod context;

pub use aggregator::{
    aggregate, aggregate_with_weights, recommendation_for, weighted_confidence, BUILD_THRESHOLD,
    REVISE_THRESHOLD,
};
pub use context::{build_idea_context, summarize_report};

use crate::llm::{CallOptions, LlmClient, LlmError};
use crate::models::{
    IdeaContext, SectionDimension, SectionResult, ValidationReport, MAX_RATIONALE_LEN,
};
use crate::prompts::{self, builtin, PromptResolver, RenderedPrompt};
use crate::utils::truncate_text;
use chrono::Utc;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Prompt for '{dimension}' failed: {message}")]
    Prompt { dimension: String, message: String },
    #[error("Scoring '{dimension}' failed: {source}")]
    Llm {
        dimension: String,
        #[source]
        source: LlmError,
    },
    #[error("Scoring '{dimension}' returned an invalid result: {message}")]
    Invalid { dimension: String, message: String },
}

impl ScoreError {
    /// The underlying LLM error, when this failure came from the caller
    pub fn llm_error(&self) -> Option<&LlmError> {
        match self {
            ScoreError::Llm { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Score a single dimension for an idea
pub async fn run_section(
    llm: &LlmClient,
    resolver: &mut PromptResolver,
    dimension: SectionDimension,
    idea: &IdeaContext,
    options: &CallOptions,
) -> Result<SectionResult, ScoreError> {
    let prompt = render_for(resolver, dimension, idea)?;
    score_rendered(llm, dimension, prompt, options).await
}

/// Score all seven dimensions concurrently and fold them into a report.
/// Nothing is returned unless every scorer succeeded.
pub async fn score_all_sections(
    llm: &LlmClient,
    resolver: &mut PromptResolver,
    idea: &IdeaContext,
    options: &CallOptions,
) -> Result<ValidationReport, ScoreError> {
    let problem_prompt = render_for(resolver, SectionDimension::Problem, idea)?;
    let market_prompt = render_for(resolver, SectionDimension::Market, idea)?;
    let competition_prompt = render_for(resolver, SectionDimension::Competition, idea)?;
    let audience_prompt = render_for(resolver, SectionDimension::Audience, idea)?;
    let feasibility_prompt = render_for(resolver, SectionDimension::Feasibility, idea)?;
    let pricing_prompt = render_for(resolver, SectionDimension::Pricing, idea)?;
    let go_to_market_prompt = render_for(resolver, SectionDimension::GoToMarket, idea)?;

    let (problem, market, competition, audience, feasibility, pricing, go_to_market) = tokio::join!(
        score_rendered(llm, SectionDimension::Problem, problem_prompt, options),
        score_rendered(llm, SectionDimension::Market, market_prompt, options),
        score_rendered(llm, SectionDimension::Competition, competition_prompt, options),
        score_rendered(llm, SectionDimension::Audience, audience_prompt, options),
        score_rendered(llm, SectionDimension::Feasibility, feasibility_prompt, options),
        score_rendered(llm, SectionDimension::Pricing, pricing_prompt, options),
        score_rendered(llm, SectionDimension::GoToMarket, go_to_market_prompt, options),
    );

    let mut sections = BTreeMap::new();
    sections.insert(SectionDimension::Problem, problem?);
    sections.insert(SectionDimension::Market, market?);
    sections.insert(SectionDimension::Competition, competition?);
    sections.insert(SectionDimension::Audience, audience?);
    sections.insert(SectionDimension::Feasibility, feasibility?);
    sections.insert(SectionDimension::Pricing, pricing?);
    sections.insert(SectionDimension::GoToMarket, go_to_market?);

    let entries: Vec<(f64, f64)> = sections
        .values()
        .map(|result| (1.0, result.score as f64))
        .collect();
    let overall_confidence = aggregator::weighted_confidence(&entries);

    Ok(ValidationReport {
        sections,
        overall_confidence,
        recommendation: aggregator::recommendation_for(overall_confidence),
        created_at: Utc::now(),
    })
}

fn render_for(
    resolver: &mut PromptResolver,
    dimension: SectionDimension,
    idea: &IdeaContext,
) -> Result<RenderedPrompt, ScoreError> {
    let name = builtin::section_prompt_name(dimension);
    prompts::render_prompt(resolver, name, &prompts::section_context(idea)).map_err(|e| {
        ScoreError::Prompt {
            dimension: dimension.as_str().to_string(),
            message: e.to_string(),
        }
    })
}

async fn score_rendered(
    llm: &LlmClient,
    dimension: SectionDimension,
    prompt: RenderedPrompt,
    options: &CallOptions,
) -> Result<SectionResult, ScoreError> {
    let reply = llm
        .call_json(&prompt.system, &prompt.user, options)
        .await
        .map_err(|source| ScoreError::Llm {
            dimension: dimension.as_str().to_string(),
            source,
        })?;
    log::debug!(
        "Section '{}' scored in {} attempt(s)",
        dimension.as_str(),
        reply.meta.attempts
    );
    validate_section_reply(dimension, &reply.data)
}

/// Enforce the section result contract on a raw JSON reply.
///
/// A present out-of-range score is clamped; a missing or non-numeric score,
/// a missing summary, or an empty action list is a hard failure.
fn validate_section_reply(
    dimension: SectionDimension,
    data: &serde_json::Value,
) -> Result<SectionResult, ScoreError> {
    let invalid = |message: &str| ScoreError::Invalid {
        dimension: dimension.as_str().to_string(),
        message: message.to_string(),
    };

    let raw_score = data
        .get("score")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| invalid("missing or non-numeric 'score'"))?;
    let score = raw_score.round().clamp(0.0, 100.0) as u8;

    let summary = data
        .get("summary")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid("missing or empty 'summary'"))?;
    let summary = truncate_text(summary, MAX_RATIONALE_LEN);

    let actions: Vec<String> = data
        .get("actions")
        .and_then(|v| v.as_array())
        .ok_or_else(|| invalid("missing 'actions' array"))?
        .iter()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if actions.is_empty() {
        return Err(invalid("'actions' must contain at least one non-empty entry"));
    }

    let insight_breakdown = data
        .get("insightBreakdown")
        .filter(|v| !v.is_null())
        .cloned();
    let suggestions = data
        .get("suggestions")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|items| !items.is_empty());

    Ok(SectionResult {
        score,
        summary,
        actions,
        insight_breakdown,
        suggestions,
    })
}
