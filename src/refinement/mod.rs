//! Iterative refinement loop for the product overview document
//!
//! The loop scores the document across all seven pillars, picks the weakest
//! one, asks the LLM to rewrite just the sections behind it, re-scores the
//! candidate and keeps it only when the targeted pillar did not get worse.
//! Every attempt lands in the iteration history whether it was kept or not,
//! so a run is auditable after the fact.
//!
//! Progress survives failure: an LLM error aborts the remaining rounds but
//! whatever was already accepted is returned alongside the error.

mod config;
mod state;

pub use config::{
    RefinementConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_TARGET_CONFIDENCE, MAX_ITERATION_CAP,
    MIN_ITERATION_CAP,
};
pub use state::{can_transition, is_terminal, transition, LoopState, StateTransitionError};

use crate::llm::{CallOptions, LlmClient, LlmError};
use crate::models::{
    FeedbackSnapshot, IdeaContext, ImprovementIteration, OverviewSection, Pillar, PillarResult,
    ProductOverview, MAX_RATIONALE_LEN,
};
use crate::prompts::{self, builtin, PromptError, PromptResolver};
use crate::utils::truncate_text;
use crate::validation::aggregate_with_weights;
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefineError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("LLM reply did not match the expected shape: {0}")]
    Schema(String),
    #[error("Failed to serialize overview document: {0}")]
    Document(String),
    #[error(transparent)]
    State(#[from] StateTransitionError),
}

impl RefineError {
    /// The underlying LLM error, when this failure came from the caller
    pub fn llm_error(&self) -> Option<&LlmError> {
        match self {
            RefineError::Llm(source) => Some(source),
            _ => None,
        }
    }
}

/// Everything a refinement run hands back, finished or aborted
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementOutcome {
    pub document: ProductOverview,
    /// Snapshot over the last accepted document. None only when the very
    /// first scoring failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<FeedbackSnapshot>,
    pub pillar_results: Vec<PillarResult>,
    pub iterations: Vec<ImprovementIteration>,
    pub rounds_completed: u32,
    pub final_state: LoopState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct Progress {
    document: ProductOverview,
    snapshot: Option<FeedbackSnapshot>,
    pillars: Vec<PillarResult>,
    iterations: Vec<ImprovementIteration>,
    rounds: u32,
    state: LoopState,
}

/// The refinement engine: one LLM client, one prompt resolver, one config
pub struct RefinementEngine<'a> {
    llm: &'a LlmClient,
    resolver: &'a mut PromptResolver,
    config: RefinementConfig,
    options: CallOptions,
}

impl<'a> RefinementEngine<'a> {
    pub fn new(
        llm: &'a LlmClient,
        resolver: &'a mut PromptResolver,
        config: RefinementConfig,
    ) -> Self {
        Self {
            llm,
            resolver,
            config: config.clamped(),
            options: CallOptions::default(),
        }
    }

    pub fn with_call_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the loop to termination. Errors do not bubble: they abort the
    /// remaining rounds and travel inside the outcome next to whatever
    /// progress had been accepted by then.
    pub async fn run(&mut self, idea: &IdeaContext, document: ProductOverview) -> RefinementOutcome {
        let mut progress = Progress {
            document,
            snapshot: None,
            pillars: Vec::new(),
            iterations: Vec::new(),
            rounds: 0,
            state: LoopState::Scoring,
        };

        let error = match self.drive(idea, &mut progress).await {
            Ok(()) => None,
            Err(e) => {
                log::warn!(
                    "Refinement aborted in {:?} after {} round(s): {}",
                    progress.state,
                    progress.rounds,
                    e
                );
                Some(e.to_string())
            }
        };

        RefinementOutcome {
            document: progress.document,
            snapshot: progress.snapshot,
            pillar_results: progress.pillars,
            iterations: progress.iterations,
            rounds_completed: progress.rounds,
            final_state: progress.state,
            error,
        }
    }

    async fn drive(&mut self, idea: &IdeaContext, progress: &mut Progress) -> Result<(), RefineError> {
        progress.pillars = self.score_pillars(idea, &progress.document).await?;
        progress.snapshot = Some(aggregate_with_weights(
            &progress.pillars,
            &self.config.pillar_weights,
        ));

        loop {
            let confidence = progress
                .snapshot
                .as_ref()
                .map(|s| s.overall_confidence)
                .unwrap_or(0);

            if confidence >= self.config.target_confidence {
                progress.state = state::transition(progress.state, LoopState::Done)?;
                log::info!(
                    "Refinement reached confidence {} (target {}) after {} round(s)",
                    confidence,
                    self.config.target_confidence,
                    progress.rounds
                );
                return Ok(());
            }
            if progress.rounds >= self.config.max_iterations {
                progress.state = state::transition(progress.state, LoopState::Done)?;
                log::info!(
                    "Refinement stopped at the iteration cap ({}) with confidence {}",
                    self.config.max_iterations,
                    confidence
                );
                return Ok(());
            }

            progress.state = state::transition(progress.state, LoopState::SelectWeakestPillar)?;
            let target = match select_weakest(&progress.pillars, self.config.pillar_target()) {
                Some(result) => result.clone(),
                None => {
                    progress.state = state::transition(progress.state, LoopState::Done)?;
                    log::info!(
                        "Refinement stopped: every pillar is at or above {:.1}",
                        self.config.pillar_target()
                    );
                    return Ok(());
                }
            };

            progress.state = state::transition(progress.state, LoopState::GenerateImprovement)?;
            let candidate = self
                .generate_improvement(idea, &progress.document, &target)
                .await?;

            progress.state = state::transition(progress.state, LoopState::ReScore)?;
            let candidate_pillars = self.score_pillars(idea, &candidate).await?;

            progress.state = state::transition(progress.state, LoopState::AcceptOrDiscard)?;
            let new_score = candidate_pillars
                .iter()
                .find(|result| result.pillar_id == target.pillar_id)
                .map(|result| result.score)
                .ok_or_else(|| {
                    RefineError::Schema(format!(
                        "re-score reply is missing pillar '{}'",
                        target.pillar_id.as_str()
                    ))
                })?;
            let score_delta = new_score - target.score;
            let accepted = score_delta >= 0.0;

            let sections = target.pillar_id.sections();
            progress.iterations.push(ImprovementIteration {
                pillar_impacted: target.pillar_id,
                score_delta,
                differences: describe_differences(&progress.document, &candidate, sections),
                before_section: section_snapshot(&progress.document, sections),
                after_section: section_snapshot(&candidate, sections),
                accepted,
                created_at: Utc::now(),
            });

            if accepted {
                log::info!(
                    "Round {}: accepted rewrite for '{}' ({:.1} -> {:.1})",
                    progress.rounds + 1,
                    target.pillar_id.as_str(),
                    target.score,
                    new_score
                );
                progress.document = candidate;
                progress.pillars = candidate_pillars;
                progress.snapshot = Some(aggregate_with_weights(
                    &progress.pillars,
                    &self.config.pillar_weights,
                ));
            } else {
                log::info!(
                    "Round {}: discarded rewrite for '{}' ({:.1} -> {:.1})",
                    progress.rounds + 1,
                    target.pillar_id.as_str(),
                    target.score,
                    new_score
                );
            }

            progress.rounds += 1;
        }
    }

    /// One LLM call scoring the document across all seven pillars
    async fn score_pillars(
        &mut self,
        idea: &IdeaContext,
        document: &ProductOverview,
    ) -> Result<Vec<PillarResult>, RefineError> {
        let overview_json = serde_json::to_string_pretty(document)
            .map_err(|e| RefineError::Document(e.to_string()))?;
        let context = prompts::pillar_scoring_context(idea, &overview_json);
        let prompt = prompts::render_prompt(self.resolver, builtin::PILLAR_SCORING, &context)?;
        let reply = self
            .llm
            .call_json(&prompt.system, &prompt.user, &self.options)
            .await?;
        parse_pillar_reply(&reply.data)
    }

    /// Ask for full replacement values for every section behind the pillar
    /// and build the candidate document from them
    async fn generate_improvement(
        &mut self,
        idea: &IdeaContext,
        document: &ProductOverview,
        target: &PillarResult,
    ) -> Result<ProductOverview, RefineError> {
        let sections = target.pillar_id.sections();
        let field_names: Vec<&str> = sections.iter().map(|s| s.as_str()).collect();
        let overview_json = serde_json::to_string_pretty(document)
            .map_err(|e| RefineError::Document(e.to_string()))?;
        let context = prompts::improvement_context(idea, &overview_json, target, &field_names);
        let prompt = prompts::render_prompt(self.resolver, builtin::SECTION_IMPROVEMENT, &context)?;
        let reply = self
            .llm
            .call_json(&prompt.system, &prompt.user, &self.options)
            .await?;

        let mut candidate = document.clone();
        for section in sections {
            let value = reply.data.get(section.as_str()).ok_or_else(|| {
                RefineError::Schema(format!(
                    "improvement reply is missing field '{}'",
                    section.as_str()
                ))
            })?;
            candidate
                .apply_section_value(*section, value)
                .map_err(RefineError::Schema)?;
        }
        candidate.ensure_populated();
        Ok(candidate)
    }
}

/// Draft a complete overview for an idea that has not been through the
/// design stage yet
pub async fn draft_overview(
    llm: &LlmClient,
    resolver: &mut PromptResolver,
    idea: &IdeaContext,
    options: &CallOptions,
) -> Result<ProductOverview, RefineError> {
    let context = prompts::stage_context(idea, None);
    let prompt = prompts::render_prompt(resolver, builtin::OVERVIEW_DRAFT, &context)?;
    let reply = llm.call_json(&prompt.system, &prompt.user, options).await?;
    ProductOverview::from_model_json(reply.data).map_err(RefineError::Schema)
}

/// Pick the pillar to improve next: lowest score wins, ties broken by the
/// fixed pillar order. Returns None once every pillar sits at or above the
/// per-pillar target, meaning there is no room left to improve.
pub fn select_weakest(pillars: &[PillarResult], pillar_target: f64) -> Option<&PillarResult> {
    pillars
        .iter()
        .min_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.pillar_id.cmp(&b.pillar_id))
        })
        .filter(|result| result.score < pillar_target)
}

/// Enforce the pillar reply contract: exactly one entry per pillar, scores
/// clamped into [0,10], entries returned in the fixed pillar order
fn parse_pillar_reply(data: &serde_json::Value) -> Result<Vec<PillarResult>, RefineError> {
    let raw = data
        .get("pillars")
        .ok_or_else(|| RefineError::Schema("missing 'pillars' array".to_string()))?;
    let mut results: Vec<PillarResult> = serde_json::from_value(raw.clone())
        .map_err(|e| RefineError::Schema(format!("pillar entries do not match: {}", e)))?;

    if results.len() != Pillar::all().len() {
        return Err(RefineError::Schema(format!(
            "expected exactly {} pillar entries, got {}",
            Pillar::all().len(),
            results.len()
        )));
    }
    let seen: BTreeSet<Pillar> = results.iter().map(|r| r.pillar_id).collect();
    if seen.len() != Pillar::all().len() {
        return Err(RefineError::Schema(
            "pillar entries contain duplicates".to_string(),
        ));
    }

    for result in &mut results {
        result.score = result.score.clamp(0.0, 10.0);
        result.analysis = truncate_text(&result.analysis, MAX_RATIONALE_LEN);
        if result.pillar_name.trim().is_empty() {
            result.pillar_name = result.pillar_id.display_name().to_string();
        }
    }
    results.sort_by_key(|result| result.pillar_id);
    Ok(results)
}

fn describe_differences(
    before: &ProductOverview,
    after: &ProductOverview,
    sections: &[OverviewSection],
) -> Vec<String> {
    sections
        .iter()
        .filter_map(|section| {
            let old_text = before.section_text(*section);
            let new_text = after.section_text(*section);
            if old_text == new_text {
                None
            } else {
                Some(format!(
                    "{} rewritten ({} -> {} chars)",
                    section.as_str(),
                    old_text.chars().count(),
                    new_text.chars().count()
                ))
            }
        })
        .collect()
}

fn section_snapshot(document: &ProductOverview, sections: &[OverviewSection]) -> String {
    sections
        .iter()
        .map(|section| format!("{}: {}", section.as_str(), document.section_text(*section)))
        .collect::<Vec<_>>()
        .join("\n")
}
