// Prompt store: builtin system/user pairs, stored overrides, tera rendering

pub mod builtin;
pub mod resolver;

// Re-export main types
pub use builtin::PromptPair;
pub use resolver::{PromptResolver, PromptSource, ResolvedPrompt};

use crate::models::{IdeaContext, PillarResult};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Unknown prompt '{0}'")]
    UnknownPrompt(String),
    #[error("Failed to render prompt: {0}")]
    Render(String),
}

/// A fully rendered system/user pair
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
    pub source: PromptSource,
}

/// Resolve a prompt by name and render both halves against the context
pub fn render_prompt(
    resolver: &mut PromptResolver,
    name: &str,
    context: &tera::Context,
) -> Result<RenderedPrompt, PromptError> {
    let resolved = resolver.resolve(name)?;
    let system = render_one(&resolved.system, context)?;
    let user = render_one(&resolved.user, context)?;
    Ok(RenderedPrompt {
        system,
        user,
        source: resolved.source,
    })
}

fn render_one(template: &str, context: &tera::Context) -> Result<String, PromptError> {
    tera::Tera::one_off(template, context, false).map_err(|e| PromptError::Render(e.to_string()))
}

// =============================================================================
// Context builders
// =============================================================================

/// Context for the per-dimension section prompts
pub fn section_context(idea: &IdeaContext) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("idea", idea);
    context
}

/// Context for scoring all pillars against an overview document
pub fn pillar_scoring_context(idea: &IdeaContext, overview_json: &str) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("idea", idea);
    context.insert("overview_json", overview_json);
    context
}

/// Context for rewriting the fields behind one weak pillar
pub fn improvement_context(
    idea: &IdeaContext,
    overview_json: &str,
    pillar: &PillarResult,
    section_fields: &[&str],
) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("idea", idea);
    context.insert("overview_json", overview_json);
    context.insert("pillar", pillar);
    context.insert("sections", section_fields);
    context
}

/// Context for a stage brief. `prior_json` carries the previous stage's
/// output when one exists.
pub fn stage_context(idea: &IdeaContext, prior_json: Option<&str>) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("idea", idea);
    if let Some(prior) = prior_json {
        context.insert("prior_json", prior);
    }
    context
}

/// Check that a template text renders against a fully populated sample
/// context. Used before an override is stored so a broken template fails
/// at save time instead of mid-pipeline.
pub fn validate_template(template: &str) -> Result<(), PromptError> {
    let idea = IdeaContext {
        title: "Sample idea".to_string(),
        summary: "A sample idea used to validate templates".to_string(),
        prior_feedback: Some("Sample feedback".to_string()),
    };
    let pillar = PillarResult {
        pillar_id: crate::models::Pillar::ProblemClarity,
        pillar_name: "Problem Clarity".to_string(),
        score: 5.0,
        analysis: "Sample analysis".to_string(),
        strength: "Sample strength".to_string(),
        weakness: "Sample weakness".to_string(),
        improvement_suggestion: "Sample suggestion".to_string(),
    };

    let mut context = tera::Context::new();
    context.insert("idea", &idea);
    context.insert("overview_json", "{}");
    context.insert("pillar", &pillar);
    context.insert("sections", &["problemSummary"]);
    context.insert("prior_json", "{}");

    render_one(template, &context).map(|_| ())
}
