// Built-in prompt pairs for every pipeline use

use crate::models::{SectionDimension, StageName};

/// Built-in prompt names
pub const SECTION_PROBLEM: &str = "section_problem";
pub const SECTION_MARKET: &str = "section_market";
pub const SECTION_COMPETITION: &str = "section_competition";
pub const SECTION_AUDIENCE: &str = "section_audience";
pub const SECTION_FEASIBILITY: &str = "section_feasibility";
pub const SECTION_PRICING: &str = "section_pricing";
pub const SECTION_GO_TO_MARKET: &str = "section_go_to_market";
pub const PILLAR_SCORING: &str = "pillar_scoring";
pub const OVERVIEW_DRAFT: &str = "overview_draft";
pub const SECTION_IMPROVEMENT: &str = "section_improvement";
pub const STAGE_IDEATE: &str = "stage_ideate";
pub const STAGE_DESIGN: &str = "stage_design";
pub const STAGE_BUILD: &str = "stage_build";
pub const STAGE_LAUNCH: &str = "stage_launch";
pub const STAGE_MONETISE: &str = "stage_monetise";

/// A system/user template pair. Both halves are tera templates rendered
/// against the same context.
#[derive(Debug, Clone, Copy)]
pub struct PromptPair {
    pub system: &'static str,
    pub user: &'static str,
}

/// Get a specific built-in prompt pair
pub fn get_builtin_pair(name: &str) -> Option<PromptPair> {
    match name {
        SECTION_PROBLEM => Some(PromptPair {
            system: SECTION_SYSTEM_TEMPLATE,
            user: SECTION_PROBLEM_USER_TEMPLATE,
        }),
        SECTION_MARKET => Some(PromptPair {
            system: SECTION_SYSTEM_TEMPLATE,
            user: SECTION_MARKET_USER_TEMPLATE,
        }),
        SECTION_COMPETITION => Some(PromptPair {
            system: SECTION_SYSTEM_TEMPLATE,
            user: SECTION_COMPETITION_USER_TEMPLATE,
        }),
        SECTION_AUDIENCE => Some(PromptPair {
            system: SECTION_SYSTEM_TEMPLATE,
            user: SECTION_AUDIENCE_USER_TEMPLATE,
        }),
        SECTION_FEASIBILITY => Some(PromptPair {
            system: SECTION_SYSTEM_TEMPLATE,
            user: SECTION_FEASIBILITY_USER_TEMPLATE,
        }),
        SECTION_PRICING => Some(PromptPair {
            system: SECTION_SYSTEM_TEMPLATE,
            user: SECTION_PRICING_USER_TEMPLATE,
        }),
        SECTION_GO_TO_MARKET => Some(PromptPair {
            system: SECTION_SYSTEM_TEMPLATE,
            user: SECTION_GO_TO_MARKET_USER_TEMPLATE,
        }),
        PILLAR_SCORING => Some(PromptPair {
            system: PILLAR_SCORING_SYSTEM_TEMPLATE,
            user: PILLAR_SCORING_USER_TEMPLATE,
        }),
        OVERVIEW_DRAFT => Some(PromptPair {
            system: OVERVIEW_DRAFT_SYSTEM_TEMPLATE,
            user: OVERVIEW_DRAFT_USER_TEMPLATE,
        }),
        SECTION_IMPROVEMENT => Some(PromptPair {
            system: SECTION_IMPROVEMENT_SYSTEM_TEMPLATE,
            user: SECTION_IMPROVEMENT_USER_TEMPLATE,
        }),
        STAGE_IDEATE => Some(PromptPair {
            system: STAGE_IDEATE_SYSTEM_TEMPLATE,
            user: STAGE_IDEATE_USER_TEMPLATE,
        }),
        STAGE_DESIGN => Some(PromptPair {
            system: STAGE_DESIGN_SYSTEM_TEMPLATE,
            user: STAGE_DESIGN_USER_TEMPLATE,
        }),
        STAGE_BUILD => Some(PromptPair {
            system: STAGE_BUILD_SYSTEM_TEMPLATE,
            user: STAGE_BUILD_USER_TEMPLATE,
        }),
        STAGE_LAUNCH => Some(PromptPair {
            system: STAGE_LAUNCH_SYSTEM_TEMPLATE,
            user: STAGE_LAUNCH_USER_TEMPLATE,
        }),
        STAGE_MONETISE => Some(PromptPair {
            system: STAGE_MONETISE_SYSTEM_TEMPLATE,
            user: STAGE_MONETISE_USER_TEMPLATE,
        }),
        _ => None,
    }
}

/// List all built-in prompt names
pub fn list_builtin_prompts() -> Vec<&'static str> {
    vec![
        SECTION_PROBLEM,
        SECTION_MARKET,
        SECTION_COMPETITION,
        SECTION_AUDIENCE,
        SECTION_FEASIBILITY,
        SECTION_PRICING,
        SECTION_GO_TO_MARKET,
        PILLAR_SCORING,
        OVERVIEW_DRAFT,
        SECTION_IMPROVEMENT,
        STAGE_IDEATE,
        STAGE_DESIGN,
        STAGE_BUILD,
        STAGE_LAUNCH,
        STAGE_MONETISE,
    ]
}

/// Whether a name refers to a built-in prompt
pub fn is_builtin_name(name: &str) -> bool {
    get_builtin_pair(name).is_some()
}

/// The prompt name for a validation section dimension
pub fn section_prompt_name(dimension: SectionDimension) -> &'static str {
    match dimension {
        SectionDimension::Problem => SECTION_PROBLEM,
        SectionDimension::Market => SECTION_MARKET,
        SectionDimension::Competition => SECTION_COMPETITION,
        SectionDimension::Audience => SECTION_AUDIENCE,
        SectionDimension::Feasibility => SECTION_FEASIBILITY,
        SectionDimension::Pricing => SECTION_PRICING,
        SectionDimension::GoToMarket => SECTION_GO_TO_MARKET,
    }
}

/// The prompt name for a pipeline stage brief. Validation has no single
/// brief: it fans out across the section prompts instead.
pub fn stage_prompt_name(stage: StageName) -> Option<&'static str> {
    match stage {
        StageName::Ideate => Some(STAGE_IDEATE),
        StageName::Validate => None,
        StageName::Design => Some(STAGE_DESIGN),
        StageName::Build => Some(STAGE_BUILD),
        StageName::Launch => Some(STAGE_LAUNCH),
        StageName::Monetise => Some(STAGE_MONETISE),
    }
}

// =============================================================================
// Section scoring (one user template per dimension, shared system)
// =============================================================================

const SECTION_SYSTEM_TEMPLATE: &str = r#"You are a startup analyst evaluating one dimension of an early-stage product idea. You are direct and specific: generic advice is useless to the founder. Score strictly. A 90+ score means you would personally invest on this dimension alone.

Output ONLY a valid JSON object with no additional text, no markdown formatting, and no trailing commas."#;

const SECTION_PROBLEM_USER_TEMPLATE: &str = r#"Evaluate how clearly this idea identifies a real, painful problem.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if idea.priorFeedback %}
## Prior Feedback
{{ idea.priorFeedback }}
{% endif %}
## Focus
1. Is the problem concrete enough that a specific person would recognise it as theirs?
2. How acute is the pain today, and what do people currently do about it?
3. Is this a problem people already pay (in money or time) to solve?

## Output Format
```json
{
  "score": <integer 0-100>,
  "summary": "<verdict in at most three sentences>",
  "actions": [
    "<concrete next step the founder should take>",
    "<another concrete step>"
  ],
  "insightBreakdown": {
    "painLevel": "<one-line assessment>",
    "currentAlternatives": "<what people do today>"
  },
  "suggestions": [
    "<optional sharper framing of the problem>"
  ]
}
```
"#;

const SECTION_MARKET_USER_TEMPLATE: &str = r#"Evaluate the market opportunity for this idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if idea.priorFeedback %}
## Prior Feedback
{{ idea.priorFeedback }}
{% endif %}
## Focus
1. Estimate the addressable market and whether it is growing or shrinking.
2. Is the market reachable by a small team, or locked behind incumbents and procurement?
3. Are there adjacent markets this could expand into?

## Output Format
```json
{
  "score": <integer 0-100>,
  "summary": "<verdict in at most three sentences>",
  "actions": [
    "<concrete next step to validate market size>"
  ],
  "insightBreakdown": {
    "estimatedSize": "<rough TAM with reasoning>",
    "trend": "growing|flat|shrinking"
  },
  "suggestions": []
}
```
"#;

const SECTION_COMPETITION_USER_TEMPLATE: &str = r#"Evaluate the competitive landscape for this idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if idea.priorFeedback %}
## Prior Feedback
{{ idea.priorFeedback }}
{% endif %}
## Focus
1. Name the closest direct competitors and the indirect alternatives people use today.
2. Where is the gap this idea could own, if any?
3. How defensible would an early position be?

## Output Format
```json
{
  "score": <integer 0-100>,
  "summary": "<verdict in at most three sentences>",
  "actions": [
    "<concrete next step, e.g. a competitor teardown to run>"
  ],
  "insightBreakdown": {
    "directCompetitors": "<names, comma separated>",
    "gap": "<the opening, or 'none visible'>"
  },
  "suggestions": []
}
```
"#;

const SECTION_AUDIENCE_USER_TEMPLATE: &str = r#"Evaluate how well this idea fits a specific, reachable audience.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if idea.priorFeedback %}
## Prior Feedback
{{ idea.priorFeedback }}
{% endif %}
## Focus
1. Who exactly is the first user, and how would you find one hundred of them this month?
2. Does the idea speak their language, or a generic "everyone" language?
3. Is the buyer the same person as the user?

## Output Format
```json
{
  "score": <integer 0-100>,
  "summary": "<verdict in at most three sentences>",
  "actions": [
    "<concrete next step to reach the first users>"
  ],
  "insightBreakdown": {
    "firstUser": "<one-line persona>",
    "reachability": "<where these people gather>"
  },
  "suggestions": []
}
```
"#;

const SECTION_FEASIBILITY_USER_TEMPLATE: &str = r#"Evaluate the technical and operational feasibility of this idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if idea.priorFeedback %}
## Prior Feedback
{{ idea.priorFeedback }}
{% endif %}
## Focus
1. What is the hardest thing to build here, and has anyone built it before?
2. Could a small team ship a credible MVP in under three months?
3. Which dependencies (data, partnerships, regulation) could block the build entirely?

## Output Format
```json
{
  "score": <integer 0-100>,
  "summary": "<verdict in at most three sentences>",
  "actions": [
    "<concrete de-risking step for the hardest part>"
  ],
  "insightBreakdown": {
    "hardestPart": "<one line>",
    "mvpEstimate": "<rough time to first usable version>"
  },
  "suggestions": []
}
```
"#;

const SECTION_PRICING_USER_TEMPLATE: &str = r#"Evaluate the pricing and revenue potential of this idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if idea.priorFeedback %}
## Prior Feedback
{{ idea.priorFeedback }}
{% endif %}
## Focus
1. Who pays, how much, and how often? Anchor against what they pay for alternatives today.
2. Which revenue model fits the usage pattern: subscription, usage-based, one-off, marketplace take?
3. Is the willingness to pay strong enough to support acquisition costs?

## Output Format
```json
{
  "score": <integer 0-100>,
  "summary": "<verdict in at most three sentences>",
  "actions": [
    "<concrete next step to test willingness to pay>"
  ],
  "insightBreakdown": {
    "likelyModel": "<best-fit revenue model>",
    "priceAnchor": "<what buyers pay today for alternatives>"
  },
  "suggestions": []
}
```
"#;

const SECTION_GO_TO_MARKET_USER_TEMPLATE: &str = r#"Evaluate the go-to-market path for this idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if idea.priorFeedback %}
## Prior Feedback
{{ idea.priorFeedback }}
{% endif %}
## Focus
1. What is the single most promising acquisition channel for the first hundred users?
2. Does the product have any built-in distribution (virality, network effects, integrations)?
3. How long is the sales cycle, and who needs convincing?

## Output Format
```json
{
  "score": <integer 0-100>,
  "summary": "<verdict in at most three sentences>",
  "actions": [
    "<concrete first channel experiment to run>"
  ],
  "insightBreakdown": {
    "bestChannel": "<channel with one-line rationale>",
    "salesCycle": "<days|weeks|months with reasoning>"
  },
  "suggestions": []
}
```
"#;

// =============================================================================
// Pillar scoring (all seven pillars, one call)
// =============================================================================

const PILLAR_SCORING_SYSTEM_TEMPLATE: &str = r#"You are a startup advisor scoring a product overview document across seven fixed pillars. Score each pillar 0-10 against the document as written, not against the idea's potential. Be consistent: the same document must earn the same scores.

Output ONLY a valid JSON object with no additional text, no markdown formatting, and no trailing commas."#;

const PILLAR_SCORING_USER_TEMPLATE: &str = r#"Score this product overview across all seven pillars.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}

## Product Overview
{{ overview_json }}

## Pillars
Score every pillar exactly once, in this order: audienceFit, problemClarity, solutionStrength, competition, marketSize, feasibility, monetisation.

## Output Format
```json
{
  "pillars": [
    {
      "pillarId": "audienceFit",
      "pillarName": "Audience Fit",
      "score": <number 0-10>,
      "analysis": "<two or three sentences on this pillar>",
      "strength": "<the strongest point in the document>",
      "weakness": "<the weakest point in the document>",
      "improvementSuggestion": "<one concrete change that would raise the score>"
    }
  ]
}
```

## Guidelines
- Judge only what the document says. Vague sections score low even for good ideas.
- The weakness must point at specific document content, not a general concern.
- The improvement suggestion must be actionable by editing the document.
"#;

// =============================================================================
// Overview drafting and section improvement
// =============================================================================

const OVERVIEW_DRAFT_SYSTEM_TEMPLATE: &str = r#"You are a startup strategist turning a validated idea into a complete product overview document. Every field must be filled with specific content; never leave a field empty or write "N/A".

Output ONLY a valid JSON object with no additional text, no markdown formatting, and no trailing commas."#;

const OVERVIEW_DRAFT_USER_TEMPLATE: &str = r#"Draft a complete product overview for this idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if idea.priorFeedback %}
## Validation Feedback
{{ idea.priorFeedback }}
{% endif %}
## Output Format
```json
{
  "refinedPitch": "<one-paragraph pitch>",
  "problemSummary": "<the problem in two or three sentences>",
  "personas": [
    "<persona 1: role, context, pain>",
    "<persona 2>"
  ],
  "solution": "<how the product solves the problem>",
  "coreFeatures": [
    "<feature 1>",
    "<feature 2>",
    "<feature 3>"
  ],
  "uniqueValue": "<why this over every alternative>",
  "competition": "<the competitive landscape in two or three sentences>",
  "risks": [
    {
      "risk": "<specific risk>",
      "mitigation": "<how to reduce it>"
    }
  ],
  "monetisation": [
    {
      "model": "<revenue model name>",
      "description": "<how it works for this product>"
    }
  ],
  "marketSize": "<addressable market with reasoning>",
  "buildNotes": "<what to build first and what is hard>"
}
```
"#;

const SECTION_IMPROVEMENT_SYSTEM_TEMPLATE: &str = r#"You are a startup strategist revising one weak area of a product overview document. Rewrite only the fields you are asked for; every rewritten field must be complete, specific, and materially better than the current version.

Output ONLY a valid JSON object with no additional text, no markdown formatting, and no trailing commas."#;

const SECTION_IMPROVEMENT_USER_TEMPLATE: &str = r#"Improve the weakest area of this product overview.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}

## Current Overview
{{ overview_json }}

## Weak Pillar
**Pillar**: {{ pillar.pillarName }}
**Weakness**: {{ pillar.weakness }}
**Suggested improvement**: {{ pillar.improvementSuggestion }}

## Fields To Rewrite
Rewrite these fields of the overview, and only these:
{% for field in sections %}
- {{ field }}
{% endfor %}

## Output Format
Return ONLY a JSON object whose keys are exactly the fields listed above.
Field shapes match the current overview: refinedPitch, problemSummary, solution, uniqueValue, competition, marketSize and buildNotes are strings; personas and coreFeatures are arrays of strings; risks is an array of objects with "risk" and "mitigation"; monetisation is an array of objects with "model" and "description".

## Guidelines
- Address the stated weakness directly.
- Keep every other aspect of the product unchanged; do not invent a different product.
- Replace each field wholesale. Partial edits are not possible.
"#;

// =============================================================================
// Stage briefs
// =============================================================================

const STAGE_IDEATE_SYSTEM_TEMPLATE: &str = r#"You are a startup ideation partner. Sharpen raw ideas into something concrete enough to validate: a named audience, a stated problem and a differentiator.

Output ONLY a valid JSON object with no additional text, no markdown formatting, and no trailing commas."#;

const STAGE_IDEATE_USER_TEMPLATE: &str = r#"Sharpen this raw idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}

## Output Format
```json
{
  "title": "<sharpened title, at most eight words>",
  "summary": "<the idea in two or three sentences>",
  "problem": "<the underlying problem>",
  "audience": "<the specific first audience>",
  "differentiator": "<what makes this different from the obvious alternative>"
}
```
"#;

const STAGE_DESIGN_SYSTEM_TEMPLATE: &str = r#"You are a startup strategist turning a validated idea into a complete product overview document. Every field must be filled with specific content; never leave a field empty or write "N/A".

Output ONLY a valid JSON object with no additional text, no markdown formatting, and no trailing commas."#;

const STAGE_DESIGN_USER_TEMPLATE: &str = r#"Design the product overview for this validated idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if idea.priorFeedback %}
## Validation Feedback
{{ idea.priorFeedback }}
{% endif %}{% if prior_json %}
## Earlier Stage Output
{{ prior_json }}
{% endif %}
## Output Format
```json
{
  "refinedPitch": "<one-paragraph pitch>",
  "problemSummary": "<the problem in two or three sentences>",
  "personas": [
    "<persona 1: role, context, pain>"
  ],
  "solution": "<how the product solves the problem>",
  "coreFeatures": [
    "<feature 1>",
    "<feature 2>"
  ],
  "uniqueValue": "<why this over every alternative>",
  "competition": "<the competitive landscape in two or three sentences>",
  "risks": [
    {
      "risk": "<specific risk>",
      "mitigation": "<how to reduce it>"
    }
  ],
  "monetisation": [
    {
      "model": "<revenue model name>",
      "description": "<how it works for this product>"
    }
  ],
  "marketSize": "<addressable market with reasoning>",
  "buildNotes": "<what to build first and what is hard>"
}
```
"#;

const STAGE_BUILD_SYSTEM_TEMPLATE: &str = r#"You are a pragmatic technical co-founder planning an MVP build. Prefer boring technology and a scope a small team can ship in weeks.

Output ONLY a valid JSON object with no additional text, no markdown formatting, and no trailing commas."#;

const STAGE_BUILD_USER_TEMPLATE: &str = r#"Plan the MVP build for this idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if prior_json %}
## Product Overview
{{ prior_json }}
{% endif %}
## Output Format
```json
{
  "mvpScope": "<what the first shippable version does, and pointedly does not do>",
  "stack": [
    "<technology choice with one-line rationale>"
  ],
  "milestones": [
    "<milestone 1 with rough duration>",
    "<milestone 2>"
  ],
  "openQuestions": [
    "<technical unknown to resolve before or during the build>"
  ]
}
```
"#;

const STAGE_LAUNCH_SYSTEM_TEMPLATE: &str = r#"You are a launch strategist for early-stage products. Plan for the first hundred users, not a press tour.

Output ONLY a valid JSON object with no additional text, no markdown formatting, and no trailing commas."#;

const STAGE_LAUNCH_USER_TEMPLATE: &str = r#"Plan the launch for this idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if prior_json %}
## Earlier Stage Output
{{ prior_json }}
{% endif %}
## Output Format
```json
{
  "launchPlan": "<the launch sequence in a short paragraph>",
  "channels": [
    "<channel with one-line rationale>"
  ],
  "metrics": [
    "<metric that would prove the launch worked>"
  ],
  "firstWeekGoal": "<one measurable goal for week one>"
}
```
"#;

const STAGE_MONETISE_SYSTEM_TEMPLATE: &str = r#"You are a pricing strategist for early-stage products. Anchor every price against what the buyer pays today, and prefer models a founder can implement without a sales team.

Output ONLY a valid JSON object with no additional text, no markdown formatting, and no trailing commas."#;

const STAGE_MONETISE_USER_TEMPLATE: &str = r#"Plan the monetisation for this idea.

## Idea
**Title**: {{ idea.title }}
**Summary**: {{ idea.summary }}
{% if prior_json %}
## Earlier Stage Output
{{ prior_json }}
{% endif %}
## Output Format
```json
{
  "models": [
    {
      "model": "<revenue model name>",
      "description": "<how it works for this product, with a price point>"
    }
  ],
  "pricing": "<recommended starting price and tier structure>",
  "projections": "<rough path to first meaningful revenue>"
}
```
"#;
