// Domain types shared across storage, the LLM flows and the API surface.
// Everything serializes camelCase so API clients see one consistent shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Placeholder used to backfill document fields the model omitted
pub const FIELD_PLACEHOLDER: &str = "To be defined";

/// Maximum length for free-text rationale returned by scorers
pub const MAX_RATIONALE_LEN: usize = 1200;

// =============================================================================
// Pipeline stages
// =============================================================================

/// Stages of the idea pipeline, in fixed order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Ideate,
    Validate,
    Design,
    Build,
    Launch,
    Monetise,
}

impl StageName {
    /// Returns all stages in pipeline order
    pub fn all() -> &'static [StageName] {
        &[
            StageName::Ideate,
            StageName::Validate,
            StageName::Design,
            StageName::Build,
            StageName::Launch,
            StageName::Monetise,
        ]
    }

    /// Returns the string representation of this stage
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Ideate => "ideate",
            StageName::Validate => "validate",
            StageName::Design => "design",
            StageName::Build => "build",
            StageName::Launch => "launch",
            StageName::Monetise => "monetise",
        }
    }

    /// Returns the human-readable name of this stage
    pub fn display_name(&self) -> &'static str {
        match self {
            StageName::Ideate => "Ideate",
            StageName::Validate => "Validate",
            StageName::Design => "Design",
            StageName::Build => "Build",
            StageName::Launch => "Launch",
            StageName::Monetise => "Monetise",
        }
    }

    /// Returns the zero-based position of this stage in the pipeline
    pub fn index(&self) -> usize {
        StageName::all().iter().position(|s| s == self).unwrap_or(0)
    }

    /// Returns the next stage, or None if this is the last stage
    pub fn next(&self) -> Option<StageName> {
        StageName::all().get(self.index() + 1).copied()
    }
}

impl Default for StageName {
    fn default() -> Self {
        StageName::Ideate
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StageName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ideate" => Ok(StageName::Ideate),
            "validate" => Ok(StageName::Validate),
            "design" => Ok(StageName::Design),
            "build" => Ok(StageName::Build),
            "launch" => Ok(StageName::Launch),
            "monetise" => Ok(StageName::Monetise),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}

/// Derived status of a stage for the pipeline view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    NotStarted,
    InProgress,
    Complete,
}

/// One entry in the pipeline status view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageStatusEntry {
    pub stage: StageName,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Projects
// =============================================================================

/// A project owning one idea and all of its stage data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stage input/output blobs as stored per (project, stage)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    pub stage: StageName,
    pub input: Option<serde_json::Value>,
    pub output: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Validation pillars
// =============================================================================

/// The seven scoring pillars, in fixed order (also the tie-break order)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Pillar {
    AudienceFit,
    ProblemClarity,
    SolutionStrength,
    Competition,
    MarketSize,
    Feasibility,
    Monetisation,
}

impl Pillar {
    /// Returns all pillars in their fixed order
    pub fn all() -> &'static [Pillar] {
        &[
            Pillar::AudienceFit,
            Pillar::ProblemClarity,
            Pillar::SolutionStrength,
            Pillar::Competition,
            Pillar::MarketSize,
            Pillar::Feasibility,
            Pillar::Monetisation,
        ]
    }

    /// Returns the wire identifier of this pillar
    pub fn as_str(&self) -> &'static str {
        match self {
            Pillar::AudienceFit => "audienceFit",
            Pillar::ProblemClarity => "problemClarity",
            Pillar::SolutionStrength => "solutionStrength",
            Pillar::Competition => "competition",
            Pillar::MarketSize => "marketSize",
            Pillar::Feasibility => "feasibility",
            Pillar::Monetisation => "monetisation",
        }
    }

    /// Returns the human-readable name of this pillar
    pub fn display_name(&self) -> &'static str {
        match self {
            Pillar::AudienceFit => "Audience Fit",
            Pillar::ProblemClarity => "Problem Clarity",
            Pillar::SolutionStrength => "Solution Strength",
            Pillar::Competition => "Competition",
            Pillar::MarketSize => "Market Size",
            Pillar::Feasibility => "Feasibility",
            Pillar::Monetisation => "Monetisation",
        }
    }

    /// Returns the overview sections rewritten when improving this pillar
    pub fn sections(&self) -> &'static [OverviewSection] {
        match self {
            Pillar::AudienceFit => &[OverviewSection::Personas],
            Pillar::ProblemClarity => &[OverviewSection::ProblemSummary],
            Pillar::SolutionStrength => &[
                OverviewSection::RefinedPitch,
                OverviewSection::Solution,
                OverviewSection::CoreFeatures,
                OverviewSection::UniqueValue,
            ],
            Pillar::Competition => &[OverviewSection::Competition],
            Pillar::MarketSize => &[OverviewSection::MarketSize],
            Pillar::Feasibility => &[OverviewSection::BuildNotes, OverviewSection::Risks],
            Pillar::Monetisation => &[OverviewSection::Monetisation],
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Pillar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pillar::all()
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown pillar: {}", s))
    }
}

/// Result of scoring one pillar against the current document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PillarResult {
    pub pillar_id: Pillar,
    pub pillar_name: String,
    /// Score on the 0-10 scale, clamped on ingest
    pub score: f64,
    pub analysis: String,
    pub strength: String,
    pub weakness: String,
    pub improvement_suggestion: String,
}

/// Final build/revise/drop verdict
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Build,
    Revise,
    Drop,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Build => "build",
            Recommendation::Revise => "revise",
            Recommendation::Drop => "drop",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-pillar score plus rationale inside a feedback snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PillarScoreEntry {
    pub score: f64,
    pub rationale: String,
}

/// Derived, recomputable view over the current pillar results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSnapshot {
    pub recommendation: Recommendation,
    pub overall_confidence: u8,
    pub scores: BTreeMap<Pillar, PillarScoreEntry>,
}

// =============================================================================
// Validation sections
// =============================================================================

/// The seven validation dimensions scored in the parallel validation flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SectionDimension {
    Problem,
    Market,
    Competition,
    Audience,
    Feasibility,
    Pricing,
    GoToMarket,
}

impl SectionDimension {
    /// Returns all dimensions in their fixed order
    pub fn all() -> &'static [SectionDimension] {
        &[
            SectionDimension::Problem,
            SectionDimension::Market,
            SectionDimension::Competition,
            SectionDimension::Audience,
            SectionDimension::Feasibility,
            SectionDimension::Pricing,
            SectionDimension::GoToMarket,
        ]
    }

    /// Returns the wire identifier of this dimension
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionDimension::Problem => "problem",
            SectionDimension::Market => "market",
            SectionDimension::Competition => "competition",
            SectionDimension::Audience => "audience",
            SectionDimension::Feasibility => "feasibility",
            SectionDimension::Pricing => "pricing",
            SectionDimension::GoToMarket => "goToMarket",
        }
    }

    /// Returns the human-readable name of this dimension
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionDimension::Problem => "Problem",
            SectionDimension::Market => "Market",
            SectionDimension::Competition => "Competition",
            SectionDimension::Audience => "Audience",
            SectionDimension::Feasibility => "Feasibility",
            SectionDimension::Pricing => "Pricing",
            SectionDimension::GoToMarket => "Go-To-Market",
        }
    }
}

impl fmt::Display for SectionDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SectionDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionDimension::all()
            .iter()
            .find(|d| d.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown dimension: {}", s))
    }
}

/// Result of one section scorer call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionResult {
    /// Score on the 0-100 scale, clamped on ingest
    pub score: u8,
    pub summary: String,
    pub actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight_breakdown: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

/// Output of the parallel validation flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub sections: BTreeMap<SectionDimension, SectionResult>,
    pub overall_confidence: u8,
    pub recommendation: Recommendation,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product overview document
// =============================================================================

/// A named risk with its mitigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskEntry {
    pub risk: String,
    pub mitigation: String,
}

/// One monetisation model entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonetisationModel {
    pub model: String,
    pub description: String,
}

/// Sections of the product overview, identified by their JSON field name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum OverviewSection {
    RefinedPitch,
    ProblemSummary,
    Personas,
    Solution,
    CoreFeatures,
    UniqueValue,
    Competition,
    Risks,
    Monetisation,
    MarketSize,
    BuildNotes,
}

impl OverviewSection {
    /// Returns the JSON field name of this section
    pub fn as_str(&self) -> &'static str {
        match self {
            OverviewSection::RefinedPitch => "refinedPitch",
            OverviewSection::ProblemSummary => "problemSummary",
            OverviewSection::Personas => "personas",
            OverviewSection::Solution => "solution",
            OverviewSection::CoreFeatures => "coreFeatures",
            OverviewSection::UniqueValue => "uniqueValue",
            OverviewSection::Competition => "competition",
            OverviewSection::Risks => "risks",
            OverviewSection::Monetisation => "monetisation",
            OverviewSection::MarketSize => "marketSize",
            OverviewSection::BuildNotes => "buildNotes",
        }
    }
}

impl fmt::Display for OverviewSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The product overview document refined over the course of a project.
///
/// Treated as a versioned value: every accepted refinement produces a full
/// replacement copy. A persisted overview is always fully populated; missing
/// or empty fields are backfilled with placeholders before it leaves this
/// module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductOverview {
    pub refined_pitch: String,
    pub problem_summary: String,
    pub personas: Vec<String>,
    pub solution: String,
    pub core_features: Vec<String>,
    pub unique_value: String,
    pub competition: String,
    pub risks: Vec<RiskEntry>,
    pub monetisation: Vec<MonetisationModel>,
    pub market_size: String,
    pub build_notes: String,
}

impl ProductOverview {
    /// Parse a model-produced JSON object into a fully populated overview.
    /// Unknown fields are ignored; missing or empty fields get placeholders.
    pub fn from_model_json(value: serde_json::Value) -> Result<ProductOverview, String> {
        let mut overview: ProductOverview = serde_json::from_value(value)
            .map_err(|e| format!("Overview does not match expected shape: {}", e))?;
        overview.ensure_populated();
        Ok(overview)
    }

    /// Backfill every missing or empty field with a placeholder so partial
    /// documents are never persisted
    pub fn ensure_populated(&mut self) {
        fn fill(s: &mut String) {
            if s.trim().is_empty() {
                *s = FIELD_PLACEHOLDER.to_string();
            }
        }

        fill(&mut self.refined_pitch);
        fill(&mut self.problem_summary);
        fill(&mut self.solution);
        fill(&mut self.unique_value);
        fill(&mut self.competition);
        fill(&mut self.market_size);
        fill(&mut self.build_notes);

        if self.personas.iter().all(|p| p.trim().is_empty()) {
            self.personas = vec![FIELD_PLACEHOLDER.to_string()];
        }
        if self.core_features.iter().all(|f| f.trim().is_empty()) {
            self.core_features = vec![FIELD_PLACEHOLDER.to_string()];
        }
        if self.risks.is_empty() {
            self.risks = vec![RiskEntry {
                risk: FIELD_PLACEHOLDER.to_string(),
                mitigation: FIELD_PLACEHOLDER.to_string(),
            }];
        }
        if self.monetisation.is_empty() {
            self.monetisation = vec![MonetisationModel {
                model: FIELD_PLACEHOLDER.to_string(),
                description: FIELD_PLACEHOLDER.to_string(),
            }];
        }
    }

    /// True if no field is missing or empty
    pub fn is_fully_populated(&self) -> bool {
        let strings = [
            &self.refined_pitch,
            &self.problem_summary,
            &self.solution,
            &self.unique_value,
            &self.competition,
            &self.market_size,
            &self.build_notes,
        ];
        strings.iter().all(|s| !s.trim().is_empty())
            && !self.personas.is_empty()
            && !self.core_features.is_empty()
            && !self.risks.is_empty()
            && !self.monetisation.is_empty()
    }

    /// Render one section as text for prompts and audit history
    pub fn section_text(&self, section: OverviewSection) -> String {
        fn list_json<T: Serialize>(items: &[T]) -> String {
            serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
        }

        match section {
            OverviewSection::RefinedPitch => self.refined_pitch.clone(),
            OverviewSection::ProblemSummary => self.problem_summary.clone(),
            OverviewSection::Personas => list_json(&self.personas),
            OverviewSection::Solution => self.solution.clone(),
            OverviewSection::CoreFeatures => list_json(&self.core_features),
            OverviewSection::UniqueValue => self.unique_value.clone(),
            OverviewSection::Competition => self.competition.clone(),
            OverviewSection::Risks => list_json(&self.risks),
            OverviewSection::Monetisation => list_json(&self.monetisation),
            OverviewSection::MarketSize => self.market_size.clone(),
            OverviewSection::BuildNotes => self.build_notes.clone(),
        }
    }

    /// Replace one section with a full replacement value from a model
    /// response. Rejects wrong types and empty replacements.
    pub fn apply_section_value(
        &mut self,
        section: OverviewSection,
        value: &serde_json::Value,
    ) -> Result<(), String> {
        fn as_text(section: OverviewSection, value: &serde_json::Value) -> Result<String, String> {
            let text = value
                .as_str()
                .ok_or_else(|| format!("Replacement for '{}' must be a string", section))?;
            if text.trim().is_empty() {
                return Err(format!("Replacement for '{}' is empty", section));
            }
            Ok(text.to_string())
        }

        fn as_list<T: for<'de> Deserialize<'de>>(
            section: OverviewSection,
            value: &serde_json::Value,
        ) -> Result<Vec<T>, String> {
            let items: Vec<T> = serde_json::from_value(value.clone())
                .map_err(|e| format!("Replacement for '{}' has wrong shape: {}", section, e))?;
            if items.is_empty() {
                return Err(format!("Replacement for '{}' is empty", section));
            }
            Ok(items)
        }

        match section {
            OverviewSection::RefinedPitch => self.refined_pitch = as_text(section, value)?,
            OverviewSection::ProblemSummary => self.problem_summary = as_text(section, value)?,
            OverviewSection::Personas => self.personas = as_list(section, value)?,
            OverviewSection::Solution => self.solution = as_text(section, value)?,
            OverviewSection::CoreFeatures => self.core_features = as_list(section, value)?,
            OverviewSection::UniqueValue => self.unique_value = as_text(section, value)?,
            OverviewSection::Competition => self.competition = as_text(section, value)?,
            OverviewSection::Risks => self.risks = as_list(section, value)?,
            OverviewSection::Monetisation => self.monetisation = as_list(section, value)?,
            OverviewSection::MarketSize => self.market_size = as_text(section, value)?,
            OverviewSection::BuildNotes => self.build_notes = as_text(section, value)?,
        }
        Ok(())
    }
}

// =============================================================================
// Refinement history
// =============================================================================

/// Immutable audit entry appended for every refinement attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementIteration {
    pub pillar_impacted: Pillar,
    pub score_delta: f64,
    pub differences: Vec<String>,
    pub before_section: String,
    pub after_section: String,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Idea context
// =============================================================================

/// The idea as fed to every prompt, assembled from persisted stage data
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdeaContext {
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_feedback: Option<String>,
}
