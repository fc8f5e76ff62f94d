//! Research pipeline.
//!
//! Research Scout → Critical Analyst → Strategy Advisor → complete.

mod prompt;
mod stages;

pub use stages::{CriticalAnalyst, ResearchScout, StrategyAdvisor};

use crate::pipeline::Pipeline;
use crate::records::{KnowledgeTopic, ResearchFinding, StrategicRecommendation};
use crate::services::Services;
use crate::state::PipelineState;

pub const RESEARCH_SCOUT: &str = "research_scout";
pub const CRITICAL_ANALYST: &str = "critical_analyst";
pub const STRATEGY_ADVISOR: &str = "strategy_advisor";

pub const DEFAULT_QUERY: &str = "global research trends";

crate::pipeline_state! {
    /// Accumulated state of one research pipeline invocation.
    pub struct ResearchState, update ResearchUpdate {
        overwrite query: String,
        overwrite findings: Vec<ResearchFinding>,
        /// Knowledge topics relevant to the findings
        overwrite knowledge_hub: Vec<KnowledgeTopic>,
        overwrite strategies: Vec<StrategicRecommendation>,
    }
}

/// Caller input for a research run.
#[derive(Debug, Clone, Default)]
pub struct ResearchSeed {
    pub query: Option<String>,
}

impl ResearchSeed {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
        }
    }
}

impl PipelineState for ResearchState {
    type Seed = ResearchSeed;

    fn from_seed(seed: ResearchSeed) -> Self {
        let query = seed
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| DEFAULT_QUERY.to_string());
        Self {
            query,
            ..Default::default()
        }
    }
}

/// Build the research pipeline over the given collaborators.
pub fn research_pipeline(services: Services) -> Pipeline<ResearchState> {
    Pipeline::new("research", services)
        .stage(ResearchScout)
        .stage(CriticalAnalyst)
        .stage(StrategyAdvisor)
}

/// Distinct categories of the real findings, in first-seen order.
pub fn finding_categories(findings: &[ResearchFinding]) -> Vec<&str> {
    let mut categories: Vec<&str> = Vec::new();
    for finding in findings.iter().filter(|f| !f.is_sentinel()) {
        let category = finding.category.trim();
        if !category.is_empty()
            && !categories.iter().any(|c| c.eq_ignore_ascii_case(category))
        {
            categories.push(category);
        }
    }
    categories
}
