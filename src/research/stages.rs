//! Research pipeline stages.

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{
    CRITICAL_ANALYST, DEFAULT_QUERY, RESEARCH_SCOUT, ResearchState, ResearchUpdate,
    STRATEGY_ADVISOR, finding_categories, prompt,
};
use crate::context::StageContext;
use crate::error::Result;
use crate::extract::Record;
use crate::pipeline::{Next, Stage, StageOutput};
use crate::records::{ResearchFinding, StrategicRecommendation};
use crate::state::Thought;
use crate::template::fill;

fn search_fallback(query: &str) -> String {
    format!(
        "No live search results are available for \"{}\". Work from widely reported developments up to your knowledge cutoff.",
        query
    )
}

// ============================================================================
// Research Scout
// ============================================================================

/// Turns search results for the seed query into findings.
pub struct ResearchScout;

impl ResearchScout {
    pub const AGENT: &'static str = "Research Scout";

    async fn execute(
        &self,
        state: &ResearchState,
        ctx: &StageContext<'_>,
    ) -> Result<StageOutput<ResearchUpdate>> {
        let query = match state.query.trim() {
            "" => DEFAULT_QUERY,
            q => q,
        };
        let results = ctx.search_or(query, &search_fallback(query)).await;
        let request = fill(
            prompt::RESEARCH_SCOUT,
            &[("query", query), ("results", results.as_str())],
        );

        let (findings, thought) = match ctx.complete(&request).await {
            None => (
                vec![ResearchFinding::extraction_failed()],
                format!(
                    "Reasoning service unavailable; no findings could be drawn for \"{}\".",
                    query
                ),
            ),
            Some(response) => {
                let extraction = ctx.extract::<ResearchFinding>(&response);
                let thought = if extraction.failed() {
                    "Could not extract structured findings from the scan; flagged the result for manual review."
                        .to_string()
                } else {
                    extraction.note.clone().unwrap_or_else(|| {
                        format!(
                            "Scanned sources for \"{}\" and recorded {} finding(s).",
                            query,
                            extraction.records.len()
                        )
                    })
                };
                (extraction.records, thought)
            }
        };

        Ok(StageOutput::new(
            Thought::new(Self::AGENT, thought),
            ResearchUpdate {
                findings: Some(findings),
                ..Default::default()
            },
            Next::Stage(CRITICAL_ANALYST),
        ))
    }
}

impl Stage<ResearchState> for ResearchScout {
    fn id(&self) -> &'static str {
        RESEARCH_SCOUT
    }

    fn run<'a>(
        &'a self,
        state: &'a ResearchState,
        ctx: &'a StageContext<'a>,
    ) -> BoxFuture<'a, Result<StageOutput<ResearchUpdate>>> {
        self.execute(state, ctx).boxed()
    }
}

// ============================================================================
// Critical Analyst
// ============================================================================

/// Checks findings against the knowledge table.
pub struct CriticalAnalyst;

impl CriticalAnalyst {
    pub const AGENT: &'static str = "Critical Analyst";

    async fn execute(
        &self,
        state: &ResearchState,
        ctx: &StageContext<'_>,
    ) -> Result<StageOutput<ResearchUpdate>> {
        let categories = finding_categories(&state.findings);
        let knowledge = ctx.catalog().knowledge(&categories);

        let findings = serde_json::to_string_pretty(&state.findings)?;
        let background = serde_json::to_string_pretty(&knowledge)?;
        let request = fill(
            prompt::CRITICAL_ANALYST,
            &[("findings", findings.as_str()), ("knowledge", background.as_str())],
        );

        let thought = match ctx.complete(&request).await {
            Some(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            _ => {
                let usable = state.findings.iter().filter(|f| !f.is_sentinel()).count();
                format!(
                    "Cross-checked {} finding(s) against {} knowledge topic(s); critique unavailable, review the evidence manually.",
                    usable,
                    knowledge.len()
                )
            }
        };

        Ok(StageOutput::new(
            Thought::new(Self::AGENT, thought),
            ResearchUpdate {
                knowledge_hub: Some(knowledge),
                ..Default::default()
            },
            Next::Stage(STRATEGY_ADVISOR),
        ))
    }
}

impl Stage<ResearchState> for CriticalAnalyst {
    fn id(&self) -> &'static str {
        CRITICAL_ANALYST
    }

    fn run<'a>(
        &'a self,
        state: &'a ResearchState,
        ctx: &'a StageContext<'a>,
    ) -> BoxFuture<'a, Result<StageOutput<ResearchUpdate>>> {
        self.execute(state, ctx).boxed()
    }
}

// ============================================================================
// Strategy Advisor
// ============================================================================

/// Recommends strategies from the findings and knowledge context.
pub struct StrategyAdvisor;

impl StrategyAdvisor {
    pub const AGENT: &'static str = "Strategy Advisor";

    async fn execute(
        &self,
        state: &ResearchState,
        ctx: &StageContext<'_>,
    ) -> Result<StageOutput<ResearchUpdate>> {
        let findings = serde_json::to_string_pretty(&state.findings)?;
        let knowledge = serde_json::to_string_pretty(&state.knowledge_hub)?;
        let request = fill(
            prompt::STRATEGY_ADVISOR,
            &[
                ("query", state.query.as_str()),
                ("findings", findings.as_str()),
                ("knowledge", knowledge.as_str()),
            ],
        );

        let (strategies, thought) = match ctx.complete(&request).await {
            None => (
                vec![StrategicRecommendation::extraction_failed()],
                "Reasoning service unavailable; strategic recommendations need manual review."
                    .to_string(),
            ),
            Some(response) => {
                let extraction = ctx.extract::<StrategicRecommendation>(&response);
                let thought = if extraction.failed() {
                    "Could not extract structured recommendations; flagged the result for manual review."
                        .to_string()
                } else {
                    extraction.note.clone().unwrap_or_else(|| {
                        format!("Proposed {} strategic recommendation(s).", extraction.records.len())
                    })
                };
                (extraction.records, thought)
            }
        };

        Ok(StageOutput::new(
            Thought::new(Self::AGENT, thought),
            ResearchUpdate {
                strategies: Some(strategies),
                ..Default::default()
            },
            Next::Complete,
        ))
    }
}

impl Stage<ResearchState> for StrategyAdvisor {
    fn id(&self) -> &'static str {
        STRATEGY_ADVISOR
    }

    fn run<'a>(
        &'a self,
        state: &'a ResearchState,
        ctx: &'a StageContext<'a>,
    ) -> BoxFuture<'a, Result<StageOutput<ResearchUpdate>>> {
        self.execute(state, ctx).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_fallback_mentions_query() {
        let text = search_fallback("quantum sensing");
        assert!(text.contains("\"quantum sensing\""));
    }
}
