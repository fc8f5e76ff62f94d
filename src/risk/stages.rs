//! Risk pipeline stages.

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{
    DEFAULT_QUERY, INVENTORY_ANALYST, LOGISTICS_OPTIMIZER, RISK_SENTINEL, RiskState, RiskUpdate,
    UNKNOWN_LOCATION, baseline_disruptions, lead_disruption, mitigation_plan, prompt,
};
use crate::context::StageContext;
use crate::error::Result;
use crate::pipeline::{Next, Stage, StageOutput};
use crate::records::Disruption;
use crate::state::Thought;
use crate::template::fill;

/// Trimmed reply text, or `None` when the call failed or came back empty.
fn plain_reply(reply: Option<String>) -> Option<String> {
    reply
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn describe(disruption: &Disruption) -> String {
    format!(
        "{} severity {} disruption in {}: {}",
        disruption.severity, disruption.kind, disruption.location, disruption.description
    )
}

// ============================================================================
// Risk Sentinel
// ============================================================================

/// Scans search results for supply-chain disruptions.
pub struct RiskSentinel;

impl RiskSentinel {
    pub const AGENT: &'static str = "Risk Sentinel";

    async fn execute(&self, state: &RiskState, ctx: &StageContext<'_>) -> Result<StageOutput<RiskUpdate>> {
        let query = match state.query.trim() {
            "" => DEFAULT_QUERY,
            q => q,
        };
        let results = ctx.search_or(query, prompt::SEARCH_FALLBACK).await;
        let request = fill(prompt::RISK_SENTINEL, &[("results", results.as_str())]);

        let (disruptions, thought) = match ctx.complete(&request).await {
            None => (
                baseline_disruptions(),
                "Reasoning service unavailable; monitoring the baseline watch list of known disruptions."
                    .to_string(),
            ),
            Some(response) => {
                let extraction = ctx.extract::<Disruption>(&response);
                if extraction.failed() {
                    (
                        extraction.records,
                        "Could not extract structured disruptions from the analysis; flagged the result for manual review."
                            .to_string(),
                    )
                } else if extraction.records.is_empty() {
                    (
                        baseline_disruptions(),
                        "No new disruptions reported; keeping the baseline watch list under observation."
                            .to_string(),
                    )
                } else {
                    let thought = extraction
                        .note
                        .clone()
                        .unwrap_or_else(|| summarize(&extraction.records));
                    (extraction.records, thought)
                }
            }
        };

        Ok(StageOutput::new(
            Thought::new(Self::AGENT, thought),
            RiskUpdate {
                disruptions: Some(number_disruptions(disruptions)),
                ..Default::default()
            },
            Next::Stage(INVENTORY_ANALYST),
        ))
    }
}

impl Stage<RiskState> for RiskSentinel {
    fn id(&self) -> &'static str {
        RISK_SENTINEL
    }

    fn run<'a>(
        &'a self,
        state: &'a RiskState,
        ctx: &'a StageContext<'a>,
    ) -> BoxFuture<'a, Result<StageOutput<RiskUpdate>>> {
        self.execute(state, ctx).boxed()
    }
}

fn summarize(disruptions: &[Disruption]) -> String {
    match lead_disruption(disruptions) {
        Some(lead) => format!(
            "Identified {} disruption(s); most severe is {} in {} ({}).",
            disruptions.len(),
            lead.kind,
            lead.location,
            lead.severity
        ),
        None => format!("Identified {} disruption(s).", disruptions.len()),
    }
}

/// Fill in missing ids with the record's position.
fn number_disruptions(mut disruptions: Vec<Disruption>) -> Vec<Disruption> {
    for (idx, disruption) in disruptions.iter_mut().enumerate() {
        if disruption.id.trim().is_empty() {
            disruption.id = (idx + 1).to_string();
        }
    }
    disruptions
}

// ============================================================================
// Inventory Analyst
// ============================================================================

/// Reads inventory health in light of the lead disruption.
pub struct InventoryAnalyst;

impl InventoryAnalyst {
    pub const AGENT: &'static str = "Inventory Analyst";

    async fn execute(&self, state: &RiskState, ctx: &StageContext<'_>) -> Result<StageOutput<RiskUpdate>> {
        let inventory = ctx.catalog().inventory(None);
        let lead = lead_disruption(&state.disruptions);
        let location = lead.map(|d| d.location.as_str()).unwrap_or(UNKNOWN_LOCATION);
        let exposed = inventory.iter().filter(|item| !item.is_healthy()).count();

        let disruption = lead
            .map(describe)
            .unwrap_or_else(|| "No confirmed disruption has been identified.".to_string());
        let stock = serde_json::to_string_pretty(&inventory)?;
        let request = fill(
            prompt::INVENTORY_ANALYST,
            &[("disruption", disruption.as_str()), ("inventory", stock.as_str())],
        );

        let thought = plain_reply(ctx.complete(&request).await).unwrap_or_else(|| {
            format!(
                "Checking stock levels for products likely affected by {} disruption; {} of {} products are below healthy levels.",
                location,
                exposed,
                inventory.len()
            )
        });

        Ok(StageOutput::new(
            Thought::new(Self::AGENT, thought),
            RiskUpdate {
                inventory: Some(inventory),
                ..Default::default()
            },
            Next::Stage(LOGISTICS_OPTIMIZER),
        ))
    }
}

impl Stage<RiskState> for InventoryAnalyst {
    fn id(&self) -> &'static str {
        INVENTORY_ANALYST
    }

    fn run<'a>(
        &'a self,
        state: &'a RiskState,
        ctx: &'a StageContext<'a>,
    ) -> BoxFuture<'a, Result<StageOutput<RiskUpdate>>> {
        self.execute(state, ctx).boxed()
    }
}

// ============================================================================
// Logistics Optimizer
// ============================================================================

/// Turns the lead disruption and inventory picture into a mitigation plan.
pub struct LogisticsOptimizer;

impl LogisticsOptimizer {
    pub const AGENT: &'static str = "Logistics Optimizer";

    async fn execute(&self, state: &RiskState, ctx: &StageContext<'_>) -> Result<StageOutput<RiskUpdate>> {
        let lead = lead_disruption(&state.disruptions);
        let route = lead.map(|d| d.location.as_str()).unwrap_or("");
        let option = ctx.catalog().logistics_options(route);
        let plan = mitigation_plan(&option, &state.inventory);
        let location = if route.is_empty() { UNKNOWN_LOCATION } else { route };

        let plan_json = serde_json::to_string_pretty(&plan)?;
        let request = fill(
            prompt::LOGISTICS_OPTIMIZER,
            &[
                ("location", location),
                ("options", option.summary.as_str()),
                ("plan", plan_json.as_str()),
            ],
        );

        let thought = plain_reply(ctx.complete(&request).await).unwrap_or_else(|| {
            format!(
                "Developing mitigation plan for {} disruption using {}",
                location, option.summary
            )
        });

        Ok(StageOutput::new(
            Thought::new(Self::AGENT, thought),
            RiskUpdate {
                mitigation_plan: Some(plan),
                ..Default::default()
            },
            Next::Complete,
        ))
    }
}

impl Stage<RiskState> for LogisticsOptimizer {
    fn id(&self) -> &'static str {
        LOGISTICS_OPTIMIZER
    }

    fn run<'a>(
        &'a self,
        state: &'a RiskState,
        ctx: &'a StageContext<'a>,
    ) -> BoxFuture<'a, Result<StageOutput<RiskUpdate>>> {
        self.execute(state, ctx).boxed()
    }
}
