//! Supply-chain risk pipeline.
//!
//! Risk Sentinel → Inventory Analyst → Logistics Optimizer → complete.
//!
//! ```ignore
//! use nexus::{Services, risk};
//!
//! let pipeline = risk::risk_pipeline(Services::from_env());
//! let state = pipeline.run(risk::RiskSeed::default()).await?;
//! println!("{}", serde_json::to_string_pretty(&state)?);
//! ```

mod prompt;
mod stages;

pub use stages::{InventoryAnalyst, LogisticsOptimizer, RiskSentinel};

use crate::pipeline::Pipeline;
use crate::records::{Disruption, InventoryStatus, MitigationStep};
use crate::services::{LogisticsOption, Services};
use crate::state::PipelineState;

pub const RISK_SENTINEL: &str = "risk_sentinel";
pub const INVENTORY_ANALYST: &str = "inventory_analyst";
pub const LOGISTICS_OPTIMIZER: &str = "logistics_optimizer";

/// Query used when the seed does not provide one.
pub const DEFAULT_QUERY: &str = "current global supply chain disruptions 2024";

const UNKNOWN_LOCATION: &str = "an unidentified location";

crate::pipeline_state! {
    /// Accumulated state of one risk pipeline invocation.
    pub struct RiskState, update RiskUpdate {
        /// Search query for the risk sentinel
        overwrite query: String,
        overwrite disruptions: Vec<Disruption>,
        overwrite inventory: Vec<InventoryStatus>,
        overwrite mitigation_plan: Vec<MitigationStep>,
    }
}

/// Caller input for a risk run. Everything is optional.
#[derive(Debug, Clone, Default)]
pub struct RiskSeed {
    pub query: Option<String>,
}

impl RiskSeed {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
        }
    }
}

impl PipelineState for RiskState {
    type Seed = RiskSeed;

    fn from_seed(seed: RiskSeed) -> Self {
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

/// Build the risk pipeline over the given collaborators.
pub fn risk_pipeline(services: Services) -> Pipeline<RiskState> {
    Pipeline::new("supply-chain-risk", services)
        .stage(RiskSentinel)
        .stage(InventoryAnalyst)
        .stage(LogisticsOptimizer)
}

/// Disruptions assumed when the reasoning service cannot supply any.
pub fn baseline_disruptions() -> Vec<Disruption> {
    vec![Disruption {
        id: "1".to_string(),
        kind: "Geopolitical".to_string(),
        location: "Red Sea".to_string(),
        severity: "High".to_string(),
        description: "Shipping delays due to maritime security alerts.".to_string(),
        source: "Baseline watch list".to_string(),
    }]
}

/// The disruption downstream stages plan around: the most severe real one,
/// earliest first on ties. Extraction sentinels are never chosen.
pub fn lead_disruption(disruptions: &[Disruption]) -> Option<&Disruption> {
    disruptions
        .iter()
        .filter(|d| !d.is_sentinel())
        .rev()
        .max_by_key(|d| d.severity_rank())
}

/// Always two steps: reroute along `option`, then protect the most exposed
/// product (or review safety stock when nothing is exposed).
pub fn mitigation_plan(
    option: &LogisticsOption,
    inventory: &[InventoryStatus],
) -> Vec<MitigationStep> {
    let reroute = MitigationStep {
        action: option.action.clone(),
        priority: "High".to_string(),
        impact: option.impact.clone(),
    };

    let protect = match inventory
        .iter()
        .filter(|item| !item.is_healthy())
        .max_by_key(|item| item.urgency())
    {
        Some(item) => MitigationStep {
            action: format!(
                "Expedite {} orders via air freight",
                item.product.to_lowercase()
            ),
            priority: "Medium".to_string(),
            impact: "Reduces lead time for critical parts.".to_string(),
        },
        None => MitigationStep {
            action: "Review safety stock levels across all products".to_string(),
            priority: "Low".to_string(),
            impact: "Keeps buffers aligned with the current risk picture.".to_string(),
        },
    };

    vec![reroute, protect]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Record;
    use crate::pipeline::{COMPLETE, PipelineEvent};
    use crate::services::Catalog;
    use crate::state::Merge;
    use crate::testing::{FailingReasoning, FailingSearch, ScriptedReasoning, StaticSearch};

    const SENTINEL_REPLY: &str = r#"Here is my analysis.

```json
{
  "thought": "Port congestion and Red Sea tensions dominate.",
  "disruptions": [
    {"type": "Port Strike", "location": "Long Beach", "severity": "Medium", "description": "10-day delays", "source": "news"},
    {"type": "Geopolitical", "location": "Red Sea", "severity": "High", "description": "Security alerts", "source": "news"}
  ]
}
```"#;

    fn disruption(kind: &str, location: &str, severity: &str) -> Disruption {
        Disruption {
            id: String::new(),
            kind: kind.to_string(),
            location: location.to_string(),
            severity: severity.to_string(),
            description: String::new(),
            source: String::new(),
        }
    }

    #[test]
    fn test_seed_defaults_query() {
        let state = RiskState::from_seed(RiskSeed::default());
        assert_eq!(state.query, DEFAULT_QUERY);
        assert!(state.disruptions.is_empty());

        let state = RiskState::from_seed(RiskSeed::query("  port strikes "));
        assert_eq!(state.query, "port strikes");
    }

    #[test]
    fn test_declared_policies() {
        assert_eq!(RiskState::FIELDS.len(), 7);
        assert_eq!(
            RiskState::policy_of("thoughts"),
            Some(crate::state::MergePolicy::Append)
        );
        assert_eq!(
            RiskState::policy_of("disruptions"),
            Some(crate::state::MergePolicy::Overwrite)
        );
    }

    #[test]
    fn test_empty_seed_scenario() {
        let reasoning = ScriptedReasoning::replies(
            vec![SENTINEL_REPLY],
            "Semiconductors and steel coils are most exposed.",
        );
        let services = Services::new(StaticSearch("Red Sea alerts".to_string()), reasoning.clone());
        let pipeline = risk_pipeline(services);

        let state = tokio_test::block_on(pipeline.run(RiskSeed::default())).unwrap();

        assert_eq!(state.next_step, COMPLETE);
        assert_eq!(state.thoughts.len(), 3);
        assert_eq!(state.disruptions.len(), 2);
        assert_eq!(state.mitigation_plan.len(), 2);
        assert_eq!(state.inventory.len(), 4);

        let agents: Vec<&str> = state.thoughts.iter().map(|t| t.agent.as_str()).collect();
        assert_eq!(
            agents,
            vec!["Risk Sentinel", "Inventory Analyst", "Logistics Optimizer"]
        );
        assert_eq!(state.current_agent, "Logistics Optimizer");
        assert_eq!(
            state.thoughts[0].thought,
            "Port congestion and Red Sea tensions dominate."
        );

        // Red Sea is the most severe, so the reroute follows its options.
        assert_eq!(
            state.mitigation_plan[0].action,
            "Reroute shipments via Cape of Good Hope"
        );
        assert_eq!(state.mitigation_plan[0].priority, "High");
        assert_eq!(state.disruptions[0].id, "1");

        let prompts = reasoning.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("Red Sea alerts"));
        assert!(prompts[1].contains("Red Sea"));
    }

    #[test]
    fn test_search_outage_still_yields_disruptions() {
        let services = Services::new(FailingSearch, ScriptedReasoning::always(SENTINEL_REPLY));
        let pipeline = risk_pipeline(services).capture_events(true);

        let state = tokio_test::block_on(pipeline.run(RiskSeed::default())).unwrap();

        assert!(!state.disruptions.is_empty());
        assert_eq!(state.next_step, COMPLETE);
        assert!(pipeline.take_events().iter().any(|e| matches!(
            e,
            PipelineEvent::SearchFallback { stage, .. } if stage == RISK_SENTINEL
        )));
    }

    #[test]
    fn test_total_outage_uses_baseline() {
        let services = Services::new(FailingSearch, FailingReasoning);
        let pipeline = risk_pipeline(services);

        let state = tokio_test::block_on(pipeline.run(RiskSeed::default())).unwrap();

        assert_eq!(state.disruptions, baseline_disruptions());
        assert_eq!(state.thoughts.len(), 3);
        assert_eq!(state.mitigation_plan.len(), 2);
        assert!(
            state.thoughts[1]
                .thought
                .starts_with("Checking stock levels for products likely affected by Red Sea")
        );
        assert!(state.thoughts[2].thought.contains("Cape of Good Hope"));
    }

    #[test]
    fn test_malformed_reply_uses_sentinel_and_completes() {
        let services = Services::new(
            StaticSearch("results".to_string()),
            ScriptedReasoning::always("I am not able to produce JSON today."),
        );
        let pipeline = risk_pipeline(services).capture_events(true);

        let state = tokio_test::block_on(pipeline.run(RiskSeed::default())).unwrap();

        assert_eq!(state.disruptions, vec![Disruption::extraction_failed()]);
        assert_eq!(state.next_step, COMPLETE);
        // No real disruption, so the optimizer falls back to generic routing.
        assert_eq!(
            state.mitigation_plan[0].action,
            "Maintain standard routing and monitor for escalation"
        );
        assert!(
            pipeline
                .take_events()
                .iter()
                .any(|e| matches!(e, PipelineEvent::ExtractionFailed { .. }))
        );
    }

    #[test]
    fn test_empty_extraction_uses_baseline() {
        let services = Services::new(
            StaticSearch("quiet week".to_string()),
            ScriptedReasoning::replies(vec!["```json\n[]\n```"], "ok"),
        );
        let state = tokio_test::block_on(risk_pipeline(services).run(RiskSeed::default())).unwrap();
        assert_eq!(state.disruptions, baseline_disruptions());
    }

    #[test]
    fn test_wrapped_empty_reply_uses_baseline() {
        let reply = "```json\n{\"thought\": \"No disruptions reported.\", \"disruptions\": []}\n```";
        let services = Services::new(
            StaticSearch("quiet week".to_string()),
            ScriptedReasoning::replies(vec![reply], "ok"),
        );
        let pipeline = risk_pipeline(services).capture_events(true);

        let state = tokio_test::block_on(pipeline.run(RiskSeed::default())).unwrap();

        assert_eq!(state.disruptions, baseline_disruptions());
        assert!(
            !pipeline
                .take_events()
                .iter()
                .any(|e| matches!(e, PipelineEvent::ExtractionFailed { .. }))
        );
    }

    #[test]
    fn test_healthy_inventory_gets_review_step() {
        let catalog = Catalog::new(
            vec![InventoryStatus {
                product: "Plastic Pellets".to_string(),
                stock_level: 5000,
                reorder_point: 1000,
                status: "OK".to_string(),
            }],
            Vec::new(),
            Vec::new(),
        );
        let services =
            Services::new(FailingSearch, FailingReasoning).with_catalog(catalog);
        let state = tokio_test::block_on(risk_pipeline(services).run(RiskSeed::default())).unwrap();

        assert_eq!(state.mitigation_plan.len(), 2);
        assert_eq!(state.mitigation_plan[1].priority, "Low");
    }

    #[test]
    fn test_lead_disruption_prefers_severity_then_order() {
        let list = vec![
            disruption("Weather", "Rotterdam", "Medium"),
            disruption("Strike", "Long Beach", "High"),
            disruption("Geopolitical", "Red Sea", "High"),
        ];
        assert_eq!(lead_disruption(&list).unwrap().location, "Long Beach");
        assert!(lead_disruption(&[]).is_none());
        assert!(lead_disruption(&[Disruption::extraction_failed()]).is_none());
    }

    #[test]
    fn test_mitigation_plan_targets_most_urgent_item() {
        let catalog = Catalog::builtin();
        let plan = mitigation_plan(
            &catalog.logistics_options("Long Beach"),
            &catalog.inventory(None),
        );

        assert_eq!(plan[0].priority, "High");
        assert_eq!(plan[0].action, "Divert inbound containers to Port of Oakland");
        assert_eq!(plan[1].action, "Expedite steel coils orders via air freight");
        assert_eq!(plan[1].priority, "Medium");
    }

    #[test]
    fn test_state_serializes_for_callers() {
        let services = Services::new(FailingSearch, FailingReasoning);
        let state = tokio_test::block_on(risk_pipeline(services).run(RiskSeed::default())).unwrap();

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["next_step"], "complete");
        assert_eq!(json["disruptions"][0]["type"], "Geopolitical");
        assert_eq!(json["mitigation_plan"].as_array().unwrap().len(), 2);
    }
}
