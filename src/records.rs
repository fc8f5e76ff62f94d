//! Domain records produced by pipeline stages.
//!
//! Records that come out of reasoning-service responses implement
//! [`Record`], which gives [`extract`](crate::extract::extract) a JSON
//! Schema to validate against and a sentinel to substitute on failure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::extract::Record;

// ============================================================================
// Risk pipeline
// ============================================================================

/// A supply-chain disruption identified by the risk sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disruption {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// e.g. "Natural Disaster", "Port Strike", "Geopolitical"
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    /// High, Medium, Low
    pub severity: String,
    pub description: String,
    #[serde(default)]
    pub source: String,
}

impl Disruption {
    /// Ranking used to pick the disruption downstream stages plan around.
    pub fn severity_rank(&self) -> u8 {
        match self.severity.to_ascii_lowercase().as_str() {
            "critical" => 4,
            "high" => 3,
            "medium" => 2,
            "low" => 1,
            _ => 0,
        }
    }

    /// True for the placeholder substituted when extraction fails.
    pub fn is_sentinel(&self) -> bool {
        self.kind == "Error"
    }
}

impl Record for Disruption {
    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["type", "location", "severity", "description"],
            "properties": {
                "id": {"type": ["string", "integer"]},
                "type": {"type": "string"},
                "location": {"type": "string"},
                "severity": {"type": "string"},
                "description": {"type": "string"},
                "source": {"type": "string"}
            }
        })
    }

    fn extraction_failed() -> Self {
        Self {
            id: "0".to_string(),
            kind: "Error".to_string(),
            location: "Unknown".to_string(),
            severity: "Unknown".to_string(),
            description: "Automatic extraction of disruptions failed; review the raw agent output."
                .to_string(),
            source: "System".to_string(),
        }
    }
}

/// Stock health for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStatus {
    pub product: String,
    pub stock_level: u32,
    pub reorder_point: u32,
    /// OK, At Risk, Out of Stock
    pub status: String,
}

impl InventoryStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("OK")
    }

    /// Higher is worse: out of stock before at risk, then by stock cover.
    pub fn urgency(&self) -> (u8, u32) {
        let tier = match self.status.to_ascii_lowercase().as_str() {
            "out of stock" => 2,
            "ok" => 0,
            _ => 1,
        };
        let shortfall = self.reorder_point.saturating_sub(self.stock_level);
        (tier, shortfall)
    }
}

/// One step of the logistics mitigation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationStep {
    pub action: String,
    pub priority: String,
    pub impact: String,
}

// ============================================================================
// Research pipeline
// ============================================================================

/// A finding surfaced by the research scout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchFinding {
    pub category: String,
    pub insight: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub source: String,
}

impl ResearchFinding {
    pub fn is_sentinel(&self) -> bool {
        self.category == "Error"
    }
}

impl Record for ResearchFinding {
    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["category", "insight"],
            "properties": {
                "category": {"type": "string"},
                "insight": {"type": "string"},
                "impact": {"type": "string"},
                "source": {"type": "string"}
            }
        })
    }

    fn extraction_failed() -> Self {
        Self {
            category: "Error".to_string(),
            insight: "Failed to parse research findings automatically.".to_string(),
            impact: "Unknown".to_string(),
            source: "System".to_string(),
        }
    }
}

/// An entry of the static knowledge table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeTopic {
    pub topic: String,
    pub category: String,
    pub summary: String,
}

/// A recommendation produced by the strategy advisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategicRecommendation {
    pub strategy: String,
    pub priority: String,
    #[serde(default)]
    pub rationale: String,
}

impl Record for StrategicRecommendation {
    fn schema() -> Value {
        json!({
            "type": "object",
            "required": ["strategy", "priority"],
            "properties": {
                "strategy": {"type": "string"},
                "priority": {"type": "string"},
                "rationale": {"type": "string"}
            }
        })
    }

    fn extraction_failed() -> Self {
        Self {
            strategy: "Manual review required".to_string(),
            priority: "High".to_string(),
            rationale: "Automatic extraction of strategic recommendations failed.".to_string(),
        }
    }
}

/// Accept `"3"` or `3` for identifiers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disruption_uses_type_key() {
        let d: Disruption = serde_json::from_value(json!({
            "id": 7,
            "type": "Port Strike",
            "location": "Long Beach",
            "severity": "High",
            "description": "Dock workers on strike"
        }))
        .unwrap();

        assert_eq!(d.id, "7");
        assert_eq!(d.kind, "Port Strike");
        assert_eq!(d.source, "");

        let back = serde_json::to_value(&d).unwrap();
        assert_eq!(back["type"], "Port Strike");
    }

    #[test]
    fn test_severity_rank() {
        let mut d = Disruption::extraction_failed();
        assert_eq!(d.severity_rank(), 0);
        d.severity = "HIGH".to_string();
        assert_eq!(d.severity_rank(), 3);
    }

    #[test]
    fn test_inventory_urgency_orders_out_of_stock_first() {
        let out = InventoryStatus {
            product: "Steel Coils".to_string(),
            stock_level: 50,
            reorder_point: 200,
            status: "Out of Stock".to_string(),
        };
        let at_risk = InventoryStatus {
            product: "Semiconductors".to_string(),
            stock_level: 500,
            reorder_point: 1000,
            status: "At Risk".to_string(),
        };
        assert!(out.urgency() > at_risk.urgency());
        assert!(!at_risk.is_healthy());
    }

    #[test]
    fn test_disruption_sentinel() {
        assert!(Disruption::extraction_failed().is_sentinel());
        let mut real = Disruption::extraction_failed();
        real.kind = "Geopolitical".to_string();
        assert!(!real.is_sentinel());
    }

    #[test]
    fn test_finding_sentinel() {
        let sentinel = ResearchFinding::extraction_failed();
        assert!(sentinel.is_sentinel());
        assert_eq!(sentinel.category, "Error");
    }
}
