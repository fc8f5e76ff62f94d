//! Static, read-only lookup tables.

use serde::Serialize;
use serde_json::Value;

use crate::records::{InventoryStatus, KnowledgeTopic};

/// Identifies one of the catalog's tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Inventory,
    Logistics,
    Knowledge,
}

/// Mitigation options for a shipping route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogisticsOption {
    pub route: String,
    /// One-line description of the available alternatives
    pub summary: String,
    /// Concrete action for a mitigation plan
    pub action: String,
    pub impact: String,
}

/// In-memory tables shared by every invocation.
///
/// Nothing mutates a catalog once it is built; pipelines hold it behind an
/// `Arc` and read it concurrently.
#[derive(Debug, Clone)]
pub struct Catalog {
    inventory: Vec<InventoryStatus>,
    logistics: Vec<LogisticsOption>,
    knowledge: Vec<KnowledgeTopic>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Build a catalog from explicit tables.
    pub fn new(
        inventory: Vec<InventoryStatus>,
        logistics: Vec<LogisticsOption>,
        knowledge: Vec<KnowledgeTopic>,
    ) -> Self {
        Self {
            inventory,
            logistics,
            knowledge,
        }
    }

    /// The built-in demo tables.
    pub fn builtin() -> Self {
        Self::new(builtin_inventory(), builtin_logistics(), builtin_knowledge())
    }

    /// Inventory rows whose product contains `filter` (case-insensitive).
    ///
    /// `None` or an empty filter returns the whole table; a filter that
    /// matches nothing returns an empty list.
    pub fn inventory(&self, filter: Option<&str>) -> Vec<InventoryStatus> {
        match filter.map(str::trim).filter(|f| !f.is_empty()) {
            None => self.inventory.clone(),
            Some(filter) => {
                let needle = filter.to_lowercase();
                self.inventory
                    .iter()
                    .filter(|item| item.product.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Options for a route, or the generic default for unknown routes.
    pub fn logistics_options(&self, route: &str) -> LogisticsOption {
        let route = route.trim();
        self.logistics
            .iter()
            .find(|option| option.route.eq_ignore_ascii_case(route))
            .cloned()
            .unwrap_or_else(|| default_logistics(route))
    }

    /// Knowledge topics in any of `categories` (case-insensitive).
    ///
    /// An empty category list, or one that matches nothing, returns the
    /// whole table so downstream prompts always have context.
    pub fn knowledge(&self, categories: &[&str]) -> Vec<KnowledgeTopic> {
        let matched: Vec<KnowledgeTopic> = self
            .knowledge
            .iter()
            .filter(|topic| {
                categories
                    .iter()
                    .any(|c| topic.category.eq_ignore_ascii_case(c.trim()))
            })
            .cloned()
            .collect();
        if matched.is_empty() {
            self.knowledge.clone()
        } else {
            matched
        }
    }

    /// Untyped lookup by table id and optional filter.
    ///
    /// The filter is a product substring for inventory, a route for
    /// logistics, and a category for knowledge.
    pub fn lookup(&self, table: Table, filter: Option<&str>) -> Vec<Value> {
        match table {
            Table::Inventory => to_values(&self.inventory(filter)),
            Table::Logistics => match filter {
                Some(route) => to_values(&[self.logistics_options(route)]),
                None => to_values(&self.logistics),
            },
            Table::Knowledge => match filter {
                Some(category) => to_values(
                    &self
                        .knowledge
                        .iter()
                        .filter(|t| t.category.eq_ignore_ascii_case(category.trim()))
                        .cloned()
                        .collect::<Vec<_>>(),
                ),
                None => to_values(&self.knowledge),
            },
        }
    }
}

fn to_values<T: Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

fn inventory_row(product: &str, stock_level: u32, reorder_point: u32, status: &str) -> InventoryStatus {
    InventoryStatus {
        product: product.to_string(),
        stock_level,
        reorder_point,
        status: status.to_string(),
    }
}

fn builtin_inventory() -> Vec<InventoryStatus> {
    vec![
        inventory_row("Semiconductors", 500, 1000, "At Risk"),
        inventory_row("Lithium Batteries", 2000, 500, "OK"),
        inventory_row("Steel Coils", 50, 200, "Out of Stock"),
        inventory_row("Plastic Pellets", 5000, 1000, "OK"),
    ]
}

fn logistics_row(route: &str, summary: &str, action: &str, impact: &str) -> LogisticsOption {
    LogisticsOption {
        route: route.to_string(),
        summary: summary.to_string(),
        action: action.to_string(),
        impact: impact.to_string(),
    }
}

fn builtin_logistics() -> Vec<LogisticsOption> {
    vec![
        logistics_row(
            "Red Sea",
            "Reroute via Cape of Good Hope (+12 days, +$2000/container)",
            "Reroute shipments via Cape of Good Hope",
            "Prevents stockouts but increases lead time by 12 days.",
        ),
        logistics_row(
            "Long Beach",
            "Divert to Port of Oakland or use rail from Vancouver",
            "Divert inbound containers to Port of Oakland",
            "Avoids strike delays at the cost of extra inland haulage.",
        ),
        logistics_row(
            "Suez Canal",
            "Air freight for critical components, reroute others via South Africa",
            "Move critical components to air freight and reroute bulk via South Africa",
            "Keeps critical lines supplied while bulk lead time grows.",
        ),
    ]
}

fn default_logistics(route: &str) -> LogisticsOption {
    logistics_row(
        route,
        "Standard shipping routes available; consider air freight for urgent needs.",
        "Maintain standard routing and monitor for escalation",
        "No rerouting cost; exposure remains if the disruption spreads.",
    )
}

fn knowledge_row(topic: &str, category: &str, summary: &str) -> KnowledgeTopic {
    KnowledgeTopic {
        topic: topic.to_string(),
        category: category.to_string(),
        summary: summary.to_string(),
    }
}

fn builtin_knowledge() -> Vec<KnowledgeTopic> {
    vec![
        knowledge_row(
            "Generative AI adoption",
            "Technology",
            "Enterprise use of large language models is moving from pilots to production, led by software and financial services.",
        ),
        knowledge_row(
            "Semiconductor capacity",
            "Technology",
            "Advanced-node fabrication remains concentrated in East Asia; new fabs in the US and EU come online after 2026.",
        ),
        knowledge_row(
            "Interest rate cycle",
            "Economics",
            "Major central banks have begun easing, lowering financing costs for long-horizon R&D.",
        ),
        knowledge_row(
            "AI regulation",
            "Policy",
            "The EU AI Act phases in obligations for general-purpose models; other jurisdictions favour voluntary frameworks.",
        ),
        knowledge_row(
            "Energy transition",
            "Environment",
            "Grid storage and critical-mineral supply are the binding constraints on renewable build-out.",
        ),
        knowledge_row(
            "Biomedical research funding",
            "Health",
            "Public funding is flat while private capital concentrates in AI-driven drug discovery.",
        ),
    ]
}
