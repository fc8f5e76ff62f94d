//! Prompt templates for the risk pipeline.

/// Search text used when the search provider is unavailable.
pub const SEARCH_FALLBACK: &str = "MOCK SEARCH RESULT: Major port strike in Long Beach causing 10-day delays. Geopolitical tensions in the Red Sea affecting shipping routes.";

pub const RISK_SENTINEL: &str = r#"You are the Risk Sentinel. Analyze the following search results and identify key supply chain disruptions.

<search_results>
{results}
</search_results>

Respond with a single ```json block containing an object of this shape:

```json
{
    "thought": "One or two sentences explaining your reasoning",
    "disruptions": [
        {
            "id": "1",
            "type": "Geopolitical",
            "location": "Red Sea",
            "severity": "High",
            "description": "Shipping delays due to maritime security alerts.",
            "source": "Where this was reported"
        }
    ]
}
```

Rules:
- "type" is a short category such as Natural Disaster, Port Strike, Geopolitical
- "severity" is one of High, Medium, Low
- "location" is the port, canal, sea or region affected
- Only report disruptions supported by the search results"#;

pub const INVENTORY_ANALYST: &str = r#"You are the Inventory Analyst.

Disruption under review:
{disruption}

Current inventory:
{inventory}

In two or three sentences, assess which products are most exposed to this disruption and why. Reply in plain text."#;

pub const LOGISTICS_OPTIMIZER: &str = r#"You are the Logistics Optimizer.

Disruption location: {location}
Available logistics options: {options}

Proposed mitigation plan:
{plan}

In two or three sentences, explain the trade-offs of this plan. Reply in plain text."#;
