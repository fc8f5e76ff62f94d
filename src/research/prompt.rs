//! Prompt templates for the research pipeline.

pub const RESEARCH_SCOUT: &str = r#"You are the Research Scout. Identify the most significant findings in the search results below for the research question.

Research question: {query}

<search_results>
{results}
</search_results>

Respond with a single ```json block containing an object of this shape:

```json
{
    "thought": "One or two sentences explaining your reasoning",
    "findings": [
        {
            "category": "Technology",
            "insight": "What was found",
            "impact": "Why it matters",
            "source": "Where it was reported"
        }
    ]
}
```

Use one of these categories where possible: Technology, Economics, Policy, Environment, Health."#;

pub const CRITICAL_ANALYST: &str = r#"You are the Critical Analyst.

Findings from the research scout:
{findings}

Background knowledge:
{knowledge}

In three or four sentences, critique these findings: which are well supported by the background knowledge, which conflict with it, and what is missing. Reply in plain text."#;

pub const STRATEGY_ADVISOR: &str = r#"You are the Strategy Advisor. Recommend strategies for the research question using the findings and background knowledge below.

Research question: {query}

Findings:
{findings}

Background knowledge:
{knowledge}

Respond with a single ```json block containing an object of this shape:

```json
{
    "thought": "One or two sentences explaining your reasoning",
    "strategies": [
        {
            "strategy": "What to do",
            "priority": "High",
            "rationale": "Why, citing the findings"
        }
    ]
}
```

"priority" is one of High, Medium, Low. Give two to four strategies."#;
