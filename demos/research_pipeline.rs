//! Research pipeline example.
//!
//! Runs Research Scout → Critical Analyst → Strategy Advisor and prints
//! the findings, the knowledge hub and the recommended strategies.
//!
//! Run with:
//!   GROQ_API_KEY=your_key TAVILY_API_KEY=your_key cargo run --example research_pipeline "topic"

use nexus::research::{ResearchSeed, research_pipeline};
use nexus::{PipelineEvent, Services};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("nexus=info")
        .init();

    let seed = match env::args().nth(1) {
        Some(query) => ResearchSeed::query(query),
        None => ResearchSeed::default(),
    };

    let pipeline = research_pipeline(Services::from_env())
        .on_stage_start(|event| {
            if let PipelineEvent::StageStart { stage, step } = event {
                println!("→ step {}: {}", step, stage);
            }
        })
        .on_extraction_failed(|event| {
            if let PipelineEvent::ExtractionFailed { stage, reason } = event {
                println!("  ! {} could not parse its output: {}", stage, reason);
            }
        });

    let state = pipeline.run(seed).await?;

    println!("\n{}", "═".repeat(70));
    println!("  RESEARCH: {}", state.query);
    println!("{}\n", "═".repeat(70));

    println!("Findings:");
    for finding in &state.findings {
        println!("  - [{}] {}", finding.category, finding.insight);
    }
    println!("\nStrategies:");
    for strategy in &state.strategies {
        println!("  - ({}) {}", strategy.priority, strategy.strategy);
    }

    println!("\n{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
