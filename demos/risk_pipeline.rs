//! Supply-chain risk pipeline example.
//!
//! Runs Risk Sentinel → Inventory Analyst → Logistics Optimizer against live
//! search and chat completions, then prints the final state as JSON.
//! Missing keys are not fatal: each stage falls back to its baseline data.
//!
//! Run with:
//!   GROQ_API_KEY=your_key TAVILY_API_KEY=your_key cargo run --example risk_pipeline "port strikes"

use nexus::risk::{RiskSeed, risk_pipeline};
use nexus::{PipelineConfig, Services};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("nexus=info")
        .init();

    let seed = match env::args().nth(1) {
        Some(query) => RiskSeed::query(query),
        None => RiskSeed::default(),
    };

    println!("\n{}", "═".repeat(70));
    println!("  SUPPLY-CHAIN RISK PIPELINE");
    println!(
        "  Query: {}",
        seed.query.as_deref().unwrap_or(nexus::risk::DEFAULT_QUERY)
    );
    println!("{}\n", "═".repeat(70));

    let pipeline =
        risk_pipeline(Services::from_env()).config(PipelineConfig::new().verbose(true));
    let state = pipeline.run(seed).await?;

    println!("\n{}", "─".repeat(70));
    for thought in &state.thoughts {
        println!("[{}] {}", thought.agent, thought.thought);
    }
    println!("{}\n", "─".repeat(70));

    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
