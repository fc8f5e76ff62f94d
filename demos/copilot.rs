//! Research co-pilot example.
//!
//! Run with:
//!   GROQ_API_KEY=your_key cargo run --example copilot "What is driving AI regulation?"

use nexus::Copilot;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("nexus=debug")
        .init();

    let question = env::args()
        .nth(1)
        .unwrap_or_else(|| "Which global trends matter most for technology strategy?".to_string());

    let copilot = Copilot::from_env();
    let answer = copilot.ask(&question).await?;

    println!("\nQ: {}\n", question);
    println!("{}", answer);
    Ok(())
}
