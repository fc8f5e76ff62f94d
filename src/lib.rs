//! Nexus - staged LLM pipelines
//!
//! Nexus runs fixed-order chains of stages over an accumulating, typed
//! state. Each stage may call a search provider and a reasoning service
//! (an LLM), returns a partial update plus one thought and a routing hint,
//! and the driver merges the update under declared per-field policies.
//! Collaborator failures degrade to fallback values so a run always ends
//! with a usable state.
//!
//! Two pipelines ship with the crate: supply-chain risk ([`risk`]) and
//! research ([`research`]).
//!
//! # Quick Start
//!
//! ```ignore
//! use nexus::{Services, risk};
//!
//! #[tokio::main]
//! async fn main() -> nexus::Result<()> {
//!     let pipeline = risk::risk_pipeline(Services::from_env()).verbose(true);
//!     let state = pipeline.run(risk::RiskSeed::default()).await?;
//!
//!     for step in &state.mitigation_plan {
//!         println!("[{}] {}", step.priority, step.action);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod context;
mod copilot;
mod error;
mod extract;
mod pipeline;
mod records;
mod services;
mod template;
pub mod state;

pub mod research;
pub mod risk;

#[cfg(test)]
mod testing;

pub use config::{PipelineConfig, ReasoningConfig, SearchConfig};
pub use context::StageContext;
pub use copilot::{COPILOT_TEMPERATURE, Copilot};
pub use error::{Error, Result};
pub use extract::{Extraction, Record, extract, extract_report};
pub use pipeline::{
    COMPLETE, EventCallback, Next, Pipeline, PipelineCallbacks, PipelineEvent, SYSTEM_AGENT,
    Stage, StageOutput, verbose_callbacks,
};
pub use records::{
    Disruption, InventoryStatus, KnowledgeTopic, MitigationStep, ResearchFinding,
    StrategicRecommendation,
};
pub use services::{
    Catalog, ChatCompletions, LogisticsOption, ReasoningService, SearchProvider, Services, Table,
    TavilySearch,
};
pub use state::{FieldPolicy, Merge, MergePolicy, PipelineState, Thought};
