pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod i18n;
pub mod llm;
pub mod logging;
pub mod server;
pub mod session;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::CompareError;
pub use generator::context::GeneratorContext;
pub use generator::workflow::{ComparisonWorkflow, run_guarded};
pub use server::{AppState, build_router};
pub use types::{ComparisonRequest, ComparisonResult, ProductRecord};
