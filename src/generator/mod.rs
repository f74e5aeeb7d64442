pub mod aggregator;
pub mod comparison;
pub mod context;
pub mod fallback;
pub mod merge;
pub mod outlet;
pub mod readme;
pub mod template;
pub mod types;
pub mod workflow;
