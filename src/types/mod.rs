pub mod comparison;
pub mod product;

pub use comparison::{ComparisonRequest, ComparisonResult};
pub use product::ProductRecord;
