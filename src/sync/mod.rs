pub mod conflict;
pub mod engine;

pub use conflict::ConflictResolver;
pub use engine::{Outcome, ReconciliationEngine, Stage};
