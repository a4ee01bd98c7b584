pub mod config;
pub mod error;
pub mod frontier;
pub mod pipeline;
mod scoring;
pub mod types;

pub use config::ScoringConfig;
pub use error::ScoringError;
pub use pipeline::builder::ScorerBuilder;
pub use pipeline::defaults::{HungarianSolver, InMemorySessionStore};
pub use pipeline::runtime::Scorer;
pub use pipeline::session::{IncrementalSession, RunningSummary};
pub use pipeline::traits::{AssignmentSolver, SessionStore};
pub use types::{
    EvalMask, Pairing, RatioPair, ScoreReport, Segment, Show, SpeakerMap, Timeline,
};
