use crate::error::ScoringError;
use crate::types::SpeakerMap;

/// Solves a square minimum-cost assignment problem, returning the chosen
/// column for each row.
pub trait AssignmentSolver: Send + Sync {
    fn solve(&self, costs: &[Vec<i64>]) -> Result<Vec<usize>, ScoringError>;
}

/// Persists the speaker map between scoring calls of a lifelong session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<SpeakerMap, ScoringError>;
    fn persist(&self, map: &SpeakerMap) -> Result<(), ScoringError>;
}
