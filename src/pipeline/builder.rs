use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::pipeline::defaults::{HungarianSolver, InMemorySessionStore};
use crate::pipeline::runtime::{Scorer, ScorerParts};
use crate::pipeline::traits::{AssignmentSolver, SessionStore};

pub struct ScorerBuilder {
    config: ScoringConfig,
    solver: Option<Box<dyn AssignmentSolver>>,
    store: Option<Box<dyn SessionStore>>,
}

impl ScorerBuilder {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            solver: None,
            store: None,
        }
    }

    pub fn with_assignment_solver(mut self, solver: Box<dyn AssignmentSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    pub fn with_session_store(mut self, store: Box<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Scorer, ScoringError> {
        self.config.validate()?;
        Ok(Scorer::from_parts(ScorerParts {
            collar_seconds: self.config.collar_seconds,
            solver: self
                .solver
                .unwrap_or_else(|| Box::new(HungarianSolver)),
            store: self
                .store
                .unwrap_or_else(|| Box::new(InMemorySessionStore::new())),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpeakerMap;

    #[test]
    fn build_rejects_invalid_config() {
        let result = ScorerBuilder::new(ScoringConfig::with_collar(-1.0)).build();
        assert!(result.is_err());
    }

    #[test]
    fn build_defaults_succeed() {
        assert!(ScorerBuilder::new(ScoringConfig::default()).build().is_ok());
    }

    #[test]
    fn custom_session_store_seeds_incremental_sessions() {
        let mut map = SpeakerMap::new();
        map.insert("A", "X").unwrap();
        let scorer = ScorerBuilder::new(ScoringConfig::default())
            .with_session_store(Box::new(InMemorySessionStore::with_map(map.clone())))
            .build()
            .unwrap();
        let session = scorer.incremental_session().unwrap();
        assert_eq!(*session.speaker_map(), map);
    }
}
