use std::sync::Mutex;

use crate::error::ScoringError;
use crate::pipeline::traits::{AssignmentSolver, SessionStore};
use crate::scoring::assignment::minimum_cost_assignment;
use crate::types::SpeakerMap;

/// Exact Hungarian solver, the stock assignment backend.
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn solve(&self, costs: &[Vec<i64>]) -> Result<Vec<usize>, ScoringError> {
        for row in costs {
            if row.len() != costs.len() {
                return Err(ScoringError::assignment(
                    "checking cost matrix shape",
                    format!(
                        "expected a {n}x{n} matrix, got a row of length {}",
                        row.len(),
                        n = costs.len()
                    ),
                ));
            }
        }
        Ok(minimum_cost_assignment(costs))
    }
}

/// Keeps the session speaker map in process memory. A persistent backend
/// can replace it through the builder.
#[derive(Default)]
pub struct InMemorySessionStore {
    map: Mutex<SpeakerMap>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(map: SpeakerMap) -> Self {
        Self {
            map: Mutex::new(map),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<SpeakerMap, ScoringError> {
        let guard = self.map.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn persist(&self, map: &SpeakerMap) -> Result<(), ScoringError> {
        let mut guard = self.map.lock().unwrap_or_else(|e| e.into_inner());
        *guard = map.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hungarian_solver_rejects_ragged_matrix() {
        let solver = HungarianSolver;
        let costs = vec![vec![1, 2], vec![3]];
        assert!(solver.solve(&costs).is_err());
    }

    #[test]
    fn hungarian_solver_solves_square_matrix() {
        let solver = HungarianSolver;
        let costs = vec![vec![0, 9], vec![9, 0]];
        assert_eq!(solver.solve(&costs).unwrap(), vec![0, 1]);
    }

    #[test]
    fn in_memory_store_round_trips_the_map() {
        let store = InMemorySessionStore::new();
        assert!(store.load().unwrap().is_empty());
        let mut map = SpeakerMap::new();
        map.insert("A", "X").unwrap();
        store.persist(&map).unwrap();
        assert_eq!(store.load().unwrap(), map);
    }
}
