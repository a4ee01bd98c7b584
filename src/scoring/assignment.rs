//! Speaker identity resolution: a hand-rolled Hungarian solver plus the
//! pin-aware bookkeeping that turns its raw assignment into a speaker map.

use crate::error::ScoringError;
use crate::scoring::registry::SpeakerRegistry;
use crate::scoring::Matrix;
use crate::types::{Pairing, SpeakerMap};

const INF: i64 = i64::MAX / 4;

/// Exact O(n^3) minimum-cost perfect matching on a square cost matrix
/// (Hungarian algorithm, potentials formulation). Returns the assigned
/// column for each row.
pub(crate) fn minimum_cost_assignment(costs: &[Vec<i64>]) -> Vec<usize> {
    let n = costs.len();
    if n == 0 {
        return Vec::new();
    }

    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    // p[j] = row currently assigned to column j, 1-based; 0 means free.
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = costs[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}

/// Pin-aware alignment problem over the free speakers of both sides.
///
/// A seed-map entry reserves whichever of its sides appears in the scored
/// shows, keeping it out of the optimization; when both sides appear the
/// entry becomes a pinned pair carried through unchanged.
pub(crate) struct AlignmentProblem {
    map_rh: Vec<Option<usize>>,
    map_hr: Vec<Option<usize>>,
    free_ref: Vec<usize>,
    free_hyp: Vec<usize>,
    costs: Vec<Vec<i64>>,
}

pub(crate) struct MappingOutcome {
    pub map_rh: Vec<Option<usize>>,
    pub map_hr: Vec<Option<usize>>,
    pub updated: SpeakerMap,
    pub pairings: Vec<Pairing>,
}

impl AlignmentProblem {
    pub fn build(
        seed: &SpeakerMap,
        refs: &SpeakerRegistry,
        hyps: &SpeakerRegistry,
        de: &Matrix,
    ) -> Self {
        let mut map_rh = vec![None; refs.count()];
        let mut map_hr = vec![None; hyps.count()];
        let mut reserved_ref = vec![false; refs.count()];
        let mut reserved_hyp = vec![false; hyps.count()];
        for (rs, hs) in seed.iter() {
            let rid = refs.global_id(rs);
            let hid = hyps.global_id(hs);
            if let Some(r) = rid {
                reserved_ref[r] = true;
            }
            if let Some(h) = hid {
                reserved_hyp[h] = true;
            }
            if let (Some(r), Some(h)) = (rid, hid) {
                map_rh[r] = Some(h);
                map_hr[h] = Some(r);
            }
        }

        let free_ref: Vec<usize> = (0..refs.count()).filter(|&r| !reserved_ref[r]).collect();
        let free_hyp: Vec<usize> = (0..hyps.count()).filter(|&h| !reserved_hyp[h]).collect();

        // Square matrix padded with zero-cost sentinel rows/columns; a
        // sentinel match later surfaces as UnmatchedRef/UnmatchedHyp.
        let opt_size = free_ref.len().max(free_hyp.len());
        let mut costs = vec![vec![0i64; opt_size]; opt_size];
        for (i, &r) in free_ref.iter().enumerate() {
            for (j, &h) in free_hyp.iter().enumerate() {
                costs[i][j] = -((de.get(r, h) * 1000.0).round() as i64);
            }
        }

        Self {
            map_rh,
            map_hr,
            free_ref,
            free_hyp,
            costs,
        }
    }

    pub fn costs(&self) -> &[Vec<i64>] {
        &self.costs
    }

    /// Applies the solver's row-to-column assignment. A proposed pair is
    /// accepted only when its credit score and its pairwise correct time
    /// are both positive; otherwise both speakers stay unmapped.
    pub fn resolve(
        mut self,
        assignment: &[usize],
        de: &Matrix,
        correct: &Matrix,
        refs: &SpeakerRegistry,
        hyps: &SpeakerRegistry,
        seed: &SpeakerMap,
    ) -> Result<MappingOutcome, ScoringError> {
        if assignment.len() != self.costs.len() {
            return Err(ScoringError::assignment(
                "applying solver output",
                format!(
                    "solver returned {} assignments for a {}-row problem",
                    assignment.len(),
                    self.costs.len()
                ),
            ));
        }

        let mut updated = seed.clone();
        for (i, &j) in assignment.iter().enumerate() {
            if i >= self.free_ref.len() || j >= self.free_hyp.len() {
                continue;
            }
            let r = self.free_ref[i];
            let h = self.free_hyp[j];
            if de.get(r, h) > 0.0 && correct.get(r, h) > 0.0 {
                self.map_rh[r] = Some(h);
                self.map_hr[h] = Some(r);
                updated
                    .insert(refs.label(r), hyps.label(h))
                    .map_err(|e| ScoringError::assignment("recording accepted pairing", e))?;
                tracing::debug!(
                    reference = refs.label(r),
                    hypothesis = hyps.label(h),
                    credit = de.get(r, h),
                    "alignment: accepted speaker pairing"
                );
            } else {
                tracing::debug!(
                    reference = refs.label(r),
                    hypothesis = hyps.label(h),
                    credit = de.get(r, h),
                    correct = correct.get(r, h),
                    "alignment: rejected non-positive pairing, speakers stay unmapped"
                );
            }
        }

        let mut pairings = Vec::with_capacity(refs.count() + hyps.count());
        for r in 0..refs.count() {
            match self.map_rh[r] {
                Some(h) => pairings.push(Pairing::Matched {
                    reference: refs.label(r).to_string(),
                    hypothesis: hyps.label(h).to_string(),
                }),
                None => pairings.push(Pairing::UnmatchedRef {
                    reference: refs.label(r).to_string(),
                }),
            }
        }
        for h in 0..hyps.count() {
            if self.map_hr[h].is_none() {
                pairings.push(Pairing::UnmatchedHyp {
                    hypothesis: hyps.label(h).to_string(),
                });
            }
        }

        Ok(MappingOutcome {
            map_rh: self.map_rh,
            map_hr: self.map_hr,
            updated,
            pairings,
        })
    }
}
