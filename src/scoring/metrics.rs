//! Derived quality figures on top of the pooled duration matrices.

use crate::scoring::confusion::ConfusionTotals;
use crate::scoring::registry::SpeakerRegistry;
use crate::scoring::Matrix;
use crate::types::RatioPair;

/// Cluster purity and coverage from the pairwise credit matrix. Purity
/// takes the best reference per hypothesis column, coverage the best
/// hypothesis per reference row; both are reported against the matrix
/// total.
pub(crate) fn purity_coverage(de: &Matrix) -> (RatioPair, RatioPair) {
    if de.rows() == 0 || de.cols() == 0 {
        return (RatioPair::default(), RatioPair::default());
    }
    let total = de.total();
    let mut purity_correct = 0.0;
    for c in 0..de.cols() {
        let mut best = f64::NEG_INFINITY;
        for r in 0..de.rows() {
            best = best.max(de.get(r, c));
        }
        purity_correct += best;
    }
    let mut coverage_correct = 0.0;
    for r in 0..de.rows() {
        let mut best = f64::NEG_INFINITY;
        for c in 0..de.cols() {
            best = best.max(de.get(r, c));
        }
        coverage_correct += best;
    }
    (
        RatioPair {
            correct: purity_correct,
            total,
        },
        RatioPair {
            correct: coverage_correct,
            total,
        },
    )
}

/// Per-reference-speaker error rate combining that speaker's miss and
/// confusion with the false alarm of its mapped hypothesis speaker, as a
/// fraction of their pooled time. An unmapped reference speaker scores
/// 1.0; a speaker with no pooled time at all scores 0.0.
pub(crate) fn jer_per_speaker(
    refs: &SpeakerRegistry,
    map_rh: &[Option<usize>],
    totals: &ConfusionTotals,
    hyp_times: &[f64],
) -> Vec<(String, f64)> {
    let mut out = Vec::with_capacity(refs.count());
    for r in 0..refs.count() {
        let miss = totals.matrix.row_sum(r) + totals.lost_ref[r];
        let (hyp_time, fa) = match map_rh[r] {
            Some(h) => (hyp_times[h], hyp_times[h] - totals.correct_hyp[h]),
            None => (0.0, 0.0),
        };
        let total = miss + hyp_time;
        let jer = if map_rh[r].is_none() {
            1.0
        } else if total > 0.0 {
            ((miss + fa) / total).min(1.0)
        } else {
            0.0
        };
        out.push((refs.label(r).to_string(), jer));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Segment, Timeline};

    fn registry(labels: &[&str]) -> SpeakerRegistry {
        let timeline = Timeline::new(
            labels
                .iter()
                .enumerate()
                .map(|(i, l)| Segment::new(*l, i as f64, i as f64 + 1.0))
                .collect(),
        );
        let timelines = [&timeline];
        SpeakerRegistry::build(&timelines)
    }

    #[test]
    fn purity_and_coverage_pick_dominant_cells() {
        let mut de = Matrix::zeros(2, 2);
        de.set(0, 0, 8.0);
        de.set(0, 1, 2.0);
        de.set(1, 0, 1.0);
        de.set(1, 1, 9.0);
        let (purity, coverage) = purity_coverage(&de);
        assert_eq!(purity.correct, 17.0);
        assert_eq!(purity.total, 20.0);
        assert_eq!(coverage.correct, 17.0);
        assert!((purity.fraction() - 0.85).abs() < 1e-12);
    }

    #[test]
    fn empty_matrix_yields_zero_ratios() {
        let (purity, coverage) = purity_coverage(&Matrix::zeros(0, 3));
        assert_eq!(purity.fraction(), 0.0);
        assert_eq!(coverage.fraction(), 0.0);
    }

    #[test]
    fn perfect_speaker_scores_zero() {
        let refs = registry(&["A"]);
        let mut totals = ConfusionTotals::new(1, 1);
        totals.correct_ref[0] = 10.0;
        totals.correct_hyp[0] = 10.0;
        let jer = jer_per_speaker(&refs, &[Some(0)], &totals, &[10.0]);
        assert_eq!(jer, vec![("A".to_string(), 0.0)]);
    }

    #[test]
    fn unmapped_speaker_scores_one() {
        let refs = registry(&["A"]);
        let mut totals = ConfusionTotals::new(1, 0);
        totals.lost_ref[0] = 10.0;
        let jer = jer_per_speaker(&refs, &[None], &totals, &[]);
        assert_eq!(jer, vec![("A".to_string(), 1.0)]);
    }

    #[test]
    fn mixed_errors_accumulate() {
        // Speaker A: 2s confusion + 1s lost, mapped hyp has 8s total of
        // which 6s correct. miss = 3, fa = 2, total = 3 + 8 = 11.
        let refs = registry(&["A"]);
        let mut totals = ConfusionTotals::new(1, 1);
        totals.matrix.add(0, 0, 2.0);
        totals.lost_ref[0] = 1.0;
        totals.correct_hyp[0] = 6.0;
        let jer = jer_per_speaker(&refs, &[Some(0)], &totals, &[8.0]);
        assert!((jer[0].1 - 5.0 / 11.0).abs() < 1e-12);
    }
}
