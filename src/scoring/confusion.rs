//! Ground-truth totals: one synchronized sweep per show across every
//! reference and hypothesis speaker frontier at once, attributing each
//! global event span to correct, lost or confusion buckets under the
//! final speaker mapping.

use crate::frontier::{Event, Mark};
use crate::scoring::Matrix;

#[derive(Debug)]
pub(crate) struct ConfusionTotals {
    pub correct_ref: Vec<f64>,
    pub correct_hyp: Vec<f64>,
    pub lost_ref: Vec<f64>,
    pub lost_hyp: Vec<f64>,
    pub matrix: Matrix,
}

impl ConfusionTotals {
    pub fn new(ref_count: usize, hyp_count: usize) -> Self {
        Self {
            correct_ref: vec![0.0; ref_count],
            correct_hyp: vec![0.0; hyp_count],
            lost_ref: vec![0.0; ref_count],
            lost_hyp: vec![0.0; hyp_count],
            matrix: Matrix::zeros(ref_count, hyp_count),
        }
    }
}

/// Sweeps one show. Frontiers are indexed by global speaker id; `None`
/// marks a speaker absent from this show. Reference frontiers must already
/// be the collar variant for speakers whose mapped hypothesis speaker is
/// present in the show.
pub(crate) fn accumulate_confusion(
    ref_fronts: &[Option<&[Event<Mark>]>],
    hyp_fronts: &[Option<&[Event<Mark>]>],
    map_rh: &[Option<usize>],
    totals: &mut ConfusionTotals,
) {
    let ref_count = ref_fronts.len();
    let hyp_count = hyp_fronts.len();
    let mut ref_pos = vec![0usize; ref_count];
    let mut hyp_pos = vec![0usize; hyp_count];
    let mut cur_time = 0.0;

    loop {
        let mut ridx: Vec<usize> = Vec::new();
        let mut r_in_collar: Vec<bool> = Vec::new();
        let mut hidx: Vec<usize> = Vec::new();
        let mut next_time: Option<f64> = None;

        // Who is active in the span ending at the earliest pending event.
        for r in 0..ref_count {
            let Some(front) = ref_fronts[r] else { continue };
            if ref_pos[r] == front.len() {
                continue;
            }
            let (tag, time) = front[ref_pos[r]];
            if next_time.map_or(true, |cur| time < cur) {
                next_time = Some(time);
            }
            if tag != Mark::Gap {
                ridx.push(r);
                r_in_collar.push(tag == Mark::Collar);
            }
        }
        for h in 0..hyp_count {
            let Some(front) = hyp_fronts[h] else { continue };
            if hyp_pos[h] == front.len() {
                continue;
            }
            let (tag, time) = front[hyp_pos[h]];
            if next_time.map_or(true, |cur| time < cur) {
                next_time = Some(time);
            }
            if tag != Mark::Gap {
                hidx.push(h);
            }
        }

        let Some(time) = next_time else { break };

        if !ridx.is_empty() || !hidx.is_empty() {
            let duration = time - cur_time;

            // Mapped pairs active together are correct and leave the pool.
            let mut i = 0;
            while i != ridx.len() {
                let r = ridx[i];
                let mut dropped = false;
                if let Some(h) = map_rh[r] {
                    if let Some(slot) = hidx.iter().position(|&x| x == h) {
                        totals.correct_ref[r] += duration;
                        totals.correct_hyp[h] += duration;
                        ridx.remove(i);
                        r_in_collar.remove(i);
                        hidx.remove(slot);
                        dropped = true;
                    }
                }
                if !dropped {
                    i += 1;
                }
            }

            // A mapped reference speaker inside a collar zone is forgiven.
            let mut i = 0;
            while i != ridx.len() {
                if r_in_collar[i] && map_rh[ridx[i]].is_some() {
                    ridx.remove(i);
                    r_in_collar.remove(i);
                } else {
                    i += 1;
                }
            }

            if hidx.is_empty() {
                for &r in &ridx {
                    totals.lost_ref[r] += duration;
                }
            } else if ridx.is_empty() {
                for &h in &hidx {
                    totals.lost_hyp[h] += duration;
                }
            } else {
                // Confusable time is the larger side's total, split evenly
                // across every (ref, hyp) combination.
                let conf_time = ridx.len().max(hidx.len()) as f64 * duration;
                let conf_slots = (ridx.len() * hidx.len()) as f64;
                let share = conf_time / conf_slots;
                for &r in &ridx {
                    for &h in &hidx {
                        totals.matrix.add(r, h, share);
                    }
                }
            }
        }

        for r in 0..ref_count {
            let Some(front) = ref_fronts[r] else { continue };
            if ref_pos[r] != front.len() && front[ref_pos[r]].1 == time {
                ref_pos[r] += 1;
            }
        }
        for h in 0..hyp_count {
            let Some(front) = hyp_fronts[h] else { continue };
            if hyp_pos[h] != front.len() && front[hyp_pos[h]].1 == time {
                hyp_pos[h] += 1;
            }
        }
        cur_time = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontier::from_ranges;

    fn fronts(ranges: &[Vec<(f64, f64)>]) -> Vec<Vec<Event<Mark>>> {
        ranges.iter().map(|r| from_ranges(r.clone())).collect()
    }

    fn as_refs(fronts: &[Vec<Event<Mark>>]) -> Vec<Option<&[Event<Mark>]>> {
        fronts.iter().map(|f| Some(f.as_slice())).collect()
    }

    #[test]
    fn mapped_pair_is_all_correct() {
        let rf = fronts(&[vec![(0.0, 10.0)]]);
        let hf = fronts(&[vec![(0.0, 10.0)]]);
        let mut totals = ConfusionTotals::new(1, 1);
        accumulate_confusion(&as_refs(&rf), &as_refs(&hf), &[Some(0)], &mut totals);
        assert_eq!(totals.correct_ref, vec![10.0]);
        assert_eq!(totals.correct_hyp, vec![10.0]);
        assert_eq!(totals.lost_ref, vec![0.0]);
        assert_eq!(totals.matrix.total(), 0.0);
    }

    #[test]
    fn unmapped_reference_is_lost() {
        let rf = fronts(&[vec![(0.0, 10.0)]]);
        let mut totals = ConfusionTotals::new(1, 0);
        accumulate_confusion(&as_refs(&rf), &[], &[None], &mut totals);
        assert_eq!(totals.lost_ref, vec![10.0]);
    }

    #[test]
    fn unmapped_hypothesis_is_false_alarm() {
        let hf = fronts(&[vec![(2.0, 6.0)]]);
        let mut totals = ConfusionTotals::new(0, 1);
        accumulate_confusion(&[], &as_refs(&hf), &[], &mut totals);
        assert_eq!(totals.lost_hyp, vec![4.0]);
    }

    #[test]
    fn crossed_mapping_is_confusion() {
        // A maps to Y, B maps to X, but the activity lines up A-with-X
        // and B-with-Y: every scored second is confusion.
        let rf = fronts(&[vec![(0.0, 5.0)], vec![(5.0, 10.0)]]);
        let hf = fronts(&[vec![(0.0, 5.0)], vec![(5.0, 10.0)]]);
        let mut totals = ConfusionTotals::new(2, 2);
        accumulate_confusion(
            &as_refs(&rf),
            &as_refs(&hf),
            &[Some(1), Some(0)],
            &mut totals,
        );
        assert_eq!(totals.correct_ref, vec![0.0, 0.0]);
        assert!((totals.matrix.get(0, 0) - 5.0).abs() < 1e-12);
        assert!((totals.matrix.get(1, 1) - 5.0).abs() < 1e-12);
        assert!((totals.matrix.total() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn overlap_splits_confusion_evenly() {
        // Two refs against one unrelated hyp on the same span: confusable
        // time is max(2, 1) * 4 = 8, split across both slots.
        let rf = fronts(&[vec![(0.0, 4.0)], vec![(0.0, 4.0)]]);
        let hf = fronts(&[vec![(0.0, 4.0)]]);
        let mut totals = ConfusionTotals::new(2, 1);
        accumulate_confusion(&as_refs(&rf), &as_refs(&hf), &[None, None], &mut totals);
        assert!((totals.matrix.get(0, 0) - 4.0).abs() < 1e-12);
        assert!((totals.matrix.get(1, 0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn mapped_speaker_in_collar_is_forgiven() {
        // Reference frontier is the collar variant: active [1, 3] with
        // collar zones at both ends; the mapped hypothesis is silent
        // during the trailing collar, which must not count as lost.
        let rf: Vec<Vec<Event<Mark>>> = vec![vec![
            (Mark::Gap, 0.75),
            (Mark::Collar, 1.25),
            (Mark::Active, 2.75),
            (Mark::Collar, 3.25),
        ]];
        let hf = fronts(&[vec![(1.25, 2.75)]]);
        let mut totals = ConfusionTotals::new(1, 1);
        accumulate_confusion(&as_refs(&rf), &as_refs(&hf), &[Some(0)], &mut totals);
        assert_eq!(totals.lost_ref, vec![0.0]);
        assert!((totals.correct_ref[0] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn reference_time_is_conserved() {
        // Two overlapping reference speakers against one hypothesis label:
        // whether or not a mapping exists, every reference speaker's time
        // lands in exactly one of correct, lost or confusion.
        let rf = fronts(&[vec![(0.0, 4.0)], vec![(0.0, 4.0)]]);
        let hf = fronts(&[vec![(0.0, 4.0)]]);
        for map in [[Some(0), None], [None, None]] {
            let mut totals = ConfusionTotals::new(2, 1);
            accumulate_confusion(&as_refs(&rf), &as_refs(&hf), &map, &mut totals);
            for r in 0..2 {
                let accounted =
                    totals.correct_ref[r] + totals.lost_ref[r] + totals.matrix.row_sum(r);
                assert!((accounted - 4.0).abs() < 1e-12, "speaker {r}: {accounted}");
            }
        }
    }

    #[test]
    fn absent_speaker_contributes_nothing() {
        let rf = fronts(&[vec![(0.0, 5.0)]]);
        let refs: Vec<Option<&[Event<Mark>]>> = vec![Some(rf[0].as_slice()), None];
        let mut totals = ConfusionTotals::new(2, 0);
        accumulate_confusion(&refs, &[], &[None, None], &mut totals);
        assert_eq!(totals.lost_ref, vec![5.0, 0.0]);
    }
}
