//! Pairwise duration accounting: classifies every instant of a merged
//! frontier into credit buckets for one (reference, hypothesis) speaker
//! pair. The resulting `de` credit score only drives alignment; official
//! totals come from the confusion accumulator.

use crate::frontier::{Event, Mark, TripleTag};

/// All durations are rounded to milliseconds before use; the reference
/// scoring convention depends on it to keep long sweeps stable.
pub(crate) fn round_ms(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct PairTimes {
    /// Hypothesis-active time unexplained by the reference side (`eh`).
    pub hyp_only: f64,
    /// Reference-active time unexplained by this hypothesis (`er`).
    pub ref_only: f64,
    /// Time credited as correct for the pair, collar included (`tc`).
    pub correct: f64,
    pub fa: f64,
    pub miss: f64,
    pub confusion: f64,
}

impl PairTimes {
    pub fn add(&mut self, other: &PairTimes) {
        self.hyp_only += other.hyp_only;
        self.ref_only += other.ref_only;
        self.correct += other.correct;
        self.fa += other.fa;
        self.miss += other.miss;
        self.confusion += other.confusion;
    }

    pub fn rounded(&self) -> PairTimes {
        PairTimes {
            hyp_only: round_ms(self.hyp_only),
            ref_only: round_ms(self.ref_only),
            correct: round_ms(self.correct),
            fa: round_ms(self.fa),
            miss: round_ms(self.miss),
            confusion: round_ms(self.confusion),
        }
    }
}

/// The fixed bucket table, keyed on ((hyp-union, ref-union), collar).
/// `thyp` is the hypothesis speaker's active time inside the span, `thyn`
/// the remainder of the span. Combinations not listed contribute nothing.
fn classify(thyp: f64, thyn: f64, tag: TripleTag, acc: &mut PairTimes) {
    use Mark::{Active, Collar, Gap};
    match tag {
        ((Active, Active), Active) => {
            acc.ref_only += thyn;
            acc.correct += thyp;
            acc.confusion += thyn;
        }
        ((Active, Active), Gap) => acc.hyp_only += thyp,
        ((Active, Active), Collar) => acc.correct += thyp,
        ((Active, Gap), Gap) => {
            acc.hyp_only += thyp;
            acc.fa += thyp;
        }
        ((Active, Gap), Collar) => acc.correct += thyp,
        ((Gap, Active), Active) => {
            acc.ref_only += thyn;
            acc.miss += thyn;
        }
        _ => {}
    }
}

/// Sweeps a merged three-way frontier against one hypothesis speaker's
/// frontier, intersecting spans and classifying each one. Hypothesis
/// activity past the last merged boundary counts as uncredited false
/// alarm. Returns unrounded sums; callers round after pooling shows.
pub(crate) fn compute_times(
    combined: &[Event<TripleTag>],
    hyp: &[Event<Mark>],
) -> PairTimes {
    let mut acc = PairTimes::default();
    let mut hpos = 0;
    let mut span_start = 0.0;
    let mut thyp = 0.0;
    let mut hyp_before = 0.0;
    for &(tag, span_end) in combined {
        while hpos < hyp.len() {
            let inter = hyp[hpos].1.min(span_end);
            if hyp[hpos].0 == Mark::Active {
                thyp += inter - hyp_before;
            }
            if hyp[hpos].1 > span_end {
                break;
            }
            hyp_before = inter;
            hpos += 1;
        }
        classify(thyp, span_end - span_start - thyp, tag, &mut acc);
        if hpos < hyp.len() {
            hyp_before = hyp[hpos].1.min(span_end);
        }
        span_start = span_end;
        thyp = 0.0;
    }
    while hpos < hyp.len() {
        if hyp[hpos].0 == Mark::Active {
            thyp += hyp[hpos].1 - span_start;
        }
        span_start = hyp[hpos].1;
        hpos += 1;
    }
    classify(thyp, 0.0, ((Mark::Active, Mark::Gap), Mark::Gap), &mut acc);
    acc
}

/// Time a speaker frontier spends active while the other side's union is
/// silent. Seeds the false-alarm offset of the credit score.
pub(crate) fn compute_miss(union: &[Event<Mark>], front: &[Event<Mark>]) -> f64 {
    let mut pos = 0;
    let mut span_start = 0.0;
    let mut active = 0.0;
    let mut before = 0.0;
    let mut alone = 0.0;
    for &(tag, span_end) in union {
        while pos < front.len() {
            let inter = front[pos].1.min(span_end);
            if front[pos].0 == Mark::Active {
                active += inter - before;
            }
            if front[pos].1 > span_end {
                break;
            }
            before = inter;
            pos += 1;
        }
        if tag == Mark::Gap {
            alone += active;
        }
        if pos < front.len() {
            before = front[pos].1.min(span_end);
        }
        span_start = span_end;
        active = 0.0;
    }
    while pos < front.len() {
        if front[pos].0 == Mark::Active {
            alone += front[pos].1 - span_start;
        }
        span_start = front[pos].1;
        pos += 1;
    }
    round_ms(alone)
}
