//! Step-function representation of speaker activity over time.
//!
//! A frontier is an ordered list of `(tag, time)` events where the tag is
//! the state of the half-open span ending at `time`; the first event's tag
//! is the state from time zero. All sweep algorithms in the crate walk
//! frontiers with monotone cursors.

use crate::types::EvalMask;

/// Frontier state tag: `Gap` outside speech, `Active` inside speech,
/// `Collar` inside the no-score forgiveness zone around a reference
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Gap,
    Active,
    Collar,
}

pub type Event<T> = (T, f64);

/// Tag of a hypothesis-union x reference-union merge.
pub type PairTag = (Mark, Mark);
/// Tag of the (hyp-union x ref-union) x per-speaker-collar merge consumed
/// by the duration accounting table.
pub type TripleTag = (PairTag, Mark);

/// Builds a frontier from raw `(start, end)` ranges: sorts, coalesces
/// overlapping or touching ranges, then emits alternating `Gap`/`Active`
/// events at the merged boundaries.
pub fn from_ranges(mut ranges: Vec<(f64, f64)>) -> Vec<Event<Mark>> {
    ranges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if last.1 >= range.0 => last.1 = last.1.max(range.1),
            _ => merged.push(range),
        }
    }
    let mut front = Vec::with_capacity(merged.len() * 2);
    for (start, end) in merged {
        front.push((Mark::Gap, start));
        front.push((Mark::Active, end));
    }
    front
}

/// Restricts a frontier to the scored ranges of the mask. Time outside the
/// mask is dropped entirely; a synthetic `Gap` event is re-inserted at a
/// mask-range start when the frontier is mid-active there.
pub fn apply_mask(front: &[Event<Mark>], mask: &EvalMask) -> Vec<Event<Mark>> {
    let mut out: Vec<Event<Mark>> = Vec::new();
    let mut mi = 0;
    let mut fi = 0;
    while mi != mask.ranges.len() && fi != front.len() {
        let (mask_start, mask_end) = mask.ranges[mi];
        let (tag, time) = front[fi];
        if mask_start < time {
            if mask_end >= time {
                if tag != Mark::Gap && out.last().map_or(true, |last| last.1 < mask_start) {
                    out.push((Mark::Gap, mask_start));
                }
                out.push((tag, time));
                fi += 1;
            } else {
                if tag != Mark::Gap {
                    if out.last().map_or(true, |last| last.1 < mask_start) {
                        out.push((Mark::Gap, mask_start));
                    }
                    out.push((tag, mask_end));
                }
                mi += 1;
            }
        } else {
            fi += 1;
        }
    }
    out
}

/// Surrounds every transition point with a `[time - collar, time + collar]`
/// no-score zone, clamped at zero. Overlapping zones coalesce into the
/// previous `Collar` event.
pub fn add_collar(front: &[Event<Mark>], collar: f64) -> Vec<Event<Mark>> {
    let mut out: Vec<Event<Mark>> = Vec::with_capacity(front.len() * 2);
    for &(tag, time) in front {
        let a = (time - collar).max(0.0);
        let b = time + collar;
        match out.last_mut() {
            Some(last) if a <= last.1 => *last = (Mark::Collar, b),
            _ => {
                out.push((tag, a));
                out.push((Mark::Collar, b));
            }
        }
    }
    out
}

/// Synchronized merge of two frontiers by event time. Each output event
/// carries the simultaneous state of both inputs; past the shorter input's
/// last event the supplied tail tag stands in for its state.
pub fn merge<A: Copy, B: Copy>(
    a: &[Event<A>],
    b: &[Event<B>],
    tail_a: A,
    tail_b: B,
) -> Vec<Event<(A, B)>> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut pa = 0;
    let mut pb = 0;
    while pa < a.len() || pb < b.len() {
        let time = if pb == b.len() {
            a[pa].1
        } else if pa == a.len() {
            b[pb].1
        } else {
            a[pa].1.min(b[pb].1)
        };
        let tag_a = if pa == a.len() { tail_a } else { a[pa].0 };
        let tag_b = if pb == b.len() { tail_b } else { b[pb].0 };
        out.push(((tag_a, tag_b), time));
        if pa != a.len() && a[pa].1 == time {
            pa += 1;
        }
        if pb != b.len() && b[pb].1 == time {
            pb += 1;
        }
    }
    out
}

/// Total `Active` time of a frontier.
pub fn active_time(front: &[Event<Mark>]) -> f64 {
    let mut total = 0.0;
    let mut open = 0.0;
    for &(tag, time) in front {
        match tag {
            Mark::Gap => open = time,
            Mark::Active => total += time - open,
            Mark::Collar => {}
        }
    }
    total
}

#[cfg(test)]
mod tests;
