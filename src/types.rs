use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// One labelled speech interval. Times are in seconds, `end > start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub speaker: String,
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(speaker: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            speaker: speaker.into(),
            start,
            end,
        }
    }
}

/// All segments of one source (reference or hypothesis) for one show.
/// Segments may arrive in any order and may overlap across speakers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub segments: Vec<Segment>,
}

impl Timeline {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub(crate) fn validate(&self, show: &str, source: &str) -> Result<(), ScoringError> {
        for seg in &self.segments {
            if !seg.start.is_finite() || !seg.end.is_finite() || seg.end <= seg.start {
                return Err(ScoringError::invalid_input(format!(
                    "show '{show}': {source} segment for '{}' has invalid bounds [{}, {}]",
                    seg.speaker, seg.start, seg.end
                )));
            }
        }
        Ok(())
    }
}

/// Scored time ranges (UEM). Ranges must be time-ordered and disjoint;
/// time outside the mask contributes to no metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalMask {
    pub ranges: Vec<(f64, f64)>,
}

impl EvalMask {
    pub fn new(ranges: Vec<(f64, f64)>) -> Self {
        Self { ranges }
    }

    pub fn single(start: f64, end: f64) -> Self {
        Self {
            ranges: vec![(start, end)],
        }
    }

    pub(crate) fn validate(&self, show: &str) -> Result<(), ScoringError> {
        let mut prev_end = f64::NEG_INFINITY;
        for &(start, end) in &self.ranges {
            if !start.is_finite() || !end.is_finite() || end <= start {
                return Err(ScoringError::invalid_input(format!(
                    "show '{show}': mask range [{start}, {end}] has invalid bounds"
                )));
            }
            if start < prev_end {
                return Err(ScoringError::invalid_input(format!(
                    "show '{show}': mask ranges must be ordered and disjoint (range starting at {start} overlaps the previous one)"
                )));
            }
            prev_end = end;
        }
        Ok(())
    }
}

/// Per-show scoring input: a reference timeline, a hypothesis timeline
/// and the evaluation mask restricting what is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    pub reference: Timeline,
    pub hypothesis: Timeline,
    pub mask: EvalMask,
}

impl Show {
    pub fn new(id: impl Into<String>, reference: Timeline, hypothesis: Timeline, mask: EvalMask) -> Self {
        Self {
            id: id.into(),
            reference,
            hypothesis,
            mask,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ScoringError> {
        self.reference.validate(&self.id, "reference")?;
        self.hypothesis.validate(&self.id, "hypothesis")?;
        self.mask.validate(&self.id)
    }
}

/// 1:1 partial mapping from reference speaker labels to hypothesis
/// speaker labels. Entries supplied by the caller are pinned: scoring
/// never alters them, it only adds new pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerMap {
    entries: BTreeMap<String, String>,
}

impl SpeakerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hypothesis_for(&self, reference: &str) -> Option<&str> {
        self.entries.get(reference).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(r, h)| (r.as_str(), h.as_str()))
    }

    /// Adds a pair, enforcing that neither side is already mapped to a
    /// different partner.
    pub fn insert(
        &mut self,
        reference: impl Into<String>,
        hypothesis: impl Into<String>,
    ) -> Result<(), ScoringError> {
        let reference = reference.into();
        let hypothesis = hypothesis.into();
        if let Some(existing) = self.entries.get(&reference) {
            if *existing != hypothesis {
                return Err(ScoringError::invalid_input(format!(
                    "reference speaker '{reference}' is already mapped to '{existing}'"
                )));
            }
            return Ok(());
        }
        if let Some((other, _)) = self.entries.iter().find(|(_, h)| **h == hypothesis) {
            return Err(ScoringError::invalid_input(format!(
                "hypothesis speaker '{hypothesis}' is already mapped to '{other}'"
            )));
        }
        self.entries.insert(reference, hypothesis);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ScoringError> {
        serde_json::to_string(&self.entries)
            .map_err(|e| ScoringError::invalid_input(format!("serialize speaker map: {e}")))
    }

    pub fn from_json(data: &str) -> Result<Self, ScoringError> {
        let entries: BTreeMap<String, String> = serde_json::from_str(data)
            .map_err(|e| ScoringError::invalid_input(format!("parse speaker map: {e}")))?;
        let mut map = Self::new();
        for (r, h) in entries {
            map.insert(r, h)?;
        }
        Ok(map)
    }
}

/// Outcome of the alignment step for one speaker on either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pairing {
    Matched {
        reference: String,
        hypothesis: String,
    },
    UnmatchedRef {
        reference: String,
    },
    UnmatchedHyp {
        hypothesis: String,
    },
}

/// A `correct / total` pair accumulated across shows, kept unreduced so
/// multi-show totals can be pooled before dividing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioPair {
    pub correct: f64,
    pub total: f64,
}

impl RatioPair {
    pub fn fraction(&self) -> f64 {
        if self.total > 0.0 {
            self.correct / self.total
        } else {
            0.0
        }
    }
}

/// Full result of one scoring call. All rates are percentages of total
/// scored reference time; `jer_per_speaker` holds fractions in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub der: f64,
    pub fa_rate: f64,
    pub miss_rate: f64,
    pub conf_rate: f64,
    pub total_time: f64,
    /// Unweighted mean of the per-speaker Jaccard error rates, as a
    /// percentage.
    pub jer: f64,
    pub jer_per_speaker: Vec<(String, f64)>,
    pub purity: RatioPair,
    pub coverage: RatioPair,
    pub speaker_map: SpeakerMap,
    pub pairings: Vec<Pairing>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_map_insert_is_one_to_one() {
        let mut map = SpeakerMap::new();
        map.insert("A", "X").unwrap();
        assert_eq!(map.hypothesis_for("A"), Some("X"));
        // Re-inserting the identical pair is fine.
        map.insert("A", "X").unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.insert("A", "Y").is_err());
        assert!(map.insert("B", "X").is_err());
        map.insert("B", "Y").unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn speaker_map_json_round_trip() {
        let mut map = SpeakerMap::new();
        map.insert("A", "X").unwrap();
        map.insert("B", "Y").unwrap();
        let json = map.to_json().unwrap();
        let back = SpeakerMap::from_json(&json).unwrap();
        assert_eq!(map, back);
    }

    #[test]
    fn speaker_map_from_json_rejects_duplicate_hypothesis() {
        let err = SpeakerMap::from_json(r#"{"A": "X", "B": "X"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn timeline_validation_rejects_backwards_segment() {
        let timeline = Timeline::new(vec![Segment::new("A", 5.0, 5.0)]);
        assert!(timeline.validate("show1", "reference").is_err());
    }

    #[test]
    fn mask_validation_rejects_overlap() {
        let mask = EvalMask::new(vec![(0.0, 10.0), (5.0, 15.0)]);
        assert!(mask.validate("show1").is_err());
        let mask = EvalMask::new(vec![(0.0, 10.0), (10.0, 15.0)]);
        assert!(mask.validate("show1").is_ok());
    }
}
