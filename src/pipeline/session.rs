use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::pipeline::runtime::Scorer;
use crate::types::{ScoreReport, Show, SpeakerMap};

/// Lifelong scoring session. Shows arrive one at a time; the speaker map
/// grown by each call seeds the next, and the running totals weight each
/// show's rates by its scored time.
pub struct IncrementalSession<'s> {
    scorer: &'s Scorer,
    map: SpeakerMap,
    shows_scored: usize,
    total_time: f64,
    total_error: f64,
    total_fa: f64,
    total_miss: f64,
    total_conf: f64,
}

/// Time-weighted totals over every show scored so far in a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunningSummary {
    pub shows_scored: usize,
    pub total_time: f64,
    pub der: f64,
    pub fa_rate: f64,
    pub miss_rate: f64,
    pub conf_rate: f64,
}

impl<'s> IncrementalSession<'s> {
    pub(crate) fn new(scorer: &'s Scorer, map: SpeakerMap) -> Self {
        Self {
            scorer,
            map,
            shows_scored: 0,
            total_time: 0.0,
            total_error: 0.0,
            total_fa: 0.0,
            total_miss: 0.0,
            total_conf: 0.0,
        }
    }

    /// Scores one show with the session map pinned, absorbs any newly
    /// discovered pairs, and persists the map to the session store.
    pub fn score_show(&mut self, show: &Show) -> Result<ScoreReport, ScoringError> {
        let report = self.scorer.score_show_with_map(show, &self.map)?;

        let weight = report.total_time / 100.0;
        self.total_time += report.total_time;
        self.total_error += report.der * weight;
        self.total_fa += report.fa_rate * weight;
        self.total_miss += report.miss_rate * weight;
        self.total_conf += report.conf_rate * weight;
        self.shows_scored += 1;

        self.map = report.speaker_map.clone();
        self.scorer.persist_map(&self.map)?;
        tracing::debug!(
            show = %show.id,
            shows_scored = self.shows_scored,
            mapped_speakers = self.map.len(),
            running_der = 100.0 * self.total_error / self.total_time,
            "session: show scored"
        );
        Ok(report)
    }

    pub fn speaker_map(&self) -> &SpeakerMap {
        &self.map
    }

    /// `None` until the first show has been scored.
    pub fn running(&self) -> Option<RunningSummary> {
        if self.shows_scored == 0 || self.total_time <= 0.0 {
            return None;
        }
        Some(RunningSummary {
            shows_scored: self.shows_scored,
            total_time: self.total_time,
            der: 100.0 * self.total_error / self.total_time,
            fa_rate: 100.0 * self.total_fa / self.total_time,
            miss_rate: 100.0 * self.total_miss / self.total_time,
            conf_rate: 100.0 * self.total_conf / self.total_time,
        })
    }
}
