use crate::error::ScoringError;
use crate::frontier::{
    active_time, add_collar, apply_mask, from_ranges, merge, Event, Mark, PairTag,
};
use crate::pipeline::session::IncrementalSession;
use crate::pipeline::traits::{AssignmentSolver, SessionStore};
use crate::scoring::accounting::{compute_miss, compute_times, round_ms, PairTimes};
use crate::scoring::assignment::AlignmentProblem;
use crate::scoring::confusion::{accumulate_confusion, ConfusionTotals};
use crate::scoring::metrics::{jer_per_speaker, purity_coverage};
use crate::scoring::registry::SpeakerRegistry;
use crate::scoring::Matrix;
use crate::types::{ScoreReport, Show, SpeakerMap};

/// Diarization scorer. One instance handles all three topologies: a show
/// at a time, a lifelong incremental session, or a batch of shows scored
/// jointly under one global speaker namespace.
pub struct Scorer {
    collar_seconds: f64,
    solver: Box<dyn AssignmentSolver>,
    store: Box<dyn SessionStore>,
}

pub(crate) struct ScorerParts {
    pub collar_seconds: f64,
    pub solver: Box<dyn AssignmentSolver>,
    pub store: Box<dyn SessionStore>,
}

/// All frontier variants of one show, precomputed once and reused by the
/// pairwise accounting pass and the confusion sweep.
struct ShowFronts {
    ref_fronts: Vec<Vec<Event<Mark>>>,
    ref_collars: Vec<Vec<Event<Mark>>>,
    hyp_fronts: Vec<Vec<Event<Mark>>>,
    ref_union: Vec<Event<Mark>>,
    merged: Vec<Event<PairTag>>,
}

impl Scorer {
    pub(crate) fn from_parts(parts: ScorerParts) -> Self {
        Self {
            collar_seconds: parts.collar_seconds,
            solver: parts.solver,
            store: parts.store,
        }
    }

    /// Scores a single show against an empty seed map.
    pub fn score_show(&self, show: &Show) -> Result<ScoreReport, ScoringError> {
        self.score_joint(&[show], &SpeakerMap::new())
    }

    /// Scores a single show with caller-supplied pinned pairs.
    pub fn score_show_with_map(
        &self,
        show: &Show,
        seed: &SpeakerMap,
    ) -> Result<ScoreReport, ScoringError> {
        self.score_joint(&[show], seed)
    }

    /// Scores several shows jointly: speaker labels share one namespace
    /// across shows and a single alignment is optimized over the pooled
    /// durations.
    pub fn score_cross(&self, shows: &[Show]) -> Result<ScoreReport, ScoringError> {
        self.score_cross_with_map(shows, &SpeakerMap::new())
    }

    pub fn score_cross_with_map(
        &self,
        shows: &[Show],
        seed: &SpeakerMap,
    ) -> Result<ScoreReport, ScoringError> {
        let refs: Vec<&Show> = shows.iter().collect();
        self.score_joint(&refs, seed)
    }

    /// Opens a lifelong session seeded from the session store. Each call
    /// to [`IncrementalSession::score_show`] threads the grown speaker
    /// map into the next and persists it back.
    pub fn incremental_session(&self) -> Result<IncrementalSession<'_>, ScoringError> {
        let map = self.store.load()?;
        Ok(IncrementalSession::new(self, map))
    }

    pub(crate) fn persist_map(&self, map: &SpeakerMap) -> Result<(), ScoringError> {
        self.store.persist(map)
    }

    fn score_joint(
        &self,
        shows: &[&Show],
        seed: &SpeakerMap,
    ) -> Result<ScoreReport, ScoringError> {
        if shows.is_empty() {
            return Err(ScoringError::invalid_input("no shows to score"));
        }
        for show in shows {
            show.validate()?;
            if show.hypothesis.is_empty() {
                tracing::warn!(
                    show = %show.id,
                    "hypothesis timeline is empty, all scored reference time will count as miss"
                );
            }
        }

        let ref_timelines: Vec<_> = shows.iter().map(|s| &s.reference).collect();
        let hyp_timelines: Vec<_> = shows.iter().map(|s| &s.hypothesis).collect();
        let refs = SpeakerRegistry::build(&ref_timelines);
        let hyps = SpeakerRegistry::build(&hyp_timelines);
        let ref_count = refs.count();
        let hyp_count = hyps.count();

        let fronts: Vec<ShowFronts> = shows
            .iter()
            .enumerate()
            .map(|(i, show)| self.build_fronts(i, show, &refs, &hyps))
            .collect();

        // Pooled per-speaker and per-pair durations across all shows.
        let mut ref_times = vec![0.0; ref_count];
        let mut hyp_times = vec![0.0; hyp_count];
        let mut miss_hyp = vec![0.0; hyp_count];
        let mut pair = vec![PairTimes::default(); ref_count * hyp_count];
        for (i, sf) in fronts.iter().enumerate() {
            let rlocal = refs.local(i);
            let hlocal = hyps.local(i);
            // Every global pair is charged in every show. A speaker absent
            // from the show stands in as an empty frontier: an absent
            // hypothesis speaker leaves the reference's activity as
            // miss/confusion, an absent reference speaker turns the
            // hypothesis speaker's activity into false alarm.
            for rg in 0..ref_count {
                let combined = match rlocal.by_global.get(&rg) {
                    Some(&rl) => {
                        ref_times[rg] += active_time(&sf.ref_fronts[rl]);
                        merge(
                            &sf.merged,
                            &sf.ref_collars[rl],
                            (Mark::Gap, Mark::Gap),
                            Mark::Gap,
                        )
                    }
                    None => Vec::new(),
                };
                for hg in 0..hyp_count {
                    let front = hlocal
                        .by_global
                        .get(&hg)
                        .map_or(&[][..], |&hl| sf.hyp_fronts[hl].as_slice());
                    if combined.is_empty() && front.is_empty() {
                        continue;
                    }
                    let times = compute_times(&combined, front);
                    pair[rg * hyp_count + hg].add(&times);
                }
            }
            for (hl, &hg) in hlocal.global_ids.iter().enumerate() {
                hyp_times[hg] += active_time(&sf.hyp_fronts[hl]);
                miss_hyp[hg] += compute_miss(&sf.ref_union, &sf.hyp_fronts[hl]);
            }
        }

        let total_time = round_ms(ref_times.iter().sum());
        if total_time <= 0.0 {
            let ids: Vec<&str> = shows.iter().map(|s| s.id.as_str()).collect();
            return Err(ScoringError::degenerate_show(ids.join(", ")));
        }

        // Credit matrix driving the alignment. A cell is the time the pair
        // explains beyond what scoring them apart would.
        let mut de = Matrix::zeros(ref_count, hyp_count);
        let mut correct = Matrix::zeros(ref_count, hyp_count);
        for rg in 0..ref_count {
            for hg in 0..hyp_count {
                let times = pair[rg * hyp_count + hg].rounded();
                de.set(
                    rg,
                    hg,
                    ref_times[rg] + miss_hyp[hg] - times.fa - times.miss - times.confusion,
                );
                correct.set(rg, hg, times.correct);
            }
        }

        let problem = AlignmentProblem::build(seed, &refs, &hyps, &de);
        let assignment = if problem.costs().is_empty() {
            Vec::new()
        } else {
            self.solver.solve(problem.costs())?
        };
        let outcome = problem.resolve(&assignment, &de, &correct, &refs, &hyps, seed)?;

        // Official totals from the global confusion sweep, one per show.
        // A reference speaker gets its collar frontier only where its
        // mapped hypothesis speaker actually appears.
        let mut totals = ConfusionTotals::new(ref_count, hyp_count);
        for (i, sf) in fronts.iter().enumerate() {
            let rlocal = refs.local(i);
            let hlocal = hyps.local(i);
            let mut ref_sel: Vec<Option<&[Event<Mark>]>> = vec![None; ref_count];
            for (rl, &rg) in rlocal.global_ids.iter().enumerate() {
                let forgiven = outcome.map_rh[rg]
                    .map_or(false, |hg| hlocal.by_global.contains_key(&hg));
                ref_sel[rg] = Some(if forgiven {
                    &sf.ref_collars[rl]
                } else {
                    &sf.ref_fronts[rl]
                });
            }
            let mut hyp_sel: Vec<Option<&[Event<Mark>]>> = vec![None; hyp_count];
            for (hl, &hg) in hlocal.global_ids.iter().enumerate() {
                hyp_sel[hg] = Some(&sf.hyp_fronts[hl]);
            }
            accumulate_confusion(&ref_sel, &hyp_sel, &outcome.map_rh, &mut totals);
        }

        let fa = round_ms(totals.lost_hyp.iter().sum());
        let miss = round_ms(totals.lost_ref.iter().sum());
        let conf = round_ms(totals.matrix.total());
        let der = 100.0 * (fa + miss + conf) / total_time;
        tracing::debug!(
            total_time,
            fa,
            miss,
            conf,
            der,
            "scoring: pooled error totals"
        );

        let jer_speakers = jer_per_speaker(&refs, &outcome.map_rh, &totals, &hyp_times);
        let jer = if jer_speakers.is_empty() {
            0.0
        } else {
            100.0 * jer_speakers.iter().map(|(_, j)| j).sum::<f64>() / jer_speakers.len() as f64
        };
        let (purity, coverage) = purity_coverage(&de);

        Ok(ScoreReport {
            der,
            fa_rate: 100.0 * fa / total_time,
            miss_rate: 100.0 * miss / total_time,
            conf_rate: 100.0 * conf / total_time,
            total_time,
            jer,
            jer_per_speaker: jer_speakers,
            purity,
            coverage,
            speaker_map: outcome.updated,
            pairings: outcome.pairings,
        })
    }

    fn build_fronts(
        &self,
        show_idx: usize,
        show: &Show,
        refs: &SpeakerRegistry,
        hyps: &SpeakerRegistry,
    ) -> ShowFronts {
        let mask = &show.mask;
        let ref_fronts: Vec<_> = refs
            .ranges(show_idx, &show.reference)
            .into_iter()
            .map(|ranges| apply_mask(&from_ranges(ranges), mask))
            .collect();
        // The collar expands masked activity, so it is masked again.
        let ref_collars: Vec<_> = ref_fronts
            .iter()
            .map(|front| apply_mask(&add_collar(front, self.collar_seconds), mask))
            .collect();
        let hyp_fronts: Vec<_> = hyps
            .ranges(show_idx, &show.hypothesis)
            .into_iter()
            .map(|ranges| apply_mask(&from_ranges(ranges), mask))
            .collect();

        let ref_union = apply_mask(
            &from_ranges(
                show.reference
                    .segments
                    .iter()
                    .map(|s| (s.start, s.end))
                    .collect(),
            ),
            mask,
        );
        let hyp_union = apply_mask(
            &from_ranges(
                show.hypothesis
                    .segments
                    .iter()
                    .map(|s| (s.start, s.end))
                    .collect(),
            ),
            mask,
        );
        let merged = merge(&hyp_union, &ref_union, Mark::Gap, Mark::Gap);

        ShowFronts {
            ref_fronts,
            ref_collars,
            hyp_fronts,
            ref_union,
            merged,
        }
    }
}
