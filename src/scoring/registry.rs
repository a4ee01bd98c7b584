use std::collections::HashMap;

use crate::types::Timeline;

/// Assigns global speaker ids across all shows of one scoring call, in
/// first-occurrence order, and remembers each show's local view: which
/// globals appear there and under which local index.
#[derive(Debug)]
pub(crate) struct SpeakerRegistry {
    labels: Vec<String>,
    index: HashMap<String, usize>,
    locals: Vec<ShowLocal>,
}

#[derive(Debug, Default)]
pub(crate) struct ShowLocal {
    /// Local index -> global id.
    pub global_ids: Vec<usize>,
    /// Global id -> local index, for speakers present in this show.
    pub by_global: HashMap<usize, usize>,
}

impl SpeakerRegistry {
    pub fn build(timelines: &[&Timeline]) -> Self {
        let mut labels = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut locals = Vec::with_capacity(timelines.len());
        for timeline in timelines {
            let mut local = ShowLocal::default();
            for segment in &timeline.segments {
                let gid = match index.get(&segment.speaker) {
                    Some(&gid) => gid,
                    None => {
                        let gid = labels.len();
                        labels.push(segment.speaker.clone());
                        index.insert(segment.speaker.clone(), gid);
                        gid
                    }
                };
                if !local.by_global.contains_key(&gid) {
                    local.by_global.insert(gid, local.global_ids.len());
                    local.global_ids.push(gid);
                }
            }
            locals.push(local);
        }
        Self {
            labels,
            index,
            locals,
        }
    }

    pub fn count(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, gid: usize) -> &str {
        &self.labels[gid]
    }

    pub fn global_id(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn local(&self, show_idx: usize) -> &ShowLocal {
        &self.locals[show_idx]
    }

    /// Groups a show's segments into per-local-speaker `(start, end)`
    /// range lists, in local index order.
    pub fn ranges(&self, show_idx: usize, timeline: &Timeline) -> Vec<Vec<(f64, f64)>> {
        let local = self.local(show_idx);
        let mut ranges = vec![Vec::new(); local.global_ids.len()];
        for segment in &timeline.segments {
            let Some(gid) = self.global_id(&segment.speaker) else {
                continue;
            };
            let Some(&lid) = local.by_global.get(&gid) else {
                continue;
            };
            ranges[lid].push((segment.start, segment.end));
        }
        ranges
    }
}
