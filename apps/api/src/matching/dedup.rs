//! Duplicate Resolver — collapses candidate records describing the same
//! person (same resume re-matched, or a stale saved copy alongside the
//! canonical one) into a single record per `(job_id, filename)`.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::candidate::CandidateRecord;

#[derive(Debug)]
pub struct DedupOutcome {
    pub unique: Vec<CandidateRecord>,
    pub removed_count: usize,
}

/// Deduplicates by `(job_id, filename)`, exact and case-sensitive. Pure: no
/// persistence access, and the surviving set is deterministic for a given
/// input multiset. Survivors keep first-seen order.
pub fn dedupe(candidates: Vec<CandidateRecord>) -> DedupOutcome {
    let total = candidates.len();
    let mut unique: Vec<CandidateRecord> = Vec::with_capacity(total);
    let mut seen: HashMap<(Uuid, String), usize> = HashMap::new();

    for record in candidates {
        let key = (record.job_id, record.filename.clone());
        match seen.get(&key) {
            Some(&slot) => {
                if prefer(&record, &unique[slot]) {
                    unique[slot] = record;
                }
            }
            None => {
                seen.insert(key, unique.len());
                unique.push(record);
            }
        }
    }

    let removed_count = total - unique.len();
    DedupOutcome {
        unique,
        removed_count,
    }
}

/// True if `challenger` should replace `incumbent` among duplicates.
/// A record with tracking beats one without, since dropping pipeline history
/// is the worse error. Then the later analysis wins; an exact tie keeps the
/// incumbent (first seen in input order).
fn prefer(challenger: &CandidateRecord, incumbent: &CandidateRecord) -> bool {
    let challenger_tracked = challenger.tracking.is_some();
    if challenger_tracked != incumbent.tracking.is_some() {
        return challenger_tracked;
    }
    challenger.updated_at > incumbent.updated_at
}
