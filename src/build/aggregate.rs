//! Cross-unit aggregation.
//!
//! Every grouped unit exports a snapshot of its metadata into a shared
//! bucket map keyed by group name. The map is the only concurrently-mutated
//! state in the pipeline; after the absorption barrier it is finalized
//! (dates parsed, buckets sorted) and frozen for the render stage.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::config::DATE_FORMAT;
use crate::util::title_case;

use super::unit::ContentUnit;

#[derive(thiserror::Error, Debug)]
pub enum AggregateError {
    #[error("invalid date provided to resource: {0}")]
    DateParse(PathBuf),
}

/// One unit's exported metadata, as seen by every render.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Source path, carried for diagnostics only. Never rendered.
    pub source: PathBuf,
    /// Raw date string from the front matter.
    pub date: Option<String>,
    /// Parsed date, filled during finalization.
    pub parsed: Option<NaiveDate>,
    /// The fields handed to templates: `Content`, `Date`, `Link`, and every
    /// front matter key under its Title-cased name.
    pub entry: Map<String, Value>,
}

/// Frozen mapping from Title-cased group name to its ordered members.
pub type Groups = BTreeMap<String, Vec<Snapshot>>;

/// Thread-safe accumulator for group snapshots.
#[derive(Debug, Default)]
pub struct Aggregator {
    buckets: Mutex<Groups>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit's snapshot to its group bucket.
    ///
    /// No-op for ungrouped units. Append-only by design: absorbing the same
    /// unit twice produces duplicate entries, and the pipeline guarantees
    /// each unit is absorbed exactly once per build.
    pub fn absorb(&self, unit: &ContentUnit) {
        let Some(group) = unit.group.as_deref() else {
            return;
        };

        let mut entry = Map::new();
        entry.insert(
            "Content".to_string(),
            Value::String(unit.transformed.clone()),
        );
        entry.insert(
            "Date".to_string(),
            Value::String(unit.date.clone().unwrap_or_default()),
        );
        entry.insert("Link".to_string(), Value::String(unit.link.clone()));

        for (key, value) in &unit.fields {
            entry.insert(title_case(key), value.to_json());
        }

        let snapshot = Snapshot {
            source: unit.source.clone(),
            date: unit.date.clone(),
            parsed: None,
            entry,
        };

        let mut buckets = self.buckets.lock();
        buckets.entry(title_case(group)).or_default().push(snapshot);
    }

    /// Parse dates and sort every bucket, returning the frozen map.
    ///
    /// Runs single-threaded after the absorption barrier. A non-empty date
    /// string that does not match the fixed layout fails the build, naming
    /// the offending unit.
    pub fn finalize(&self) -> Result<Groups, AggregateError> {
        let mut buckets = std::mem::take(&mut *self.buckets.lock());

        for snapshots in buckets.values_mut() {
            for snapshot in snapshots.iter_mut() {
                let Some(date) = snapshot.date.as_deref().filter(|d| !d.is_empty()) else {
                    continue;
                };

                let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT)
                    .map_err(|_| AggregateError::DateParse(snapshot.source.clone()))?;
                snapshot.parsed = Some(parsed);
            }

            sort_bucket(snapshots);
        }

        Ok(buckets)
    }
}

/// Sort a bucket descending by date, stable on discovery order.
///
/// Dateless members keep the positions discovery gave them; dated members
/// are reordered among the dated slots only.
fn sort_bucket(snapshots: &mut [Snapshot]) {
    let slots: Vec<usize> = snapshots
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.parsed.map(|_| i))
        .collect();

    let mut dated: Vec<Snapshot> = slots.iter().map(|&i| snapshots[i].clone()).collect();
    dated.sort_by_key(|s| std::cmp::Reverse(s.parsed));

    for (slot, snapshot) in slots.into_iter().zip(dated) {
        snapshots[slot] = snapshot;
    }
}

/// Flatten the frozen groups into the global render context.
pub fn context(groups: &Groups) -> Map<String, Value> {
    let mut global = Map::new();

    for (name, snapshots) in groups {
        let members: Vec<Value> = snapshots
            .iter()
            .map(|s| Value::Object(s.entry.clone()))
            .collect();

        global.insert(name.clone(), Value::Array(members));
    }

    global
}
