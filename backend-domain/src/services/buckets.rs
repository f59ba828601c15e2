use std::collections::BTreeMap;

use crate::entities::{NamedSeries, SeriesPoint, Timeline};

pub fn bucket_of(timestamp: i64, interval: i64) -> i64 {
    timestamp - timestamp.rem_euclid(interval)
}

/// Per-label delta accumulator over the buckets of a closed window.
/// Labels keep their insertion order in the output.
#[derive(Debug, Clone)]
pub struct BucketSeries {
    interval: i64,
    end: i64,
    template: BTreeMap<i64, i64>,
    labels: Vec<String>,
    deltas: Vec<BTreeMap<i64, i64>>,
}

impl BucketSeries {
    pub fn new(start: i64, end: i64, interval: i64) -> Self {
        let interval = interval.max(1);
        let mut template = BTreeMap::new();
        let mut bucket = bucket_of(start, interval);
        let last = bucket_of(end, interval);
        while bucket <= last {
            template.insert(bucket, 0);
            match bucket.checked_add(interval) {
                Some(next) => bucket = next,
                None => break,
            }
        }
        Self {
            interval,
            end,
            template,
            labels: Vec::new(),
            deltas: Vec::new(),
        }
    }

    pub fn interval(&self) -> i64 {
        self.interval
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn bucket(&self, timestamp: i64) -> i64 {
        bucket_of(timestamp, self.interval)
    }

    /// Registers a label so it is reported even without deltas.
    pub fn ensure_label(&mut self, label: &str) -> usize {
        if let Some(idx) = self.labels.iter().position(|existing| existing == label) {
            return idx;
        }
        self.labels.push(label.to_string());
        self.deltas.push(self.template.clone());
        self.labels.len() - 1
    }

    /// Adds `delta` at `bucket`. Buckets outside the window are ignored.
    pub fn add(&mut self, label: &str, bucket: i64, delta: i64) {
        let idx = self.ensure_label(label);
        if let Some(value) = self.deltas[idx].get_mut(&bucket) {
            *value += delta;
        }
    }

    /// Running sum per label: the carried-forward state at every bucket.
    pub fn into_cumulative(self) -> Timeline {
        self.finish(true)
    }

    /// Raw per-bucket counts.
    pub fn into_counts(self) -> Timeline {
        self.finish(false)
    }

    fn finish(self, cumulative: bool) -> Timeline {
        let series = self
            .labels
            .into_iter()
            .zip(self.deltas)
            .map(|(label, buckets)| {
                let mut running = 0;
                let data = buckets
                    .into_iter()
                    .map(|(bucket, delta)| {
                        running = if cumulative { running + delta } else { delta };
                        SeriesPoint {
                            x: bucket * 1000,
                            y: running,
                        }
                    })
                    .collect();
                NamedSeries { label, data }
            })
            .collect();
        Timeline {
            interval_seconds: self.interval,
            series,
        }
    }
}
