use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::IngestSummary;

#[derive(Debug, Default)]
pub struct Metrics {
    events_received: AtomicU64,
    events_persisted: AtomicU64,
    events_filtered: AtomicU64,
    events_ignored: AtomicU64,
    persist_errors: AtomicU64,
    name_lookups: AtomicU64,
    name_lookup_failures: AtomicU64,
    name_cache_hits: AtomicU64,
    reports_generated: AtomicU64,
    report_errors: AtomicU64,
}

impl Metrics {
    pub fn record_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persisted(&self) {
        self.events_persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filtered(&self) {
        self.events_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.events_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_error(&self) {
        self.persist_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_name_lookup(&self, found: bool) {
        self.name_lookups.fetch_add(1, Ordering::Relaxed);
        if !found {
            self.name_lookup_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cache_hit(&self) {
        self.name_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report(&self, ok: bool) {
        if ok {
            self.reports_generated.fetch_add(1, Ordering::Relaxed);
        } else {
            self.report_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn name_lookups(&self) -> u64 {
        self.name_lookups.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> IngestSummary {
        IngestSummary {
            received: self.events_received.load(Ordering::Relaxed) as usize,
            persisted: self.events_persisted.load(Ordering::Relaxed) as usize,
            filtered: self.events_filtered.load(Ordering::Relaxed) as usize,
            ignored: self.events_ignored.load(Ordering::Relaxed) as usize,
            failed: self.persist_errors.load(Ordering::Relaxed) as usize,
        }
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("warlog_events_received_total", &self.events_received),
            ("warlog_events_persisted_total", &self.events_persisted),
            ("warlog_events_filtered_total", &self.events_filtered),
            ("warlog_events_ignored_total", &self.events_ignored),
            ("warlog_persist_errors_total", &self.persist_errors),
            ("warlog_name_lookups_total", &self.name_lookups),
            ("warlog_name_lookup_failures_total", &self.name_lookup_failures),
            ("warlog_name_cache_hits_total", &self.name_cache_hits),
            ("warlog_reports_generated_total", &self.reports_generated),
            ("warlog_report_errors_total", &self.report_errors),
        ];
        let mut out = String::new();
        for (name, counter) in counters {
            out.push_str(&format!(
                "# TYPE {} counter\n{} {}\n",
                name,
                name,
                counter.load(Ordering::Relaxed)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_output_lists_every_counter() {
        let metrics = Metrics::default();
        metrics.record_received();
        metrics.record_received();
        metrics.record_persist_error();
        metrics.record_name_lookup(false);
        let text = metrics.render_prometheus();
        assert!(text.contains("warlog_events_received_total 2\n"));
        assert!(text.contains("warlog_persist_errors_total 1\n"));
        assert!(text.contains("warlog_name_lookup_failures_total 1\n"));
        assert_eq!(text.matches("# TYPE").count(), 10);
        assert_eq!(metrics.snapshot().failed, 1);
    }
}
