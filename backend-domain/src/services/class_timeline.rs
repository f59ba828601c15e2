// Class timeline: how many scoped characters play each class per bucket

use std::collections::HashMap;

use super::buckets::BucketSeries;
use crate::entities::{EnrichedEvent, ReconstructionConfig, ReportScope, SessionAction, Timeline};

pub const KNOWN_CLASSES: [&str; 7] = [
    "Light Assault",
    "Heavy Assault",
    "Combat Medic",
    "Engineer",
    "Infiltrator",
    "MAX",
    "Defector",
];

enum ClassSignal<'a> {
    Playing(&'a str),
    LoggedOut,
}

/// Experience events carry the subject's class; logouts end it. Events must be
/// ordered by timestamp.
pub fn class_timeline(
    events: &[EnrichedEvent],
    scope: &ReportScope,
    start: i64,
    end: i64,
    config: &ReconstructionConfig,
) -> Timeline {
    let mut series = BucketSeries::new(start, end, config.interval_seconds);
    for class in KNOWN_CLASSES {
        series.ensure_label(class);
    }

    let mut current: HashMap<&str, &str> = HashMap::new();
    for event in events {
        let timestamp = event.timestamp();
        if timestamp < start || timestamp > end || !scope.includes(event.subject()) {
            continue;
        }
        let signal = match event {
            EnrichedEvent::Experience(record) => match record.class.as_deref() {
                Some(class) => ClassSignal::Playing(class),
                None => continue,
            },
            EnrichedEvent::SessionChange(record) if record.action == SessionAction::Logout => {
                ClassSignal::LoggedOut
            }
            _ => continue,
        };

        let character = event.subject().id.as_str();
        let bucket = series.bucket(timestamp);
        match signal {
            ClassSignal::Playing(class) => {
                let previous = current.insert(character, class);
                if previous == Some(class) {
                    continue;
                }
                if let Some(previous) = previous {
                    series.add(previous, bucket, -1);
                }
                series.add(class, bucket, 1);
            }
            ClassSignal::LoggedOut => {
                if let Some(previous) = current.remove(character) {
                    series.add(previous, bucket, -1);
                }
            }
        }
    }
    series.into_cumulative()
}
