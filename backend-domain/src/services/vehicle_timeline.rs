// Vehicle timeline: active vehicle instances per family per bucket

use std::collections::HashMap;

use super::buckets::BucketSeries;
use crate::entities::{EnrichedEvent, ReconstructionConfig, ReferenceData, ReportScope, Timeline};
use crate::value_objects::{is_actor_id, vehicle_family, VehicleStatus};

#[derive(Debug)]
enum InstanceState {
    Active { family: String, last_active: i64 },
    Destroyed,
}

/// Vehicle instances are the non-player `other` ids of experience events whose
/// experience type maps to a vehicle activity. Events must be ordered by timestamp.
pub fn vehicle_timeline(
    events: &[EnrichedEvent],
    scope: &ReportScope,
    start: i64,
    end: i64,
    reference: &ReferenceData,
    config: &ReconstructionConfig,
) -> Timeline {
    let mut series = BucketSeries::new(start, end, config.interval_seconds);
    for family in reference.tracked_vehicles() {
        series.ensure_label(&family);
    }
    let interval = series.interval();
    let decay = config.vehicle_decay_intervals * interval;

    let mut instances: HashMap<&str, InstanceState> = HashMap::new();
    for event in events {
        let EnrichedEvent::Experience(record) = event else {
            continue;
        };
        if record.timestamp < start
            || record.timestamp > end
            || !is_actor_id(&record.other.id)
            || !scope.includes(&record.character)
        {
            continue;
        }
        let Some(activity) = reference.vehicle_activity(&record.experience_id) else {
            continue;
        };
        let bucket = series.bucket(record.timestamp);
        let family = vehicle_family(&activity.vehicle).to_string();

        let state = instances.entry(record.other.id.as_str()).or_insert_with(|| {
            series.add(&family, bucket, 1);
            InstanceState::Active {
                family: family.clone(),
                last_active: bucket,
            }
        });
        let InstanceState::Active {
            family: active_family,
            last_active,
        } = state
        else {
            continue;
        };

        // silent long enough to have decayed: close the old stint, open a new one
        if *last_active + decay <= bucket {
            series.add(active_family, *last_active + decay, -1);
            series.add(&family, bucket, 1);
            *active_family = family.clone();
        }
        *last_active = bucket;

        if activity.status == VehicleStatus::Destroyed {
            let gone_at = bucket + interval;
            if gone_at <= end {
                series.add(active_family, gone_at, -1);
            }
            *state = InstanceState::Destroyed;
        }
    }

    for state in instances.values() {
        if let InstanceState::Active {
            family,
            last_active,
        } = state
        {
            let inactive_at = last_active + decay;
            if inactive_at <= end {
                series.add(family, inactive_at, -1);
            }
        }
    }
    series.into_cumulative()
}
