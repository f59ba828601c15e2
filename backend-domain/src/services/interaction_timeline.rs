// Interaction timeline: kills per combat-role pairing per bucket

use std::collections::HashMap;

use super::buckets::BucketSeries;
use crate::entities::{EnrichedEvent, ReconstructionConfig, ReportScope, Timeline};
use crate::value_objects::InteractionKind;

#[derive(Debug, Clone, Copy)]
struct Recorded {
    timestamp: i64,
    kind: InteractionKind,
}

#[derive(Debug, Default)]
struct VictimState {
    death: Option<Recorded>,
    vehicle_destroy: Option<Recorded>,
}

/// A death and a vehicle loss of the same victim within the correlation
/// tolerance are one kill: the increment recorded first is taken back.
/// Counts are per bucket, not cumulative. Events must be ordered by timestamp.
pub fn interaction_timeline(
    events: &[EnrichedEvent],
    scope: &ReportScope,
    start: i64,
    end: i64,
    config: &ReconstructionConfig,
) -> Timeline {
    let mut series = BucketSeries::new(start, end, config.interval_seconds);
    for kind in InteractionKind::ALL {
        series.ensure_label(&kind.label());
    }

    let mut victims: HashMap<&str, VictimState> = HashMap::new();
    for event in events {
        let (victim, attacker, kind, is_death) = match event {
            EnrichedEvent::Death(record) => (
                &record.character,
                &record.attacker,
                InteractionKind::from_vehicles(
                    record.attacker_vehicle.as_deref(),
                    record.vehicle.as_deref(),
                ),
                true,
            ),
            EnrichedEvent::VehicleDestroy(record) => (
                &record.character,
                &record.attacker,
                InteractionKind::from_vehicles(
                    record.attacker_vehicle.as_deref(),
                    record.vehicle.as_deref(),
                ),
                false,
            ),
            _ => continue,
        };
        let timestamp = event.timestamp();
        if timestamp < start || timestamp > end {
            continue;
        }
        if !scope.includes(victim) && !scope.includes(attacker) {
            continue;
        }

        let current = Recorded { timestamp, kind };
        let state = victims.entry(victim.id.as_str()).or_default();
        let earlier = if is_death {
            state.death = Some(current);
            state.vehicle_destroy
        } else {
            state.vehicle_destroy = Some(current);
            state.death
        };
        if let Some(earlier) = earlier {
            if (timestamp - earlier.timestamp).abs() < config.kill_correlation_tolerance_seconds {
                series.add(&earlier.kind.label(), series.bucket(earlier.timestamp), -1);
                *state = VictimState::default();
            }
        }
        series.add(&kind.label(), series.bucket(timestamp), 1);
    }
    series.into_counts()
}
