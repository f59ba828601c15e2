// Event enrichment dispatcher
//
// One raw payload in, at most one enriched record out. Participant names are
// resolved concurrently; reference misses degrade to None.

use backend_domain::{
    zone_definition_id, DeathRecord, EnrichedEvent, EventKind, ExperienceRecord, FacilityAction,
    FacilityControlRecord, IngestFilter, IngestSummary, ItemUnlockRecord, RawEvent, RawFacility,
    RawSession, ReferenceData, SessionAction, SessionChangeRecord, SkillUnlockRecord,
    VehicleDestroyRecord, NO_ATTACKER_ID,
};
use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{AppState, CharacterNameResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Persisted(EventKind),
    Filtered,
    Ignored,
    Failed(EventKind),
}

/// Malformed payloads decode to `None`.
pub fn decode_raw_event(value: Value) -> Option<RawEvent> {
    match serde_json::from_value::<RawEvent>(value) {
        Ok(event) => Some(event),
        Err(err) => {
            debug!("undecodable payload: {}", err);
            None
        }
    }
}

/// Tutorial/system kills and practice zones never produce a record.
pub fn is_filtered(raw: &RawEvent, filter: &IngestFilter) -> bool {
    if raw.attacker_id().map(str::trim) == Some(NO_ATTACKER_ID) {
        return true;
    }
    raw.zone_id()
        .and_then(zone_definition_id)
        .map(|zone| filter.non_scoring_zone_ids.contains(&zone))
        .unwrap_or(false)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub async fn enrich_event(
    resolver: &CharacterNameResolver,
    reference: &ReferenceData,
    raw: RawEvent,
) -> Option<EnrichedEvent> {
    let event = match raw {
        RawEvent::Death(p) => {
            let (attacker, character) = tokio::join!(
                resolver.character_ref(&p.attacker_character_id),
                resolver.character_ref(&p.character_id),
            );
            EnrichedEvent::Death(DeathRecord {
                timestamp: p.timestamp,
                attacker,
                attacker_class: reference.class_of(&p.attacker_loadout_id),
                attacker_faction: reference.loadout_faction(&p.attacker_loadout_id),
                attacker_vehicle: reference.vehicle(&p.attacker_vehicle_id),
                attacker_weapon: reference.item_name(&p.attacker_weapon_id),
                attacker_weapon_id: p.attacker_weapon_id,
                character,
                class: reference.class_of(&p.character_loadout_id),
                faction: reference.loadout_faction(&p.character_loadout_id),
                vehicle: reference.vehicle(&p.vehicle_id),
                is_headshot: p.is_headshot != 0,
                continent: reference.zone(&p.zone_id),
                server: reference.world(&p.world_id),
            })
        }
        RawEvent::VehicleDestroy(p) => {
            let (attacker, character) = tokio::join!(
                resolver.character_ref(&p.attacker_character_id),
                resolver.character_ref(&p.character_id),
            );
            EnrichedEvent::VehicleDestroy(VehicleDestroyRecord {
                timestamp: p.timestamp,
                attacker,
                attacker_class: reference.class_of(&p.attacker_loadout_id),
                attacker_faction: reference.loadout_faction(&p.attacker_loadout_id),
                attacker_vehicle: reference.vehicle(&p.attacker_vehicle_id),
                attacker_weapon: reference.item_name(&p.attacker_weapon_id),
                attacker_weapon_id: p.attacker_weapon_id,
                character,
                faction: reference.faction(&p.faction_id),
                vehicle: reference.vehicle(&p.vehicle_id),
                facility: reference.facility(&p.facility_id),
                facility_id: p.facility_id,
                continent: reference.zone(&p.zone_id),
                server: reference.world(&p.world_id),
            })
        }
        RawEvent::GainExperience(p) => {
            let (character, other) = tokio::join!(
                resolver.character_ref(&p.character_id),
                resolver.character_ref(&p.other_id),
            );
            EnrichedEvent::Experience(ExperienceRecord {
                timestamp: p.timestamp,
                character,
                class: reference.class_of(&p.loadout_id),
                faction: reference.loadout_faction(&p.loadout_id),
                other,
                description: reference.experience_description(&p.experience_id),
                experience_id: p.experience_id,
                amount: p.amount,
                continent: reference.zone(&p.zone_id),
                server: reference.world(&p.world_id),
            })
        }
        RawEvent::PlayerFacilityCapture(p) => {
            facility_record(resolver, reference, FacilityAction::Capture, p).await?
        }
        RawEvent::PlayerFacilityDefend(p) => {
            facility_record(resolver, reference, FacilityAction::Defend, p).await?
        }
        RawEvent::SkillAdded(p) => {
            let skill = reference.skill(&p.skill_id);
            EnrichedEvent::SkillUnlock(SkillUnlockRecord {
                timestamp: p.timestamp,
                character: resolver.character_ref(&p.character_id).await,
                name: skill.and_then(|s| s.name.clone()),
                skill_line: skill.and_then(|s| s.skill_line.clone()),
                skill_points: skill.and_then(|s| s.skill_points.clone()),
                grant_item_id: skill.and_then(|s| s.grant_item_id.clone()),
                skill_id: p.skill_id,
                continent: reference.zone(&p.zone_id),
                server: reference.world(&p.world_id),
            })
        }
        RawEvent::ItemAdded(p) => {
            let item = reference.item(&p.item_id);
            EnrichedEvent::ItemUnlock(ItemUnlockRecord {
                timestamp: p.timestamp,
                character: resolver.character_ref(&p.character_id).await,
                name: item.and_then(|i| i.name.clone()),
                item_type: item.and_then(|i| i.item_type.clone()),
                category: item.and_then(|i| i.category.clone()),
                skill_set: item.and_then(|i| i.skill_set.clone()),
                item_id: p.item_id,
                item_count: p.item_count,
                context: non_empty(&p.context),
                continent: reference.zone(&p.zone_id),
                server: reference.world(&p.world_id),
            })
        }
        RawEvent::PlayerLogin(p) => session_record(resolver, reference, SessionAction::Login, p).await?,
        RawEvent::PlayerLogout(p) => {
            session_record(resolver, reference, SessionAction::Logout, p).await?
        }
        RawEvent::Unknown => return None,
    };
    Some(event)
}

async fn facility_record(
    resolver: &CharacterNameResolver,
    reference: &ReferenceData,
    action: FacilityAction,
    p: RawFacility,
) -> Option<EnrichedEvent> {
    if p.character_id.is_empty() {
        debug!(facility_id = %p.facility_id, "facility event without character");
        return None;
    }
    Some(EnrichedEvent::FacilityControl(FacilityControlRecord {
        timestamp: p.timestamp,
        character: resolver.character_ref(&p.character_id).await,
        action,
        facility: reference.facility(&p.facility_id),
        facility_id: p.facility_id,
        continent: reference.zone(&p.zone_id),
        server: reference.world(&p.world_id),
    }))
}

async fn session_record(
    resolver: &CharacterNameResolver,
    reference: &ReferenceData,
    action: SessionAction,
    p: RawSession,
) -> Option<EnrichedEvent> {
    if p.character_id.is_empty() {
        return None;
    }
    Some(EnrichedEvent::SessionChange(SessionChangeRecord {
        timestamp: p.timestamp,
        character: resolver.character_ref(&p.character_id).await,
        action,
        server: reference.world(&p.world_id),
    }))
}

/// Filters, enriches and appends one payload. A failed write drops only this event.
pub async fn dispatch_event(state: &AppState, raw: RawEvent) -> DispatchOutcome {
    state.metrics.record_received();
    if is_filtered(&raw, &state.config.ingest) {
        state.metrics.record_filtered();
        debug!(event_name = raw.event_name(), "filtered event");
        return DispatchOutcome::Filtered;
    }

    let event_name = raw.event_name();
    let Some(event) = enrich_event(&state.resolver, &state.reference, raw).await else {
        state.metrics.record_ignored();
        debug!(event_name, "ignored event");
        return DispatchOutcome::Ignored;
    };

    let kind = event.kind();
    match state.event_repo.append(&event).await {
        Ok(()) => {
            state.metrics.record_persisted();
            DispatchOutcome::Persisted(kind)
        }
        Err(err) => {
            state.metrics.record_persist_error();
            warn!(
                kind = kind.as_str(),
                timestamp = event.timestamp(),
                "failed to persist event: {}",
                err
            );
            DispatchOutcome::Failed(kind)
        }
    }
}

/// Dispatches a batch of raw JSON payloads concurrently.
pub async fn ingest_payloads(state: &AppState, payloads: Vec<Value>) -> IngestSummary {
    let mut summary = IngestSummary {
        received: payloads.len(),
        ..IngestSummary::default()
    };
    let mut pending = Vec::with_capacity(payloads.len());
    for value in payloads {
        match decode_raw_event(value) {
            Some(raw) => pending.push(dispatch_event(state, raw)),
            None => {
                state.metrics.record_received();
                state.metrics.record_ignored();
                summary.ignored += 1;
            }
        }
    }
    for outcome in join_all(pending).await {
        match outcome {
            DispatchOutcome::Persisted(_) => summary.persisted += 1,
            DispatchOutcome::Filtered => summary.filtered += 1,
            DispatchOutcome::Ignored => summary.ignored += 1,
            DispatchOutcome::Failed(_) => summary.failed += 1,
        }
    }
    summary
}
