// Interaction graph: who supported whom, clustered by squad play

use std::collections::{BTreeMap, HashMap};

use super::community::detect_communities;
use super::graph_coloring::{color_communities, mark_cross_community_edges, SQUAD_EDGE_COLOR};
use crate::entities::{
    EnrichedEvent, GraphEdge, GraphNode, InteractionClass, InteractionGraph, ReconstructionConfig,
    ReportScope,
};
use crate::value_objects::is_player_id;

#[derive(Debug, Default)]
struct NodeIndex {
    nodes: Vec<GraphNode>,
    by_id: HashMap<String, usize>,
}

impl NodeIndex {
    fn upsert(&mut self, id: &str, name: Option<&str>, faction: Option<&str>) -> usize {
        let idx = match self.by_id.get(id) {
            Some(idx) => *idx,
            None => {
                self.nodes.push(GraphNode {
                    id: id.to_string(),
                    label: id.to_string(),
                    faction: None,
                    group: 0,
                    color: String::new(),
                });
                self.by_id.insert(id.to_string(), self.nodes.len() - 1);
                self.nodes.len() - 1
            }
        };
        let node = &mut self.nodes[idx];
        if let Some(name) = name {
            node.label = name.to_string();
        }
        if let Some(faction) = faction {
            node.faction = Some(faction.to_string());
        }
        idx
    }
}

/// Per (class, unordered pair): XP per experience description.
type PairTotals = BTreeMap<(InteractionClass, usize, usize), BTreeMap<String, i64>>;

/// Builds nodes and edges from experience exchanged between players. Squad
/// edges drive community detection; other edges are kept hidden.
pub fn interaction_graph(
    events: &[EnrichedEvent],
    scope: &ReportScope,
    start: i64,
    end: i64,
    config: &ReconstructionConfig,
) -> InteractionGraph {
    let mut index = NodeIndex::default();
    let mut totals: PairTotals = BTreeMap::new();

    for event in events {
        let EnrichedEvent::Experience(record) = event else {
            continue;
        };
        let subject = &record.character;
        let other = &record.other;
        if record.timestamp < start
            || record.timestamp > end
            || !is_player_id(&other.id)
            || subject.id == other.id
            || !(scope.includes(subject) || scope.includes(other))
        {
            continue;
        }
        let a = index.upsert(&subject.id, subject.name.as_deref(), record.faction.as_deref());
        let b = index.upsert(&other.id, other.name.as_deref(), None);
        let class = if config.is_squad_experience(&record.experience_id) {
            InteractionClass::Squad
        } else {
            InteractionClass::Other
        };
        let description = record
            .description
            .clone()
            .unwrap_or_else(|| format!("Experience {}", record.experience_id));
        *totals
            .entry((class, a.min(b), a.max(b)))
            .or_default()
            .entry(description)
            .or_insert(0) += record.amount;
    }

    let mut edges: Vec<GraphEdge> = totals
        .into_iter()
        .map(|((class, from, to), breakdown)| build_edge(&index.nodes, class, from, to, breakdown))
        .collect();

    let squad_links: Vec<(usize, usize, f64)> = edges
        .iter()
        .filter(|edge| edge.interaction_type == InteractionClass::Squad)
        .filter_map(|edge| {
            Some((
                *index.by_id.get(&edge.from)?,
                *index.by_id.get(&edge.to)?,
                edge.value as f64,
            ))
        })
        .collect();
    let communities = detect_communities(index.nodes.len(), &squad_links);

    let mut nodes = index.nodes;
    for (node, community) in nodes.iter_mut().zip(communities) {
        node.group = community;
    }
    color_communities(&mut nodes);
    mark_cross_community_edges(&nodes, &mut edges);

    InteractionGraph { nodes, edges }
}

fn build_edge(
    nodes: &[GraphNode],
    class: InteractionClass,
    from: usize,
    to: usize,
    breakdown: BTreeMap<String, i64>,
) -> GraphEdge {
    let mut sorted: Vec<(String, i64)> = breakdown.into_iter().collect();
    sorted.sort_by(|(left_desc, left_xp), (right_desc, right_xp)| {
        right_xp.cmp(left_xp).then_with(|| left_desc.cmp(right_desc))
    });
    let total: i64 = sorted.iter().map(|(_, xp)| xp).sum();
    let label = sorted
        .first()
        .map(|(description, _)| description.clone())
        .unwrap_or_default();

    let mut title = format!(
        "[{}] => [{}]\nTotal XP ({}): {}",
        nodes[from].label,
        nodes[to].label,
        class.as_str(),
        total
    );
    for (description, xp) in &sorted {
        title.push_str(&format!("\n- {}: {}", description, xp));
    }

    let squad = class == InteractionClass::Squad;
    GraphEdge {
        from: nodes[from].id.clone(),
        to: nodes[to].id.clone(),
        value: total,
        label,
        title,
        hidden: !squad,
        physics: squad,
        interaction_type: class,
        color: squad.then(|| SQUAD_EDGE_COLOR.to_string()),
        dashes: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CharacterRef, ExperienceRecord};

    fn who(id: &str, name: &str) -> CharacterRef {
        CharacterRef {
            id: id.into(),
            name: Some(name.into()),
            team_id: None,
        }
    }

    fn xp(ts: i64, from: (&str, &str), to: (&str, &str), exp: &str, desc: &str, amount: i64) -> EnrichedEvent {
        EnrichedEvent::Experience(ExperienceRecord {
            timestamp: ts,
            character: who(from.0, from.1),
            class: Some("Combat Medic".into()),
            faction: Some("VS".into()),
            other: who(to.0, to.1),
            experience_id: exp.into(),
            description: Some(desc.into()),
            amount,
            continent: None,
            server: None,
        })
    }

    const ALICE: (&str, &str) = ("11", "Alice");
    const BOB: (&str, &str) = ("13", "Bob");
    const CAROL: (&str, &str) = ("15", "Carol");

    fn scope() -> ReportScope {
        ReportScope::characters(["alice", "bob", "carol"])
    }

    #[test]
    fn repeated_squad_heals_aggregate_into_one_edge() {
        let events = vec![
            xp(0, ALICE, BOB, "51", "Squad Heal", 50),
            xp(10, ALICE, BOB, "51", "Squad Heal", 75),
        ];
        let graph = interaction_graph(&events, &scope(), 0, 60, &ReconstructionConfig::default());
        assert_eq!(graph.edges.len(), 1);
        let edge = &graph.edges[0];
        assert_eq!(edge.value, 125);
        assert_eq!(edge.label, "Squad Heal");
        assert_eq!(edge.title, "[Alice] => [Bob]\nTotal XP (squad): 125\n- Squad Heal: 125");
        assert!(edge.physics && !edge.hidden);
        assert_eq!(edge.color.as_deref(), Some(SQUAD_EDGE_COLOR));
        assert!(!edge.dashes);
    }

    #[test]
    fn both_directions_share_an_edge_and_label_is_top_xp() {
        let events = vec![
            xp(0, ALICE, BOB, "51", "Squad Heal", 40),
            xp(5, BOB, ALICE, "53", "Squad Revive", 100),
        ];
        let graph = interaction_graph(&events, &scope(), 0, 60, &ReconstructionConfig::default());
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].value, 140);
        assert_eq!(graph.edges[0].label, "Squad Revive");
        assert!(graph.edges[0].title.ends_with("- Squad Revive: 100\n- Squad Heal: 40"));
    }

    #[test]
    fn other_xp_never_joins_the_squad_graph() {
        let events = vec![
            xp(0, ALICE, BOB, "51", "Squad Heal", 50),
            xp(0, BOB, CAROL, "4", "Heal Player", 500),
        ];
        let graph = interaction_graph(&events, &scope(), 0, 60, &ReconstructionConfig::default());
        let other = graph
            .edges
            .iter()
            .find(|edge| edge.interaction_type == InteractionClass::Other)
            .unwrap();
        assert!(other.hidden && !other.physics && other.color.is_none());
        assert!(other.dashes);
        assert_ne!(graph.node("13").unwrap().group, graph.node("15").unwrap().group);
        assert_eq!(graph.node("11").unwrap().group, graph.node("13").unwrap().group);
    }

    #[test]
    fn self_and_npc_interactions_are_skipped() {
        let events = vec![
            xp(0, ALICE, ALICE, "51", "Squad Heal", 50),
            xp(0, ALICE, ("12", "Turret"), "51", "Squad Heal", 50),
            xp(0, ALICE, ("0", "Nobody"), "51", "Squad Heal", 50),
        ];
        let graph = interaction_graph(&events, &scope(), 0, 60, &ReconstructionConfig::default());
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn nodes_are_labelled_and_colored() {
        let events = vec![xp(0, ALICE, BOB, "51", "Squad Heal", 50)];
        let graph = interaction_graph(&events, &scope(), 0, 60, &ReconstructionConfig::default());
        let alice = graph.node("11").unwrap();
        let bob = graph.node("13").unwrap();
        assert_eq!(alice.label, "Alice");
        assert_eq!(alice.faction.as_deref(), Some("VS"));
        assert_eq!(bob.faction, None);
        assert_eq!(alice.color, bob.color);
        assert!(alice.color.starts_with("rgb("));
    }
}
