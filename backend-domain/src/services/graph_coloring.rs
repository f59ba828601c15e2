// Community coloring and cross-community edge styling

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::entities::{GraphEdge, GraphNode};

pub const SQUAD_EDGE_COLOR: &str = "rgb(44, 149, 44)";
pub const FACTION_AGNOSTIC: &str = "NSO";

/// A faction-tinted color whose channel jitter is derived from `seed`, so the
/// same community representative always gets the same shade.
pub fn faction_color(faction: Option<&str>, seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    let channel = |idx: usize, min: u32, max: u32| min + u32::from(digest[idx]) % (max - min);
    match faction {
        Some("VS") => {
            let shared = channel(0, 120, 210);
            format!("rgb({}, {}, {})", shared, channel(1, 40, 80), shared)
        }
        Some("TR") => {
            let shared = channel(0, 40, 80);
            format!("rgb({}, {}, {})", channel(1, 120, 210), shared, shared)
        }
        Some("NC") => {
            let shared = channel(0, 40, 80);
            format!("rgb({}, {}, {})", shared, shared, channel(1, 120, 210))
        }
        _ => {
            let grey = channel(0, 80, 190);
            format!("rgb({}, {}, {})", grey, grey, grey)
        }
    }
}

fn has_real_faction(node: &GraphNode) -> bool {
    matches!(node.faction.as_deref(), Some(faction) if faction != FACTION_AGNOSTIC)
}

/// Colors every community after its first member with a real faction, falling
/// back to the faction-agnostic grey when the whole community is NSO or unknown.
pub fn color_communities(nodes: &mut [GraphNode]) {
    let mut colors: HashMap<usize, String> = HashMap::new();
    for node in nodes.iter() {
        if colors.contains_key(&node.group) || !has_real_faction(node) {
            continue;
        }
        colors.insert(node.group, faction_color(node.faction.as_deref(), &node.id));
    }
    for node in nodes.iter() {
        colors
            .entry(node.group)
            .or_insert_with(|| faction_color(Some(FACTION_AGNOSTIC), &node.id));
    }
    for node in nodes.iter_mut() {
        if let Some(color) = colors.get(&node.group) {
            node.color = color.clone();
        }
    }
}

pub fn mark_cross_community_edges(nodes: &[GraphNode], edges: &mut [GraphEdge]) {
    let groups: HashMap<&str, usize> = nodes
        .iter()
        .map(|node| (node.id.as_str(), node.group))
        .collect();
    for edge in edges.iter_mut() {
        edge.dashes = groups.get(edge.from.as_str()) != groups.get(edge.to.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, faction: Option<&str>, group: usize) -> GraphNode {
        GraphNode {
            id: id.into(),
            label: id.into(),
            faction: faction.map(Into::into),
            group,
            color: String::new(),
        }
    }

    fn channels(color: &str) -> Vec<u32> {
        color
            .trim_start_matches("rgb(")
            .trim_end_matches(')')
            .split(", ")
            .map(|part| part.parse().unwrap())
            .collect()
    }

    #[test]
    fn faction_colors_stay_in_their_ranges() {
        for seed in ["a", "b", "c", "d"] {
            let vs = channels(&faction_color(Some("VS"), seed));
            assert_eq!(vs[0], vs[2]);
            assert!((120..210).contains(&vs[0]) && (40..80).contains(&vs[1]));
            let tr = channels(&faction_color(Some("TR"), seed));
            assert_eq!(tr[1], tr[2]);
            assert!((120..210).contains(&tr[0]));
            let nc = channels(&faction_color(Some("NC"), seed));
            assert!((120..210).contains(&nc[2]) && (40..80).contains(&nc[0]));
            let grey = channels(&faction_color(None, seed));
            assert!(grey.iter().all(|c| *c == grey[0] && (80..190).contains(c)));
        }
    }

    #[test]
    fn nso_members_do_not_pick_the_community_color() {
        let mut nodes = vec![
            node("1", Some("NSO"), 0),
            node("3", Some("TR"), 0),
            node("5", Some("NSO"), 1),
            node("7", None, 1),
        ];
        color_communities(&mut nodes);
        assert_eq!(nodes[0].color, faction_color(Some("TR"), "3"));
        assert_eq!(nodes[1].color, nodes[0].color);
        assert_eq!(nodes[2].color, faction_color(Some("NSO"), "5"));
        assert_eq!(nodes[3].color, nodes[2].color);
    }
}
