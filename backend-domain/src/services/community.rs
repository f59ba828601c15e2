// Louvain community detection
// Deterministic: nodes are visited in index order and ties keep the current community.

use std::collections::BTreeMap;

const MIN_GAIN: f64 = 1e-12;

type Adjacency = Vec<BTreeMap<usize, f64>>;

/// Returns one community id per node. Ids are dense and numbered in order of
/// first appearance; isolated nodes get a community of their own.
pub fn detect_communities(node_count: usize, edges: &[(usize, usize, f64)]) -> Vec<usize> {
    let mut adjacency: Adjacency = vec![BTreeMap::new(); node_count];
    for &(from, to, weight) in edges {
        if from == to || from >= node_count || to >= node_count || weight <= 0.0 {
            continue;
        }
        *adjacency[from].entry(to).or_insert(0.0) += weight;
        *adjacency[to].entry(from).or_insert(0.0) += weight;
    }

    let mut membership: Vec<usize> = (0..node_count).collect();
    loop {
        let Some(level) = one_level(&adjacency) else {
            break;
        };
        let (renumbered, count) = renumber(&level);
        for community in membership.iter_mut() {
            *community = renumbered[*community];
        }
        adjacency = aggregate(&adjacency, &renumbered, count);
    }
    renumber(&membership).0
}

/// One pass of local moving. `None` when no node changed community.
fn one_level(adjacency: &Adjacency) -> Option<Vec<usize>> {
    let degrees: Vec<f64> = adjacency.iter().map(|row| row.values().sum()).collect();
    let total: f64 = degrees.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let mut community: Vec<usize> = (0..adjacency.len()).collect();
    let mut community_degree = degrees.clone();
    let mut moved_any = false;
    loop {
        let mut moved = false;
        for node in 0..adjacency.len() {
            let current = community[node];
            let degree = degrees[node];

            let mut links: BTreeMap<usize, f64> = BTreeMap::new();
            for (&neighbour, &weight) in &adjacency[node] {
                if neighbour != node {
                    *links.entry(community[neighbour]).or_insert(0.0) += weight;
                }
            }

            community_degree[current] -= degree;
            let gain = |target: usize, link: f64| link - community_degree[target] * degree / total;
            let mut best = current;
            let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));
            for (&candidate, &link) in &links {
                let candidate_gain = gain(candidate, link);
                if candidate_gain > best_gain + MIN_GAIN {
                    best = candidate;
                    best_gain = candidate_gain;
                }
            }
            community_degree[best] += degree;
            if best != current {
                community[node] = best;
                moved = true;
                moved_any = true;
            }
        }
        if !moved {
            break;
        }
    }
    moved_any.then_some(community)
}

fn renumber(assignment: &[usize]) -> (Vec<usize>, usize) {
    let mut ids: BTreeMap<usize, usize> = BTreeMap::new();
    let mut order: Vec<usize> = Vec::with_capacity(assignment.len());
    for &community in assignment {
        let next = ids.len();
        order.push(*ids.entry(community).or_insert(next));
    }
    (order, ids.len())
}

fn aggregate(adjacency: &Adjacency, community: &[usize], count: usize) -> Adjacency {
    let mut next: Adjacency = vec![BTreeMap::new(); count];
    for (node, row) in adjacency.iter().enumerate() {
        for (&neighbour, &weight) in row {
            *next[community[node]]
                .entry(community[neighbour])
                .or_insert(0.0) += weight;
        }
    }
    next
}

/// Newman modularity of an assignment over an undirected weighted edge list.
pub fn modularity(assignment: &[usize], edges: &[(usize, usize, f64)]) -> f64 {
    let total: f64 = edges.iter().map(|&(_, _, weight)| weight).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mut internal: BTreeMap<usize, f64> = BTreeMap::new();
    let mut degree: BTreeMap<usize, f64> = BTreeMap::new();
    for &(from, to, weight) in edges {
        *degree.entry(assignment[from]).or_insert(0.0) += weight;
        *degree.entry(assignment[to]).or_insert(0.0) += weight;
        if assignment[from] == assignment[to] {
            *internal.entry(assignment[from]).or_insert(0.0) += weight;
        }
    }
    degree
        .iter()
        .map(|(community, &deg)| {
            internal.get(community).copied().unwrap_or(0.0) / total - (deg / (2.0 * total)).powi(2)
        })
        .sum()
}
