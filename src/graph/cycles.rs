//! Cycle detection over claim relations.
//!
//! Claims carry `supports`/`contradicts` edges as plain ID lists. A cycle in
//! that directed edge list is structural circular reasoning; detection runs
//! as a discrete pass over a finished claim set rather than being woven into
//! graph construction.

use std::collections::{HashMap, HashSet};

use super::ArgumentGraph;

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Find all distinct cycles in the claim relation graph.
///
/// Edges pointing at IDs not present in the graph are ignored — decomposition
/// does not guarantee relation targets exist, only attack/defense targets.
/// Each cycle is reported once, rotated so its lexicographically smallest
/// claim ID comes first.
pub fn detect_cycles(graph: &ArgumentGraph) -> Vec<Vec<String>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for claim in graph.claims() {
        let neighbors: Vec<&str> = claim
            .supports
            .iter()
            .chain(&claim.contradicts)
            .map(String::as_str)
            .filter(|id| graph.contains_claim(id))
            .collect();
        adjacency.insert(claim.id.as_str(), neighbors);
    }

    let mut colors: HashMap<&str, Color> = adjacency.keys().map(|&id| (id, Color::White)).collect();
    let mut path: Vec<&str> = Vec::new();
    let mut found: Vec<Vec<String>> = Vec::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();

    for claim in graph.claims() {
        if colors[claim.id.as_str()] == Color::White {
            visit(
                claim.id.as_str(),
                &adjacency,
                &mut colors,
                &mut path,
                &mut found,
                &mut seen,
            );
        }
    }

    found
}

fn visit<'a>(
    node: &'a str,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
    colors: &mut HashMap<&'a str, Color>,
    path: &mut Vec<&'a str>,
    found: &mut Vec<Vec<String>>,
    seen: &mut HashSet<Vec<String>>,
) {
    colors.insert(node, Color::Gray);
    path.push(node);

    if let Some(neighbors) = adjacency.get(node) {
        for &next in neighbors {
            match colors[next] {
                Color::Gray => {
                    // Back edge: the cycle is the path suffix from `next`
                    let start = path.iter().position(|&n| n == next).unwrap_or(0);
                    let cycle = canonicalize(&path[start..]);
                    if seen.insert(cycle.clone()) {
                        found.push(cycle);
                    }
                }
                Color::White => visit(next, adjacency, colors, path, found, seen),
                Color::Black => {}
            }
        }
    }

    path.pop();
    colors.insert(node, Color::Black);
}

/// Rotate a cycle so its smallest claim ID comes first.
fn canonicalize(cycle: &[&str]) -> Vec<String> {
    let min_pos = cycle
        .iter()
        .enumerate()
        .min_by_key(|&(_, id)| *id)
        .map(|(pos, _)| pos)
        .unwrap_or(0);
    cycle[min_pos..]
        .iter()
        .chain(&cycle[..min_pos])
        .map(|id| id.to_string())
        .collect()
}
