//! The segmentation lattice and its forward best-path / backward K-best
//! search. The lattice shape (`edges` plus per-node
//! adjacency) follows `lindera-core/src/viterbi.rs`'s `Lattice`; K-best
//! search follows `lindera-dictionary/src/nbest.rs`'s `BinaryHeap`-driven
//! backward generator, adapted from cost minimization to score
//! maximization and simplified since edges here carry no connection cost
//! between neighbors.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::classifier::{classify, coalesces};
use crate::dictionary::Dictionary;
use crate::scorer;
use crate::token::Token;
use crate::word_entry::WordEntry;

#[derive(Debug, Clone)]
struct Edge {
    from: usize,
    to: usize,
    surface: String,
    score: i64,
    cost: i16,
    pos_id: u8,
    entry: Option<WordEntry>,
}

/// Builds every candidate edge for `chars`: dictionary prefix matches, the
/// single-character unknown fallback, and homogeneous-run coalescing for
/// katakana/digit/latin runs.
fn build_candidates(dict: &Dictionary, text: &str, chars: &[char]) -> Vec<Edge> {
    let byte_offsets = char_byte_offsets(chars);
    let mut edges = Vec::new();

    for i in 0..chars.len() {
        let start_byte = byte_offsets[i];
        for (char_len, entry) in dict.prefix_lookup(&text[start_byte..]) {
            let end = i + char_len;
            let surface = text[start_byte..byte_offsets[end]].to_string();
            let score = scorer::score(&surface, &entry);
            edges.push(Edge {
                from: i,
                to: end,
                surface,
                score,
                cost: entry.cost,
                pos_id: entry.pos_id,
                entry: Some(entry),
            });
        }

        let single = chars[i].to_string();
        edges.push(Edge {
            from: i,
            to: i + 1,
            score: scorer::score_unknown(&single),
            surface: single,
            cost: 0,
            pos_id: crate::word_entry::UNKNOWN_POS,
            entry: None,
        });

        let class = classify(chars[i]);
        if coalesces(class) {
            let mut j = i + 1;
            while j < chars.len() && classify(chars[j]) == class {
                j += 1;
            }
            if j > i + 1 {
                let surface = text[start_byte..byte_offsets[j]].to_string();
                edges.push(Edge {
                    from: i,
                    to: j,
                    score: scorer::score_unknown(&surface),
                    surface,
                    cost: 0,
                    pos_id: crate::word_entry::UNKNOWN_POS,
                    entry: None,
                });
            }
        }
    }

    edges
}

fn char_byte_offsets(chars: &[char]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(chars.len() + 1);
    let mut acc = 0;
    offsets.push(0);
    for c in chars {
        acc += c.len_utf8();
        offsets.push(acc);
    }
    offsets
}

/// Tie-break between two edges landing on the same node with equal
/// cumulative score: longer edge wins, then smaller cost, then smaller
/// pos_id.
fn better(candidate: &Edge, candidate_score: i64, incumbent: &Edge, incumbent_score: i64) -> bool {
    match candidate_score.cmp(&incumbent_score) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            let candidate_len = candidate.to - candidate.from;
            let incumbent_len = incumbent.to - incumbent.from;
            match candidate_len.cmp(&incumbent_len) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => match candidate.cost.cmp(&incumbent.cost) {
                    Ordering::Less => true,
                    Ordering::Greater => false,
                    Ordering::Equal => candidate.pos_id < incumbent.pos_id,
                },
            }
        }
    }
}

/// Forward dynamic program over the lattice. `best[j]` holds the optimal
/// cumulative score to reach node `j` and the edge used to get there;
/// `best[0]` is always `Some((0, None))` since node 0 needs no incoming
/// edge.
struct Forward {
    best_score: Vec<i64>,
    best_edge: Vec<Option<usize>>,
}

fn run_forward(edges: &[Edge], node_count: usize) -> Forward {
    let mut by_from: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (idx, edge) in edges.iter().enumerate() {
        by_from[edge.from].push(idx);
    }

    let mut best_score = vec![i64::MIN; node_count];
    let mut best_edge: Vec<Option<usize>> = vec![None; node_count];
    best_score[0] = 0;

    for node in 0..node_count {
        if best_score[node] == i64::MIN {
            continue;
        }
        for &edge_idx in &by_from[node] {
            let edge = &edges[edge_idx];
            let candidate_score = best_score[node] + edge.score;
            let update = match best_edge[edge.to] {
                None => true,
                Some(incumbent_idx) => better(
                    edge,
                    candidate_score,
                    &edges[incumbent_idx],
                    best_score[edge.to],
                ),
            };
            if update {
                best_score[edge.to] = candidate_score;
                best_edge[edge.to] = Some(edge_idx);
            }
        }
    }

    Forward {
        best_score,
        best_edge,
    }
}

#[derive(Clone)]
struct QueueElement {
    fx: i64,
    gx: i64,
    node: usize,
    seq: usize,
    path: Vec<usize>,
}

impl PartialEq for QueueElement {
    fn eq(&self, other: &Self) -> bool {
        self.fx == other.fx && self.seq == other.seq
    }
}
impl Eq for QueueElement {}

impl Ord for QueueElement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fx.cmp(&other.fx).then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for QueueElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Walks `best_edge` back from the final node to 0, reconstructing the
/// canonical forward-DP best path in forward order. This is the exact path
/// `tokenize` returns: it alone respects the §4.4.2 tie-break when more
/// than one path reaches the same score, which the backward search below
/// (ordered only by score) does not reproduce on its own.
fn reconstruct_canonical(forward: &Forward, edges: &[Edge], node_count: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut node = node_count - 1;
    while node != 0 {
        let edge_idx = forward.best_edge[node].expect("reachable node has an incoming edge");
        path.push(edge_idx);
        node = edges[edge_idx].from;
    }
    path.reverse();
    path
}

/// Enumerates up to `k` complete paths through the lattice, best first.
/// The first element always equals the path `tokenize`
/// would return (the canonical tie-break-respecting forward path); further
/// alternatives come from an A*-style backward search prioritized by
/// `fx = gx + forward.best_score[node]`, an exact (not merely admissible)
/// heuristic since edges carry no cross-term with their neighbors.
fn k_best_paths(
    edges: &[Edge],
    forward: &Forward,
    node_count: usize,
    k: usize,
) -> Vec<(Vec<usize>, i64)> {
    let mut by_to: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (idx, edge) in edges.iter().enumerate() {
        by_to[edge.to].push(idx);
    }

    let mut results = Vec::new();
    let mut seen = std::collections::HashSet::new();

    let canonical = reconstruct_canonical(forward, edges, node_count);
    seen.insert(canonical.clone());
    results.push((canonical, forward.best_score[node_count - 1]));
    if k == 1 {
        return results;
    }

    let mut heap = BinaryHeap::new();
    let mut seq_counter = 0usize;
    heap.push(QueueElement {
        fx: forward.best_score[node_count - 1],
        gx: 0,
        node: node_count - 1,
        seq: seq_counter,
        path: Vec::new(),
    });

    while let Some(elem) = heap.pop() {
        if elem.node == 0 {
            let mut path = elem.path;
            path.reverse();
            if seen.insert(path.clone()) {
                results.push((path, elem.gx));
                if results.len() >= k {
                    break;
                }
            }
            continue;
        }
        for &edge_idx in &by_to[elem.node] {
            let edge = &edges[edge_idx];
            let gx = elem.gx + edge.score;
            let fx = gx + forward.best_score[edge.from];
            let mut path = elem.path.clone();
            path.push(edge_idx);
            seq_counter += 1;
            heap.push(QueueElement {
                fx,
                gx,
                node: edge.from,
                seq: seq_counter,
                path,
            });
        }
    }

    results
}

fn edges_to_tokens(edges: &[Edge], path: &[usize], dict: &Dictionary) -> Vec<Token> {
    path.iter()
        .map(|&idx| {
            let edge = &edges[idx];
            // the compact record carries no reading index, so reading
            // always falls back to the surface form.
            match &edge.entry {
                Some(entry) => Token {
                    surface: edge.surface.clone(),
                    reading: edge.surface.clone(),
                    pos: dict.pos_name(entry.pos_id).to_string(),
                    base_form: edge.surface.clone(),
                    base_form_id: entry.base_seq,
                    start: edge.from,
                    end: edge.to,
                },
                None => Token {
                    surface: edge.surface.clone(),
                    reading: edge.surface.clone(),
                    pos: "unk".to_string(),
                    base_form: edge.surface.clone(),
                    base_form_id: 0,
                    start: edge.from,
                    end: edge.to,
                },
            }
        })
        .collect()
}

/// Segments `text` into its single best token sequence.
pub fn tokenize(dict: &Dictionary, text: &str) -> Vec<Token> {
    analyze(dict, text, 1)
        .into_iter()
        .next()
        .map(|(tokens, _score)| tokens)
        .unwrap_or_default()
}

/// Segments `text` into up to `limit` ranked `(tokens, total_score)` pairs,
/// best first. Returns an empty vec only for empty input.
pub fn analyze(dict: &Dictionary, text: &str, limit: usize) -> Vec<(Vec<Token>, i64)> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    let node_count = chars.len() + 1;
    let edges = build_candidates(dict, text, &chars);
    let forward = run_forward(&edges, node_count);
    let paths = k_best_paths(&edges, &forward, node_count, limit);
    paths
        .into_iter()
        .map(|(path, score)| (edges_to_tokens(&edges, &path, dict), score))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesized_edge(from: usize, to: usize, score: i64) -> Edge {
        Edge {
            from,
            to,
            surface: String::new(),
            score,
            cost: 0,
            pos_id: 1,
            entry: None,
        }
    }

    #[test]
    fn forward_dp_prefers_higher_cumulative_score() {
        let edges = vec![
            synthesized_edge(0, 1, 10),
            synthesized_edge(0, 2, 30),
            synthesized_edge(1, 2, 10),
        ];
        let forward = run_forward(&edges, 3);
        assert_eq!(forward.best_score[2], 30);
        assert_eq!(forward.best_edge[2], Some(1));
    }

    #[test]
    fn tie_break_prefers_longer_edge_then_lower_cost_then_lower_pos_id() {
        let long_edge = Edge {
            from: 0,
            to: 2,
            surface: String::new(),
            score: 20,
            cost: 5,
            pos_id: 9,
            entry: None,
        };
        let short_edge = Edge {
            from: 0,
            to: 1,
            surface: String::new(),
            score: 20,
            cost: 5,
            pos_id: 1,
            entry: None,
        };
        assert!(better(&long_edge, 20, &short_edge, 20));
        assert!(!better(&short_edge, 20, &long_edge, 20));
    }

    #[test]
    fn k_best_paths_are_nonincreasing_in_score() {
        let edges = vec![
            synthesized_edge(0, 1, 40),
            synthesized_edge(1, 2, 40),
            synthesized_edge(0, 2, 70),
        ];
        let forward = run_forward(&edges, 3);
        let results = k_best_paths(&edges, &forward, 3, 2);
        assert_eq!(results[0].1, 80);
        assert_eq!(results[1].1, 70);
    }
}
