//! Snapping of arbitrary positions to the closest water node.
use std::cmp::Reverse;
use std::collections::VecDeque;

use log::debug;
use priority_queue::PriorityQueue;
use rustc_hash::FxHashSet;

use crate::constants::Distance;
use crate::geometry::{distance_in_cm, LatLng};
use crate::graph::{node_index, Graph, NodeIndex};
use crate::grid::{Grid, SphericalGrid};

/// Returns the water node closest to `position`, or `None` if the grid has
/// no water at all.
///
/// Positions on land are moved to the first ring of water cells around
/// them, after that the result is improved greedily along the base edges of
/// `graph`.
pub fn snap_to_water(grid: &SphericalGrid, graph: &Graph, position: LatLng) -> Option<NodeIndex> {
    let start = grid.node_at(position);
    let candidates = water_candidates(grid, start);
    let distance_to = |node: NodeIndex| -> Distance { distance_in_cm(position, grid.coordinate(node)) };

    let mut current = candidates.into_iter().min_by_key(|node| distance_to(*node))?;
    let mut queue: PriorityQueue<NodeIndex, Reverse<Distance>> = PriorityQueue::new();
    loop {
        for (_, edge) in graph.neighbors_outgoing(current) {
            if !edge.is_shortcut() {
                queue.push(edge.target, Reverse(distance_to(edge.target)));
            }
        }
        match queue.pop() {
            Some((next, Reverse(distance))) if distance < distance_to(current) => {
                current = next;
                queue.clear();
            }
            _ => break,
        }
    }

    debug!("Snapped {:?} to {}", position, current);
    Some(current)
}

/// `start` if it is water, otherwise the water cells reached first when
/// flooding the surrounding land
fn water_candidates(grid: &SphericalGrid, start: NodeIndex) -> Vec<NodeIndex> {
    if !grid.is_land(start) {
        return vec![start];
    }

    let mut settled = FxHashSet::default();
    settled.insert(start);
    let mut frontier = VecDeque::from([start]);
    let mut candidates = Vec::new();

    while !frontier.is_empty() && candidates.is_empty() {
        // One ring per iteration
        for _ in 0..frontier.len() {
            let Some(cell) = frontier.pop_front() else {
                break;
            };
            for &neighbour in grid.cell_neighbours(cell) {
                let neighbour = node_index(neighbour as usize);
                if !settled.insert(neighbour) {
                    continue;
                }
                if grid.is_land(neighbour) {
                    frontier.push_back(neighbour);
                } else {
                    candidates.push(neighbour);
                }
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_graphs::small_sphere;

    #[test]
    fn water_stays_in_place() {
        let grid = small_sphere(3_000);
        let g = Graph::from_grid(&grid).unwrap();

        let position = LatLng::new(-10.0, -120.0);
        let cell = grid.node_at(position);
        let node = snap_to_water(&grid, &g, position).unwrap();
        assert!(!grid.is_land(node));
        assert!(
            distance_in_cm(position, grid.coordinate(node))
                <= distance_in_cm(position, grid.coordinate(cell))
        );
    }

    #[test]
    fn land_moves_to_coast() {
        let grid = small_sphere(3_000);
        let g = Graph::from_grid(&grid).unwrap();

        // Inside the first continent, close to its western coast
        let position = LatLng::new(0.0, -35.0);
        let node = snap_to_water(&grid, &g, position).unwrap();
        assert!(!grid.is_land(node));

        let snapped = grid.coordinate(node);
        assert!(snapped.lng < -35.0, "{:?}", snapped);
        assert!(snapped.lat.abs() < 10.0, "{:?}", snapped);
    }

    #[test]
    fn no_water_no_snap() {
        let mut grid = SphericalGrid::new(200);
        grid.set_water_mask(vec![false; grid.size()]);
        let g = Graph::from_grid(&grid).unwrap();

        assert_eq!(snap_to_water(&grid, &g, LatLng::new(0.0, 0.0)), None);
    }
}
