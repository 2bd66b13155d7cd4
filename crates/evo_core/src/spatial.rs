//! Bucketed spatial index (spec §4.4).
//!
//! The teacher's `SpatialHash` rebuilds a CSR structure from scratch every
//! tick (`build_with_lineage`), which fits a system that repopulates the
//! whole world each frame. This simulation's spec requires live
//! `insert`/`remove`/`update` semantics instead — the index is consulted
//! during decisions and must reflect exactly the current living set without
//! a rebuild pass, so it's a genuinely different data structure: a mutable
//! bucket map keyed by cell coordinate, updated incrementally. `update` is
//! atomic (remove then insert) so the bucket map is never observed in a
//! state where an entity is in two buckets or none.

use std::collections::HashMap;

use evo_data::{AnimalId, Position};

use crate::vecmath::distance;

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    bucket_size: f64,
    buckets: HashMap<(i64, i64), Vec<AnimalId>>,
    entries: HashMap<AnimalId, (Position, f64)>,
    max_size_seen: f64,
}

impl SpatialIndex {
    pub fn new(bucket_size: f64) -> Self {
        Self {
            bucket_size: bucket_size.max(f64::EPSILON),
            buckets: HashMap::new(),
            entries: HashMap::new(),
            max_size_seen: 0.0,
        }
    }

    fn bucket_of(&self, pos: Position) -> (i64, i64) {
        (
            (pos.x / self.bucket_size).floor() as i64,
            (pos.y / self.bucket_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, id: AnimalId, pos: Position, size: f64) {
        let bucket = self.bucket_of(pos);
        self.buckets.entry(bucket).or_default().push(id.clone());
        self.entries.insert(id, (pos, size));
        self.max_size_seen = self.max_size_seen.max(size);
    }

    pub fn remove(&mut self, id: &AnimalId) {
        if let Some((pos, _)) = self.entries.remove(id) {
            let bucket = self.bucket_of(pos);
            if let Some(v) = self.buckets.get_mut(&bucket) {
                v.retain(|existing| existing != id);
                if v.is_empty() {
                    self.buckets.remove(&bucket);
                }
            }
        }
    }

    /// Atomic remove-then-insert so the bucket map is always authoritative.
    pub fn update(&mut self, id: AnimalId, pos: Position, size: f64) {
        self.remove(&id);
        self.insert(id, pos, size);
    }

    /// Entities with `distance(center, e.pos) - e.size <= r`. The query
    /// footprint widens by `max_size_seen` so an oversized entity straddling
    /// a bucket boundary is never missed, covering the case where config
    /// validation warned that the bucket size doesn't cover the largest
    /// alert range.
    pub fn query_radius(&self, center: Position, r: f64) -> Vec<AnimalId> {
        let effective_r = r + self.max_size_seen;
        let cell_radius = (effective_r / self.bucket_size).ceil() as i64 + 1;
        let (cx, cy) = self.bucket_of(center);

        let mut out = Vec::new();
        for gx in (cx - cell_radius)..=(cx + cell_radius) {
            for gy in (cy - cell_radius)..=(cy + cell_radius) {
                if let Some(ids) = self.buckets.get(&(gx, gy)) {
                    for id in ids {
                        let (pos, size) = self.entries[id];
                        if distance(center, pos) - size <= r {
                            out.push(id.clone());
                        }
                    }
                }
            }
        }
        out
    }

    pub fn query_rect(&self, min: Position, max: Position) -> Vec<AnimalId> {
        let (gx_min, gy_min) = self.bucket_of(min);
        let (gx_max, gy_max) = self.bucket_of(max);

        let mut out = Vec::new();
        for gx in gx_min..=gx_max {
            for gy in gy_min..=gy_max {
                if let Some(ids) = self.buckets.get(&(gx, gy)) {
                    for id in ids {
                        let (pos, _) = self.entries[id];
                        if pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y {
                            out.push(id.clone());
                        }
                    }
                }
            }
        }
        out
    }

    /// Nearest entity to `center`, excluding `exclude` if given. Ties break
    /// by id ascending, matching the perception module's tiebreak rule.
    pub fn nearest(&self, center: Position, exclude: Option<&AnimalId>) -> Option<AnimalId> {
        self.nearest_n(center, 1, exclude).into_iter().next()
    }

    pub fn nearest_n(&self, center: Position, n: usize, exclude: Option<&AnimalId>) -> Vec<AnimalId> {
        let mut candidates: Vec<(f64, &AnimalId)> = self
            .entries
            .iter()
            .filter(|(id, _)| exclude != Some(id))
            .map(|(id, (pos, _))| (distance(center, *pos), id))
            .collect();
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap().then_with(|| a.1.cmp(b.1)));
        candidates.into_iter().take(n).map(|(_, id)| id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &AnimalId) -> bool {
        self.entries.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_query_same_cell() {
        let mut index = SpatialIndex::new(10.0);
        let id = AnimalId::new("deer", 0);
        index.insert(id.clone(), Position::new(5.0, 5.0), 1.0);
        let found = index.query_radius(Position::new(5.0, 5.0), 1.0);
        assert_eq!(found, vec![id]);
    }

    #[test]
    fn test_query_finds_nearby_across_bucket_boundary() {
        let mut index = SpatialIndex::new(10.0);
        let id = AnimalId::new("wolf", 0);
        index.insert(id.clone(), Position::new(9.9, 9.9), 0.5);
        let found = index.query_radius(Position::new(10.1, 10.1), 1.0);
        assert!(found.contains(&id));
    }

    #[test]
    fn test_remove_then_query_empty() {
        let mut index = SpatialIndex::new(10.0);
        let id = AnimalId::new("deer", 0);
        index.insert(id.clone(), Position::new(5.0, 5.0), 1.0);
        index.remove(&id);
        assert!(index.query_radius(Position::new(5.0, 5.0), 100.0).is_empty());
        assert!(!index.contains(&id));
    }

    #[test]
    fn test_update_moves_entity_between_buckets() {
        let mut index = SpatialIndex::new(10.0);
        let id = AnimalId::new("deer", 0);
        index.insert(id.clone(), Position::new(5.0, 5.0), 1.0);
        index.update(id.clone(), Position::new(95.0, 95.0), 1.0);
        assert!(index.query_radius(Position::new(5.0, 5.0), 1.0).is_empty());
        assert_eq!(index.query_radius(Position::new(95.0, 95.0), 1.0), vec![id]);
    }

    #[test]
    fn test_nearest_breaks_ties_by_id() {
        let mut index = SpatialIndex::new(50.0);
        let a = AnimalId::new("deer", 2);
        let b = AnimalId::new("deer", 1);
        index.insert(a.clone(), Position::new(10.0, 0.0), 0.5);
        index.insert(b.clone(), Position::new(0.0, 10.0), 0.5);
        assert_eq!(index.nearest(Position::new(0.0, 0.0), None), Some(b));
    }
}
