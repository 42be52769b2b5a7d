use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use rand::Rng;

use crate::models::Position;
use crate::obstacles::Obstacle;
use crate::placement::{place_new_entry, PlacementConfig, PlacementDiagnostics};

/// Counters from the most recent reconcile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub reused: usize,
    pub placed: usize,
    pub fallbacks: usize,
    pub pruned: usize,
}

/// Identity -> position map owned by one terrain. Placement runs once per
/// identity; a cached position never moves until its identity is removed.
#[derive(Debug, Clone)]
pub struct PositionCache<K> {
    positions: HashMap<K, Position>,
    last_stats: ReconcileStats,
}

impl<K> Default for PositionCache<K> {
    fn default() -> Self {
        Self { positions: HashMap::new(), last_stats: ReconcileStats::default() }
    }
}

impl<K: Eq + Hash + Clone> PositionCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves one position per id, in order. Known ids keep their cached
    /// position. Unknown ids are placed against the cached positions of every
    /// live id (wherever it sits in `ids`), the ids placed earlier in this
    /// pass and `obstacles`. Ids missing from `ids` are pruned. The result is
    /// aligned index-for-index with `ids`.
    pub fn reconcile<R, D>(
        &mut self,
        ids: &[K],
        obstacles: &[Obstacle],
        width: f32,
        length: f32,
        config: &PlacementConfig,
        rng: &mut R,
        diagnostics: &mut D,
    ) -> Vec<Position>
    where
        R: Rng + ?Sized,
        D: PlacementDiagnostics + ?Sized,
    {
        let mut stats = ReconcileStats::default();
        let mut resolved: Vec<Position> = Vec::with_capacity(ids.len());
        let mut occupied: Vec<Position> =
            ids.iter().filter_map(|id| self.positions.get(id).copied()).collect();

        for id in ids {
            if let Some(position) = self.positions.get(id) {
                resolved.push(*position);
                stats.reused += 1;
                continue;
            }
            let outcome = place_new_entry(&occupied, obstacles, width, length, config, rng, diagnostics);
            if outcome.used_fallback {
                stats.fallbacks += 1;
            }
            stats.placed += 1;
            self.positions.insert(id.clone(), outcome.position);
            occupied.push(outcome.position);
            resolved.push(outcome.position);
        }

        let live: HashSet<&K> = ids.iter().collect();
        let before = self.positions.len();
        self.positions.retain(|id, _| live.contains(id));
        stats.pruned = before - self.positions.len();

        self.last_stats = stats;
        resolved
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&Position>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.positions.get(id)
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Position)> {
        self.positions.iter()
    }

    pub fn last_stats(&self) -> ReconcileStats {
        self.last_stats
    }

    /// Drops every cached position.
    pub fn dispose(&mut self) {
        self.positions.clear();
        self.last_stats = ReconcileStats::default();
    }
}
