use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::biome::{Biome, BiomeConfig};
use crate::models::{JournalEntry, Position};
use crate::obstacles::{Obstacle, ObstacleRegistry};
use crate::placement::{LogDiagnostics, PlacementDiagnostics};
use crate::position_cache::PositionCache;

/// One entry ready for the renderer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlacedEntry {
    pub entry_id: String,
    pub biome: Biome,
    pub position: Position,
    pub model_path: String,
    pub scale: f32,
}

/// A single biome instance. Owns its obstacles and the position cache for
/// the entries routed to it.
#[derive(Debug)]
pub struct Terrain {
    biome: Biome,
    width: f32,
    length: f32,
    config: BiomeConfig,
    registry: ObstacleRegistry,
    cache: PositionCache<String>,
    rng: StdRng,
    diagnostics: LogDiagnostics,
}

impl Terrain {
    pub fn new(biome: Biome, width: f32, length: f32) -> Result<Self, String> {
        Self::with_config(biome, biome.config(), width, length, StdRng::from_entropy())
    }

    /// Reproducible layout, mainly for tests and replays.
    pub fn with_seed(biome: Biome, width: f32, length: f32, seed: u64) -> Result<Self, String> {
        Self::with_config(biome, biome.config(), width, length, StdRng::seed_from_u64(seed))
    }

    /// Fails when `config` is not usable on a `width` x `length` terrain.
    pub fn with_config(
        biome: Biome,
        config: BiomeConfig,
        width: f32,
        length: f32,
        rng: StdRng,
    ) -> Result<Self, String> {
        config.validate_for(width, length)?;
        Ok(Self {
            biome,
            width,
            length,
            config,
            registry: ObstacleRegistry::new(),
            cache: PositionCache::new(),
            rng,
            diagnostics: LogDiagnostics::default(),
        })
    }

    /// Enables per-placement debug tracing. Fallback warnings are always
    /// emitted.
    pub fn set_debug(&mut self, debug: bool) {
        self.diagnostics.debug = debug;
    }

    pub fn biome(&self) -> Biome {
        self.biome
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn config(&self) -> &BiomeConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.registry.obstacles()
    }

    pub fn cache(&self) -> &PositionCache<String> {
        &self.cache
    }

    pub fn reconcile<'a, I>(&mut self, entries: I) -> Vec<PlacedEntry>
    where
        I: IntoIterator<Item = &'a JournalEntry>,
    {
        let mut diagnostics = self.diagnostics;
        self.reconcile_with(entries, &mut diagnostics)
    }

    /// Same as [`Terrain::reconcile`] with a caller-supplied diagnostics sink.
    pub fn reconcile_with<'a, I, D>(&mut self, entries: I, diagnostics: &mut D) -> Vec<PlacedEntry>
    where
        I: IntoIterator<Item = &'a JournalEntry>,
        D: PlacementDiagnostics + ?Sized,
    {
        let ids: Vec<String> = entries.into_iter().map(|entry| entry.id.clone()).collect();
        let obstacles = self.registry.ensure(self.width, self.length, &self.config.obstacles, &mut self.rng);
        let positions = self.cache.reconcile(
            &ids,
            obstacles,
            self.width,
            self.length,
            &self.config.placement,
            &mut self.rng,
            diagnostics,
        );

        let stats = self.cache.last_stats();
        if stats.placed > 0 || stats.pruned > 0 {
            log::info!(
                "{} terrain reconciled {} entries (placed: {}, fallbacks: {}, pruned: {})",
                self.config.name,
                ids.len(),
                stats.placed,
                stats.fallbacks,
                stats.pruned
            );
        }

        ids.into_iter()
            .zip(positions)
            .map(|(entry_id, position)| PlacedEntry {
                entry_id,
                biome: self.biome,
                position,
                model_path: self.config.model_path.clone(),
                scale: self.config.model_scale,
            })
            .collect()
    }

    /// Obstacles are regenerated on the next reconcile. Cached entry
    /// positions are kept. Rejected dimensions leave the terrain unchanged.
    pub fn resize(&mut self, width: f32, length: f32) -> Result<(), String> {
        self.config.validate_for(width, length)?;
        self.width = width;
        self.length = length;
        Ok(())
    }

    pub fn dispose(&mut self) {
        self.cache.dispose();
        self.registry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::ObstacleSpec;
    use crate::placement::tests::CountingDiagnostics;

    fn entry(id: &str, emotion: &str) -> JournalEntry {
        JournalEntry::with_id(id, "2024-05-01", "Some memory", "", "journal", emotion).unwrap()
    }

    #[test]
    fn beach_scans_from_the_far_corner() {
        let mut terrain = Terrain::with_seed(Biome::Beach, 100.0, 100.0, 1).unwrap();
        let entries = vec![entry("a", "Happy"), entry("b", "Happy")];
        let placed = terrain.reconcile(&entries);

        assert_eq!(placed[0].position, Position::ground(45.0, 45.0));
        assert_eq!(placed[1].position, Position::ground(45.0, 37.0));
        assert_eq!(placed[0].model_path, "/models/happy/Palmtree.glb");
        assert_eq!(placed[0].scale, 2.0);
        assert_eq!(placed[1].entry_id, "b");
        assert_eq!(terrain.obstacles().len(), 7);
    }

    #[test]
    fn meadow_trees_sit_between_rocks() {
        let mut terrain = Terrain::with_seed(Biome::Meadow, 100.0, 100.0, 1).unwrap();
        let entries: Vec<JournalEntry> = (0..12).map(|i| entry(&format!("n{}", i), "Neutral")).collect();
        let placed = terrain.reconcile(&entries);

        assert_eq!(placed[0].position, Position::ground(45.0, -45.0));
        assert_eq!(placed[11].position, Position::ground(35.0, -35.0));
        for p in &placed {
            for rock in terrain.obstacles() {
                assert!(p.position.distance_xz(&rock.position) >= rock.exclusion_radius);
            }
        }
    }

    #[test]
    fn volcanic_layout_respects_clearance_and_obstacles() {
        for seed in 0..10 {
            let mut terrain = Terrain::with_seed(Biome::Volcanic, 100.0, 100.0, seed).unwrap();
            let mut diag = CountingDiagnostics::default();
            let entries: Vec<JournalEntry> = (0..30).map(|i| entry(&format!("v{}", i), "Angry")).collect();
            let placed = terrain.reconcile_with(&entries, &mut diag);
            if diag.warnings > 0 {
                continue;
            }
            for (i, p) in placed.iter().enumerate() {
                assert!(p.position.x.abs() <= 46.0 && p.position.z.abs() <= 46.0);
                for q in &placed[..i] {
                    assert!(p.position.distance_xz(&q.position) >= 6.0);
                }
                for o in terrain.obstacles() {
                    assert!(p.position.distance_xz(&o.position) >= o.exclusion_radius);
                }
            }
        }
    }

    #[test]
    fn rerender_keeps_layout_and_obstacles() {
        let mut terrain = Terrain::with_seed(Biome::Ruins, 100.0, 100.0, 5).unwrap();
        let mut entries = vec![entry("r1", "Sad"), entry("r2", "Sad")];
        let first = terrain.reconcile(&entries);
        let obstacles = terrain.obstacles().to_vec();

        entries.push(entry("r3", "Sad"));
        let second = terrain.reconcile(&entries);
        assert_eq!(&second[..2], &first[..]);
        assert_eq!(terrain.obstacles(), &obstacles[..]);

        entries.remove(0);
        let third = terrain.reconcile(&entries);
        assert_eq!(third[0], second[1]);
        assert_eq!(third[1], second[2]);
        assert!(!terrain.cache().contains("r1"));
    }

    #[test]
    fn resize_regenerates_obstacles_only() {
        let mut terrain = Terrain::with_seed(Biome::Volcanic, 100.0, 100.0, 3).unwrap();
        let entries = vec![entry("x", "Angry")];
        let before = terrain.reconcile(&entries);
        let obstacles = terrain.obstacles().to_vec();

        terrain.resize(80.0, 80.0).unwrap();
        let after = terrain.reconcile(&entries);
        assert_eq!(before, after);
        assert_ne!(terrain.obstacles(), &obstacles[..]);
        assert_eq!(terrain.width(), 80.0);

        assert!(terrain.resize(f32::NAN, 80.0).is_err());
        assert_eq!(terrain.width(), 80.0);
        assert_eq!(terrain.reconcile(&entries), before);
    }

    #[test]
    fn unusable_configs_are_rejected_up_front() {
        let mut config = Biome::Ruins.config();
        config.placement.cell_size = 0.0;
        let err = Terrain::with_config(Biome::Ruins, config, 100.0, 100.0, StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, "Ruins: cell_size must be positive");

        let mut config = Biome::Volcanic.config();
        config.obstacles.push(ObstacleSpec::scattered("ember", 2, 3.0, -1.0, 2.0));
        assert!(Terrain::with_config(Biome::Volcanic, config, 100.0, 100.0, StdRng::seed_from_u64(1)).is_err());

        assert!(Terrain::with_seed(Biome::Beach, -5.0, 100.0, 1).is_err());
    }

    #[test]
    fn dispose_forgets_everything() {
        let mut terrain = Terrain::with_seed(Biome::Ruins, 100.0, 100.0, 8).unwrap();
        terrain.reconcile(&[entry("a", "Sad")]);
        terrain.dispose();
        assert!(terrain.cache().is_empty());
        assert!(terrain.obstacles().is_empty());

        let mut diag = CountingDiagnostics::default();
        terrain.reconcile_with(&[entry("a", "Sad")], &mut diag);
        assert_eq!(diag.attempted, 1);
        assert_eq!(terrain.obstacles().len(), 18);
    }
}
