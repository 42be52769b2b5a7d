use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::biome::{Biome, BiomeConfig};
use crate::models::{EmotionZone, JournalEntry, Position};
use crate::terrain::{PlacedEntry, Terrain};

/// The four biomes laid out as a 2x2 block of emotion zones around the
/// origin, in `Biome::ALL` order: row by row from -z, -x first.
#[derive(Debug)]
pub struct World {
    width: f32,
    length: f32,
    regions: Vec<(EmotionZone, Terrain)>,
}

fn zone_center(index: usize, width: f32, length: f32) -> Position {
    let col = (index % 2) as f32;
    let row = (index / 2) as f32;
    Position::ground((col - 0.5) * width, (row - 0.5) * length)
}

impl World {
    pub fn new(width: f32, length: f32) -> Result<Self, String> {
        Self::with_configs(&HashMap::new(), width, length, None)
    }

    /// Each terrain gets its own stream derived from `seed`.
    pub fn with_seed(width: f32, length: f32, seed: u64) -> Result<Self, String> {
        Self::with_configs(&HashMap::new(), width, length, Some(seed))
    }

    /// Uses `configs` where present and the built-in layout otherwise. Fails
    /// on the first config that is not usable at this size.
    pub fn with_configs(
        configs: &HashMap<Biome, BiomeConfig>,
        width: f32,
        length: f32,
        seed: Option<u64>,
    ) -> Result<Self, String> {
        let regions = Biome::ALL
            .iter()
            .enumerate()
            .map(|(i, biome)| {
                let config = configs.get(biome).cloned().unwrap_or_else(|| biome.config());
                let rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                    None => StdRng::from_entropy(),
                };
                let zone = EmotionZone::new(biome.emotion().as_str(), width, length, zone_center(i, width, length));
                Ok((zone, Terrain::with_config(*biome, config, width, length, rng)?))
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Self { width, length, regions })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn set_debug(&mut self, debug: bool) {
        for (_, terrain) in &mut self.regions {
            terrain.set_debug(debug);
        }
    }

    pub fn terrain(&self, biome: Biome) -> Option<&Terrain> {
        self.regions.iter().map(|(_, t)| t).find(|t| t.biome() == biome)
    }

    pub fn zone(&self, biome: Biome) -> Option<&EmotionZone> {
        self.regions.iter().find(|(_, t)| t.biome() == biome).map(|(z, _)| z)
    }

    /// Which biome a world-space position falls in. Shared edges resolve to
    /// the first zone in `Biome::ALL` order.
    pub fn zone_at(&self, position: &Position) -> Option<Biome> {
        self.regions
            .iter()
            .find(|(zone, _)| zone.contains(position))
            .map(|(_, terrain)| terrain.biome())
    }

    /// Routes every entry to the biome of its emotion, reconciles all four
    /// terrains and returns world-space placements aligned with `entries`.
    pub fn sync(&mut self, entries: &[JournalEntry]) -> Vec<PlacedEntry> {
        let mut per_biome: HashMap<Biome, std::vec::IntoIter<PlacedEntry>> = HashMap::new();
        for (zone, terrain) in &mut self.regions {
            let biome = terrain.biome();
            let emotion = biome.emotion();
            let placed: Vec<PlacedEntry> = terrain
                .reconcile(entries.iter().filter(|e| e.emotion == emotion))
                .into_iter()
                .map(|mut p| {
                    p.position = zone.center.offset(&p.position);
                    p
                })
                .collect();
            per_biome.insert(biome, placed.into_iter());
        }

        let mut result = Vec::with_capacity(entries.len());
        for entry in entries {
            let biome = Biome::for_emotion(entry.emotion);
            if let Some(placed) = per_biome.get_mut(&biome).and_then(|iter| iter.next()) {
                result.push(placed);
            }
        }
        result
    }

    pub fn dispose(&mut self) {
        for (_, terrain) in &mut self.regions {
            terrain.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Emotion;
    use crate::{TERRAIN_LENGTH, TERRAIN_WIDTH};

    fn entry(id: &str, emotion: &str) -> JournalEntry {
        JournalEntry::with_id(id, "2024-05-01", "Some memory", "", "journal", emotion).unwrap()
    }

    fn mixed_entries() -> Vec<JournalEntry> {
        vec![
            entry("h1", "Happy"),
            entry("s1", "Sad"),
            entry("a1", "Angry"),
            entry("n1", "Neutral"),
            entry("h2", "Happy"),
            entry("a2", "Angry"),
        ]
    }

    #[test]
    fn zones_tile_the_world() {
        let world = World::with_seed(TERRAIN_WIDTH, TERRAIN_LENGTH, 1).unwrap();
        assert_eq!(world.zone_at(&Position::ground(-50.0, -50.0)), Some(Biome::Beach));
        assert_eq!(world.zone_at(&Position::ground(50.0, -50.0)), Some(Biome::Meadow));
        assert_eq!(world.zone_at(&Position::ground(-50.0, 50.0)), Some(Biome::Ruins));
        assert_eq!(world.zone_at(&Position::ground(50.0, 50.0)), Some(Biome::Volcanic));
        assert_eq!(world.zone_at(&Position::ground(101.0, 0.0)), None);
        assert_eq!(world.zone(Biome::Ruins).map(|z| z.name.as_str()), Some("Sad"));
    }

    #[test]
    fn entries_land_in_their_emotion_zone() {
        let mut world = World::with_seed(TERRAIN_WIDTH, TERRAIN_LENGTH, 21).unwrap();
        let entries = mixed_entries();
        let placed = world.sync(&entries);

        assert_eq!(placed.len(), entries.len());
        for (entry, p) in entries.iter().zip(&placed) {
            assert_eq!(p.entry_id, entry.id);
            assert_eq!(p.biome.emotion(), entry.emotion);
            assert_eq!(world.zone_at(&p.position), Some(p.biome), "{:?}", p);
        }
        assert_eq!(world.terrain(Biome::Beach).map(|t| t.cache().len()), Some(2));
        assert_eq!(world.terrain(Biome::Meadow).map(|t| t.cache().len()), Some(1));
    }

    #[test]
    fn other_biomes_are_untouched_by_changes() {
        let mut world = World::with_seed(TERRAIN_WIDTH, TERRAIN_LENGTH, 4).unwrap();
        let mut entries = mixed_entries();
        let before = world.sync(&entries);

        entries.push(entry("s2", "Sad"));
        entries.retain(|e| e.id != "h1");
        let after = world.sync(&entries);

        for p in &after {
            if let Some(old) = before.iter().find(|b| b.entry_id == p.entry_id) {
                assert_eq!(old.position, p.position);
            }
        }
        assert!(!world.terrain(Biome::Beach).map_or(true, |t| t.cache().contains("h1")));
        assert_eq!(after.iter().filter(|p| p.biome == Biome::Ruins).count(), 2);
    }

    #[test]
    fn configs_override_single_biome() {
        let mut custom = Biome::Ruins.config();
        custom.model_path = "/models/willow.glb".to_string();
        let mut configs = HashMap::new();
        configs.insert(Biome::Ruins, custom);

        let mut world = World::with_configs(&configs, TERRAIN_WIDTH, TERRAIN_LENGTH, Some(2)).unwrap();
        let placed = world.sync(&[entry("s", "Sad"), entry("h", "Happy")]);
        assert_eq!(placed[0].model_path, "/models/willow.glb");
        assert_eq!(placed[1].model_path, "/models/happy/Palmtree.glb");
        assert_eq!(placed[1].biome.emotion(), Emotion::Happy);
    }

    #[test]
    fn invalid_override_fails_construction() {
        let mut broken = Biome::Volcanic.config();
        broken.placement.cell_size = 0.0;
        let mut configs = HashMap::new();
        configs.insert(Biome::Volcanic, broken);

        let err = World::with_configs(&configs, TERRAIN_WIDTH, TERRAIN_LENGTH, Some(3)).unwrap_err();
        assert_eq!(err, "Volcanic: cell_size must be positive");
        assert!(World::new(0.0, TERRAIN_LENGTH).is_err());
    }

    #[test]
    fn dispose_clears_every_terrain() {
        let mut world = World::with_seed(TERRAIN_WIDTH, TERRAIN_LENGTH, 6).unwrap();
        world.sync(&mixed_entries());
        world.dispose();
        for biome in Biome::ALL {
            assert!(world.terrain(biome).map_or(false, |t| t.cache().is_empty()));
        }
    }
}
