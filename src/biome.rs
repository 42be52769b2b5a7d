use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::models::Emotion;
use crate::obstacles::{Anchor, ObstacleSpec};
use crate::placement::{PlacementConfig, PlacementStrategy, ScanOrder};
use crate::{GRID_CELL_SIZE, MAX_GRID_CELLS, MAX_PLACEMENT_ATTEMPTS};

// --- Biome Enum ---

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    Beach,    // Happy - palm trees around the cabana
    Meadow,   // Neutral - trees between a lattice of mossy rocks
    Ruins,    // Sad - fallen trees among rocks and pillars
    Volcanic, // Angry - dead trees between boulders and geysers
}

impl Biome {
    pub const ALL: [Biome; 4] = [Biome::Beach, Biome::Meadow, Biome::Ruins, Biome::Volcanic];

    pub fn emotion(&self) -> Emotion {
        match self {
            Biome::Beach => Emotion::Happy,
            Biome::Meadow => Emotion::Neutral,
            Biome::Ruins => Emotion::Sad,
            Biome::Volcanic => Emotion::Angry,
        }
    }

    pub fn for_emotion(emotion: Emotion) -> Self {
        match emotion {
            Emotion::Happy => Biome::Beach,
            Emotion::Neutral => Biome::Meadow,
            Emotion::Sad => Biome::Ruins,
            Emotion::Angry => Biome::Volcanic,
        }
    }

    pub fn config(&self) -> BiomeConfig {
        // every variant is inserted below
        BIOME_CONFIGS[self].clone()
    }
}

// --- Biome Configuration ---

/// Everything one terrain needs to lay out its entries.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BiomeConfig {
    pub name: String,
    pub obstacles: Vec<ObstacleSpec>,
    pub placement: PlacementConfig,
    /// Render payload handed through with every placed entry.
    pub model_path: String,
    pub model_scale: f32,
}

impl BiomeConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: BiomeConfig =
            serde_json::from_str(json).map_err(|e| format!("Invalid biome config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| e.to_string())
    }

    pub fn validate(&self) -> Result<(), String> {
        let placement = &self.placement;
        if !non_negative(placement.clearance) {
            return Err(format!("{}: clearance must be non-negative", self.name));
        }
        if !positive(placement.cell_size) {
            return Err(format!("{}: cell_size must be positive", self.name));
        }
        if !non_negative(placement.fallback_span) {
            return Err(format!("{}: fallback_span must be non-negative", self.name));
        }
        match placement.strategy {
            PlacementStrategy::RandomRejection { margin } => {
                if !margin.is_finite() {
                    return Err(format!("{}: margin must be finite", self.name));
                }
            }
            PlacementStrategy::GridScan { margin, spacing, .. } => {
                if !margin.is_finite() || !positive(spacing) {
                    return Err(format!("{}: grid scan spacing must be positive", self.name));
                }
            }
        }
        if !positive(self.model_scale) {
            return Err(format!("{}: model_scale must be positive", self.name));
        }
        for spec in &self.obstacles {
            let bad_entry = match spec {
                ObstacleSpec::Scattered { margin, min_radius, max_radius, .. } => {
                    !margin.is_finite() || !non_negative(*min_radius) || !non_negative(*max_radius)
                }
                ObstacleSpec::Landmark { offset, radius, .. } => {
                    !offset.x.is_finite() || !offset.z.is_finite() || !non_negative(*radius)
                }
                ObstacleSpec::Lattice { margin, radius, spacing, .. } => {
                    !margin.is_finite() || !non_negative(*radius) || !positive(*spacing)
                }
            };
            if bad_entry {
                return Err(format!("{}: invalid obstacle entry {:?}", self.name, spec));
            }
        }
        Ok(())
    }

    /// `validate` plus the checks that depend on the terrain size: the
    /// dimensions themselves and how many cells, lattice points and
    /// obstacles they produce.
    pub fn validate_for(&self, width: f32, length: f32) -> Result<(), String> {
        self.validate()?;
        if !positive(width) || !positive(length) {
            return Err(format!("{}: terrain dimensions must be positive, got {}x{}", self.name, width, length));
        }

        let cells = lattice_size(width, length, 0.0, self.placement.cell_size);
        if cells > MAX_GRID_CELLS {
            return Err(format!(
                "{}: cell_size {} gives {} grid cells on {}x{} terrain",
                self.name, self.placement.cell_size, cells, width, length
            ));
        }
        if let PlacementStrategy::GridScan { margin, spacing, .. } = self.placement.strategy {
            if lattice_size(width, length, margin, spacing) > MAX_GRID_CELLS {
                return Err(format!("{}: grid scan spacing {} is too fine", self.name, spacing));
            }
        }

        let obstacle_count: f64 = self
            .obstacles
            .iter()
            .map(|spec| match spec {
                ObstacleSpec::Scattered { count, .. } => *count as f64,
                ObstacleSpec::Landmark { .. } => 1.0,
                ObstacleSpec::Lattice { margin, spacing, .. } => lattice_size(width, length, *margin, *spacing),
            })
            .sum();
        if obstacle_count > MAX_GRID_CELLS {
            return Err(format!("{}: manifest produces {} obstacles", self.name, obstacle_count));
        }
        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

// Upper estimate of the points a `spacing` lattice puts on the margin-reduced terrain.
fn lattice_size(width: f32, length: f32, margin: f32, spacing: f32) -> f64 {
    let per_axis = |extent: f32| ((extent as f64 - 2.0 * margin as f64).max(0.0) / spacing as f64).ceil() + 1.0;
    per_axis(width) * per_axis(length)
}

/// Parses a JSON object keyed by biome name. Biomes missing from the
/// document keep their built-in configuration.
pub fn load_biome_configs(json: &str) -> Result<HashMap<Biome, BiomeConfig>, String> {
    let overrides: HashMap<Biome, BiomeConfig> =
        serde_json::from_str(json).map_err(|e| format!("Invalid biome config document: {}", e))?;
    let mut configs = BIOME_CONFIGS.clone();
    for (biome, config) in overrides {
        config.validate()?;
        log::info!("Using configured layout for biome {:?} ({})", biome, config.name);
        configs.insert(biome, config);
    }
    Ok(configs)
}

fn random_rejection(clearance: f32, margin: f32, fallback_span: f32) -> PlacementConfig {
    PlacementConfig {
        clearance,
        max_attempts: MAX_PLACEMENT_ATTEMPTS,
        cell_size: GRID_CELL_SIZE,
        strategy: PlacementStrategy::RandomRejection { margin },
        fallback_span,
    }
}

fn grid_scan(spacing: f32, x_order: ScanOrder, z_order: ScanOrder) -> PlacementConfig {
    PlacementConfig {
        clearance: 4.0,
        // the scan itself is finite; cap it well above a 100x100 lattice
        max_attempts: 256,
        cell_size: GRID_CELL_SIZE,
        strategy: PlacementStrategy::GridScan { margin: 5.0, spacing, x_order, z_order },
        fallback_span: 10.0,
    }
}

lazy_static! {
    pub static ref BIOME_CONFIGS: HashMap<Biome, BiomeConfig> = {
        let mut configs = HashMap::new();

        configs.insert(Biome::Beach, BiomeConfig {
            name: "Beach".to_string(),
            obstacles: vec![
                ObstacleSpec::landmark("lighthouse", Anchor::MinXMinZ, 8.0, 8.0, 5.0),
                ObstacleSpec::landmark("beach_chair", Anchor::MinXMinZ, 40.0, 13.0, 2.0),
                ObstacleSpec::landmark("sandcastle", Anchor::MinXMaxZ, 8.0, -8.0, 3.0),
                ObstacleSpec::landmark("seagull", Anchor::MinXMinZ, 37.0, 44.0, 1.0),
                ObstacleSpec::landmark("cabana", Anchor::Center, 0.0, 0.0, 10.0),
                ObstacleSpec::landmark("beach_ball", Anchor::MinXMinZ, 40.0, 40.0, 1.0),
                ObstacleSpec::landmark("beach_ball", Anchor::MinXMinZ, 32.0, 42.0, 1.0),
            ],
            placement: grid_scan(8.0, ScanOrder::Descending, ScanOrder::Descending),
            model_path: "/models/happy/Palmtree.glb".to_string(),
            model_scale: 2.0,
        });

        configs.insert(Biome::Meadow, BiomeConfig {
            name: "Meadow".to_string(),
            obstacles: vec![ObstacleSpec::lattice("mossy_rock", 10.0, 10.0, 5.0)],
            placement: grid_scan(10.0, ScanOrder::Descending, ScanOrder::Ascending),
            model_path: "/models/tree.glb".to_string(),
            model_scale: 3.0,
        });

        configs.insert(Biome::Ruins, BiomeConfig {
            name: "Ruins".to_string(),
            obstacles: vec![
                ObstacleSpec::scattered("jagged_rock", 6, 5.0, 1.5, 3.0),
                ObstacleSpec::scattered("weathered_pillar", 4, 6.0, 1.5, 2.0),
                ObstacleSpec::scattered("crumbled_ruin", 5, 4.0, 2.0, 3.0),
                ObstacleSpec::scattered("withered_stump", 3, 3.0, 1.0, 1.5),
            ],
            placement: random_rejection(4.0, 3.0, 10.0),
            model_path: "/models/FallTree.glb".to_string(),
            model_scale: 1.0,
        });

        configs.insert(Biome::Volcanic, BiomeConfig {
            name: "Volcanic".to_string(),
            obstacles: vec![
                ObstacleSpec::scattered("molten_boulder", 8, 4.0, 1.5, 2.5),
                ObstacleSpec::scattered("lava_geyser", 5, 6.0, 2.0, 3.0),
                ObstacleSpec::scattered("obsidian_spire", 6, 5.0, 1.0, 2.0),
                ObstacleSpec::scattered("charred_remains", 4, 3.0, 1.5, 2.0),
            ],
            placement: random_rejection(6.0, 4.0, 15.0), // dead trees need more room
            model_path: "/models/deadTree.glb".to_string(),
            model_scale: 0.8,
        });

        configs
    };
}
