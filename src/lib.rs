//! Stable, collision-aware placement of journal entries across the four
//! emotion biomes.
//!
//! Every biome runs the same engine: obstacles from its manifest go into a
//! spatial grid together with the entries already placed, candidates come
//! from the biome's strategy, and a per-terrain cache makes sure an entry is
//! placed exactly once and never moves until it is deleted.

pub mod biome;
pub mod models;
pub mod obstacles;
pub mod placement;
pub mod position_cache;
pub mod spatial_grid;
pub mod terrain;
pub mod world;

pub use biome::{load_biome_configs, Biome, BiomeConfig, BIOME_CONFIGS};
pub use models::{Emotion, EmotionZone, JournalEntry, Position};
pub use obstacles::{Obstacle, ObstacleRegistry, ObstacleSpec};
pub use placement::{
    place_new_entry, LogDiagnostics, PlacementConfig, PlacementDiagnostics, PlacementOutcome,
    PlacementStrategy, ScanOrder,
};
pub use position_cache::{PositionCache, ReconcileStats};
pub use spatial_grid::SpatialGrid;
pub use terrain::{PlacedEntry, Terrain};
pub use world::World;

// --- World Constants ---

pub const TERRAIN_WIDTH: f32 = 100.0;
pub const TERRAIN_LENGTH: f32 = 100.0;

pub const GRID_CELL_SIZE: f32 = 5.0;
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100; // Bounds every placement when a terrain is nearly full
pub const MAX_GRID_CELLS: f64 = 1_048_576.0; // Upper bound for grid cells, lattice points and obstacles per terrain
