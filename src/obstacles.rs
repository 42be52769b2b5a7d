use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::Position;
use crate::placement::{lattice_points, random_position, ScanOrder};

/// A decorative terrain feature that entries must keep clear of.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub kind: String,
    pub position: Position,
    pub exclusion_radius: f32,
}

/// Reference point a landmark offset is measured from.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Anchor {
    Center,
    MinXMinZ,
    MinXMaxZ,
    MaxXMinZ,
    MaxXMaxZ,
}

impl Anchor {
    pub fn resolve(&self, width: f32, length: f32) -> Position {
        let hx = width / 2.0;
        let hz = length / 2.0;
        match self {
            Anchor::Center => Position::ORIGIN,
            Anchor::MinXMinZ => Position::ground(-hx, -hz),
            Anchor::MinXMaxZ => Position::ground(-hx, hz),
            Anchor::MaxXMinZ => Position::ground(hx, -hz),
            Anchor::MaxXMaxZ => Position::ground(hx, hz),
        }
    }
}

/// One category in a biome's obstacle manifest.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "layout")]
pub enum ObstacleSpec {
    /// `count` obstacles uniformly inside the margin-reduced terrain.
    Scattered {
        kind: String,
        count: u32,
        margin: f32,
        min_radius: f32,
        max_radius: f32,
    },
    /// A single obstacle at a fixed offset from an anchor.
    Landmark {
        kind: String,
        anchor: Anchor,
        offset: Position,
        radius: f32,
    },
    /// One obstacle per lattice point, scanning down from the max corner.
    Lattice {
        kind: String,
        margin: f32,
        spacing: f32,
        radius: f32,
    },
}

impl ObstacleSpec {
    pub fn scattered(kind: &str, count: u32, margin: f32, min_radius: f32, max_radius: f32) -> Self {
        ObstacleSpec::Scattered { kind: kind.to_string(), count, margin, min_radius, max_radius }
    }

    pub fn landmark(kind: &str, anchor: Anchor, dx: f32, dz: f32, radius: f32) -> Self {
        ObstacleSpec::Landmark { kind: kind.to_string(), anchor, offset: Position::ground(dx, dz), radius }
    }

    pub fn lattice(kind: &str, margin: f32, spacing: f32, radius: f32) -> Self {
        ObstacleSpec::Lattice { kind: kind.to_string(), margin, spacing, radius }
    }
}

/// Builds the obstacle set for one terrain. Obstacles may overlap each other.
pub fn generate_obstacles<R: Rng + ?Sized>(
    width: f32,
    length: f32,
    manifest: &[ObstacleSpec],
    rng: &mut R,
) -> Vec<Obstacle> {
    let mut obstacles = Vec::new();
    for spec in manifest {
        match spec {
            ObstacleSpec::Scattered { kind, count, margin, min_radius, max_radius } => {
                let lo = min_radius.min(*max_radius);
                let hi = min_radius.max(*max_radius);
                for _ in 0..*count {
                    let position = random_position(width, length, *margin, rng);
                    let exclusion_radius = rng.gen_range(lo..=hi);
                    obstacles.push(Obstacle { kind: kind.clone(), position, exclusion_radius });
                }
            }
            ObstacleSpec::Landmark { kind, anchor, offset, radius } => {
                obstacles.push(Obstacle {
                    kind: kind.clone(),
                    position: anchor.resolve(width, length).offset(offset),
                    exclusion_radius: *radius,
                });
            }
            ObstacleSpec::Lattice { kind, margin, spacing, radius } => {
                let points = lattice_points(
                    width,
                    length,
                    *margin,
                    *spacing,
                    ScanOrder::Descending,
                    ScanOrder::Descending,
                );
                for position in points {
                    obstacles.push(Obstacle { kind: kind.clone(), position, exclusion_radius: *radius });
                }
            }
        }
    }
    obstacles
}

/// Obstacle set memoised on terrain dimensions.
#[derive(Debug, Default, Clone)]
pub struct ObstacleRegistry {
    dimensions: Option<(f32, f32)>,
    obstacles: Vec<Obstacle>,
}

impl ObstacleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the obstacle set for `width` × `length`, generating it only
    /// when the dimensions differ from the last call.
    pub fn ensure<R: Rng + ?Sized>(
        &mut self,
        width: f32,
        length: f32,
        manifest: &[ObstacleSpec],
        rng: &mut R,
    ) -> &[Obstacle] {
        if self.dimensions != Some((width, length)) {
            self.obstacles = generate_obstacles(width, length, manifest, rng);
            self.dimensions = Some((width, length));
            log::info!(
                "Generated {} obstacles for {:.1}x{:.1} terrain",
                self.obstacles.len(),
                width,
                length
            );
        }
        &self.obstacles
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn dimensions(&self) -> Option<(f32, f32)> {
        self.dimensions
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.dimensions = None;
    }
}
