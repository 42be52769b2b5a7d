use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::Position;
use crate::obstacles::Obstacle;
use crate::spatial_grid::SpatialGrid;
use crate::{GRID_CELL_SIZE, MAX_PLACEMENT_ATTEMPTS};

// --- Configuration ---

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScanOrder {
    Ascending,
    Descending,
}

/// How candidate positions are generated. Both strategies share the same
/// clearance and obstacle checks.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind")]
pub enum PlacementStrategy {
    /// Uniform samples inside the margin-reduced terrain.
    RandomRejection { margin: f32 },
    /// Lattice points at `spacing`, x in the outer loop and z in the inner.
    GridScan {
        margin: f32,
        spacing: f32,
        x_order: ScanOrder,
        z_order: ScanOrder,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlacementConfig {
    /// Minimum centre-to-centre distance between two entries.
    pub clearance: f32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    pub strategy: PlacementStrategy,
    /// Side of the square around the centre used when every candidate failed.
    pub fallback_span: f32,
}

fn default_max_attempts() -> u32 {
    MAX_PLACEMENT_ATTEMPTS
}

fn default_cell_size() -> f32 {
    GRID_CELL_SIZE
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            clearance: 4.0,
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
            cell_size: GRID_CELL_SIZE,
            strategy: PlacementStrategy::RandomRejection { margin: 3.0 },
            fallback_span: 10.0,
        }
    }
}

// --- Diagnostics ---

/// Receives placement events. Implementations must not influence placement.
pub trait PlacementDiagnostics {
    fn placement_attempted(&mut self, _existing: usize, _width: f32, _length: f32) {}

    fn placement_succeeded(&mut self, _position: &Position, _attempts: u32) {}

    fn fallback_used(&mut self, position: &Position, attempts: u32);
}

impl PlacementDiagnostics for () {
    fn fallback_used(&mut self, _position: &Position, _attempts: u32) {}
}

/// Forwards events to the `log` facade. Per-placement tracing only when
/// `debug` is set; fallbacks always warn.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics {
    pub debug: bool,
}

impl PlacementDiagnostics for LogDiagnostics {
    fn placement_attempted(&mut self, existing: usize, width: f32, length: f32) {
        if self.debug {
            log::debug!(
                "Placing new entry on {:.1}x{:.1} terrain with {} existing entries",
                width,
                length,
                existing
            );
        }
    }

    fn placement_succeeded(&mut self, position: &Position, attempts: u32) {
        if self.debug {
            log::debug!(
                "New entry placed at ({:.2}, {:.2}, {:.2}) after {} attempts",
                position.x,
                position.y,
                position.z,
                attempts
            );
        }
    }

    fn fallback_used(&mut self, position: &Position, attempts: u32) {
        log::warn!(
            "Could not find suitable position for new entry after {} attempts, using fallback ({:.2}, {:.2})",
            attempts,
            position.x,
            position.z
        );
    }
}

// --- Candidate generation ---

/// Uniform position inside `[-w/2+m, w/2-m] × [-l/2+m, l/2-m]` at ground
/// level. A margin larger than the half extent collapses that axis to 0.
pub fn random_position<R: Rng + ?Sized>(width: f32, length: f32, margin: f32, rng: &mut R) -> Position {
    let half_x = width / 2.0 - margin;
    let half_z = length / 2.0 - margin;
    Position::ground(sample_symmetric(half_x, rng), sample_symmetric(half_z, rng))
}

fn sample_symmetric<R: Rng + ?Sized>(half: f32, rng: &mut R) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..=half)
    } else {
        0.0
    }
}

/// Lattice points inside the margin-reduced terrain. Descending axes start at
/// the max edge, ascending ones at the min edge.
pub fn lattice_points(
    width: f32,
    length: f32,
    margin: f32,
    spacing: f32,
    x_order: ScanOrder,
    z_order: ScanOrder,
) -> Vec<Position> {
    let xs = axis_steps(width / 2.0 - margin, spacing, x_order);
    let zs = axis_steps(length / 2.0 - margin, spacing, z_order);
    let mut points = Vec::with_capacity(xs.len() * zs.len());
    for &x in &xs {
        for &z in &zs {
            points.push(Position::ground(x, z));
        }
    }
    points
}

fn axis_steps(half: f32, spacing: f32, order: ScanOrder) -> Vec<f32> {
    if !(spacing > 0.0) || !(half >= 0.0) {
        return Vec::new();
    }
    // epsilon keeps exact multiples of `spacing` from losing their last step
    let steps = ((2.0 * half) / spacing + 1e-4).floor() as usize;
    (0..=steps)
        .map(|i| match order {
            ScanOrder::Descending => half - i as f32 * spacing,
            ScanOrder::Ascending => -half + i as f32 * spacing,
        })
        .collect()
}

// --- Engine ---

/// What a grid cell holds during a placement pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Occupant {
    Entry,
    Obstacle { exclusion_radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementOutcome {
    pub position: Position,
    pub attempts: u32,
    pub used_fallback: bool,
}

/// Builds the per-pass grid from committed entries and obstacles.
pub fn build_occupancy_grid(
    existing: &[Position],
    obstacles: &[Obstacle],
    width: f32,
    length: f32,
    cell_size: f32,
) -> SpatialGrid<Occupant> {
    let mut grid = SpatialGrid::new(width, length, cell_size);
    for position in existing {
        grid.insert(*position, Occupant::Entry);
    }
    for obstacle in obstacles {
        grid.insert(
            obstacle.position,
            Occupant::Obstacle { exclusion_radius: obstacle.exclusion_radius },
        );
    }
    grid
}

/// Cells to scan around a candidate so that nothing within `clearance` or
/// any obstacle radius is missed. Never less than 1.
pub fn search_radius_cells(clearance: f32, obstacles: &[Obstacle], cell_size: f32) -> usize {
    let reach = obstacles
        .iter()
        .map(|o| o.exclusion_radius)
        .fold(clearance, f32::max);
    if !(cell_size > 0.0) || !(reach > 0.0) {
        return 1;
    }
    ((reach / cell_size).ceil() as usize).max(1)
}

pub fn is_position_clear(
    grid: &SpatialGrid<Occupant>,
    candidate: &Position,
    clearance: f32,
    search_radius: usize,
) -> bool {
    let clearance_sq = clearance * clearance;
    grid.query_neighbors(candidate, search_radius).iter().all(|neighbor| {
        let dist_sq = candidate.distance_sq_xz(&neighbor.position);
        match neighbor.payload {
            Occupant::Entry => dist_sq >= clearance_sq,
            Occupant::Obstacle { exclusion_radius } => dist_sq >= exclusion_radius * exclusion_radius,
        }
    })
}

/// Finds a position for one new entry. First-fit over the strategy's
/// candidates; after `max_attempts` misses (or a finished scan) returns an
/// unchecked position near the centre and reports it as a fallback.
pub fn place_new_entry<R, D>(
    existing: &[Position],
    obstacles: &[Obstacle],
    width: f32,
    length: f32,
    config: &PlacementConfig,
    rng: &mut R,
    diagnostics: &mut D,
) -> PlacementOutcome
where
    R: Rng + ?Sized,
    D: PlacementDiagnostics + ?Sized,
{
    diagnostics.placement_attempted(existing.len(), width, length);

    let grid = build_occupancy_grid(existing, obstacles, width, length, config.cell_size);
    let search_radius = search_radius_cells(config.clearance, obstacles, config.cell_size);
    let mut attempts: u32 = 0;

    let found = match &config.strategy {
        PlacementStrategy::RandomRejection { margin } => {
            let mut found = None;
            while attempts < config.max_attempts {
                attempts += 1;
                let candidate = random_position(width, length, *margin, rng);
                if is_position_clear(&grid, &candidate, config.clearance, search_radius) {
                    found = Some(candidate);
                    break;
                }
            }
            found
        }
        PlacementStrategy::GridScan { margin, spacing, x_order, z_order } => {
            let mut found = None;
            let candidates = lattice_points(width, length, *margin, *spacing, *x_order, *z_order);
            for candidate in candidates.into_iter().take(config.max_attempts as usize) {
                attempts += 1;
                if is_position_clear(&grid, &candidate, config.clearance, search_radius) {
                    found = Some(candidate);
                    break;
                }
            }
            found
        }
    };

    match found {
        Some(position) => {
            diagnostics.placement_succeeded(&position, attempts);
            PlacementOutcome { position, attempts, used_fallback: false }
        }
        None => {
            let position = random_position(config.fallback_span, config.fallback_span, 0.0, rng);
            diagnostics.fallback_used(&position, attempts);
            PlacementOutcome { position, attempts, used_fallback: true }
        }
    }
}
