use crate::models::Position;

/// Occupant record stored in a cell.
#[derive(Debug, Clone)]
pub struct GridEntry<T> {
    pub position: Position,
    pub payload: T,
}

#[derive(Debug, Clone)]
pub struct GridCell<T> {
    pub entities: Vec<GridEntry<T>>,
}

/// Uniform grid over a terrain rectangle centred on the origin. Rebuilt for
/// every placement pass, so there is no removal.
#[derive(Debug, Clone)]
pub struct SpatialGrid<T> {
    cells: Vec<GridCell<T>>,
    cols: usize,
    rows: usize,
    cell_size: f32,
}

impl<T> SpatialGrid<T> {
    pub fn new(width: f32, length: f32, cell_size: f32) -> Self {
        let cols = (width / cell_size).ceil().max(0.0) as usize;
        let rows = (length / cell_size).ceil().max(0.0) as usize;
        let mut cells = Vec::with_capacity(cols * rows);
        for _ in 0..(cols * rows) {
            cells.push(GridCell { entities: Vec::new() });
        }
        Self { cells, cols, rows, cell_size }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Unclamped (col, row) of the cell containing `position`. The grid
    /// extent is `cols * cell_size`, which may overhang the terrain.
    pub fn get_cell_coords(&self, position: &Position) -> (isize, isize) {
        let extent_x = self.cols as f32 * self.cell_size;
        let extent_z = self.rows as f32 * self.cell_size;
        let col = ((position.x + extent_x / 2.0) / self.cell_size).floor() as isize;
        let row = ((position.z + extent_z / 2.0) / self.cell_size).floor() as isize;
        (col, row)
    }

    pub fn get_cell_index(&self, position: &Position) -> Option<usize> {
        let (col, row) = self.get_cell_coords(position);
        if col < 0 || row < 0 || col >= self.cols as isize || row >= self.rows as isize {
            return None;
        }
        Some(row as usize * self.cols + col as usize)
    }

    /// Positions outside the grid are dropped without error.
    pub fn insert(&mut self, position: Position, payload: T) {
        if let Some(index) = self.get_cell_index(&position) {
            self.cells[index].entities.push(GridEntry { position, payload });
        }
    }

    pub fn get_entities_at(&self, position: &Position) -> &[GridEntry<T>] {
        if let Some(index) = self.get_cell_index(position) {
            &self.cells[index].entities
        } else {
            &[]
        }
    }

    /// All occupants of cells within Chebyshev distance `radius` of the cell
    /// containing `position`, clipped to the grid.
    pub fn query_neighbors(&self, position: &Position, radius: usize) -> Vec<&GridEntry<T>> {
        let mut result = Vec::new();
        if self.cols == 0 || self.rows == 0 {
            return result;
        }
        let (col, row) = self.get_cell_coords(position);
        let r = radius as isize;
        let row_start = (row - r).max(0);
        let row_end = (row + r).min(self.rows as isize - 1);
        let col_start = (col - r).max(0);
        let col_end = (col + r).min(self.cols as isize - 1);
        for ny in row_start..=row_end {
            for nx in col_start..=col_end {
                let index = (ny as usize) * self.cols + (nx as usize);
                result.extend(self.cells[index].entities.iter());
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.cells.iter().map(|c| c.entities.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|c| c.entities.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_round_up() {
        let grid: SpatialGrid<u32> = SpatialGrid::new(52.0, 48.0, 5.0);
        assert_eq!(grid.cols(), 11);
        assert_eq!(grid.rows(), 10);
        assert!(grid.is_empty());
    }

    #[test]
    fn cell_index_is_centred_on_origin() {
        let grid: SpatialGrid<u32> = SpatialGrid::new(50.0, 50.0, 5.0);
        assert_eq!(grid.get_cell_coords(&Position::ground(-25.0, -25.0)), (0, 0));
        assert_eq!(grid.get_cell_coords(&Position::ground(0.0, 0.0)), (5, 5));
        assert_eq!(grid.get_cell_coords(&Position::ground(24.9, -0.1)), (9, 4));
        assert_eq!(grid.get_cell_index(&Position::ground(25.0, 0.0)), None);
    }

    #[test]
    fn out_of_bounds_inserts_are_dropped() {
        let mut grid = SpatialGrid::new(10.0, 10.0, 5.0);
        grid.insert(Position::ground(1.0, 1.0), 1);
        grid.insert(Position::ground(100.0, 0.0), 2);
        grid.insert(Position::ground(0.0, -5.01), 3);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.get_entities_at(&Position::ground(1.0, 1.0))[0].payload, 1);
        assert!(grid.get_entities_at(&Position::ground(100.0, 0.0)).is_empty());
    }

    #[test]
    fn neighbors_cover_block_and_clip_at_edges() {
        let mut grid = SpatialGrid::new(50.0, 50.0, 5.0);
        // one occupant per cell, payload = row * cols + col
        for row in 0..10 {
            for col in 0..10 {
                let x = col as f32 * 5.0 - 25.0 + 2.5;
                let z = row as f32 * 5.0 - 25.0 + 2.5;
                grid.insert(Position::ground(x, z), row * 10 + col);
            }
        }

        let centre = grid.query_neighbors(&Position::ground(2.5, 2.5), 1);
        let mut ids: Vec<i32> = centre.iter().map(|e| e.payload).collect();
        ids.sort();
        assert_eq!(ids, vec![44, 45, 46, 54, 55, 56, 64, 65, 66]);

        let corner = grid.query_neighbors(&Position::ground(-24.0, -24.0), 1);
        assert_eq!(corner.len(), 4);

        let wide = grid.query_neighbors(&Position::ground(2.5, 2.5), 2);
        assert_eq!(wide.len(), 25);

        // query from outside the grid only sees the clipped block
        let outside = grid.query_neighbors(&Position::ground(-26.0, 0.0), 1);
        assert_eq!(outside.len(), 3);
    }
}
