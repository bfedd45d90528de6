use crate::error::GridError;
use crate::find::{MapStorage, MapTrait, NodeReference};
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// The content of a single grid cell
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Obstacle,
    Free {
        // cost charged when moving *into* this cell, always >= 1
        cost: usize,
    },
}

impl Default for Cell {
    fn default() -> Self {
        Self::Free { cost: 1 }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Obstacle => write!(f, "#"),
            Cell::Free { cost: 1 } => write!(f, "."),
            Cell::Free { cost } if *cost < 10 => write!(f, "{}", cost),
            Cell::Free { .. } => write!(f, "+"),
        }
    }
}

/// Compass heading. Turning right cycles North -> East -> South -> West -> North.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Neighbor enumeration order used by every search: right, down, left, up.
    /// Only tie-breaking depends on it.
    pub const NEIGHBOR_ORDER: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// Rotate 90 degrees clockwise
    pub fn turn_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    /// (row, col) delta of one step in this heading. North is towards row 0.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::North => "north",
                Direction::East => "east",
                Direction::South => "south",
                Direction::West => "west",
            }
        )
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "north" | "up" => Ok(Direction::North),
            "east" | "right" => Ok(Direction::East),
            "south" | "down" => Ok(Direction::South),
            "west" | "left" => Ok(Direction::West),
            _ => Err(anyhow::anyhow!("Invalid direction: {}", s)),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance, the admissible heuristic for 4-connected grids
    pub fn manhattan(self, other: Point) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The point one step away in `direction`, or `None` if that would go below row/col 0.
    /// The upper bound is the grid's business.
    pub fn step(self, direction: Direction) -> Option<Point> {
        let (dr, dc) = direction.offset();
        Some(Point {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }
}

impl NodeReference for Point {}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A rectangular, 4-connected grid of cells. Serves both as a terrain cost grid and as
/// an obstacle grid (every free cell costs 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    pub rows: usize,
    pub columns: usize,
    pub cells: Vec<Vec<Cell>>,
}

impl GridMap {
    pub fn new(rows: usize, columns: usize, default_cost: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![vec![Cell::Free { cost: default_cost }; columns]; rows],
        }
    }

    /// Build a terrain grid from a table of traversal costs
    pub fn from_costs(costs: &[Vec<usize>]) -> Result<Self, GridError> {
        let columns = costs.first().map(|r| r.len()).unwrap_or(0);
        if columns == 0 {
            return Err(GridError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(costs.len());
        for (row, line) in costs.iter().enumerate() {
            if line.len() != columns {
                return Err(GridError::RaggedRows {
                    row,
                    expected: columns,
                    found: line.len(),
                });
            }
            let mut out = Vec::with_capacity(columns);
            for (col, &cost) in line.iter().enumerate() {
                if cost == 0 {
                    return Err(GridError::ZeroCost(Point::new(row, col)));
                }
                out.push(Cell::Free { cost });
            }
            cells.push(out);
        }

        Ok(Self {
            rows: costs.len(),
            columns,
            cells,
        })
    }

    /// Build a unit-cost grid with the given cells blocked
    pub fn with_obstacles(
        rows: usize,
        columns: usize,
        obstacles: impl IntoIterator<Item = Point>,
    ) -> Result<Self, GridError> {
        if rows == 0 || columns == 0 {
            return Err(GridError::EmptyGrid);
        }
        let mut map = Self::new(rows, columns, 1);
        for p in obstacles {
            map.check(p)?;
            map.cells[p.row][p.col] = Cell::Obstacle;
        }
        Ok(map)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.row < self.rows && p.col < self.columns
    }

    pub fn check(&self, p: Point) -> Result<(), GridError> {
        if self.contains(p) {
            Ok(())
        } else {
            Err(GridError::InvalidCell {
                point: p,
                rows: self.rows,
                columns: self.columns,
            })
        }
    }

    pub fn cell(&self, p: Point) -> Result<Cell, GridError> {
        self.check(p)?;
        Ok(self.cells[p.row][p.col])
    }

    /// Traversal cost of entering `p`
    pub fn cost(&self, p: Point) -> Result<usize, GridError> {
        match self.cell(p)? {
            Cell::Free { cost } => Ok(cost),
            Cell::Obstacle => Err(GridError::Blocked(p)),
        }
    }

    pub fn is_obstacle(&self, p: Point) -> Result<bool, GridError> {
        Ok(self.cell(p)? == Cell::Obstacle)
    }

    /// One step from `p` in `direction`, if the result is still on the grid
    pub fn step(&self, p: Point, direction: Direction) -> Option<Point> {
        p.step(direction).filter(|n| self.contains(*n))
    }

    /// In-bounds 4-neighbors of `p` in east, south, west, north order. Obstacles are included.
    pub fn neighbors(&self, p: Point) -> Result<impl Iterator<Item = Point> + '_, GridError> {
        self.check(p)?;
        Ok(Direction::NEIGHBOR_ORDER
            .into_iter()
            .filter_map(move |d| self.step(p, d)))
    }

    pub fn free_cells(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| **c != Cell::Obstacle)
            .count()
    }

    /// Sum of the costs of entering every cell of `path` after the first
    pub fn path_cost(&self, path: &[Point]) -> Result<usize, GridError> {
        path.iter().skip(1).map(|p| self.cost(*p)).sum()
    }

    /// Scales the map by the given factor, i.e. to make it twice as large, pass 2.
    /// Interpolates the cells by repeating the existing cells in the new grid.
    pub fn scale_up(&mut self, factor: usize) {
        let mut new_cells = vec![vec![Cell::default(); self.columns * factor]; self.rows * factor];

        for row in 0..self.rows {
            for col in 0..self.columns {
                for r in 0..factor {
                    for c in 0..factor {
                        new_cells[row * factor + r][col * factor + c] = self.cells[row][col];
                    }
                }
            }
        }

        self.rows *= factor;
        self.columns *= factor;
        self.cells = new_cells;
    }
}

impl Display for GridMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// A MapStorage laid out row-major in a single vec
#[derive(Debug, Clone)]
pub struct CellStorage<T> {
    columns: usize,
    values: Vec<T>,
}

impl<T: Clone> CellStorage<T> {
    pub fn new(rows: usize, columns: usize, value: T) -> Self {
        Self {
            columns,
            values: vec![value; rows * columns],
        }
    }
}

impl<T: Copy + 'static> MapStorage<T> for CellStorage<T> {
    type Reference = Point;

    fn get(&self, node: Self::Reference) -> T {
        self.values[node.row * self.columns + node.col]
    }

    fn get_mut(&mut self, node: Self::Reference) -> &mut T {
        &mut self.values[node.row * self.columns + node.col]
    }
}

impl MapTrait for GridMap {
    type Reference = Point;
    type Storage<T: Default + Copy + Clone + 'static> = CellStorage<T>;

    fn validate(&self, node: Self::Reference) -> Result<(), GridError> {
        self.check(node)
    }

    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = (Self::Reference, usize)> {
        let mut points = Vec::with_capacity(4);

        if self.cells[node.row][node.col] == Cell::Obstacle {
            return points.into_iter();
        }

        for d in Direction::NEIGHBOR_ORDER {
            if let Some(p) = self.step(node, d) {
                if let Cell::Free { cost } = self.cells[p.row][p.col] {
                    points.push((p, cost));
                }
            }
        }

        points.into_iter()
    }

    fn heuristic(&self, from: Self::Reference, to: Self::Reference) -> usize {
        from.manhattan(to)
    }

    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T> {
        CellStorage::new(self.rows, self.columns, T::default())
    }
}
