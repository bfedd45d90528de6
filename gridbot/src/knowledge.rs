//! What the agent has learned about the ground truth so far.
//!
//! A [`KnowledgeMap`] starts fully unknown and only grows: [`KnowledgeMap::sense`] copies the
//! true content of the agent's cell and its in-bounds 4-neighbors from the ground truth.
//! For planning, every unknown cell is assumed free with cost 1, so the map can be handed
//! straight to the A* [`PathFinder`](crate::PathFinder).

use std::fmt::Display;

use crate::error::GridError;
use crate::find::{MapStorage, MapTrait};
use crate::grid::{Cell, CellStorage, Direction, GridMap, Point};

/// Cost assumed for cells that have not been sensed yet
pub const UNKNOWN_COST: usize = 1;

#[derive(Debug, Clone)]
pub struct KnowledgeMap {
    rows: usize,
    columns: usize,
    known: CellStorage<Option<Cell>>,
    known_cells: usize,
}

impl KnowledgeMap {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            known: CellStorage::new(rows, columns, None),
            known_cells: 0,
        }
    }

    /// An empty knowledge map with the same shape as `truth`
    pub fn for_grid(truth: &GridMap) -> Self {
        Self::new(truth.rows, truth.columns)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
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

    /// Reveal the true content of `at` and of its in-bounds 4-neighbors.
    /// Returns the revealed cells, `at` first. Sensing a known cell again is harmless.
    pub fn sense(&mut self, truth: &GridMap, at: Point) -> Result<Vec<Point>, GridError> {
        self.check(at)?;

        let mut revealed = vec![at];
        revealed.extend(truth.neighbors(at)?);

        // nothing is written unless every revealed cell fits this map
        let cells = revealed
            .iter()
            .map(|&p| {
                self.check(p)?;
                truth.cell(p)
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (&p, cell) in revealed.iter().zip(cells) {
            if self.known.get(p).is_none() {
                self.known_cells += 1;
            }
            *self.known.get_mut(p) = Some(cell);
        }

        Ok(revealed)
    }

    /// The sensed content of `p`, `None` while unknown
    pub fn known(&self, p: Point) -> Result<Option<Cell>, GridError> {
        self.check(p)?;
        Ok(self.known.get(p))
    }

    pub fn is_known(&self, p: Point) -> bool {
        self.contains(p) && self.known.get(p).is_some()
    }

    /// Number of distinct cells sensed so far
    pub fn known_cells(&self) -> usize {
        self.known_cells
    }

    /// Cost the planner charges for entering `p`. Unknown cells cost [`UNKNOWN_COST`],
    /// known obstacles cannot be entered.
    pub fn planning_cost(&self, p: Point) -> Option<usize> {
        match self.known.get(p) {
            None => Some(UNKNOWN_COST),
            Some(Cell::Free { cost }) => Some(cost),
            Some(Cell::Obstacle) => None,
        }
    }

    /// Materialize the planning view as a plain grid
    pub fn planning_grid(&self) -> GridMap {
        let mut grid = GridMap::new(self.rows, self.columns, UNKNOWN_COST);
        for (row, line) in grid.cells.iter_mut().enumerate() {
            for (col, cell) in line.iter_mut().enumerate() {
                if let Some(known) = self.known.get(Point::new(row, col)) {
                    *cell = known;
                }
            }
        }
        grid
    }
}

impl MapTrait for KnowledgeMap {
    type Reference = Point;
    type Storage<T: Default + Copy + Clone + 'static> = CellStorage<T>;

    fn validate(&self, node: Self::Reference) -> Result<(), GridError> {
        self.check(node)
    }

    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = (Self::Reference, usize)> {
        let mut points = Vec::with_capacity(4);

        if self.planning_cost(node).is_none() {
            return points.into_iter();
        }

        for d in Direction::NEIGHBOR_ORDER {
            let Some(p) = node.step(d).filter(|p| self.contains(*p)) else {
                continue;
            };
            if let Some(cost) = self.planning_cost(p) {
                points.push((p, cost));
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

impl Display for KnowledgeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.columns {
                match self.known.get(Point::new(row, col)) {
                    Some(cell) => write!(f, "{}", cell)?,
                    None => write!(f, "?")?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::find;
    use std::collections::HashSet;

    #[test]
    fn test_sense_corner() {
        let truth = GridMap::new(3, 3, 2);
        let mut knowledge = KnowledgeMap::for_grid(&truth);

        let revealed: HashSet<Point> = knowledge
            .sense(&truth, Point::new(0, 0))
            .unwrap()
            .into_iter()
            .collect();

        assert_eq!(
            revealed,
            HashSet::from([Point::new(0, 0), Point::new(0, 1), Point::new(1, 0)])
        );
        assert_eq!(knowledge.known_cells(), 3);
        assert!(!knowledge.is_known(Point::new(1, 1)));
        assert_eq!(
            knowledge.known(Point::new(0, 1)),
            Ok(Some(Cell::Free { cost: 2 }))
        );
    }

    #[test]
    fn test_sense_is_idempotent_and_monotonic() {
        let truth = GridMap::from_costs(&[vec![1, 2, 3], vec![3, 2, 1], vec![1, 1, 1]]).unwrap();
        let mut knowledge = KnowledgeMap::for_grid(&truth);

        knowledge.sense(&truth, Point::new(1, 1)).unwrap();
        assert_eq!(knowledge.known_cells(), 5);
        let before = knowledge.to_string();

        knowledge.sense(&truth, Point::new(1, 1)).unwrap();
        assert_eq!(knowledge.known_cells(), 5);
        assert_eq!(knowledge.to_string(), before);

        knowledge.sense(&truth, Point::new(2, 2)).unwrap();
        assert_eq!(knowledge.known_cells(), 6);
        assert_eq!(knowledge.to_string(), "?2?\n32.\n?..\n");
    }

    #[test]
    fn test_sense_out_of_bounds() {
        let truth = GridMap::new(2, 2, 1);
        let mut knowledge = KnowledgeMap::for_grid(&truth);
        assert!(matches!(
            knowledge.sense(&truth, Point::new(2, 0)),
            Err(GridError::InvalidCell { .. })
        ));
        assert_eq!(knowledge.known_cells(), 0);
    }

    #[test]
    fn test_sense_larger_truth_leaves_map_untouched() {
        let truth = GridMap::new(3, 3, 2);
        let mut knowledge = KnowledgeMap::new(2, 2);

        // (1, 1) fits, its east and south neighbors do not
        assert!(matches!(
            knowledge.sense(&truth, Point::new(1, 1)),
            Err(GridError::InvalidCell { .. })
        ));
        assert_eq!(knowledge.known_cells(), 0);
        assert!(!knowledge.is_known(Point::new(1, 1)));
        assert!(!knowledge.is_known(Point::new(0, 1)));
    }

    #[test]
    fn test_planning_view() {
        let truth = GridMap::from_costs(&[vec![1, 3], vec![2, 1]]).unwrap();
        let mut knowledge = KnowledgeMap::for_grid(&truth);

        // nothing known yet: everything plans at cost 1, never 0
        assert_eq!(knowledge.planning_cost(Point::new(0, 1)), Some(1));
        assert_eq!(knowledge.planning_grid(), GridMap::new(2, 2, 1));

        knowledge.sense(&truth, Point::new(0, 0)).unwrap();
        assert_eq!(knowledge.planning_cost(Point::new(0, 1)), Some(3));
        assert_eq!(knowledge.planning_cost(Point::new(1, 1)), Some(1));

        let n: Vec<_> = knowledge.neighbors_of(Point::new(1, 1)).collect();
        assert_eq!(n, vec![(Point::new(1, 0), 2), (Point::new(0, 1), 3)]);
    }

    #[test]
    fn test_known_obstacles_are_impassable() {
        let truth = GridMap::with_obstacles(1, 3, [Point::new(0, 1)]).unwrap();
        let mut knowledge = KnowledgeMap::for_grid(&truth);

        // optimistic while unknown
        assert!(find::find_path(&knowledge, Point::new(0, 0), Point::new(0, 2))
            .unwrap()
            .path()
            .is_some());

        knowledge.sense(&truth, Point::new(0, 0)).unwrap();
        assert_eq!(
            find::find_path(&knowledge, Point::new(0, 0), Point::new(0, 2)),
            Ok(find::PathFinderState::NoPathFound)
        );
    }

    #[test]
    fn test_planning_grid_matches_map_view() {
        let truth = GridMap::from_costs(&[vec![1, 3, 1], vec![2, 3, 1], vec![1, 1, 2]]).unwrap();
        let mut knowledge = KnowledgeMap::for_grid(&truth);
        knowledge.sense(&truth, Point::new(1, 1)).unwrap();

        let grid = knowledge.planning_grid();
        let a = find::find_path(&knowledge, Point::new(0, 0), Point::new(2, 2)).unwrap();
        let b = find::find_path(&grid, Point::new(0, 0), Point::new(2, 2)).unwrap();
        assert_eq!(a, b);
    }
}
