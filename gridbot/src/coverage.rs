use std::collections::HashSet;

use log::{debug, info};

use crate::bfs;
use crate::error::GridError;
use crate::grid::{GridMap, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageState {
    Exploring,
    /// No unvisited cell is reachable any more
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Free cells of the grid, reachable or not
    pub accessible: usize,
    pub visited: usize,
    /// Visited share of the accessible cells, in percent
    pub completeness: f64,
    pub total_steps: usize,
    /// Moves beyond the `visited - 1` a perfect sweep needs, so a sweep that never
    /// revisits a cell scores 0
    pub redundant_steps: usize,
    pub walk: Vec<Point>,
}

/// Frontier exploration: repeatedly walk to the nearest unvisited cell found by BFS.
#[derive(Debug)]
pub struct CoverageExplorer<'a> {
    map: &'a GridMap,
    position: Point,
    visited: HashSet<Point>,
    walk: Vec<Point>,
    state: CoverageState,
}

impl<'a> CoverageExplorer<'a> {
    pub fn new(map: &'a GridMap, start: Point) -> Result<Self, GridError> {
        if map.is_obstacle(start)? {
            return Err(GridError::Blocked(start));
        }

        Ok(Self {
            map,
            position: start,
            visited: HashSet::from([start]),
            walk: vec![start],
            state: CoverageState::Exploring,
        })
    }

    /// Search for the nearest unvisited cell and walk the whole way there
    pub fn step(&mut self) -> Result<CoverageState, GridError> {
        if self.state == CoverageState::Complete {
            return Ok(self.state);
        }

        let visited = &self.visited;
        let found = bfs::find_nearest(self.map, self.position, |p| !visited.contains(&p))?;

        match found.into_path() {
            Some(result) => {
                debug!("walking {} steps to {}", result.steps(), result.goal);
                for &p in &result.path[1..] {
                    self.visited.insert(p);
                    self.walk.push(p);
                }
                self.position = result.goal;
            }
            None => {
                info!(
                    "coverage complete: {} cells visited in {} steps",
                    self.visited.len(),
                    self.walk.len() - 1
                );
                self.state = CoverageState::Complete;
            }
        }

        Ok(self.state)
    }

    pub fn finish(mut self) -> Result<CoverageReport, GridError> {
        while self.step()? != CoverageState::Complete {}
        Ok(self.report())
    }

    pub fn report(&self) -> CoverageReport {
        let accessible = self.map.free_cells();
        let total_steps = self.walk.len() - 1;
        let visited = self.visited.len();

        CoverageReport {
            accessible,
            visited,
            completeness: visited as f64 / accessible as f64 * 100.0,
            total_steps,
            redundant_steps: total_steps - (visited - 1),
            walk: self.walk.clone(),
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn visited(&self) -> &HashSet<Point> {
        &self.visited
    }

    pub fn state(&self) -> CoverageState {
        self.state
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn test_open_3x3_without_backtracking() {
        let map = GridMap::new(3, 3, 1);
        let report = CoverageExplorer::new(&map, Point::new(0, 0))
            .unwrap()
            .finish()
            .unwrap();

        assert_eq!(report.visited, 9);
        assert_eq!(report.total_steps, 8);
        assert_eq!(report.redundant_steps, 0);
        assert_eq!(report.completeness, 100.0);
        assert_eq!(report.walk.last(), Some(&Point::new(1, 1)));
    }

    #[test]
    fn test_obstacle_course() {
        let map = Scenario::obstacle_course().grid.build().unwrap();
        let report = CoverageExplorer::new(&map, Point::new(0, 0))
            .unwrap()
            .finish()
            .unwrap();

        assert_eq!(report.accessible, 86);
        assert_eq!(report.visited, 86);
        assert_eq!(report.total_steps, 111);
        assert_eq!(report.redundant_steps, 26);
        for pair in report.walk.windows(2) {
            assert_eq!(pair[0].manhattan(pair[1]), 1);
            assert_eq!(map.is_obstacle(pair[1]), Ok(false));
        }
    }

    #[test]
    fn test_unreachable_pocket() {
        // the bottom right corner is sealed off
        let map = GridMap::with_obstacles(3, 3, [Point::new(1, 2), Point::new(2, 1)]).unwrap();
        let mut explorer = CoverageExplorer::new(&map, Point::new(0, 0)).unwrap();

        while explorer.step().unwrap() == CoverageState::Exploring {}
        assert!(!explorer.visited().contains(&Point::new(2, 2)));

        let report = explorer.report();
        assert_eq!(report.accessible, 7);
        assert_eq!(report.visited, 6);
        assert!(report.completeness < 100.0);
    }

    #[test]
    fn test_blocked_start() {
        let map = GridMap::with_obstacles(2, 2, [Point::new(0, 0)]).unwrap();
        assert!(matches!(
            CoverageExplorer::new(&map, Point::new(0, 0)),
            Err(GridError::Blocked(_))
        ));
    }
}
