//! Grid literals, scenario files and start/goal sampling.
//!
//! A scenario file is JSON, for example
//!
//! ```json
//! {
//!   "grid": { "kind": "obstacles", "rows": 4, "columns": 4, "obstacles": [{ "row": 1, "col": 1 }] },
//!   "start": { "row": 0, "col": 0 },
//!   "goal": { "row": 3, "col": 3 }
//! }
//! ```
//!
//! or with `"grid": { "kind": "costs", "costs": [[1, 2], [3, 1]] }` for a terrain grid.

use std::path::Path;

use anyhow::Context;
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::grid::{GridMap, Point};

/// Upper bound on rejection sampling rounds in [`sample_endpoints`]
pub const SAMPLE_ATTEMPTS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridSpec {
    /// Terrain cost table, one row per line
    Costs { costs: Vec<Vec<usize>> },
    /// Unit-cost grid with blocked cells
    Obstacles {
        rows: usize,
        columns: usize,
        #[serde(default)]
        obstacles: Vec<Point>,
    },
}

impl GridSpec {
    pub fn build(&self) -> Result<GridMap, GridError> {
        match self {
            GridSpec::Costs { costs } => GridMap::from_costs(costs),
            GridSpec::Obstacles {
                rows,
                columns,
                obstacles,
            } => GridMap::with_obstacles(*rows, *columns, obstacles.iter().copied()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub grid: GridSpec,
    #[serde(default)]
    pub start: Option<Point>,
    #[serde(default)]
    pub goal: Option<Point>,
}

impl Scenario {
    /// 11x10 terrain with cost classes 1 (plain), 2 (rough) and 3 (steep)
    pub fn terrain() -> Self {
        let costs = [
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 1, 1, 1, 1, 3, 1, 1, 1, 1],
            [1, 1, 2, 2, 1, 3, 3, 2, 1, 1],
            [1, 1, 2, 1, 3, 3, 3, 2, 1, 1],
            [1, 1, 2, 2, 3, 3, 3, 2, 2, 1],
            [1, 1, 1, 2, 3, 1, 2, 2, 1, 1],
            [1, 1, 1, 1, 2, 3, 1, 1, 1, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ];

        Self {
            grid: GridSpec::Costs {
                costs: costs.iter().map(|row| row.to_vec()).collect(),
            },
            start: None,
            goal: None,
        }
    }

    /// 10x10 unit-cost grid with 14 fixed obstacles
    pub fn obstacle_course() -> Self {
        let obstacles = [
            (0, 5),
            (1, 4),
            (1, 7),
            (2, 3),
            (3, 3),
            (4, 3),
            (4, 6),
            (5, 8),
            (6, 4),
            (7, 3),
            (7, 5),
            (7, 6),
            (8, 6),
            (9, 5),
        ];

        Self {
            grid: GridSpec::Obstacles {
                rows: 10,
                columns: 10,
                obstacles: obstacles
                    .iter()
                    .map(|&(row, col)| Point::new(row, col))
                    .collect(),
            },
            start: None,
            goal: None,
        }
    }

    pub fn open(rows: usize, columns: usize) -> Self {
        Self {
            grid: GridSpec::Obstacles {
                rows,
                columns,
                obstacles: Vec::new(),
            },
            start: None,
            goal: None,
        }
    }

    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }
}

/// Minimum start/goal separation used for the terrain exercises
pub fn far_apart(map: &GridMap) -> usize {
    (map.rows + map.columns) / 2
}

/// Draw a random start and goal: distinct, both free, at least `min_distance` apart
/// (Manhattan). Gives up after [`SAMPLE_ATTEMPTS`] rejected draws.
pub fn sample_endpoints<R: Rng>(
    map: &GridMap,
    rng: &mut R,
    min_distance: usize,
) -> Option<(Point, Point)> {
    if map.rows == 0 || map.columns == 0 {
        return None;
    }

    for _ in 0..SAMPLE_ATTEMPTS {
        let start = Point::new(rng.gen_range(0..map.rows), rng.gen_range(0..map.columns));
        let goal = Point::new(rng.gen_range(0..map.rows), rng.gen_range(0..map.columns));

        if start != goal
            && map.is_obstacle(start) == Ok(false)
            && map.is_obstacle(goal) == Ok(false)
            && start.manhattan(goal) >= min_distance
        {
            return Some((start, goal));
        }
    }

    warn!(
        "no start/goal pair at least {} apart after {} attempts",
        min_distance, SAMPLE_ATTEMPTS
    );
    None
}

#[cfg(test)]
mod test {

    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_presets() {
        let terrain = Scenario::terrain().grid.build().unwrap();
        assert_eq!((terrain.rows, terrain.columns), (11, 10));
        assert_eq!(terrain.cost(Point::new(2, 5)), Ok(3));
        assert_eq!(terrain.cost(Point::new(7, 4)), Ok(2));
        assert_eq!(far_apart(&terrain), 10);

        let course = Scenario::obstacle_course().grid.build().unwrap();
        assert_eq!(course.free_cells(), 86);
        assert_eq!(course.is_obstacle(Point::new(9, 5)), Ok(true));

        let open = Scenario::open(3, 4).grid.build().unwrap();
        assert_eq!(open, GridMap::new(3, 4, 1));
    }

    #[test]
    fn test_from_json() {
        let scenario = Scenario::from_json(
            r#"{
                "grid": { "kind": "obstacles", "rows": 4, "columns": 4,
                          "obstacles": [{ "row": 1, "col": 1 }] },
                "start": { "row": 0, "col": 0 },
                "goal": { "row": 3, "col": 3 }
            }"#,
        )
        .unwrap();
        assert_eq!(scenario.start, Some(Point::new(0, 0)));
        assert_eq!(scenario.goal, Some(Point::new(3, 3)));
        let map = scenario.grid.build().unwrap();
        assert_eq!(map.is_obstacle(Point::new(1, 1)), Ok(true));

        let scenario =
            Scenario::from_json(r#"{ "grid": { "kind": "costs", "costs": [[1, 2], [3, 1]] } }"#)
                .unwrap();
        assert_eq!(scenario.start, None);
        assert_eq!(scenario.grid.build().unwrap().cost(Point::new(1, 0)), Ok(3));

        assert!(Scenario::from_json(r#"{ "grid": { "kind": "hexagons" } }"#).is_err());
        // parses, but the literal is not a valid grid
        let ragged =
            Scenario::from_json(r#"{ "grid": { "kind": "costs", "costs": [[1, 2], [1]] } }"#)
                .unwrap();
        assert!(matches!(
            ragged.grid.build(),
            Err(GridError::RaggedRows { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Scenario::load("/nonexistent/scenario.json").unwrap_err();
        assert!(err.to_string().contains("reading scenario"));
    }

    #[test]
    fn test_sample_endpoints() {
        let map = Scenario::obstacle_course().grid.build().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let (start, goal) = sample_endpoints(&map, &mut rng, far_apart(&map)).unwrap();
            assert_ne!(start, goal);
            assert!(map.contains(start) && map.contains(goal));
            assert_eq!(map.is_obstacle(start), Ok(false));
            assert_eq!(map.is_obstacle(goal), Ok(false));
            assert!(start.manhattan(goal) >= 10);
        }
    }

    #[test]
    fn test_sample_is_seeded() {
        let map = Scenario::terrain().grid.build().unwrap();
        let a = sample_endpoints(&map, &mut StdRng::seed_from_u64(42), 0);
        let b = sample_endpoints(&map, &mut StdRng::seed_from_u64(42), 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_impossible() {
        let map = GridMap::new(2, 2, 1);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample_endpoints(&map, &mut rng, 3), None);

        let single = GridMap::new(1, 1, 1);
        assert_eq!(sample_endpoints(&single, &mut rng, 0), None);
    }
}
