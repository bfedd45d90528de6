//! Single-agent grid-world pathfinding.
//!
//! * [`grid`]: 4-connected grids with terrain costs or obstacles
//! * [`find`]: search traits and weighted A* ([`PathFinder`])
//! * [`bfs`]: breadth-first shortest path and nearest-target search
//! * [`knowledge`] and [`explore`]: A* replanning under partial observability
//! * [`coverage`]: BFS frontier exploration of every reachable cell
//! * [`walls`]: a reactive agent that finds the four grid boundaries

pub mod bfs;
pub mod coverage;
pub mod error;
pub mod explore;
pub mod find;
pub mod grid;
pub mod knowledge;
pub mod scenario;
pub mod util;
pub mod walls;

pub use coverage::{CoverageExplorer, CoverageReport, CoverageState};
pub use error::GridError;
pub use explore::{ExplorationController, ExplorationReport, ExploreState};
pub use find::{
    MapStorage, MapTrait, NodeReference, PathFinder, PathFinderState, PathResult, Reached,
    ReachedItem,
};
pub use grid::{Cell, CellStorage, Direction, GridMap, Point};
pub use knowledge::KnowledgeMap;
pub use scenario::{GridSpec, Scenario};
pub use walls::{WallFlags, WallFollower, WallHit, WallReport, WallStep};
