use std::collections::HashSet;
use std::fmt::Display;

use log::{debug, info};

use crate::error::GridError;
use crate::grid::{Direction, GridMap, Point};

/// One flag per heading: `hit_north` is set when a move while facing north would
/// leave the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallFlags {
    pub hit_north: bool,
    pub hit_east: bool,
    pub hit_south: bool,
    pub hit_west: bool,
}

impl WallFlags {
    pub fn get(&self, heading: Direction) -> bool {
        match heading {
            Direction::North => self.hit_north,
            Direction::East => self.hit_east,
            Direction::South => self.hit_south,
            Direction::West => self.hit_west,
        }
    }

    fn set(&mut self, heading: Direction) {
        match heading {
            Direction::North => self.hit_north = true,
            Direction::East => self.hit_east = true,
            Direction::South => self.hit_south = true,
            Direction::West => self.hit_west = true,
        }
    }

    pub fn all(&self) -> bool {
        self.hit_north && self.hit_east && self.hit_south && self.hit_west
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallStep {
    Moved(Point),
    /// The move was blocked by the grid boundary, the agent turned right in place
    HitWall(Direction),
    Done,
}

/// A boundary discovery and the position the agent was at when it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallHit {
    pub heading: Direction,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallReport {
    /// Moves plus turns
    pub steps: usize,
    pub moves: usize,
    pub hits: Vec<WallHit>,
    pub final_position: Point,
    pub landed: HashSet<Point>,
}

/// Reactive boundary finder: walk straight until the next move would leave the grid,
/// record that wall, turn right, repeat until a wall was hit in every heading.
/// Only the grid boundary counts as a wall, obstacles are ignored.
#[derive(Debug)]
pub struct WallFollower<'a> {
    map: &'a GridMap,
    position: Point,
    heading: Direction,
    flags: WallFlags,
    hits: Vec<WallHit>,
    landed: HashSet<Point>,
    steps: usize,
    moves: usize,
}

impl<'a> WallFollower<'a> {
    /// Starts facing north
    pub fn new(map: &'a GridMap, start: Point) -> Result<Self, GridError> {
        map.check(start)?;

        Ok(Self {
            map,
            position: start,
            heading: Direction::North,
            flags: WallFlags::default(),
            hits: Vec::with_capacity(4),
            landed: HashSet::from([start]),
            steps: 0,
            moves: 0,
        })
    }

    pub fn with_heading(mut self, heading: Direction) -> Self {
        self.heading = heading;
        self
    }

    pub fn step(&mut self) -> WallStep {
        if self.flags.all() {
            return WallStep::Done;
        }
        self.steps += 1;

        match self.map.step(self.position, self.heading) {
            Some(next) => {
                self.position = next;
                self.landed.insert(next);
                self.moves += 1;
                WallStep::Moved(next)
            }
            None => {
                let heading = self.heading;
                debug!("hit the {} wall at {}", heading, self.position);
                self.flags.set(heading);
                self.hits.push(WallHit {
                    heading,
                    position: self.position,
                });
                self.heading = heading.turn_right();

                if self.flags.all() {
                    info!("all four walls found after {} steps", self.steps);
                }
                WallStep::HitWall(heading)
            }
        }
    }

    pub fn finish(mut self) -> WallReport {
        while self.step() != WallStep::Done {}

        WallReport {
            steps: self.steps,
            moves: self.moves,
            hits: self.hits,
            final_position: self.position,
            landed: self.landed,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    pub fn flags(&self) -> WallFlags {
        self.flags
    }

    pub fn hits(&self) -> &[WallHit] {
        &self.hits
    }
}

impl Display for WallFollower<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.map.rows {
            for col in 0..self.map.columns {
                let p = Point::new(row, col);
                if p == self.position {
                    write!(f, "R")?;
                } else if self.landed.contains(&p) {
                    write!(f, "o")?;
                } else {
                    write!(f, ".")?;
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

    #[test]
    fn test_square_from_origin() {
        let map = GridMap::new(5, 5, 1);
        let mut agent = WallFollower::new(&map, Point::new(0, 0)).unwrap();

        // facing north in the top row: the very first step discovers the north wall
        assert_eq!(agent.step(), WallStep::HitWall(Direction::North));
        assert!(agent.flags().hit_north);
        assert!(agent.flags().get(Direction::North));
        assert!(!agent.flags().get(Direction::East));
        assert_eq!(agent.heading(), Direction::East);
        assert_eq!(agent.position(), Point::new(0, 0));

        let report = agent.finish();
        assert_eq!(report.steps, 4 + 3 * 4);
        assert_eq!(report.moves, 12);
        assert_eq!(
            report.hits,
            vec![
                WallHit {
                    heading: Direction::North,
                    position: Point::new(0, 0)
                },
                WallHit {
                    heading: Direction::East,
                    position: Point::new(0, 4)
                },
                WallHit {
                    heading: Direction::South,
                    position: Point::new(4, 4)
                },
                WallHit {
                    heading: Direction::West,
                    position: Point::new(4, 0)
                },
            ]
        );
        assert_eq!(report.final_position, Point::new(4, 0));
        assert_eq!(report.landed.len(), 13);
    }

    #[test]
    fn test_terminates_everywhere() {
        for n in 1..6 {
            let map = GridMap::new(n, n, 1);
            for row in 0..n {
                for col in 0..n {
                    let mut agent = WallFollower::new(&map, Point::new(row, col)).unwrap();
                    let mut steps = 0;
                    let mut first_turn = None;
                    while agent.step() != WallStep::Done {
                        steps += 1;
                        if first_turn.is_none() && agent.flags() != WallFlags::default() {
                            first_turn = Some(agent.flags());
                        }
                        assert!(steps <= 4 + 4 * n);
                    }
                    assert!(agent.flags().all());
                    // heading north first, so north is the first wall found
                    assert_eq!(
                        first_turn,
                        Some(WallFlags {
                            hit_north: true,
                            ..Default::default()
                        })
                    );
                }
            }
        }
    }

    #[test]
    fn test_done_is_sticky() {
        let map = GridMap::new(1, 1, 1);
        let mut agent = WallFollower::new(&map, Point::new(0, 0)).unwrap();
        for _ in 0..4 {
            assert!(matches!(agent.step(), WallStep::HitWall(_)));
        }
        assert_eq!(agent.step(), WallStep::Done);
        assert_eq!(agent.step(), WallStep::Done);
        assert_eq!(agent.hits().len(), 4);
    }

    #[test]
    fn test_custom_heading_and_display() {
        let map = GridMap::new(2, 3, 1);
        let agent = WallFollower::new(&map, Point::new(1, 1))
            .unwrap()
            .with_heading(Direction::East);
        let report = agent.finish();

        assert_eq!(report.hits[0].heading, Direction::East);
        assert_eq!(report.hits[0].position, Point::new(1, 2));
        assert!(report.hits.iter().all(|h| map.contains(h.position)));

        let mut agent = WallFollower::new(&map, Point::new(1, 0)).unwrap();
        agent.step();
        assert_eq!(agent.to_string(), "R..\no..\n");
    }

    #[test]
    fn test_start_outside() {
        let map = GridMap::new(2, 2, 1);
        assert!(WallFollower::new(&map, Point::new(2, 0)).is_err());
    }
}
