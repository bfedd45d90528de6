use std::collections::HashSet;

use log::{debug, info};

use crate::error::GridError;
use crate::find;
use crate::grid::{GridMap, Point};
use crate::knowledge::KnowledgeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreState {
    /// Next step senses the surroundings and replans
    Planning,
    /// A plan is available, next step commits its first move
    Stepping,
    /// No plan leads to the goal given what is known. Terminal.
    Stuck,
    /// The goal has been reached. Terminal.
    Done,
}

impl ExploreState {
    pub fn is_done(&self) -> bool {
        matches!(self, ExploreState::Stuck | ExploreState::Done)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorationReport {
    pub reached: bool,
    pub start: Point,
    pub goal: Point,
    /// Every position the agent occupied, start included
    pub path_taken: Vec<Point>,
    /// True cost of every move, the start cell is not charged
    pub total_cost: usize,
    pub distinct_visited: usize,
    pub known_cells: usize,
    pub replans: usize,
}

/// Online replanning under partial observability.
///
/// The agent only knows what it has sensed. Every cycle it senses its 4-neighborhood,
/// plans with A* over its [`KnowledgeMap`] (unknown cells are optimistically cheap),
/// then commits exactly one move of the plan and pays the true cost of the cell it
/// enters. The plan is thrown away after each move.
#[derive(Debug)]
pub struct ExplorationController<'a> {
    truth: &'a GridMap,
    knowledge: KnowledgeMap,
    start: Point,
    goal: Point,
    position: Point,
    path_taken: Vec<Point>,
    visited: HashSet<Point>,
    total_cost: usize,
    plan: Vec<Point>,
    replans: usize,
    state: ExploreState,
}

impl<'a> ExplorationController<'a> {
    pub fn new(truth: &'a GridMap, start: Point, goal: Point) -> Result<Self, GridError> {
        truth.check(goal)?;
        if truth.is_obstacle(start)? {
            return Err(GridError::Blocked(start));
        }

        Ok(Self {
            truth,
            knowledge: KnowledgeMap::for_grid(truth),
            start,
            goal,
            position: start,
            path_taken: vec![start],
            visited: HashSet::from([start]),
            total_cost: 0,
            plan: Vec::new(),
            replans: 0,
            state: if start == goal {
                ExploreState::Done
            } else {
                ExploreState::Planning
            },
        })
    }

    pub fn finish(mut self) -> Result<ExplorationReport, GridError> {
        while !self.step()?.is_done() {}
        Ok(self.report())
    }

    pub fn step(&mut self) -> Result<ExploreState, GridError> {
        match self.state {
            ExploreState::Stuck | ExploreState::Done => {}
            ExploreState::Planning => {
                self.knowledge.sense(self.truth, self.position)?;

                let planned = find::find_path(&self.knowledge, self.position, self.goal)?;
                self.replans += 1;

                match planned.into_path() {
                    Some(result) if result.path.len() >= 2 => {
                        debug!(
                            "at {} planned {} steps with expected cost {}",
                            self.position,
                            result.steps(),
                            result.total_cost
                        );
                        self.plan = result.path;
                        self.state = ExploreState::Stepping;
                    }
                    _ => {
                        info!(
                            "stuck at {} after {} moves, no known route to {}",
                            self.position,
                            self.path_taken.len() - 1,
                            self.goal
                        );
                        self.plan.clear();
                        self.state = ExploreState::Stuck;
                    }
                }
            }
            ExploreState::Stepping => {
                let Some(&next) = self.plan.get(1) else {
                    self.state = ExploreState::Stuck;
                    return Ok(self.state);
                };

                // the next cell is a sensed neighbor, so its true cost is the one planned with
                self.total_cost += self.truth.cost(next)?;
                self.position = next;
                self.path_taken.push(next);
                self.visited.insert(next);

                self.state = if next == self.goal {
                    info!(
                        "reached {} in {} moves with cost {}",
                        self.goal,
                        self.path_taken.len() - 1,
                        self.total_cost
                    );
                    ExploreState::Done
                } else {
                    ExploreState::Planning
                };
            }
        }

        Ok(self.state)
    }

    pub fn report(&self) -> ExplorationReport {
        ExplorationReport {
            reached: self.state == ExploreState::Done,
            start: self.start,
            goal: self.goal,
            path_taken: self.path_taken.clone(),
            total_cost: self.total_cost,
            distinct_visited: self.visited.len(),
            known_cells: self.knowledge.known_cells(),
            replans: self.replans,
        }
    }

    pub fn state(&self) -> ExploreState {
        self.state
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn knowledge(&self) -> &KnowledgeMap {
        &self.knowledge
    }

    pub fn path_taken(&self) -> &[Point] {
        &self.path_taken
    }

    pub fn visited(&self) -> &HashSet<Point> {
        &self.visited
    }

    /// The most recent plan, empty before the first plan and once stuck
    pub fn plan(&self) -> &[Point] {
        &self.plan
    }

    pub fn total_cost(&self) -> usize {
        self.total_cost
    }
}
