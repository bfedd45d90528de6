use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    fmt::Debug,
    ops::{Deref, DerefMut},
};

use log::debug;

use crate::error::GridError;

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be copy, comparable and not references (hence 'static)
pub trait NodeReference: Copy + Eq + Debug + 'static {}

pub trait MapTrait {
    /// The type that can be used to reference nodes in the map
    type Reference: NodeReference;

    /// The type that the map uses for storage
    type Storage<T: Default + Copy + Clone + 'static>: MapStorage<T, Reference = Self::Reference>;

    /// Fails with [`GridError::InvalidCell`] if the node is not part of the map
    fn validate(&self, node: Self::Reference) -> Result<(), GridError>;

    /// Return an iterator over the neighbors of the provided node and the cost of entering them
    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = (Self::Reference, usize)>;

    /// Lower bound on the cost of going from `from` to `to`
    fn heuristic(&self, from: Self::Reference, to: Self::Reference) -> usize;

    /// Create a storage for values of type T
    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T>;
}

pub trait MapStorage<T> {
    type Reference: NodeReference;

    fn get(&self, node: Self::Reference) -> T;
    fn get_mut(&mut self, node: Self::Reference) -> &mut T;
}

/// The objects that we store in the priority queue
#[derive(Debug)]
struct ToVisit<R> {
    estimate: usize,
    // insertion counter, equal estimates are served first-in first-out
    order: u64,
    point: R,
}

impl<R> Ord for ToVisit<R> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // reverse for BinaryHeap to be a min-heap
        self.estimate
            .cmp(&other.estimate)
            .then(self.order.cmp(&other.order))
            .reverse()
    }
}

impl<R> PartialOrd for ToVisit<R> {
    fn partial_cmp(&self, other: &ToVisit<R>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> PartialEq for ToVisit<R> {
    fn eq(&self, other: &ToVisit<R>) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<R> Eq for ToVisit<R> {}

/// Best known way of reaching a node: accumulated cost and predecessor
#[derive(Clone, Copy, Debug)]
pub struct ReachedItem<R> {
    pub cost: usize,
    pub from: Option<R>,
}

/// `None` means the node has not been reached yet, i.e. an infinite g-score
#[derive(Clone, Copy, Debug)]
pub struct Reached<R>(pub(crate) Option<ReachedItem<R>>);

impl<R> Default for Reached<R> {
    fn default() -> Self {
        Reached(None)
    }
}
impl<R> Deref for Reached<R> {
    type Target = Option<ReachedItem<R>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<R> DerefMut for Reached<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult<R> {
    /// From start to goal, both included
    pub path: Vec<R>,
    pub start: R,
    pub goal: R,
    /// Sum of the costs of entering every cell after the start
    pub total_cost: usize,
}

impl<R> PathResult<R> {
    /// Number of moves along the path
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState<R> {
    Computing,
    NoPathFound,
    PathFound(PathResult<R>),
}

impl<R> PathFinderState<R> {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }

    pub fn path(&self) -> Option<&PathResult<R>> {
        match self {
            PathFinderState::PathFound(result) => Some(result),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<PathResult<R>> {
        match self {
            PathFinderState::PathFound(result) => Some(result),
            _ => None,
        }
    }
}

/// Walk a predecessor chain back from `goal` and return it in start-to-goal order.
/// Stops at the first node without a predecessor.
pub(crate) fn backtrack<R: Copy>(goal: R, mut predecessor: impl FnMut(R) -> Option<R>) -> Vec<R> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(from) = predecessor(current) {
        path.push(from);
        current = from;
    }
    path.reverse();
    path
}

/// Weighted A* search driven one expansion at a time.
///
/// The frontier is a binary heap ordered by `f = g + h` where `h` is the map's heuristic.
/// There is no closed set: whenever a cheaper way into a node is found its g-score and
/// predecessor are overwritten and the node is pushed again, so the heap may hold stale
/// entries. A popped node is always expanded with its current best g-score.
#[derive(Debug)]
pub struct PathFinder<
    R: NodeReference,
    S: MapStorage<Reached<R>, Reference = R>,
    M: MapTrait<Reference = R, Storage<Reached<R>> = S>,
> {
    start: R,
    goal: R,
    reached: S,
    visit_list: BinaryHeap<ToVisit<R>>,
    pushed: u64,
    expanded: usize,
    state: PathFinderState<R>,
    _map: std::marker::PhantomData<M>,
}

impl<
        R: NodeReference,
        S: MapStorage<Reached<R>, Reference = R>,
        M: MapTrait<Reference = R, Storage<Reached<R>> = S>,
    > PathFinder<R, S, M>
{
    /// `start` must be a valid node of the map that created `reached`.
    pub fn new(start: R, goal: R, mut reached: S) -> Self {
        *reached.get_mut(start) = Reached(Some(ReachedItem {
            cost: 0,
            from: None,
        }));

        Self {
            start,
            goal,
            reached,
            visit_list: BinaryHeap::from([ToVisit {
                estimate: 0,
                order: 0,
                point: start,
            }]),
            pushed: 1,
            expanded: 0,
            state: PathFinderState::Computing,
            _map: std::marker::PhantomData,
        }
    }

    pub fn finish(mut self, map: &M) -> (PathFinderState<R>, S) {
        loop {
            match self.step(map) {
                PathFinderState::Computing => {}
                s => return (s, self.reached),
            }
        }
    }

    pub fn step(&mut self, map: &M) -> PathFinderState<R> {
        if self.state.is_done() {
            return self.state.clone();
        }

        let Some(visit) = self.visit_list.pop() else {
            debug!(
                "a* exhausted the frontier after {} expansions, {:?} unreachable",
                self.expanded, self.goal
            );
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        };
        self.expanded += 1;

        // every pushed node has been reached, so this is always Some
        let Some(current) = *self.reached.get(visit.point) else {
            return self.state.clone();
        };

        if visit.point == self.goal {
            let reached = &self.reached;
            let path = backtrack(self.goal, |p| reached.get(p).and_then(|item| item.from));

            debug!(
                "a* reached {:?} with cost {} after {} expansions",
                self.goal, current.cost, self.expanded
            );

            self.state = PathFinderState::PathFound(PathResult {
                path,
                total_cost: current.cost,
                start: self.start,
                goal: self.goal,
            });
            return self.state.clone();
        }

        for (point, move_cost) in map.neighbors_of(visit.point) {
            let tentative = current.cost + move_cost;
            let improves = match *self.reached.get(point) {
                Some(known) => tentative < known.cost,
                None => true,
            };

            if improves {
                *self.reached.get_mut(point) = Reached(Some(ReachedItem {
                    cost: tentative,
                    from: Some(visit.point),
                }));
                self.visit_list.push(ToVisit {
                    estimate: tentative + map.heuristic(point, self.goal),
                    order: self.pushed,
                    point,
                });
                self.pushed += 1;
            }
        }

        self.state.clone()
    }

    pub fn state(&self) -> &PathFinderState<R> {
        &self.state
    }

    pub fn get_reached(&self) -> &S {
        &self.reached
    }

    /// Number of heap pops so far, stale entries included
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn start(&self) -> R {
        self.start
    }

    pub fn goal(&self) -> R {
        self.goal
    }
}

/// Run A* from `start` to `goal` to completion
pub fn find_path<M: MapTrait>(
    map: &M,
    start: M::Reference,
    goal: M::Reference,
) -> Result<PathFinderState<M::Reference>, GridError> {
    map.validate(start)?;
    map.validate(goal)?;

    let reached = map.create_storage::<Reached<M::Reference>>();
    let finder: PathFinder<_, _, M> = PathFinder::new(start, goal, reached);
    Ok(finder.finish(map).0)
}
