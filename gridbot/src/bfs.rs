use std::collections::VecDeque;

use log::debug;

use crate::error::GridError;
use crate::find::{
    backtrack, MapStorage, MapTrait, NodeReference, PathFinderState, PathResult, Reached,
    ReachedItem,
};

/// Unweighted breadth-first search driven one dequeue at a time.
///
/// The search stops as soon as a node satisfying `is_target` is *dequeued*. A node is
/// marked reached when it is enqueued, so it enters the queue at most once. Step
/// counts are therefore minimal, the reported `total_cost` is the traversal cost of
/// that minimal-step path, not the cheapest path.
pub struct BreadthFirst<R, S, M, G>
where
    R: NodeReference,
    S: MapStorage<Reached<R>, Reference = R>,
    M: MapTrait<Reference = R, Storage<Reached<R>> = S>,
    G: FnMut(R) -> bool,
{
    start: R,
    is_target: G,
    reached: S,
    queue: VecDeque<R>,
    expanded: usize,
    state: PathFinderState<R>,
    _map: std::marker::PhantomData<M>,
}

impl<R, S, M, G> BreadthFirst<R, S, M, G>
where
    R: NodeReference,
    S: MapStorage<Reached<R>, Reference = R>,
    M: MapTrait<Reference = R, Storage<Reached<R>> = S>,
    G: FnMut(R) -> bool,
{
    /// `start` must be a valid node of the map that created `reached`.
    pub fn new(start: R, is_target: G, mut reached: S) -> Self {
        *reached.get_mut(start) = Reached(Some(ReachedItem {
            cost: 0,
            from: None,
        }));

        Self {
            start,
            is_target,
            reached,
            queue: VecDeque::from([start]),
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

        let Some(current) = self.queue.pop_front() else {
            debug!("bfs exhausted the queue after {} expansions", self.expanded);
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        };
        self.expanded += 1;

        let cost = self.reached.get(current).map_or(0, |item| item.cost);

        if (self.is_target)(current) {
            let reached = &self.reached;
            let path = backtrack(current, |p| reached.get(p).and_then(|item| item.from));

            debug!(
                "bfs reached {:?} in {} steps after {} expansions",
                current,
                path.len() - 1,
                self.expanded
            );

            self.state = PathFinderState::PathFound(PathResult {
                path,
                start: self.start,
                goal: current,
                total_cost: cost,
            });
            return self.state.clone();
        }

        for (point, move_cost) in map.neighbors_of(current) {
            if self.reached.get(point).is_none() {
                *self.reached.get_mut(point) = Reached(Some(ReachedItem {
                    cost: cost + move_cost,
                    from: Some(current),
                }));
                self.queue.push_back(point);
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

    /// Number of nodes dequeued so far
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn start(&self) -> R {
        self.start
    }
}

/// Shortest path in number of steps from `start` to `goal`
pub fn find_path<M: MapTrait>(
    map: &M,
    start: M::Reference,
    goal: M::Reference,
) -> Result<PathFinderState<M::Reference>, GridError> {
    map.validate(start)?;
    map.validate(goal)?;

    if start == goal {
        return Ok(PathFinderState::PathFound(PathResult {
            path: vec![start],
            start,
            goal,
            total_cost: 0,
        }));
    }

    find_nearest(map, start, |p| p == goal)
}

/// Path to the closest node, in number of steps, for which `is_target` holds.
/// `start` itself is tested first.
pub fn find_nearest<M: MapTrait>(
    map: &M,
    start: M::Reference,
    is_target: impl FnMut(M::Reference) -> bool,
) -> Result<PathFinderState<M::Reference>, GridError> {
    map.validate(start)?;

    let reached = map.create_storage::<Reached<M::Reference>>();
    let search: BreadthFirst<_, _, M, _> = BreadthFirst::new(start, is_target, reached);
    Ok(search.finish(map).0)
}
