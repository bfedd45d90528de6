use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use gridbot::scenario::{far_apart, sample_endpoints};
use gridbot::{
    bfs, find, util::load_img, CoverageExplorer, Direction, ExplorationController, GridMap,
    PathFinderState, Point, Scenario, WallFollower, WallStep,
};
use log::info;
use rand::{rngs::StdRng, SeedableRng};

#[derive(Parser)]
#[command(about = "Grid-world pathfinding exercises for a single agent")]
struct Options {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Source {
    /// JSON scenario replacing the built-in grid, may also fix start and goal
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Seed for drawing start and goal
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Walk until every grid boundary has been hit
    Walls {
        #[arg(long, default_value_t = 5)]
        size: usize,
        #[arg(long, default_value_t = 0)]
        row: usize,
        #[arg(long, default_value_t = 0)]
        col: usize,
        #[arg(long, default_value = "north")]
        heading: Direction,
    },
    /// Breadth-first shortest path
    Bfs {
        /// Use the obstacle course instead of an open 10x10 grid
        #[arg(long)]
        obstacles: bool,
        /// Thresholded image to use as obstacle grid
        #[arg(long)]
        image: Option<PathBuf>,
        #[command(flatten)]
        source: Source,
    },
    /// Visit every reachable cell by walking to the nearest unvisited one
    Coverage {
        #[arg(long)]
        image: Option<PathBuf>,
        #[command(flatten)]
        source: Source,
    },
    /// Cheapest path over the terrain grid with full knowledge
    Astar {
        #[command(flatten)]
        source: Source,
    },
    /// Cheapest path over the terrain grid, sensing only the 4-neighborhood
    Partial {
        #[command(flatten)]
        source: Source,
    },
}

fn load(
    source: &Source,
    default: Scenario,
    image: Option<&PathBuf>,
) -> anyhow::Result<(GridMap, Scenario)> {
    if let Some(path) = image {
        let map = load_img(path)?;
        return Ok((map, default));
    }
    let scenario = match &source.scenario {
        Some(path) => Scenario::load(path)?,
        None => default,
    };
    Ok((scenario.grid.build()?, scenario))
}

fn endpoints(
    map: &GridMap,
    scenario: &Scenario,
    seed: Option<u64>,
    min_distance: usize,
) -> anyhow::Result<(Point, Point)> {
    if let (Some(start), Some(goal)) = (scenario.start, scenario.goal) {
        return Ok((start, goal));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (start, goal) = sample_endpoints(map, &mut rng, min_distance)
        .ok_or_else(|| anyhow!("could not draw a start and goal on this grid"))?;

    Ok((
        scenario.start.unwrap_or(start),
        scenario.goal.unwrap_or(goal),
    ))
}

/// The grid with the path drawn over it: S start, G goal, * the cells in between
fn render_path(map: &GridMap, path: &[Point]) -> String {
    let mut lines: Vec<Vec<char>> = map
        .to_string()
        .lines()
        .map(|l| l.chars().collect())
        .collect();

    for p in path {
        lines[p.row][p.col] = '*';
    }
    if let (Some(start), Some(goal)) = (path.first(), path.last()) {
        lines[start.row][start.col] = 'S';
        lines[goal.row][goal.col] = 'G';
    }

    lines
        .into_iter()
        .map(|l| l.into_iter().collect::<String>() + "\n")
        .collect()
}

fn run_walls(size: usize, start: Point, heading: Direction) -> anyhow::Result<()> {
    let map = GridMap::new(size, size, 1);
    let mut agent = WallFollower::new(&map, start)?.with_heading(heading);

    while agent.step() != WallStep::Done {}

    println!("{}", agent);
    println!("Robot found all 4 walls.");
    for hit in agent.hits() {
        println!(
            "Before hitting the {} wall, robot was at: {}",
            hit.heading, hit.position
        );
    }
    Ok(())
}

fn run_bfs(map: &GridMap, scenario: &Scenario, seed: Option<u64>) -> anyhow::Result<()> {
    let (start, goal) = endpoints(map, scenario, seed, 0)?;
    println!("Objective: go from {} to {}", start, goal);

    match bfs::find_path(map, start, goal)? {
        PathFinderState::PathFound(result) => {
            println!("{}", render_path(map, &result.path));
            println!("  - Task Success: Yes");
            println!("  - Path Length: {} steps", result.steps());
        }
        _ => {
            println!("  - Task Success: No");
            println!("  - Path Length: N/A");
        }
    }
    Ok(())
}

fn run_coverage(map: &GridMap, scenario: &Scenario, seed: Option<u64>) -> anyhow::Result<()> {
    let start = match scenario.start {
        Some(start) => start,
        None => endpoints(map, scenario, seed, 0)?.0,
    };

    let report = CoverageExplorer::new(map, start)?.finish()?;

    println!("Exploration complete from {}", start);
    println!("  - Accessible cells: {}", report.accessible);
    println!("  - Visited cells: {}", report.visited);
    println!("  - Completeness: {:.2}%", report.completeness);
    println!("  - Total steps: {}", report.total_steps);
    println!("  - Redundant steps: {}", report.redundant_steps);
    Ok(())
}

fn run_astar(map: &GridMap, scenario: &Scenario, seed: Option<u64>) -> anyhow::Result<()> {
    let (start, goal) = endpoints(map, scenario, seed, far_apart(map))?;
    println!("Objective: find the minimum cost path from {} to {}", start, goal);

    match find::find_path(map, start, goal)? {
        PathFinderState::PathFound(result) => {
            println!("{}", render_path(map, &result.path));
            println!("  - Task Success: Yes");
            println!("  - Total Path Cost: {}", result.total_cost);
        }
        _ => println!("  - Task Success: No"),
    }
    Ok(())
}

fn run_partial(map: &GridMap, scenario: &Scenario, seed: Option<u64>) -> anyhow::Result<()> {
    let (start, goal) = endpoints(map, scenario, seed, far_apart(map))?;
    println!(
        "Objective: find a path from {} to {} with limited knowledge",
        start, goal
    );

    let mut controller = ExplorationController::new(map, start, goal)?;
    while !controller.step()?.is_done() {}

    println!("{}", controller.knowledge());
    let report = controller.report();
    info!(
        "{} replans, {} cells sensed, {} distinct cells visited",
        report.replans, report.known_cells, report.distinct_visited
    );

    if report.reached {
        println!("{}", render_path(map, &report.path_taken));
        println!("  - Task Success: Yes");
        println!("  - Total Path Cost: {}", report.total_cost);
    } else {
        println!("  - Task Success: No");
        println!("  - Cost before getting stuck: {}", report.total_cost);
    }
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Options::parse();

    match opt.command {
        Command::Walls {
            size,
            row,
            col,
            heading,
        } => run_walls(size, Point::new(row, col), heading),
        Command::Bfs {
            obstacles,
            image,
            source,
        } => {
            let default = if obstacles {
                Scenario::obstacle_course()
            } else {
                Scenario::open(10, 10)
            };
            let (map, scenario) = load(&source, default, image.as_ref())?;
            run_bfs(&map, &scenario, source.seed)
        }
        Command::Coverage { image, source } => {
            let (map, scenario) = load(&source, Scenario::obstacle_course(), image.as_ref())?;
            run_coverage(&map, &scenario, source.seed)
        }
        Command::Astar { source } => {
            let (map, scenario) = load(&source, Scenario::terrain(), None)?;
            run_astar(&map, &scenario, source.seed)
        }
        Command::Partial { source } => {
            let (map, scenario) = load(&source, Scenario::terrain(), None)?;
            run_partial(&map, &scenario, source.seed)
        }
    }
}
