use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use popstar_exhaustive::diagnostics::{Distribution, SAMPLING_THRESHOLD};
use popstar_exhaustive::engine::{Board, Master};
use popstar_exhaustive::memo::HASH_SIZE;
use popstar_exhaustive::solver::{Solution, Solver, SolverConfig, THREAD_PERMISSION};
use popstar_exhaustive::utils::read_puzzle_file;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the puzzle file (up to 8 rows of digits 0-7, top row first)
    #[clap(default_value = "puzzle.txt")]
    puzzle: PathBuf,

    /// Solve a random full board generated from this seed instead of a file
    #[clap(long)]
    random: Option<u64>,

    /// Number of colours on a random board
    #[clap(long, default_value_t = 5)]
    colours: u32,

    /// Worker threads exploring first moves concurrently
    #[clap(short, long, default_value_t = THREAD_PERMISSION)]
    threads: usize,

    /// Bucket count of the memo store
    #[clap(long, default_value_t = HASH_SIZE)]
    buckets: usize,

    /// Bucket size above which the distribution report stops itemising
    #[clap(long, default_value_t = SAMPLING_THRESHOLD)]
    threshold: usize,

    /// Replay the solution without waiting for Enter between steps
    #[clap(long)]
    no_pause: bool,

    /// Also write the winning moves to this file
    #[clap(long)]
    solution: Option<PathBuf>,
}

fn load_board(args: &Args) -> Result<Board> {
    match args.random {
        Some(seed) => {
            info!("Generating random board from seed {}", seed);
            Ok(Board::new_random_with_seed(seed, args.colours))
        }
        None => {
            let board = read_puzzle_file(&args.puzzle)
                .map_err(|e| anyhow!(e))
                .context("Could not load the puzzle")?;
            println!("Puzzle loaded:\t[{}]", args.puzzle.display());
            Ok(board)
        }
    }
}

fn pause(enabled: bool) -> Result<()> {
    if enabled {
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
    }
    Ok(())
}

fn write_solution(path: &Path, solution: &Solution) -> Result<()> {
    let mut content = String::new();
    for (i, step) in solution.steps.iter().enumerate() {
        content.push_str(&format!(
            "Move {}: {} {} +{}\n",
            i + 1,
            step.mv.x,
            step.mv.y,
            step.gained
        ));
    }
    content.push_str(&format!("Bonus: +{}\n", solution.bonus));
    content.push_str(&format!("Final Score: {}\n", solution.score));
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let master = Master::new(load_board(&args)?);
    println!("{}\n", master.board());

    let solver = Solver::new(
        master,
        SolverConfig {
            threads: args.threads,
            buckets: args.buckets,
        },
    );
    let solution = solver.solve().map_err(|e| anyhow!(e))?;

    println!("\nFinal Score: {}", solution.score);
    println!(
        "{}",
        Distribution::from_sizes(&solver.store().bucket_sizes(), args.threshold)
    );

    if let Some(path) = &args.solution {
        write_solution(path, &solution)?;
        info!("Solution written to {}", path.display());
    }

    pause(!args.no_pause)?;
    for step in &solution.steps {
        println!("{}", step.board.to_string_with_highlight(Some(step.mv)));
        println!("Picking: {} Among {} (+{})", step.mv, step.options, step.gained);
        pause(!args.no_pause)?;
    }
    println!("{}", solution.final_board);
    println!("END (bonus +{})", solution.bonus);
    Ok(())
}
