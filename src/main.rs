//! Thin CLI entry point: parses flags, initializes logging, and hands off to
//! the UCI loop. All search/eval/TT logic lives in the `engine` library
//! crate — unlike the teacher's `main.rs`, which reimplements the whole
//! engine standalone instead of depending on its own lib crate.

use clap::Parser;
use engine::uci::Uci;

/// Fixed-depth alpha-beta chess engine speaking a minimal UCI subset.
#[derive(Parser, Debug)]
#[command(name = "corvid", about = "A fixed-depth, handcrafted-evaluation chess engine")]
struct Args {
    /// Default search depth for `go` when no `depth` argument is given.
    #[arg(long, default_value_t = 3)]
    depth: i32,

    /// Maximum number of transposition table entries.
    #[arg(long, default_value_t = engine::tt::MAX_TT_SIZE)]
    tt_size: usize,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut uci = Uci::with_config(args.depth, args.tt_size);
    if let Err(e) = uci.run(stdin.lock(), stdout.lock()) {
        log::error!("UCI loop terminated: {}", e);
        std::process::exit(1);
    }
}
