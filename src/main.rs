use std::fs::File;
use std::path::PathBuf;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use coup_table::{Agent, CoupError, RandomAgent, Table, TableConfig};

/// Plays batches of games between random agents and reports wins per seat.
#[derive(Parser, Debug)]
#[command(name = "coup-table")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: usize,

    /// Seats at the table, overrides the config file
    #[arg(long)]
    players: Option<usize>,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Table config as json, missing fields use the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the last game's history here as csv
    #[arg(long)]
    history: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CoupError> {
    let mut config = match &cli.config {
        Some(path) => TableConfig::from_json_file(path)?,
        None => TableConfig::default(),
    };
    if let Some(num_players) = cli.players {
        config.num_players = num_players;
    }
    config.validate()?;

    let mut rng = Pcg64::seed_from_u64(cli.seed);
    let mut wins = vec![0usize; config.num_players];
    let mut unfinished = 0;
    let mut last_table = None;

    for game in 0..cli.games {
        let mut table = Table::new(config.clone(), &mut rng)?;
        let mut agents: Vec<Box<dyn Agent>> = (0..config.num_players)
            .map(|_| Box::new(RandomAgent::new(Pcg64::seed_from_u64(rng.gen()))) as Box<dyn Agent>)
            .collect();

        match table.play(&mut agents, &mut rng)? {
            Some(winner) => wins[winner] += 1,
            None => unfinished += 1,
        }
        log::debug!("game {game} took {} turns", table.turn() + 1);

        last_table = Some(table);
    }

    for (seat, count) in wins.iter().enumerate() {
        println!("{}: {count} wins", config.player_name(seat));
    }
    if unfinished > 0 {
        println!("{unfinished} game(s) hit the turn limit");
    }

    if let (Some(path), Some(table)) = (&cli.history, &last_table) {
        table.history().write_csv(File::create(path)?)?;
        log::info!("wrote history to {}", path.display());
    }

    Ok(())
}
