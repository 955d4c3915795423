use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::io::{self, Write};
use std::path::PathBuf;
use sweeper::{
    Action, Game, GameConfig, GameError, GameState, Outcome, Position, Preferences, Status,
};

#[derive(Parser, Debug)]
#[command(name = "sweeper", version, about = "Minesweeper in the terminal")]
struct Cli {
    /// Board preset, ignored when --rows/--columns/--mines are given
    #[arg(long, value_enum, default_value_t = Preset::Classic)]
    preset: Preset,

    #[arg(long, requires_all = ["columns", "mines"])]
    rows: Option<u32>,

    #[arg(long, requires_all = ["rows", "mines"])]
    columns: Option<u32>,

    #[arg(long, requires_all = ["rows", "columns"])]
    mines: Option<u32>,

    /// Seed for a reproducible mine layout
    #[arg(long)]
    seed: Option<u64>,

    /// Resume a game written with the `save` command
    #[arg(long)]
    load: Option<PathBuf>,

    /// Preferences file (defaults to the platform config directory)
    #[arg(long)]
    prefs: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Preset {
    Classic,
    Beginner,
    Intermediate,
    Expert,
}

impl Cli {
    fn config(&self) -> Result<GameConfig, GameError> {
        match (self.rows, self.columns, self.mines) {
            (Some(rows), Some(columns), Some(mines)) => GameConfig::new(rows, columns, mines),
            _ => Ok(match self.preset {
                Preset::Classic => GameConfig::classic(),
                Preset::Beginner => GameConfig::beginner(),
                Preset::Intermediate => GameConfig::intermediate(),
                Preset::Expert => GameConfig::expert(),
            }),
        }
    }

    fn preferences(&self) -> Preferences {
        match self.prefs.clone().or_else(Preferences::default_path) {
            Some(path) => Preferences::load(path),
            None => Preferences::in_memory(),
        }
    }
}

enum Command {
    Play(Position, Action),
    Save(PathBuf),
    Quit,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.verbose);

    match run_game(&cli) {
        Ok(_) => println!("Thanks for playing!"),
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn init_tracing(verbose: &Verbosity<WarnLevel>) {
    tracing_subscriber::fmt()
        .with_max_level(verbose.tracing_level_filter())
        .with_writer(io::stderr)
        .init();
}

fn run_game(cli: &Cli) -> Result<(), GameError> {
    let preferences = cli.preferences();
    let mut game = match &cli.load {
        Some(path) => Game::resume(&GameState::load(path)?, preferences)?,
        None => {
            let config = cli.config()?;
            match cli.seed {
                Some(seed) => Game::with_seed(config, seed, preferences)?,
                None => Game::new(config, preferences)?,
            }
        }
    };

    while !game.status().is_over() {
        print_board(&game);

        match get_user_input() {
            Some(Command::Play(pos, action)) => match game.perform_action(pos, action) {
                Ok(Outcome::HitMine) => println!("Game Over! You hit a mine."),
                Ok(Outcome::Won {
                    new_best: true, ..
                }) => println!("New best time!"),
                Ok(_) => {}
                Err(e) => println!("Error: {}", e),
            },
            Some(Command::Save(path)) => match game.snapshot().save(&path) {
                Ok(()) => println!("Saved to {}", path.display()),
                Err(e) => println!("Error: {}", e),
            },
            Some(Command::Quit) => return Ok(()),
            None => {}
        }
    }

    print_board(&game);
    match game.status() {
        Status::Won => println!("Congratulations! You won in {:.1}s!", game.elapsed()),
        Status::Lost => println!("Game Over!"),
        Status::Fresh | Status::Playing => unreachable!(),
    }

    Ok(())
}

fn print_board(game: &Game) {
    let grid = game.grid();
    let (rows, columns) = grid.dimensions();
    let show_mines = game.status() == Status::Lost;

    println!("Time: {:.1}", game.elapsed());
    match game.best_time() {
        Some(best) => println!("Best Time: {:.1}", best),
        None => println!("Best Time: N/A"),
    }
    println!("Mines left: {}", game.mines_remaining());

    // Column numbers
    print!("   ");
    for col in 0..columns {
        print!("{:>2}", col % 100);
    }
    println!();

    for row in 0..rows {
        print!("{:>2} ", row);
        for col in 0..columns {
            let pos = Position::new(row as i32, col as i32);
            let Ok(cell) = grid.get_cell(pos) else {
                continue;
            };
            let symbol = if grid.is_revealed(pos) || (show_mines && cell.is_mine()) {
                match (cell.is_mine(), cell.adjacent_mines()) {
                    (true, _) => "*".to_string(),
                    (false, 0) => " ".to_string(),
                    (false, n) => n.to_string(),
                }
            } else if grid.is_flagged(pos) {
                "⚑".to_string()
            } else {
                "□".to_string()
            };
            print!(" {}", symbol);
        }
        println!();
    }
}

fn get_user_input() -> Option<Command> {
    print!("Enter command (row col [r/f], save FILE, quit): ");
    io::stdout().flush().ok()?;

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => return Some(Command::Quit),
        Ok(_) => {}
        Err(_) => return None,
    }

    parse_command(&input)
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();

    match parts.next()? {
        "quit" | "q" => Some(Command::Quit),
        "save" => match parts.next() {
            Some(path) => Some(Command::Save(PathBuf::from(path))),
            None => {
                println!("Usage: save FILE");
                None
            }
        },
        row => {
            let row = row.parse().ok()?;
            let col = parts.next()?.parse().ok()?;
            let action = match parts.next().and_then(|a| a.chars().next()) {
                None | Some('r') => Action::Reveal,
                Some('f') => Action::Flag,
                Some(_) => {
                    println!("Invalid action. Use 'r' to reveal or 'f' to flag");
                    return None;
                }
            };
            Some(Command::Play(Position::new(row, col), action))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play_commands() {
        assert!(matches!(
            parse_command("3 4 f"),
            Some(Command::Play(Position { row: 3, col: 4 }, Action::Flag))
        ));
        assert!(matches!(
            parse_command("0 7"),
            Some(Command::Play(Position { row: 0, col: 7 }, Action::Reveal))
        ));
        assert!(parse_command("3 x r").is_none());
        assert!(parse_command("3 4 z").is_none());
        assert!(parse_command("").is_none());
    }

    #[test]
    fn test_parse_session_commands() {
        assert!(matches!(parse_command("quit"), Some(Command::Quit)));
        assert!(matches!(
            parse_command("save game.json"),
            Some(Command::Save(path)) if path == PathBuf::from("game.json")
        ));
        assert!(parse_command("save").is_none());
    }

    #[test]
    fn test_cli_config() {
        let cli = Cli::parse_from(["sweeper", "--rows", "4", "--columns", "5", "--mines", "3"]);
        let config = cli.config().unwrap();
        assert_eq!((config.rows(), config.columns(), config.mines()), (4, 5, 3));

        let cli = Cli::parse_from(["sweeper", "--preset", "expert"]);
        assert_eq!(cli.config().unwrap(), GameConfig::expert());

        let cli = Cli::parse_from(["sweeper", "--rows", "2", "--columns", "2", "--mines", "4"]);
        assert!(cli.config().is_err());
    }

    #[test]
    fn test_verbosity_maps_to_tracing_level() {
        use tracing_subscriber::filter::LevelFilter;

        let cli = Cli::parse_from(["sweeper"]);
        assert_eq!(cli.verbose.tracing_level_filter(), LevelFilter::WARN);

        let cli = Cli::parse_from(["sweeper", "-vv"]);
        assert_eq!(cli.verbose.tracing_level_filter(), LevelFilter::DEBUG);

        let cli = Cli::parse_from(["sweeper", "-q"]);
        assert_eq!(cli.verbose.tracing_level_filter(), LevelFilter::ERROR);
    }
}
