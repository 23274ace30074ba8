use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{debug, info};

use pawn_vartable_lib::config::Config;
use pawn_vartable_lib::logging::init_logging;
use pawn_vartable_lib::pgn::{describe_tokens, tokenize_first_game};
use pawn_vartable_lib::report::TreeReport;
use pawn_vartable_lib::server;
use pawn_vartable_lib::tree::{GameTree, NodeId, ShakmatyApplier};
use pawn_vartable_lib::view::PageView;

#[derive(Parser)]
#[command(name = "pawn-vartable")]
#[command(about = "Browse the variations of an annotated chess game as a table")]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// PGN file to read; overrides the configuration
    #[arg(long)]
    pgn: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the table with a node elevated to the main line
    Rows {
        #[arg(long, default_value_t = 0)]
        target: NodeId,
        /// Node shown on the board; defaults to the target
        #[arg(long)]
        board: Option<NodeId>,
        #[arg(long)]
        json: bool,
    },
    /// Print statistics about the game tree
    Report {
        #[arg(long)]
        json: bool,
    },
    /// Dump the token stream of the first game
    Tokens,
    /// Serve pages over HTTP
    Serve {
        /// Address to bind; overrides the configuration
        #[arg(long)]
        bind: Option<String>,
    },
}

fn load_tree(config: &Config) -> Result<GameTree, Box<dyn std::error::Error + Send + Sync>> {
    let pgn = std::fs::read_to_string(&config.pgn_path)?;
    Ok(GameTree::from_pgn(&pgn, &ShakmatyApplier)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(pgn) = args.pgn {
        config.pgn_path = pgn;
    }
    init_logging(config.log_file.as_deref()).map_err(|e| e.to_string())?;
    debug!("Configuration: {:?}", config);

    match args.command {
        Command::Rows {
            target,
            board,
            json,
        } => {
            let tree = load_tree(&config)?;
            let page = PageView::compose(&tree, target, board.unwrap_or(target), &config.view_options());
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print!("{}", page.render_text());
            }
        }
        Command::Report { json } => {
            let tree = load_tree(&config)?;
            let report = TreeReport::characterize(&tree);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
        Command::Tokens => {
            let pgn = std::fs::read_to_string(&config.pgn_path)?;
            let game = tokenize_first_game(&pgn)?;
            info!(
                "{} tokens, {} moves",
                game.tokens.len(),
                game.move_count()
            );
            for line in describe_tokens(&game.tokens) {
                println!("{}", line);
            }
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            server::serve(config).await?;
        }
    }

    Ok(())
}
