use crate::demo::{run_demo, run_score, run_window, DemoArgs, ScoreArgs, WindowArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use peer_review::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Peer Review Service",
    about = "Run the quarterly peer review service or inspect scoring and windows from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute the weighted final score for a set of ratings
    Score(ScoreArgs),
    /// Show a quarter's submission window and whether it is open
    Window(WindowArgs),
    /// Seed a sample team, submit reviews, and print the period summary
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Window(args) => run_window(args),
        Command::Demo(args) => run_demo(args),
    }
}
