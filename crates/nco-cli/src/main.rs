use clap::Parser;
use nco_cli::{Cli, Commands};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Build { model, out } => commands::build::handle(model, out),
        #[cfg(feature = "solver-clarabel")]
        Commands::Solve { model, json, tol } => commands::solve::handle(model, *json, *tol),
        #[cfg(not(feature = "solver-clarabel"))]
        Commands::Solve { .. } => Err(anyhow::anyhow!(
            "built without a solver backend; enable the `solver-clarabel` feature"
        )),
        Commands::Names {
            broadcast,
            message,
            edge,
            receiver,
        } => commands::names::handle(*broadcast, *message, edge, receiver.as_deref()),
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so `--json` output stays machine-readable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("nco-cli {}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(&cli) {
        error!("{err:?}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
