use clap::Parser;
use dbfactory::cli::{check, handle_completions, handle_types, run_check, Cli, Commands};
use dbfactory::logging::init_tracing;
use dbfactory::registry::BackendRegistry;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result: anyhow::Result<()> = match cli.command {
        Commands::Check(args) => match check::load_config_with_overrides(&args) {
            Ok(config) => match init_tracing(&config.logging) {
                Ok(()) => run_check(&args, &config).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e.into()),
        },
        Commands::Types(args) => {
            let registry = BackendRegistry::with_builtins();
            match handle_types(&args, &registry) {
                Ok(output) => {
                    println!("{}", output);
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
