use clap::Parser;
use keyflow::app::{handle_fatal_error, init_logging, AppConfig};
use keyflow::cli::{execute_command, Cli};
use tracing::debug;

fn main() {
    let cli = Cli::parse();

    let config = AppConfig::new(cli.verbose).with_setup_file(cli.command.setup_file());
    init_logging(&config);
    if let Some(setup_file) = &config.setup_file {
        debug!("Using setup file {}", setup_file.display());
    }

    let stdout = std::io::stdout();
    let result = execute_command(cli.command, &mut stdout.lock());

    if let Err(e) = result {
        handle_fatal_error(e, config.verbose);
    }
}
