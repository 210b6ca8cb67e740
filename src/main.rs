use clap::Parser;

use cityrank::cli::{Cli, Commands};
use cityrank::config::{get_config, init_config_from};
use cityrank::system::logging::init_logging;

#[actix_web::main]
async fn main() {
    let cli = Cli::parse();

    init_config_from(&cli.config);
    let config = get_config();

    // CLI 模式只输出警告以上，避免干扰命令输出
    let is_server = matches!(cli.command, None | Some(Commands::Serve));
    let mut logging = config.logging.clone();
    if !is_server {
        logging.level = "warn".to_string();
    }

    let _log_guard = match init_logging(&logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    match cli.command {
        None | Some(Commands::Serve) => {
            if let Err(e) = cityrank::runtime::modes::run_server().await {
                tracing::error!("Server exited with error: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(command) => {
            if let Err(e) = cityrank::runtime::modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
    }
}
