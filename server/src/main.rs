use clap::Parser;
use log::{error, info};
use server::config::{GameConfig, RoleConfig, SeerReveal, ServerConfig};
use server::network::Server;
use shared::{DEFAULT_PORT, ROOM_CAPACITY};

/// Main-method of the application.
/// Parses command-line arguments, validates the room configuration, then runs the server until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Players required to start a match
        #[clap(short, long, default_value_t = ROOM_CAPACITY)]
        capacity: usize,
        #[clap(long, default_value_t = 1)]
        blackjack: usize,
        #[clap(long, default_value_t = 2)]
        killer: usize,
        #[clap(long, default_value_t = 1)]
        whitejack: usize,
        #[clap(long, default_value_t = 1)]
        seer: usize,
        #[clap(long, default_value_t = 1)]
        doctor: usize,
        #[clap(long, default_value_t = 4)]
        villager: usize,
        /// Send seer results only to the seer who asked
        #[clap(long)]
        private_seer: bool,
    }

    let args = Args::parse();

    let roles = RoleConfig {
        blackjack: args.blackjack,
        killer: args.killer,
        whitejack: args.whitejack,
        seer: args.seer,
        doctor: args.doctor,
        villager: args.villager,
    };
    let seer_reveal = if args.private_seer {
        SeerReveal::Private
    } else {
        SeerReveal::Public
    };

    let game = match GameConfig::new(args.capacity, roles, seer_reveal) {
        Ok(game) => game,
        Err(e) => {
            error!("Invalid room configuration: {}", e);
            return Err(e.into());
        }
    };

    let config = ServerConfig {
        address: format!("{}:{}", args.host, args.port),
        game,
    };
    let mut server = Server::bind(config).await?;

    // Handle shutdown gracefully
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
