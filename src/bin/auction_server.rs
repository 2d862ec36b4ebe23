//! The auction server binary: a UDP listener for short queries and a TCP
//! listener for bulk/file-bearing requests, both backed by one store actor.

use clap::Parser;
use tokio::net::{TcpListener, UdpSocket};

use auctionhouse::config::ServerConfig;
use auctionhouse::logging::init_logging;
use auctionhouse::store::Store;
use auctionhouse::transport::{run_tcp_server, run_udp_server};

#[derive(Parser, Debug)]
#[command(name = "auction_server", about = "Networked auction server")]
struct Args {
    /// Port to listen on for both UDP and TCP.
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Root directory for the persistent store.
    #[arg(short = 'd', long = "data-dir")]
    data_dir: Option<String>,

    /// Optional JSON configuration file.
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Enable verbose `[LOG]`-prefixed diagnostics.
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref()).unwrap_or_default();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if args.verbose {
        config.verbose = true;
    }

    init_logging(config.verbose);

    let addr = config.listen_addr()?;
    let store = Store::spawn(config.data_dir_path());

    let udp_socket = UdpSocket::bind(addr).await?;
    let tcp_listener = TcpListener::bind(addr).await?;
    tracing::info!("auction server listening on {addr}");

    let udp_store = store.clone();
    let udp_task = tokio::spawn(run_udp_server(udp_socket, udp_store));
    let tcp_task = tokio::spawn(run_tcp_server(tcp_listener, store));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down on ctrl-c");
        }
        res = udp_task => {
            if let Ok(Err(e)) = res {
                tracing::error!("UDP server exited: {e}");
            }
        }
        res = tcp_task => {
            if let Ok(Err(e)) = res {
                tracing::error!("TCP server exited: {e}");
            }
        }
    }

    Ok(())
}
