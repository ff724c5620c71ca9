//! Modbus Client - interactive Modbus TCP block client
//!
//! Connects to one device, caches its blocks in the shared state store and
//! serves a numbered menu of reads and writes.

use std::io;
use std::process::ExitCode;

use block_store::StateStore;
use clap::Parser;
use colored::Colorize;
use tracing::{error, info};

use modbus_client::app::InteractiveClient;
use modbus_client::bootstrap::{self, Args};
use modbus_client::config::ClientConfig;
use modbus_client::console::{Console, RustylinePrompt};
use modbus_client::session::Session;
use modbus_client::transport::{Connector, Endpoint, MemoryConnector, TcpConnector};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match bootstrap::resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "ERROR".red(), e);
            return ExitCode::FAILURE;
        },
    };

    let service = bootstrap::service_info();
    if let Err(e) = bootstrap::initialize_logging(&args, &config, &service) {
        eprintln!("{} Failed to initialize logging: {}", "ERROR".red(), e);
        return ExitCode::FAILURE;
    }
    common::service_bootstrap::print_startup_banner(&service);

    let store = match StateStore::open(&config.db_path).await {
        Ok(store) => store,
        Err(e) => {
            error!("State store {}: {}", config.db_path, e);
            eprintln!("{} Cannot open {}: {}", "ERROR".red(), config.db_path, e);
            return ExitCode::FAILURE;
        },
    };

    let endpoint = Endpoint::new(args.ip.clone(), args.port);
    if args.simulate {
        info!("Using the simulated device");
        run(MemoryConnector::default(), endpoint, store, &config).await
    } else {
        let connector = TcpConnector::new(config.unit_id, config.timeout());
        run(connector, endpoint, store, &config).await
    }
}

async fn run<C: Connector>(
    connector: C,
    endpoint: Endpoint,
    store: StateStore,
    config: &ClientConfig,
) -> ExitCode {
    let mut session = Session::new(endpoint);
    if let Err(e) = session.connect(&connector, &config.connect_policy()).await {
        error!("{}", e);
        println!("Could not connect to Modbus server. Check IP/Port.");
        return ExitCode::FAILURE;
    }

    let prompt = match RustylinePrompt::new() {
        Ok(prompt) => prompt,
        Err(e) => {
            eprintln!("{} {}", "ERROR".red(), e);
            let _ = session.close().await;
            return ExitCode::FAILURE;
        },
    };

    let mut client = InteractiveClient::new(session, store, Console::new(prompt, io::stdout()));
    if client.startup().await.is_err() {
        return ExitCode::FAILURE;
    }

    match client.run().await {
        Ok(()) => {
            info!("Client exited normally");
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!("Client stopped: {}", e);
            ExitCode::FAILURE
        },
    }
}
