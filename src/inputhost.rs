// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 SatiNav Robotics. All Rights Reserved.

use clap::Parser;
use navlink::{
    input::{parse_event, Injector, Replayer},
    relay::{Relay, RelayConfig},
};
use tracing::{debug, error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt as _, Layer as _, Registry};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay session WebSocket URL.
    #[arg(long, env = "RELAY_URL")]
    relay_url: String,

    /// Relay access token.
    #[arg(long, env = "RELAY_TOKEN")]
    relay_token: String,

    /// Print a line for each received command.
    #[arg(long)]
    debug: bool,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    rust_log: LevelFilter,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(args.rust_log);

    let journald = match tracing_journald::layer() {
        Ok(journald) => Some(journald.with_filter(args.rust_log)),
        Err(_) => None,
    };

    let subscriber = Registry::default().with(stdout_log).with(journald);
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    tracing_log::LogTracer::init()?;

    let injector = Injector::new()?;
    let screen = injector.screen_size()?;
    info!("host screen size: {}x{}", screen.width, screen.height);

    let config = RelayConfig::new(args.relay_url.clone(), args.relay_token.clone());
    let relay = match Relay::connect(&config).await {
        Ok(relay) => relay,
        Err(err) => {
            eprintln!("Error: could not connect to relay session: {}", err);
            std::process::exit(1);
        }
    };
    info!("connected to relay session, ready for control events");

    let mut replayer = Replayer::new(screen, injector);
    loop {
        tokio::select! {
            message = relay.recv() => match message {
                Some(raw) => match parse_event(&raw) {
                    Some(event) => {
                        if args.debug {
                            info!("received command: {:?}", event);
                        }
                        replayer.apply(event);
                    }
                    None => debug!("dropping malformed control event"),
                },
                None => {
                    error!("relay session closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                relay.close();
                break;
            }
        }
    }

    Ok(())
}
