// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 SatiNav Robotics. All Rights Reserved.

mod args;

use args::Args;
use clap::Parser;
use navlink::{
    envelope::{topic_label, Envelope},
    relay::{Relay, RelayConfig},
    token::{fetch_token, TokenConfig},
};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt as _, Layer as _, Registry};
use zenoh::Session;

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

    let token = match &args.relay_token {
        Some(token) => token.clone(),
        None => {
            let (user, pass) = match (&args.token_user, &args.token_pass) {
                (Some(user), Some(pass)) => (user.clone(), pass.clone()),
                _ => {
                    eprintln!(
                        "Error: set RELAY_TOKEN, or TOKEN_USER and TOKEN_PASS \
                         to fetch one from the token endpoint"
                    );
                    std::process::exit(1);
                }
            };

            let config = TokenConfig {
                url: args.token_url.clone(),
                room: args.room.clone(),
                user,
                pass,
            };

            match fetch_token(&config, &args.participant).await {
                Ok(token) => token,
                Err(err) => {
                    eprintln!("Error: could not fetch relay token: {}", err);
                    std::process::exit(1);
                }
            }
        }
    };

    let relay_config = RelayConfig {
        url: args.relay_url.clone(),
        token,
        capacity: args.relay_capacity,
    };
    let relay = match Relay::connect(&relay_config).await {
        Ok(relay) => relay,
        Err(err) => {
            eprintln!("Error: could not connect to relay session: {}", err);
            std::process::exit(1);
        }
    };
    info!("connected to relay session as {}", args.participant);

    let session = zenoh::open(args.clone()).await.unwrap();
    info!("opened zenoh session");

    for topic in &args.grid_topics {
        let label = topic_label(topic);
        spawn_forward(&session, topic.clone(), relay.clone(), move |msg| {
            Envelope::occupancy_grid(&label, &msg)
        });
    }

    spawn_forward(&session, args.tf_topic.clone(), relay.clone(), |msg| {
        Envelope::tf(&msg)
    });
    spawn_forward(&session, args.plan_topic.clone(), relay.clone(), |msg| {
        Envelope::path(&msg)
    });
    spawn_forward(&session, args.goal_topic.clone(), relay.clone(), |msg| {
        Envelope::goal_pose(&msg)
    });

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    relay.close();

    Ok(())
}

/// Subscribe to one topic and forward each decoded message as an envelope.
///
/// Each subscription runs in its own task; the handlers share nothing but
/// the relay handle, and the relay's bounded queue is the only
/// cross-context handoff.
fn spawn_forward<T, F>(session: &Session, topic: String, relay: Relay, normalize: F)
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(T) -> Envelope + Send + 'static,
{
    let session = session.clone();

    tokio::spawn(async move {
        let sub = match session.declare_subscriber(topic.clone()).await {
            Ok(sub) => sub,
            Err(err) => {
                error!("failed to subscribe to {}: {:?}", topic, err);
                return;
            }
        };
        info!("subscribed to {}", topic);

        loop {
            match sub.recv_async().await {
                Ok(sample) => {
                    let payload = sample.payload().to_bytes();
                    match cdr::deserialize::<T>(&payload) {
                        Ok(msg) => send_envelope(&relay, normalize(msg)),
                        Err(err) => warn!("{}: undecodable payload: {}", topic, err),
                    }
                }
                Err(err) => {
                    error!("{}: subscriber error: {:?}", topic, err);
                    break;
                }
            }
        }
    });
}

fn send_envelope(relay: &Relay, envelope: Envelope) {
    match envelope.to_json() {
        Ok(json) => relay.send(json),
        Err(err) => error!("{}: envelope serialization failed: {}", envelope.topic(), err),
    }
}
