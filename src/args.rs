// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 SatiNav Robotics. All Rights Reserved.

use clap::Parser;
use serde_json::json;
use tracing::level_filters::LevelFilter;
use zenoh::config::{Config, WhatAmI};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Participant identity announced to the relay session.
    #[arg()]
    pub participant: String,

    /// Relay session WebSocket URL.
    #[arg(long, env = "RELAY_URL")]
    pub relay_url: String,

    /// Relay access token. Fetched from the token endpoint when unset.
    #[arg(long, env = "RELAY_TOKEN")]
    pub relay_token: Option<String>,

    /// Token endpoint URL.
    #[arg(
        long,
        env,
        default_value = "https://controller.satinavrobotics.com/api/createToken"
    )]
    pub token_url: String,

    /// Room name requested from the token endpoint.
    #[arg(long, env = "RELAY_ROOM", default_value = "admin@satinavrobotics.com")]
    pub room: String,

    /// Token endpoint basic-auth user.
    #[arg(long, env = "TOKEN_USER")]
    pub token_user: Option<String>,

    /// Token endpoint basic-auth password.
    #[arg(long, env = "TOKEN_PASS")]
    pub token_pass: Option<String>,

    /// Occupancy grid topics forwarded with grid compression.
    #[arg(
        long,
        default_value = "map global_costmap/costmap local_costmap/costmap",
        value_delimiter = ' '
    )]
    pub grid_topics: Vec<String>,

    /// Transform tree topic.
    #[arg(long, default_value = "tf")]
    pub tf_topic: String,

    /// Planned path topic.
    #[arg(long, default_value = "plan")]
    pub plan_topic: String,

    /// Navigation goal topic.
    #[arg(long, default_value = "goal_pose")]
    pub goal_topic: String,

    /// Outbound relay queue capacity before messages are dropped.
    #[arg(long, env, default_value = "128")]
    pub relay_capacity: usize,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,

    /// zenoh connection mode
    #[arg(long, env, default_value = "peer")]
    mode: WhatAmI,

    /// connect to zenoh endpoints
    #[arg(long, env)]
    connect: Vec<String>,

    /// listen to zenoh endpoints
    #[arg(long, env)]
    listen: Vec<String>,

    /// disable zenoh multicast scouting
    #[arg(long, env)]
    no_multicast_scouting: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mut config = Config::default();

        config
            .insert_json5("mode", &json!(args.mode).to_string())
            .unwrap();

        if !args.connect.is_empty() {
            config
                .insert_json5("connect/endpoints", &json!(args.connect).to_string())
                .unwrap();
        }

        if !args.listen.is_empty() {
            config
                .insert_json5("listen/endpoints", &json!(args.listen).to_string())
                .unwrap();
        }

        if args.no_multicast_scouting {
            config
                .insert_json5("scouting/multicast/enabled", &json!(false).to_string())
                .unwrap();
        }

        config
    }
}
