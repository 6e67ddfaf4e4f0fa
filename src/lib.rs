// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 SatiNav Robotics. All Rights Reserved.

//! NavLink Library
//!
//! This library provides core functionality for bridging the SatiBot Nav2
//! stack to a remote teleoperation relay session. Telemetry received over
//! Zenoh is normalized into JSON envelopes and forwarded on the relay data
//! channel, while control events received from the relay are replayed on
//! the host desktop.
//!
//! # Features
//!
//! - **Message Schemas** - Nav2 message set decoded from ROS2 CDR payloads
//! - **Envelopes** - normalized wire envelopes with gzip grid compression
//! - **Relay Transport** - data channel with a single writer task owning
//!   the connection
//! - **Token Client** - access-token retrieval from the controller endpoint
//! - **Input Replay** - mouse/keyboard event injection for the input host

#![warn(missing_docs)]

/// Normalized wire envelopes and grid payload compression
pub mod envelope;

/// Control-event model and desktop input injection
pub mod input;

/// ROS2 message schemas for the Nav2 topic set
pub mod msgs;

/// Relay session transport
pub mod relay;

/// Access-token client for the controller REST endpoint
pub mod token;
