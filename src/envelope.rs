// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 SatiNav Robotics. All Rights Reserved.

//! Normalized wire envelopes for the relay data channel.
//!
//! Every Nav2 message accepted by the bridge is flattened into a JSON
//! envelope carrying a topic label and a `msg_type` tag. Numeric fields
//! are copied verbatim from the source message; no unit conversion or
//! validation is performed. Envelopes are built once per received message,
//! serialized, handed to the relay, and discarded.
//!
//! Occupancy grid cell data is byte-packed, gzip-compressed, and
//! base64-encoded before transmission. When compression fails the grid
//! envelope degrades to metadata only instead of reporting an error.

use crate::msgs;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    io::{self, Read as _, Write as _},
};

/// Wire byte marking a grid cell whose occupancy is unknown.
pub const UNKNOWN_CELL: u8 = 255;

/// Largest value a known grid cell may carry after packing.
pub const MAX_CELL: u8 = 254;

#[derive(Debug)]
/// Grid payload decoding error types.
pub enum Error {
    /// The payload is not valid base64
    Base64(base64::DecodeError),
    /// The payload did not inflate
    Io(io::Error),
}

impl std::error::Error for Error {}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Error {
        Error::Base64(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Base64(err) => write!(f, "base64 error: {}", err),
            Error::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

/// Grid dimensions and origin carried alongside the compressed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridInfo {
    /// Cell edge length in meters
    pub resolution: f32,
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,
    /// Pose of cell (0, 0) in the map frame
    pub origin: msgs::Pose,
}

/// The normalized wrapper sent on the relay data channel.
///
/// The `msg_type` field on the wire selects the variant; the payload shape
/// follows the source message with nested structures flattened into named
/// sub-mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg_type")]
pub enum Envelope {
    /// Occupancy grid metadata with an optional compressed cell payload.
    OccupancyGrid {
        /// Topic label for the consumer
        topic: String,
        /// Grid dimensions and origin
        info: GridInfo,
        /// Packed cells, gzip-compressed and base64-encoded. `None` when
        /// compression failed and only metadata is sent.
        data_compressed_gzip_base64: Option<String>,
        /// Source message timestamp
        timestamp: msgs::Time,
        /// Frame the grid is expressed in
        frame_id: String,
    },
    /// A batch of rigid transforms from the tf tree.
    #[serde(rename = "TFMessage")]
    TfMessage {
        /// Topic label for the consumer
        topic: String,
        /// The transforms carried by the source message
        transforms: Vec<msgs::TransformStamped>,
    },
    /// A planned path as a sequence of stamped poses.
    Path {
        /// Topic label for the consumer
        topic: String,
        /// Waypoints along the path
        poses: Vec<msgs::PoseStamped>,
    },
    /// A single stamped pose.
    PoseStamped {
        /// Topic label for the consumer
        topic: String,
        /// Frame and timestamp for the pose
        header: msgs::Header,
        /// The pose itself
        pose: msgs::Pose,
    },
}

impl Envelope {
    /// Normalize an occupancy grid under the given topic label.
    ///
    /// The cell data is packed and compressed here; a compression failure
    /// yields a metadata-only envelope rather than an error.
    pub fn occupancy_grid(topic: &str, msg: &msgs::OccupancyGrid) -> Envelope {
        Envelope::OccupancyGrid {
            topic: topic.to_string(),
            info: GridInfo {
                resolution: msg.info.resolution,
                width: msg.info.width,
                height: msg.info.height,
                origin: msg.info.origin,
            },
            data_compressed_gzip_base64: compress_grid(&msg.data),
            timestamp: msg.header.stamp,
            frame_id: msg.header.frame_id.clone(),
        }
    }

    /// Normalize a tf batch.
    pub fn tf(msg: &msgs::TfMessage) -> Envelope {
        Envelope::TfMessage {
            topic: "tf".to_string(),
            transforms: msg.transforms.clone(),
        }
    }

    /// Normalize a planned path.
    pub fn path(msg: &msgs::Path) -> Envelope {
        Envelope::Path {
            topic: "plan".to_string(),
            poses: msg.poses.clone(),
        }
    }

    /// Normalize a navigation goal pose.
    pub fn goal_pose(msg: &msgs::PoseStamped) -> Envelope {
        Envelope::PoseStamped {
            topic: "goal_pose".to_string(),
            header: msg.header.clone(),
            pose: msg.pose,
        }
    }

    /// The topic label this envelope is published under.
    pub fn topic(&self) -> &str {
        match self {
            Envelope::OccupancyGrid { topic, .. } => topic,
            Envelope::TfMessage { topic, .. } => topic,
            Envelope::Path { topic, .. } => topic,
            Envelope::PoseStamped { topic, .. } => topic,
        }
    }

    /// Serialize the envelope to its wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Derive the envelope topic label from a subscription key.
///
/// Nav2 costmap keys nest the grid under a node namespace
/// (`global_costmap/costmap`); the label is the first segment.
pub fn topic_label(key: &str) -> String {
    key.trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or(key)
        .to_string()
}

/// Pack one signed occupancy cell into its wire byte.
///
/// Values below zero mean "unknown" and map to the sentinel 255; values
/// above 254 are clamped so they stay distinct from the sentinel.
pub fn pack_cell(value: i16) -> u8 {
    if value < 0 {
        UNKNOWN_CELL
    } else if value > MAX_CELL as i16 {
        MAX_CELL
    } else {
        value as u8
    }
}

/// Pack, gzip-compress, and base64-encode grid cell data.
///
/// Returns `None` when compression fails; the caller then sends a
/// metadata-only envelope.
pub fn compress_grid(cells: &[i8]) -> Option<String> {
    let packed: Vec<u8> = cells.iter().map(|&v| pack_cell(v as i16)).collect();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    if let Err(err) = encoder.write_all(&packed) {
        warn!("grid compression failed, sending metadata only: {}", err);
        return None;
    }
    match encoder.finish() {
        Ok(compressed) => Some(STANDARD.encode(compressed)),
        Err(err) => {
            warn!("grid compression failed, sending metadata only: {}", err);
            None
        }
    }
}

/// Reverse of [`compress_grid`]: decode, inflate, and unmap the unknown
/// sentinel back to -1.
pub fn decompress_grid(payload: &str) -> Result<Vec<i16>, Error> {
    let compressed = STANDARD.decode(payload)?;
    let mut packed = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut packed)?;

    Ok(packed
        .into_iter()
        .map(|b| if b == UNKNOWN_CELL { -1 } else { b as i16 })
        .collect())
}
