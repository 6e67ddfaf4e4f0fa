// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 SatiNav Robotics. All Rights Reserved.

//! ROS2 message schemas for the Nav2 topic set.
//!
//! Serde mirrors of the ROS2 common-interfaces types consumed by the
//! bridge. Field order and widths follow the IDL definitions so that the
//! CDR payloads received over Zenoh decode with `cdr::deserialize` without
//! any translation step.

use serde::{Deserialize, Serialize};

/// Timestamp with separate seconds and nanoseconds
/// (builtin_interfaces/Time).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Time {
    /// Seconds since the UNIX epoch
    pub sec: i32,
    /// Nanoseconds within the second
    pub nanosec: u32,
}

/// Standard message header (std_msgs/Header).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    /// Sample timestamp
    pub stamp: Time,
    /// Frame of reference the message is expressed in
    pub frame_id: String,
}

/// A point in 3D space (geometry_msgs/Point).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate in meters
    pub x: f64,
    /// Y coordinate in meters
    pub y: f64,
    /// Z coordinate in meters
    pub z: f64,
}

/// A translation vector (geometry_msgs/Vector3).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component in meters
    pub x: f64,
    /// Y component in meters
    pub y: f64,
    /// Z component in meters
    pub z: f64,
}

/// An orientation quaternion (geometry_msgs/Quaternion).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
    /// Scalar component
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// Position and orientation in free space (geometry_msgs/Pose).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Position component
    pub position: Point,
    /// Orientation component
    pub orientation: Quaternion,
}

/// A pose with a reference frame and timestamp
/// (geometry_msgs/PoseStamped).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseStamped {
    /// Frame and timestamp for the pose
    pub header: Header,
    /// The pose itself
    pub pose: Pose,
}

/// A rigid transform (geometry_msgs/Transform).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Translation component
    pub translation: Vector3,
    /// Rotation component
    pub rotation: Quaternion,
}

/// A transform between two named frames
/// (geometry_msgs/TransformStamped).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformStamped {
    /// Parent frame and timestamp
    pub header: Header,
    /// Name of the child frame
    pub child_frame_id: String,
    /// Transform from the parent frame to the child frame
    pub transform: Transform,
}

/// A batch of transforms from the tf tree (tf2_msgs/TFMessage).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TfMessage {
    /// The transforms carried by this message
    pub transforms: Vec<TransformStamped>,
}

/// Occupancy grid metadata (nav_msgs/MapMetaData).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapMetaData {
    /// Time the map was loaded
    pub map_load_time: Time,
    /// Cell edge length in meters
    pub resolution: f32,
    /// Grid width in cells
    pub width: u32,
    /// Grid height in cells
    pub height: u32,
    /// Pose of cell (0, 0) in the map frame
    pub origin: Pose,
}

/// A 2D occupancy map (nav_msgs/OccupancyGrid).
///
/// Cell values are occupancy probabilities in [0, 100]; -1 marks an
/// unknown cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OccupancyGrid {
    /// Frame and timestamp for the map
    pub header: Header,
    /// Grid dimensions and origin
    pub info: MapMetaData,
    /// Cell data in row-major order, starting at the origin
    pub data: Vec<i8>,
}

/// A sequence of poses describing a planned path (nav_msgs/Path).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    /// Frame and timestamp for the plan
    pub header: Header,
    /// Waypoints along the path
    pub poses: Vec<PoseStamped>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_header() {
        // PLAIN_CDR little-endian encapsulation followed by
        // sec=7, nanosec=500, frame_id="map" (length includes NUL).
        let payload = [
            0x00, 0x01, 0x00, 0x00, // encapsulation
            0x07, 0x00, 0x00, 0x00, // sec
            0xF4, 0x01, 0x00, 0x00, // nanosec
            0x04, 0x00, 0x00, 0x00, // string length
            0x6D, 0x61, 0x70, 0x00, // "map\0"
        ];

        let header: Header = cdr::deserialize(&payload).unwrap();
        assert_eq!(
            header,
            Header {
                stamp: Time {
                    sec: 7,
                    nanosec: 500
                },
                frame_id: "map".to_string(),
            }
        );
    }

    #[test]
    fn decode_grid() {
        let grid = OccupancyGrid {
            header: Header {
                stamp: Time {
                    sec: 12,
                    nanosec: 34,
                },
                frame_id: "map".to_string(),
            },
            info: MapMetaData {
                map_load_time: Time::default(),
                resolution: 0.05,
                width: 2,
                height: 2,
                origin: Pose::default(),
            },
            data: vec![-1, 0, 50, 100],
        };

        let payload = cdr::serialize::<_, _, cdr::CdrLe>(&grid, cdr::Infinite).unwrap();
        let decoded: OccupancyGrid = cdr::deserialize(&payload).unwrap();
        assert_eq!(decoded.info.width, 2);
        assert_eq!(decoded.data, vec![-1, 0, 50, 100]);
        assert_eq!(decoded.info.origin.orientation.w, 1.0);
    }
}
