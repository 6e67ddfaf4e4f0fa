// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 SatiNav Robotics. All Rights Reserved.

//! Relay session transport.
//!
//! One WebSocket connection per process carries the data channel to the
//! relay. Producers never touch the socket: outbound messages are handed
//! through a bounded channel to a single writer task that owns the
//! connection, so sends issued from concurrent subscriber tasks serialize
//! in producer order. There is no acknowledgment, retry, or backpressure;
//! a message that cannot be queued or written is logged and discarded.

use futures_util::{SinkExt as _, StreamExt as _};
use kanal::{bounded_async, AsyncReceiver, AsyncSender};
use log::{debug, error, info, warn};
use std::fmt;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, client::IntoClientRequest as _, http::header::AUTHORIZATION},
    MaybeTlsStream, WebSocketStream,
};

/// Default number of queued outbound messages before sends are dropped.
pub const DEFAULT_CAPACITY: usize = 128;

#[derive(Debug)]
/// Relay connection error types.
pub enum Error {
    /// WebSocket connect or handshake failure
    Connect(tungstenite::Error),
    /// The access token is not a valid header value
    Token(tungstenite::http::header::InvalidHeaderValue),
}

impl std::error::Error for Error {}

impl From<tungstenite::Error> for Error {
    fn from(err: tungstenite::Error) -> Error {
        Error::Connect(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Connect(err) => write!(f, "relay connect error: {}", err),
            Error::Token(err) => write!(f, "invalid access token: {}", err),
        }
    }
}

/// Relay connection settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// WebSocket URL of the relay session endpoint
    pub url: String,
    /// Access token presented during the handshake
    pub token: String,
    /// Outbound and inbound channel capacity
    pub capacity: usize,
}

impl RelayConfig {
    /// Settings for `url` and `token` with the default channel capacity.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> RelayConfig {
        RelayConfig {
            url: url.into(),
            token: token.into(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Handle to the relay connection.
///
/// Clones share the same channels; the socket itself lives in the writer
/// task spawned by [`Relay::connect`].
#[derive(Clone)]
pub struct Relay {
    tx: AsyncSender<String>,
    inbound: AsyncReceiver<String>,
}

impl Relay {
    /// Connect to the relay session and spawn the connection task.
    ///
    /// The access token is presented as a bearer Authorization header on
    /// the handshake request.
    pub async fn connect(config: &RelayConfig) -> Result<Relay, Error> {
        let mut request = config.url.as_str().into_client_request()?;
        let bearer = format!("Bearer {}", config.token);
        request
            .headers_mut()
            .insert(AUTHORIZATION, bearer.parse().map_err(Error::Token)?);

        let (stream, response) = connect_async(request).await?;
        debug!("relay handshake complete: {}", response.status());

        let (tx, outbound) = bounded_async(config.capacity);
        let (inbound_tx, inbound) = bounded_async(config.capacity);
        tokio::spawn(run(stream, outbound, inbound_tx));

        Ok(Relay { tx, inbound })
    }

    /// Queue one data-channel message for the writer task.
    ///
    /// Never blocks the caller. The message is dropped with a logged
    /// warning when the outbound queue is full or the connection is gone.
    pub fn send(&self, message: String) {
        match self.tx.try_send(message) {
            Ok(true) => {}
            Ok(false) => warn!("relay outbound queue full, dropping message"),
            Err(_) => warn!("relay connection closed, dropping message"),
        }
    }

    /// Wait for the next inbound data-channel message.
    ///
    /// Returns `None` once the connection has closed.
    pub async fn recv(&self) -> Option<String> {
        self.inbound.recv().await.ok()
    }

    /// Ask the connection task to close the session best-effort.
    pub fn close(&self) {
        self.tx.close();
    }
}

/// Connection task: drains the outbound queue into the socket and fans
/// inbound text frames out to the inbound queue.
async fn run(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    outbound: AsyncReceiver<String>,
    inbound: AsyncSender<String>,
) {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            message = outbound.recv() => match message {
                Ok(text) => {
                    if let Err(err) = sink.send(tungstenite::Message::Text(text.into())).await {
                        error!("relay send error: {:?}", err);
                    }
                }
                Err(_) => {
                    info!("closing relay session");
                    let _ = sink.send(tungstenite::Message::Close(None)).await;
                    break;
                }
            },
            frame = source.next() => match frame {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    match inbound.try_send(text.as_str().to_string()) {
                        Ok(true) => {}
                        Ok(false) => warn!("relay inbound queue full, dropping message"),
                        Err(_) => {}
                    }
                }
                Some(Ok(tungstenite::Message::Close(_))) | None => {
                    info!("relay session closed by remote");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    error!("relay receive error: {:?}", err);
                    break;
                }
            },
        }
    }

    inbound.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{envelope::Envelope, msgs};

    #[tokio::test]
    async fn send_drops_when_queue_full() {
        let (tx, rx) = bounded_async(1);
        let (_inbound_tx, inbound) = bounded_async::<String>(1);
        let relay = Relay { tx, inbound };

        relay.send("first".to_string());
        relay.send("second".to_string());

        assert_eq!(rx.recv().await.unwrap(), "first");
        assert_eq!(rx.try_recv().unwrap(), None);
    }

    #[tokio::test]
    async fn send_after_close_does_not_panic() {
        let (tx, rx) = bounded_async(1);
        let (_inbound_tx, inbound) = bounded_async::<String>(1);
        let relay = Relay { tx, inbound };

        drop(rx);
        relay.send("orphan".to_string());
    }

    #[tokio::test]
    async fn concurrent_producers_keep_envelopes_intact() {
        const PER_PRODUCER: usize = 25;

        let (tx, rx) = bounded_async(2 * PER_PRODUCER);
        let (_inbound_tx, inbound) = bounded_async::<String>(1);
        let relay = Relay { tx, inbound };

        let grid_relay = relay.clone();
        let grids = tokio::spawn(async move {
            for sec in 0..PER_PRODUCER as i32 {
                let msg = msgs::OccupancyGrid {
                    header: msgs::Header {
                        stamp: msgs::Time { sec, nanosec: 0 },
                        frame_id: "map".to_string(),
                    },
                    info: msgs::MapMetaData {
                        width: 4,
                        height: 1,
                        resolution: 0.05,
                        ..Default::default()
                    },
                    data: vec![-1, 0, 50, 100],
                };
                let json = Envelope::occupancy_grid("map", &msg).to_json().unwrap();
                grid_relay.send(json);
                tokio::task::yield_now().await;
            }
        });

        let pose_relay = relay.clone();
        let poses = tokio::spawn(async move {
            for sec in 0..PER_PRODUCER as i32 {
                let msg = msgs::PoseStamped {
                    header: msgs::Header {
                        stamp: msgs::Time { sec, nanosec: 0 },
                        frame_id: "map".to_string(),
                    },
                    pose: msgs::Pose::default(),
                };
                let json = Envelope::goal_pose(&msg).to_json().unwrap();
                pose_relay.send(json);
                tokio::task::yield_now().await;
            }
        });

        grids.await.unwrap();
        poses.await.unwrap();

        let mut grid_count = 0;
        let mut pose_count = 0;
        for _ in 0..2 * PER_PRODUCER {
            let raw = rx.recv().await.unwrap();
            // Every queued message must parse back into a well-formed
            // envelope of exactly one kind.
            let envelope: Envelope = serde_json::from_str(&raw).unwrap();
            match envelope {
                Envelope::OccupancyGrid { topic, info, .. } => {
                    assert_eq!(topic, "map");
                    assert_eq!(info.width, 4);
                    grid_count += 1;
                }
                Envelope::PoseStamped { topic, .. } => {
                    assert_eq!(topic, "goal_pose");
                    pose_count += 1;
                }
                other => panic!("unexpected envelope: {:?}", other),
            }
        }
        assert_eq!(grid_count, PER_PRODUCER);
        assert_eq!(pose_count, PER_PRODUCER);
    }
}
