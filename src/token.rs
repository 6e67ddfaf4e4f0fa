// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 SatiNav Robotics. All Rights Reserved.

//! Access-token client for the controller REST endpoint.
//!
//! The controller issues relay session tokens over HTTP: a POST with basic
//! auth and a JSON body naming the room and participant. The response is
//! normally a JSON object carrying the token under `token` or
//! `accessToken`, but some deployments answer with the bare token as text,
//! so that form is accepted as well.

use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::{fmt, time::Duration};

/// Token endpoint settings.
///
/// Passed in explicitly by the binaries; nothing here is global state.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Token endpoint URL
    pub url: String,
    /// Room name requested from the endpoint
    pub room: String,
    /// Basic-auth user
    pub user: String,
    /// Basic-auth password
    pub pass: String,
}

#[derive(Debug)]
/// Token retrieval error types.
pub enum Error {
    /// The endpoint could not be reached
    Endpoint(reqwest::Error),
    /// The endpoint answered with a non-success status
    Status(u16, String),
    /// The response carried no usable token
    MissingToken(String),
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Error {
        Error::Endpoint(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Endpoint(err) => write!(f, "failed to call token endpoint: {}", err),
            Error::Status(code, body) => {
                write!(f, "token endpoint returned status {}: {}", code, body)
            }
            Error::MissingToken(body) => {
                write!(f, "unexpected token response: {}", body)
            }
        }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    #[serde(rename = "roomName")]
    room_name: &'a str,
    #[serde(rename = "participantName")]
    participant_name: &'a str,
}

/// Request a relay access token for `participant`.
///
/// A non-success response becomes [`Error::Status`] carrying the numeric
/// status code and body.
pub async fn fetch_token(config: &TokenConfig, participant: &str) -> Result<String, Error> {
    let body = TokenRequest {
        room_name: &config.room,
        participant_name: participant,
    };

    debug!("requesting token for {} from {}", participant, config.url);
    let response = reqwest::Client::new()
        .post(&config.url)
        .basic_auth(&config.user, Some(&config.pass))
        .timeout(Duration::from_secs(5))
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(Error::Status(status.as_u16(), text));
    }

    parse_token(&text)
}

/// Extract the token from a response body.
///
/// Accepts a JSON object with a `token` or `accessToken` string field, or
/// a bare non-empty token as plain text.
pub fn parse_token(body: &str) -> Result<String, Error> {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("token")
            .or_else(|| json.get("accessToken"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::MissingToken(body.to_string())),
        Err(_) => {
            let token = body.trim();
            if token.is_empty() {
                Err(Error::MissingToken(body.to_string()))
            } else {
                Ok(token.to_string())
            }
        }
    }
}
