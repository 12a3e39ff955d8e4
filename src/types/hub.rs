//! WebSub wire types
//!
//! Field names are fixed by the protocol and appear verbatim on the wire.

use serde::{Deserialize, Serialize};
use std::{fmt, io, str::FromStr};

pub const VERIFY_ASYNC: &str = "async";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

// =============================================================================
// Hub Mode
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubMode {
    Subscribe,
    Unsubscribe,
    Denied,
}

impl fmt::Display for HubMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HubMode::Subscribe => write!(f, "subscribe"),
            HubMode::Unsubscribe => write!(f, "unsubscribe"),
            HubMode::Denied => write!(f, "denied"),
        }
    }
}

impl From<HubMode> for String {
    fn from(value: HubMode) -> Self {
        value.to_string()
    }
}

impl FromStr for HubMode {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<HubMode, Self::Err> {
        match value {
            "subscribe" => Ok(HubMode::Subscribe),
            "unsubscribe" => Ok(HubMode::Unsubscribe),
            "denied" => Ok(HubMode::Denied),
            _ => Err(io::Error::other("Hub mode not supported")),
        }
    }
}

// =============================================================================
// Outbound (subscriber -> hub)
// =============================================================================

/// Form body of a subscribe or unsubscribe request.
#[derive(Debug, Clone, Serialize)]
pub struct HubRequest {
    #[serde(rename = "hub.callback")]
    pub callback: String,
    #[serde(rename = "hub.mode")]
    pub mode: String,
    #[serde(rename = "hub.topic")]
    pub topic: String,
    #[serde(rename = "hub.verify")]
    pub verify: &'static str,
    #[serde(rename = "hub.secret", skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl HubRequest {
    pub fn subscribe(callback: String, topic: String, secret: String) -> Self {
        HubRequest {
            callback,
            mode: String::from(HubMode::Subscribe),
            topic,
            verify: VERIFY_ASYNC,
            secret: Some(secret),
        }
    }

    pub fn unsubscribe(callback: String, topic: String) -> Self {
        HubRequest {
            callback,
            mode: String::from(HubMode::Unsubscribe),
            topic,
            verify: VERIFY_ASYNC,
            secret: None,
        }
    }
}

// =============================================================================
// Inbound (hub -> subscriber)
// =============================================================================

/// Query string of a callback request: the `topic` we embedded into the
/// callback URL plus whatever `hub.*` parameters the hub appended.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub topic: Option<String>,
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.topic")]
    pub hub_topic: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
    #[serde(rename = "hub.lease_seconds")]
    pub lease_seconds: Option<i64>,
    #[serde(rename = "hub.reason")]
    pub reason: Option<String>,
}
