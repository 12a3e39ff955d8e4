use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A subscriber-side WebSub subscription, keyed by its canonical topic URL.
#[derive(Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct Subscription {
    pub id: Option<i64>,
    pub topic: String,
    #[serde(skip_serializing)]
    pub secret: Option<Vec<u8>>,
    pub expires: Option<DateTime<Utc>>,
    pub confirmed: bool,
    pub unsubscribe_pending: bool,
}

impl Subscription {
    /// A not yet persisted, unconfirmed subscription.
    pub fn new(topic: String, secret: Vec<u8>) -> Self {
        Subscription {
            id: None,
            topic,
            secret: Some(secret),
            expires: None,
            confirmed: false,
            unsubscribe_pending: false,
        }
    }

    /// The secret in the form it was handed to the hub (`hub.secret`).
    pub fn hex_secret(&self) -> Option<String> {
        self.secret.as_ref().map(hex::encode)
    }

    /// Lapse is informational only; nothing deletes expired rows.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires {
            Some(expires) => expires <= now,
            None => false,
        }
    }

    pub fn state(&self) -> &'static str {
        match (self.confirmed, self.unsubscribe_pending) {
            (_, true) => "unsubscribe-pending",
            (true, false) => "confirmed",
            (false, false) => "pending",
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("expires", &self.expires)
            .field("confirmed", &self.confirmed)
            .field("unsubscribe_pending", &self.unsubscribe_pending)
            .finish()
    }
}
