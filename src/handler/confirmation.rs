use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};

use crate::{dao::SubscriptionStore, error::Error};

/// Answers the hub's verification of a subscribe request.
///
/// Only a known, not yet confirmed topic is accepted. Anything else, a
/// replayed verification included, is rejected without touching the store.
/// Returns the lease expiry that was recorded.
pub async fn handle_subscribe<S: SubscriptionStore + ?Sized>(
    store: &S,
    topic: &str,
    lease_seconds: i64,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, Error> {
    let expires = TimeDelta::try_seconds(lease_seconds)
        .filter(|_| lease_seconds >= 0)
        .and_then(|lease| now.checked_add_signed(lease))
        .ok_or_else(|| {
            warn!("Invalid lease {} for {}", lease_seconds, topic);
            Error::HandshakeRejected(topic.to_owned())
        })?;

    match store.get_by_topic(topic).await? {
        Some(subscription) if !subscription.confirmed => {},
        Some(_) => {
            warn!("Subscribe verification for confirmed topic {}", topic);
            return Err(Error::HandshakeRejected(topic.to_owned()));
        },
        None => {
            warn!("Subscribe verification for unknown topic {}", topic);
            return Err(Error::HandshakeRejected(topic.to_owned()));
        },
    }

    // A concurrent verification may have won in between.
    if !store.confirm(topic, expires).await? {
        return Err(Error::HandshakeRejected(topic.to_owned()));
    }

    info!("Subscription to {} confirmed until {}", topic, expires);
    Ok(expires)
}

/// Answers the hub's verification of an unsubscribe request. Only removals
/// this subscriber asked for are honoured.
pub async fn handle_unsubscribe<S: SubscriptionStore + ?Sized>(
    store: &S,
    topic: &str,
) -> Result<(), Error> {
    match store.get_by_topic(topic).await? {
        Some(subscription) if subscription.unsubscribe_pending => {},
        Some(_) => {
            warn!("Unrequested unsubscribe verification for {}", topic);
            return Err(Error::HandshakeRejected(topic.to_owned()));
        },
        None => {
            warn!("Unsubscribe verification for unknown topic {}", topic);
            return Err(Error::HandshakeRejected(topic.to_owned()));
        },
    }

    if !store.delete_pending(topic).await? {
        return Err(Error::HandshakeRejected(topic.to_owned()));
    }

    info!("Subscription to {} removed", topic);
    Ok(())
}

/// The hub refused or revoked a subscription. State is left as is so the
/// operator can inspect and retry.
pub async fn handle_denied<S: SubscriptionStore + ?Sized>(
    store: &S,
    topic: &str,
    reason: Option<&str>,
) -> Result<(), Error> {
    let known = store.get_by_topic(topic).await?.is_some();
    warn!(
        "Hub denied subscription to {} (known: {}, reason: {})",
        topic,
        known,
        reason.unwrap_or("none")
    );

    Ok(())
}
