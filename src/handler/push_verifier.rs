use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::{info, warn};

use crate::{dao::SubscriptionStore, error::Error, sink::ContentSink};

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_PREFIX: &str = "sha1=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Signature matched and the sink took the payload.
    Applied,
    /// Signature missing or wrong; the payload was dropped.
    Discarded,
}

// The hub received the secret hex encoded and keys the HMAC with that text.
fn mac(secret: &[u8]) -> Result<HmacSha1, Error> {
    Ok(HmacSha1::new_from_slice(hex::encode(secret).as_bytes())?)
}

/// `X-Hub-Signature` value a hub holding `secret` sends for `payload`.
pub fn sign(secret: &[u8], payload: &[u8]) -> Result<String, Error> {
    let mut mac = mac(secret)?;
    mac.update(payload);
    let digest = mac.finalize().into_bytes();

    Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(digest)))
}

pub fn verify_signature(
    secret: &[u8],
    signature: Option<&str>,
    payload: &[u8],
) -> Result<bool, Error> {
    let Some(signature) = signature else {
        return Ok(false);
    };

    let signature = signature.trim();
    let digest = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or(signature);
    let Ok(expected) = hex::decode(digest) else {
        return Ok(false);
    };

    let mut mac = mac(secret)?;
    mac.update(payload);

    Ok(mac.verify_slice(&expected).is_ok())
}

/// Gates a pushed payload on its HMAC signature.
///
/// An unknown or unconfirmed topic is an error. A bad signature is not:
/// the delivery is acknowledged so the hub does not retry, but nothing
/// reaches the sink.
pub async fn handle_push<S: SubscriptionStore + ?Sized>(
    store: &S,
    sink: &dyn ContentSink,
    topic: &str,
    signature: Option<&str>,
    payload: &[u8],
) -> Result<PushOutcome, Error> {
    let subscription = match store.get_by_topic(topic).await? {
        Some(subscription) if subscription.confirmed => subscription,
        _ => {
            warn!("Push for unknown or unconfirmed topic {}", topic);
            return Err(Error::PushRejected(topic.to_owned()));
        },
    };

    let authentic = match &subscription.secret {
        Some(secret) => verify_signature(secret, signature, payload)?,
        None => false,
    };

    if !authentic {
        warn!(
            "Discarding push for {} ({} bytes): signature mismatch",
            topic,
            payload.len()
        );
        return Ok(PushOutcome::Discarded);
    }

    sink.apply(topic, payload).await?;
    info!("Applied push for {} ({} bytes)", topic, payload.len());

    Ok(PushOutcome::Applied)
}
