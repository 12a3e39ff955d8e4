use rand::{rngs::OsRng, RngCore};
use tracing::info;

use crate::{
    configuration::Config,
    dao::SubscriptionStore,
    error::Error,
    handler::discovery::discover,
    model::Subscription,
    provider::HTTP,
    types::HubRequest,
};

/// Secret length in bytes; HMAC-SHA1 keys should not be shorter than the
/// 20 byte digest.
pub const SECRET_LENGTH: usize = 32;

pub fn generate_secret() -> Vec<u8> {
    let mut secret = vec![0u8; SECRET_LENGTH];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Starts subscribe and unsubscribe handshakes. Completion arrives later,
/// through the callback endpoint.
pub struct SubscriberClient<'a, S: SubscriptionStore + ?Sized> {
    config: &'a Config,
    store: &'a S,
    http: &'a HTTP,
}

impl<'a, S: SubscriptionStore + ?Sized> SubscriberClient<'a, S> {
    pub fn new(config: &'a Config, store: &'a S, http: &'a HTTP) -> Self {
        SubscriberClient {
            config,
            store,
            http,
        }
    }

    pub async fn subscribe(
        &self,
        resource_url: &str,
    ) -> Result<Subscription, Error> {
        let links = discover(self.http, resource_url).await?;
        let topic = links.self_url;

        let subscription =
            self.store.upsert(&topic, &generate_secret()).await?;
        let secret = subscription.hex_secret().ok_or_else(|| {
            Error::ServerError(format!("Subscription {} has no secret", topic))
        })?;

        let callback = self.config.callback_url(&topic)?;
        let request = HubRequest::subscribe(callback, topic.to_owned(), secret);
        self.send(&links.hub, &request).await?;

        info!("Subscribe request for {} sent to {}", topic, links.hub);
        Ok(subscription)
    }

    pub async fn unsubscribe(
        &self,
        resource_url: &str,
    ) -> Result<Subscription, Error> {
        let links = discover(self.http, resource_url).await?;
        let topic = links.self_url;

        let subscription = self
            .store
            .mark_unsubscribe(&topic)
            .await?
            .ok_or_else(|| Error::NoSubscription(topic.to_owned()))?;

        let callback = self.config.callback_url(&topic)?;
        let request = HubRequest::unsubscribe(callback, topic.to_owned());
        self.send(&links.hub, &request).await?;

        info!("Unsubscribe request for {} sent to {}", topic, links.hub);
        Ok(subscription)
    }

    async fn send(&self, hub: &str, request: &HubRequest) -> Result<(), Error> {
        let status = self.http.post_hub_request(hub, request).await?;

        if !(200..300).contains(&status) {
            return Err(Error::HubRequest {
                status,
                hub: hub.to_owned(),
            });
        }

        Ok(())
    }
}
