use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{error::Error, model::Subscription};

mod postgre;

pub use postgre::{get_path, migration_files, PoolOption, PoolType, QueryResult};

/// Topic-keyed persistence for subscriptions.
///
/// Every state transition driven by the hub goes through a conditional
/// write, so two handshakes racing on the same topic cannot both win.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Creates the record for `topic`, or resets an existing one back to
    /// the unconfirmed state. An already stored secret is kept.
    async fn upsert(
        &self,
        topic: &str,
        secret: &[u8],
    ) -> Result<Subscription, Error>;

    async fn get_by_topic(
        &self,
        topic: &str,
    ) -> Result<Option<Subscription>, Error>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>, Error>;

    async fn get_all(&self) -> Result<Vec<Subscription>, Error>;

    /// Flags the subscription for removal; `None` when no record exists.
    async fn mark_unsubscribe(
        &self,
        topic: &str,
    ) -> Result<Option<Subscription>, Error>;

    /// Confirms an unconfirmed subscription. Returns `false` when the topic
    /// is unknown or was already confirmed.
    async fn confirm(
        &self,
        topic: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, Error>;

    /// Deletes a subscription whose removal was requested. Returns `false`
    /// when the topic is unknown or not pending removal.
    async fn delete_pending(&self, topic: &str) -> Result<bool, Error>;
}
