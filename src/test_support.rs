//! In-process doubles for the store and the content sink.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    configuration::{Config, DEFAULT_CALLBACK_PATH},
    dao::SubscriptionStore,
    error::Error,
    model::Subscription,
    sink::ContentSink,
};

pub fn test_config(site_url: &str) -> Config {
    Config {
        database_url: String::from("postgres://localhost/pshb_test"),
        server_host: String::from("127.0.0.1"),
        port: 0,
        site_url: site_url.to_owned(),
        callback_path: String::from(DEFAULT_CALLBACK_PATH),
        timeout: 5,
        max_connections: 1,
        max_payload_size: 64 * 1024,
        default_lease_seconds: 3600,
        spool_directory: None,
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, Subscription>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    /// Stores `subscription` as is, assigning an id when it has none.
    pub fn put(&self, mut subscription: Subscription) -> Subscription {
        if subscription.id.is_none() {
            subscription.id =
                Some(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        }
        self.rows
            .lock()
            .unwrap()
            .insert(subscription.topic.clone(), subscription.clone());
        subscription
    }

    pub fn get(&self, topic: &str) -> Option<Subscription> {
        self.rows.lock().unwrap().get(topic).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn confirmed(topic: &str, secret: &[u8]) -> Subscription {
        let mut subscription =
            Subscription::new(topic.to_owned(), secret.to_vec());
        subscription.confirmed = true;
        subscription.expires = Some(Utc::now() + chrono::Duration::hours(1));
        subscription
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn upsert(
        &self,
        topic: &str,
        secret: &[u8],
    ) -> Result<Subscription, Error> {
        let mut rows = self.rows.lock().unwrap();
        let subscription = match rows.get_mut(topic) {
            Some(item) => {
                if item.secret.is_none() {
                    item.secret = Some(secret.to_vec());
                }
                item.expires = None;
                item.confirmed = false;
                item.unsubscribe_pending = false;
                item.clone()
            },
            None => {
                let mut item =
                    Subscription::new(topic.to_owned(), secret.to_vec());
                item.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                rows.insert(topic.to_owned(), item.clone());
                item
            },
        };

        Ok(subscription)
    }

    async fn get_by_topic(
        &self,
        topic: &str,
    ) -> Result<Option<Subscription>, Error> {
        Ok(self.get(topic))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>, Error> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|item| item.id == Some(id)).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Subscription>, Error> {
        let mut items: Vec<Subscription> =
            self.rows.lock().unwrap().values().cloned().collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn mark_unsubscribe(
        &self,
        topic: &str,
    ) -> Result<Option<Subscription>, Error> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(topic).map(|item| {
            item.unsubscribe_pending = true;
            item.clone()
        }))
    }

    async fn confirm(
        &self,
        topic: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(topic) {
            Some(item) if !item.confirmed => {
                item.confirmed = true;
                item.expires = Some(expires);
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    async fn delete_pending(&self, topic: &str) -> Result<bool, Error> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get(topic) {
            Some(item) if item.unsubscribe_pending => {
                rows.remove(topic);
                Ok(true)
            },
            _ => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub applied: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        RecordingSink {
            applied: Mutex::new(vec![]),
            fail: true,
        }
    }

    pub fn count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentSink for RecordingSink {
    async fn apply(&self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        if self.fail {
            return Err(Error::SinkError(String::from("import failed")));
        }
        self.applied
            .lock()
            .unwrap()
            .push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_share_one_record() {
        let store = Arc::new(MemoryStore::default());

        let mut handles = vec![];
        for seed in 0..16u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.upsert("http://res/", &[seed; 32]).await
            }));
        }

        let stored = {
            let mut results = vec![];
            for handle in handles {
                results.push(handle.await.unwrap().unwrap());
            }
            results
        };

        let kept = store.get("http://res/").unwrap();
        assert_eq!(store.len(), 1);
        for item in stored {
            assert_eq!(item.id, kept.id);
            assert_eq!(item.secret, kept.secret);
        }
    }

    #[tokio::test]
    async fn test_upsert_resets_confirmation() {
        let store = MemoryStore::default();
        store.put(MemoryStore::confirmed("http://res/", &[1; 32]));

        let item = store.upsert("http://res/", &[2; 32]).await.unwrap();

        assert!(!item.confirmed);
        assert_eq!(item.expires, None);
        assert_eq!(item.secret, Some(vec![1; 32]));
        assert!(store.confirm("http://res/", Utc::now()).await.unwrap());
        assert!(!store.confirm("http://res/", Utc::now()).await.unwrap());
    }
}
