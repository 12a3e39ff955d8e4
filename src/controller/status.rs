use actix_web::{get, web, Responder};
use chrono::Utc;
use serde::Serialize;

use crate::{
    configuration::{AppState, State},
    dao::SubscriptionStore,
    error::Error,
    model::Subscription,
};

#[get("/status")]
async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

    let items = state.database.subscription.get_all().await?;
    let counts = Counts::from_subscriptions(&items);

    Ok(web::Json(Response {
        version: VERSION,
        callback: state.config.callback_endpoint()?.to_string(),
        subscriptions: counts,
    }))
}

#[derive(Debug, Serialize)]
pub struct Response<'a> {
    pub version: Option<&'a str>,
    pub callback: String,
    pub subscriptions: Counts,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct Counts {
    pub pending: usize,
    pub confirmed: usize,
    pub unsubscribe_pending: usize,
    pub expired: usize,
}

impl Counts {
    pub fn from_subscriptions(items: &[Subscription]) -> Counts {
        let now = Utc::now();
        let mut counts = Counts::default();

        for item in items {
            if item.unsubscribe_pending {
                counts.unsubscribe_pending += 1;
            } else if item.confirmed {
                counts.confirmed += 1;
            } else {
                counts.pending += 1;
            }

            if item.is_expired(now) {
                counts.expired += 1;
            }
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    #[test]
    fn test_counts_by_state() {
        let pending = Subscription::new(String::from("http://a/"), vec![1]);
        let confirmed = MemoryStore::confirmed("http://b/", &[1]);
        let mut leaving = MemoryStore::confirmed("http://c/", &[1]);
        leaving.unsubscribe_pending = true;
        let mut expired = MemoryStore::confirmed("http://d/", &[1]);
        expired.expires = Some(Utc::now() - chrono::TimeDelta::minutes(1));

        let counts =
            Counts::from_subscriptions(&[pending, confirmed, leaving, expired]);

        assert_eq!(
            counts,
            Counts {
                pending: 1,
                confirmed: 2,
                unsubscribe_pending: 1,
                expired: 1,
            }
        );
    }
}
