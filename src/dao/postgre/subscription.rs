use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::QueryResult;
use crate::{
    dao::SubscriptionStore,
    error::Error,
    model::{Subscription, Table},
};

#[async_trait]
impl SubscriptionStore for Table<Subscription> {
    async fn upsert(
        &self,
        topic: &str,
        secret: &[u8],
    ) -> Result<Subscription, Error> {
        let data = sqlx::query_as(
            r#"
            INSERT INTO "push_subscription" (topic, secret, expires, confirmed, unsubscribe_pending)
            VALUES($1, $2, NULL, false, false)
            ON CONFLICT (topic) DO UPDATE SET
                secret = COALESCE("push_subscription".secret, EXCLUDED.secret),
                expires = NULL,
                confirmed = false,
                unsubscribe_pending = false
            RETURNING *
            "#,
        )
        .bind(topic)
        .bind(secret)
        .fetch_one(&self.pool)
        .await?;

        Ok(data)
    }

    async fn get_by_topic(
        &self,
        topic: &str,
    ) -> Result<Option<Subscription>, Error> {
        let data = sqlx::query_as(
            r#"
            SELECT * FROM "push_subscription" WHERE topic = $1
            "#,
        )
        .bind(topic)
        .persistent(true)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>, Error> {
        let data = sqlx::query_as(
            r#"
            SELECT * FROM "push_subscription" WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data)
    }

    async fn get_all(&self) -> Result<Vec<Subscription>, Error> {
        let data = sqlx::query_as(
            r#"
            SELECT * FROM "push_subscription" ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(data)
    }

    async fn mark_unsubscribe(
        &self,
        topic: &str,
    ) -> Result<Option<Subscription>, Error> {
        let data = sqlx::query_as(
            r#"
            UPDATE "push_subscription" SET unsubscribe_pending = true
            WHERE topic = $1
            RETURNING *
            "#,
        )
        .bind(topic)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data)
    }

    async fn confirm(
        &self,
        topic: &str,
        expires: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let result: QueryResult = sqlx::query(
            r#"
            UPDATE "push_subscription" SET confirmed = true, expires = $2
            WHERE topic = $1 AND confirmed = false
            "#,
        )
        .bind(topic)
        .bind(expires)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_pending(&self, topic: &str) -> Result<bool, Error> {
        let result: QueryResult = sqlx::query(
            r#"
            DELETE FROM "push_subscription"
            WHERE topic = $1 AND unsubscribe_pending = true
            "#,
        )
        .bind(topic)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
