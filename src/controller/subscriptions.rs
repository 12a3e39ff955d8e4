use actix_web::{get, web, Responder};

use crate::{
    configuration::{AppState, State},
    dao::SubscriptionStore,
    error::Error,
};

/// Secrets never leave the store through this listing.
#[get("/subscriptions")]
async fn index(
    state: web::Data<AppState<State>>,
) -> Result<impl Responder, Error> {
    let data = state.database.subscription.get_all().await?;
    Ok(web::Json(data))
}

#[get("/subscriptions/{id}")]
async fn get_one(
    state: web::Data<AppState<State>>,
    path: web::Path<i64>,
) -> Result<impl Responder, Error> {
    let id = path.into_inner();
    let data = state
        .database
        .subscription
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NoSubscription(id.to_string()))?;

    Ok(web::Json(data))
}
