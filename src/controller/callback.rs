//! Hub-facing callback endpoint.
//!
//! The hub learns outcomes from the status line only; bodies are either the
//! echoed challenge or empty.

use std::{str::FromStr, sync::Arc};

use actix_web::{web, HttpRequest, HttpResponse, Resource, ResponseError};
use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::{
    configuration::{Config, State},
    dao::SubscriptionStore,
    error::Error,
    handler::{handle_denied, handle_push, handle_subscribe, handle_unsubscribe},
    sink::ContentSink,
    types::{CallbackQuery, HubMode, SIGNATURE_HEADER},
};

/// What the callback handlers need from the application state.
pub struct CallbackState {
    pub config: Config,
    pub store: Arc<dyn SubscriptionStore>,
    pub sink: Arc<dyn ContentSink>,
}

impl CallbackState {
    pub fn new(
        config: Config,
        store: Arc<dyn SubscriptionStore>,
        sink: Arc<dyn ContentSink>,
    ) -> CallbackState {
        CallbackState {
            config,
            store,
            sink,
        }
    }

    pub fn from_state(state: &State) -> CallbackState {
        CallbackState::new(
            state.config.clone(),
            Arc::new(state.database.subscription.clone()),
            state.sink.clone(),
        )
    }
}

/// GET answers handshakes, POST takes pushes.
pub fn resource(path: &str) -> Resource {
    web::resource(path.to_owned())
        .route(web::get().to(verify))
        .route(web::post().to(push))
}

pub async fn verify(
    state: web::Data<CallbackState>,
    query: Result<web::Query<CallbackQuery>, actix_web::Error>,
) -> HttpResponse {
    let query = match query {
        Ok(query) => query.into_inner(),
        Err(err) => return extractor_response("handshake query", err),
    };

    let result = respond_verification(
        state.store.as_ref(),
        &state.config,
        query,
        Utc::now(),
    )
    .await;

    hub_response(result)
}

pub async fn push(
    state: web::Data<CallbackState>,
    query: Result<web::Query<CallbackQuery>, actix_web::Error>,
    req: HttpRequest,
    body: Result<web::Bytes, actix_web::Error>,
) -> HttpResponse {
    let query = match query {
        Ok(query) => query.into_inner(),
        Err(err) => return extractor_response("push query", err),
    };
    let body = match body {
        Ok(body) => body,
        Err(err) => return extractor_response("push body", err),
    };

    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let result = respond_push(
        state.store.as_ref(),
        state.sink.as_ref(),
        query,
        signature,
        &body,
    )
    .await;

    hub_response(result)
}

pub async fn respond_verification<S: SubscriptionStore + ?Sized>(
    store: &S,
    config: &Config,
    query: CallbackQuery,
    now: DateTime<Utc>,
) -> Result<HttpResponse, Error> {
    let mode = query
        .mode
        .as_deref()
        .ok_or_else(|| Error::MissingParams(String::from("hub.mode")))?;
    let mode = HubMode::from_str(mode)
        .map_err(|_| Error::MissingParams(format!("hub.mode={}", mode)))?;
    let topic = query
        .hub_topic
        .ok_or_else(|| Error::MissingParams(String::from("hub.topic")))?;

    // The callback URL names the topic it was issued for.
    if let Some(callback_topic) = &query.topic {
        if callback_topic != &topic {
            return Err(Error::HandshakeRejected(topic));
        }
    }

    match mode {
        HubMode::Subscribe => {
            let challenge = required_challenge(query.challenge)?;
            let lease = query
                .lease_seconds
                .unwrap_or(config.default_lease_seconds);
            handle_subscribe(store, &topic, lease, now).await?;
            Ok(challenge_response(challenge))
        },
        HubMode::Unsubscribe => {
            let challenge = required_challenge(query.challenge)?;
            handle_unsubscribe(store, &topic).await?;
            Ok(challenge_response(challenge))
        },
        HubMode::Denied => {
            handle_denied(store, &topic, query.reason.as_deref()).await?;
            Ok(HttpResponse::Ok().content_type("text/plain").finish())
        },
    }
}

pub async fn respond_push<S: SubscriptionStore + ?Sized>(
    store: &S,
    sink: &dyn ContentSink,
    query: CallbackQuery,
    signature: Option<&str>,
    payload: &[u8],
) -> Result<HttpResponse, Error> {
    let topic = query
        .topic
        .ok_or_else(|| Error::MissingParams(String::from("topic")))?;

    handle_push(store, sink, &topic, signature, payload).await?;

    Ok(HttpResponse::Ok().content_type("text/plain").finish())
}

fn required_challenge(challenge: Option<String>) -> Result<String, Error> {
    challenge.ok_or_else(|| Error::MissingParams(String::from("hub.challenge")))
}

fn challenge_response(challenge: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body(challenge)
}

fn extractor_response(part: &str, err: actix_web::Error) -> HttpResponse {
    let status = err.as_response_error().status_code();
    warn!("Malformed callback {}: {}", part, err);

    HttpResponse::build(status).content_type("text/plain").finish()
}

fn hub_response(result: Result<HttpResponse, Error>) -> HttpResponse {
    match result {
        Ok(response) => response,
        Err(err) => {
            let status = err.status_code();
            if status.is_server_error() {
                error!("Callback failed: {}", err);
            }
            HttpResponse::build(status).content_type("text/plain").finish()
        },
    }
}
