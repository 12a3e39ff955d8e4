use actix_web::{dev::Server, middleware, web, App, HttpServer};
use tracing::info;

use crate::{
    configuration::{AppState, State},
    controller::{
        callback::{self, CallbackState},
        status, subscriptions,
    },
    error::Error,
};

pub async fn server_task(app_state: &AppState<State>) -> Result<(), Error> {
    let app = app_state.clone();
    tokio::spawn(async move {
        let server = init_server(app)?;
        server.await?;
        Ok(())
    })
    .await?
}

fn init_server(app_state: AppState<State>) -> Result<Server, Error> {
    let host = app_state.config.server_host.to_owned();
    let port = app_state.config.port;
    info!(
        "Listening on {}:{}, callback {}",
        host, port, app_state.config.callback_path
    );

    let callback_state = web::Data::new(CallbackState::from_state(&app_state));

    let server = HttpServer::new(move || {
        let callback_path = app_state.config.callback_path.to_owned();
        let payload_limit = app_state.config.max_payload_size;

        App::new()
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(app_state.clone()))
            .app_data(callback_state.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .service(callback::resource(&callback_path))
            .service(
                web::scope("/api")
                    .service(status::index)
                    .service(subscriptions::index)
                    .service(subscriptions::get_one),
            )
    })
    .bind((host, port))?
    .run();

    Ok(server)
}
