//! Demo entry-point: serves the in-memory users and chocolates resources.

use actix_web::{App, HttpServer};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use jsonapi_server::{Api, ApiSettings, Trace, demo};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ApiSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load configuration: {e}")))?;
    let mut api = Api::from_settings(&settings);
    demo::register(&mut api).map_err(std::io::Error::other)?;
    let registry = api.build();

    info!(bind_addr = %settings.bind_addr(), base_url = %settings.base_url(), "starting server");
    HttpServer::new(move || {
        let registry = registry.clone();
        App::new()
            .wrap(Trace)
            .configure(move |cfg| registry.configure(cfg))
    })
    .bind(settings.bind_addr())?
    .run()
    .await
}
