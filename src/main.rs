use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use lead_intake::config::Config;
use lead_intake::{routes, AppState};

fn cors(config: &Config) -> Cors {
    if config.is_development {
        return Cors::permissive();
    }

    config
        .cors_domains
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["POST", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,lead_intake=debug")),
        )
        .init();

    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let bind = (config.service_host.clone(), config.service_port);
    tracing::info!("Server started at http://{}:{}", bind.0, bind.1);

    let state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&state.config))
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind(bind)?
    .workers(2)
    .run()
    .await
}
