use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;

use league_backend::{configure_routes, connect_and_migrate, init_tracing, load_dotenv, prepare_state, AppConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let config = AppConfig::from_env();
    info!("Starting league backend server");

    let db = connect_and_migrate(&config).await?;
    prepare_state(&db, &config).await?;

    let bind = (config.host.clone(), config.port);
    info!(host = %bind.0, port = bind.1, "listening");

    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config_data.cors_allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
