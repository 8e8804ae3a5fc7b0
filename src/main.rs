use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use sqlx::postgres::PgPoolOptions;

use tasknest::{routes, Config, CredentialService};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Refuse to start without a usable signing secret rather than failing per request.
    let config = Config::from_env().context("invalid configuration")?;
    let credentials = web::Data::new(
        CredentialService::new(&config.jwt_secret).context("cannot build credential service")?,
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;
    log::info!("database ready");

    log::info!("starting server at {}", config.server_url());
    HttpServer::new(move || {
        let credentials = credentials.clone();
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(credentials.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(web::scope("/api").configure(|cfg| routes::config(cfg, &credentials)))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    Ok(())
}
