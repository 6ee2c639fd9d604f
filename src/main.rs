// src/main.rs
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web, middleware::Logger};
use log::{error, info};
use reqwest::Client;

use postboard_be::config::{mask_key, Config};
use postboard_be::repositories::supabase::SupabaseClient;
use postboard_be::{routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Supabase URL: {}", config.supabase_url);
    info!("Supabase Key: {}", mask_key(&config.supabase_anon_key));
    if let Some(ref key) = config.supabase_service_role_key {
        info!("Supabase service role key: {}", mask_key(key));
    }

    let http_client = Client::builder()
        .user_agent("postboard-be/0.1")
        .build()
        .expect("failed to build http client");

    let backend = Arc::new(SupabaseClient::new(&config, http_client));
    let state = web::Data::new(AppState::with_backend(backend, &config));

    let allowed_origins = config.allowed_origins.clone();
    let bind_address = config.bind_address();
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                "authorization",
                "content-type",
                "accept",
                "x-requested-with"
            ])
            .supports_credentials()
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
