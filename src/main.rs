use std::sync::Arc;

use config::Config;
use handlers::auth::configure_cors;
use repositories::PostgresRepo;
use routes::create_router;
use services::{
    auth::AuthService, comments::CommentService, images::FsImageService, posts::PostService,
};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

pub use self::errors::{Error, Result};

mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth_service: AuthService,
    pub post_service: PostService,
    pub comment_service: CommentService,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Connected to the database");
            pool
        }
        Err(err) => {
            error!("Failed to connect to the database: {err:?}");
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!().run(&pool).await {
        error!("Failed to run migrations: {err:?}");
        std::process::exit(1);
    }

    let repo = Arc::new(PostgresRepo::new(pool));
    let image_service = Arc::new(FsImageService::new(repo.clone(), config.upload_dir.clone()));

    let app_state = AppState {
        config: config.clone(),
        auth_service: AuthService::new(repo.clone(), config.jwt_secret.clone(), config.jwt_maxage),
        post_service: PostService::new(repo.clone(), image_service),
        comment_service: CommentService::new(repo),
    };

    let app = create_router(Arc::new(app_state)).layer(configure_cors());

    let listener = tokio::net::TcpListener::bind(format!("[::]:{}", config.port))
        .await
        .expect("Failed to bind the server port");

    info!("Listening on port {}", config.port);
    axum::serve(listener, app).await.expect("Server error");
}
