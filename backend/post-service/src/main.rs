use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use post_service::db::{PgPostStore, PostStore};
use post_service::handlers;
use post_service::metrics::serve_metrics;
use post_service::middleware::RequestTimer;
use post_service::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: sqlx::PgPool,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "post-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "post-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting post-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    sqlx::migrate!("./migrations").run(&db_pool).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to run database migrations: {e}"),
        )
    })?;

    tracing::info!("Connected to database, migrations applied");

    let store: Arc<dyn PostStore> = Arc::new(PgPostStore::new(
        db_pool.clone(),
        config.store.op_timeout(),
    ));
    let store_data = web::Data::new(store);
    let health_state = web::Data::new(HealthState { db_pool });

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(store_data.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(RequestTimer)
            .route("/metrics", web::get().to(serve_metrics))
            // Health check endpoints
            .route("/health", web::get().to(health_summary))
            .route("/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api")
                    .route("/posts/", web::get().to(handlers::list_posts))
                    .route("/posts", web::post().to(handlers::create_post))
                    .route(
                        "/posts/{category}",
                        web::get().to(handlers::list_posts_by_category),
                    )
                    .route(
                        "/post/{post_id}/upvote",
                        web::get().to(handlers::upvote_post),
                    )
                    .route(
                        "/post/{post_id}/downvote",
                        web::get().to(handlers::downvote_post),
                    )
                    .route(
                        "/post/{post_id}/unvote",
                        web::get().to(handlers::unvote_post),
                    )
                    .route("/post/{post_id}", web::get().to(handlers::get_post))
                    .route("/post/{post_id}", web::post().to(handlers::create_comment))
                    .route("/post/{post_id}", web::delete().to(handlers::delete_post))
                    .route(
                        "/post/{post_id}/{comment_id}",
                        web::delete().to(handlers::delete_comment),
                    )
                    .route(
                        "/user/{username}",
                        web::get().to(handlers::list_posts_by_user),
                    ),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run()
    .await
}
