use budgetpay::{
    ai::OpenRouterClient,
    api::{handlers::AppState, routes},
    auth::google::GoogleAuthClient,
    cli::{Cli, Commands},
    config::Settings,
    db,
    notify::{scheduler::Scheduler, NotificationHub},
    Error, Result,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,budgetpay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Migrate => {
            migrate(settings).await?;
        }
        Commands::CreateSuperuser {
            email,
            password,
            full_name,
        } => {
            create_superuser(settings, email, password, full_name).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Budget Pay API server");
    info!("Database: {}", settings.database.url);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Initialize database with connection pooling configuration
    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    // Run migrations
    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    // Notification fan-out hub
    let hub = Arc::new(NotificationHub::new());

    // Google OAuth client (routes report an error when unconfigured)
    let google = GoogleAuthClient::new(settings.google.clone())?;
    if settings.google.is_enabled() {
        info!("Google OAuth enabled");
    } else {
        warn!("Google OAuth not configured - /auth/google routes will reject");
    }

    // OpenRouter client for the chatbot and insight generation
    let ai = OpenRouterClient::from_config(&settings.ai, &settings.server.backend_base_url)?;
    if ai.is_some() {
        info!("OpenRouter AI integration enabled");
    } else {
        warn!("OPENROUTER_API_KEY not set - AI endpoints will reject");
    }

    // Start background scheduler (due bills, overspend alerts)
    let scheduler = Arc::new(Scheduler::new(
        pool.clone(),
        hub.clone(),
        settings.scheduler.interval_seconds,
    ));
    let _scheduler_handle = scheduler.start();
    info!(
        "Notification scheduler started (interval: {}s)",
        settings.scheduler.interval_seconds
    );

    // Create application state
    let state = AppState {
        pool,
        settings: settings.clone(),
        hub,
        google,
        ai,
    };

    // Create router
    let app = routes::create_router(state, &settings);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Budget Pay API");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Database: Connected");
    println!(
        "Scheduler: Active ({}s interval)",
        settings.scheduler.interval_seconds
    );
    println!("\nAPI Endpoints:");
    println!("  POST /api/v1/auth/register");
    println!("  POST /api/v1/auth/jwt/login");
    println!("  GET  /api/v1/users/me");
    println!("  GET  /api/v1/dashboard/summary");
    println!("  GET  /api/v1/notification/");
    println!("  GET  /api/v1/notification/ws?token=<JWT>");
    println!("  POST /api/v1/chatbot/ask");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn migrate(settings: Settings) -> Result<()> {
    info!("Running database migrations");

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    println!("\u{2713} Database migrations completed successfully");
    Ok(())
}

async fn create_superuser(
    settings: Settings,
    email: String,
    password: String,
    full_name: Option<String>,
) -> Result<()> {
    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    budgetpay::cli::commands::create_superuser(&pool, &email, &password, full_name).await
}
