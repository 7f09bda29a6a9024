//! Take a Break - reminds you to step away from the keyboard
//!
//! This is the main entry point for the take-a-break service.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::info;

use take_a_break::{
    api::create_router,
    config::{Config, NotifierKind},
    services::{DesktopNotifier, FileSuggestions, JsonFileStore, LogNotifier, Notifier, SettingsStore},
    state::AppState,
    tasks::{BreakService, Collaborators},
    utils::shutdown_signal,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("take_a_break={},tower_http=info", config.log_level()))
        .init();

    info!("Starting take-a-break v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, settings={}, activities={}, notifier={:?}",
          config.host, config.port, config.settings.display(),
          config.activities.display(), config.notifier);

    let store: Arc<dyn SettingsStore> = Arc::new(JsonFileStore::open(&config.settings).await?);

    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let notifier: Arc<dyn Notifier> = match config.notifier {
        NotifierKind::Desktop => Arc::new(DesktopNotifier::new("Take a Break", events_tx.clone())),
        NotifierKind::Log => Arc::new(LogNotifier::new()),
    };

    let collaborators = Collaborators {
        store: Arc::clone(&store),
        suggestions: Arc::new(FileSuggestions::new(&config.activities)),
        notifier,
        icon: config.icon.clone(),
    };

    // The break service owns the timer; everything else talks to it via events
    let service = BreakService::load(collaborators, events_tx.clone(), config.tick_period()).await?;
    let status_rx = service.subscribe();
    tokio::spawn(service.run(events_rx));

    let state = Arc::new(AppState::new(
        events_tx,
        status_rx,
        store,
        config.port,
        config.host.clone(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /                                  - Settings page");
    info!("  GET  /settings                          - Read break interval");
    info!("  POST /settings                          - Update break interval");
    info!("  POST /snooze                            - Snooze for 10 minutes");
    info!("  POST /notifications/:id/buttons/:index  - Notification button callback");
    info!("  GET  /status                            - Current break status");
    info!("  GET  /health                            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
