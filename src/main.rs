//! Proctor Clock - a countdown server for proctored exams
//! 
//! This is the main entry point for the proctor-clock application.

use std::sync::Arc;
use anyhow::{anyhow, Context};
use tokio::net::TcpListener;
use tracing::{info, warn};

use proctor_clock::{
    api::create_router,
    config::Config,
    services::{
        check_program_available, CommandAmbientLoop, CommandAnnouncer, KeepAwake, LogHaptics,
        NoopEffects, SideEffects, SystemdInhibitor,
    },
    session::SessionController,
    state::{AppState, FileStore, SessionConfig},
    tasks::{
        engine_event_task, keep_awake_watchdog_task, spawn_countdown_engine,
        KEEP_AWAKE_CHECK_INTERVAL,
    },
    utils::{shutdown_signal, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("proctor_clock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting proctor-clock server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, state_dir={}, tick={}ms",
          config.host, config.port, config.state_dir.display(), config.tick_ms);

    SessionConfig::parse(&config.default_config)
        .map_err(|e| anyhow!("--default-config {:?}: {}", config.default_config, e))?;

    let store = FileStore::open(&config.state_dir)
        .context("Failed to open state directory")?;

    // Keep-awake is optional; the countdown works without it
    let keep_awake: Arc<dyn KeepAwake> = if config.no_keep_awake {
        Arc::new(NoopEffects)
    } else if let Err(e) = check_program_available("systemd-inhibit").await {
        warn!("{}, keep-awake disabled", e);
        Arc::new(NoopEffects)
    } else {
        Arc::new(SystemdInhibitor::default())
    };

    let effects = SideEffects {
        announcer: Arc::new(CommandAnnouncer::new(config.tone(), config.speech())),
        ambient: Arc::new(CommandAmbientLoop::new(config.ambient())),
        haptics: Arc::new(LogHaptics),
        keep_awake,
    };

    // Start the countdown engine in its own task
    let clock = Arc::new(SystemClock);
    let (engine, engine_events, engine_task) =
        spawn_countdown_engine(clock.clone(), config.tick_interval());

    let mut controller = SessionController::new(
        engine,
        effects,
        Arc::new(store),
        clock,
        config.announcement_policy(),
    );
    controller.restore(&config.default_config);

    let state = Arc::new(AppState::new(controller, config.port, config.host.clone()));

    // Feed engine events to the controller
    let event_state = Arc::clone(&state);
    tokio::spawn(async move {
        engine_event_task(event_state, engine_events).await;
    });

    // Re-acquire keep-awake if it gets dropped mid-countdown
    let watchdog_state = Arc::clone(&state);
    tokio::spawn(async move {
        keep_awake_watchdog_task(watchdog_state, KEEP_AWAKE_CHECK_INTERVAL).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;
    
    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /start          - Start or continue the countdown");
    info!("  POST   /stop           - Stop the countdown");
    info!("  POST   /acknowledge    - Dismiss the finished alarm");
    info!("  POST   /config         - Apply {{\"text\": \"30, 15, 10, 5\"}}");
    info!("  POST   /pocket         - Enter pocket mode");
    info!("  DELETE /pocket         - Leave pocket mode");
    info!("  GET    /status         - Current display and server status");
    info!("  GET    /display/stream - Server-sent display updates");
    info!("  GET    /health         - Health check");

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

    match state.lock_controller() {
        Ok(mut controller) => controller.shutdown(),
        Err(e) => warn!("Final state not saved: {}", e),
    }
    engine_task.abort();

    info!("Server shutdown complete");
    Ok(())
}
