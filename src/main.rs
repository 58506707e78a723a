use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use viet_flashcards::app;
use viet_flashcards::backend::{Backend, SqliteBackend};
use viet_flashcards::config::Settings;
use viet_flashcards::db::{self, LogOnError};
use viet_flashcards::session::{record_last_seen, SessionState};
use viet_flashcards::speech::speaker_from_command;
use viet_flashcards::state::AppState;
use viet_flashcards::storage::JsonFileStorage;
use viet_flashcards::store::CardStore;
use viet_flashcards::tips::{spawn_auto_rotation, TipRotator};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "viet_flashcards=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let settings = Settings::load();

  let pool = db::init_db(&settings.database_path).expect("Failed to initialize database");

  {
    let mut conn = pool.lock().expect("Database lock failed during startup");
    if let Some(path) = &settings.seed_cards {
      db::import_seed_cards(&mut conn, path).log_warn("Failed to import seed cards");
    }
    if let Some(path) = &settings.seed_tips {
      db::import_seed_tips(&mut conn, path).log_warn("Failed to import seed tips");
    }
  }

  let backend: Arc<dyn Backend> = Arc::new(SqliteBackend::new(pool));

  // Nothing may be selected from a set that failed to load
  let store = match CardStore::load(backend.as_ref()) {
    Ok(store) => store,
    Err(e) => {
      tracing::error!("{}", e);
      std::process::exit(1);
    }
  };
  let mut rotator = match TipRotator::load(backend.as_ref()) {
    Ok(rotator) => rotator,
    Err(e) => {
      tracing::error!("{}", e);
      std::process::exit(1);
    }
  };

  let storage = Arc::new(JsonFileStorage::open(&settings.storage_path));
  let mut session = SessionState::new(store, storage, settings.session_options());
  if let Some(touch) = session.initialize(backend.as_ref(), &mut rand::rng(), chrono::Utc::now()) {
    record_last_seen(backend.clone(), touch);
  }

  rotator.start(&mut rand::rng());
  let tips = Arc::new(Mutex::new(rotator));
  let rotation = spawn_auto_rotation(tips.clone(), settings.tip_rotation);

  let state = AppState::new(
    session,
    tips,
    backend,
    speaker_from_command(settings.speech_command.as_deref()),
    settings.transition_delay,
  );
  let app = app::router(state);

  let bind_addr = settings.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", settings.server_port);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server failed to start");

  rotation.cancel();
  tracing::info!("Server stopped");
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("Failed to listen for shutdown signal: {}", e);
    std::future::pending::<()>().await;
  }
  tracing::info!("Shutting down");
}
