//! App Shell Entry Point
//!
//! Development host standing in for the mobile/web shell. Selects the
//! storage backend with a startup capability probe, wires the managed
//! backend when `VAULT_API_URL` is set, runs the launch gate sequence,
//! and keeps the idle clock armed until ctrl-c.
//! Uses `anyhow` for startup errors; application-level errors surface
//! as `kernel::error::AppError` notices.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use platform::biometric::UnsupportedBiometrics;
use platform::device::{DeviceIdentity, RuntimePlatform};
use platform::keyvalue::{FileStore, KeyValueStore, MemoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lock::application::check_gate::CheckGateUseCase;
use lock::application::config::{LockConfig, SettingsBus};
use lock::application::idle::IdleMonitor;
use lock::application::session::LockSession;
use lock::application::unlock::UnlockUseCase;
use lock::domain::repository::{AuthGateway, LockPreferenceRepository, ProfileRepository};
use lock::infra::local::{DeviceStore, SessionFlags};
use lock::infra::memory::{InMemoryAuthGateway, InMemoryProfileRepository};
use lock::infra::remote::{HttpAuthGateway, HttpProfileRepository, build_client};
use lock::presentation::gate::LockGate;
use lock::presentation::guard::{AppShellGate, AuthSnapshot, GateDecision, RouteGuard};
use lock::presentation::lifecycle::AppLifecycle;

// Re-export unified error types for use in host extensions
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shell=info,lock=info,platform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(LockConfig::default());

    // Capability probe: a writable data directory selects the persistent
    // store; otherwise fall back to the in-memory (web-like) store
    match open_file_store().await {
        Some(store) => {
            tracing::info!("Using file-backed device store");
            with_remote(Arc::new(store), RuntimePlatform::Native, config).await
        }
        None => {
            tracing::info!("No writable data directory; using in-memory device store");
            with_remote(Arc::new(MemoryStore::new()), RuntimePlatform::Web, config).await
        }
    }
}

async fn open_file_store() -> Option<FileStore> {
    let dir = env::var("VAULT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".vault-data"));

    if let Err(e) = tokio::fs::create_dir_all(&dir).await {
        tracing::warn!(error = %e, dir = %dir.display(), "Data directory unavailable");
        return None;
    }

    match FileStore::open(dir.join("device.json")).await {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(error = %e, "Device store unusable");
            None
        }
    }
}

async fn with_remote<K>(
    store: Arc<K>,
    platform: RuntimePlatform,
    config: Arc<LockConfig>,
) -> anyhow::Result<()>
where
    K: KeyValueStore + Send + Sync + 'static,
{
    match env::var("VAULT_API_URL") {
        Ok(base_url) => {
            tracing::info!(base_url = %base_url, "Using managed backend");
            let client = build_client(&config)?;
            run(
                store,
                platform,
                config,
                Arc::new(HttpProfileRepository::new(client.clone(), base_url.clone())),
                Arc::new(HttpAuthGateway::new(client, base_url)),
            )
            .await
        }
        Err(_) => {
            tracing::info!("No VAULT_API_URL set; using in-memory collaborators");
            run(
                store,
                platform,
                config,
                Arc::new(InMemoryProfileRepository::new()),
                Arc::new(InMemoryAuthGateway::new()),
            )
            .await
        }
    }
}

async fn run<K, P, A>(
    store: Arc<K>,
    platform: RuntimePlatform,
    config: Arc<LockConfig>,
    profile_repo: Arc<P>,
    auth: Arc<A>,
) -> anyhow::Result<()>
where
    K: KeyValueStore + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    A: AuthGateway + Send + Sync + 'static,
{
    let identity = DeviceIdentity::load_or_create(store.as_ref(), platform).await?;
    tracing::info!(platform = identity.platform().code(), "Device identity ready");

    let device_repo = Arc::new(DeviceStore::new(store, config.clone(), &identity));
    // Session-scoped flag storage dies with this process
    let flags = Arc::new(SessionFlags::new(Arc::new(MemoryStore::new()), config.clone()));

    let auto_lock = device_repo
        .find_auto_lock()
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Auto-lock setting unreadable");
            None
        })
        .unwrap_or(config.default_auto_lock);

    let session = Arc::new(LockSession::new());
    let settings = Arc::new(SettingsBus::new(auto_lock));
    let idle = IdleMonitor::new(settings.subscribe());
    let biometric = Arc::new(UnsupportedBiometrics);

    let unlock = Arc::new(UnlockUseCase::new(
        profile_repo.clone(),
        device_repo.clone(),
        flags.clone(),
        auth.clone(),
        biometric,
        session.clone(),
        idle.clone(),
        &config,
    ));

    let check = Arc::new(CheckGateUseCase::new(
        device_repo,
        flags.clone(),
        profile_repo,
        session.clone(),
    ));
    let guard = RouteGuard::new(check.clone(), session, settings, idle.clone());

    let lifecycle = Arc::new(AppLifecycle::new());
    let shell_gate = AppShellGate::new(check, flags, lifecycle.clone());
    shell_gate.watch_lifecycle();

    // Launch sequence: the shell gate runs before any route renders
    match shell_gate.decide().await {
        GateDecision::ShowGate(method) => {
            let gate = LockGate::new(method, unlock.clone())?;
            tracing::info!(method = %gate.method(), "Launch gate pending credential");
        }
        decision => {
            tracing::info!(?decision, "Shell gate passed");
        }
    }

    let auth_snapshot = match auth.current_user().await {
        Ok(Some(user)) => AuthSnapshot::SignedIn(user),
        Ok(None) => AuthSnapshot::SignedOut,
        Err(e) => {
            tracing::warn!(error = %e, "Auth state unresolved");
            AuthSnapshot::Resolving
        }
    };
    let decision = guard.decide(auth_snapshot).await;
    tracing::info!(?decision, idle_armed = idle.is_running(), "Route gate decided");

    tracing::info!("Shell running; press ctrl-c to exit");
    tokio::signal::ctrl_c().await?;

    // Teardown: timers and listeners must not outlive the session
    idle.stop();
    shell_gate.stop();
    tracing::info!("Shell stopped");

    Ok(())
}
