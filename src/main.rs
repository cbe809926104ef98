use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;

use thread_triage::channels::{A1BaseClient, MessagingClient};
use thread_triage::config::{AgentProfile, EnvSource, ProcessEnv, ServerConfig};
use thread_triage::llm::{LlmConfig, create_provider};
use thread_triage::settings::{FlowStore, OnboardingFlow, settings_routes};
use thread_triage::store::{LibSqlThreadStore, ThreadStore};
use thread_triage::triage::{LlmIntentClassifier, TriageRouteState, TriageRouter, triage_routes};
use thread_triage::workflows::{AgentIdentityCard, LlmEmailComposer, LlmReplyWorkflow, Workflows};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let env: Arc<dyn EnvSource> = Arc::new(ProcessEnv);
    let config = ServerConfig::from_env(env.as_ref())?;

    let llm_config = LlmConfig::from_env(env.as_ref(), config.model.clone())
        .context("No LLM API key configured")?;
    let llm = create_provider(&llm_config)?;

    eprintln!("Thread triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", llm_config.model);
    eprintln!("   Triage API: http://0.0.0.0:{}/api/triage", config.port);
    eprintln!("   Settings API: http://0.0.0.0:{}/api/onboarding-flow", config.port);

    // ── Thread history ───────────────────────────────────────────────
    let store: Option<Arc<dyn ThreadStore>> = match config.db_path {
        Some(ref path) => {
            let store = LibSqlThreadStore::new_local(path)
                .await
                .with_context(|| format!("Failed to open thread store at {}", path.display()))?;
            Some(Arc::new(store) as Arc<dyn ThreadStore>)
        }
        None => {
            tracing::info!("TRIAGE_DB_PATH not set, thread history kept in memory");
            None
        }
    };

    // ── Workflows ────────────────────────────────────────────────────
    let messaging: Arc<dyn MessagingClient> = Arc::new(A1BaseClient::new(Arc::clone(&env)));
    let profile = AgentProfile::from_env(env.as_ref());
    let workflows = Workflows {
        identity: Arc::new(AgentIdentityCard::new(profile.clone())),
        email: Arc::new(LlmEmailComposer::new(Arc::clone(&llm))),
        reply: Arc::new(LlmReplyWorkflow::new(
            Arc::clone(&llm),
            Arc::clone(&messaging),
            Arc::clone(&env),
            profile.name,
        )),
    };

    let mut router = TriageRouter::new(
        Arc::new(LlmIntentClassifier::new(llm)),
        workflows,
        messaging,
        env,
    );
    if let Some(ref store) = store {
        router = router.with_store(Arc::clone(store));
    }

    // ── HTTP ─────────────────────────────────────────────────────────
    let flow_store = Arc::new(FlowStore::open(config.flow_path.clone(), OnboardingFlow::default()).await);
    let app = triage_routes(TriageRouteState::new(Arc::new(router), store))
        .merge(settings_routes(flow_store))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Triage server started");
    axum::serve(listener, app).await?;

    Ok(())
}
