use crate::errors::handle_rejection;
use crate::events::EventBus;
use crate::handlers;
use crate::metrics::MetricsCollector;
use crate::session::{SessionError, SessionManager};
use crate::settings::{ServerSettings, SettingsError};
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::Reply;
use warp::Filter;

const ROOT_GREETING: &str = "Hello from Kuhn Poker Backend!";

#[derive(Debug, Clone)]
pub struct AppContext {
    settings: ServerSettings,
    event_bus: Arc<EventBus>,
    sessions: Arc<SessionManager>,
    metrics: MetricsCollector,
}

impl AppContext {
    pub fn new(settings: ServerSettings) -> Result<Self, ServerError> {
        settings.validate()?;
        let event_bus = Arc::new(EventBus::new());
        let metrics = MetricsCollector::new();
        let sessions = Arc::new(SessionManager::new(
            settings.clone(),
            Arc::clone(&event_bus),
            metrics.clone(),
        )?);
        Ok(Self::new_with_dependencies(
            settings, event_bus, sessions, metrics,
        ))
    }

    pub fn new_with_dependencies(
        settings: ServerSettings,
        event_bus: Arc<EventBus>,
        sessions: Arc<SessionManager>,
        metrics: MetricsCollector,
    ) -> Self {
        Self {
            settings,
            event_bus,
            sessions,
            metrics,
        }
    }

    /// Context wired around an existing manager, sharing its bus and metrics.
    pub fn from_sessions(sessions: Arc<SessionManager>) -> Self {
        Self {
            settings: sessions.settings().clone(),
            event_bus: sessions.event_bus(),
            metrics: sessions.metrics().clone(),
            sessions,
        }
    }

    pub fn new_for_tests() -> Result<Self, ServerError> {
        Self::new(ServerSettings::for_tests())
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(settings: ServerSettings) -> Result<Self, ServerError> {
        let context = AppContext::new(settings)?;
        Ok(Self { context })
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let bind_addr = Self::bind_addr(context.settings())?;

        if bind_addr.port() != 0 {
            drop(std::net::TcpListener::bind(bind_addr)?);
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes(&context))
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!(%addr, "web server listening");

        let sweeper = Self::spawn_sweeper(&context);
        let task = tokio::spawn(async move {
            server_future.await;
            Ok(())
        });

        Ok(ServerHandle::new(addr, shutdown_tx, task, sweeper, context))
    }

    /// Periodically closes idle rooms and expired friend codes.
    fn spawn_sweeper(context: &AppContext) -> JoinHandle<()> {
        let sessions = context.sessions();
        let period = context.settings().sweep_interval();
        let ttl = context.settings().room_ttl();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = sessions.cleanup_inactive_rooms(ttl) {
                    tracing::error!(error = %err, "room sweep failed");
                }
                sessions.metrics().log_metrics();
            }
        })
    }

    fn bind_addr(settings: &ServerSettings) -> Result<SocketAddr, ServerError> {
        let host = settings.host.as_str();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, settings.port));
        }

        let candidate = format!("{}:{}", host, settings.port);
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        let mut source = err.source();
        while let Some(current) = source {
            if let Some(io_err) = current.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
            source = current.source();
        }

        ServerError::ConfigError(err.to_string())
    }
}

/// Every HTTP and WebSocket route, with unmatched requests mapped to JSON errors.
pub fn routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
    let root = warp::path::end()
        .and(warp::get())
        .map(|| ROOT_GREETING.into_response());

    let health = warp::path("health")
        .and(warp::get())
        .and(warp::path::end())
        .map(|| handlers::health::health().into_response());

    let stats = warp::path!("api" / "stats")
        .and(warp::get())
        .and(with_session_manager(context.sessions()))
        .map(|sessions: Arc<SessionManager>| handlers::stats::stats(&sessions).into_response());

    let socket = warp::path("socket")
        .and(warp::path::end())
        .and(warp::ws())
        .and(with_session_manager(context.sessions()))
        .map(|ws: warp::ws::Ws, sessions: Arc<SessionManager>| {
            ws.on_upgrade(move |socket| handlers::ws::handle_socket(socket, sessions))
                .into_response()
        });

    root.or(health)
        .unify()
        .or(stats)
        .unify()
        .or(socket)
        .unify()
        .recover(handle_rejection)
        .unify()
        .boxed()
}

fn with_session_manager(
    sessions: Arc<SessionManager>,
) -> impl Filter<Extract = (Arc<SessionManager>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&sessions))
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
    sweeper: Option<JoinHandle<()>>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
        sweeper: JoinHandle<()>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            sweeper: Some(sweeper),
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
        self.context.sessions.shutdown();

        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(ServerError::ConfigError(format!(
                        "server task join error: {err}"
                    )))
                }
            }
        }

        tracing::info!(addr = %self.addr, "web server stopped");
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }

        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
