//! Application lifecycle: boot from project conventions, serve the scaffolded controllers, stop.

use crate::boot::{BootContext, Booter, ModelApiBooter, ModelBooter};
use crate::builder::{CrudRestApiBuilder, ModelApiBuilder};
use crate::datasource::DataSource;
use crate::error::{LifecycleError, RegistryError};
use crate::registry::{Binding, BindingKey, BoundValue, Registry};
use crate::repository::EntityRepository;
use crate::routes::common_routes;
use crate::settings::ApplicationConfig;
use axum::Router;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::limit::RequestBodyLimitLayer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationState {
    Unbooted,
    /// Also where a failed boot leaves the application.
    Booting,
    Booted,
    Started,
    Stopped,
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApplicationState::Unbooted => "unbooted",
            ApplicationState::Booting => "booting",
            ApplicationState::Booted => "booted",
            ApplicationState::Started => "started",
            ApplicationState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

struct RunningServer {
    addr: SocketAddr,
    ready: Arc<AtomicBool>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

pub struct Application {
    config: ApplicationConfig,
    state: ApplicationState,
    registry: Registry,
    booters: Vec<Box<dyn Booter>>,
    builders: Vec<Arc<dyn ModelApiBuilder>>,
    server: Option<RunningServer>,
}

impl Application {
    /// Application with the model and model-endpoint booters and the CrudRest builder installed.
    pub fn new(config: ApplicationConfig) -> Self {
        Application {
            config,
            state: ApplicationState::Unbooted,
            registry: Registry::new(),
            booters: vec![Box::new(ModelBooter::new()), Box::new(ModelApiBooter::new())],
            builders: vec![Arc::new(CrudRestApiBuilder)],
            server: None,
        }
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn state(&self) -> ApplicationState {
        self.state
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Bind a data source under `datasources.<name>`.
    pub fn data_source(&mut self, data_source: DataSource) -> &mut Self {
        self.registry.bind(Binding::new(
            BindingKey::data_source(&data_source.name),
            BoundValue::DataSource(data_source),
        ));
        self
    }

    /// Bind a repository ahead of boot; scaffolding reuses it instead of creating a default one.
    pub fn repository(&mut self, repository: Arc<dyn EntityRepository>) -> &mut Self {
        let key = BindingKey::repository(&repository.model().name);
        self.registry.bind(Binding::new(key, BoundValue::Repository(repository)));
        self
    }

    pub fn booter(&mut self, booter: impl Booter + 'static) -> &mut Self {
        self.booters.push(Box::new(booter));
        self
    }

    pub fn api_builder(&mut self, builder: impl ModelApiBuilder + 'static) -> &mut Self {
        self.builders.push(Arc::new(builder));
        self
    }

    pub fn get_binding(&self, key: &str) -> Result<&Binding, RegistryError> {
        self.registry.get_str(key)
    }

    pub fn binding(&self, key: &BindingKey) -> Option<&Binding> {
        self.registry.get(key)
    }

    /// Run all booters. Bindings are committed only when every booter succeeds; on failure the
    /// application stays in `Booting`. A no-op once booted.
    pub async fn boot(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            ApplicationState::Unbooted => {}
            ApplicationState::Booted | ApplicationState::Started => return Ok(()),
            state => return Err(LifecycleError::InvalidState { op: "boot", state }),
        }
        self.state = ApplicationState::Booting;
        tracing::info!(project_root = %self.config.project_root.display(), "booting application");

        let mut ctx = BootContext::new(
            &self.config.project_root,
            &self.config.boot,
            &self.registry,
            &self.builders,
        );
        for booter in self.booters.iter_mut() {
            booter.discover(&ctx).await?;
        }
        for booter in self.booters.iter_mut() {
            tracing::debug!(booter = booter.name(), "load");
            booter.load(&mut ctx).await?;
        }
        let staged = ctx.into_staged();

        let count = staged.len();
        self.registry.extend(staged);
        self.state = ApplicationState::Booted;
        tracing::info!(bindings = count, "application booted");
        Ok(())
    }

    /// Common routes plus every scaffolded controller.
    pub fn router(&self) -> Router {
        self.router_with_ready(Arc::new(AtomicBool::new(true)))
    }

    fn router_with_ready(&self, ready: Arc<AtomicBool>) -> Router {
        let mut router = common_routes(ready);
        for controller in self.registry.controllers() {
            router = router.merge(controller.clone().router());
        }
        router.layer(RequestBodyLimitLayer::new(self.config.rest.body_limit))
    }

    /// Bind the listener and serve. Requires a booted application.
    pub async fn start(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            ApplicationState::Booted => {}
            ApplicationState::Started => return Ok(()),
            state => return Err(LifecycleError::InvalidState { op: "start", state }),
        }
        let rest = &self.config.rest;
        let listener = TcpListener::bind((rest.host.as_str(), rest.port)).await?;
        let addr = listener.local_addr()?;
        let ready = Arc::new(AtomicBool::new(true));
        let router = self.router_with_ready(ready.clone());
        let (shutdown, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    rx.await.ok();
                })
                .await
        });
        self.server = Some(RunningServer {
            addr,
            ready,
            shutdown,
            handle,
        });
        self.registry.bind(Binding::new(BindingKey::Server, BoundValue::Server(addr)));
        self.state = ApplicationState::Started;
        tracing::info!("listening on {}", addr);
        Ok(())
    }

    /// Base URL while started.
    pub fn url(&self) -> Option<String> {
        self.server.as_ref().map(|s| format!("http://{}", s.addr))
    }

    /// Shut the server down and release all bindings. Fails while a boot is in progress (or failed).
    pub async fn stop(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            ApplicationState::Booting => {
                return Err(LifecycleError::InvalidState {
                    op: "stop",
                    state: ApplicationState::Booting,
                })
            }
            ApplicationState::Stopped => return Ok(()),
            _ => {}
        }
        if let Some(server) = self.server.take() {
            server.ready.store(false, Ordering::Release);
            let _ = server.shutdown.send(());
            match server.handle.await {
                Ok(result) => result?,
                Err(e) => return Err(LifecycleError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))),
            }
        }
        self.registry.clear();
        self.state = ApplicationState::Stopped;
        tracing::info!("application stopped");
        Ok(())
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            tracing::warn!("application dropped while started, shutting down server");
            let _ = server.shutdown.send(());
        }
    }
}
