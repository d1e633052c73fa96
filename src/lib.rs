//! Model Boot: boot an application from project file conventions and scaffold CRUD REST endpoints.

pub mod application;
pub mod boot;
pub mod builder;
pub mod case;
pub mod config;
pub mod controller;
pub mod datasource;
pub mod error;
pub mod registry;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;

pub use application::{Application, ApplicationState};
pub use boot::{BootContext, Booter, ModelApiBooter, ModelBooter};
pub use builder::{BuildOutput, CrudRestApiBuilder, ModelApiBuilder, CRUD_REST_PATTERN};
pub use config::{ModelDefinition, ModelEndpointConfig, ResolvedEndpoint};
pub use controller::CrudRestController;
pub use datasource::{DataSource, Filter};
pub use error::{AppError, ConfigError, LifecycleError, RegistryError};
pub use registry::{Binding, BindingKey, BoundValue, Registry};
pub use repository::{DefaultCrudRepository, EntityRepository};
pub use settings::{ApplicationConfig, ArtifactOptions, BootOptions, RestConfig};
