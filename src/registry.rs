//! Typed binding registry. Keys render as `repositories.<Name>Repository`, `controllers.<Name>Controller`,
//! `datasources.<name>`, `models.<Name>` and `servers.RestServer`.

use crate::config::ModelDefinition;
use crate::controller::CrudRestController;
use crate::datasource::DataSource;
use crate::error::RegistryError;
use crate::repository::EntityRepository;
use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BindingKey {
    /// Model name, e.g. `Product` for `repositories.ProductRepository`.
    Repository(String),
    /// Model name, e.g. `Product` for `controllers.ProductController`.
    Controller(String),
    DataSource(String),
    Model(String),
    /// The REST server, bound while the application is started.
    Server,
}

impl BindingKey {
    pub fn repository(model: &str) -> Self {
        BindingKey::Repository(model.to_string())
    }

    pub fn controller(model: &str) -> Self {
        BindingKey::Controller(model.to_string())
    }

    pub fn data_source(name: &str) -> Self {
        BindingKey::DataSource(name.to_string())
    }

    pub fn model(name: &str) -> Self {
        BindingKey::Model(name.to_string())
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKey::Repository(m) => write!(f, "repositories.{}Repository", m),
            BindingKey::Controller(m) => write!(f, "controllers.{}Controller", m),
            BindingKey::DataSource(n) => write!(f, "datasources.{}", n),
            BindingKey::Model(n) => write!(f, "models.{}", n),
            BindingKey::Server => f.write_str("servers.RestServer"),
        }
    }
}

impl FromStr for BindingKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RegistryError::MalformedKey(s.to_string());
        let (ns, rest) = s.split_once('.').ok_or_else(malformed)?;
        if ns == "servers" {
            return if rest == "RestServer" { Ok(BindingKey::Server) } else { Err(malformed()) };
        }
        let name = match ns {
            "repositories" => rest.strip_suffix("Repository"),
            "controllers" => rest.strip_suffix("Controller"),
            "datasources" | "models" => Some(rest),
            _ => None,
        }
        .filter(|n| !n.is_empty())
        .ok_or_else(malformed)?;
        Ok(match ns {
            "repositories" => BindingKey::repository(name),
            "controllers" => BindingKey::controller(name),
            "datasources" => BindingKey::data_source(name),
            _ => BindingKey::model(name),
        })
    }
}

#[derive(Clone)]
pub enum BoundValue {
    Repository(Arc<dyn EntityRepository>),
    Controller(Arc<CrudRestController>),
    DataSource(DataSource),
    Model(Arc<ModelDefinition>),
    Server(SocketAddr),
}

impl fmt::Debug for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundValue::Repository(r) => write!(f, "Repository({})", r.model().name),
            BoundValue::Controller(c) => write!(f, "Controller({})", c.name()),
            BoundValue::DataSource(d) => write!(f, "DataSource({}, {})", d.name, d.connector.name()),
            BoundValue::Model(m) => write!(f, "Model({})", m.name),
            BoundValue::Server(addr) => write!(f, "Server({})", addr),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub key: BindingKey,
    pub value: BoundValue,
}

impl Binding {
    pub fn new(key: BindingKey, value: BoundValue) -> Self {
        Binding { key, value }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Registry {
    bindings: BTreeMap<BindingKey, Binding>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Insert or replace.
    pub fn bind(&mut self, binding: Binding) {
        tracing::debug!(key = %binding.key, "bind");
        self.bindings.insert(binding.key.clone(), binding);
    }

    pub fn extend(&mut self, bindings: impl IntoIterator<Item = Binding>) {
        for b in bindings {
            self.bind(b);
        }
    }

    pub fn get(&self, key: &BindingKey) -> Option<&Binding> {
        self.bindings.get(key)
    }

    /// Look up by the string form of a key.
    pub fn get_str(&self, key: &str) -> Result<&Binding, RegistryError> {
        let parsed: BindingKey = key.parse()?;
        self.get(&parsed).ok_or_else(|| RegistryError::NotBound(key.to_string()))
    }

    pub fn contains(&self, key: &BindingKey) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn data_source(&self, name: &str) -> Option<&DataSource> {
        match self.get(&BindingKey::data_source(name)).map(|b| &b.value) {
            Some(BoundValue::DataSource(ds)) => Some(ds),
            _ => None,
        }
    }

    pub fn repository(&self, model: &str) -> Option<&Arc<dyn EntityRepository>> {
        match self.get(&BindingKey::repository(model)).map(|b| &b.value) {
            Some(BoundValue::Repository(r)) => Some(r),
            _ => None,
        }
    }

    pub fn model(&self, name: &str) -> Option<&Arc<ModelDefinition>> {
        match self.get(&BindingKey::model(name)).map(|b| &b.value) {
            Some(BoundValue::Model(m)) => Some(m),
            _ => None,
        }
    }

    pub fn server_addr(&self) -> Option<SocketAddr> {
        match self.get(&BindingKey::Server).map(|b| &b.value) {
            Some(BoundValue::Server(addr)) => Some(*addr),
            _ => None,
        }
    }

    pub fn controllers(&self) -> impl Iterator<Item = &Arc<CrudRestController>> {
        self.bindings.values().filter_map(|b| match &b.value {
            BoundValue::Controller(c) => Some(c),
            _ => None,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &BindingKey> {
        self.bindings.keys()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_and_parse() {
        for (key, s) in [
            (BindingKey::repository("Product"), "repositories.ProductRepository"),
            (BindingKey::controller("Product"), "controllers.ProductController"),
            (BindingKey::data_source("db"), "datasources.db"),
            (BindingKey::model("Product"), "models.Product"),
            (BindingKey::Server, "servers.RestServer"),
        ] {
            assert_eq!(key.to_string(), s);
            assert_eq!(s.parse::<BindingKey>().unwrap(), key);
        }
    }

    #[test]
    fn malformed_keys_rejected() {
        for s in [
            "repositories.Product",
            "controllers.Controller",
            "services.Foo",
            "servers.GrpcServer",
            "nodot",
        ] {
            assert_eq!(s.parse::<BindingKey>(), Err(RegistryError::MalformedKey(s.to_string())));
        }
    }

    #[test]
    fn lookup_by_string() {
        let mut registry = Registry::new();
        registry.bind(Binding::new(
            BindingKey::data_source("db"),
            BoundValue::DataSource(DataSource::memory("db")),
        ));
        assert_eq!(registry.get_str("datasources.db").unwrap().key.to_string(), "datasources.db");
        assert_eq!(
            registry.get_str("datasources.other").unwrap_err(),
            RegistryError::NotBound("datasources.other".into())
        );
        assert!(registry.data_source("db").is_some());
        assert!(registry.repository("db").is_none());
    }
}
