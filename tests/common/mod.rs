#![allow(dead_code)]

use model_boot::{Application, ApplicationConfig, DataSource};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary project directory the application boots from.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Sandbox {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_text_file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn copy_fixture(&self, fixture: &str, rel: &str) {
        let src = fixture_path(fixture);
        let content = std::fs::read_to_string(&src).unwrap();
        self.write_text_file(rel, &content);
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Application rooted at the sandbox with an in-memory `db` data source.
pub fn given_app_with_data_source(sandbox: &Sandbox) -> Application {
    let mut app = Application::new(ApplicationConfig::new(sandbox.path()).with_ephemeral_port());
    app.data_source(DataSource::memory("db"));
    app
}

pub fn product_config(base_path: Option<&str>) -> String {
    match base_path {
        Some(p) => format!(
            r#"{{ "model": "Product", "pattern": "CrudRest", "dataSource": "db", "basePath": "{}" }}"#,
            p
        ),
        None => r#"{ "model": "Product", "pattern": "CrudRest", "dataSource": "db" }"#.to_string(),
    }
}

/// Product model and a `/products` endpoint config.
pub fn given_product_project() -> Sandbox {
    let sandbox = Sandbox::new();
    sandbox.copy_fixture("product.model.json", "models/product.model.json");
    sandbox.write_text_file(
        "model-endpoints/product.rest-config.json",
        &product_config(Some("/products")),
    );
    sandbox
}

/// Stop errors are expected when boot failed.
pub async fn stop_app(app: &mut Application) {
    let _ = app.stop().await;
}
