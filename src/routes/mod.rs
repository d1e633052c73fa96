//! HTTP routes mounted next to the scaffolded controllers.

mod common;

pub use common::{common_routes, COMMON_PATHS};
