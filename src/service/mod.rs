//! Request validation applied by scaffolded controllers.

mod validation;
pub use validation::RequestValidator;
