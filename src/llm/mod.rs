pub mod model;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod sse_parser;
pub mod types;

pub use model::{Prediction, RoleModel, TextModel};
pub use registry::{ModelRole, ProviderRegistry};
