// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod scope;
pub mod parsing;
pub mod gateway;
pub mod collector;
pub mod emitter;
pub mod api;

// Re-export commonly used items
pub use types::*;
pub use error::{CollectError, GatewayError};
pub use config::{load_config, load_config_with_env, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use scope::{resolve_scope, ALL_NAMESPACES};
pub use parsing::{parse_quantity, quantity_or_zero};
pub use gateway::{is_access_denied, KubeGateway, SourceGateway};
pub use collector::Collector;
