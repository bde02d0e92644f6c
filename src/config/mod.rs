mod env_overrides;
mod loader;
#[cfg(test)]
mod test_env;
mod types;

pub use loader::default_config_dir;
pub use types::{Config, ExecConfig, GatewayConfig, SecurityConfig, StoreConfig};
