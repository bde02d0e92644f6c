pub mod api_key;
mod defaults;
pub mod policy;

pub use api_key::{API_KEY_HEADER, constant_time_eq, generate_api_key, validate_api_key};
pub use defaults::default_allowed_commands;
pub use policy::{Decision, DenyReason, SecurityPolicy, SecurityTier};
