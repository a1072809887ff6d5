pub mod bearer;
pub mod context;
pub mod error;
pub mod factory;
pub mod guard;
pub mod keys;

#[cfg(test)]
pub mod testutil;

pub use context::AuthorizationContext;
pub use error::AuthError;
pub use factory::build_access_guard;
pub use guard::{AccessGuard, GuardSettings};
pub use keys::{HttpJwksSource, SignerKeyCache};
