//! Runtime core: consumer pool orchestration and lifecycle.
//!
//! The public API from this module is [`Supervisor`] (with its builder and
//! [`Config`]), the [`Consumer`] loop and the [`Scopes`] pair.
//!
//! Internal modules:
//! - [`config`]: supervisor settings and sentinel accessors;
//! - [`scopes`]: independent fetch/delete cancellation tokens;
//! - [`shutdown`]: cross-platform shutdown signal handling;
//! - [`consumer`]: one receive → process loop;
//! - [`supervisor`]: fan-out, join, ordered scope cancellation;
//! - [`builder`]: supervisor construction.

mod builder;
mod config;
mod consumer;
mod scopes;
pub mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::Config;
pub use consumer::Consumer;
pub use scopes::Scopes;
pub use supervisor::Supervisor;
