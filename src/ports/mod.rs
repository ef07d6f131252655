//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the draft engine and an
//! external system (backend auth, profile/link tables, avatar storage,
//! time, IDs, local files). Implementations live in `src/adapters/`.

pub mod auth;
pub mod avatars;
pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod store;

use std::future::Future;
use std::pin::Pin;

use crate::error::PortError;

pub use auth::{AuthSession, Authenticator, SignUp};
pub use avatars::AvatarStore;
pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use store::ProfileStore;

/// Boxed future returned by async ports; boxing keeps the traits dyn-compatible.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;
