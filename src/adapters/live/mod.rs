//! Live adapters for real external interactions.

pub mod auth;
pub mod avatars;
pub mod clock;
pub mod filesystem;
pub mod http;
pub mod id_gen;
pub mod store;

pub use auth::LiveAuthenticator;
pub use avatars::LiveAvatarStore;
pub use clock::LiveClock;
pub use filesystem::LiveFileSystem;
pub use http::BackendClient;
pub use id_gen::LiveIdGenerator;
pub use store::LiveProfileStore;
