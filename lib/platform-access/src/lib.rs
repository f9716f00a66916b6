//! Authentication primitives for the murmur platform.
//!
//! Identity is established by an external identity gateway which provisions
//! session records; this crate provides the session and user types the
//! server resolves on each request. Login/logout redirect flows live outside
//! this service entirely.

pub mod auth;
pub mod session;
pub mod user;

pub use auth::AuthenticatedUser;
pub use session::{Session, SessionId};
pub use user::User;
