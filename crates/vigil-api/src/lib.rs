//! Async client for the vigil monitoring backend.
//!
//! The backend exposes a small REST surface with cookie-based sessions:
//!
//! - **Auth**: `POST /auth/login` returns the user's id, name and role and
//!   sets the session cookie; `POST /auth/logout` ends it.
//! - **Users, locations, clients, URL profiles**: list/create/update/delete.
//! - **Artifacts**: QR code images and configuration files per location
//!   and client; URL profile import and export.
//!
//! [`ApiClient`] classifies HTTP statuses into [`Error`] variants so callers
//! can tell an expired session (401) from a permission problem (403).

pub mod auth;
pub mod client;
pub mod clients;
pub mod error;
pub mod locations;
pub mod models;
pub mod transport;
pub mod url_profiles;
pub mod users;

pub use client::ApiClient;
pub use error::Error;
pub use models::{
    ClientPayload, ClientRecord, LocationPayload, LocationRecord, LoginResponse, NewUser,
    RoleField, UrlEntry, UrlProfileRecord, UserRecord, UserUpdate,
};
pub use transport::{TlsMode, TransportConfig};
