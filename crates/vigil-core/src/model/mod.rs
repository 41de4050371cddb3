// ── Domain model ──
//
// Canonical types handed to console consumers. Built from `vigil_api`
// wire records in `convert`.

pub mod client;
pub mod location;
pub mod role;
pub mod url_profile;
pub mod user;

pub use client::Client;
pub use location::Location;
pub use role::Role;
pub use url_profile::{IP_PLACEHOLDER, RenderedLink, UrlProfile, UrlTemplate};
pub use user::User;
