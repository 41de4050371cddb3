//! Domain layer between `vigil-api` and console front ends.
//!
//! - **[`Console`]**: facade for every screen action. Login/logout, CRUD
//!   per entity, polled list feeds, role-gated navigation. A backend 401
//!   clears the [`Session`]; a 403 surfaces as [`CoreError::Forbidden`].
//!
//! - **Liveness** ([`liveness`]): [`is_online`] decides online/offline
//!   from a last-handshake timestamp and a threshold.
//!
//! - **Polling** ([`poll`]): [`start_polling`] re-fetches on a fixed
//!   interval and delivers each result whole; [`ListFeed`] keeps the
//!   latest snapshot in a `watch` channel.
//!
//! - **Role gate** ([`gate`]): [`authorize`] maps a stored role and an
//!   allow-list to a [`Decision`]; [`RoleGate`] also remembers where a
//!   redirected user wanted to go.
//!
//! - **Session** ([`session`]): injected get/set/clear service with change
//!   subscription over a pluggable [`SessionStorage`].

pub mod config;
pub mod console;
pub mod convert;
pub mod error;
pub mod gate;
pub mod links;
pub mod liveness;
pub mod model;
pub mod poll;
pub mod request;
pub mod route;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConsoleConfig, DEFAULT_HOME_POLL_INTERVAL, DEFAULT_POLL_INTERVAL, TlsVerification};
pub use console::Console;
pub use error::CoreError;
pub use gate::{Decision, RoleGate, authorize};
pub use links::{BoardRow, link_board};
pub use liveness::{DEFAULT_ONLINE_THRESHOLD, Heartbeat, Liveness, is_online, is_online_now};
pub use model::{Client, Location, RenderedLink, Role, UrlProfile, UrlTemplate, User};
pub use poll::{FeedState, FeedStream, ListFeed, PollHandle, start_polling};
pub use request::{ClientRequest, CreateUserRequest, LocationRequest, UpdateUserRequest};
pub use route::Route;
pub use session::{Credential, MemorySessionStorage, Session, SessionSlots, SessionStorage};
