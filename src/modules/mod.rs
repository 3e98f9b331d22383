//! Feature modules. Each has a `controller` (HTTP handlers), a `service`
//! (business logic), and a `router`.

pub mod auth;
pub mod users;
