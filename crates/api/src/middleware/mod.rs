//! HTTP middleware.

pub mod actor;

pub use actor::{ACTOR_HEADER, Actor, actor_middleware};
