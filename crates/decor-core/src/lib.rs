//! Hook-composition runtime for class-like entities.
//!
//! Everything here keeps hook machinery off the entities it serves: identities
//! come from a registry with an explicit parent table, per-type state hangs
//! off those identities in side stores, and calls are wrapped by an
//! interceptor that threads argument tuples and return values through ordered
//! hook chains. The companion `decor-view` crate builds render interception on
//! top of these parts.

pub mod config;
pub mod hooks;
pub mod intercept;
pub mod mixer;
pub mod registry;
pub mod state;

pub use config::{current_config, run_in_context, set_config, Config};
pub use hooks::HookList;
pub use intercept::{intercept_call, CallArgs, CallValue, InterceptError};
pub use mixer::{Mixer, MixerData};
pub use registry::{register_type, TypeKey};
pub use state::StateStore;
