//! Persisted state for the `output` tool.
//!
//! Only the presenter's section depth and open-notify level are kept; see
//! [`presenter`].

pub mod presenter;

pub use presenter::{
    default_state_path, MemoryStateStore, PresenterState, StateStore, YamlStateFile,
};
