//! Rules engine trait for the scoring state machine.
//!
//! `RulesEngine` exposes the state machine as data-driven actions:
//! - Legal actions for the current state
//! - Applying an action, checked or unchecked
//! - The frame result once the frame is decided

pub mod engine;

pub use engine::{FrameResult, RulesEngine, RulesError};
