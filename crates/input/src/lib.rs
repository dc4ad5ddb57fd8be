//! Input mapping: raw key transitions become rotation rates for the scene.
//!
//! # Invariants
//! - Rate updates are pure: `(previous, event) -> next`, no global state.
//! - The last pressed key of an axis wins; releasing either key of an axis stops it.

pub mod action;

pub use action::{InputEvent, Key, KeyState, RotationRates};
