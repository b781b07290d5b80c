//! The Claudy assistant widget of the bar.
//!
//! [`reduce_claudy`] owns every state transition, [`ClaudyController`] runs the resulting
//! effects against the host services, and [`Claudy`] renders the toggle.

pub mod components;
pub mod controller;
pub mod model;
pub mod reducer;

pub use components::Claudy;
pub use controller::{ClaudyController, ClaudyHooks};
pub use model::*;
pub use reducer::{reduce_claudy, ClaudyAction, ClaudyEffect, ClaudyError};
