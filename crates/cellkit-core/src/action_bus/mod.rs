//! # Action Bus Module
//!
//! The ordered broadcast channel every action flows through on its way from
//! producers (view layer, timers, I/O completions, epics) to the store and
//! to epics.
//!
//! ## Overview
//!
//! - Producers dispatch typed actions without knowing who listens
//! - Synchronous subscribers run in attachment order; a panicking subscriber
//!   is reported to the error sink and the rest still receive the action
//! - Asynchronous readers receive the same actions as a stream
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cellkit_core::action_bus::{ActionBus, ActionCategory, ActionFilter, ConfigAction};
//!
//! let bus = ActionBus::new();
//!
//! let subscription = bus.subscribe(
//!     ActionFilter::Categories(vec![ActionCategory::Config]),
//!     |action| tracing::info!("config action: {}", action.tag()),
//! );
//!
//! bus.dispatch(ConfigAction::SaveConfig);
//!
//! bus.unsubscribe(subscription);
//! ```

mod actions;
mod bus;

pub use actions::*;
pub use bus::*;
