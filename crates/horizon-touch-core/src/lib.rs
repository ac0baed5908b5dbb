//! Core systems for Horizon Touch.
//!
//! This crate provides the loop-level building blocks the touch engine is
//! built on:
//!
//! - **Timestamps**: platform monotonic time carried by every input sample
//! - **Timers**: generation-safe one-shot timers driven with an explicit `now`
//! - **Handlers**: ordered callback lists with add/remove by ID
//! - **Geometry**: points, vectors and rectangles in logical units
//! - **Logging**: `tracing` target and span name constants
//!
//! # Timer Example
//!
//! ```
//! use std::time::Duration;
//! use horizon_touch_core::{TimerManager, Timestamp};
//!
//! let mut timers = TimerManager::new();
//! let id = timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(500), "long-press");
//!
//! assert!(timers.process_expired(Timestamp::from_millis(100)).is_empty());
//! let fired = timers.process_expired(Timestamp::from_millis(500));
//! assert_eq!(fired[0].id, id);
//! ```

mod error;
pub mod geometry;
mod handler;
pub mod logging;
mod time;
mod timer;

pub use error::{CoreError, HandlerError, Result, TimerError};
pub use geometry::{Point, Rect, Size, Vector};
pub use handler::{HandlerId, HandlerList};
pub use time::Timestamp;
pub use timer::{FiredTimer, TimerId, TimerManager};
