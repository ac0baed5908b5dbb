//! Logging facilities for Horizon Touch.
//!
//! Horizon Touch uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_touch::gesture=debug")
//!     .init();
//! ```
//!
//! Per-sample and per-touch detail is logged at `trace`, recognizer state
//! transitions and session boundaries at `debug`, dropped input at `warn`,
//! and programming faults (illegal transitions, unbalanced calls) at `error`.

/// Span names used throughout Horizon Touch for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// One window dispatch cycle.
    pub const DISPATCH: &str = "horizon_touch::dispatch";
    /// Timer processing span.
    pub const TIMER: &str = "horizon_touch::timer";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Timer system target.
    pub const TIMER: &str = "horizon_touch_core::timer";
    /// Touch identity tracking target.
    pub const EVENT: &str = "horizon_touch::event";
    /// Gesture recognizer target.
    pub const GESTURE: &str = "horizon_touch::gesture";
    /// Window dispatch target.
    pub const WINDOW: &str = "horizon_touch::window";
    /// Responder chain target.
    pub const RESPONDER: &str = "horizon_touch::responder";
    /// Platform input target.
    pub const INPUT: &str = "horizon_touch::input";
}
