//! Signal pipeline: active atom window, emission and delivery.

pub mod emitter;
pub mod engine;
pub mod session;
pub mod sink;
pub mod window;

pub use emitter::SignalEmitter;
pub use engine::{CycleReport, Registries, SignalEngine};
pub use session::TradingSession;
pub use sink::{ChannelSink, JsonLinesSink, LogSink, RecentSignals, SignalSink};
pub use window::ActiveAtomWindow;
