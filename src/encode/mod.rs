//! Frame sinks.
//!
//! Sinks consume rendered frames in index order; the GIF sink is what the HTTP and CLI surfaces use.

/// Animated GIF output.
pub(crate) mod gif;
/// Generic frame sink trait and the in-memory sink.
pub(crate) mod sink;
