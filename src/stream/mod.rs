// src/stream/mod.rs

//! Push-to-callback byte streaming.
//!
//! A backend writes arbitrary-sized chunks into a [`StreamSink`]; a
//! [`StreamAdapter`] owns the matching read loop and hands each chunk to a
//! user callback in arrival order.
//!
//! - [`sink`] holds the producer-facing, non-blocking writer.
//! - [`adapter`] holds the background read loop and its start/stop control.

pub mod adapter;
pub mod sink;

pub use adapter::StreamAdapter;
pub use sink::StreamSink;
