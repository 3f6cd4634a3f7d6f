//! Reply provider implementations.

pub mod gemini;
