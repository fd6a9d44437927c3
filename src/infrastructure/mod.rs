//! Infrastructure Layer
//!
//! Cross-cutting concerns shared by the server components.

pub mod shutdown;

pub use shutdown::shutdown_signal;
