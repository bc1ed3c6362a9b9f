//! Protocol decoding modules.
//!
//! A protocol is split into:
//! - `layout`: byte offsets, ranges and limits
//! - `reader`: bounds-checked byte access
//! - `parser`: field decoding and validation (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; the registry and analysis layers
//! handle dispatch and aggregation.

pub mod modbus;
