//! Property-based tests
//!
//! Invariants that should hold for all inputs rather than specific cases.
//!
//! Run a specific property test module:
//! ```sh
//! cargo test property::drop_path_props
//! ```

mod drop_path_props;
mod history_props;
