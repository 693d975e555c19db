//! # fieldstore testkit
//!
//! Test utilities for fieldstore.
//!
//! This crate provides:
//! - Segment fixtures over RAM and temporary file-system directories
//! - A counting backend for stream ownership tests
//! - Property-based document generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fieldstore_testkit::prelude::*;
//!
//! #[test]
//! fn test_articles() {
//!     let segment = TestSegment::memory("_0");
//!     scenarios::write_articles(&segment, 10);
//!     assert_eq!(segment.verify().unwrap().num_docs(), 10);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
