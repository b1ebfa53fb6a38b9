//! recordgate - Record validation and change detection service
//!
//! A single-binary HTTP service that validates incoming records (an Israeli
//! national identifier plus a bounded random number) and reports whether
//! each record differs from the last one the process accepted.
//!
//! # Overview
//!
//! This crate provides:
//! - Pure field validators (identifier checksum, numeric range)
//! - A lock-guarded change tracker with raw and digest fingerprint strategies
//! - A warp HTTP boundary with typed error responses
//! - Structured logging and a metrics collector exported over HTTP
//!
//! # Quick Start
//!
//! ```rust
//! use recordgate::record::Record;
//! use recordgate::tracker::{ChangeTracker, Classification, TrackerStrategy};
//! use recordgate::validate::identifier;
//!
//! // Canonicalize and checksum an identifier
//! let id = identifier::validate("123456782").expect("checksum holds");
//!
//! // Classify records against the last one seen
//! let tracker = ChangeTracker::new(TrackerStrategy::Raw);
//! let record = Record::new(id, 123_456_789);
//!
//! assert_eq!(tracker.classify(&record).unwrap(), Classification::New);
//! assert_eq!(tracker.classify(&record).unwrap(), Classification::Same);
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod record;
pub mod server;
pub mod tracker;
pub mod validate;

// Re-export the service surface
pub use config::{ConfigError, ServiceConfig};
pub use error::{ErrorBody, ServiceError, ServiceResult};
pub use record::Record;
pub use tracker::{ChangeTracker, Classification, TrackerStrategy};
