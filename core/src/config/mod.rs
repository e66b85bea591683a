//! Batch job files.
//!
//! ```json
//! {
//!     "jobs": [
//!         { "integral": "T", "max_angular_momentum": [2, 2] },
//!         { "integral": "eri", "max_angular_momentum": [1, 1, 1, 1], "derivative_orders": [1, 0, 0, 0] }
//!     ]
//! }
//! ```
mod job;

pub use job::{ConfigJob, ConfigJobs};
