//! Kernel utilities shared by the depot binaries.
//! Keep this crate lightweight; it loads layered configuration into the domain types.
//!
//! ## Config loading
//! ```rust,no_run
//! use depot_kernel::config::load_depot_config;
//!
//! let cfg = load_depot_config(Some("depot")).unwrap();
//! for name in cfg.storages.keys() {
//!     println!("{name}");
//! }
//! ```
pub mod config;

pub use depot_domain as domain;
