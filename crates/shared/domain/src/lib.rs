//! # Domain Models
//!
//! Pure configuration types shared by the library, the kernel loader and the shell.
//! Keep it lean: no I/O or logic beyond defaults, just data.

pub mod config;
