//! # Base types for kibitzer
//!
//! This is an auxiliary crate for `kibitzer`, which contains the board vocabulary. It was split
//! from the main crate, so everything declared here can be used in the build script for `kibitzer`.
//!
//! Normally you don't want to use this crate directly. Use `kibitzer` instead.

pub mod geometry;
pub mod types;
