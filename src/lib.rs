//! # DPad Mux Library
//!
//! Merge an auxiliary dual-directional D-pad into a gamepad's directional state.
//!
//! This library provides the core functionality for conditioning raw direction
//! lines (debounce, opposing-direction cleaning, combine modes) and mapping the
//! result onto a digital D-pad or an analog stick.

pub mod config;
pub mod error;
pub mod gamepad;
pub mod dual;
pub mod input;
pub mod journal;
