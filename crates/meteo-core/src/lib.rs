//! Hardware-independent core library for meteo
//!
//! This crate contains the platform-agnostic logic of the meteo status
//! display: the time-gated sensor cache, the configuration surface, and the
//! layout engine that renders every screen into a monochrome frame buffer.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod framebuffer;
pub mod sensors;
pub mod ui;
