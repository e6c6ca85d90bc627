#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! # drm-scanout: hardware plane allocation for atomic KMS
//!
//! Display controllers expose a small number of hardware planes that can each
//! scan out one buffer per frame. This crate takes the layers a compositor
//! wants on screen and assigns them to those planes, using validate-only
//! atomic commits to let the hardware itself decide which assignments it can
//! drive.
//!
//! The allocation is first-fit: for every layer (in the caller-given z-order)
//! the allocator speculatively stages the layer's properties onto the first
//! free plane, asks the device to test the staged configuration, and either
//! keeps the binding or rolls the request back and tries the next plane.
//! Layers that no plane accepts are reported, not failed — a display showing
//! fewer layers than requested is degraded, not broken, and the caller can
//! fall back to composition for the remainder.
//!
//! ## Structure of the crate
//!
//! - [`device`] defines the [`ScanoutDevice`](device::ScanoutDevice) trait,
//!   the boundary to the actual display controller, along with the
//!   [`AtomicRequest`](device::AtomicRequest) being built up during
//!   allocation. Device discovery, modesetting and buffer management stay on
//!   the caller's side of this boundary.
//! - [`Display`] is a session on one device: it discovers the device's
//!   [`Planes`] and runs the allocation cycle in [`Display::apply`].
//! - [`Output`] and [`Layer`] describe what the caller wants on screen.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use drm_scanout::{device::AtomicRequest, Display, Layer, Output};
//!
//! let mut display = Display::new(device)?;
//!
//! let mut output = Output::new(crtc_id);
//! let mut layer = Layer::new();
//! layer.set_property("FB_ID", fb_id);
//! layer.set_property("CRTC_W", width);
//! layer.set_property("CRTC_H", height);
//! output.push_layer(layer);
//!
//! let mut req = AtomicRequest::new();
//! let report = display.apply(std::slice::from_mut(&mut output), &mut req)?;
//! if report.all_placed() {
//!     // submit `req` with a real (non test-only) atomic commit
//! }
//! ```
//!
//! ## Logging
//!
//! This crate uses [`tracing`] for its internal logging; discovery and every
//! allocation decision are logged at `debug`/`trace` level under the
//! `drm_scanout` span.

pub mod device;

mod commit;
mod display;
mod error;
mod layer;
mod plane;
mod property;

#[cfg(test)]
pub(crate) mod mock;

pub use display::{ApplyReport, Display};
pub use error::{AccessError, Error};
pub use layer::{Layer, LayerProperty, Output};
pub use plane::{LayerSlot, Plane, Planes};
pub use property::PropTable;
