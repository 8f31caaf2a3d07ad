//! Core library for the AR box-measurement workflow.
//!
//! The host application feeds per-frame tracking data ([`tracking::TrackingFrame`])
//! and gesture events into an [`interaction::InteractionStateMachine`], which
//! drives a single [`oriented_box::OrientedBox`]. The renderer mirrors the box
//! transform, highlight and visibility flags every frame; measurements are
//! delivered through a registered callback.

pub mod fitter;
pub mod geometry;
pub mod interaction;
pub mod oriented_box;
pub mod tracking;
