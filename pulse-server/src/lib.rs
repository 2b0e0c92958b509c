//! Live train positions for a single Underground line.
//!
//! Polls TfL arrival predictions, derives where each train is, and pushes
//! the resulting snapshot to every connected WebSocket client.

pub mod config;
pub mod hub;
pub mod poller;
pub mod tfl;
pub mod trains;
pub mod web;
