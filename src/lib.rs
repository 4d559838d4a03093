//! switch-panel: control panel for a gpio switch device
//!
//! the panel lists configured buttons, toggles them, manages their
//! configuration and shows device status and event history, all through
//! the device's json http api.

pub mod client;
pub mod config;
pub mod dom;
pub mod domain;
pub mod notify;
pub mod simulator;
pub mod views;

#[cfg(test)]
mod testing;

pub use client::{ApiError, HttpTransport, Method, RequestClient, Transport};
pub use config::PanelConfig;
pub use views::{Page, Panel, Services};
