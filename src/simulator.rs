//! ==============================================================================
//! simulator.rs - in-memory stand-in for the switch device
//! ==============================================================================
//!
//! purpose:
//!     serves the same json api the device firmware exposes so the panel
//!     can be developed and tested without hardware. nothing is persisted
//!     and no pin is ever driven.
//!
//! shared state:
//!     the device lives behind Arc<RwLock<>>; every handler takes the lock
//!     for the duration of one mutation.
//!
//! routes:
//!     GET  /api/buttons              button list
//!     POST /api/buttons              {id, state} -> {success}
//!     GET  /api/gpio/available       unassigned pins, ascending
//!     GET  /api/settings/buttons     button list
//!     POST /api/settings/buttons     {name, gpioPin} -> {success, message?}
//!     PUT  /api/settings/buttons     {id, name, gpioPin} -> {success, message?}
//!     DELETE /api/settings/buttons   {id} -> {success, message?}
//!     GET  /api/status               status snapshot (host metrics)
//!     GET  /api/history              events, oldest first
//!
//! ==============================================================================

use crate::config::SimulatorConfig;
use crate::domain::{
    Button, ButtonId, ButtonRef, ButtonUpdate, Field, HistoryEntry, NewButton, OpResult,
    StatusSnapshot, ToggleRequest,
};

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use sysinfo::System;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

pub type SharedDevice = Arc<RwLock<Device>>;

/// host readings merged into the status snapshot
#[derive(Clone, Debug, Default)]
pub struct HostMetrics {
    pub available_memory: u64,
    pub total_memory: u64,
    pub cpu_mhz: u64,
    pub host_name: Option<String>,
}

impl HostMetrics {
    /// blocking: sysinfo reads /proc
    pub fn read() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu();
        Self {
            available_memory: sys.available_memory(),
            total_memory: sys.total_memory(),
            cpu_mhz: sys.cpus().first().map(|c| c.frequency()).unwrap_or(0),
            host_name: System::host_name(),
        }
    }
}

#[derive(Debug)]
pub struct Device {
    buttons: Vec<Button>,
    pins: Vec<u8>,
    next_id: u64,
    history: Vec<HistoryEntry>,
    started: Instant,
    ip: IpAddr,
}

impl Device {
    pub fn new(pins: &[u8], ip: IpAddr) -> Self {
        let mut pins = pins.to_vec();
        pins.sort_unstable();
        pins.dedup();
        Self {
            buttons: Vec::new(),
            pins,
            next_id: 1,
            history: Vec::new(),
            started: Instant::now(),
            ip,
        }
    }

    pub fn shared(self) -> SharedDevice {
        Arc::new(RwLock::new(self))
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn available_pins(&self) -> Vec<u8> {
        self.pins
            .iter()
            .copied()
            .filter(|p| !self.buttons.iter().any(|b| b.gpio_pin == *p))
            .collect()
    }

    fn record(&mut self, event: String) {
        tracing::info!(%event, "simulated device event");
        self.history.push(HistoryEntry {
            timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event,
        });
    }

    fn find_mut(&mut self, id: &ButtonId) -> Option<&mut Button> {
        self.buttons.iter_mut().find(|b| &b.id == id)
    }

    /// `Err` carries the 404 body
    pub fn toggle(&mut self, id: &ButtonId, state: bool) -> Result<(), String> {
        let Some(button) = self.find_mut(id) else {
            return Err(format!("button {} not found", id));
        };
        button.state = state;
        let event = format!(
            "Button '{}' (GPIO {}) turned {}",
            button.name,
            button.gpio_pin,
            if state { "ON" } else { "OFF" }
        );
        self.record(event);
        Ok(())
    }

    pub fn add(&mut self, new: NewButton) -> OpResult {
        let name = new.name.trim();
        if name.is_empty() {
            return OpResult::failed("Name is required");
        }
        if !self.available_pins().contains(&new.gpio_pin) {
            return OpResult::failed(format!("GPIO {} is not available", new.gpio_pin));
        }
        let id = ButtonId::Numeric(self.next_id);
        self.next_id += 1;
        self.buttons.push(Button { id, name: name.to_string(), gpio_pin: new.gpio_pin, state: false });
        self.record(format!("Button '{}' added on GPIO {}", name, new.gpio_pin));
        OpResult::ok()
    }

    pub fn update(&mut self, update: ButtonUpdate) -> OpResult {
        let name = update.name.trim().to_string();
        if name.is_empty() {
            return OpResult::failed("Name is required");
        }
        let free = self.available_pins();
        let Some(button) = self.find_mut(&update.id) else {
            return OpResult::failed("Button not found");
        };
        if button.gpio_pin != update.gpio_pin && !free.contains(&update.gpio_pin) {
            return OpResult::failed(format!("GPIO {} is not available", update.gpio_pin));
        }
        let event = format!(
            "Button '{}' changed to '{}' on GPIO {}",
            button.name, name, update.gpio_pin
        );
        button.name = name;
        button.gpio_pin = update.gpio_pin;
        self.record(event);
        OpResult::ok()
    }

    pub fn remove(&mut self, id: &ButtonId) -> OpResult {
        let Some(index) = self.buttons.iter().position(|b| &b.id == id) else {
            return OpResult::failed("Button not found");
        };
        let removed = self.buttons.remove(index);
        self.record(format!("Button '{}' removed from GPIO {}", removed.name, removed.gpio_pin));
        OpResult::ok()
    }

    pub fn status(&self, host: &HostMetrics) -> StatusSnapshot {
        StatusSnapshot {
            uptime: self.started.elapsed().as_millis() as u64,
            free_heap: Field::new(host.available_memory),
            chip_id: Field::new(host.host_name.clone().unwrap_or_else(|| "simulator".to_string())),
            flash_size: Field::new(host.total_memory),
            cpu_freq: Field::new(host.cpu_mhz),
            sdk_version: Field::new(format!("switch-panel {}", env!("CARGO_PKG_VERSION"))),
            rssi: Field::new(-50),
            local_ip: Field::new(self.ip.to_string()),
        }
    }
}

// ==============================================================================
// http api
// ==============================================================================

pub fn router(device: SharedDevice) -> Router {
    Router::new()
        .route("/api/buttons", get(list_buttons).post(toggle_button))
        .route("/api/gpio/available", get(available_pins))
        .route(
            "/api/settings/buttons",
            get(list_buttons)
                .post(create_button)
                .put(update_button)
                .delete(delete_button),
        )
        .route("/api/status", get(status))
        .route("/api/history", get(history))
        .layer(CorsLayer::permissive())
        .with_state(device)
}

pub async fn serve(listener: TcpListener, device: SharedDevice) -> Result<()> {
    axum::serve(listener, router(device)).await?;
    Ok(())
}

/// bind and serve until the process is stopped
pub async fn run(config: &SimulatorConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    let addr = listener.local_addr()?;
    let device = Device::new(&config.pins, addr.ip()).shared();
    tracing::info!(%addr, pins = config.pins.len(), "device simulator listening");
    serve(listener, device).await
}

async fn list_buttons(State(device): State<SharedDevice>) -> Json<Vec<Button>> {
    Json(device.read().await.buttons().to_vec())
}

async fn toggle_button(
    State(device): State<SharedDevice>,
    Json(req): Json<ToggleRequest>,
) -> Response {
    match device.write().await.toggle(&req.id, req.state) {
        Ok(()) => Json(OpResult::ok()).into_response(),
        Err(message) => (StatusCode::NOT_FOUND, message).into_response(),
    }
}

async fn available_pins(State(device): State<SharedDevice>) -> Json<Vec<u8>> {
    Json(device.read().await.available_pins())
}

async fn create_button(
    State(device): State<SharedDevice>,
    Json(new): Json<NewButton>,
) -> Json<OpResult> {
    Json(device.write().await.add(new))
}

async fn update_button(
    State(device): State<SharedDevice>,
    Json(update): Json<ButtonUpdate>,
) -> Json<OpResult> {
    Json(device.write().await.update(update))
}

async fn delete_button(
    State(device): State<SharedDevice>,
    Json(target): Json<ButtonRef>,
) -> Json<OpResult> {
    Json(device.write().await.remove(&target.id))
}

async fn status(State(device): State<SharedDevice>) -> Json<StatusSnapshot> {
    // offload blocking io to dedicated thread
    let host = tokio::task::spawn_blocking(HostMetrics::read)
        .await
        .unwrap_or_default();
    Json(device.read().await.status(&host))
}

async fn history(State(device): State<SharedDevice>) -> Json<Vec<HistoryEntry>> {
    Json(device.read().await.history().to_vec())
}
