use serde::{Deserialize, Serialize};
use std::fmt;

/// opaque button identifier as handed out by the device
///
/// the device may use numbers or strings; whatever arrived is sent back
/// unchanged in the same json shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ButtonId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonId::Numeric(n) => write!(f, "{}", n),
            ButtonId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ButtonId {
    fn from(n: u64) -> Self {
        ButtonId::Numeric(n)
    }
}

impl From<&str> for ButtonId {
    fn from(s: &str) -> Self {
        ButtonId::Text(s.to_string())
    }
}

/// a named gpio output configured on the device
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub id: ButtonId,
    pub name: String,
    pub gpio_pin: u8,
    #[serde(default)]
    pub state: bool,
}

/// a status field shown exactly as the device sent it
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Field(pub serde_json::Value);

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::Null => Ok(()),
            serde_json::Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl Field {
    pub fn new(v: impl Into<serde_json::Value>) -> Self {
        Field(v.into())
    }
}

/// device metrics snapshot from /api/status
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusSnapshot {
    /// milliseconds since device boot
    pub uptime: u64,
    pub free_heap: Field,
    pub chip_id: Field,
    pub flash_size: Field,
    pub cpu_freq: Field,
    pub sdk_version: Field,
    pub rssi: Field,
    #[serde(rename = "localIP")]
    pub local_ip: Field,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub event: String,
}

/// success/failure envelope returned by mutating endpoints
///
/// a missing `success` flag counts as failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OpResult {
    pub fn ok() -> Self {
        Self { success: true, message: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()) }
    }
}

/// acknowledgement for POST /api/buttons
///
/// the toggle endpoint may answer with an empty object; only an explicit
/// `success: false` is a refusal.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ToggleAck {
    #[serde(default)]
    pub success: Option<bool>,
}

impl ToggleAck {
    pub fn accepted(&self) -> bool {
        self.success != Some(false)
    }
}

// ==============================================================================
// request payloads
// ==============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub id: ButtonId,
    pub state: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewButton {
    pub name: String,
    pub gpio_pin: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonUpdate {
    pub id: ButtonId,
    pub name: String,
    pub gpio_pin: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonRef {
    pub id: ButtonId,
}
