//! status page: one snapshot of device metrics

use super::Services;
use crate::dom::{Document, Element, Node};
use crate::domain::StatusSnapshot;

pub const CONTAINER: &str = "status-info";

/// render milliseconds as `Xd Xh Xm Xs`
///
/// zero days, hours or minutes are left out; seconds always appear.
pub fn format_uptime(ms: u64) -> String {
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours % 24 > 0 {
        parts.push(format!("{}h", hours % 24));
    }
    if minutes % 60 > 0 {
        parts.push(format!("{}m", minutes % 60));
    }
    parts.push(format!("{}s", seconds % 60));
    parts.join(" ")
}

fn rows(status: &StatusSnapshot) -> Vec<Node> {
    let fields = [
        ("uptime", "Uptime", format_uptime(status.uptime)),
        ("free-heap", "Free Heap", status.free_heap.to_string()),
        ("chip-id", "Chip ID", status.chip_id.to_string()),
        ("flash-size", "Flash Size", status.flash_size.to_string()),
        ("cpu-freq", "CPU Frequency", status.cpu_freq.to_string()),
        ("sdk-version", "SDK Version", status.sdk_version.to_string()),
        ("wifi-rssi", "WiFi RSSI", status.rssi.to_string()),
        ("local-ip", "Local IP", status.local_ip.to_string()),
    ];
    fields
        .into_iter()
        .map(|(id, label, value)| -> Node {
            Element::new("p")
                .with_child(Element::new("strong").with_text(format!("{}:", label)))
                .with_text(" ")
                .with_child(Element::new("span").with_id(id).with_text(value))
                .into()
        })
        .collect()
}

pub async fn load_status(svc: &Services, doc: &mut Document) {
    doc.set_text(CONTAINER, "Loading ESP32 status...");
    let children = match svc.client.get::<StatusSnapshot>("/api/status").await {
        Some(status) => rows(&status),
        None => vec![Element::new("p").with_text("Failed to load ESP32 status.").into()],
    };
    doc.replace_children(CONTAINER, children);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures::rig;
    use crate::views::Page;
    use serde_json::json;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0s");
        assert_eq!(format_uptime(999), "0s");
        assert_eq!(format_uptime(90_061_000), "1d 1h 1m 1s");
        assert_eq!(format_uptime(60_000), "1m 0s");
        // zero hours in the middle are skipped too
        assert_eq!(format_uptime(86_400_000 + 5_000), "1d 5s");
        assert_eq!(format_uptime(3 * 3_600_000 + 2 * 60_000), "3h 2m 0s");
    }

    #[tokio::test]
    async fn test_status_fields_populated() {
        let r = rig();
        r.transport.respond_json(json!({
            "uptime": 3_661_000u64,
            "freeHeap": 201_344,
            "chipId": "8C4F00",
            "flashSize": 4_194_304,
            "cpuFreq": 240,
            "sdkVersion": "v4.4.7",
            "rssi": -58,
            "localIP": "192.168.1.40"
        }));
        let mut doc = Page::Status.skeleton();
        load_status(&r.services, &mut doc).await;

        let text = |id: &str| doc.element(id).map(|e| e.text_content());
        assert_eq!(text("uptime").as_deref(), Some("1h 1m 1s"));
        assert_eq!(text("free-heap").as_deref(), Some("201344"));
        assert_eq!(text("chip-id").as_deref(), Some("8C4F00"));
        assert_eq!(text("wifi-rssi").as_deref(), Some("-58"));
        assert_eq!(text("local-ip").as_deref(), Some("192.168.1.40"));
    }

    #[tokio::test]
    async fn test_status_failure_message() {
        let r = rig();
        r.transport.fail("timed out");
        let mut doc = Page::Status.skeleton();
        load_status(&r.services, &mut doc).await;

        assert_eq!(doc.element(CONTAINER).unwrap().text_content(), "Failed to load ESP32 status.");
        assert!(doc.element("uptime").is_none());
    }
}
