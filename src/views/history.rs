//! history page: device event log, newest first
//!
//! the device returns entries oldest first; they are shown reversed.

use super::Services;
use crate::dom::{Document, Element, Node};
use crate::domain::HistoryEntry;

pub const CONTAINER: &str = "history-log";

fn entry(e: &HistoryEntry) -> Node {
    Element::new("div")
        .with_class("history-entry")
        .with_child(Element::new("span").with_text(e.timestamp.clone()))
        .with_text(format!(" {}", e.event))
        .into()
}

pub async fn load_history(svc: &Services, doc: &mut Document) {
    doc.set_text(CONTAINER, "Loading history...");

    let Some(history) = svc.client.get::<Vec<HistoryEntry>>("/api/history").await else {
        doc.replace_children(CONTAINER, vec![Element::new("p").with_text("Failed to load history.").into()]);
        return;
    };
    if history.is_empty() {
        doc.replace_children(CONTAINER, vec![Element::new("p").with_text("No history entries yet.").into()]);
        return;
    }
    doc.replace_children(CONTAINER, history.iter().rev().map(entry).collect());
}
