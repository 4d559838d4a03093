//! home page: one card per button with an on/off toggle
//!
//! a toggle flips the card immediately, then asks the device. if the
//! device does not accept the new state the card and its listener go back
//! to the state they showed before the click. there is no retry.

use super::Services;
use crate::client::Method;
use crate::dom::{Action, Document, Element, Node, ToggleModel};
use crate::domain::{Button, ButtonId, ToggleAck, ToggleRequest};
use crate::notify::Notification;

pub const CONTAINER: &str = "buttons-container";

pub fn toggle_id(id: &ButtonId) -> String {
    format!("btn-{}", id)
}

fn state_label(state: bool) -> (&'static str, &'static str) {
    if state {
        ("on", "ON")
    } else {
        ("off", "OFF")
    }
}

fn card(button: &Button) -> Node {
    let (class, label) = state_label(button.state);
    Element::new("div")
        .with_class("button-card")
        .with_attr("data-id", &button.id.to_string())
        .with_child(Element::new("h3").with_text(format!("{} (GPIO {})", button.name, button.gpio_pin)))
        .with_child(
            Element::new("button")
                .with_id(&toggle_id(&button.id))
                .with_class(class)
                .with_text(label),
        )
        .into()
}

fn empty_message() -> Node {
    Element::new("p")
        .with_text("No buttons configured. Go to ")
        .with_child(Element::new("a").with_attr("href", "/settings.html").with_text("Settings"))
        .with_text(" to add some.")
        .into()
}

pub async fn load_buttons(svc: &Services, doc: &mut Document) {
    doc.set_text(CONTAINER, "Loading buttons...");

    let Some(buttons) = svc.client.get::<Vec<Button>>("/api/buttons").await else {
        doc.replace_children(CONTAINER, vec![Element::new("p").with_text("Failed to load buttons.").into()]);
        return;
    };
    if buttons.is_empty() {
        doc.replace_children(CONTAINER, vec![empty_message()]);
        return;
    }

    doc.replace_children(CONTAINER, buttons.iter().map(card).collect());
    for b in &buttons {
        doc.on_click(
            &toggle_id(&b.id),
            Action::Toggle(ToggleModel { id: b.id.clone(), gpio_pin: b.gpio_pin, state: b.state }),
        );
    }
}

/// paint a toggle; `false` when the element is gone
fn show_state(doc: &mut Document, element_id: &str, state: bool) -> bool {
    let Some(el) = doc.element_mut(element_id) else {
        return false;
    };
    let (class, label) = state_label(state);
    el.set_attr("class", class);
    el.set_text(label);
    true
}

pub async fn toggle_button(svc: &Services, doc: &mut Document, model: ToggleModel) {
    let element_id = toggle_id(&model.id);
    let previous = model.state;
    let target = !previous;

    if !show_state(doc, &element_id, target) {
        return;
    }
    doc.on_click(&element_id, Action::Toggle(ToggleModel { state: target, ..model.clone() }));

    let request = ToggleRequest { id: model.id.clone(), state: target };
    let ack: Option<ToggleAck> = svc.client.send("/api/buttons", Method::Post, &request).await;
    if ack.map(|a| a.accepted()).unwrap_or(false) {
        tracing::info!(id = %model.id, pin = model.gpio_pin, state = target, "button toggled");
        return;
    }

    show_state(doc, &element_id, previous);
    doc.on_click(&element_id, Action::Toggle(model));
    svc.notifier.notify(Notification::error("Failed to toggle button state."));
}
