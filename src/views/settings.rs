//! settings page: configure buttons
//!
//! every mutation goes through the device and then re-reads what it
//! changed; nothing here keeps its own copy of the button list.

use super::Services;
use crate::client::Method;
use crate::dom::{Action, ButtonModel, Document, EditModel, Element, Node};
use crate::domain::{Button, ButtonId, ButtonRef, ButtonUpdate, NewButton, OpResult};
use crate::notify::Notification;

pub const LIST: &str = "existing-buttons-list";
pub const FORM: &str = "add-button-form";
pub const NAME_INPUT: &str = "new-button-name";
pub const PIN_SELECT: &str = "new-button-gpio";
pub const SUBMIT: &str = "add-button-submit";
pub const ITEM_CLASS: &str = "existing-button-item";

const BUTTONS_PATH: &str = "/api/settings/buttons";
const VALIDATION_MESSAGE: &str = "Please enter a valid name and select a GPIO pin.";

pub fn edit_id(id: &ButtonId) -> String {
    format!("edit-{}", id)
}

pub fn delete_id(id: &ButtonId) -> String {
    format!("delete-{}", id)
}

pub fn edit_name_id(id: &ButtonId) -> String {
    format!("edit-name-{}", id)
}

pub fn edit_pin_id(id: &ButtonId) -> String {
    format!("edit-gpio-{}", id)
}

pub fn save_id(id: &ButtonId) -> String {
    format!("save-edit-btn-{}", id)
}

pub fn cancel_id(id: &ButtonId) -> String {
    format!("cancel-edit-btn-{}", id)
}

/// the add form in its initial state
pub fn add_form() -> Element {
    Element::new("form")
        .with_id(FORM)
        .with_child(Element::new("label").with_attr("for", NAME_INPUT).with_text("Name:"))
        .with_child(
            Element::new("input")
                .with_id(NAME_INPUT)
                .with_attr("type", "text")
                .with_attr("value", "")
                .with_flag("required"),
        )
        .with_child(Element::new("label").with_attr("for", PIN_SELECT).with_text("GPIO Pin:"))
        .with_child(
            Element::new("select")
                .with_id(PIN_SELECT)
                .with_flag("required")
                .with_child(placeholder_option()),
        )
        .with_child(Element::new("button").with_id(SUBMIT).with_text("Add Button"))
}

fn placeholder_option() -> Node {
    Element::new("option").with_attr("value", "").with_text("Select GPIO Pin").into()
}

fn failure_text(result: Option<OpResult>) -> String {
    result
        .and_then(|r| r.message)
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// name must be non-blank and the pin a number
fn validate(name: &str, pin: &str) -> Option<(String, u8)> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let pin = pin.trim().parse::<u8>().ok()?;
    Some((name.to_string(), pin))
}

fn succeeded(result: &Option<OpResult>) -> bool {
    result.as_ref().map(|r| r.success).unwrap_or(false)
}

// ==============================================================================
// pin selector
// ==============================================================================

pub async fn populate_available_pins(
    svc: &Services,
    doc: &mut Document,
    select_id: &str,
    current_pin: Option<u8>,
) {
    if doc.replace_children(select_id, vec![placeholder_option()]).is_none() {
        return;
    }

    let pins = svc.client.get::<Vec<u8>>("/api/gpio/available").await;
    let options: Vec<Node> = match pins {
        Some(pins) if !pins.is_empty() => std::iter::once(placeholder_option())
            .chain(pins.iter().map(|&pin| -> Node {
                let option = Element::new("option")
                    .with_attr("value", &pin.to_string())
                    .with_text(format!("GPIO {}", pin));
                if current_pin == Some(pin) {
                    option.with_flag("selected").into()
                } else {
                    option.into()
                }
            }))
            .collect(),
        _ => {
            tracing::warn!(select_id, "no available gpio pins or failed to fetch");
            vec![Element::new("option")
                .with_attr("value", "")
                .with_flag("disabled")
                .with_text("No pins available")
                .into()]
        }
    };
    doc.replace_children(select_id, options);
}

// ==============================================================================
// list
// ==============================================================================

fn list_item(button: &Button) -> Vec<Node> {
    vec![
        Element::new("span")
            .with_text(format!("{} (GPIO {})", button.name, button.gpio_pin))
            .into(),
        Element::new("div")
            .with_child(
                Element::new("button")
                    .with_id(&edit_id(&button.id))
                    .with_class("edit")
                    .with_text("Edit"),
            )
            .with_child(
                Element::new("button")
                    .with_id(&delete_id(&button.id))
                    .with_class("delete")
                    .with_text("Delete"),
            )
            .into(),
    ]
}

fn register_item(doc: &mut Document, model: &ButtonModel) {
    doc.on_click(&edit_id(&model.id), Action::Edit(model.clone()));
    doc.on_click(&delete_id(&model.id), Action::Delete(model.id.clone()));
}

pub async fn load_settings_buttons(svc: &Services, doc: &mut Document) {
    doc.set_text(LIST, "Loading existing buttons...");

    let Some(buttons) = svc.client.get::<Vec<Button>>(BUTTONS_PATH).await else {
        doc.replace_children(LIST, vec![Element::new("p").with_text("Failed to load existing buttons.").into()]);
        return;
    };
    if buttons.is_empty() {
        doc.replace_children(LIST, vec![Element::new("p").with_text("No buttons configured yet.").into()]);
        return;
    }

    let items: Vec<Node> = buttons
        .iter()
        .map(|b| -> Node {
            Element::new("div")
                .with_class(ITEM_CLASS)
                .with_attr("data-id", &b.id.to_string())
                .with_children(list_item(b))
                .into()
        })
        .collect();
    doc.replace_children(LIST, items);
    for b in &buttons {
        register_item(doc, &ButtonModel { id: b.id.clone(), name: b.name.clone(), gpio_pin: b.gpio_pin });
    }
}

// ==============================================================================
// add
// ==============================================================================

pub async fn add_button(svc: &Services, doc: &mut Document) {
    let name = doc.value_of(NAME_INPUT).unwrap_or_default();
    let pin = doc.value_of(PIN_SELECT).unwrap_or_default();
    let Some((name, gpio_pin)) = validate(&name, &pin) else {
        svc.notifier.notify(Notification::error(VALIDATION_MESSAGE));
        return;
    };

    let result: Option<OpResult> = svc
        .client
        .send(BUTTONS_PATH, Method::Post, &NewButton { name, gpio_pin })
        .await;
    if succeeded(&result) {
        svc.notifier.notify(Notification::info("Button added successfully!"));
        doc.reset_form(FORM);
        load_settings_buttons(svc, doc).await;
        populate_available_pins(svc, doc, PIN_SELECT, None).await;
    } else {
        svc.notifier
            .notify(Notification::error(format!("Failed to add button: {}", failure_text(result))));
    }
}

// ==============================================================================
// edit
// ==============================================================================

fn edit_form(model: &ButtonModel, new_name: &str) -> Vec<Node> {
    let name_id = edit_name_id(&model.id);
    let pin_id = edit_pin_id(&model.id);
    vec![
        Element::new("h3").with_text(format!("Edit Button: {}", model.name)).into(),
        Element::new("label").with_attr("for", &name_id).with_text("Name:").into(),
        Element::new("input")
            .with_id(&name_id)
            .with_attr("type", "text")
            .with_attr("value", new_name)
            .with_flag("required")
            .into(),
        Element::new("br").into(),
        Element::new("label").with_attr("for", &pin_id).with_text("GPIO Pin:").into(),
        Element::new("select").with_id(&pin_id).with_flag("required").into(),
        Element::new("br").into(),
        Element::new("button").with_id(&save_id(&model.id)).with_text("Save Changes").into(),
        Element::new("button").with_id(&cancel_id(&model.id)).with_text("Cancel").into(),
    ]
}

pub async fn edit_button(svc: &Services, doc: &mut Document, model: ButtonModel) {
    let prompt = format!("Enter new name for {}:", model.name);
    let Some(new_name) = svc.dialog.prompt(&prompt, &model.name) else {
        return;
    };
    if new_name.trim().is_empty() {
        return;
    }

    let data_id = model.id.to_string();
    let Some(original) = doc.replace_item_children(ITEM_CLASS, &data_id, edit_form(&model, &new_name)) else {
        tracing::warn!(id = %model.id, "edit requested for a button that is not listed");
        return;
    };

    populate_available_pins(svc, doc, &edit_pin_id(&model.id), Some(model.gpio_pin)).await;

    doc.on_click(&cancel_id(&model.id), Action::CancelEdit);
    doc.on_click(&save_id(&model.id), Action::SaveEdit(EditModel { button: model, original }));
}

pub async fn save_edit(svc: &Services, doc: &mut Document, model: EditModel) {
    let id = model.button.id.clone();
    let name = doc.value_of(&edit_name_id(&id)).unwrap_or_default();
    let pin = doc.value_of(&edit_pin_id(&id)).unwrap_or_default();
    let Some((name, gpio_pin)) = validate(&name, &pin) else {
        svc.notifier.notify(Notification::error(VALIDATION_MESSAGE));
        return;
    };

    let update = ButtonUpdate { id: id.clone(), name, gpio_pin };
    let result: Option<OpResult> = svc.client.send(BUTTONS_PATH, Method::Put, &update).await;
    if succeeded(&result) {
        svc.notifier.notify(Notification::info("Button updated successfully!"));
        load_settings_buttons(svc, doc).await;
        return;
    }

    svc.notifier
        .notify(Notification::error(format!("Failed to update button: {}", failure_text(result))));
    if doc
        .replace_item_children(ITEM_CLASS, &id.to_string(), model.original)
        .is_some()
    {
        register_item(doc, &model.button);
    }
}

// ==============================================================================
// delete
// ==============================================================================

pub async fn delete_button(svc: &Services, doc: &mut Document, id: &ButtonId) {
    if !svc.dialog.confirm("Are you sure you want to delete this button?") {
        return;
    }

    let result: Option<OpResult> = svc
        .client
        .send(BUTTONS_PATH, Method::Delete, &ButtonRef { id: id.clone() })
        .await;
    if succeeded(&result) {
        svc.notifier.notify(Notification::info("Button deleted successfully!"));
        load_settings_buttons(svc, doc).await;
        populate_available_pins(svc, doc, PIN_SELECT, None).await;
    } else {
        svc.notifier
            .notify(Notification::error(format!("Failed to delete button: {}", failure_text(result))));
    }
}
