//! ==============================================================================
//! views - page controllers and the panel that hosts them
//! ==============================================================================
//!
//! purpose:
//!     each page fetches one resource, renders it into the document and
//!     registers click listeners. the Panel owns the document, opens a page
//!     and routes clicks to the listener's action.
//!
//! pages:
//!     - home.rs: button cards with optimistic toggle
//!     - settings.rs: add / edit / delete buttons, pin selector
//!     - status.rs: device status snapshot, uptime formatting
//!     - history.rs: event log, newest first
//!
//! concurrency:
//!     handlers hold `&mut Document` across their awaits, so one action
//!     runs at a time per panel and the dom never sees interleaved writes.
//!
//! ==============================================================================

pub mod history;
pub mod home;
pub mod settings;
pub mod status;

use crate::client::RequestClient;
use crate::dom::{Action, Document, Element};
use crate::notify::{Dialog, Notifier};

use std::fmt;
use std::sync::Arc;

/// everything a page controller talks to besides the document
#[derive(Clone)]
pub struct Services {
    pub client: RequestClient,
    pub notifier: Arc<dyn Notifier>,
    pub dialog: Arc<dyn Dialog>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    Settings,
    Status,
    History,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Page::Home => "home",
            Page::Settings => "settings",
            Page::Status => "status",
            Page::History => "history",
        })
    }
}

impl Page {
    /// empty page with the containers its controller fills in
    pub fn skeleton(self) -> Document {
        let body = Element::new("body");
        let body = match self {
            Page::Home => body
                .with_child(Element::new("h1").with_text("Buttons"))
                .with_child(Element::new("div").with_id(home::CONTAINER)),
            Page::Settings => body
                .with_child(Element::new("h1").with_text("Settings"))
                .with_child(settings::add_form())
                .with_child(Element::new("h2").with_text("Existing Buttons"))
                .with_child(Element::new("div").with_id(settings::LIST)),
            Page::Status => body
                .with_child(Element::new("h1").with_text("ESP32 Status"))
                .with_child(Element::new("div").with_id(status::CONTAINER)),
            Page::History => body
                .with_child(Element::new("h1").with_text("History"))
                .with_child(Element::new("div").with_id(history::CONTAINER)),
        };
        let mut doc = Document::new(body);
        if self == Page::Settings {
            doc.on_click(settings::SUBMIT, Action::SubmitAdd);
        }
        doc
    }
}

pub struct Panel {
    services: Services,
    page: Page,
    document: Document,
}

impl Panel {
    pub fn new(services: Services) -> Self {
        Self { services, page: Page::Home, document: Page::Home.skeleton() }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// for filling in form fields before a click
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// replace the document with `page` and run its loader
    pub async fn open(&mut self, page: Page) {
        tracing::debug!(%page, "opening page");
        self.page = page;
        self.document = page.skeleton();
        let (svc, doc) = (&self.services, &mut self.document);
        match page {
            Page::Home => home::load_buttons(svc, doc).await,
            Page::Settings => {
                settings::load_settings_buttons(svc, doc).await;
                settings::populate_available_pins(svc, doc, settings::PIN_SELECT, None).await;
            }
            Page::Status => status::load_status(svc, doc).await,
            Page::History => history::load_history(svc, doc).await,
        }
    }

    /// run the listener registered on `element_id`; `false` if there is none
    pub async fn click(&mut self, element_id: &str) -> bool {
        let Some(action) = self.document.listener(element_id).cloned() else {
            tracing::debug!(element_id, "click without listener");
            return false;
        };
        let (svc, doc) = (&self.services, &mut self.document);
        match action {
            Action::Toggle(model) => home::toggle_button(svc, doc, model).await,
            Action::Edit(model) => settings::edit_button(svc, doc, model).await,
            Action::Delete(id) => settings::delete_button(svc, doc, &id).await,
            Action::SaveEdit(model) => settings::save_edit(svc, doc, model).await,
            Action::CancelEdit => settings::load_settings_buttons(svc, doc).await,
            Action::SubmitAdd => settings::add_button(svc, doc).await,
        }
        true
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::rig;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_settings_page_loads_list_then_pins() {
        let r = rig();
        r.transport.respond_json(json!([]));
        r.transport.respond_json(json!([4, 5]));
        let mut panel = Panel::new(r.services.clone());
        panel.open(Page::Settings).await;

        assert_eq!(
            r.transport.calls(),
            vec!["GET /api/settings/buttons", "GET /api/gpio/available"]
        );
        assert_eq!(panel.page(), Page::Settings);
        assert!(panel.document().listener(settings::SUBMIT).is_some());
    }

    #[tokio::test]
    async fn test_click_without_listener_is_noop() {
        let r = rig();
        let mut panel = Panel::new(r.services.clone());
        assert!(!panel.click("btn-404").await);
        assert!(r.transport.requests().is_empty());
    }
}
