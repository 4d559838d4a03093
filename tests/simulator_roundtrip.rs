//! drives every page against the simulator over real http

use std::net::SocketAddr;
use std::sync::Arc;

use switch_panel::domain::ButtonId;
use switch_panel::dom::Action;
use switch_panel::notify::{Answer, Recorder};
use switch_panel::simulator::{self, Device};
use switch_panel::views::{home, settings, status, history};
use switch_panel::{HttpTransport, Page, Panel, RequestClient, Services};
use tokio::net::TcpListener;

async fn start_simulator(pins: &[u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let device = Device::new(pins, addr.ip()).shared();
    tokio::spawn(async move {
        simulator::serve(listener, device).await.unwrap();
    });
    addr
}

fn panel(addr: SocketAddr, recorder: &Arc<Recorder>) -> Panel {
    let transport = HttpTransport::new(format!("http://{}", addr), None).unwrap();
    Panel::new(Services {
        client: RequestClient::new(Arc::new(transport), recorder.clone()),
        notifier: recorder.clone(),
        dialog: recorder.clone(),
    })
}

async fn add(panel: &mut Panel, name: &str, pin: &str) {
    panel.open(Page::Settings).await;
    let doc = panel.document_mut();
    doc.set_value(settings::NAME_INPUT, name);
    doc.set_value(settings::PIN_SELECT, pin);
    assert!(panel.click(settings::SUBMIT).await);
}

#[tokio::test]
async fn test_full_button_lifecycle() {
    let addr = start_simulator(&[4, 5]).await;
    let recorder = Arc::new(Recorder::new());
    let mut panel = panel(addr, &recorder);

    // empty device
    panel.open(Page::Home).await;
    assert_eq!(panel.document().listener_count(), 0);
    assert!(panel.document().to_text().contains("No buttons configured."));

    // add, then the pin leaves the pool
    add(&mut panel, "Lamp", "4").await;
    assert_eq!(recorder.take()[0].message, "Button added successfully!");
    let pins = panel.document().element(settings::PIN_SELECT).unwrap().text_content();
    assert!(pins.contains("GPIO 5"));
    assert!(!pins.contains("GPIO 4"));

    // toggle on through the home page
    panel.open(Page::Home).await;
    let id = ButtonId::Numeric(1);
    assert!(panel.click(&home::toggle_id(&id)).await);
    assert!(recorder.take().is_empty());
    panel.open(Page::Home).await;
    assert!(panel.document().element("btn-1").unwrap().has_class("on"));

    // rename and move to pin 5
    recorder.push_answer(Answer::Prompt(Some("Desk Lamp".into())));
    panel.open(Page::Settings).await;
    assert!(panel.click(&settings::edit_id(&id)).await);
    panel.document_mut().set_value(&settings::edit_pin_id(&id), "5");
    assert!(panel.click(&settings::save_id(&id)).await);
    assert_eq!(recorder.take()[0].message, "Button updated successfully!");
    assert!(panel
        .document()
        .element(settings::LIST)
        .unwrap()
        .text_content()
        .contains("Desk Lamp (GPIO 5)"));

    // delete
    recorder.push_answer(Answer::Confirm(true));
    assert!(panel.click(&settings::delete_id(&id)).await);
    assert_eq!(recorder.take()[0].message, "Button deleted successfully!");

    // history is newest first
    panel.open(Page::History).await;
    let log = panel.document().element(history::CONTAINER).unwrap().inner_html();
    let removed = log.find("removed").unwrap();
    let added = log.find("added").unwrap();
    assert!(removed < added);
}

#[tokio::test]
async fn test_edit_must_move_to_a_free_pin() {
    let addr = start_simulator(&[4, 5]).await;
    let recorder = Arc::new(Recorder::new());
    let mut panel = panel(addr, &recorder);
    add(&mut panel, "Lamp", "4").await;
    recorder.take();

    let id = ButtonId::Numeric(1);
    recorder.push_answer(Answer::Prompt(Some("Desk Lamp".into())));
    assert!(panel.click(&settings::edit_id(&id)).await);

    // the device only offers unassigned pins, so the current one is missing
    let pin_select = settings::edit_pin_id(&id);
    let offered = panel.document().element(&pin_select).unwrap().text_content();
    assert!(offered.contains("GPIO 5"));
    assert!(!offered.contains("GPIO 4"));
    panel.document_mut().set_value(&pin_select, "4");
    assert_eq!(panel.document().value_of(&pin_select).as_deref(), Some(""));

    let save = settings::save_id(&id);
    assert!(panel.click(&save).await);
    assert_eq!(
        recorder.messages(),
        vec!["Please enter a valid name and select a GPIO pin."]
    );
    assert!(panel.document().listener(&save).is_some());
    recorder.take();

    panel.document_mut().set_value(&pin_select, "5");
    assert!(panel.click(&save).await);
    assert_eq!(recorder.take()[0].message, "Button updated successfully!");
}

#[tokio::test]
async fn test_toggle_of_vanished_button_reverts() {
    let addr = start_simulator(&[4]).await;
    let recorder = Arc::new(Recorder::new());
    let mut panel = panel(addr, &recorder);
    add(&mut panel, "Pump", "4").await;
    panel.open(Page::Home).await;
    recorder.take();

    // another client deletes it behind our back
    let mut other = panel_with_confirm(addr);
    other.open(Page::Settings).await;
    other.click(&settings::delete_id(&ButtonId::Numeric(1))).await;

    let before = panel.document().listener("btn-1").cloned();
    assert!(panel.click("btn-1").await);
    assert!(panel.document().element("btn-1").unwrap().has_class("off"));
    assert_eq!(panel.document().listener("btn-1").cloned(), before);
    assert!(matches!(before, Some(Action::Toggle(m)) if !m.state));
    let messages: Vec<String> = recorder.take().into_iter().map(|n| n.message).collect();
    assert_eq!(
        messages,
        vec![
            "Error: HTTP error! status: 404, message: button 1 not found".to_string(),
            "Failed to toggle button state.".to_string(),
        ]
    );
}

fn panel_with_confirm(addr: SocketAddr) -> Panel {
    let recorder = Arc::new(Recorder::with_answers([Answer::Confirm(true)]));
    panel(addr, &recorder)
}

#[tokio::test]
async fn test_add_rejected_by_device_shows_message() {
    let addr = start_simulator(&[4]).await;
    let recorder = Arc::new(Recorder::new());
    let mut panel = panel(addr, &recorder);
    add(&mut panel, "Lamp", "4").await;
    recorder.take();

    // the stale selector still offers pin 4
    panel.document_mut().set_value(settings::NAME_INPUT, "Fan");
    panel.document_mut().replace_children(
        settings::PIN_SELECT,
        vec![switch_panel::dom::Element::new("option")
            .with_attr("value", "4")
            .with_flag("selected")
            .into()],
    );
    assert!(panel.click(settings::SUBMIT).await);
    assert_eq!(recorder.take()[0].message, "Failed to add button: GPIO 4 is not available");
}

#[tokio::test]
async fn test_status_page() {
    let addr = start_simulator(&[4]).await;
    let recorder = Arc::new(Recorder::new());
    let mut panel = panel(addr, &recorder);
    panel.open(Page::Status).await;

    let doc = panel.document();
    assert!(doc.element(status::CONTAINER).is_some());
    assert_eq!(doc.element("local-ip").unwrap().text_content(), "127.0.0.1");
    assert!(doc.element("uptime").unwrap().text_content().ends_with('s'));
    assert!(recorder.notifications().is_empty());
}

#[tokio::test]
async fn test_unreachable_device() {
    // bind then drop to get a port nobody listens on
    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };
    let recorder = Arc::new(Recorder::new());
    let mut panel = panel(addr, &recorder);
    panel.open(Page::History).await;

    assert_eq!(
        panel.document().element(history::CONTAINER).unwrap().text_content(),
        "Failed to load history."
    );
    assert_eq!(recorder.notifications().len(), 1);
    assert!(recorder.messages()[0].starts_with("Error: "));
}
