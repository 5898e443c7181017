//! Chat transcript and control panel wiring. Controls only read the machine's
//! published snapshot and write through `trigger`.

use blob_core::{ReactionRequest, StateSnapshot};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

use crate::{chat, dom, App};

pub fn append_message(document: &web::Document, role: &str, text: &str, is_error: bool) {
    let Some(log_el) = document.get_element_by_id("chat-log") else {
        return;
    };
    if let Ok(div) = document.create_element("div") {
        let class = if is_error {
            format!("message {role} error")
        } else {
            format!("message {role}")
        };
        let _ = div.set_attribute("class", &class);
        div.set_text_content(Some(text));
        let _ = log_el.append_child(&div);
        log_el.set_scroll_top(log_el.scroll_height());
    }
}

pub fn update_status(document: &web::Document, snapshot: &StateSnapshot) {
    if let Some(el) = document.get_element_by_id("status-line") {
        let text = match &snapshot.emotion {
            Some(emotion) => format!("{} \u{00b7} {emotion}", snapshot.preset_id),
            None => snapshot.preset_id.to_string(),
        };
        el.set_text_content(Some(&text));
    }
}

pub fn set_busy(document: &web::Document, busy: bool) {
    if let Some(input) = document
        .get_element_by_id("chat-input")
        .and_then(|el| el.dyn_into::<web::HtmlInputElement>().ok())
    {
        input.set_disabled(busy);
    }
    if let Some(el) = document.get_element_by_id("chat-send") {
        if busy {
            let _ = el.set_attribute("disabled", "");
        } else {
            let _ = el.remove_attribute("disabled");
        }
    }
}

/// One button per preset, id pattern `preset-<id>`. Manual triggers carry no
/// duration; the next chat turn or speech event moves the state on.
pub fn wire_preset_buttons(document: &web::Document, app: &App) {
    let ids: Vec<&'static str> = app
        .machine
        .borrow()
        .presets()
        .iter()
        .map(|p| p.id)
        .collect();
    for id in ids {
        let app = app.clone();
        dom::add_click_listener(document, &format!("preset-{id}"), move || {
            let now = app.now();
            if let Err(e) = app
                .machine
                .borrow_mut()
                .trigger(&ReactionRequest::preset(id), now)
            {
                log::error!("preset button: {e}");
            }
        });
    }
}

pub fn wire_chat(document: &web::Document, app: &App) {
    {
        let app = app.clone();
        dom::add_click_listener(document, "chat-send", move || {
            submit(&app);
        });
    }

    if let Some(input) = document.get_element_by_id("chat-input") {
        let app = app.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
            if ev.key() == "Enter" && !ev.shift_key() {
                ev.prevent_default();
                submit(&app);
            }
        }) as Box<dyn FnMut(_)>);
        let _ = input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn submit(app: &App) {
    if app.busy.get() {
        return;
    }
    let Some(document) = dom::window_document() else {
        return;
    };
    let Some(text) = dom::input_value(&document, "chat-input") else {
        return;
    };
    let text = text.trim().to_string();
    if text.is_empty() {
        return;
    }
    dom::clear_input(&document, "chat-input");
    append_message(&document, "user", &text, false);

    // A send click is a user gesture, so the audio graph may be created here.
    crate::ensure_audio(app);

    spawn_local(chat::run_chat_turn(app.clone(), text));
}
