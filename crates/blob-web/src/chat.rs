//! Chat client: fetch plumbing against the AI gateway plus the per-turn
//! choreography that drives the reaction machine.

use blob_core::{
    ReactionRequest, LISTENING_PRESET, LISTENING_REACTION_MS, SPEAKING_PRESET,
    THINKING_REACTION_MS,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

use crate::classify::{
    self, ChatMessage, Classification, CompletionRequest, CompletionResponse,
};
use crate::{dom, speech, ui, App};

/// Proxy endpoint that holds the API key server-side.
pub const GATEWAY_URL: &str = "/api/ai-gateway";

const PRE_THINKING_DELAY_MS: i32 = 500;
const SURPRISED_COLOR: [f32; 3] = [1.0, 0.0, 1.0];

pub struct ChatOutcome {
    pub text: String,
    pub classification: Classification,
    pub is_error: bool,
}

/// One full conversational turn: listening beat, thinking beat, model reply,
/// classification, speech. The final idle transition is issued by the speech
/// completion callback.
pub async fn run_chat_turn(app: App, user_text: String) {
    app.busy.set(true);
    if let Some(doc) = dom::window_document() {
        ui::set_busy(&doc, true);
    }

    let listening = ReactionRequest::preset(LISTENING_PRESET)
        .with_emotion("attentive")
        .with_intensity(0.6)
        .with_duration_ms(LISTENING_REACTION_MS);
    let _ = app.machine.borrow_mut().trigger(&listening, app.now());

    app.history.borrow_mut().push(ChatMessage::user(&user_text));

    sleep_ms(PRE_THINKING_DELAY_MS).await;
    let thinking = ReactionRequest::preset("thinking")
        .with_emotion("curious")
        .with_intensity(0.7)
        .with_duration_ms(THINKING_REACTION_MS);
    let _ = app.machine.borrow_mut().trigger(&thinking, app.now());

    let outcome = {
        let history = app.history.borrow().clone();
        run_chat_exchange(&history, &user_text).await
    };

    if outcome.is_error {
        if let Some(doc) = dom::window_document() {
            ui::append_message(&doc, "assistant", classify::ERROR_REPLY, true);
            ui::set_busy(&doc, false);
        }
        let idle = ReactionRequest::preset("idle")
            .with_emotion("neutral")
            .with_intensity(0.5)
            .with_duration_ms(1000);
        let _ = app.machine.borrow_mut().trigger(&idle, app.now());
        app.busy.set(false);
        return;
    }

    {
        let mut history = app.history.borrow_mut();
        history.push(ChatMessage::assistant(&outcome.text));
        classify::trim_history(&mut history);
    }
    if let Some(doc) = dom::window_document() {
        ui::append_message(&doc, "assistant", &outcome.text, false);
    }

    let surprising = classify::is_surprising_message(&user_text);
    log::info!(
        "classification: {:?} (surprising={})",
        outcome.classification,
        surprising
    );
    let request = if surprising {
        let emotion = outcome
            .classification
            .emotion
            .clone()
            .unwrap_or_else(|| "excited".to_string());
        ReactionRequest::preset("surprised")
            .with_emotion(&emotion)
            .with_intensity(1.0)
            .with_color(SURPRISED_COLOR)
    } else {
        outcome.classification.to_request()
    };

    {
        let now = app.now();
        let mut machine = app.machine.borrow_mut();
        machine.report_speech_start(now);
        if let Err(e) = machine.trigger(&request, now) {
            log::warn!("classifier produced {e}, speaking instead");
            let _ = machine.trigger(&ReactionRequest::preset(SPEAKING_PRESET), now);
        }
    }

    speech::speak(app.clone(), outcome.text).await;
}

/// Model reply plus classification for one exchange, degrading to the
/// fallback classifications rather than failing.
pub async fn run_chat_exchange(history: &[ChatMessage], user_message: &str) -> ChatOutcome {
    let mut messages = vec![ChatMessage::system(classify::ASSISTANT_SYSTEM_PROMPT)];
    messages.extend_from_slice(history);
    let request = CompletionRequest {
        model: classify::CHAT_MODEL,
        messages,
        temperature: classify::CHAT_TEMPERATURE,
        max_tokens: classify::CHAT_MAX_TOKENS,
    };

    match completion(&request).await {
        Ok(text) => {
            let classification = classify_exchange(user_message, &text).await;
            ChatOutcome {
                text,
                classification,
                is_error: false,
            }
        }
        Err(e) => {
            log::error!("chat error: {:?}", e);
            ChatOutcome {
                text: classify::CONNECTION_TROUBLE_REPLY.to_string(),
                classification: Classification::fallback_idle(),
                is_error: true,
            }
        }
    }
}

async fn classify_exchange(user_message: &str, assistant_reply: &str) -> Classification {
    let request = CompletionRequest {
        model: classify::CLASSIFIER_MODEL,
        messages: vec![
            ChatMessage::system(classify::CLASSIFIER_SYSTEM_PROMPT),
            ChatMessage::user(&classify::classifier_exchange_message(
                user_message,
                assistant_reply,
            )),
        ],
        temperature: classify::CLASSIFIER_TEMPERATURE,
        max_tokens: classify::CLASSIFIER_MAX_TOKENS,
    };
    match completion(&request).await {
        Ok(text) => classify::extract_classification(&text).unwrap_or_else(|| {
            log::warn!("classifier reply had no JSON block");
            Classification::fallback_speaking()
        }),
        Err(e) => {
            log::warn!("sentiment analysis error: {:?}", e);
            Classification::fallback_speaking()
        }
    }
}

async fn completion(request: &CompletionRequest) -> Result<String, JsValue> {
    let body =
        serde_json::to_string(request).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let text = post_json(GATEWAY_URL, &body).await?;
    let response: CompletionResponse =
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    classify::reply_text(&response)
        .map(str::to_string)
        .ok_or_else(|| JsValue::from_str("completion had no choices"))
}

pub async fn post_json(url: &str, body: &str) -> Result<String, JsValue> {
    let response = post_for_response(url, body).await?;
    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| JsValue::from_str("non-string response body"))
}

pub async fn post_json_for_blob(url: &str, body: &str) -> Result<web::Blob, JsValue> {
    let response = post_for_response(url, body).await?;
    JsFuture::from(response.blob()?).await?.dyn_into()
}

async fn post_for_response(url: &str, body: &str) -> Result<web::Response, JsValue> {
    let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let init = web::RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from_str(body));
    let request = web::Request::new_with_str_and_init(url, &init)?;
    request.headers().set("Content-Type", "application/json")?;

    let response: web::Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP {} from {url}",
            response.status()
        )));
    }
    Ok(response)
}

/// Await a JS timeout without blocking the event loop.
pub async fn sleep_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web::window() {
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
    });
    let _ = JsFuture::from(promise).await;
}
