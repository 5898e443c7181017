//! Text-to-speech playback.
//!
//! Preferred path: gateway TTS audio routed through the analyser so the blob
//! reacts to the real waveform. Fallback: the browser's speechSynthesis voice
//! with simulated amplitude, since that audio never enters the WebAudio
//! graph. Either way, playback end reports speech stop and issues the final
//! idle reaction.

use blob_core::{ReactionRequest, IDLE_PRESET};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

use crate::{chat, dom, ui, App};

pub const TTS_URL: &str = "/api/tts";
pub const TTS_MODEL: &str = "tts-1";
pub const TTS_VOICE: &str = "nova";

/// Where the frame loop should get its amplitude samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeechSource {
    None,
    Analyser,
    Simulated,
}

pub async fn speak(app: App, text: String) {
    match speak_with_gateway(&app, &text).await {
        Ok(()) => {}
        Err(e) => {
            log::warn!("gateway TTS unavailable ({:?}), using browser voice", e);
            speak_with_browser(&app, &text);
        }
    }
}

async fn speak_with_gateway(app: &App, text: &str) -> Result<(), JsValue> {
    if app.audio.borrow().is_none() {
        return Err(JsValue::from_str("audio graph not ready"));
    }

    let body = serde_json::json!({
        "model": TTS_MODEL,
        "voice": TTS_VOICE,
        "input": text,
        "speed": 1.0,
    })
    .to_string();
    let blob = chat::post_json_for_blob(TTS_URL, &body).await?;
    let url = web::Url::create_object_url_with_blob(&blob)?;
    let audio_el = web::HtmlAudioElement::new_with_src(&url)?;

    {
        let graph_ref = app.audio.borrow();
        let graph = graph_ref
            .as_ref()
            .ok_or_else(|| JsValue::from_str("audio graph not ready"))?;
        let source = graph.context().create_media_element_source(&audio_el)?;
        source.connect_with_audio_node(graph.analyser())?;
        graph
            .analyser()
            .connect_with_audio_node(&graph.context().destination())?;
    }
    app.speech_source.set(SpeechSource::Analyser);

    {
        let app_end = app.clone();
        let url_end = url.clone();
        let on_end = Closure::wrap(Box::new(move || {
            log::info!("TTS finished playing");
            finish_speech(&app_end, Some(&url_end));
        }) as Box<dyn FnMut()>);
        audio_el.set_onended(Some(on_end.as_ref().unchecked_ref()));
        on_end.forget();
    }
    {
        let app_err = app.clone();
        let url_err = url.clone();
        let on_error = Closure::wrap(Box::new(move || {
            log::error!("TTS playback error");
            finish_speech(&app_err, Some(&url_err));
        }) as Box<dyn FnMut()>);
        audio_el.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();
    }

    JsFuture::from(audio_el.play()?).await?;
    log::info!("TTS started playing");
    Ok(())
}

fn speak_with_browser(app: &App, text: &str) {
    let synth = match web::window().map(|w| w.speech_synthesis()) {
        Some(Ok(s)) => s,
        _ => {
            log::error!("speechSynthesis unavailable");
            finish_speech(app, None);
            return;
        }
    };
    let utterance = match web::SpeechSynthesisUtterance::new_with_text(text) {
        Ok(u) => u,
        Err(e) => {
            log::error!("utterance error: {:?}", e);
            finish_speech(app, None);
            return;
        }
    };
    utterance.set_rate(1.0);
    utterance.set_pitch(1.0);
    utterance.set_volume(1.0);
    if let Some(voice) = pick_voice(&synth) {
        utterance.set_voice(Some(&voice));
    }

    app.speech_source.set(SpeechSource::Simulated);

    {
        let app_end = app.clone();
        let on_end = Closure::wrap(Box::new(move || {
            log::info!("browser TTS finished speaking");
            finish_speech(&app_end, None);
        }) as Box<dyn FnMut()>);
        utterance.set_onend(Some(on_end.as_ref().unchecked_ref()));
        on_end.forget();
    }
    {
        let app_err = app.clone();
        let on_error = Closure::wrap(Box::new(move || {
            log::error!("browser TTS error");
            finish_speech(&app_err, None);
        }) as Box<dyn FnMut()>);
        utterance.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        on_error.forget();
    }

    synth.speak(&utterance);
}

fn pick_voice(synth: &web::SpeechSynthesis) -> Option<web::SpeechSynthesisVoice> {
    let voices = synth.get_voices();
    for voice in voices.iter() {
        let voice: web::SpeechSynthesisVoice = voice.unchecked_into();
        if voice.name().contains("Google")
            || voice.name().contains("Microsoft")
            || voice.lang().starts_with("en")
        {
            return Some(voice);
        }
    }
    None
}

/// Playback is over (or failed): stop feeding samples, report speech stop and
/// settle to idle — the one transition speech completion owns.
fn finish_speech(app: &App, revoke_url: Option<&str>) {
    if let Some(url) = revoke_url {
        let _ = web::Url::revoke_object_url(url);
    }
    app.speech_source.set(SpeechSource::None);

    let now = app.now();
    {
        let mut machine = app.machine.borrow_mut();
        machine.report_speech_stop();
        if let Err(e) = machine.trigger(&ReactionRequest::preset(IDLE_PRESET), now) {
            log::error!("idle reversion failed: {e}");
        }
    }

    app.busy.set(false);
    if let Some(doc) = dom::window_document() {
        ui::set_busy(&doc, false);
    }
}
