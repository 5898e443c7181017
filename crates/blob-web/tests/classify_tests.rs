// Host-side tests for the pure chat/classifier logic.
// The crate itself is wasm-only, so the module is included directly.

#![allow(dead_code)]
mod classify {
    include!("../src/classify.rs");
}

use classify::*;

#[test]
fn extract_classification_from_plain_json() {
    let cls = extract_classification(
        r##"{"preset":"surprised","emotion":"excited","intensity":0.9,"duration":2500,"color":"#ff00ff"}"##,
    )
    .unwrap();
    assert_eq!(cls.preset, "surprised");
    assert_eq!(cls.emotion.as_deref(), Some("excited"));
    assert_eq!(cls.intensity, Some(0.9));
    assert_eq!(cls.duration, Some(2500));
    assert_eq!(cls.color.as_deref(), Some("#ff00ff"));
}

#[test]
fn extract_classification_ignores_surrounding_prose() {
    let reply = "Sure! Here is the JSON you asked for:\n\n{\"preset\": \"thinking\", \"emotion\": \"curious\", \"intensity\": 0.7, \"duration\": 2000}\n\nHope that helps!";
    let cls = extract_classification(reply).unwrap();
    assert_eq!(cls.preset, "thinking");
    assert_eq!(cls.duration, Some(2000));
}

#[test]
fn extract_classification_tolerates_missing_optionals() {
    let cls = extract_classification(r#"{"preset":"speaking"}"#).unwrap();
    assert_eq!(cls.preset, "speaking");
    assert_eq!(cls.emotion, None);
    assert_eq!(cls.intensity, None);
    assert_eq!(cls.color, None);
}

#[test]
fn extract_classification_rejects_garbage() {
    assert!(extract_classification("no json here").is_none());
    assert!(extract_classification("{ broken").is_none());
    assert!(extract_classification("} backwards {").is_none());
    assert!(extract_classification("").is_none());
}

#[test]
fn classification_maps_to_reaction_request() {
    let cls = extract_classification(
        r##"{"preset":"speaking","emotion":"happy","intensity":1.4,"color":"#00ff88"}"##,
    )
    .unwrap();
    let req = cls.to_request();
    assert_eq!(req.preset_id, "speaking");
    assert_eq!(req.emotion.as_deref(), Some("happy"));
    // Out-of-range intensities are clamped, malformed colors dropped.
    assert_eq!(req.intensity, Some(1.0));
    let color = req.color.unwrap();
    assert!((color[1] - 1.0).abs() < 1e-6);
    assert!((color[2] - 136.0 / 255.0).abs() < 1e-6);

    let bad_color = Classification {
        color: Some("chartreuse".to_string()),
        ..cls
    };
    assert_eq!(bad_color.to_request().color, None);
}

#[test]
fn fallback_classifications_match_degraded_behavior() {
    let speaking = Classification::fallback_speaking();
    assert_eq!(speaking.preset, "speaking");
    assert_eq!(speaking.intensity, Some(0.5));
    assert_eq!(speaking.duration, Some(2000));

    let idle = Classification::fallback_idle();
    assert_eq!(idle.preset, "idle");
    assert_eq!(idle.emotion.as_deref(), Some("neutral"));
}

#[test]
fn surprise_detector_matches_exclamations() {
    for text in [
        "OMG that is wild",
        "wow, really?",
        "no way, you did what?!",
        "I can't believe it",
        "that is mind-blowing",
        "WHOA",
        "seriously!!",
    ] {
        assert!(is_surprising_message(text), "expected surprise: {text:?}");
    }
}

#[test]
fn surprise_detector_ignores_calm_messages() {
    for text in [
        "hello there",
        "what's the weather like today?",
        "tell me about rust",
        "I was wondering about lunch",
        "how are you",
    ] {
        assert!(!is_surprising_message(text), "false positive: {text:?}");
    }
}

#[test]
fn history_is_trimmed_to_the_last_ten() {
    let mut history: Vec<ChatMessage> = (0..14)
        .map(|i| {
            if i % 2 == 0 {
                ChatMessage::user(&format!("u{i}"))
            } else {
                ChatMessage::assistant(&format!("a{i}"))
            }
        })
        .collect();
    trim_history(&mut history);
    assert_eq!(history.len(), MAX_HISTORY_MESSAGES);
    assert_eq!(history[0].content, "u4", "oldest messages dropped first");
    assert_eq!(history.last().unwrap().content, "a13");

    // Already-short histories are untouched.
    let mut short = vec![ChatMessage::user("hi")];
    trim_history(&mut short);
    assert_eq!(short.len(), 1);
}

#[test]
fn completion_reply_text_reads_first_choice() {
    let resp: CompletionResponse = serde_json::from_str(
        r#"{"choices":[{"message":{"role":"assistant","content":"Hi there!"}}]}"#,
    )
    .unwrap();
    assert_eq!(reply_text(&resp), Some("Hi there!"));

    let empty: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
    assert_eq!(reply_text(&empty), None);
}
