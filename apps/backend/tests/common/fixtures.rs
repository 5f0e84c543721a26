//! Test fixtures and factory functions for creating test data.

use serde_json::{json, Value};

use linguaflow_backend::models::WordRecord;

/// Build a word record whose example sentence uses the word.
pub fn word(text: &str, syllables: &str) -> WordRecord {
    WordRecord {
        word: text.to_string(),
        phonetic: format!("/{text}/"),
        definition: format!("definition of {text}"),
        translation: format!("{text} (zh)"),
        example_sentence: format!("The {text} is important."),
        example_translation: format!("{text} 很重要。"),
        syllables: syllables.to_string(),
        part_of_speech: "noun".to_string(),
    }
}

/// The list the stub model returns for vocabulary requests.
pub fn sample_words() -> Vec<WordRecord> {
    vec![
        word("habitat", "hab-i-tat"),
        word("erosion", "e-ro-sion"),
        word("canopy", "can-o-py"),
    ]
}

/// Create a session request body.
pub fn create_session_request(theme: &str, words: &[WordRecord]) -> Value {
    json!({ "theme": theme, "difficulty": "B2", "words": words })
}

/// Drill event bodies.
pub fn event(kind: &str) -> Value {
    json!({ "type": kind })
}

pub fn input_changed(text: &str) -> Value {
    json!({ "type": "input_changed", "text": text })
}

pub fn jump_to(index: usize) -> Value {
    json!({ "type": "jump_to", "index": index })
}

/// Wrap a JSON payload the way generateContent returns model text.
pub fn text_candidate(payload: &Value) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": payload.to_string() }] }
        }]
    })
}

/// Wrap base64 audio the way the TTS model returns it.
pub fn audio_candidate(data: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "inlineData": { "mimeType": "audio/pcm", "data": data } }] }
        }]
    })
}
