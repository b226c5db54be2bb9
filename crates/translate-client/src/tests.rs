use super::*;
use crate::client::TranslateClient as Client;

#[test]
fn parse_response_with_detections() {
    let body = serde_json::json!({
        "data": {
            "translations": [
                { "translatedText": "hello", "detectedSourceLanguage": "fr" },
                { "translatedText": "good morning", "detectedSourceLanguage": "ja" },
            ]
        }
    })
    .to_string();

    let translations = Client::parse_response(&body).unwrap();
    assert_eq!(
        translations,
        vec![
            Translation {
                translated_text: "hello".into(),
                detected_language_code: "fr".into(),
            },
            Translation {
                translated_text: "good morning".into(),
                detected_language_code: "ja".into(),
            },
        ]
    );
}

#[test]
fn parse_response_missing_detection_defaults_to_undetermined() {
    let body = serde_json::json!({
        "data": {
            "translations": [
                { "translatedText": "hello" },
            ]
        }
    })
    .to_string();

    let translations = Client::parse_response(&body).unwrap();
    assert_eq!(translations[0].detected_language_code, UNDETERMINED_LANG);
}

#[test]
fn parse_response_rejects_malformed_body() {
    assert!(Client::parse_response("not json").is_err());
    assert!(Client::parse_response("{\"data\":{}}").is_err());
}
