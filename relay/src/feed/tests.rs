use super::*;

#[test]
fn parse_event_frame() {
    let text = serde_json::json!({
        "type": "event",
        "topic": "chat:emberfall",
        "payload": { "source_key": "emberfall" }
    })
    .to_string();
    let event = FeedClient::parse_frame(&text).unwrap().unwrap();
    assert_eq!(event.topic, "chat:emberfall");
    assert_eq!(event.payload["source_key"], "emberfall");
}

#[test]
fn parse_keepalive_frame_yields_none() {
    let text = serde_json::json!({ "type": "keepalive" }).to_string();
    assert!(FeedClient::parse_frame(&text).unwrap().is_none());
}

#[test]
fn parse_unknown_frame_yields_none() {
    let text = serde_json::json!({ "type": "announcement", "topic": "x" }).to_string();
    assert!(FeedClient::parse_frame(&text).unwrap().is_none());
}

#[test]
fn parse_event_frame_without_topic_is_an_error() {
    let text = serde_json::json!({ "type": "event", "payload": {} }).to_string();
    assert!(matches!(
        FeedClient::parse_frame(&text),
        Err(FeedError::Protocol(_))
    ));
}

#[test]
fn parse_rejects_malformed_json() {
    assert!(matches!(
        FeedClient::parse_frame("not json"),
        Err(FeedError::Json(_))
    ));
}
