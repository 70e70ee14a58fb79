use super::*;

#[test]
fn command_frame_encodes_only_command_field() {
    let text = encode_frame(&Frame::command("/calendar list"));
    assert_eq!(text, r#"{"command":"/calendar list"}"#);
}

#[test]
fn typed_frame_encodes_type_and_action() {
    let frame = Frame::typed("calendar", "request_add_event");
    let value: Value = serde_json::from_str(&encode_frame(&frame)).expect("valid json");
    assert_eq!(value, serde_json::json!({"type": "calendar", "action": "request_add_event"}));
}

#[test]
fn extra_fields_are_flattened_to_top_level() {
    let mut frame = Frame::typed("calendar", "delete");
    frame.data.insert("eventId".to_owned(), serde_json::json!("evt-1"));
    let value: Value = serde_json::from_str(&encode_frame(&frame)).expect("valid json");
    assert_eq!(value["eventId"], "evt-1");
    assert!(value.get("data").is_none());
}

#[test]
fn decode_frame_reads_calendar_push() {
    let frame = decode_frame(
        r#"{"type":"calendar","action":"add","event":{"id":"e1","title":"Standup"}}"#,
    )
    .expect("decode");
    assert_eq!(frame.kind.as_deref(), Some("calendar"));
    assert_eq!(frame.action.as_deref(), Some("add"));
    assert_eq!(frame.data["event"]["title"], "Standup");
    assert!(frame.command.is_none());
}

#[test]
fn decode_frame_rejects_non_object_json() {
    let err = decode_frame("[1,2,3]").expect_err("array is not a frame");
    assert!(matches!(err, CodecError::NotAnObject));
}

#[test]
fn decode_frame_rejects_mistyped_type_field() {
    let err = decode_frame(r#"{"type":5}"#).expect_err("type must be a string");
    assert!(matches!(err, CodecError::Json(_)));
}

#[test]
fn decode_incoming_passes_plain_text_through() {
    assert_eq!(decode_incoming("hello there"), Incoming::Text("hello there".to_owned()));
}

#[test]
fn decode_incoming_unwraps_bare_json_string() {
    assert_eq!(decode_incoming(r#""quoted reply""#), Incoming::Text("quoted reply".to_owned()));
}

#[test]
fn decode_incoming_keeps_broken_json_as_text() {
    let raw = r#"{"type":"calendar""#;
    assert_eq!(decode_incoming(raw), Incoming::Text(raw.to_owned()));
}

#[test]
fn decode_incoming_rejects_mistyped_object() {
    let incoming = decode_incoming(r#"{"type": 5, "action": "add"}"#);
    assert!(matches!(incoming, Incoming::Rejected(_)), "got {incoming:?}");
}

#[test]
fn decode_incoming_rejects_non_string_json() {
    for raw in ["[1,2,3]", "42", "true", "null"] {
        assert!(matches!(decode_incoming(raw), Incoming::Rejected(_)), "{raw}");
    }
}

#[test]
fn str_field_ignores_non_string_values() {
    let mut frame = Frame::default();
    frame.data.insert("eventId".to_owned(), serde_json::json!("e-7"));
    frame.data.insert("count".to_owned(), serde_json::json!(3));
    assert_eq!(frame.str_field("eventId"), Some("e-7"));
    assert_eq!(frame.str_field("count"), None);
    assert_eq!(frame.str_field("missing"), None);
}
