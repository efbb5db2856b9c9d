use echo_descriptor::echo_pool;
use grpcweb_core::codec::{Codec, CodecError, JsonCodec};
use grpcweb_core::wire;
use grpcweb_core::{ClientConfig, Format, GrpcWebClient};
use mock_requestor::{MockRequestor, body, trailer_frame};
use prost_reflect::{DynamicMessage, MethodDescriptor, Value};


fn unary_echo() -> MethodDescriptor {
    echo_pool()
        .get_service_by_name("echo.EchoService")
        .expect("Service not found")
        .methods()
        .find(|m| m.name() == "UnaryEcho")
        .expect("Method not found")
}

fn encoded_response(message: &str, count: u32) -> Vec<u8> {
    let mut msg = DynamicMessage::new(unary_echo().output());
    msg.set_field_by_name("message", Value::String(message.to_string()));
    msg.set_field_by_name("count", Value::U32(count));
    prost::Message::encode_to_vec(&msg)
}

#[test]
fn test_encode_validates_against_the_schema() {
    let mut codec = JsonCodec::for_method(&unary_echo());

    let bytes = codec
        .encode(serde_json::json!({ "message": "hello" }))
        .expect("Valid JSON should encode");
    // field 1, length-delimited, 5 bytes
    assert_eq!(bytes.as_ref(), b"\x0a\x05hello");

    let err = codec
        .encode(serde_json::json!({ "unknown": true }))
        .unwrap_err();
    assert!(matches!(err, CodecError::SchemaMismatch(_)));
}

#[test]
fn test_decode_produces_json() {
    let mut codec = JsonCodec::for_method(&unary_echo());

    let value = codec
        .decode(encoded_response("hi", 2).into())
        .expect("Valid bytes should decode");

    assert_eq!(value, serde_json::json!({ "message": "hi", "count": 2 }));
}

#[tokio::test]
async fn test_json_call_over_text_mode() {
    use base64::Engine;

    let response = body(&[
        &wire::encode(&encoded_response("echo: hello", 1)),
        &trailer_frame("grpc-status: 0\r\ngrpc-message: \r\n"),
    ]);
    let requestor = MockRequestor::respond_body(
        base64::engine::general_purpose::STANDARD.encode(response),
    );
    let config = ClientConfig::builder(requestor)
        .format(Format::Text)
        .build()
        .unwrap();
    let client = GrpcWebClient::new(config);

    let result = client
        .call(
            "http://localhost:8080/echo.EchoService/UnaryEcho",
            serde_json::json!({ "message": "hello" }),
            JsonCodec::for_method(&unary_echo()),
            vec![],
        )
        .await
        .unwrap();

    assert_eq!(
        result,
        Ok(serde_json::json!({ "message": "echo: hello", "count": 1 }))
    );
}
