//! Chain accumulation, resolution and dispatch.

use crate::mock_server::{offline_client, MockServerFixture, RecordingTransport};
use mockito::Matcher;
use rest_chain::client::{Document, DocumentParser};
use rest_chain::{Body, ContentType, Error, Verb};
use serde::Deserialize;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

#[test]
fn test_table_miss_never_dispatches() {
    let transport = RecordingTransport::ok("{}");
    let mut client = offline_client(transport.clone());

    client.step("user").unwrap();
    client.call("group", [json!("g1")]).unwrap();

    assert_eq!(transport.count(), 0);
    assert_eq!(client.endpoint_id(), "user_group");
    assert_eq!(client.pending_ids().len(), 1);
    assert!(client.response().is_none());
}

#[test]
fn test_missing_id_fails_without_network_and_resets() {
    let transport = RecordingTransport::ok("{}");
    let mut client = offline_client(transport.clone());

    let err = client.step("user").unwrap().step("show").unwrap_err();
    assert!(matches!(
        err,
        Error::MissingPathId { ref endpoint, ref placeholder, .. }
            if endpoint == "user_show" && placeholder == "id"
    ));
    assert_eq!(transport.count(), 0);
    assert_eq!(client.endpoint_id(), "");
    assert!(client.pending_ids().is_empty());
}

#[test]
fn test_ids_substituted_in_order() {
    let transport = RecordingTransport::ok(r#"{"removed": true}"#);
    let mut client = offline_client(transport.clone());

    client
        .call("group", [json!("g1")])
        .unwrap()
        .call("member", [json!(5)])
        .unwrap()
        .step("remove")
        .unwrap();

    let request = transport.last().unwrap();
    assert_eq!(request.verb, Verb::Delete);
    assert!(request
        .url
        .starts_with("http://api.test/v1/group/g1/member/5.json?"));
    assert_eq!(client.response().unwrap().path, "/group/g1/member/5");
    assert_eq!(client.get_json(), Some(&json!({"removed": true})));
}

#[test]
fn test_invoke_bypasses_chain() {
    let transport = RecordingTransport::ok("{}");
    let mut client = offline_client(transport.clone());

    let response = client.invoke("user_show", [json!(1), json!(2)], None).unwrap();
    assert_eq!(response.path, "/user/1/show");
    assert_eq!(response.endpoint.as_deref(), Some("user_show"));

    let err = client.invoke("user_delete", [json!(1)], None).unwrap_err();
    assert!(matches!(err, Error::UnknownEndpoint { ref id } if id == "user_delete"));
    assert_eq!(transport.count(), 1);
}

#[test]
fn test_requests_are_oauth_signed() {
    let transport = RecordingTransport::ok("{}");
    let mut client = offline_client(transport.clone());
    client.step("status").unwrap();

    let url = transport.last().unwrap().url;
    assert!(url.contains("oauth_consumer_key=ck"));
    assert!(url.contains("oauth_signature_method=HMAC-SHA1"));
    assert!(url.contains("oauth_signature="));
    assert!(!url.contains("oauth_token="));
}

#[test]
fn test_user_myaccount() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("GET", "/user/myaccount.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("oauth_consumer_key".into(), "ck".into()),
            Matcher::UrlEncoded("oauth_version".into(), "1.0".into()),
        ]))
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_body(r#"{"id": 7, "name": "Jo"}"#)
        .expect(1)
        .create();

    let mut client = fixture.client();
    client.step("user").unwrap().step("myaccount").unwrap();

    mock.assert();
    assert_eq!(client.get_json(), Some(&json!({"id": 7, "name": "Jo"})));
    assert_eq!(client.response().unwrap().status, 200);
    assert_eq!(client.endpoint_id(), "");

    #[derive(Deserialize)]
    struct Account {
        id: u64,
        name: String,
    }
    let account: Account = client.get_as().unwrap().unwrap();
    assert_eq!((account.id, account.name.as_str()), (7, "Jo"));
}

#[test]
fn test_user_show() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture.mock_json("GET", "/user/12/show.json", 200, r#"{"id": 12}"#);

    let mut client = fixture.client();
    client.call("user", [12]).unwrap();
    assert_eq!(client.pending_ids().len(), 1);
    client.step("show").unwrap();

    mock.assert();
    assert_eq!(client.get_json(), Some(&json!({"id": 12})));
    assert!(client.pending_ids().is_empty());
}

#[test]
fn test_get_payload_becomes_query() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("GET", "/user/search.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("name".into(), "jo smith".into()),
            Matcher::UrlEncoded("filter[active]".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body("[]")
        .create();

    let mut client = fixture.client();
    client
        .step("user")
        .unwrap()
        .call("search", [json!({"name": "jo smith", "filter": {"active": true}})])
        .unwrap();

    mock.assert();
    assert_eq!(client.get_json(), Some(&json!([])));
}

#[test]
fn test_put_payload_becomes_json_body() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("PUT", "/user/3.json")
        .match_query(Matcher::Any)
        .match_body(Matcher::Json(json!({"first_name": "Jo"})))
        .with_status(200)
        .with_body("")
        .create();

    let mut client = fixture.client();
    client
        .call("user", [3])
        .unwrap()
        .call("update", [json!({"first_name": "Jo"})])
        .unwrap();

    mock.assert();
    assert_eq!(client.get_json(), Some(&serde_json::Value::Null));
}

#[test]
fn test_http_error_carries_context_and_resets() {
    let mut fixture = MockServerFixture::new();
    let _mock = fixture.mock_json("GET", "/user/99/show.json", 404, r#"{"message": "no such user"}"#);

    let mut client = fixture.client();
    let err = client
        .call("user", [99])
        .unwrap()
        .step("show")
        .unwrap_err();

    let api = err.api().expect("api error");
    assert_eq!(api.code, Some(404));
    assert_eq!(api.raw_response.as_deref(), Some(r#"{"message": "no such user"}"#));
    assert_eq!(api.context.method.as_deref(), Some("GET"));
    assert!(api
        .context
        .url
        .as_deref()
        .is_some_and(|u| u.ends_with("/user/99/show.json")));
    assert!(client.response().is_none());
    assert_eq!(client.endpoint_id(), "");
}

#[test]
fn test_application_error_is_read_not_raised() {
    let mut fixture = MockServerFixture::new();
    let _mock = fixture.mock_json(
        "GET",
        "/user/myaccount.json",
        200,
        r#"{"error": true, "data": {"message": "account locked"}}"#,
    );

    let mut client = fixture.client();
    client.step("user").unwrap().step("myaccount").unwrap();

    assert!(client.has_error());
    assert_eq!(client.error(), Some(&json!({"message": "account locked"})));
}

#[test]
fn test_xml_mode() {
    let mut fixture = MockServerFixture::new();
    let mock = fixture
        .server
        .mock("GET", "/status.xml")
        .match_query(Matcher::Any)
        .match_header("content-type", "application/xml")
        .with_status(200)
        .with_body("<status>ok</status>")
        .create();

    let mut client = fixture.client();
    client.xml().step("status").unwrap();

    mock.assert();
    assert_eq!(client.content_type(), ContentType::Xml);
    match client.get() {
        Some(Body::Document(doc)) => assert_eq!(doc.raw(), "<status>ok</status>"),
        other => panic!("expected document body, got {:?}", other),
    }
    assert!(client.get_json().is_none());
    assert!(!client.has_error());
}

#[test]
fn test_undecodable_json_body_is_an_api_error() {
    let transport = RecordingTransport::ok("OK");
    let mut client = offline_client(transport.clone());

    let err = match client.step("status") {
        Ok(_) => panic!("plain text body should not decode as JSON"),
        Err(e) => e,
    };

    assert_eq!(transport.count(), 1);
    let api = err.api().expect("api error");
    assert_eq!(api.code, Some(200));
    assert_eq!(api.raw_response.as_deref(), Some("OK"));
    assert_eq!(api.context.method.as_deref(), Some("GET"));
    assert!(api
        .context
        .url
        .as_deref()
        .unwrap()
        .starts_with("http://api.test/v1/status.json"));
    assert!(client.response().is_none());
    assert_eq!(client.endpoint_id(), "");
}

#[test]
fn test_string_id_cannot_escape_its_segment() {
    let transport = RecordingTransport::ok("{}");
    let mut client = offline_client(transport.clone());

    client
        .call("user", [json!("a/b?x=1")])
        .unwrap()
        .step("show")
        .unwrap();

    let request = transport.last().unwrap();
    assert!(request
        .url
        .starts_with("http://api.test/v1/user/a%2Fb%3Fx=1/show.json?"));
    assert_eq!(client.response().unwrap().path, "/user/a%2Fb%3Fx=1/show");
}

#[derive(Debug)]
struct RootElement {
    raw: String,
    name: String,
}

impl Document for RootElement {
    fn raw(&self) -> &str {
        &self.raw
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct RootElementParser;

impl DocumentParser for RootElementParser {
    fn parse(&self, raw: &str) -> rest_chain::Result<Arc<dyn Document>> {
        let name = raw
            .trim()
            .strip_prefix('<')
            .and_then(|rest| rest.split(['>', ' ', '/']).next())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::document("no root element"))?;
        Ok(Arc::new(RootElement {
            raw: raw.to_string(),
            name: name.to_string(),
        }))
    }
}

#[test]
fn test_injected_document_parser_used_in_xml_mode() {
    let mut fixture = MockServerFixture::new();
    let _mock = fixture
        .server
        .mock("GET", "/status.xml")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<status code=\"1\">ok</status>")
        .create();

    let mut client = fixture
        .builder(fixture.config())
        .document_parser(Arc::new(RootElementParser))
        .build()
        .unwrap();
    client.xml().step("status").unwrap();

    let doc = client
        .get()
        .and_then(Body::as_document)
        .expect("document body");
    let root = doc
        .as_any()
        .downcast_ref::<RootElement>()
        .expect("parsed by the injected parser");
    assert_eq!(root.name, "status");
    assert_eq!(root.raw, "<status code=\"1\">ok</status>");
}

#[test]
fn test_document_parse_failure_keeps_raw_body() {
    let transport = RecordingTransport::ok("not markup");
    let mut client = offline_client(transport);

    let err = match client.xml().step("status") {
        Ok(_) => panic!("parse should fail"),
        Err(e) => e,
    };

    let api = err.api().expect("api error");
    assert_eq!(api.code, Some(200));
    assert_eq!(api.raw_response.as_deref(), Some("not markup"));
    assert!(api.message.contains("not an XML document"));
}
