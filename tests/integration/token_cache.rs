//! Login, token persistence and token reuse across clients.

use crate::mock_server::MockServerFixture;
use mockito::Matcher;
use rest_chain::tokens::{token_file_path, CustomTokenStore};
use rest_chain::{Error, SessionContext, Token};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[test]
fn test_file_store_persists_after_exchange() {
    let dir = tempfile::tempdir().unwrap();
    let mut fixture = MockServerFixture::new();
    let exchange = fixture
        .server
        .mock("POST", "/accesstoken.json")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "jo".into()),
            Matcher::UrlEncoded("password".into(), "pw".into()),
        ]))
        .with_status(200)
        .with_body("oauth_token=tk1&oauth_token_secret=ts1")
        .expect(1)
        .create();

    let config = fixture
        .config()
        .with_credentials("jo", "pw")
        .with_token_cache_dir(dir.path());

    let first = fixture.builder(config.clone()).build().unwrap();
    assert_eq!(first.token(), Some(&Token::new("tk1", "ts1")));

    let file = token_file_path(dir.path(), "rc", Some("jo"));
    let stored: Token = serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(stored, Token::new("tk1", "ts1"));

    let second = fixture.builder(config).build().unwrap();
    assert_eq!(second.token(), Some(&Token::new("tk1", "ts1")));
    assert_eq!(second.token_stats().hits, 1);
    assert_eq!(second.token_stats().exchanges, 0);

    exchange.assert();
}

#[test]
fn test_requests_signed_with_cached_token() {
    let mut fixture = MockServerFixture::new();
    let _exchange = fixture.mock_token("/accesstoken.json", "tk9", None);
    let account = fixture
        .server
        .mock("GET", "/user/myaccount.json")
        .match_query(Matcher::UrlEncoded("oauth_token".into(), "tk9".into()))
        .with_status(200)
        .with_body("{}")
        .create();

    let mut client = fixture.client();
    client.login("jo", "pw").unwrap();
    client.step("user").unwrap().step("myaccount").unwrap();

    account.assert();
}

#[test]
fn test_session_slot_shared_across_principals() {
    let mut fixture = MockServerFixture::new();
    let exchange = fixture
        .server
        .mock("POST", "/accesstoken.json")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("oauth_token=shared&oauth_token_secret=s")
        .expect(1)
        .create();

    let session = SessionContext::new();
    let mut a = fixture
        .builder(fixture.config())
        .session(session.clone())
        .build()
        .unwrap();
    let mut b = fixture
        .builder(fixture.config())
        .session(session.clone())
        .build()
        .unwrap();

    a.login("jo", "pw").unwrap();
    let token = b.login("someone-else", "other").unwrap();

    exchange.assert();
    assert_eq!(token.oauth_token, "shared");
    assert_eq!(
        session.get("access_token").unwrap(),
        Some(Token::new("shared", "s"))
    );
}

#[test]
fn test_custom_store_receives_principal() {
    let mut fixture = MockServerFixture::new();
    let _exchange = fixture.mock_token("/accesstoken.json", "ctk", None);

    let saved: Arc<Mutex<HashMap<Option<String>, Token>>> = Arc::default();
    let reads = Arc::clone(&saved);
    let writes = Arc::clone(&saved);
    let store = CustomTokenStore::new(
        move |principal: Option<&str>| {
            Ok(reads
                .lock()
                .unwrap()
                .get(&principal.map(str::to_string))
                .cloned())
        },
        move |principal: Option<&str>, token: &Token| {
            writes
                .lock()
                .unwrap()
                .insert(principal.map(str::to_string), token.clone());
            Ok(())
        },
    );

    let mut client = fixture
        .builder(fixture.config())
        .token_store(Box::new(store))
        .build()
        .unwrap();
    client.login("jo", "pw").unwrap();

    let saved = saved.lock().unwrap();
    assert_eq!(saved.get(&Some("jo".to_string())), Some(&Token::new("ctk", "ctk-secret")));
}

#[test]
fn test_rejected_login_redacts_password() {
    let mut fixture = MockServerFixture::new();
    let _exchange = fixture.mock_json("POST", "/accesstoken.json", 401, "denied");

    let config = fixture.config().with_credentials("jo", "hunter2");
    let err = match fixture.builder(config).build() {
        Ok(_) => panic!("login should fail"),
        Err(e) => e,
    };

    let api = err.api().expect("api error");
    assert_eq!(api.code, Some(401));
    let url = api.context.url.as_deref().unwrap();
    assert!(url.contains("username=jo"));
    assert!(!url.contains("hunter2"));
}

#[test]
fn test_auto_login_can_be_disabled() {
    let fixture = MockServerFixture::new();
    let config = fixture.config().with_credentials("jo", "pw");
    let client = fixture.builder(config).auto_login(false).build().unwrap();
    assert!(client.token().is_none());
}

#[test]
fn test_custom_store_without_username_gets_no_principal() {
    let mut fixture = MockServerFixture::new();
    let _exchange = fixture.mock_token("/accesstoken.json", "anon", None);

    let calls: Arc<Mutex<Vec<(&'static str, Option<String>)>>> = Arc::default();
    let gets = Arc::clone(&calls);
    let sets = Arc::clone(&calls);
    let store = CustomTokenStore::new(
        move |principal: Option<&str>| {
            gets.lock().unwrap().push(("get", principal.map(str::to_string)));
            Ok(None)
        },
        move |principal: Option<&str>, _token: &Token| {
            sets.lock().unwrap().push(("set", principal.map(str::to_string)));
            Ok(())
        },
    );

    let mut client = fixture
        .builder(fixture.config())
        .token_store(Box::new(store))
        .build()
        .unwrap();
    client.login("", "pw").unwrap();

    assert_eq!(*calls.lock().unwrap(), vec![("get", None), ("set", None)]);
    assert_eq!(client.token(), Some(&Token::new("anon", "anon-secret")));
}

#[test]
fn test_file_token_cache_uses_configured_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let mut fixture = MockServerFixture::new();
    let _exchange = fixture.mock_token("/accesstoken.json", "ptk", None);

    let mut config = fixture.config();
    config.token_file_prefix = "tenant".into();
    let mut client = fixture
        .builder(config)
        .file_token_cache(dir.path())
        .build()
        .unwrap();
    client.login("jo", "pw").unwrap();

    assert!(token_file_path(dir.path(), "tenant", Some("jo")).exists());
    assert!(!token_file_path(dir.path(), "rc", Some("jo")).exists());
}

#[test]
fn test_session_with_other_store_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = MockServerFixture::new();

    let with_cache = fixture
        .builder(fixture.config())
        .file_token_cache(dir.path())
        .session(SessionContext::new())
        .build();
    assert!(matches!(with_cache, Err(Error::Configuration { .. })));

    let config = fixture.config().with_token_cache_dir(dir.path());
    let with_config_dir = fixture.builder(config).session(SessionContext::new()).build();
    assert!(matches!(with_config_dir, Err(Error::Configuration { .. })));

    let store = CustomTokenStore::new(|_: Option<&str>| Ok(None), |_: Option<&str>, _: &Token| Ok(()));
    let with_store = fixture
        .builder(fixture.config())
        .token_store(Box::new(store))
        .session(SessionContext::new())
        .build();
    assert!(matches!(with_store, Err(Error::Configuration { .. })));
}
