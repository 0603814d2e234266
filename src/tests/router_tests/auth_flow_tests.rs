use crate::router::{handle, LOGIN_STATE_COOKIE};
use crate::state::AppState;
use crate::tests::utils::{err_status, location, set_cookies, sign_in, test_app};
use astra::Body;
use http::{Method, Request};
use url::Url;

fn request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Start a sign-in and return the `state` handed to the provider.
fn start_login(app: &AppState, next: &str) -> String {
    let resp = handle(request(Method::GET, &format!("/login?next={next}"), None), app)
        .expect("Handler failed");
    assert_eq!(resp.status(), 302);

    let url = Url::parse(location(&resp)).expect("absolute provider url");
    assert_eq!(url.host_str(), Some("idp.test"));
    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("state param");

    let cookies = set_cookies(&resp);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("{LOGIN_STATE_COOKIE}={state};"))));
    state
}

fn callback(code: &str, state: &str, cookie_state: &str) -> Request<Body> {
    request(
        Method::GET,
        &format!("/callback?code={code}&state={state}"),
        Some(&format!("{LOGIN_STATE_COOKIE}={cookie_state}")),
    )
}

#[test]
fn login_redirects_to_provider_with_pkce() {
    let app = test_app();
    let resp = handle(request(Method::GET, "/login", None), &app).unwrap();
    let url = Url::parse(location(&resp)).unwrap();
    let challenge = url
        .query_pairs()
        .find(|(k, _)| k == "code_challenge")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    // base64url SHA-256, no padding.
    assert_eq!(challenge.len(), 43);
}

#[test]
fn callback_signs_in_and_returns_to_next() {
    let app = test_app();
    let state = start_login(&app, "%2Faccount");

    let resp = handle(callback("sub-123", &state, &state), &app).expect("Handler failed");
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/account");

    let cookies = set_cookies(&resp);
    let session = cookies
        .iter()
        .find(|c| c.starts_with("session=") && !c.starts_with("session=;"))
        .expect("session cookie set");
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("{LOGIN_STATE_COOKIE}=;"))));

    // The new session works.
    let cookie = session.split(';').next().unwrap();
    let resp = handle(request(Method::GET, "/account", Some(cookie)), &app).unwrap();
    assert_eq!(resp.status(), 200);
}

#[test]
fn offsite_next_falls_back_to_home() {
    let app = test_app();
    let state = start_login(&app, "https%3A%2F%2Fevil.example");

    let resp = handle(callback("sub-1", &state, &state), &app).unwrap();
    assert_eq!(location(&resp), "/");
}

#[test]
fn state_mismatch_is_rejected() {
    let app = test_app();
    let state = start_login(&app, "%2F");

    let req = callback("sub-1", &state, "someone-elses-state");
    assert_eq!(err_status(handle(req, &app)), 401);
}

#[test]
fn state_cannot_be_replayed() {
    let app = test_app();
    let state = start_login(&app, "%2F");

    let first = handle(callback("sub-1", &state, &state), &app).unwrap();
    assert_eq!(first.status(), 302);

    assert_eq!(err_status(handle(callback("sub-1", &state, &state), &app)), 401);
}

#[test]
fn failed_exchange_is_unauthorized() {
    let app = test_app();
    let state = start_login(&app, "%2F");

    assert_eq!(err_status(handle(callback("bad", &state, &state), &app)), 401);
}

#[test]
fn callback_without_code_is_bad_request() {
    let app = test_app();
    let missing_code = request(Method::GET, "/callback?state=x", None);
    assert_eq!(err_status(handle(missing_code, &app)), 400);

    let denied = request(Method::GET, "/callback?error=access_denied", None);
    assert_eq!(err_status(handle(denied, &app)), 401);
}

#[test]
fn signed_in_login_goes_home() {
    let app = test_app();
    let cookie = sign_in(&app, "sub-9", false);
    let resp = handle(request(Method::GET, "/login", Some(&cookie)), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/");
}

#[test]
fn logout_revokes_session() {
    let app = test_app();
    let cookie = sign_in(&app, "sub-9", false);

    let resp = handle(request(Method::POST, "/logout", Some(&cookie)), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/");
    assert!(set_cookies(&resp)
        .iter()
        .any(|c| c.starts_with("session=;") && c.contains("Max-Age=0")));

    // The old token no longer signs anyone in.
    let resp = handle(request(Method::GET, "/account", Some(&cookie)), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert!(location(&resp).starts_with("/login"));
}
