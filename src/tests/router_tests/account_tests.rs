use crate::router::handle;
use crate::tests::utils::{body_string, location, seed_listing, sign_in, test_app};
use astra::Body;
use http::{Method, Request};

fn get_account(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri("/account");
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[test]
fn account_page_lists_own_listings_with_contact_details() {
    let app = test_app();
    let id = seed_listing(&app, "me", "My fresh lamp", "Furniture", "West", 1);
    seed_listing(&app, "other", "Their old radio", "Electronics", "West", 72);
    let cookie = sign_in(&app, "me", false);

    let resp = handle(get_account(Some(&cookie)), &app).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Your account"));
    assert!(body.contains("My fresh lamp"));
    assert!(body.contains("tg @me"));
    assert!(body.contains(&format!("/listing/{id}/delete")));
    assert!(!body.contains("Their old radio"));
}

#[test]
fn account_requires_sign_in() {
    let app = test_app();
    let resp = handle(get_account(None), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/login?next=%2Faccount");
}

#[test]
fn stale_session_cookie_is_anonymous() {
    let app = test_app();
    let resp = handle(get_account(Some("session=not-a-real-token")), &app).unwrap();
    assert_eq!(resp.status(), 302);
}
