use crate::router::handle;
use crate::tests::utils::{body_string, err_status, seed_listing, sign_in, test_app};
use astra::Body;
use http::{Method, Request};

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[test]
fn public_sees_only_listings_older_than_two_days() {
    let app = test_app();
    seed_listing(&app, "owner", "Old oak table", "Furniture", "North", 72);
    seed_listing(&app, "owner", "Brand new kettle", "Kitchenware", "East", 1);

    let resp = handle(get("/", None), &app).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Old oak table"));
    assert!(!body.contains("Brand new kettle"));
    assert!(body.contains("Login"));
}

#[test]
fn charity_sees_fresh_listings() {
    let app = test_app();
    seed_listing(&app, "owner", "Brand new kettle", "Kitchenware", "East", 1);
    let cookie = sign_in(&app, "charity-1", true);

    let body = body_string(handle(get("/", Some(&cookie)), &app).unwrap());
    assert!(body.contains("Brand new kettle"));
}

#[test]
fn owner_sees_own_fresh_listing_but_not_others() {
    let app = test_app();
    seed_listing(&app, "me", "My fresh lamp", "Furniture", "West", 1);
    seed_listing(&app, "someone-else", "Their fresh radio", "Electronics", "West", 1);
    let cookie = sign_in(&app, "me", false);

    let body = body_string(handle(get("/", Some(&cookie)), &app).unwrap());
    assert!(body.contains("My fresh lamp"));
    assert!(!body.contains("Their fresh radio"));
}

#[test]
fn filters_narrow_results() {
    let app = test_app();
    seed_listing(&app, "owner", "Red chair", "Furniture", "North", 72);
    seed_listing(&app, "owner", "Red sweater", "Clothing", "North", 72);
    seed_listing(&app, "owner", "Blue chair", "Furniture", "East", 72);

    let body = body_string(handle(get("/?s=red&c=Furniture", None), &app).unwrap());
    assert!(body.contains("Red chair"));
    assert!(!body.contains("Red sweater"));
    assert!(!body.contains("Blue chair"));

    let body = body_string(handle(get("/?l=East", None), &app).unwrap());
    assert!(body.contains("Blue chair"));
    assert!(!body.contains("Red chair"));
}

#[test]
fn search_term_is_treated_as_text() {
    let app = test_app();
    seed_listing(&app, "owner", "Plain desk", "Furniture", "North", 72);

    let resp = handle(get("/?s=%27%3B%20DROP%20TABLE%20listing%3B%20--", None), &app).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("No listings match your search."));

    // Table still intact.
    let body = body_string(handle(get("/", None), &app).unwrap());
    assert!(body.contains("Plain desk"));
}

#[test]
fn empty_marketplace_shows_placeholder() {
    let app = test_app();
    let body = body_string(handle(get("/", None), &app).unwrap());
    assert!(body.contains("Nothing here yet."));
}

#[test]
fn unknown_route_is_not_found() {
    let app = test_app();
    assert_eq!(err_status(handle(get("/nope", None), &app)), 404);
}

#[test]
fn unknown_upload_is_not_found() {
    let app = test_app();
    assert_eq!(
        err_status(handle(get("/uploads/missing.png", None), &app)),
        404
    );
    assert_eq!(
        err_status(handle(get("/uploads/..%2Fsecret", None), &app)),
        404
    );
}
