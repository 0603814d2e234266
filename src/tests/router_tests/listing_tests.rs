use crate::request::multipart::encode;
use crate::router::handle;
use crate::tests::utils::{
    body_string, err_status, location, seed_listing, sign_in, test_app, test_app_with,
};
use astra::Body;
use http::{Method, Request};

const BOUNDARY: &str = "testboundary42";

fn form_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("description", "Sturdy bookshelf"),
        ("category", "Furniture"),
        ("location", "Central"),
        ("pickup", "Lobby after 6pm"),
        ("contact", "tg @shelf"),
    ]
}

fn post_listing(body: Vec<u8>, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/listing")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

fn post(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap()
}

fn listing_count(app: &crate::state::AppState) -> i64 {
    app.db
        .with_conn(|conn| {
            conn.query_row("select count(*) from listing", [], |r| r.get(0))
                .map_err(|e| crate::errors::ServerError::DbError(e.to_string()))
        })
        .unwrap()
}

#[test]
fn anonymous_is_sent_to_login() {
    let app = test_app();
    let req = Request::builder()
        .method(Method::GET)
        .uri("/listing")
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/login?next=%2Flisting");
}

#[test]
fn new_listing_form_renders() {
    let app = test_app();
    let cookie = sign_in(&app, "seller", false);
    let req = Request::builder()
        .method(Method::GET)
        .uri("/listing")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();

    let body = body_string(handle(req, &app).unwrap());
    assert!(body.contains("multipart/form-data"));
    assert!(body.contains("name=\"pickup\""));
}

#[test]
fn create_stores_image_and_listing() {
    let app = test_app();
    let cookie = sign_in(&app, "seller", false);
    let body = encode(
        BOUNDARY,
        &form_fields(),
        Some(("file", "shelf.png", "image/png", &b"\x89PNG data"[..])),
    );

    let resp = handle(post_listing(body, Some(&cookie)), &app).expect("Handler failed");
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/");
    assert_eq!(listing_count(&app), 1);

    let key: String = app
        .db
        .with_conn(|conn| {
            conn.query_row("select listing_image_key from listing", [], |r| r.get(0))
                .map_err(|e| crate::errors::ServerError::DbError(e.to_string()))
        })
        .unwrap();
    let (data, ct) = app.blobs.get(&key).unwrap().expect("blob stored");
    assert_eq!(data, b"\x89PNG data");
    assert_eq!(ct, mime::IMAGE_PNG);

    // Served back through /uploads/.
    let req = Request::builder()
        .method(Method::GET)
        .uri(format!("/uploads/{key}"))
        .body(Body::empty())
        .unwrap();
    let resp = handle(req, &app).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap().to_str().unwrap(),
        "image/png"
    );
}

#[test]
fn filename_with_semicolon_still_uploads() {
    let app = test_app();
    let cookie = sign_in(&app, "seller", false);
    let body = encode(
        BOUNDARY,
        &form_fields(),
        Some(("file", "photo; name=x.png", "image/png", &b"\x89PNG data"[..])),
    );

    let resp = handle(post_listing(body, Some(&cookie)), &app).expect("Handler failed");
    assert_eq!(resp.status(), 302);
    assert_eq!(listing_count(&app), 1);
}

#[test]
fn missing_field_is_unprocessable() {
    let app = test_app();
    let cookie = sign_in(&app, "seller", false);
    let fields: Vec<_> = form_fields()
        .into_iter()
        .filter(|(name, _)| *name != "contact")
        .collect();
    let body = encode(
        BOUNDARY,
        &fields,
        Some(("file", "shelf.png", "image/png", &b"img"[..])),
    );

    assert_eq!(err_status(handle(post_listing(body, Some(&cookie)), &app)), 422);
    assert_eq!(listing_count(&app), 0);
}

#[test]
fn missing_image_is_unprocessable() {
    let app = test_app();
    let cookie = sign_in(&app, "seller", false);
    let body = encode(BOUNDARY, &form_fields(), None);

    assert_eq!(err_status(handle(post_listing(body, Some(&cookie)), &app)), 422);
}

#[test]
fn non_image_upload_is_rejected() {
    let app = test_app();
    let cookie = sign_in(&app, "seller", false);
    let body = encode(
        BOUNDARY,
        &form_fields(),
        Some(("file", "notes.txt", "text/plain", &b"hello"[..])),
    );

    assert_eq!(err_status(handle(post_listing(body, Some(&cookie)), &app)), 422);
    assert_eq!(listing_count(&app), 0);
}

#[test]
fn svg_upload_is_rejected() {
    let app = test_app();
    let cookie = sign_in(&app, "seller", false);
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"><script>fetch('/listing/1/delete',{method:'POST'})</script></svg>"#;
    let body = encode(
        BOUNDARY,
        &form_fields(),
        Some(("file", "cat.svg", "image/svg+xml", &svg[..])),
    );

    assert_eq!(err_status(handle(post_listing(body, Some(&cookie)), &app)), 422);
    assert_eq!(listing_count(&app), 0);
}

#[test]
fn oversized_upload_is_rejected() {
    let app = test_app();
    let cookie = sign_in(&app, "seller", false);
    let big = vec![0u8; (app.config.max_upload_bytes + 128 * 1024) as usize];
    let body = encode(
        BOUNDARY,
        &form_fields(),
        Some(("file", "big.png", "image/png", &big[..])),
    );

    assert_eq!(err_status(handle(post_listing(body, Some(&cookie)), &app)), 413);
}

#[test]
fn only_owner_can_delete() {
    let app = test_app();
    let id = seed_listing(&app, "owner", "Old lamp", "Furniture", "West", 72);
    let intruder = sign_in(&app, "intruder", false);

    let req = post(&format!("/listing/{id}/delete"), &intruder);
    assert_eq!(err_status(handle(req, &app)), 404);
    assert_eq!(listing_count(&app), 1);

    let owner = sign_in(&app, "owner", false);
    let resp = handle(post(&format!("/listing/{id}/delete"), &owner), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(location(&resp), "/account");
    assert_eq!(listing_count(&app), 0);
}

#[test]
fn anonymous_delete_goes_to_login() {
    let app = test_app();
    let id = seed_listing(&app, "owner", "Old lamp", "Furniture", "West", 72);
    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("/listing/{id}/delete"))
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert!(location(&resp).starts_with("/login?next="));
    assert_eq!(listing_count(&app), 1);
}

#[test]
fn images_are_served_under_configured_blob_path() {
    let app = test_app_with(|cfg| cfg.blob_path = "/images/".into());
    let cookie = sign_in(&app, "seller", false);
    let body = encode(
        BOUNDARY,
        &form_fields(),
        Some(("file", "shelf.png", "image/png", &b"\x89PNG data"[..])),
    );
    let resp = handle(post_listing(body, Some(&cookie)), &app).expect("Handler failed");
    assert_eq!(resp.status(), 302);

    let key: String = app
        .db
        .with_conn(|conn| {
            conn.query_row("select listing_image_key from listing", [], |r| r.get(0))
                .map_err(|e| crate::errors::ServerError::DbError(e.to_string()))
        })
        .unwrap();

    let home = Request::builder()
        .method(Method::GET)
        .uri("/")
        .header("Cookie", cookie.as_str())
        .body(Body::empty())
        .unwrap();
    assert!(body_string(handle(home, &app).unwrap()).contains(&format!("/images/{key}")));

    let get = |uri: String| {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };
    assert_eq!(handle(get(format!("/images/{key}")), &app).unwrap().status(), 200);
    assert_eq!(err_status(handle(get(format!("/uploads/{key}")), &app)), 404);
}
