use std::time::Instant;

use astra::{Request, Response};
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

use crate::auth::sessions::{self, SESSION_COOKIE};
use crate::auth::token::LoginSecrets;
use crate::db::accounts::{ensure_account, Account};
use crate::db::listings::{delete_owned, insert_listing, list_owned, search_listings};
use crate::db::login_requests::{consume_login_request, insert_login_request, LoginRequest};
use crate::domain::listing::{validate_image, ListingForm};
use crate::domain::query::{SearchFilters, Viewer};
use crate::domain::time::now_unix;
use crate::errors::ServerError;
use crate::request::{
    clear_cookie, get_cookie, header, parse_multipart, parse_query, read_body, set_cookie,
};
use crate::responses::{
    blob_response, error_to_response, html_response, redirect, redirect_with_cookies, ResultResp,
};
use crate::state::AppState;
use crate::templates::pages::{account_page, home_page, new_listing_page, AccountVm, HomeVm};

pub const LOGIN_STATE_COOKIE: &str = "login_state";
const LOGIN_TTL_SECS: i64 = 10 * 60;
/// Room for the multipart envelope and text fields on top of the image.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Entry point for the server: routes, renders errors, logs the outcome.
pub fn serve(req: Request, app: &AppState) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let resp = match handle(req, app) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    };

    info!(
        %method,
        path = %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    resp
}

pub fn handle(mut req: Request, app: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let now = now_unix();

    if method == "GET" {
        let key = app
            .config
            .upload_route()
            .and_then(|prefix| path.strip_prefix(prefix));
        if let Some(key) = key {
            return serve_upload(app, key);
        }
    }

    let account = current_account(&req, app, now)?;
    let account = account.as_ref();

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => browse(&req, app, account, now),

        ("GET", "/account") => match account {
            Some(account) => show_account(app, account, now),
            None => login_redirect(&req),
        },

        ("GET", "/listing") => match account {
            Some(account) => html_response(new_listing_page(account)),
            None => login_redirect(&req),
        },

        ("POST", "/listing") => match account {
            Some(account) => create_listing(&mut req, app, account, now),
            None => login_redirect(&req),
        },

        ("GET" | "POST", "/login") => match account {
            // Already signed in.
            Some(_) => redirect("/"),
            None => login(&req, app, now),
        },

        ("GET", "/callback") => callback(&req, app, now),

        ("POST", "/logout") => logout(&req, app, now),

        ("POST", p) => match (listing_delete_id(p), account) {
            (Some(id), Some(account)) => delete_listing(app, account, id),
            (Some(_), None) => login_redirect(&req),
            (None, _) => Err(ServerError::NotFound),
        },

        _ => Err(ServerError::NotFound),
    }
}

fn current_account(
    req: &Request,
    app: &AppState,
    now: i64,
) -> Result<Option<Account>, ServerError> {
    match get_cookie(req, SESSION_COOKIE) {
        Some(token) => app
            .db
            .with_conn(|conn| sessions::load_account_from_session(conn, &token, now)),
        None => Ok(None),
    }
}

/// Send anonymous visitors to sign in, remembering where they were going.
fn login_redirect(req: &Request) -> ResultResp {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let next: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
    redirect(&format!("/login?next={next}"))
}

fn browse(req: &Request, app: &AppState, account: Option<&Account>, now: i64) -> ResultResp {
    let q = parse_query(req);
    let filters = SearchFilters::new(
        q.get("s").map(String::as_str),
        q.get("c").map(String::as_str),
        q.get("l").map(String::as_str),
    );
    let viewer = Viewer::from_account(account);

    let listings = app
        .db
        .with_conn(|conn| search_listings(conn, &viewer, &filters))?;

    html_response(home_page(&HomeVm {
        account,
        filters: &filters,
        listings: &listings,
        blob_path: &app.config.blob_path,
        now,
    }))
}

fn show_account(app: &AppState, account: &Account, now: i64) -> ResultResp {
    let listings = app.db.with_conn(|conn| list_owned(conn, &account.id))?;

    html_response(account_page(&AccountVm {
        account,
        listings: &listings,
        blob_path: &app.config.blob_path,
        now,
    }))
}

fn create_listing(req: &mut Request, app: &AppState, account: &Account, now: i64) -> ResultResp {
    let content_type = header(req, "Content-Type")
        .ok_or_else(|| ServerError::BadRequest("missing content type".into()))?
        .to_string();
    let body = read_body(req, app.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES)?;
    let mut form = parse_multipart(&content_type, &body)?;

    let listing = ListingForm {
        description: form.field("description"),
        category: form.field("category"),
        location: form.field("location"),
        pickup: form.field("pickup"),
        contact: form.field("contact"),
    }
    .validate()?;

    let file = form
        .take_file("file")
        .ok_or_else(|| ServerError::Unprocessable("image is required".into()))?;
    let content_type = validate_image(
        file.content_type.as_deref(),
        file.data.len(),
        app.config.max_upload_bytes,
    )?;

    debug!(filename = ?file.filename, bytes = file.data.len(), %content_type, "storing image");
    let image_key = app.blobs.put(&file.data, &content_type)?;

    match app
        .db
        .with_conn(|conn| insert_listing(conn, &account.id, &listing, &image_key, now))
    {
        Ok(listing_id) => {
            info!(listing_id, owner = %account.id, image_key = %image_key, "listing created");
            redirect("/")
        }
        Err(err) => {
            // Don't leave an orphaned image behind.
            if let Err(rm) = app.blobs.remove(&image_key) {
                warn!(image_key = %image_key, error = %rm, "failed to remove orphaned image");
            }
            Err(err)
        }
    }
}

fn delete_listing(app: &AppState, account: &Account, listing_id: i64) -> ResultResp {
    let image_key = app
        .db
        .with_conn(|conn| delete_owned(conn, listing_id, &account.id))?
        .ok_or(ServerError::NotFound)?;

    info!(listing_id, owner = %account.id, "listing deleted");
    if let Err(err) = app.blobs.remove(&image_key) {
        error!(image_key = %image_key, error = %err, "listing deleted but image removal failed");
    }
    redirect("/account")
}

fn serve_upload(app: &AppState, key: &str) -> ResultResp {
    let (data, content_type) = app.blobs.get(key)?.ok_or(ServerError::NotFound)?;
    blob_response(data, &content_type)
}

fn login(req: &Request, app: &AppState, now: i64) -> ResultResp {
    let q = parse_query(req);
    let secrets = LoginSecrets::generate();
    let code_challenge = secrets.code_challenge();
    let login = LoginRequest {
        state: secrets.state,
        code_verifier: secrets.code_verifier,
        nonce: secrets.nonce,
        return_to: sanitize_next(q.get("next").map(String::as_str)),
        created_at: now,
        expires_at: now + LOGIN_TTL_SECS,
    };

    app.db
        .with_conn(|conn| insert_login_request(conn, &login))?;

    let url = app
        .idp
        .authorization_url(&login.state, &login.nonce, &code_challenge)?;

    redirect_with_cookies(
        &url,
        &[set_cookie(
            LOGIN_STATE_COOKIE,
            &login.state,
            LOGIN_TTL_SECS,
            app.config.cookie_secure,
        )],
    )
}

fn callback(req: &Request, app: &AppState, now: i64) -> ResultResp {
    let q = parse_query(req);

    if let Some(error) = q.get("error") {
        return Err(ServerError::Unauthorized(format!("sign-in failed: {error}")));
    }
    let code = q
        .get("code")
        .ok_or_else(|| ServerError::BadRequest("missing code".into()))?;
    let state = q
        .get("state")
        .ok_or_else(|| ServerError::BadRequest("missing state".into()))?;

    // The state must come back to the same browser that started the sign-in.
    if get_cookie(req, LOGIN_STATE_COOKIE).as_deref() != Some(state.as_str()) {
        return Err(ServerError::Unauthorized("sign-in state mismatch".into()));
    }

    let login = app
        .db
        .with_conn(|conn| consume_login_request(conn, state, now))?
        .ok_or_else(|| ServerError::Unauthorized("sign-in expired, please try again".into()))?;

    let subject = app.idp.exchange(code, &login.code_verifier, &login.nonce)?;

    let ttl = app.config.session_ttl_secs;
    let token = app.db.with_conn(|conn| {
        ensure_account(conn, &subject, now)?;
        sessions::create_session(conn, &subject, now, ttl)
    })?;

    info!(account = %subject, "signed in");
    redirect_with_cookies(
        &login.return_to,
        &[
            set_cookie(SESSION_COOKIE, &token, ttl, app.config.cookie_secure),
            clear_cookie(LOGIN_STATE_COOKIE),
        ],
    )
}

fn logout(req: &Request, app: &AppState, now: i64) -> ResultResp {
    if let Some(token) = get_cookie(req, SESSION_COOKIE) {
        app.db
            .with_conn(|conn| sessions::revoke_session(conn, &token, now))?;
    }
    redirect_with_cookies("/", &[clear_cookie(SESSION_COOKIE)])
}

/// `/listing/{id}/delete` -> `id`.
fn listing_delete_id(path: &str) -> Option<i64> {
    path.strip_prefix("/listing/")?
        .strip_suffix("/delete")?
        .parse()
        .ok()
}

/// Only same-site absolute paths survive; anything else falls back to `/`.
fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.contains('\\') => n.to_string(),
        _ => "/".to_string(),
    }
}
