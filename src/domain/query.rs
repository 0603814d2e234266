// src/domain/query.rs
//
// Builds the listing search query. The 48-hour visibility rule lives here
// and nowhere else: route handlers pass the viewer through and never filter
// listings by age themselves.

use std::fmt;

use thiserror::Error;

use crate::db::accounts::Account;

/// Hours a listing stays hidden from everyone except its owner and charities.
pub const VISIBILITY_DELAY_HOURS: u32 = 48;

const SELECT: &str = r#""listing"."listing_id", "listing"."listing_description", "listing"."listing_location", "listing"."listing_created_at", "listing"."listing_image_key", "listing"."listing_category""#;
const FROM: &str =
    r#""listing" INNER JOIN "account" ON "listing"."listing_owner_id" = "account"."account_id""#;
const ORDER_BY: &str = r#""listing"."listing_created_at" DESC"#;

/// Who is looking at the listings. Decides the visibility clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// Not signed in.
    Public,
    /// Signed-in account without the charity flag.
    Authenticated { user_id: String },
    /// Charity accounts see every listing regardless of age.
    Charity,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewerTagError {
    #[error("unknown viewer role {0:?}")]
    UnknownRole(String),
    #[error("role \"auth\" requires a user id")]
    MissingUserId,
}

impl Viewer {
    pub fn from_account(account: Option<&Account>) -> Self {
        match account {
            None => Viewer::Public,
            Some(a) if a.charity => Viewer::Charity,
            Some(a) => Viewer::Authenticated {
                user_id: a.id.clone(),
            },
        }
    }

    /// Parse the short role tags used in logs and by the `query` command:
    /// `"charity"`, `"auth"` (needs `user_id`) and `"public"`.
    pub fn from_tag(tag: &str, user_id: Option<&str>) -> Result<Self, ViewerTagError> {
        match tag {
            "charity" => Ok(Viewer::Charity),
            "public" => Ok(Viewer::Public),
            "auth" => match user_id {
                Some(id) if !id.is_empty() => Ok(Viewer::Authenticated {
                    user_id: id.to_string(),
                }),
                _ => Err(ViewerTagError::MissingUserId),
            },
            other => Err(ViewerTagError::UnknownRole(other.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Viewer::Public => "public",
            Viewer::Authenticated { .. } => "auth",
            Viewer::Charity => "charity",
        }
    }
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Optional search constraints. Blank values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub term: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

impl SearchFilters {
    pub fn new(term: Option<&str>, category: Option<&str>, location: Option<&str>) -> Self {
        Self {
            term: non_blank(term),
            category: non_blank(category),
            location: non_blank(location),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_none() && self.category.is_none() && self.location.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// SQL text plus positional bindings: `?N` binds `bindings[N - 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub query: String,
    pub bindings: Vec<String>,
}

/// Collects WHERE conditions and hands out placeholder numbers in
/// construction order.
#[derive(Default)]
struct Conditions {
    clauses: Vec<String>,
    bindings: Vec<String>,
}

impl Conditions {
    fn bind(&mut self, value: &str) -> String {
        self.bindings.push(value.to_string());
        format!("?{}", self.bindings.len())
    }

    fn push(&mut self, clause: String) {
        self.clauses.push(clause);
    }
}

pub struct ListingQueryBuilder<'a> {
    viewer: &'a Viewer,
    filters: &'a SearchFilters,
}

impl<'a> ListingQueryBuilder<'a> {
    pub fn new(viewer: &'a Viewer, filters: &'a SearchFilters) -> Self {
        Self { viewer, filters }
    }

    pub fn build(&self) -> ListingQuery {
        let mut conds = Conditions::default();

        if let Some(term) = &self.filters.term {
            let p = conds.bind(term);
            conds.push(format!(
                r#"instr("listing"."listing_search_text", lower({p})) > 0"#
            ));
        }
        if let Some(category) = &self.filters.category {
            let p = conds.bind(category);
            conds.push(format!(r#""listing"."listing_category" = {p}"#));
        }
        if let Some(location) = &self.filters.location {
            let p = conds.bind(location);
            conds.push(format!(r#""listing"."listing_location" = {p}"#));
        }

        match self.viewer {
            Viewer::Charity => {}
            Viewer::Authenticated { user_id } => {
                // Owners always see their own listings, even fresh ones.
                let p = conds.bind(user_id);
                conds.push(format!(
                    r#"({} OR "listing"."listing_owner_id" = {p})"#,
                    older_than_delay()
                ));
            }
            Viewer::Public => conds.push(older_than_delay()),
        }

        let mut query = format!("SELECT {SELECT} FROM {FROM}");
        if !conds.clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conds.clauses.join(" AND "));
        }
        query.push_str(" ORDER BY ");
        query.push_str(ORDER_BY);

        ListingQuery {
            query,
            bindings: conds.bindings,
        }
    }
}

fn older_than_delay() -> String {
    format!(
        r#""listing"."listing_created_at" < unixepoch('now', '-{VISIBILITY_DELAY_HOURS} hours')"#
    )
}

/// Shorthand for `ListingQueryBuilder::new(viewer, filters).build()`.
pub fn listing_query(viewer: &Viewer, filters: &SearchFilters) -> ListingQuery {
    ListingQueryBuilder::new(viewer, filters).build()
}
