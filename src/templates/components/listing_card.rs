use crate::domain::listing::ListingSummary;
use crate::domain::time::relative_time;
use maud::{html, Markup};

pub fn listing_card(listing: &ListingSummary, blob_path: &str, now: i64) -> Markup {
    html! {
        article class="card" data-listing-id=(listing.id) {
            img src=(format!("{blob_path}{}", listing.image_key)) alt=(listing.description) loading="lazy";
            div class="card-body" {
                p { (listing.description) }
                p class="muted" {
                    (listing.category) " · " (listing.location)
                }
                p class="muted" { (relative_time(listing.created_at, now)) }
            }
        }
    }
}
