// templates/pages/home.rs

use crate::db::accounts::Account;
use crate::domain::listing::ListingSummary;
use crate::domain::query::SearchFilters;
use crate::templates::{desktop_layout, listing_card, search_filters};
use maud::{html, Markup};

pub struct HomeVm<'a> {
    pub account: Option<&'a Account>,
    pub filters: &'a SearchFilters,
    pub listings: &'a [ListingSummary],
    pub blob_path: &'a str,
    pub now: i64,
}

pub fn home_page(vm: &HomeVm) -> Markup {
    desktop_layout(
        "Browse",
        vm.account,
        html! {
            main {
                h1 { "Listings" }
                (search_filters(vm.filters))

                div class="listings" {
                    @for listing in vm.listings {
                        (listing_card(listing, vm.blob_path, vm.now))
                    }
                }

                @if vm.listings.is_empty() {
                    @if vm.filters.is_empty() {
                        p class="muted" { "Nothing here yet. New listings show up two days after they are posted." }
                    } @else {
                        p class="muted" { "No listings match your search." }
                    }
                }
            }
        },
    )
}
