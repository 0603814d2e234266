use crate::db::accounts::Account;
use crate::domain::listing::OwnListing;
use crate::domain::time::{format_date, relative_time};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct AccountVm<'a> {
    pub account: &'a Account,
    pub listings: &'a [OwnListing],
    pub blob_path: &'a str,
    pub now: i64,
}

pub fn account_page(vm: &AccountVm) -> Markup {
    desktop_layout(
        "Account",
        Some(vm.account),
        html! {
            main {
                h1 { "Your account" }
                p {
                    "Signed in as " code { (vm.account.id) }
                    @if vm.account.charity {
                        " " strong { "(charity)" }
                    }
                }
                p class="muted" { "Member since " (format_date(vm.account.created_at)) }

                h2 { "Your listings" }
                @if vm.listings.is_empty() {
                    p class="muted" { "You have not listed anything yet. " a href="/listing" { "Create a listing" } }
                }
                div class="listings" {
                    @for listing in vm.listings {
                        article class="card" data-listing-id=(listing.id) {
                            img src=(format!("{}{}", vm.blob_path, listing.image_key)) alt=(listing.description);
                            div class="card-body" {
                                p { (listing.description) }
                                p class="muted" { (listing.category) " · " (listing.location) }
                                p class="muted" { "Pickup: " (listing.pickup) }
                                p class="muted" { "Contact: " (listing.contact) }
                                p class="muted" { "Posted " (relative_time(listing.created_at, vm.now)) }
                                form action=(format!("/listing/{}/delete", listing.id)) method="post"
                                    onsubmit="return confirm('Delete this listing?');" {
                                    button class="link-button danger" type="submit" { "Delete" }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
