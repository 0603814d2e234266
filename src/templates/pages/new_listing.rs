use crate::db::accounts::Account;
use crate::domain::listing::{CATEGORIES, LOCATIONS};
use crate::templates::components::options_select;
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn new_listing_page(account: &Account) -> Markup {
    desktop_layout(
        "New listing",
        Some(account),
        html! {
            main {
                h1 { "New listing" }
                p class="muted" {
                    "Your listing is visible to charities right away and to everyone else after two days."
                }

                form class="stacked" action="/listing" method="post" enctype="multipart/form-data" {
                    label for="description" { "Description" }
                    textarea id="description" name="description" rows="4" maxlength="1000" required {}

                    label for="category" { "Category" }
                    (options_select("category", &CATEGORIES, None, None))

                    label for="location" { "Location" }
                    (options_select("location", &LOCATIONS, None, None))

                    label for="pickup" { "Pickup details" }
                    input type="text" id="pickup" name="pickup" maxlength="200" required;

                    label for="contact" { "Contact" }
                    input type="text" id="contact" name="contact" maxlength="200" required;

                    label for="file" { "Photo" }
                    input type="file" id="file" name="file" accept="image/*" required;

                    button type="submit" { "Post listing" }
                }
            }
        },
    )
}
