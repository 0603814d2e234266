use crate::domain::listing::{CATEGORIES, LOCATIONS};
use crate::domain::query::SearchFilters;
use crate::templates::components::options_select;
use maud::{html, Markup};

/// GET form whose parameter names (`s`, `c`, `l`) are what `/` reads back.
pub fn search_filters(filters: &SearchFilters) -> Markup {
    html! {
        form class="filters" action="/" method="get" {
            input type="search" id="search" name="s" placeholder="Search listings"
                value=(filters.term.as_deref().unwrap_or(""));
            (options_select("c", &CATEGORIES, filters.category.as_deref(), Some("All categories")))
            (options_select("l", &LOCATIONS, filters.location.as_deref(), Some("All locations")))
            button type="submit" { "Search" }
        }
    }
}
