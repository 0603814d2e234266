use maud::{html, Markup};

pub mod listing_card;
pub mod search_filters;

pub use listing_card::listing_card;
pub use search_filters::search_filters;

/// `<select>` over a fixed list, with an optional blank "any" entry.
pub fn options_select(
    name: &str,
    values: &[&str],
    selected: Option<&str>,
    any_label: Option<&str>,
) -> Markup {
    html! {
        select id=(name) name=(name) required[any_label.is_none()] {
            @if let Some(label) = any_label {
                option value="" selected[selected.is_none()] { (label) }
            } @else {
                option value="" disabled selected[selected.is_none()] { "Select…" }
            }
            @for value in values {
                option value=(value) selected[selected == Some(*value)] { (value) }
            }
        }
    }
}
