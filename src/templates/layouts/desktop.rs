use crate::db::accounts::Account;
use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; }
header { display: flex; align-items: center; justify-content: space-between; padding: 0.75rem 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
header nav ul { display: flex; gap: 1rem; list-style: none; margin: 0; padding: 0; align-items: center; }
main { max-width: 1080px; margin: 0 auto; padding: 1.5rem; }
.listings { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 1rem; }
.card { border: 1px solid #e5e7eb; border-radius: 8px; overflow: hidden; }
.card img { width: 100%; height: 180px; object-fit: cover; background: #f3f4f6; }
.card-body { padding: 0.75rem; }
.muted { color: #6b7280; font-size: 0.9em; }
.filters { display: flex; gap: 0.5rem; flex-wrap: wrap; margin-bottom: 1.5rem; }
form.stacked { display: flex; flex-direction: column; gap: 0.75rem; max-width: 480px; }
.link-button { background: none; border: none; color: #2563eb; cursor: pointer; font: inherit; padding: 0; }
.danger { color: #dc2626; }
"#;

pub fn desktop_layout(title: &str, account: Option<&Account>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Marketplace" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                header {
                    a href="/" { strong { "Marketplace" } }
                    nav {
                        ul {
                            li { a href="/" { "Browse" } }
                            @if account.is_some() {
                                li { a href="/listing" { "New listing" } }
                                li { a href="/account" { "Account" } }
                                li {
                                    form action="/logout" method="post" style="margin: 0;" {
                                        button class="link-button" type="submit" { "Log out" }
                                    }
                                }
                            } @else {
                                li { a href="/login" { "Login" } }
                            }
                        }
                    }
                }
                (content)
            }
        }
    }
}
