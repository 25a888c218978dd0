//! Per-item HTML format rendering

use crate::types::NormalizedItem;
use crate::utils::escape_html;
use std::fmt::Write;

/// Fixed fragment returned for an empty item list, regardless of format
pub const NO_RESULTS_FRAGMENT: &str = r#"<div class="ikb-empty">No results found.</div>"#;

/// Per-item presentation style. Unrecognized names fall back to `Card`
/// at the parse boundary, so the render dispatch stays exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Card,
    List,
    Grid,
    Hero,
    Minimal,
    Full,
    Table,
    Carousel,
}

impl Format {
    pub fn parse(name: &str) -> Self {
        match name {
            "card" => Format::Card,
            "list" => Format::List,
            "grid" => Format::Grid,
            "hero" => Format::Hero,
            "minimal" => Format::Minimal,
            "full" => Format::Full,
            "table" => Format::Table,
            "carousel" => Format::Carousel,
            _ => Format::Card,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Card => "card",
            Format::List => "list",
            Format::Grid => "grid",
            Format::Hero => "hero",
            Format::Minimal => "minimal",
            Format::Full => "full",
            Format::Table => "table",
            Format::Carousel => "carousel",
        }
    }
}

pub struct FormatRenderer;

impl FormatRenderer {
    pub fn render(items: &[NormalizedItem], format: Format) -> String {
        if items.is_empty() {
            return NO_RESULTS_FRAGMENT.to_string();
        }

        match format {
            // Grid markup is identical to card; arranging items into a
            // visual grid is the layout engine's job
            Format::Card | Format::Grid => render_cards(items),
            Format::List => render_list(items),
            Format::Hero => render_hero(&items[0]),
            Format::Minimal => render_minimal(items),
            Format::Full => render_full(items),
            Format::Table => render_table(items),
            Format::Carousel => render_carousel(items),
        }
    }
}

fn render_cards(items: &[NormalizedItem]) -> String {
    let mut html = String::new();
    for item in items {
        html.push_str(r#"<article class="ikb-item ikb-item--card">"#);
        if !item.thumbnail.is_empty() {
            let _ = write!(
                html,
                r#"<img class="ikb-item__thumb" src="{}" alt="{}">"#,
                escape_html(&item.thumbnail),
                escape_html(&item.title)
            );
        }
        let _ = write!(
            html,
            r#"<h3 class="ikb-item__title"><a href="{}">{}</a></h3>"#,
            escape_html(&item.permalink),
            escape_html(&item.title)
        );
        if !item.excerpt.is_empty() {
            let _ = write!(
                html,
                r#"<p class="ikb-item__excerpt">{}</p>"#,
                escape_html(&item.excerpt)
            );
        }
        if !item.date.is_empty() {
            let _ = write!(
                html,
                r#"<time class="ikb-item__date">{}</time>"#,
                escape_html(&item.date)
            );
        }
        html.push_str("</article>");
    }
    html
}

fn render_list(items: &[NormalizedItem]) -> String {
    let mut html = String::from(r#"<ul class="ikb-list">"#);
    for item in items {
        let _ = write!(
            html,
            r#"<li class="ikb-list__item"><a href="{}">{}</a></li>"#,
            escape_html(&item.permalink),
            escape_html(&item.title)
        );
    }
    html.push_str("</ul>");
    html
}

fn render_hero(item: &NormalizedItem) -> String {
    let mut html = String::from(r#"<section class="ikb-hero">"#);
    let _ = write!(
        html,
        r#"<h2 class="ikb-hero__title">{}</h2>"#,
        escape_html(&item.title)
    );
    if !item.excerpt.is_empty() {
        let _ = write!(
            html,
            r#"<p class="ikb-hero__excerpt">{}</p>"#,
            escape_html(&item.excerpt)
        );
    }
    let _ = write!(
        html,
        r#"<a class="ikb-hero__cta" href="{}">Read more</a>"#,
        escape_html(&item.permalink)
    );
    html.push_str("</section>");
    html
}

fn render_minimal(items: &[NormalizedItem]) -> String {
    let mut html = String::new();
    for item in items {
        let _ = write!(
            html,
            r#"<a class="ikb-minimal__link" href="{}">{}</a>"#,
            escape_html(&item.permalink),
            escape_html(&item.title)
        );
    }
    html
}

fn render_full(items: &[NormalizedItem]) -> String {
    let mut html = String::new();
    for item in items {
        html.push_str(r#"<article class="ikb-item ikb-item--full">"#);
        let _ = write!(
            html,
            r#"<h2 class="ikb-item__title">{}</h2>"#,
            escape_html(&item.title)
        );
        let _ = write!(
            html,
            r#"<div class="ikb-item__meta"><span>{}</span><time>{}</time></div>"#,
            escape_html(&item.author),
            escape_html(&item.date)
        );
        // Deliberate exception to escape-by-default: full-format content
        // is assumed pre-sanitized by the content source
        let _ = write!(
            html,
            r#"<div class="ikb-item__content">{}</div>"#,
            item.content
        );
        html.push_str("</article>");
    }
    html
}

fn render_table(items: &[NormalizedItem]) -> String {
    let mut html = String::from(
        r#"<table class="ikb-table"><thead><tr><th>Title</th><th>Date</th><th>Author</th></tr></thead><tbody>"#,
    );
    for item in items {
        let _ = write!(
            html,
            r#"<tr><td><a href="{}">{}</a></td><td>{}</td><td>{}</td></tr>"#,
            escape_html(&item.permalink),
            escape_html(&item.title),
            escape_html(&item.date),
            escape_html(&item.author)
        );
    }
    html.push_str("</tbody></table>");
    html
}

fn render_carousel(items: &[NormalizedItem]) -> String {
    let mut html = String::new();
    for item in items {
        html.push_str(r#"<div class="ikb-slide">"#);
        if !item.thumbnail.is_empty() {
            let _ = write!(
                html,
                r#"<img class="ikb-slide__thumb" src="{}" alt="{}">"#,
                escape_html(&item.thumbnail),
                escape_html(&item.title)
            );
        }
        let _ = write!(
            html,
            r#"<a class="ikb-slide__title" href="{}">{}</a>"#,
            escape_html(&item.permalink),
            escape_html(&item.title)
        );
        html.push_str("</div>");
    }
    html
}
