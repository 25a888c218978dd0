//! Bridge between execution results and the host template engine
//!
//! Composes the format renderer and layout engine into final HTML,
//! normalizes heterogeneous source records into the canonical item
//! shape, and answers format/layout compatibility questions for
//! authoring tools. Nothing here ever raises to the caller: a render
//! failure degrades a page region to an HTML comment instead of
//! fataling the surrounding document.

use crate::error::{QueryError, Result};
use crate::layout::{Gap, Layout, LayoutEngine, LayoutOptions};
use crate::renderer::{Format, FormatRenderer, NO_RESULTS_FRAGMENT};
use crate::types::{ExecutionResult, NormalizedItem, Value};
use std::collections::HashMap;

/// Render a list of items using the presentation attributes of a
/// compiled query. Never raises; failures come back as an HTML comment.
pub fn render_items(items: &[NormalizedItem], attrs: &HashMap<String, Value>) -> String {
    match render_items_inner(items, attrs) {
        Ok(html) => html,
        Err(e) => format!("<!-- ikb render error: {} -->", e),
    }
}

/// Render an execution result, degrading failure to an HTML comment
pub fn render_result(result: &ExecutionResult, attrs: &HashMap<String, Value>) -> String {
    if !result.success {
        let message = result.error.as_deref().unwrap_or("unknown error");
        return format!("<!-- ikb query error: {} -->", message);
    }
    render_items(&result.items, attrs)
}

fn render_items_inner(items: &[NormalizedItem], attrs: &HashMap<String, Value>) -> Result<String> {
    if items.is_empty() {
        return Ok(NO_RESULTS_FRAGMENT.to_string());
    }

    let format = Format::parse(str_attr(attrs, "format").unwrap_or("card"));
    let layout = Layout::parse(str_attr(attrs, "layout").unwrap_or("vertical"));
    let gap = Gap::parse(str_attr(attrs, "gap").unwrap_or("medium"));

    let columns = match attrs.get("columns").and_then(Value::as_i64) {
        Some(n) => u32::try_from(n)
            .map_err(|_| QueryError::render(format!("invalid column count {}", n)))?,
        None => 3,
    };

    if !is_valid_combination(format, layout) {
        log::warn!(
            "Format '{}' and layout '{}' are a discouraged combination",
            format.as_str(),
            layout.as_str()
        );
    }

    let fragment = FormatRenderer::render(items, format);
    Ok(LayoutEngine::wrap(
        &fragment,
        layout,
        LayoutOptions { columns, gap },
    ))
}

fn str_attr<'a>(attrs: &'a HashMap<String, Value>, name: &str) -> Option<&'a str> {
    attrs.get(name).and_then(Value::as_str)
}

/// Map a raw source record into the canonical item shape, preferring
/// canonical field names and falling back through per-source aliases.
pub fn normalize_item(raw: &serde_json::Value, source_kind: &str) -> NormalizedItem {
    let aliases = alias_table(source_kind);

    NormalizedItem {
        id: pick(raw, "id", aliases.id),
        title: pick(raw, "title", aliases.title).unwrap_or_default(),
        excerpt: pick(raw, "excerpt", aliases.excerpt).unwrap_or_default(),
        content: pick(raw, "content", aliases.content).unwrap_or_default(),
        permalink: pick(raw, "permalink", aliases.permalink).unwrap_or_default(),
        date: pick(raw, "date", aliases.date).unwrap_or_default(),
        author: pick(raw, "author", aliases.author).unwrap_or_default(),
        thumbnail: pick(raw, "thumbnail", aliases.thumbnail).unwrap_or_default(),
        categories: pick_categories(raw, aliases.categories),
    }
}

/// Per-source fallback field names, tried in order after the canonical name
struct AliasTable {
    id: &'static [&'static str],
    title: &'static [&'static str],
    excerpt: &'static [&'static str],
    content: &'static [&'static str],
    permalink: &'static [&'static str],
    date: &'static [&'static str],
    author: &'static [&'static str],
    thumbnail: &'static [&'static str],
    categories: &'static [&'static str],
}

const CANONICAL_ONLY: AliasTable = AliasTable {
    id: &[],
    title: &[],
    excerpt: &[],
    content: &[],
    permalink: &[],
    date: &[],
    author: &[],
    thumbnail: &[],
    categories: &[],
};

fn alias_table(source_kind: &str) -> AliasTable {
    match source_kind {
        "wordpress" => AliasTable {
            id: &["ID"],
            title: &["post_title"],
            excerpt: &["post_excerpt"],
            content: &["post_content"],
            permalink: &["guid", "link"],
            date: &["post_date"],
            author: &["post_author", "display_name"],
            thumbnail: &["featured_image", "thumbnail_url"],
            categories: &["category_names"],
        },
        "rest" => AliasTable {
            id: &["uuid"],
            title: &["name", "headline"],
            excerpt: &["summary", "description"],
            content: &["body"],
            permalink: &["url", "link"],
            date: &["published_at", "created_at"],
            author: &["author_name"],
            thumbnail: &["image", "image_url"],
            categories: &["tags"],
        },
        "filesystem" => AliasTable {
            id: &["slug"],
            title: &["filename"],
            excerpt: &["summary"],
            content: &["body", "raw"],
            permalink: &["path", "slug"],
            date: &["modified_at", "mtime"],
            author: &[],
            thumbnail: &["cover"],
            categories: &["tags"],
        },
        _ => CANONICAL_ONLY,
    }
}

fn pick(raw: &serde_json::Value, canonical: &str, aliases: &[&str]) -> Option<String> {
    std::iter::once(canonical)
        .chain(aliases.iter().copied())
        .find_map(|field| field_as_string(raw.get(field)?))
}

fn field_as_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Categories accept either an array of strings or one comma-separated string
fn pick_categories(raw: &serde_json::Value, aliases: &[&str]) -> Vec<String> {
    let value = std::iter::once("categories")
        .chain(aliases.iter().copied())
        .find_map(|field| raw.get(field));

    match value {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(serde_json::Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Static incompatibility table for authoring-time warnings. A false
/// answer never blocks rendering.
pub fn is_valid_combination(format: Format, layout: Layout) -> bool {
    match format {
        // A single hero block cannot fill multi-column arrangements
        Format::Hero => !matches!(
            layout,
            Layout::Grid2 | Layout::Grid3 | Layout::Grid4 | Layout::Masonry
        ),
        // One table element does not split across columns or slides
        Format::Table => matches!(layout, Layout::Vertical | Layout::Horizontal),
        // Slides only make sense in sliding or inline arrangements
        Format::Carousel => matches!(layout, Layout::Slider | Layout::Horizontal),
        _ => true,
    }
}
