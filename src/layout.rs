//! Structural layout containers around rendered fragments

use std::fmt;

/// Structural wrapper kind. Unrecognized names fall back to `Vertical`
/// at the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Vertical,
    Horizontal,
    Grid2,
    Grid3,
    Grid4,
    Masonry,
    Slider,
}

impl Layout {
    pub fn parse(name: &str) -> Self {
        match name {
            "vertical" => Layout::Vertical,
            "horizontal" => Layout::Horizontal,
            "grid-2" => Layout::Grid2,
            "grid-3" => Layout::Grid3,
            "grid-4" => Layout::Grid4,
            "masonry" => Layout::Masonry,
            "slider" => Layout::Slider,
            _ => Layout::Vertical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Vertical => "vertical",
            Layout::Horizontal => "horizontal",
            Layout::Grid2 => "grid-2",
            Layout::Grid3 => "grid-3",
            Layout::Grid4 => "grid-4",
            Layout::Masonry => "masonry",
            Layout::Slider => "slider",
        }
    }

    /// Column count encoded by grid variants; masonry and the linear
    /// layouts take theirs from the options
    fn fixed_columns(&self) -> Option<u32> {
        match self {
            Layout::Grid2 => Some(2),
            Layout::Grid3 => Some(3),
            Layout::Grid4 => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spacing step between layout cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gap {
    None,
    Small,
    Medium,
    Large,
}

impl Gap {
    pub fn parse(name: &str) -> Self {
        match name {
            "none" => Gap::None,
            "small" => Gap::Small,
            "medium" => Gap::Medium,
            "large" => Gap::Large,
            _ => Gap::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gap::None => "none",
            Gap::Small => "small",
            Gap::Medium => "medium",
            Gap::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub columns: u32,
    pub gap: Gap,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            columns: 3,
            gap: Gap::Medium,
        }
    }
}

pub struct LayoutEngine;

impl LayoutEngine {
    /// Wrap a rendered fragment in one container element whose class list
    /// deterministically encodes layout kind, column count, and gap, so
    /// the static stylesheet can style any combination.
    pub fn wrap(html: &str, layout: Layout, options: LayoutOptions) -> String {
        let mut classes = format!("ikb-layout ikb-layout--{}", layout);

        let columns = layout.fixed_columns().or_else(|| match layout {
            Layout::Masonry => Some(options.columns),
            _ => None,
        });
        if let Some(columns) = columns {
            classes.push_str(&format!(" ikb-layout--cols-{}", columns));
        }
        classes.push_str(&format!(" ikb-layout--gap-{}", options.gap.as_str()));

        format!(r#"<div class="{}">{}</div>"#, classes, html)
    }
}

/// Static stylesheet covering every layout/column/gap combination the
/// wrapper can emit. Served as-is by the host; never generated per call.
pub const LAYOUT_STYLESHEET: &str = r#"
.ikb-layout { display: block; }
.ikb-layout--vertical { display: flex; flex-direction: column; }
.ikb-layout--horizontal { display: flex; flex-direction: row; flex-wrap: wrap; }
.ikb-layout--grid-2, .ikb-layout--grid-3, .ikb-layout--grid-4 { display: grid; }
.ikb-layout--masonry { column-fill: balance; }
.ikb-layout--slider { display: flex; overflow-x: auto; scroll-snap-type: x mandatory; }
.ikb-layout--slider > * { scroll-snap-align: start; flex: 0 0 auto; }
.ikb-layout--cols-1 { grid-template-columns: 1fr; column-count: 1; }
.ikb-layout--cols-2 { grid-template-columns: repeat(2, 1fr); column-count: 2; }
.ikb-layout--cols-3 { grid-template-columns: repeat(3, 1fr); column-count: 3; }
.ikb-layout--cols-4 { grid-template-columns: repeat(4, 1fr); column-count: 4; }
.ikb-layout--cols-5 { grid-template-columns: repeat(5, 1fr); column-count: 5; }
.ikb-layout--cols-6 { grid-template-columns: repeat(6, 1fr); column-count: 6; }
.ikb-layout--gap-none { gap: 0; column-gap: 0; }
.ikb-layout--gap-small { gap: 0.5rem; column-gap: 0.5rem; }
.ikb-layout--gap-medium { gap: 1rem; column-gap: 1rem; }
.ikb-layout--gap-large { gap: 2rem; column-gap: 2rem; }
"#;
