//! Wallaby layout inspector
//!
//! A headless driver for the layout engine: loads a JSON document
//! description, lays it out against a viewport, and prints the computed box
//! tree. The `--json` mode emits the full tree in a stable shape for
//! golden-file comparisons.

mod loader;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use wallaby_dom::DomTree;
use wallaby_layout::{
    layout_document, ApproximateFontMetrics, BoxDimensions, BoxType, DisplayValue, EdgeSizes,
    Fragment, FragmentKind, InnerDisplayType, LayoutBox, LineBox, OuterDisplayType, Rect,
};

/// Wallaby layout inspector — lay out a document and print the box tree
#[derive(Parser, Debug)]
#[command(name = "wallaby")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Lay out a document and print the box tree
    wallaby page.json

    # Read the document description from stdin
    cat page.json | wallaby -

    # Override the document's viewport
    wallaby --width 1024 --height 768 page.json

    # Include line boxes and fragments in the tree
    wallaby --lines page.json

    # Dump the whole tree as JSON for diffing
    wallaby --json page.json > layout.json
"#)]
struct Cli {
    /// Path to a JSON document description ("-" reads stdin)
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Viewport width in pixels (overrides the document's viewport)
    #[arg(long, value_name = "PX")]
    width: Option<f32>,

    /// Viewport height in pixels (overrides the document's viewport)
    #[arg(long, value_name = "PX")]
    height: Option<f32>,

    /// Emit the layout tree as JSON instead of the text tree
    #[arg(long)]
    json: bool,

    /// Show line boxes and their fragments in the text tree
    #[arg(long)]
    lines: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let input = if cli.path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        fs::read_to_string(&cli.path)
            .with_context(|| format!("failed to read {}", cli.path.display()))?
    };

    let mut doc = loader::load_document(&input)?;
    if let Some(width) = cli.width {
        doc.viewport.width = width;
    }
    if let Some(height) = cli.height {
        doc.viewport.height = height;
    }

    let metrics = ApproximateFontMetrics;
    let Some(root) = layout_document(
        &doc.tree,
        &doc.styles,
        doc.viewport,
        &metrics,
        &doc.replaced_sizes,
    ) else {
        bail!("document generates no boxes (empty root or display: none)");
    };

    if cli.json {
        let dump = DumpBox::from_layout(&root, &doc.tree);
        println!("{}", serde_json::to_string_pretty(&dump)?);
    } else {
        println!(
            "=== Layout Tree (viewport: {}x{}) ===\n",
            doc.viewport.width, doc.viewport.height
        );
        print_layout_box(&root, &doc.tree, 0, cli.lines);
    }

    Ok(())
}

/// Recursively print a layout box with its used dimensions.
fn print_layout_box(layout_box: &LayoutBox, tree: &DomTree, depth: usize, show_lines: bool) {
    let indent = "  ".repeat(depth);
    let dims = &layout_box.dimensions;

    let name = box_name(layout_box, tree);
    println!(
        "{indent}[{}] {}",
        name.cyan(),
        display_label(layout_box.display)
    );
    println!(
        "{indent}  {} x={:.1} y={:.1} w={:.1} h={:.1}",
        "content:".dimmed(),
        dims.content.x,
        dims.content.y,
        dims.content.width,
        dims.content.height
    );

    if any_edge(dims.margin) {
        println!(
            "{indent}  {} t={:.1} r={:.1} b={:.1} l={:.1}",
            "margin:".dimmed(),
            dims.margin.top,
            dims.margin.right,
            dims.margin.bottom,
            dims.margin.left
        );
    }

    if any_edge(dims.padding) {
        println!(
            "{indent}  {} t={:.1} r={:.1} b={:.1} l={:.1}",
            "padding:".dimmed(),
            dims.padding.top,
            dims.padding.right,
            dims.padding.bottom,
            dims.padding.left
        );
    }

    if any_edge(dims.border) {
        println!(
            "{indent}  {} t={:.1} r={:.1} b={:.1} l={:.1}",
            "border:".dimmed(),
            dims.border.top,
            dims.border.right,
            dims.border.bottom,
            dims.border.left
        );
    }

    if show_lines {
        for (index, line) in layout_box.line_boxes.iter().enumerate() {
            println!(
                "{indent}  {} {index}: x={:.1} y={:.1} w={:.1} h={:.1} baseline={:.1}",
                "line".dimmed(),
                line.rect.x,
                line.rect.y,
                line.rect.width,
                line.rect.height,
                line.baseline
            );
            for fragment in &line.fragments {
                println!("{indent}    {} {}", "frag".dimmed(), fragment_label(fragment));
            }
        }
    }

    println!();

    for child in &layout_box.children {
        print_layout_box(child, tree, depth + 1, show_lines);
    }
}

/// Human-readable name for a box in the tree printout.
fn box_name(layout_box: &LayoutBox, tree: &DomTree) -> String {
    match &layout_box.box_type {
        BoxType::Principal(node_id) => tree.as_element(*node_id).map_or_else(
            || format!("{node_id:?}"),
            |element| format!("<{}> ({node_id:?})", element.tag_name),
        ),
        BoxType::AnonymousInline(text) => {
            let preview: String = text.chars().take(30).collect();
            let preview = preview.replace('\n', "\\n");
            let suffix = if text.chars().count() > 30 { "..." } else { "" };
            format!("Text(\"{preview}{suffix}\")")
        }
        BoxType::LineBreak => "<br>".to_string(),
    }
}

/// The CSS keyword for a two-axis display value.
fn display_label(display: DisplayValue) -> &'static str {
    match (display.outer, display.inner) {
        (OuterDisplayType::Block, InnerDisplayType::Flow) => "block",
        (OuterDisplayType::Block, InnerDisplayType::FlowRoot) => "flow-root",
        (OuterDisplayType::Block, InnerDisplayType::Table) => "table",
        (OuterDisplayType::Block, InnerDisplayType::Flex) => "flex",
        (OuterDisplayType::Block, InnerDisplayType::Grid) => "grid",
        (OuterDisplayType::Inline, InnerDisplayType::FlowRoot) => "inline-block",
        (OuterDisplayType::Inline, _) => "inline",
    }
}

/// True when any of the four edges is non-zero.
fn any_edge(edges: EdgeSizes) -> bool {
    edges.top.abs() + edges.right.abs() + edges.bottom.abs() + edges.left.abs() > 0.0
}

fn fragment_label(fragment: &Fragment) -> String {
    let what = match &fragment.kind {
        FragmentKind::Text { text, font_size } => {
            let preview: String = text.chars().take(20).collect();
            let suffix = if text.chars().count() > 20 { "..." } else { "" };
            format!("text \"{preview}{suffix}\" @{font_size}px")
        }
        FragmentKind::Atomic => "atomic".to_string(),
        FragmentKind::Float => "float".to_string(),
        FragmentKind::BlockPlaceholder => "block placeholder".to_string(),
        FragmentKind::InlineBox { first, last } => {
            format!("inline box (first={first} last={last})")
        }
    };
    format!(
        "{what} x={:.1} y={:.1} w={:.1} h={:.1}",
        fragment.rect.x, fragment.rect.y, fragment.rect.width, fragment.rect.height
    )
}

/// Serializable projection of a layout box for `--json`.
///
/// `LayoutBox` itself carries unresolved style values and interior state
/// that golden files should not depend on; the dump keeps only the used
/// values.
#[derive(Serialize)]
struct DumpBox {
    name: String,
    display: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    node: Option<usize>,
    dimensions: BoxDimensions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    lines: Vec<DumpLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fragments: Vec<DumpFragment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<DumpBox>,
}

#[derive(Serialize)]
struct DumpLine {
    rect: Rect,
    baseline: f32,
    fragments: Vec<DumpFragment>,
}

#[derive(Serialize)]
struct DumpFragment {
    kind: &'static str,
    rect: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    node: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl DumpBox {
    fn from_layout(layout_box: &LayoutBox, tree: &DomTree) -> Self {
        Self {
            name: box_name(layout_box, tree),
            display: display_label(layout_box.display),
            node: layout_box.node_id().map(|id| id.0),
            dimensions: layout_box.dimensions.clone(),
            lines: layout_box.line_boxes.iter().map(DumpLine::from_line).collect(),
            fragments: layout_box
                .fragments
                .iter()
                .map(DumpFragment::from_fragment)
                .collect(),
            children: layout_box
                .children
                .iter()
                .map(|child| Self::from_layout(child, tree))
                .collect(),
        }
    }
}

impl DumpLine {
    fn from_line(line: &LineBox) -> Self {
        Self {
            rect: line.rect,
            baseline: line.baseline,
            fragments: line
                .fragments
                .iter()
                .map(DumpFragment::from_fragment)
                .collect(),
        }
    }
}

impl DumpFragment {
    fn from_fragment(fragment: &Fragment) -> Self {
        let (kind, text) = match &fragment.kind {
            FragmentKind::Text { text, .. } => ("text", Some(text.clone())),
            FragmentKind::Atomic => ("atomic", None),
            FragmentKind::Float => ("float", None),
            FragmentKind::BlockPlaceholder => ("block-placeholder", None),
            FragmentKind::InlineBox { .. } => ("inline-box", None),
        };
        Self {
            kind,
            rect: fragment.rect,
            node: fragment.node.map(|id| id.0),
            text,
        }
    }
}
