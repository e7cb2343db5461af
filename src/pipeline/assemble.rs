//! Block assembly: interleave text, tables, and surviving images into one
//! reading-order sequence per page.
//!
//! ## Ordering model
//!
//! Reading order is purely geometric: items are sorted by the top of their
//! bounding box, and items whose tops fall within a small tolerance band are
//! treated as one "line group" ordered left-to-right. No semantic reordering
//! by block type ever happens — a figure between two paragraphs stays between
//! them. Ties inside a group fall back to the artifacts' original extraction
//! order (all sorts are stable), which keeps output deterministic and makes
//! repeated runs byte-identical.
//!
//! Adjacent text runs separated by less than a line's worth of vertical gap
//! are coalesced into a single block; without this, a justified paragraph
//! explodes into one block per extractor line.

use crate::backend::{TableRegion, TextSpan};
use crate::config::ExtractorConfig;
use crate::output::ContentBlock;
use crate::pipeline::imaging::ProcessedImage;
use crate::pipeline::tables;
use once_cell::sync::Lazy;
use regex::Regex;

/// Page-number furniture like `- 2 -` or `-10-`; noise for an LLM reader.
static RE_PAGE_FURNITURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-\s*\d+\s*-$").unwrap());

enum Payload {
    Text(String),
    Table(String),
    Image {
        content: String,
        width: u32,
        height: u32,
    },
}

struct Item {
    top: f64,
    left: f64,
    bottom: f64,
    payload: Payload,
}

/// Merge the three artifact kinds into one ordered block sequence.
pub fn assemble(
    spans: &[TextSpan],
    table_regions: &[TableRegion],
    images: Vec<ProcessedImage>,
    config: &ExtractorConfig,
) -> Vec<ContentBlock> {
    let mut items: Vec<Item> = Vec::with_capacity(spans.len() + table_regions.len() + images.len());

    for span in spans {
        let text = span.text.trim();
        if text.is_empty() || RE_PAGE_FURNITURE.is_match(text) {
            continue;
        }
        items.push(Item {
            top: span.bbox.top,
            left: span.bbox.x0,
            bottom: span.bbox.bottom,
            payload: Payload::Text(text.to_string()),
        });
    }

    for table in table_regions {
        if let Some(markdown) = tables::to_markdown(table) {
            items.push(Item {
                top: table.bbox.top,
                left: table.bbox.x0,
                bottom: table.bbox.bottom,
                payload: Payload::Table(markdown),
            });
        }
    }

    for img in images {
        items.push(Item {
            top: img.top,
            left: img.left,
            bottom: img.top, // images never participate in text coalescing
            payload: Payload::Image {
                content: img.content,
                width: img.width,
                height: img.height,
            },
        });
    }

    order_items(&mut items, config.line_tolerance);
    coalesce(items, config.text_merge_gap)
}

/// Sort top-to-bottom, then left-to-right within each line group.
///
/// Done as a stable sort by top followed by a left-to-right stable sort
/// inside each tolerance group, rather than one comparator — a "within
/// tolerance" comparator is not transitive and would make the order depend
/// on the sort algorithm's visit order.
fn order_items(items: &mut Vec<Item>, line_tolerance: f64) {
    items.sort_by(|a, b| a.top.total_cmp(&b.top));

    let mut start = 0;
    while start < items.len() {
        let group_top = items[start].top;
        let mut end = start + 1;
        while end < items.len() && items[end].top - group_top <= line_tolerance {
            end += 1;
        }
        items[start..end].sort_by(|a, b| a.left.total_cmp(&b.left));
        start = end;
    }
}

/// Fold the ordered items into blocks, merging adjacent text runs.
fn coalesce(items: Vec<Item>, text_merge_gap: f64) -> Vec<ContentBlock> {
    let mut blocks: Vec<ContentBlock> = Vec::with_capacity(items.len());
    let mut last_text_bottom: Option<f64> = None;

    for item in items {
        match item.payload {
            Payload::Text(text) => {
                let mergeable = matches!(blocks.last(), Some(ContentBlock::Text { .. }))
                    && last_text_bottom
                        .map(|b| item.top - b <= text_merge_gap)
                        .unwrap_or(false);
                if mergeable {
                    if let Some(ContentBlock::Text { content }) = blocks.last_mut() {
                        content.push('\n');
                        content.push_str(&text);
                    }
                } else {
                    blocks.push(ContentBlock::Text { content: text });
                }
                last_text_bottom = Some(item.bottom);
            }
            Payload::Table(content) => {
                blocks.push(ContentBlock::Table { content });
                last_text_bottom = None;
            }
            Payload::Image {
                content,
                width,
                height,
            } => {
                blocks.push(ContentBlock::Image {
                    content,
                    width,
                    height,
                });
                last_text_bottom = None;
            }
        }
    }

    blocks
}
