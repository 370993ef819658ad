use std::collections::HashMap;

use serde::Serialize;

use crate::annotate::color::ColorMap;
use crate::annotate::label::{build_label, extract_accession_version};
use crate::annotate::search;
use crate::metadata::MetadataIndex;
use crate::tree::NodeRef;

/// Fill applied to leaves matching the active search term. Search precedence
/// is absolute: it overrides any colour-map fill.
pub const HIGHLIGHT_FILL: &str = "hsl(0, 100%, 50%)";
pub const HIGHLIGHT_STROKE: &str = "hsl(0, 100%, 35%)";
pub const HIGHLIGHT_STROKE_WIDTH: f32 = 2.0;

/// Per-node styling override handed to the external renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleDirective {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(rename = "strokeWidth", skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
}

/// User-selected annotation options. All inputs are immutable snapshots;
/// recompute the whole map whenever any of them changes.
#[derive(Debug, Clone, Default)]
pub struct StyleOptions {
    pub selected_field: Option<String>,
    pub color_map: ColorMap,
    pub search_term: String,
    pub label_fields: Vec<String>,
}

pub type StyleMap = HashMap<String, StyleDirective>;

/// Compile the full per-leaf style map. Every leaf with a non-empty id gets
/// its composed label; search matches get the fixed highlight style,
/// otherwise the colour map decides the fill. Leaves whose label equals
/// their raw id and that pick up no styling are omitted (sparse map).
pub fn compile_styles(leaves: &[NodeRef], index: &MetadataIndex, options: &StyleOptions) -> StyleMap {
    let mut styles = StyleMap::new();

    for leaf in leaves {
        if leaf.id.is_empty() {
            continue;
        }

        let label = build_label(&leaf.id, index, &options.label_fields);
        let mut directive = StyleDirective {
            label: Some(label.clone()),
            ..StyleDirective::default()
        };

        if !options.search_term.is_empty() && search::matches(&leaf.id, index, &options.search_term)
        {
            directive.fill = Some(HIGHLIGHT_FILL.to_string());
            directive.stroke = Some(HIGHLIGHT_STROKE.to_string());
            directive.stroke_width = Some(HIGHLIGHT_STROKE_WIDTH);
        } else if let Some(field) = &options.selected_field {
            let accession = extract_accession_version(&leaf.id);
            let value = index
                .lookup(accession)
                .and_then(|record| record.get(field));
            if let Some(color) = value.and_then(|v| options.color_map.get(v)) {
                directive.fill = Some(color.to_string());
            }
        }

        let unstyled = directive.fill.is_none() && directive.stroke.is_none();
        if unstyled && label == leaf.id {
            continue;
        }

        styles.insert(leaf.id.clone(), directive);
    }

    styles
}
