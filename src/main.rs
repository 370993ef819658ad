use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use annotree::annotate::color::build_color_map;
use annotree::annotate::pie::{descendant_leaves, pie_segments};
use annotree::annotate::styles::{compile_styles, StyleOptions};
use annotree::io;
use annotree::metadata::MetadataIndex;
use annotree::render::{OfflineRenderer, TreeRenderer};
use annotree::scalebar;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "annotree",
    about = "Compiles metadata-driven style maps for a phylogenetic tree."
)]
struct AppConfig {
    /// Tree file to load (Newick, as returned by the tree builder).
    #[arg(value_name = "TREE_FILE")]
    tree_path: PathBuf,

    /// Metadata table (tab-separated, one row per accession).
    #[arg(value_name = "METADATA_TSV")]
    metadata_path: PathBuf,

    /// Metadata field used for leaf colouring and collapsed-node pies.
    #[arg(short = 'f', long, value_name = "FIELD")]
    color_field: Option<String>,

    /// Free-text search term for leaf highlighting.
    #[arg(short, long, default_value = "")]
    search: String,

    /// Metadata fields appended to leaf labels, in order.
    #[arg(short, long, value_name = "FIELDS", value_delimiter = ',')]
    label_fields: Vec<String>,

    /// Zoom level (base-2 exponent) for the scale bar preview.
    #[arg(long, default_value_t = 0.0)]
    zoom: f64,

    /// Print the compiled style map as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

fn main() {
    let _ = env_logger::builder().format_timestamp(None).try_init();

    let config = AppConfig::parse();
    if let Err(err) = run(&config) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(config: &AppConfig) -> Result<()> {
    let trees = io::load_trees(&config.tree_path)?;
    let tree = &trees[0];
    info!(
        "loaded tree with {} leaves ({} trees in file)",
        tree.leaf_count(),
        trees.len()
    );

    let records = io::load_metadata(&config.metadata_path)?;
    let index = MetadataIndex::build(records.clone());
    info!(
        "indexed {} of {} metadata records",
        index.len(),
        records.len()
    );

    let root = match tree.to_node_ref() {
        Some(root) => root,
        None => bail!("tree has no root node"),
    };
    let mut renderer = OfflineRenderer::new(root, 1.0, config.zoom);

    let color_map = config
        .color_field
        .as_deref()
        .map(|field| build_color_map(&records, field))
        .unwrap_or_default();

    let options = StyleOptions {
        selected_field: config.color_field.clone(),
        color_map,
        search_term: config.search.clone(),
        label_fields: config.label_fields.clone(),
    };

    let leaves = renderer
        .layout_leaves()
        .context("renderer reported no layout")?;
    let styles = compile_styles(&leaves, &index, &options);
    renderer
        .set_styles(&styles)
        .context("failed to apply style map")?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&styles)?);
        return Ok(());
    }

    println!(
        "compiled {} style directives for {} leaves",
        styles.len(),
        leaves.len()
    );

    if let Some(field) = config.color_field.as_deref() {
        let descendants: Vec<_> = leaves.iter().collect();
        let segments = pie_segments(&descendants, &index, field, &options.color_map);
        renderer
            .set_pie_charts(!segments.is_empty(), &records)
            .context("failed to toggle pie charts")?;
        if segments.is_empty() {
            println!("no {field} data among the leaves; pie suppressed");
        } else {
            println!("root pie over {field}:");
            for segment in &segments {
                println!(
                    "  {:<20} {:>4} ({:>5.1}%)  {}",
                    segment.value,
                    segment.count,
                    segment.proportion * 100.0,
                    segment.color
                );
            }
        }
    }

    let bar = scalebar::from_renderer(&renderer);
    println!(
        "scale bar at zoom {}: {} over {:.0}px",
        config.zoom,
        scalebar::format_value(bar.value),
        bar.pixel_length
    );

    Ok(())
}
