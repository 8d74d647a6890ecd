use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pageforge_editor::Pipeline;
use pageforge_views::{LayoutMode, OutlineStyle, ReadOptions, TextMapScope, TextMapStyle};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Stored document file (JSON value or raw encoded string)
    pub file: PathBuf,

    /// Layout detail (outline, full)
    #[arg(long, default_value = "outline")]
    pub layout: String,

    /// Outline rendering (summary, tree)
    #[arg(long, default_value = "summary")]
    pub outline: String,

    /// Include the text map
    #[arg(long)]
    pub text_map: bool,

    /// Text map verbosity (full, compact, keys, none)
    #[arg(long, default_value = "compact")]
    pub text_map_style: String,

    /// Text map scope (content, all)
    #[arg(long, default_value = "content")]
    pub text_map_scope: String,

    /// Truncate text map entries to this many characters (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_chars: usize,

    /// Include media property branches in the text map
    #[arg(long)]
    pub include_media: bool,

    /// Emit the whole view as JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let raw = read_document(&args.file)?;
    let options = read_options(&args)?;

    let pipeline = Pipeline::with_catalog(config.catalog());
    let view = pipeline
        .inspect(&raw, &options)
        .ok_or_else(|| anyhow!("No decodable document in {}", args.file.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", "Outline".bright_blue().bold());
    if view.outline.is_empty() {
        println!("  {}", "(no text-bearing nodes)".yellow());
    }
    print!("{}", view.rendered_outline);

    if let Some(text_map) = &view.text_map {
        println!();
        println!("{}", "Text map".bright_blue().bold());
        for entry in text_map {
            match &entry.text {
                Some(text) => println!("  {}  {:?}  {}", entry.field_key, entry.kind, text),
                None => println!("  {}", entry.field_key),
            }
        }
    }

    Ok(())
}

fn read_options(args: &InspectArgs) -> Result<ReadOptions> {
    let layout_mode = match args.layout.as_str() {
        "outline" => LayoutMode::Outline,
        "full" => LayoutMode::Full,
        other => return Err(anyhow!("Invalid layout: {}. Use: outline or full", other)),
    };
    let outline_style = match args.outline.as_str() {
        "summary" => OutlineStyle::Summary,
        "tree" => OutlineStyle::Tree,
        other => return Err(anyhow!("Invalid outline: {}. Use: summary or tree", other)),
    };
    let text_map_style = match args.text_map_style.as_str() {
        "full" => TextMapStyle::Full,
        "compact" => TextMapStyle::Compact,
        "keys" => TextMapStyle::Keys,
        "none" => TextMapStyle::None,
        other => {
            return Err(anyhow!(
                "Invalid text map style: {}. Use: full, compact, keys or none",
                other
            ))
        }
    };
    let text_map_scope = match args.text_map_scope.as_str() {
        "content" => TextMapScope::Content,
        "all" => TextMapScope::All,
        other => return Err(anyhow!("Invalid scope: {}. Use: content or all", other)),
    };

    Ok(ReadOptions {
        layout_mode,
        outline_style,
        text_map: args.text_map,
        text_map_style,
        text_map_max_chars: args.max_chars,
        text_map_scope,
        text_map_include_media: args.include_media,
    })
}

/// Read a stored document: a JSON file, or a file holding one raw encoded
/// string (legacy exports).
pub fn read_document(file: &PathBuf) -> Result<Value> {
    let content = fs::read_to_string(file)?;
    match serde_json::from_str::<Value>(&content) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(content)),
    }
}
