use crate::commands::inspect::read_document;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pageforge_editor::{EditRequest, Pipeline};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Stored document file (JSON value or raw encoded string)
    pub file: PathBuf,

    /// Edit request JSON file
    #[arg(short, long)]
    pub edits: PathBuf,

    /// Output file (defaults to rewriting the input file)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Start from an empty document when the file does not exist
    #[arg(long)]
    pub create: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;

    let raw = if args.file.exists() {
        Some(read_document(&args.file)?)
    } else if args.create {
        None
    } else {
        return Err(anyhow!("Document does not exist: {}", args.file.display()));
    };

    let request: EditRequest = serde_json::from_str(&fs::read_to_string(&args.edits)?)?;
    if request.is_empty() {
        println!("{}", "Nothing to do: the edit request is empty".yellow());
        return Ok(());
    }

    let pipeline = Pipeline::with_catalog(config.catalog());
    let outcome = pipeline.apply(raw.as_ref(), &request)?;

    let out_path = args.out.as_ref().unwrap_or(&args.file);
    fs::write(out_path, render_document(&outcome.document, args.pretty || config.pretty)?)?;

    let summary = &outcome.summary;
    println!("{}", "Applied".green().bold());
    println!(
        "  {} text, {} property updates ({} stale skipped)",
        summary.texts_updated, summary.properties_updated, summary.stale_skipped
    );
    println!("  {} nodes removed", summary.nodes_removed);
    println!(
        "  {} sections filled, {} pruned, {} appended",
        summary.sections_filled, summary.sections_pruned, summary.sections_appended
    );
    println!(
        "  {} → {} nodes, written to {}",
        summary.nodes_before,
        summary.nodes_after,
        out_path.display()
    );

    Ok(())
}

/// A string-typed document is written verbatim so the host can load it
/// back without an extra JSON layer; mappings are serialized normally.
fn render_document(document: &Value, pretty: bool) -> Result<String> {
    match document {
        Value::String(text) => Ok(text.clone()),
        other if pretty => Ok(serde_json::to_string_pretty(other)?),
        other => Ok(serde_json::to_string(other)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let doc_path = dir.path().join("page.json");
        let edits_path = dir.path().join("edits.json");

        fs::write(
            &doc_path,
            json!({ "root": { "id": 1, "children": [
                { "id": 2, "type": "heading",
                  "properties": { "content": { "content": { "text": "Old" } } } }
            ] } })
            .to_string(),
        )
        .unwrap();
        fs::write(
            &edits_path,
            json!({ "textUpdates": [ { "path": "0", "text": "New" } ] }).to_string(),
        )
        .unwrap();

        let args = ApplyArgs {
            file: doc_path.clone(),
            edits: edits_path,
            out: None,
            create: false,
            pretty: false,
        };
        apply(args, dir.path().to_str().unwrap()).unwrap();

        let rewritten: Value = serde_json::from_str(&fs::read_to_string(&doc_path).unwrap()).unwrap();
        assert_eq!(
            rewritten["root"]["children"][0]["properties"]["content"]["content"]["text"],
            json!("New")
        );
    }

    #[test]
    fn test_apply_create_bootstraps() {
        let dir = tempfile::tempdir().unwrap();
        let doc_path = dir.path().join("fresh.json");
        let edits_path = dir.path().join("edits.json");

        fs::write(
            &edits_path,
            json!({ "appendSections": [ { "title": "T", "body": "B" } ] }).to_string(),
        )
        .unwrap();

        let args = ApplyArgs {
            file: doc_path.clone(),
            edits: edits_path,
            out: None,
            create: true,
            pretty: false,
        };
        apply(args, dir.path().to_str().unwrap()).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&doc_path).unwrap()).unwrap();
        assert!(written.get("treeJsonString").is_some());
    }

    #[test]
    fn test_missing_document_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let edits_path = dir.path().join("edits.json");
        fs::write(&edits_path, "{}").unwrap();

        let args = ApplyArgs {
            file: dir.path().join("absent.json"),
            edits: edits_path,
            out: None,
            create: false,
            pretty: false,
        };
        assert!(apply(args, dir.path().to_str().unwrap()).is_err());
    }
}
