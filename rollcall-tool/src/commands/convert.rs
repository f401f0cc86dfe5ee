use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;

use rollcall_core::RosterDocument;
use rollcall_core::import::csv_document;

use super::{read_text, write_text};

pub fn run(input: &Path, output: &Path, title: &str, indent: usize) -> Result<()> {
    let text = read_text(input)?;
    let document = csv_document(&text, title)
        .with_context(|| format!("failed to import {}", input.display()))?;
    let count = document.entries.as_ref().map_or(0, Vec::len);
    if count == 0 {
        bail!("no valid entries found in {}", input.display());
    }
    write_text(output, &to_json(&document, indent)?)?;
    println!(
        "✅ Converted {} entries into {}",
        count.to_string().green(),
        output.display()
    );
    Ok(())
}

pub(crate) fn to_json(document: &RosterDocument, indent: usize) -> Result<String> {
    if indent == 0 {
        return Ok(serde_json::to_string(document)?);
    }
    let pad = " ".repeat(indent);
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(pad.as_bytes()));
    document.serialize(&mut serializer)?;
    Ok(String::from_utf8(buffer)?)
}
