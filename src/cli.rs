//! Minimal CLI: pick schema documents, read CUE, write JSON Schema.
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use serde_json::Value;

use crate::assemble;
use crate::error::SchemaError;

/// generate JSON Schema (draft-07) documents from the cluster CUE schemas,
/// for editor autocomplete/validation via yaml-language-server
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// generate the cluster schema only
    #[arg(long)]
    cluster: bool,

    /// generate the nodes schema only
    #[arg(long)]
    nodes: bool,

    /// directory containing the .cue inputs; .json outputs land next to them
    #[arg(long, short, default_value = ".")]
    dir: PathBuf,
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> i32 {
        // no selector flag means "generate every document we know about"
        let generate_all = !self.cluster && !self.nodes;
        let mut success = true;

        if self.cluster || generate_all {
            success &= self.generate(
                "cluster.schema.cue",
                "cluster.schema.json",
                assemble::cluster_schema,
            );
        }
        if self.nodes || generate_all {
            success &= self.generate(
                "nodes.schema.cue",
                "nodes.schema.json",
                assemble::nodes_schema,
            );
        }

        if success { 0 } else { 1 }
    }

    /// One document at a time; a failure here must not stop the sibling
    /// document from being attempted.
    fn generate(
        &self,
        input_name: &str,
        output_name: &str,
        build: fn(&str) -> Result<Value, SchemaError>,
    ) -> bool {
        match self.generate_inner(input_name, output_name, build) {
            Ok(output_path) => {
                println!("{} {}", "generated".green().bold(), output_path.display());
                true
            }
            Err(error) => {
                eprintln!("{} {output_name}: {error:#}", "error".red().bold());
                false
            }
        }
    }

    fn generate_inner(
        &self,
        input_name: &str,
        output_name: &str,
        build: fn(&str) -> Result<Value, SchemaError>,
    ) -> anyhow::Result<PathBuf> {
        let input_path = self.dir.join(input_name);
        if !input_path.exists() {
            return Err(SchemaError::InputNotFound(input_path).into());
        }
        let source = std::fs::read_to_string(&input_path)
            .map_err(|source| SchemaError::Read { path: input_path.clone(), source })?;

        let document = build(&source)?;

        let mut rendered =
            serde_json::to_string_pretty(&document).context("serializing schema document")?;
        rendered.push('\n');

        let output_path = self.dir.join(output_name);
        std::fs::write(&output_path, rendered)
            .with_context(|| format!("writing {}", output_path.display()))?;
        Ok(output_path)
    }
}
