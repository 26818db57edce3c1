//! relbind CLI tool
//!
//! Inspect reference-augmented schemas and resolve fieldsets from scenario files.
//!
//! ## Commands
//!
//! - `fields <scenario>`: List the discovered field names and their reference metadata
//! - `resolve <scenario>`: Resolve the scenario's object into render descriptors (pretty JSON)
//!
//! ## Scenario Files
//!
//! A scenario is a JSON document:
//!
//! ```json
//! {
//!   "schema": { "type": "object", "properties": { "worldId": { "x-reference": { "relation": "world", "kind": "single", "target": "World" } } } },
//!   "data": { "worldId": "w1" },
//!   "externalId": "c-17",
//!   "dependencies": { "world": [{ "id": "w1", "name": "Fantasy World" }] },
//!   "schemas": { "World": { "type": "object", "properties": { "name": { "type": "string" } } } }
//! }
//! ```
//!
//! The scenario's schema is registered in the global schema registry under the file stem, next
//! to any `schemas` it carries for reference targets.

use clap::{Parser, Subcommand};
use relbind_core::{
    binding::{ObjectDataContext, ObjectDataEntry, ObjectDataProps},
    config::{BindingConfig, BindingConfigProvider, TomlConfigProvider},
    dependencies::DependencyCollections,
    fieldset::{FieldsetResolver, ResolveOptions},
    properties::ObjectKey,
    schema::{FieldNameChain, ObjectSchema, SCHEMAS},
    BindingError,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Parser)]
#[command(name = "relbind")]
#[command(author, version, about = "Inspect relational form schemas and resolve fieldsets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the fields a scenario's schema would render
    Fields {
        /// Path to the scenario JSON file
        scenario: PathBuf,
    },

    /// Resolve a scenario into field render descriptors
    Resolve {
        /// Path to the scenario JSON file
        scenario: PathBuf,

        /// Binding configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only render these fields, in this order
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Never render these fields
        #[arg(long, value_delimiter = ',')]
        omit: Vec<String>,

        /// Object type used to address the fieldset (inferred from the schema if omitted)
        #[arg(long)]
        object_type: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    schema: Value,
    #[serde(default)]
    data: Map<String, Value>,
    #[serde(default)]
    external_id: Option<String>,
    #[serde(default)]
    dependencies: Option<Value>,
    #[serde(default)]
    schemas: BTreeMap<String, Value>,
}

impl Scenario {
    fn load(path: &Path) -> Result<Scenario, BindingError> {
        let content = read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Register the scenario's schemas and return its own.
    fn schema(&self, path: &Path) -> Result<Arc<ObjectSchema>, BindingError> {
        for (name, document) in &self.schemas {
            SCHEMAS.register_json(name, document)?;
        }
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "scenario".to_string());
        SCHEMAS.register_json(&name, &self.schema)?;
        SCHEMAS.require(&name)
    }

    fn dependencies(&self) -> Result<DependencyCollections, BindingError> {
        match &self.dependencies {
            Some(value) => DependencyCollections::from_json(value),
            None => Ok(DependencyCollections::new()),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fields { scenario } => {
            let loaded = Scenario::load(&scenario)?;
            let schema = loaded.schema(&scenario)?;
            let names = FieldNameChain::default().field_names(&schema, &loaded.data);
            if names.is_empty() {
                println!("No fields found");
            }
            for name in names {
                match schema.reference(&name) {
                    Some(reference) => {
                        let target = match reference.target_schema(&SCHEMAS) {
                            Ok(target) => target.field_names().join(", "),
                            Err(_) => "unregistered".to_string(),
                        };
                        println!(
                            "{name}\t{} reference -> {} ({}: {target})",
                            reference.kind, reference.relation_name, reference.target_shape
                        );
                    }
                    None => println!("{name}"),
                }
            }
        }

        Commands::Resolve {
            scenario,
            config,
            fields,
            omit,
            object_type,
        } => {
            let config = match config {
                Some(path) => TomlConfigProvider::new(path).get_config()?,
                None => BindingConfig::default(),
            };
            let loaded = Scenario::load(&scenario)?;
            let schema = loaded.schema(&scenario)?;
            let dependencies = loaded.dependencies()?;

            let key = ObjectKey::new(config.default_object_key.clone());
            let context = ObjectDataContext::new(ObjectDataProps::new().with_additional(
                key.clone(),
                ObjectDataEntry::new(loaded.data.clone(), loaded.external_id.clone()),
            ));

            let mut options = ResolveOptions::new().omit(omit);
            options.fields = fields;

            let resolver = FieldsetResolver::new(config);
            let rendered = resolver.mount(
                &schema,
                &context,
                &key,
                &dependencies,
                &options,
                object_type.as_deref(),
            )?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
    }

    Ok(())
}
