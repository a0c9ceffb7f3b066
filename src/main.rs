use cfgkit::{
    CodecRegistry, Config, ConfigHooks, ConfigValue, Field, Identifier, StaticCatalogue, TypeDesc,
    Value,
};
use cfgkit::identifier::IdentifierError;
use cfgkit::value::ValueMismatch;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cfgkit", about = "Self-documenting config file demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a config file (creating or rewriting it) and print it as JSON
    Read {
        path: PathBuf,
    },
    /// Print the default config file
    Print,
    /// Parse a config file without rewriting it and list unknown keys
    Check {
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let registry = demo_registry()?;
    let reader = registry.reader();

    match Cli::parse().command {
        Commands::Read { path } => {
            let config: DemoConfig = reader.read(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Print => {
            let config = DemoConfig::default();
            for line in reader.stringify(&config)? {
                println!("{line}");
            }
        }

        Commands::Check { path } => {
            let text = std::fs::read_to_string(&path)?;
            let (_, unknown) = reader.parse_str::<DemoConfig>(&text, &path)?;
            if unknown.is_empty() {
                println!("{}: ok", path.display());
            } else {
                let mut keys: Vec<_> = unknown.into_iter().collect();
                keys.sort();
                for (key, value) in keys {
                    println!("{}: unknown key {key} = {value}", path.display());
                }
            }
        }
    }

    Ok(())
}

// ── Demo catalogues ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
enum Block {
    Stone,
    Dirt,
    Glass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
enum Item {
    Apple,
    Cookie,
    Bread,
}

macro_rules! catalogue_member {
    ($ty:ty, $id:literal) => {
        impl ConfigValue for $ty {
            fn type_desc() -> TypeDesc { TypeDesc::member($id) }
            fn to_value(&self) -> Value { Value::member(*self) }
            fn from_value(value: Value) -> Result<Self, ValueMismatch> { value.into_member() }
        }
    };
}

catalogue_member!(Block, "block");
catalogue_member!(Item, "item");

fn demo_registry() -> Result<CodecRegistry, IdentifierError> {
    let id = Identifier::parse;
    let mut registry = CodecRegistry::new();
    registry
        .register_catalogue(
            StaticCatalogue::new("block")
                .with(id("stone")?, Block::Stone)
                .with(id("dirt")?, Block::Dirt)
                .with(id("glass")?, Block::Glass),
        )
        .register_catalogue(
            StaticCatalogue::new("item")
                .with(id("apple")?, Item::Apple)
                .with(id("cookie")?, Item::Cookie)
                .with(id("bread")?, Item::Bread),
        );
    Ok(registry)
}

// ── Demo config ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
struct DemoConfig {
    config_version: i32,
    field_a:        i32,
    field_b:        Block,
    int_set:        BTreeSet<i32>,
    items:          Vec<Item>,
    floats:         Vec<f32>,
    greeting:       Option<String>,
    #[serde(skip)]
    item_count:     usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            config_version: 1,
            field_a:        100,
            field_b:        Block::Stone,
            int_set:        BTreeSet::from([1, 2, 3, 4, 5]),
            items:          vec![Item::Apple, Item::Cookie],
            floats:         vec![5.0, 10.0, 0.1 + 0.2, 100000.5],
            greeting:       None,
            item_count:     0,
        }
    }
}

impl Config for DemoConfig {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("config_version", |c: &Self| &c.config_version, |c: &mut Self| &mut c.config_version)
                .comment("Used to upgrade old files. Don't touch.")
                .skip_default(),
            Field::new("field_a", |c: &Self| &c.field_a, |c: &mut Self| &mut c.field_a)
                .comment("Hello world! Field A")
                .at_least(50),
            Field::new("field_b", |c: &Self| &c.field_b, |c: &mut Self| &mut c.field_b)
                .comment("This is field B")
                .example("minecraft:dirt"),
            Field::new("int_set", |c: &Self| &c.int_set, |c: &mut Self| &mut c.int_set)
                .section("The fun stuff"),
            Field::new("items", |c: &Self| &c.items, |c: &mut Self| &mut c.items),
            Field::new("floats", |c: &Self| &c.floats, |c: &mut Self| &mut c.floats),
            Field::new("greeting", |c: &Self| &c.greeting, |c: &mut Self| &mut c.greeting)
                .note(["Leave empty for no greeting.", "Commas are allowed here."]),
        ]
    }

    fn new_default() -> Option<Self> { Some(Self::default()) }

    fn hooks(&mut self) -> Option<&mut dyn ConfigHooks> { Some(self) }
}

impl ConfigHooks for DemoConfig {
    fn upgrade(&mut self, unknown_keys: &HashMap<String, String>) {
        // Version 0 called field_b "block".
        if let Some(old) = unknown_keys.get("block") {
            match old.as_str() {
                "minecraft:dirt" | "dirt"   => self.field_b = Block::Dirt,
                "minecraft:glass" | "glass" => self.field_b = Block::Glass,
                _ => {}
            }
        }
        for (key, value) in unknown_keys {
            warn!(key = %key, value = %value, "unknown config key");
        }
        self.config_version = 1;
    }

    fn validate(&self) -> Result<(), cfgkit::ConfigError> {
        if self.items.is_empty() {
            return Err(cfgkit::ConfigError::invalid("items must list at least one item"));
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.item_count = self.items.len();
        info!(items = self.item_count, "config loaded");
    }
}
