//! fields-showon - run showon processing against JSON fixtures
//!
//! Acts as a minimal host: it reads a form and an item from disk, raises the
//! same events a CMS would, and prints what came out.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fields_showon::events::{
    BeforePrepareFieldEvent, DisplayField, PrepareDomEvent, PrepareFormEvent, PrepareOutcome,
    SubformFieldElement,
};
use fields_showon::form::Form;
use fields_showon::showon::ShowOnExpression;
use fields_showon::snapshot::{FieldValue, ItemRef, StaticSnapshot};
use fields_showon::subform::{NameMap, ShowOnRewriter};
use fields_showon::{PluginConfig, PreparationContext, ShowOnPlugin};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fields-showon")]
#[command(about = "Conditional visibility for custom form fields")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare a form for an item and print the resulting form
    Prepare {
        /// Form document (JSON)
        form: PathBuf,
        /// Item document with field values (JSON)
        item: PathBuf,
    },
    /// Validate a showon expression
    Check { expression: String },
    /// Rewrite a subform showon expression
    Rewrite {
        expression: String,
        /// Synthetic to declared name, e.g. `field42=country`
        #[arg(long = "map", value_parser = parse_mapping)]
        mappings: Vec<(String, String)>,
    },
}

/// A form plus the subform elements the host created while building it
#[derive(Debug, Deserialize)]
struct HostForm {
    #[serde(flatten)]
    form: Form,
    #[serde(default)]
    subform_fields: Vec<SubformFieldElement>,
    #[serde(default)]
    display_fields: Vec<DisplayField>,
}

#[derive(Debug, Deserialize)]
struct HostItem {
    #[serde(flatten)]
    item: ItemRef,
    #[serde(default)]
    fields: Vec<FieldValue>,
}

#[derive(Debug, Serialize)]
struct PrepareOutput<'a> {
    form: &'a Form,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<fields_showon::ReconcileReport>,
    display_fields: Vec<DisplayField>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fields_showon=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PluginConfig::load_from(path)?,
        None => PluginConfig::load()?,
    };

    match cli.command {
        Commands::Prepare { form, item } => prepare(config, &form, &item),
        Commands::Check { expression } => check(&expression),
        Commands::Rewrite {
            expression,
            mappings,
        } => {
            let names: NameMap = mappings.into_iter().collect();
            let rewriter =
                ShowOnRewriter::new(&names).rejoin_delimiters(config.rejoin_delimiters);
            println!("{}", rewriter.rewrite(&expression));
            Ok(())
        }
    }
}

fn prepare(config: PluginConfig, form_path: &Path, item_path: &Path) -> Result<()> {
    let host: HostForm = read_json(form_path)?;
    let item: HostItem = read_json(item_path)?;

    let plugin = ShowOnPlugin::new(config, StaticSnapshot { fields: item.fields });
    let mut ctx = PreparationContext::new();

    // Subform fields are created before the form that embeds them is prepared
    for element in &host.subform_fields {
        plugin.on_prepare_dom(&mut ctx, PrepareDomEvent { field: element });
    }

    let mut form = host.form;
    let outcome = plugin.on_content_prepare_form(
        &mut ctx,
        PrepareFormEvent {
            form: &mut form,
            item: &item.item,
        },
    )?;

    let context = form.name.clone();
    let mut display_fields = host.display_fields;
    for field in display_fields.iter_mut() {
        plugin.on_before_prepare_field(
            &mut ctx,
            BeforePrepareFieldEvent {
                context: &context,
                item: &item.item,
                field,
            },
        )?;
    }

    let report = match outcome {
        PrepareOutcome::Reconciled(report) => Some(report),
        PrepareOutcome::Skipped | PrepareOutcome::DefinitionExtended => None,
    };
    let output = PrepareOutput {
        form: &form,
        report,
        display_fields,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn check(expression: &str) -> Result<()> {
    match ShowOnExpression::parse(expression)? {
        Some(expr) => {
            println!("any: {}", describe(expr.any()));
            if expr.has_and_group() {
                println!("all: {}", describe(expr.all()));
            }
        }
        None => println!("empty expression, field always shows"),
    }
    Ok(())
}

fn describe(conditions: &[fields_showon::showon::Condition]) -> String {
    conditions
        .iter()
        .map(|c| format!("{} = {:?}", c.field.as_str(), c.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn parse_mapping(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(rewritten, declared)| (rewritten.to_string(), declared.to_string()))
        .ok_or_else(|| format!("expected rewritten=declared, got {raw:?}"))
}
