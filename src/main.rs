use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenlens_common::TokenlensError;
use tokenlens_document::{
    DesignHost, DocumentSnapshot, KeyValueStore, SnapshotHost, VariableValue,
};
use tokenlens_pipeline::{
    evaluate_edit, CellValue, ComponentOutput, EditDecision, ScanCoordinator, ScanOutput,
};
use tokenlens_scanner::{
    GhostPolicy, ProgressSink, ScanConfig, ScanContext, ScanProgress, ScanScope,
};
use tokenlens_store::{IgnoreStore, IgnoreValueKind, IgnoredValue};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tokenlens",
    about = "Audit design-token and component usage in a document snapshot",
    version
)]
struct Cli {
    /// Path to the document snapshot JSON
    #[arg(short, long, global = true, default_value = "document.json")]
    document: PathBuf,

    /// Sidecar JSON file for persisted ignore lists (defaults to
    /// `<document>.store.json`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan for variable usage grouped by collection
    Scan {
        /// page, selection or document
        #[arg(short, long, default_value = "page")]
        scope: ScanScope,
        /// Emit raw JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Treat a failed library-availability check as ghost
        #[arg(long)]
        ghost_fail_closed: bool,
    },
    /// Scan for component-instance usage grouped by library
    Components {
        #[arg(short, long, default_value = "page")]
        scope: ScanScope,
        #[arg(long)]
        json: bool,
    },
    /// Manage the unbound-element suppression lists
    Ignores {
        #[command(subcommand)]
        action: IgnoreAction,
    },
}

#[derive(Subcommand)]
enum IgnoreAction {
    /// Show both lists with current node metadata
    List,
    /// Suppress one element by node id
    AddElement { node_id: String },
    RemoveElement { node_id: String },
    /// Suppress every element matching a value, e.g. `add-value fill "#FF0000"`
    AddValue {
        value_type: IgnoreValueKind,
        value: Option<String>,
    },
    RemoveValue {
        value_type: IgnoreValueKind,
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let snapshot = load_snapshot(&cli.document)?;
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| cli.document.with_extension("store.json"));
    let host = Arc::new(SnapshotHost::new(snapshot));
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(store_path)?);

    match cli.command {
        Command::Scan {
            scope,
            json,
            ghost_fail_closed,
        } => {
            let config = ScanConfig {
                ghost_policy: if ghost_fail_closed {
                    GhostPolicy::FailClosed
                } else {
                    GhostPolicy::FailOpen
                },
                ..Default::default()
            };
            let coordinator = ScanCoordinator::new(host, store).with_config(config);
            let output = coordinator
                .variable_collections(scope, &scan_context(scope))
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_scan(&output);
            }
        }
        Command::Components { scope, json } => {
            let coordinator = ScanCoordinator::new(host, store);
            let output = coordinator
                .component_usage(scope, &scan_context(scope))
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_components(&output);
            }
        }
        Command::Ignores { action } => {
            let document_id = host.document_id().await?;
            let ignores = IgnoreStore::new(store);
            run_ignore_action(&ignores, host.as_ref(), &document_id, action).await?;
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<DocumentSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading document snapshot {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing document snapshot {}", path.display()))
}

/// Document scans stream per-page progress to stderr; the other scopes
/// finish in one step.
fn scan_context(scope: ScanScope) -> ScanContext {
    match scope {
        ScanScope::Document => ScanContext::with_progress(Arc::new(StderrProgress)),
        _ => ScanContext::default(),
    }
}

struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn notify(&self, progress: &ScanProgress) {
        eprintln!(
            "{}",
            format!(
                "  scanned page {}/{}: {}",
                progress.current, progress.total, progress.scope_name
            )
            .dimmed()
        );
    }
}

async fn run_ignore_action(
    ignores: &IgnoreStore,
    host: &dyn DesignHost,
    document_id: &str,
    action: IgnoreAction,
) -> Result<()> {
    match action {
        IgnoreAction::List => {
            let snapshot = ignores.snapshot(document_id, host).await?;
            if snapshot.elements.is_empty() && snapshot.values.is_empty() {
                println!("no suppressions");
                return Ok(());
            }
            if !snapshot.elements.is_empty() {
                println!("{}", "Ignored elements".bold());
                for element in &snapshot.elements {
                    let place = if element.page.is_empty() {
                        String::new()
                    } else {
                        format!(" on {}", element.page)
                    };
                    println!(
                        "  {}  {}{}  {}",
                        element.id,
                        element.name,
                        place,
                        element.details.as_deref().unwrap_or("").dimmed()
                    );
                }
            }
            if !snapshot.values.is_empty() {
                println!("{}", "Ignored values".bold());
                for entry in &snapshot.values {
                    println!("  {:?}  {}", entry.value_type, entry.value);
                }
            }
        }
        IgnoreAction::AddElement { node_id } => {
            ignores.ignore_element(document_id, &node_id).await?;
            println!("ignoring element {node_id}");
        }
        IgnoreAction::RemoveElement { node_id } => {
            ignores.unignore_element(document_id, &node_id).await?;
            println!("no longer ignoring element {node_id}");
        }
        IgnoreAction::AddValue { value_type, value } => {
            ignores
                .ignore_value(
                    document_id,
                    IgnoredValue {
                        value_type,
                        value: value.unwrap_or_default(),
                    },
                )
                .await?;
            println!("ignoring matching values");
        }
        IgnoreAction::RemoveValue { value_type, value } => {
            ignores
                .unignore_value(
                    document_id,
                    &IgnoredValue {
                        value_type,
                        value: value.unwrap_or_default(),
                    },
                )
                .await?;
            println!("no longer ignoring matching values");
        }
    }
    Ok(())
}

fn print_scan(output: &ScanOutput) {
    println!("{} {}", "Scope:".bold(), output.scope_name);
    if let Some(info) = &output.selection_info {
        println!("{} {}", "Roots:".bold(), info);
    }

    if output.collections.is_empty() {
        println!("\nno variables in scope");
    }
    for collection in &output.collections {
        let marker = if collection.is_ghost {
            " [ghost library]".yellow().to_string()
        } else if collection.remote {
            format!(
                " [{}]",
                collection.library_name.as_deref().unwrap_or("remote")
            )
        } else {
            String::new()
        };
        println!("\n{}{}", collection.name.bold(), marker);

        let modes: Vec<&str> = collection.modes.iter().map(|m| m.name.as_str()).collect();
        if !modes.is_empty() {
            println!("  {}", modes.join(" | ").dimmed());
        }
        for row in &collection.variables {
            let cells: Vec<String> = row.values.iter().map(|c| render_cell(&c.value)).collect();
            println!(
                "  {}  {}  {}",
                row.name,
                cells.join(" | "),
                format!("({} nodes)", row.node_ids.len()).dimmed()
            );
        }
        if let EditDecision::Rejected { reason } = evaluate_edit(collection) {
            println!("  {}", format!("read-only: {reason}").dimmed());
        }
    }

    if !output.unbound_elements.is_empty() {
        println!("\n{}", "Unbound elements".bold());
        for element in &output.unbound_elements {
            println!(
                "  {}  {}  {}  {}",
                element.id,
                element.name,
                element.kind.label().red(),
                element.details.as_deref().unwrap_or("").dimmed()
            );
        }
    }
}

fn print_components(output: &ComponentOutput) {
    println!("{} {}", "Scope:".bold(), output.scope_name);
    if let Some(info) = &output.selection_info {
        println!("{} {}", "Roots:".bold(), info);
    }

    if output.libraries.is_empty() {
        println!("\nno component instances in scope");
    }
    for library in &output.libraries {
        println!("\n{}", library.name.bold());
        for component in &library.components {
            println!(
                "  {}  {}",
                component.name,
                format!("({} instances)", component.node_ids.len()).dimmed()
            );
        }
    }
}

fn render_cell(value: &CellValue) -> String {
    match value {
        CellValue::Literal { value } => render_literal(value),
        CellValue::Alias { label } => label.clone(),
        CellValue::Unset => "-".to_string(),
    }
}

fn render_literal(value: &VariableValue) -> String {
    match value {
        VariableValue::Color(color) => color.to_hex(),
        VariableValue::Float { value } => value.to_string(),
        VariableValue::Text { value } => value.clone(),
        VariableValue::Flag { value } => value.to_string(),
        VariableValue::Alias { id } => format!("→ {id}"),
    }
}

/// JSON-file-backed stand-in for the host's key-value storage, so ignore
/// lists survive between CLI runs.
struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, Value>>,
}

impl FileStore {
    fn open(path: PathBuf) -> Result<Self> {
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("parsing store file {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading store file {}", path.display()))
            }
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> tokenlens_common::Result<Option<Value>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| TokenlensError::Storage("file store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> tokenlens_common::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| TokenlensError::Storage("file store poisoned".to_string()))?;
        entries.insert(key.to_string(), value);
        let raw = serde_json::to_string_pretty(&*entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}
