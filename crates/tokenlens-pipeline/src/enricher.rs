use crate::{CellValue, CollectionData, GroupedVariable, ModeCell, VariableRow};
use std::collections::{HashMap, HashSet};
use tokenlens_common::{normalize_variable_id, Result};
use tokenlens_document::{DesignHost, VariableCollection, VariableValue};
use tokenlens_scanner::{GhostPolicy, ScanConfig};
use tracing::{debug, warn};

/// Rendered for an alias whose target no longer resolves.
pub const UNKNOWN_ALIAS: &str = "→ (unknown alias)";

/// Turns resolved collections plus grouped usage into display-ready
/// records: per-mode cells with aliases rendered one hop, remote library
/// names, and ghost detection.
pub struct CollectionEnricher {
    config: ScanConfig,
}

impl CollectionEnricher {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub async fn enrich(
        &self,
        host: &dyn DesignHost,
        collections: Vec<VariableCollection>,
        mut grouped: HashMap<String, Vec<GroupedVariable>>,
    ) -> Result<Vec<CollectionData>> {
        let library_keys = self.library_keys(host, &collections).await;

        let mut out = Vec::with_capacity(collections.len());
        for collection in collections {
            let Some(mut members) = grouped.remove(&collection.id) else {
                continue;
            };
            members.sort_by(|a, b| a.variable.name.cmp(&b.variable.name));

            let mut rows = Vec::with_capacity(members.len());
            for member in members {
                let mut values = Vec::with_capacity(collection.modes.len());
                for mode in &collection.modes {
                    let cell = match member.variable.values_by_mode.get(&mode.mode_id) {
                        Some(VariableValue::Alias { id }) => CellValue::Alias {
                            label: self.alias_label(host, id).await,
                        },
                        Some(value) => CellValue::Literal {
                            value: value.clone(),
                        },
                        None => CellValue::Unset,
                    };
                    values.push(ModeCell {
                        mode_id: mode.mode_id.clone(),
                        value: cell,
                    });
                }
                rows.push(VariableRow {
                    id: member.variable.id,
                    name: member.variable.name,
                    resolved_type: member.variable.resolved_type,
                    values,
                    node_ids: member.node_ids,
                });
            }

            // A member can drop mid-enrichment; never emit an empty collection.
            if rows.is_empty() {
                continue;
            }

            let (library_name, is_ghost) = if collection.remote {
                let name = collection
                    .key
                    .split('/')
                    .last()
                    .unwrap_or(collection.key.as_str())
                    .to_string();
                let ghost = match &library_keys {
                    Some(keys) => !keys.contains(&collection.key),
                    None => self.config.ghost_policy == GhostPolicy::FailClosed,
                };
                (Some(name), ghost)
            } else {
                (None, false)
            };

            out.push(CollectionData {
                id: collection.id,
                name: collection.name,
                modes: collection.modes,
                remote: collection.remote,
                is_ghost,
                library_name,
                variables: rows,
            });
        }
        Ok(out)
    }

    /// One availability lookup serves every remote collection of the scan.
    /// `None` means the check itself failed and the configured ghost policy
    /// applies.
    async fn library_keys(
        &self,
        host: &dyn DesignHost,
        collections: &[VariableCollection],
    ) -> Option<HashSet<String>> {
        if !collections.iter().any(|c| c.remote) {
            return Some(HashSet::new());
        }
        match host.available_library_keys().await {
            Ok(keys) => Some(keys.into_iter().collect()),
            Err(err) => {
                warn!(error = %err, "remote library enumeration failed");
                None
            }
        }
    }

    /// Resolve an alias target one hop and render its name. Chained aliases
    /// deliberately stop at the intermediate variable's name.
    async fn alias_label(&self, host: &dyn DesignHost, raw_id: &str) -> String {
        let id = normalize_variable_id(raw_id);
        match host.variable(&id).await {
            Ok(Some(target)) => format!("→ {}", target.name),
            Ok(None) => UNKNOWN_ALIAS.to_string(),
            Err(err) => {
                debug!(%id, error = %err, "alias target lookup failed");
                UNKNOWN_ALIAS.to_string()
            }
        }
    }
}
