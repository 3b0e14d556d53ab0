use crate::{ComponentLibraryData, ComponentRow};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use tokenlens_common::Result;
use tokenlens_document::DesignHost;
use tracing::debug;

/// Bucket key for components defined in the open document itself.
pub const LOCAL_LIBRARY_KEY: &str = "local";

/// Resolve instance usage to component records and bucket them by owning
/// library. Mirrors the variable grouper/enricher pair without the mode,
/// alias or ghost machinery.
pub(crate) async fn group_components(
    host: &dyn DesignHost,
    used: &HashMap<String, HashSet<String>>,
) -> Result<Vec<ComponentLibraryData>> {
    let lookups = used
        .iter()
        .map(|(id, nodes)| async move { (id, nodes, host.component(id).await) });
    let resolved = join_all(lookups).await;

    let mut buckets: HashMap<String, ComponentLibraryData> = HashMap::new();
    let mut dropped = 0usize;
    for (id, nodes, result) in resolved {
        let record = match result {
            Ok(Some(record)) => record,
            Ok(None) => {
                dropped += 1;
                continue;
            }
            Err(err) => {
                dropped += 1;
                debug!(%id, error = %err, "component lookup failed");
                continue;
            }
        };

        let (key, name) = if record.remote {
            let library = record
                .library_name
                .clone()
                .unwrap_or_else(|| record.key.clone());
            (library.clone(), library)
        } else {
            (LOCAL_LIBRARY_KEY.to_string(), "Local components".to_string())
        };

        let bucket = buckets
            .entry(key.clone())
            .or_insert_with(|| ComponentLibraryData {
                key,
                name,
                remote: record.remote,
                is_ghost: false,
                components: Vec::new(),
            });
        let mut node_ids: Vec<String> = nodes.iter().cloned().collect();
        node_ids.sort();
        bucket.components.push(ComponentRow {
            id: record.id,
            name: record.name,
            node_ids,
        });
    }
    if dropped > 0 {
        debug!(dropped, "used components did not resolve");
    }

    let mut libraries: Vec<ComponentLibraryData> = buckets.into_values().collect();
    for library in &mut libraries {
        library.components.sort_by(|a, b| a.name.cmp(&b.name));
    }
    // Local bucket first, then libraries alphabetically.
    libraries.sort_by(|a, b| {
        (a.key != LOCAL_LIBRARY_KEY, a.name.as_str()).cmp(&(b.key != LOCAL_LIBRARY_KEY, b.name.as_str()))
    });
    Ok(libraries)
}
