use futures::future::join_all;
use tokenlens_common::Result;
use tokenlens_document::{DesignHost, VariableCollection};
use tracing::debug;

/// Resolves collection ids to their records. A collection id with no
/// resolvable record is omitted, mirroring the grouper's drop policy.
pub struct CollectionResolver;

impl CollectionResolver {
    pub async fn fetch<'a, I>(host: &dyn DesignHost, ids: I) -> Result<Vec<VariableCollection>>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let lookups = ids
            .into_iter()
            .map(|id| async move { (id, host.collection(id).await) });

        let mut collections = Vec::new();
        let mut dropped = 0usize;
        for (id, result) in join_all(lookups).await {
            match result {
                Ok(Some(collection)) => collections.push(collection),
                Ok(None) => dropped += 1,
                Err(err) => {
                    dropped += 1;
                    debug!(%id, error = %err, "collection lookup failed");
                }
            }
        }
        if dropped > 0 {
            debug!(dropped, "collections did not resolve");
        }

        // Upstream iteration order comes from a map; pin a stable order here.
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }
}
