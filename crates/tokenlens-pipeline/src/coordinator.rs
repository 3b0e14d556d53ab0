use crate::components::group_components;
use crate::{
    CollectionEnricher, CollectionResolver, ComponentOutput, IgnoreFilter, ScanOutput, UsageGrouper,
};
use std::sync::Arc;
use tokenlens_common::Result;
use tokenlens_document::{DesignHost, KeyValueStore};
use tokenlens_scanner::{ComponentScanner, ScanConfig, ScanContext, ScanScope, UsageScanner};
use tokenlens_store::IgnoreStore;
use tracing::info;

/// Entry point for a scan: sequences traversal, grouping, resolution,
/// enrichment and ignore filtering strictly in that order. Any stage error
/// aborts the whole invocation; partial results are never returned.
pub struct ScanCoordinator {
    host: Arc<dyn DesignHost>,
    ignores: IgnoreStore,
    filter: IgnoreFilter,
    config: ScanConfig,
}

impl ScanCoordinator {
    pub fn new(host: Arc<dyn DesignHost>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            host,
            ignores: IgnoreStore::new(store),
            filter: IgnoreFilter::new(),
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// The suppression-list store, shared with ignore/unignore actions so a
    /// follow-up scan sees their effect.
    pub fn ignore_store(&self) -> &IgnoreStore {
        &self.ignores
    }

    pub async fn variable_collections(
        &self,
        scope: ScanScope,
        ctx: &ScanContext,
    ) -> Result<ScanOutput> {
        info!(scope = scope.display_name(), "scanning variable usage");

        let scan = UsageScanner::new()
            .with_config(self.config.clone())
            .scan(self.host.as_ref(), scope, ctx)
            .await?;
        let grouped = UsageGrouper::group(self.host.as_ref(), &scan.used_variables).await?;
        let collections = CollectionResolver::fetch(self.host.as_ref(), grouped.keys()).await?;
        let collections = CollectionEnricher::new(self.config.clone())
            .enrich(self.host.as_ref(), collections, grouped)
            .await?;

        let document_id = self.host.document_id().await?;
        let lists = self.ignores.lists(&document_id).await?;
        let unbound_elements = self.filter.apply(&lists, scan.unbound_elements);

        info!(
            collections = collections.len(),
            unbound = unbound_elements.len(),
            "scan complete"
        );
        Ok(ScanOutput {
            collections,
            unbound_elements,
            selection_info: scan.selection_info,
            scope_name: scope.display_name().to_string(),
        })
    }

    pub async fn component_usage(
        &self,
        scope: ScanScope,
        ctx: &ScanContext,
    ) -> Result<ComponentOutput> {
        info!(scope = scope.display_name(), "scanning component usage");

        let scan = ComponentScanner::new()
            .scan(self.host.as_ref(), scope, ctx)
            .await?;
        let libraries = group_components(self.host.as_ref(), &scan.used_components).await?;

        Ok(ComponentOutput {
            libraries,
            selection_info: scan.selection_info,
            scope_name: scope.display_name().to_string(),
        })
    }
}
