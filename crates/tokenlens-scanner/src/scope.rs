use crate::{ScanContext, ScanProgress};
use std::str::FromStr;
use tokenlens_common::{Result, TokenlensError};
use tokenlens_document::{DesignHost, Node};

/// The subtree(s) a scan is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    Page,
    Selection,
    Document,
}

impl ScanScope {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScanScope::Page => "Current page",
            ScanScope::Selection => "Current selection",
            ScanScope::Document => "Entire document",
        }
    }
}

impl FromStr for ScanScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "page" => Ok(ScanScope::Page),
            "selection" => Ok(ScanScope::Selection),
            "document" => Ok(ScanScope::Document),
            other => Err(format!(
                "unknown scope \"{other}\" (expected page, selection or document)"
            )),
        }
    }
}

/// Join selected root names into a short description: a single name
/// verbatim, up to three comma-joined, more than three as the first two
/// plus a count.
pub fn format_selection_names(names: &[String]) -> String {
    match names.len() {
        0..=3 => names.join(", "),
        n => format!("{}, {} + {} more", names[0], names[1], n - 2),
    }
}

/// Visit every root of `scope` in order, invoking `visit` per root. For
/// document scans this reports progress after each page, yields to the
/// runtime between pages so queued host work can run, and honors the
/// context's cancel flag at each yield point. Returns the scope description
/// (`None` for page scope).
pub async fn visit_scope_roots<F>(
    host: &dyn DesignHost,
    scope: ScanScope,
    ctx: &ScanContext,
    mut visit: F,
) -> Result<Option<String>>
where
    F: FnMut(&Node),
{
    match scope {
        ScanScope::Page => {
            let page = host.current_page().await?;
            visit(&page);
            Ok(None)
        }
        ScanScope::Selection => {
            let roots = host.selection().await?;
            for root in &roots {
                visit(root);
            }
            let names: Vec<String> = roots.iter().map(|r| r.name().to_string()).collect();
            Ok(Some(format_selection_names(&names)))
        }
        ScanScope::Document => {
            let pages = host.pages().await?;
            let total = pages.len();
            for (index, page) in pages.iter().enumerate() {
                visit(page);
                ctx.report(&ScanProgress {
                    current: index + 1,
                    total,
                    scope_name: page.name().to_string(),
                });
                if index + 1 < total {
                    tokio::task::yield_now().await;
                    if ctx.cancel.is_cancelled() {
                        return Err(TokenlensError::Cancelled);
                    }
                }
            }
            Ok(Some(format!("{total} pages")))
        }
    }
}
