use crate::CollectionData;
use serde::Serialize;

/// Whether a variable edit should be allowed to proceed. Not an error
/// path: rejection is a policy outcome the caller presents to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum EditDecision {
    Allowed,
    Rejected { reason: String },
}

/// Local collections are editable. Remote collections are managed by their
/// library while it is reachable; once the library is gone (ghost), local
/// edits are the only way left to touch the values.
pub fn evaluate_edit(collection: &CollectionData) -> EditDecision {
    if !collection.remote || collection.is_ghost {
        return EditDecision::Allowed;
    }
    let library = collection.library_name.as_deref().unwrap_or("a shared library");
    EditDecision::Rejected {
        reason: format!(
            "\"{}\" is managed by {library}; edit it in the library file",
            collection.name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(remote: bool, is_ghost: bool) -> CollectionData {
        CollectionData {
            id: "C1".to_string(),
            name: "Core".to_string(),
            modes: Vec::new(),
            remote,
            is_ghost,
            library_name: remote.then(|| "Colors".to_string()),
            variables: Vec::new(),
        }
    }

    #[test]
    fn local_collections_are_editable() {
        assert_eq!(evaluate_edit(&collection(false, false)), EditDecision::Allowed);
    }

    #[test]
    fn ghost_remote_collections_are_editable() {
        assert_eq!(evaluate_edit(&collection(true, true)), EditDecision::Allowed);
    }

    #[test]
    fn live_remote_collections_are_rejected_with_reason() {
        match evaluate_edit(&collection(true, false)) {
            EditDecision::Rejected { reason } => {
                assert!(reason.contains("Colors"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
