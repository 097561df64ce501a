// ── Edit sessions ──
//
// Client-local drafts held while the operator edits one sink or one tag.
// Nothing reaches the gateway until the draft is committed.

use crate::ledger::TagEdit;
use crate::model::{MacAddress, SinkConfig, SinkId};

/// The single open draft, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum EditSession {
    Sink(SinkDraft),
    Tag(TagDraft),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinkDraft {
    pub id: SinkId,
    pub config: SinkConfig,
}

/// Name and membership of one tag, with the values the edit started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub mac: MacAddress,
    pub name: String,
    pub enabled: bool,
    original_name: String,
    original_enabled: bool,
}

impl TagDraft {
    pub(crate) fn new(mac: MacAddress, name: String, enabled: bool) -> Self {
        Self {
            mac,
            original_name: name.clone(),
            original_enabled: enabled,
            name,
            enabled,
        }
    }

    /// Only the fields that differ from where the edit started.
    pub fn changes(&self) -> TagEdit {
        TagEdit {
            name: (self.name.trim() != self.original_name).then(|| self.name.trim().to_owned()),
            enabled: (self.enabled != self.original_enabled).then_some(self.enabled),
        }
    }
}

/// What a commit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Saved,
    /// The draft matched the stored values; nothing was sent.
    Unchanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TagDraft {
        TagDraft::new(MacAddress::new("AA:BB:CC:DD:EE:FF"), "Sauna".into(), true)
    }

    #[test]
    fn untouched_draft_has_no_changes() {
        assert!(draft().changes().is_empty());
    }

    #[test]
    fn only_changed_fields_are_sent() {
        let mut d = draft();
        d.enabled = false;
        assert_eq!(
            d.changes(),
            TagEdit {
                name: None,
                enabled: Some(false)
            }
        );

        let mut d = draft();
        d.name = "  Porch ".into();
        assert_eq!(d.changes().name.as_deref(), Some("Porch"));
        assert_eq!(d.changes().enabled, None);
    }

    #[test]
    fn whitespace_only_rename_is_no_change() {
        let mut d = draft();
        d.name = "Sauna  ".into();
        assert!(d.changes().is_empty());
    }
}
