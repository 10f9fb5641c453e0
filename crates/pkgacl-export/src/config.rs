//! Configuration for the export pipeline.

use crate::target::Consumer;

/// Where the owner lands in a notification list relative to the grant
/// holders. The legacy outputs are ambiguous on this point, so it is an
/// explicit knob rather than an inferred rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerPlacement {
    /// Owner first, then watchers in first-seen order.
    First,
    /// Watchers first, owner appended if not already present.
    Last,
}

/// Knobs for the renderers and aggregators.
///
/// The default `product_name` reproduces the legacy bug-tracker text
/// header byte for byte. The same knob feeds the JSON `title` fields, so
/// changing it moves the header and the titles together.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Product name used in the JSON `title` fields.
    pub product_name: String,
    /// Repository namespace in VCS ACL paths, e.g. `rpms`.
    pub vcs_namespace: String,
    /// Privileged group listed first on every VCS avail line.
    pub privileged_group: String,
    /// Owner position in notification lists.
    pub owner_placement: OwnerPlacement,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            product_name: "Package Database".to_string(),
            vcs_namespace: "rpms".to_string(),
            privileged_group: "provenpackager".to_string(),
            owner_placement: OwnerPlacement::First,
        }
    }
}

impl ExportConfig {
    /// The consumer-specific JSON document title.
    pub fn title(&self, consumer: Consumer) -> String {
        let suffix = match consumer {
            Consumer::Bugtracker => "Bugzilla ACLs",
            Consumer::Notify => "Notification List",
            Consumer::Vcs => "VCS ACLs",
        };
        format!("{} -- {}", self.product_name, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_titles() {
        let config = ExportConfig::default();
        assert_eq!(
            config.title(Consumer::Bugtracker),
            "Package Database -- Bugzilla ACLs"
        );
        assert_eq!(
            config.title(Consumer::Notify),
            "Package Database -- Notification List"
        );
        assert_eq!(config.title(Consumer::Vcs), "Package Database -- VCS ACLs");
    }
}
