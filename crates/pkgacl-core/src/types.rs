//! Strong type definitions for the ACL registry.
//!
//! Identities and roles are tagged enums to prevent stringly-typed misuse
//! at compile time. The legacy wire forms (the `group::` sentinel prefix
//! and the historical role names) survive only at the serialization boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Sentinel prefix marking a group in the legacy string encoding.
const GROUP_PREFIX: &str = "group::";

/// A person or a group that can own packages or hold grants.
///
/// The distinction is carried as data. The legacy encoding represented
/// groups as `group::name`; [`Identity::parse`] accepts that form and
/// [`fmt::Display`] reproduces it, so round-trips through stores and
/// renderings are lossless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Identity {
    /// An individual account, identified by username.
    Person(String),
    /// A named group account.
    Group(String),
}

impl Identity {
    /// Create a person identity.
    pub fn person(name: impl Into<String>) -> Self {
        Self::Person(name.into())
    }

    /// Create a group identity.
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }

    /// Parse the legacy string encoding: `group::name` is a group,
    /// anything else a person. Never fails.
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix(GROUP_PREFIX) {
            Some(name) => Self::Group(name.to_string()),
            None => Self::Person(s.to_string()),
        }
    }

    /// The bare name, without any sentinel prefix.
    pub fn name(&self) -> &str {
        match self {
            Self::Person(name) | Self::Group(name) => name,
        }
    }

    /// Whether this identity is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl fmt::Display for Identity {
    /// Renders the legacy encoding: `name` for people, `group::name` for groups.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person(name) => write!(f, "{}", name),
            Self::Group(name) => write!(f, "{}{}", GROUP_PREFIX, name),
        }
    }
}

/// The closed set of grantable roles.
///
/// Wire names are the legacy registry strings. Anything outside this set in
/// persisted data is a [`ModelError::UnknownRole`] and is skipped by
/// graph readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AclRole {
    /// Receive bug-tracker traffic for the package.
    WatchBugs,
    /// Receive commit notifications for the package.
    WatchCommits,
    /// Commit to the package repository.
    Commit,
    /// Approve ACL requests from others.
    ApproveAcls,
}

impl AclRole {
    /// All roles, in wire order.
    pub const ALL: [AclRole; 4] = [
        AclRole::WatchBugs,
        AclRole::WatchCommits,
        AclRole::Commit,
        AclRole::ApproveAcls,
    ];

    /// The legacy wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AclRole::WatchBugs => "watchbugzilla",
            AclRole::WatchCommits => "watchcommits",
            AclRole::Commit => "commit",
            AclRole::ApproveAcls => "approveacls",
        }
    }
}

impl FromStr for AclRole {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watchbugzilla" => Ok(AclRole::WatchBugs),
            "watchcommits" => Ok(AclRole::WatchCommits),
            "commit" => Ok(AclRole::Commit),
            "approveacls" => Ok(AclRole::ApproveAcls),
            other => Err(ModelError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for AclRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval status of a role grant. Only approved grants reach exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AclStatus {
    /// Requested, not yet decided.
    Awaiting,
    /// Approved; participates in exports.
    Approved,
    /// Denied by an approver.
    Denied,
    /// Superseded or withdrawn.
    Obsolete,
}

impl AclStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AclStatus::Awaiting => "awaiting",
            AclStatus::Approved => "approved",
            AclStatus::Denied => "denied",
            AclStatus::Obsolete => "obsolete",
        }
    }
}

impl FromStr for AclStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting" => Ok(AclStatus::Awaiting),
            "approved" => Ok(AclStatus::Approved),
            "denied" => Ok(AclStatus::Denied),
            "obsolete" => Ok(AclStatus::Obsolete),
            other => Err(ModelError::UnknownStatus {
                kind: "acl",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle status of a listing (one package in one collection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingStatus {
    /// Actively maintained.
    Approved,
    /// Owner gave it up; awaiting a new owner.
    Orphaned,
    /// No longer built, kept for history.
    Retired,
    /// Removed; excluded from every export.
    Removed,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Approved => "approved",
            ListingStatus::Orphaned => "orphaned",
            ListingStatus::Retired => "retired",
            ListingStatus::Removed => "removed",
        }
    }
}

impl FromStr for ListingStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(ListingStatus::Approved),
            "orphaned" => Ok(ListingStatus::Orphaned),
            "retired" => Ok(ListingStatus::Retired),
            "removed" => Ok(ListingStatus::Removed),
            other => Err(ModelError::UnknownStatus {
                kind: "listing",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle status of a collection (distribution branch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionStatus {
    /// Released and maintained.
    Active,
    /// Not yet released.
    UnderDevelopment,
    /// End of life; no longer maintained.
    EndOfLife,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::Active => "active",
            CollectionStatus::UnderDevelopment => "under-development",
            CollectionStatus::EndOfLife => "eol",
        }
    }

    /// Whether the collection has reached end of life.
    pub fn is_eol(&self) -> bool {
        matches!(self, CollectionStatus::EndOfLife)
    }
}

impl FromStr for CollectionStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CollectionStatus::Active),
            "under-development" => Ok(CollectionStatus::UnderDevelopment),
            "eol" => Ok(CollectionStatus::EndOfLife),
            other => Err(ModelError::UnknownStatus {
                kind: "collection",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_parse_person() {
        let id = Identity::parse("toshio");
        assert_eq!(id, Identity::person("toshio"));
        assert!(!id.is_group());
        assert_eq!(id.name(), "toshio");
    }

    #[test]
    fn test_identity_parse_group() {
        let id = Identity::parse("group::perl-sig");
        assert_eq!(id, Identity::group("perl-sig"));
        assert!(id.is_group());
        assert_eq!(id.name(), "perl-sig");
    }

    #[test]
    fn test_identity_display_roundtrip() {
        for raw in ["pingou", "group::perl-sig"] {
            assert_eq!(Identity::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_role_wire_names_roundtrip() {
        for role in AclRole::ALL {
            assert_eq!(role.as_str().parse::<AclRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = "checkout".parse::<AclRole>().unwrap_err();
        assert_eq!(err, ModelError::UnknownRole("checkout".to_string()));
    }

    #[test]
    fn test_statuses_roundtrip() {
        for s in ["awaiting", "approved", "denied", "obsolete"] {
            assert_eq!(s.parse::<AclStatus>().unwrap().as_str(), s);
        }
        for s in ["approved", "orphaned", "retired", "removed"] {
            assert_eq!(s.parse::<ListingStatus>().unwrap().as_str(), s);
        }
        for s in ["active", "under-development", "eol"] {
            assert_eq!(s.parse::<CollectionStatus>().unwrap().as_str(), s);
        }
    }

    #[test]
    fn test_eol_flag() {
        assert!(CollectionStatus::EndOfLife.is_eol());
        assert!(!CollectionStatus::Active.is_eol());
    }
}
