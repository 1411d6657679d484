// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// A stable identifier for nodes and connections.
///
/// Ids are plain strings so they survive persistence unchanged. The only
/// structural rule is that an id is a non-empty path segment (no `/`), which
/// keeps them usable as store keys and in log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id_segment(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    ContainsSlash,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("id must not be empty"),
            Self::ContainsSlash => f.write_str("id must not contain '/'"),
        }
    }
}

impl std::error::Error for IdError {}

fn validate_id_segment(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.contains('/') {
        return Err(IdError::ContainsSlash);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnectionIdTag {}
pub type ConnectionId = Id<ConnectionIdTag>;

/// Hands out `<prefix>-<n>` ids from a counter that never goes backwards.
///
/// Ids are never reused, even after the object they named was deleted, so a
/// history snapshot that mentions `node-7` can only ever mean one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator<T> {
    prefix: &'static str,
    next: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> IdAllocator<T> {
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: 1,
            _marker: PhantomData,
        }
    }

    /// The counter value the next allocation will use.
    pub fn next_value(&self) -> u64 {
        self.next
    }

    pub fn allocate(&mut self) -> Id<T> {
        let mut buf = itoa::Buffer::new();
        let number = buf.format(self.next);
        self.next = self.next.saturating_add(1);

        let mut value = String::with_capacity(self.prefix.len() + 1 + number.len());
        value.push_str(self.prefix);
        value.push('-');
        value.push_str(number);
        Id {
            value,
            _marker: PhantomData,
        }
    }

    /// Moves the counter past `id` if `id` carries this allocator's prefix.
    ///
    /// Used when ids come from outside (history restore), so later
    /// allocations cannot collide with them.
    pub fn observe(&mut self, id: &Id<T>) {
        let Some(number) = self.sequence_of(id) else {
            return;
        };
        if number >= self.next {
            self.next = number.saturating_add(1);
        }
    }

    /// The counter value `id` was allocated with, if it is one of ours.
    pub fn sequence_of(&self, id: &Id<T>) -> Option<u64> {
        id.as_str()
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|digits| digits.parse::<u64>().ok())
    }
}

pub fn node_id_allocator() -> IdAllocator<NodeIdTag> {
    IdAllocator::new("node")
}

pub fn connection_id_allocator() -> IdAllocator<ConnectionIdTag> {
    IdAllocator::new("connection")
}

#[cfg(test)]
mod tests {
    use super::{node_id_allocator, Id, IdError, NodeId};

    #[test]
    fn id_rejects_empty() {
        let result: Result<Id<()>, _> = Id::new("");
        assert_eq!(result, Err(IdError::Empty));
    }

    #[test]
    fn id_rejects_slash() {
        let result: Result<Id<()>, _> = Id::new("a/b");
        assert_eq!(result, Err(IdError::ContainsSlash));
    }

    #[test]
    fn allocator_counts_up_from_one() {
        let mut ids = node_id_allocator();
        assert_eq!(ids.allocate().as_str(), "node-1");
        assert_eq!(ids.allocate().as_str(), "node-2");
        assert_eq!(ids.next_value(), 3);
    }

    #[test]
    fn sequence_of_reads_only_own_ids() {
        let ids = node_id_allocator();
        let id = |value: &str| NodeId::new(value).expect("node id");
        assert_eq!(ids.sequence_of(&id("node-10")), Some(10));
        assert_eq!(ids.sequence_of(&id("node-x")), None);
        assert_eq!(ids.sequence_of(&id("custom")), None);
    }

    #[test]
    fn allocator_observe_only_moves_forward() {
        let mut ids = node_id_allocator();
        ids.observe(&NodeId::new("node-41").expect("node id"));
        assert_eq!(ids.allocate().as_str(), "node-42");

        ids.observe(&NodeId::new("node-3").expect("node id"));
        ids.observe(&NodeId::new("custom").expect("node id"));
        assert_eq!(ids.allocate().as_str(), "node-43");
    }
}
