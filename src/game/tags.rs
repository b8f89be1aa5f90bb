// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// The tags every PGN game carries, in the order they are written.
pub const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// A tag name, ordered the way PGN headers are written: the Seven Tag Roster
/// first in its fixed order (matched without regard to case), then every
/// other tag by name.
#[derive(Clone, Debug)]
pub struct TagKey(String);

pub type Tags = BTreeMap<TagKey, String>;

impl TagKey {
    pub fn new<S: Into<String>>(name: S) -> TagKey {
        TagKey(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn roster_index(&self) -> Option<usize> {
        SEVEN_TAG_ROSTER
            .iter()
            .position(|tag| tag.eq_ignore_ascii_case(&self.0))
    }
}

impl Ord for TagKey {
    fn cmp(&self, other: &TagKey) -> Ordering {
        match (self.roster_index(), other.roster_index()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for TagKey {
    fn partial_cmp(&self, other: &TagKey) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TagKey {
    fn eq(&self, other: &TagKey) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TagKey {}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'a> From<&'a str> for TagKey {
    fn from(name: &'a str) -> TagKey {
        TagKey::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_sorts_first() {
        let mut tags = Tags::new();
        for &name in &["Annotator", "Result", "ECO", "White", "Event", "Black"] {
            tags.insert(TagKey::new(name), String::new());
        }

        let order: Vec<&str> = tags.keys().map(|k| k.as_str()).collect();
        assert_eq!(vec!["Event", "White", "Black", "Result", "Annotator", "ECO"], order);
    }

    #[test]
    fn roster_matches_without_case() {
        let mut tags = Tags::new();
        tags.insert(TagKey::new("event"), "a".to_owned());
        tags.insert(TagKey::new("Event"), "b".to_owned());
        assert_eq!(1, tags.len());
        assert_eq!(Some(&"b".to_owned()), tags.get(&TagKey::from("EVENT")));
    }
}
