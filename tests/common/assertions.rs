//! Predicates for validating git-deck command output

#![allow(dead_code)]

use predicates::prelude::*;

pub fn not_a_repository() -> impl Predicate<str> {
    predicates::str::contains("Folder is not a git repository")
}

pub fn lists_file(path: &str) -> impl Predicate<str> {
    predicates::str::contains(path.to_string())
}

pub fn has_section(header: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("{header}:"))
}
