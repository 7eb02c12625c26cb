// Adapters layer: concrete implementations for external systems (registry, package-list sources).

pub mod analytics;
pub mod names_file;
pub mod registry;
pub mod snapshot;

use crate::domain::model::PackageName;
use std::collections::HashSet;

/// Drop repeated names, keeping the first occurrence.
pub fn dedup_names(names: Vec<PackageName>) -> Vec<PackageName> {
    let mut seen = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
