// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Query engine: the visible subset of the catalog for one identity.

use doclocker_core::types::{CategoryFilter, DocumentFilter, DocumentRecord, IdentityId};

/// Records owned by `owner` whose name contains `search` (case-insensitive)
/// and whose category passes `category`.
///
/// An empty search term matches every name.  Results keep the insertion order
/// of `records`.
pub fn query<'a>(
    records: &'a [DocumentRecord],
    owner: IdentityId,
    search: &str,
    category: CategoryFilter,
) -> Vec<&'a DocumentRecord> {
    let needle = search.to_lowercase();
    records
        .iter()
        .filter(|r| r.owner_id() == owner)
        .filter(|r| needle.is_empty() || r.name().to_lowercase().contains(&needle))
        .filter(|r| category.matches(r.category()))
        .collect()
}

/// [`query`] driven by a [`DocumentFilter`].
pub fn query_filter<'a>(
    records: &'a [DocumentRecord],
    owner: IdentityId,
    filter: &DocumentFilter,
) -> Vec<&'a DocumentRecord> {
    query(records, owner, &filter.search, filter.category)
}

/// The `limit` most recently added records that [`query_filter`] would
/// return, newest first.
pub fn recent<'a>(
    records: &'a [DocumentRecord],
    owner: IdentityId,
    filter: &DocumentFilter,
    limit: usize,
) -> Vec<&'a DocumentRecord> {
    let mut found = query_filter(records, owner, filter);
    found.reverse();
    found.truncate(limit);
    found
}
