//! Pagination & delivery planner.
//!
//! Turns a filtered view plus an addressing mode into the response payload:
//! which entries ship in full, which collapse to null placeholders because
//! the session already holds them, and the first-letter jump table.

use std::collections::{BTreeMap, HashSet};

use crate::catalog::CatalogEntry;

use super::types::{Addressing, DeliveredEntry, FilteredView, ListingPlan};

/// Build the delivery plan for one request.
///
/// `master` must be the same sorted view the `FilteredView` was built from.
/// The returned plan's `ids` are exactly what the caller unions into the
/// session's known set afterwards.
pub fn plan(
    master: &[CatalogEntry],
    view: &FilteredView,
    addressing: &Addressing,
    known: &HashSet<i64>,
) -> ListingPlan {
    match addressing {
        Addressing::ExplicitIds { requested } => plan_explicit(master, requested),
        Addressing::Random { offset, count } => {
            let mut plan = plan_window(master, view, *offset, *count, known, true, Some(*offset));
            plan.random_offset = Some(*offset);
            plan
        }
        Addressing::Window { top, count } => {
            plan_window(master, view, *top, *count, known, false, None)
        }
    }
}

/// Explicit-id mode scans the full master view, not the filtered list, so
/// device/category/query filters have no effect here. Matches are always
/// delivered in full.
fn plan_explicit(master: &[CatalogEntry], requested: &[i64]) -> ListingPlan {
    let mut plan = ListingPlan::default();
    let wanted: HashSet<i64> = requested.iter().copied().collect();

    let mut ordinal = 0usize;
    for entry in master {
        if wanted.contains(&entry.id) {
            record_first_position(&mut plan.first_position, &entry.title, ordinal);
            plan.items.push(Some(DeliveredEntry::new(entry.clone())));
            plan.ids.push(entry.id);
            plan.return_indices.push(ordinal);
            ordinal += 1;
        }
    }

    // Clients page explicit requests by their own id list, so the count
    // echoes what was asked for, not what was found.
    plan.list_count = requested.len();
    plan
}

fn plan_window(
    master: &[CatalogEntry],
    view: &FilteredView,
    top: usize,
    count: usize,
    known: &HashSet<i64>,
    bypass_known: bool,
    detail_offset: Option<usize>,
) -> ListingPlan {
    let mut plan = ListingPlan::default();
    let bottom = top.saturating_add(count);

    for i in top..bottom {
        let Some(&mpos) = view.positions.get(i) else {
            break;
        };
        let entry = &master[mpos];

        if bypass_known || !known.contains(&entry.id) {
            plan.items.push(Some(DeliveredEntry::new(entry.clone())));
            if detail_offset == Some(i) {
                plan.detail_for = Some(entry.id);
            }
        } else {
            plan.items.push(None);
        }
        plan.return_indices.push(i);
        plan.ids.push(entry.id);
    }

    plan.list_count = view.positions.len();

    // The jump table spans the whole filtered list, independent of the
    // requested window.
    for (i, &mpos) in view.positions.iter().enumerate() {
        record_first_position(&mut plan.first_position, &master[mpos].title, i);
    }

    plan
}

/// Record a title's first letter in the jump table.
///
/// Uppercased first characters below 'A' (digits, punctuation) bucket under
/// "#" at position 0; characters past 'Z' bucket under "%" at their first
/// occurrence; A-Z record the first position per letter.
fn record_first_position(table: &mut BTreeMap<String, usize>, title: &str, position: usize) {
    let Some(first) = title.chars().next() else {
        return;
    };
    let first = first.to_uppercase().next().unwrap_or(first);

    if first < 'A' {
        table.entry("#".to_string()).or_insert(0);
    } else if first > 'Z' {
        table.entry("%".to_string()).or_insert(position);
    } else {
        table.entry(first.to_string()).or_insert(position);
    }
}
