//! Filter & sort pass over the master view.
//!
//! Produces the ordered position list every addressing mode works from, and
//! the per-category count side channel. The whole pass is deterministic for
//! a given master view and filter; nothing here touches a store.

use std::collections::BTreeMap;

use crate::catalog::{CatalogEntry, EntryStatus};

use super::types::{
    DeviceFilter, FilteredView, ListingFilter, SortOrder, CURATORS_CHOICE, REVISIONIST_HISTORY,
};

/// Sort the master view in place. `Recent` keeps the catalog's own order;
/// the other orders tie-break on raw title (the sort is stable, so id order
/// decides full ties).
pub fn sort_entries(entries: &mut [CatalogEntry], sort: SortOrder) {
    match sort {
        SortOrder::Recent => {}
        SortOrder::Alpha => entries.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title))
        }),
        SortOrder::Recommended => entries.sort_by(|a, b| {
            b.recommendation_order
                .cmp(&a.recommendation_order)
                .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
                .then_with(|| a.title.cmp(&b.title))
        }),
    }
}

/// Apply the filter predicate to a sorted master view.
///
/// A non-empty vendor id overrides device/category filtering entirely and
/// restricts membership to that vendor's entries. The count side channel
/// deliberately ignores the category filter (and vendor restriction) so the
/// counts answer "how many would match if the category filter were relaxed".
pub fn build_view(master: &[CatalogEntry], filter: &ListingFilter) -> FilteredView {
    let mut positions = Vec::new();
    let mut app_count: BTreeMap<String, i64> = BTreeMap::new();
    app_count.insert("All".to_string(), 0);
    app_count.insert("Missing Apps".to_string(), 0);

    let vendor = filter.vendor_id.as_deref().filter(|v| !v.is_empty());
    // Vendor mode forces the other filters open.
    let device = if vendor.is_some() {
        DeviceFilter::All
    } else {
        filter.device
    };
    let category = if vendor.is_some() {
        "All"
    } else {
        filter.category.as_str()
    };
    let query = filter.query.to_lowercase();

    for (pos, entry) in master.iter().enumerate() {
        if filter.hide_missing && entry.status == EntryStatus::Missing {
            *app_count.get_mut("Missing Apps").unwrap() += 1;
            continue;
        }
        if filter.show_only_missing && entry.status != EntryStatus::Missing {
            continue;
        }
        if filter.excluded_ids.contains(&entry.id) {
            continue;
        }
        if !filter.ignore_blacklist && !filter.blacklist.is_empty() {
            if let Some(v) = entry.vendor_id.as_deref() {
                if filter.blacklist.iter().any(|b| b == v) {
                    continue;
                }
            }
        }
        if !filter.adult && entry.adult {
            continue;
        }
        if filter.only_luneos && !entry.luneos {
            continue;
        }

        let valid_device = device.matches(entry);
        let text_match = query.is_empty()
            || entry.title.to_lowercase().contains(&query)
            || entry.author.to_lowercase().contains(&query)
            || entry.summary.to_lowercase().contains(&query);

        if let Some(vendor) = vendor {
            if entry.vendor_id.as_deref() == Some(vendor) {
                positions.push(pos);
            }
        } else if valid_device && category_matches(category, entry) && text_match {
            positions.push(pos);
        }

        if valid_device && text_match {
            *app_count.get_mut("All").unwrap() += 1;
            if !entry.category.is_empty() {
                *app_count.entry(entry.category.clone()).or_insert(0) += 1;
            }
            if entry.status == EntryStatus::Missing {
                *app_count.get_mut("Missing Apps").unwrap() += 1;
            }
            // Virtual categories overlap real ones, so they are not added to
            // the "All" total.
            if entry.in_revisionist_history {
                *app_count.entry(REVISIONIST_HISTORY.to_string()).or_insert(0) += 1;
            }
            if entry.in_curators_choice {
                *app_count.entry(CURATORS_CHOICE.to_string()).or_insert(0) += 1;
            }
        }
    }

    FilteredView {
        positions,
        app_count,
    }
}

fn category_matches(category: &str, entry: &CatalogEntry) -> bool {
    match category {
        REVISIONIST_HISTORY => entry.in_revisionist_history,
        CURATORS_CHOICE => entry.in_curators_choice,
        "All" => true,
        other => entry.category == other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::entry;

    fn titles<'a>(master: &'a [CatalogEntry], view: &FilteredView) -> Vec<&'a str> {
        view.positions
            .iter()
            .map(|&p| master[p].title.as_str())
            .collect()
    }

    #[test]
    fn test_sort_alpha_case_insensitive() {
        let mut entries = vec![
            entry(1, "banana"),
            entry(2, "Apple"),
            entry(3, "apple2"),
            entry(4, "42ish"),
        ];
        sort_entries(&mut entries, SortOrder::Alpha);
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["42ish", "Apple", "apple2", "banana"]);
    }

    #[test]
    fn test_sort_recommended_weight_then_title() {
        let mut a = entry(1, "Zebra");
        a.recommendation_order = 10;
        let mut b = entry(2, "Apple");
        b.recommendation_order = 10;
        let mut c = entry(3, "Middling");
        c.recommendation_order = 5;

        let mut entries = vec![c, a, b];
        sort_entries(&mut entries, SortOrder::Recommended);
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "Zebra", "Middling"]);
    }

    #[test]
    fn test_sort_recent_keeps_catalog_order() {
        let mut entries = vec![entry(3, "C"), entry(1, "A"), entry(2, "B")];
        sort_entries(&mut entries, SortOrder::Recent);
        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let master = vec![entry(1, "One"), entry(2, "Two")];
        let view = build_view(&master, &ListingFilter::default());
        assert_eq!(view.positions, vec![0, 1]);
        assert_eq!(view.app_count["All"], 2);
    }

    #[test]
    fn test_device_filter() {
        let mut touchpad_only = entry(1, "Tablet App");
        touchpad_only.touchpad = true;
        touchpad_only.pre = false;
        let mut pre_only = entry(2, "Phone App");
        pre_only.pre = true;

        let master = vec![touchpad_only, pre_only];
        let filter = ListingFilter {
            device: DeviceFilter::TouchPad,
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(titles(&master, &view), vec!["Tablet App"]);
        // Counts only cover device-matching entries
        assert_eq!(view.app_count["All"], 1);
    }

    #[test]
    fn test_category_and_virtual_categories() {
        let mut game = entry(1, "Game");
        game.category = "Games".to_string();
        let mut util = entry(2, "Util");
        util.category = "Utilities".to_string();
        util.in_curators_choice = true;

        let master = vec![game, util];

        let filter = ListingFilter {
            category: "Games".to_string(),
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(titles(&master, &view), vec!["Game"]);
        // Counts relax the category filter
        assert_eq!(view.app_count["All"], 2);
        assert_eq!(view.app_count["Games"], 1);
        assert_eq!(view.app_count["Utilities"], 1);
        assert_eq!(view.app_count[CURATORS_CHOICE], 1);

        let filter = ListingFilter {
            category: CURATORS_CHOICE.to_string(),
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(titles(&master, &view), vec!["Util"]);
    }

    #[test]
    fn test_query_matches_title_author_or_summary() {
        let mut by_title = entry(1, "Star Chart");
        by_title.summary = "astronomy".to_string();
        let mut by_author = entry(2, "Other");
        by_author.author = "Starsoft".to_string();
        let mut by_summary = entry(3, "Third");
        by_summary.summary = "A star gazing tool".to_string();
        let unrelated = entry(4, "Checkers");

        let master = vec![by_title, by_author, by_summary, unrelated];
        let filter = ListingFilter {
            query: "STAR".to_string(),
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(view.positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_vendor_mode_overrides_device_and_category() {
        let mut ours = entry(1, "Ours");
        ours.vendor_id = Some("v-1".to_string());
        ours.category = "Games".to_string();
        ours.pre = false; // would fail a device filter
        let mut theirs = entry(2, "Theirs");
        theirs.vendor_id = Some("v-2".to_string());

        let master = vec![ours, theirs];
        let filter = ListingFilter {
            device: DeviceFilter::Pre,
            category: "Utilities".to_string(),
            vendor_id: Some("v-1".to_string()),
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(titles(&master, &view), vec!["Ours"]);
    }

    #[test]
    fn test_blacklist_and_ignore_blacklist() {
        let mut banned = entry(1, "Banned");
        banned.vendor_id = Some("bad-vendor".to_string());
        let fine = entry(2, "Fine");

        let master = vec![banned, fine];
        let filter = ListingFilter {
            blacklist: vec!["bad-vendor".to_string()],
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(titles(&master, &view), vec!["Fine"]);
        // Blacklisted entries don't count either
        assert_eq!(view.app_count["All"], 1);

        let filter = ListingFilter {
            blacklist: vec!["bad-vendor".to_string()],
            ignore_blacklist: true,
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(view.positions.len(), 2);
    }

    #[test]
    fn test_adult_excluded_unless_requested() {
        let mut racy = entry(1, "Racy");
        racy.adult = true;
        let tame = entry(2, "Tame");

        let master = vec![racy, tame];
        let view = build_view(&master, &ListingFilter::default());
        assert_eq!(titles(&master, &view), vec!["Tame"]);

        let filter = ListingFilter {
            adult: true,
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(view.positions.len(), 2);
    }

    #[test]
    fn test_only_luneos() {
        let mut tested = entry(1, "Ported");
        tested.luneos = true;
        let untested = entry(2, "Legacy");

        let master = vec![tested, untested];
        let filter = ListingFilter {
            only_luneos: true,
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(titles(&master, &view), vec!["Ported"]);
    }

    #[test]
    fn test_excluded_ids_are_skipped() {
        let master = vec![entry(1, "Keep"), entry(2, "Drop"), entry(3, "Keep Too")];
        let filter = ListingFilter {
            excluded_ids: vec![2],
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(view.positions, vec![0, 2]);
        assert_eq!(view.app_count["All"], 2);
    }

    #[test]
    fn test_missing_status_filters_and_counts() {
        use crate::catalog::EntryStatus;

        let mut lost = entry(1, "Lost");
        lost.status = EntryStatus::Missing;
        let kept = entry(2, "Kept");

        let master = vec![lost, kept];

        // Default: missing entries are listed and counted
        let view = build_view(&master, &ListingFilter::default());
        assert_eq!(view.positions.len(), 2);
        assert_eq!(view.app_count["Missing Apps"], 1);

        let filter = ListingFilter {
            hide_missing: true,
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(titles(&master, &view), vec!["Kept"]);
        assert_eq!(view.app_count["Missing Apps"], 1);

        let filter = ListingFilter {
            show_only_missing: true,
            ..Default::default()
        };
        let view = build_view(&master, &filter);
        assert_eq!(titles(&master, &view), vec!["Lost"]);
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let master = vec![entry(1, "A"), entry(2, "B"), entry(3, "C")];
        let filter = ListingFilter {
            query: "b".to_string(),
            ..Default::default()
        };
        let first = build_view(&master, &filter);
        let second = build_view(&master, &filter);
        assert_eq!(first.positions, second.positions);
        assert_eq!(first.app_count, second.app_count);
    }
}
