//! Filter, sort and slice pipeline shared by every list endpoint.

use std::cmp::Ordering;
use std::fmt;

use crate::{PageRequest, Paged};

/// Items that expose a stable, unique ordering key.
///
/// The key orders results when no sort selector applies and breaks ties
/// between items whose selector keys compare equal, so every page is
/// deterministic.
pub trait Sequenced {
    /// Stable identifier, typically the server-assigned record id.
    fn sequence(&self) -> i64;
}

type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Named sort selectors for a collection of `T`.
///
/// Names match case-insensitively, so `sortBy=Name` and `sortBy=name` pick the
/// same selector.
pub struct SortSelectors<T> {
    selectors: Vec<(String, Comparator<T>)>,
}

impl<T> SortSelectors<T> {
    /// Empty selector set; every request falls back to sequence order.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selectors: Vec::new(),
        }
    }

    /// Register a selector that orders items by the key `key` extracts.
    #[must_use]
    pub fn with<K, F>(mut self, name: &str, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.selectors.push((
            name.to_ascii_lowercase(),
            Box::new(move |left, right| key(left).cmp(&key(right))),
        ));
        self
    }

    /// Whether a selector with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Registered selector names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.selectors.iter().map(|(name, _)| name.as_str())
    }

    fn resolve(&self, name: &str) -> Option<&Comparator<T>> {
        self.selectors
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, comparator)| comparator)
    }
}

impl<T> Default for SortSelectors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SortSelectors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Case-insensitive substring test used by search predicates.
///
/// # Examples
/// ```
/// use pagination::contains_ignore_case;
///
/// assert!(contains_ignore_case("Home Gym", "gym"));
/// assert!(!contains_ignore_case("Garage", "gym"));
/// ```
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filter, order and slice `items` according to `request`.
///
/// 1. A search term keeps only items for which `matches` returns `true`.
/// 2. `sort_by` resolves against `sorts`; unknown or absent names fall back to
///    ascending [`Sequenced::sequence`] order.
/// 3. The resolved selector applies in the requested direction and ties are
///    broken by ascending sequence.
/// 4. `total_items` counts the filtered set before slicing.
/// 5. The requested page is sliced out; pages past the end are empty.
pub fn paginate<T, I, M>(
    items: I,
    request: &PageRequest,
    matches: M,
    sorts: &SortSelectors<T>,
) -> Paged<T>
where
    T: Sequenced,
    I: IntoIterator<Item = T>,
    M: Fn(&T, &str) -> bool,
{
    let mut filtered: Vec<T> = match request.search_term() {
        Some(term) => items.into_iter().filter(|item| matches(item, term)).collect(),
        None => items.into_iter().collect(),
    };

    let comparator = request.sort_by().and_then(|name| sorts.resolve(name));
    let descending = request.sort_order().is_descending();
    filtered.sort_by(|left, right| {
        let primary = match comparator {
            Some(compare) if descending => compare(left, right).reverse(),
            Some(compare) => compare(left, right),
            None => Ordering::Equal,
        };
        primary.then_with(|| left.sequence().cmp(&right.sequence()))
    });

    let total_items = u64::try_from(filtered.len()).unwrap_or(u64::MAX);
    let page_size = usize::try_from(request.page_size()).unwrap_or(usize::MAX);
    let data = filtered
        .into_iter()
        .skip(request.offset())
        .take(page_size)
        .collect();

    Paged::new(data, request.page_number(), request.page_size(), total_items)
}

#[cfg(test)]
mod tests {
    //! Behavioural coverage for the paging pipeline.
    use super::*;
    use crate::{PageLimits, SortOrder};
    use rstest::{fixture, rstest};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: i64,
        name: String,
        weight: u32,
    }

    impl Sequenced for Item {
        fn sequence(&self) -> i64 {
            self.id
        }
    }

    fn item(id: i64, name: &str, weight: u32) -> Item {
        Item {
            id,
            name: name.to_owned(),
            weight,
        }
    }

    #[fixture]
    fn limits() -> PageLimits {
        PageLimits::new(2, 5).expect("valid limits")
    }

    #[fixture]
    fn sorts() -> SortSelectors<Item> {
        SortSelectors::new()
            .with("name", |item: &Item| item.name.to_lowercase())
            .with("weight", |item: &Item| item.weight)
    }

    #[fixture]
    fn groups() -> Vec<Item> {
        vec![item(1, "B", 20), item(2, "C", 10), item(3, "A", 20)]
    }

    fn by_name(item: &Item, term: &str) -> bool {
        contains_ignore_case(&item.name, term)
    }

    fn names(page: &Paged<Item>) -> Vec<&str> {
        page.data.iter().map(|item| item.name.as_str()).collect()
    }

    #[rstest]
    fn descending_name_sort_returns_first_page(
        limits: PageLimits,
        sorts: SortSelectors<Item>,
        groups: Vec<Item>,
    ) {
        let request = PageRequest::first(&limits)
            .with_page(1, 2, &limits)
            .with_sort(Some("name".to_owned()), SortOrder::Desc);

        let page = paginate(groups, &request, by_name, &sorts);

        assert_eq!(names(&page), ["C", "B"]);
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[rstest]
    fn unknown_sort_key_falls_back_to_sequence(
        limits: PageLimits,
        sorts: SortSelectors<Item>,
        groups: Vec<Item>,
    ) {
        let request = PageRequest::first(&limits)
            .with_page(1, 5, &limits)
            .with_sort(Some("colour".to_owned()), SortOrder::Desc);

        let page = paginate(groups, &request, by_name, &sorts);

        let ids: Vec<i64> = page.data.iter().map(|item| item.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[rstest]
    fn equal_keys_are_ordered_by_sequence(
        limits: PageLimits,
        sorts: SortSelectors<Item>,
        groups: Vec<Item>,
    ) {
        let request = PageRequest::first(&limits)
            .with_page(1, 5, &limits)
            .with_sort(Some("WEIGHT".to_owned()), SortOrder::Desc);

        let page = paginate(groups, &request, by_name, &sorts);

        let ids: Vec<i64> = page.data.iter().map(|item| item.id).collect();
        assert_eq!(ids, [1, 3, 2]);
    }

    #[rstest]
    fn search_filters_before_counting(
        limits: PageLimits,
        sorts: SortSelectors<Item>,
    ) {
        let items = vec![
            item(1, "Home Gym", 1),
            item(2, "Garage", 1),
            item(3, "Hotel gym", 1),
        ];
        let request = PageRequest::first(&limits).with_search_term(Some("GYM".to_owned()));

        let page = paginate(items, &request, by_name, &sorts);

        assert_eq!(names(&page), ["Home Gym", "Hotel gym"]);
        assert_eq!(page.total_items, 2);
        assert_eq!(page.total_pages, 1);
    }

    #[rstest]
    fn page_past_the_end_is_empty(
        limits: PageLimits,
        sorts: SortSelectors<Item>,
        groups: Vec<Item>,
    ) {
        let request = PageRequest::first(&limits).with_page(7, 2, &limits);

        let page = paginate(groups, &request, by_name, &sorts);

        assert!(page.data.is_empty());
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page_number, 7);
    }

    #[rstest]
    fn empty_collection_reports_zero_pages(limits: PageLimits, sorts: SortSelectors<Item>) {
        let request = PageRequest::first(&limits);

        let page = paginate(Vec::<Item>::new(), &request, by_name, &sorts);

        assert!(page.data.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(7, 3)]
    #[case(10, 5)]
    #[case(11, 4)]
    fn pages_cover_every_item_exactly_once(#[case] count: i64, #[case] page_size: u32) {
        let limits = PageLimits::new(1, 10).expect("valid limits");
        let sorts = SortSelectors::<Item>::new().with("name", |item: &Item| item.name.clone());
        let items: Vec<Item> = (1..=count)
            .map(|id| item(id, &format!("item-{id:03}"), 0))
            .collect();

        let first = paginate(
            items.clone(),
            &PageRequest::first(&limits).with_page(1, page_size, &limits),
            by_name,
            &sorts,
        );
        let expected_pages = u64::try_from(count)
            .expect("positive count")
            .div_ceil(u64::from(page_size));
        assert_eq!(first.total_pages, expected_pages);

        let mut seen = Vec::new();
        for page_number in 1..=u32::try_from(first.total_pages).expect("small page count") {
            let request = PageRequest::first(&limits)
                .with_page(page_number, page_size, &limits)
                .with_sort(Some("name".to_owned()), SortOrder::Asc);
            let page = paginate(items.clone(), &request, by_name, &sorts);
            assert!(page.data.len() <= usize::try_from(page_size).expect("small size"));
            seen.extend(page.data.into_iter().map(|item| item.id));
        }

        assert_eq!(seen, (1..=count).collect::<Vec<_>>());
    }

    #[rstest]
    fn ascending_sort_yields_non_decreasing_keys(limits: PageLimits, sorts: SortSelectors<Item>) {
        let items = vec![
            item(1, "squat rack", 3),
            item(2, "Bench", 9),
            item(3, "cable", 1),
            item(4, "dumbbells", 9),
        ];
        let request = PageRequest::first(&limits)
            .with_page(1, 5, &limits)
            .with_sort(Some("weight".to_owned()), SortOrder::Asc);

        let page = paginate(items, &request, by_name, &sorts);

        assert!(
            page.data
                .windows(2)
                .all(|pair| matches!(pair, [a, b] if a.weight <= b.weight))
        );
    }
}
