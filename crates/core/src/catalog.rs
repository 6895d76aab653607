//! Read-time ordering of the product collection.
//!
//! Sorting is applied to an already-fetched list and never touches storage.
//! All orders are stable: products that compare equal keep their fetch order.

use std::cmp::Ordering;

use icu_collator::{CaseFirst, Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending by `count` only.
    Count,
    /// Ascending by locale-aware `name` only.
    Name,
    /// Ascending by name, ties broken by ascending count.
    #[default]
    NameThenCount,
}

impl SortOrder {
    /// Maps the `sortBy` query value. Anything other than `name` or `count`
    /// falls back to the default order.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("count") => Self::Count,
            Some("name") => Self::Name,
            _ => Self::NameThenCount,
        }
    }

    pub fn as_query(self) -> Option<&'static str> {
        match self {
            Self::Count => Some("count"),
            Self::Name => Some("name"),
            Self::NameThenCount => None,
        }
    }
}

pub fn sort_products(products: &mut [Product], order: SortOrder) {
    match order {
        SortOrder::Count => products.sort_by(|a, b| a.count.cmp(&b.count)),
        SortOrder::Name => products.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortOrder::NameThenCount => products.sort_by(|a, b| {
            compare_names(&a.name, &b.name).then_with(|| a.count.cmp(&b.count))
        }),
    }
}

thread_local! {
    static NAME_COLLATOR: Option<Collator> = name_collator();
}

/// Root-locale collator at tertiary strength with lowercase sorting first.
fn name_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    options.case_first = Some(CaseFirst::LowerFirst);
    Collator::try_new(&Default::default(), options).ok()
}

/// Unicode collation of product names: base letters first, then accents, then
/// case with lowercase before uppercase. Only identical strings compare equal.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    NAME_COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use crate::catalog::{compare_names, sort_products, SortOrder};
    use crate::domain::product::{Product, ProductId, Size};

    fn product(id: i64, name: &str, count: i64) -> Product {
        Product {
            id: ProductId(id),
            image_url: format!("https://img.local/{id}.png"),
            name: name.to_string(),
            count,
            size: Size { width: 1.0, height: 1.0 },
            weight: "1kg".to_string(),
            comments: Vec::new(),
        }
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|product| product.id.0).collect()
    }

    #[test]
    fn count_order_is_ascending_and_stable() {
        let mut products =
            vec![product(1, "b", 5), product(2, "a", 1), product(3, "c", 5), product(4, "d", 2)];

        sort_products(&mut products, SortOrder::Count);

        assert_eq!(ids(&products), vec![2, 4, 1, 3]);
    }

    #[test]
    fn name_order_ignores_count_and_is_stable() {
        let mut products =
            vec![product(1, "pear", 9), product(2, "Apple", 3), product(3, "pear", 1)];

        sort_products(&mut products, SortOrder::Name);

        assert_eq!(ids(&products), vec![2, 1, 3]);
    }

    #[test]
    fn default_order_breaks_name_ties_by_count() {
        let mut products = vec![
            product(1, "pear", 9),
            product(2, "apple", 3),
            product(3, "pear", 1),
            product(4, "apple", 2),
        ];

        sort_products(&mut products, SortOrder::NameThenCount);

        assert_eq!(ids(&products), vec![4, 2, 3, 1]);
    }

    #[test]
    fn names_compare_case_insensitively_before_case() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("Zebra", "apple"), Ordering::Greater);
        assert_eq!(compare_names("apple", "Apple"), Ordering::Less);
        assert_eq!(compare_names("Apple", "Apple"), Ordering::Equal);
        assert_eq!(compare_names("App", "apple"), Ordering::Less);
    }

    #[test]
    fn accented_and_symbol_names_collate_before_later_letters() {
        assert_eq!(compare_names("éclair", "fig"), Ordering::Less);
        assert_eq!(compare_names("Émile", "Zoe"), Ordering::Less);
        assert_eq!(compare_names("{x", "a"), Ordering::Less);
        assert_eq!(compare_names("eclair", "éclair"), Ordering::Less);
        assert_eq!(compare_names("éclair", "Eclair"), Ordering::Greater);
    }

    #[test]
    fn name_order_places_accented_names_with_their_base_letter() {
        let mut products = vec![
            product(1, "fig", 1),
            product(2, "Zoe", 1),
            product(3, "éclair", 1),
            product(4, "Émile", 1),
        ];

        sort_products(&mut products, SortOrder::Name);

        assert_eq!(ids(&products), vec![3, 4, 1, 2]);
    }

    #[test]
    fn query_values_map_to_orders() {
        assert_eq!(SortOrder::from_query(Some("count")), SortOrder::Count);
        assert_eq!(SortOrder::from_query(Some("name")), SortOrder::Name);
        assert_eq!(SortOrder::from_query(Some("default")), SortOrder::NameThenCount);
        assert_eq!(SortOrder::from_query(None), SortOrder::NameThenCount);
        assert_eq!(SortOrder::NameThenCount.as_query(), None);
    }
}
