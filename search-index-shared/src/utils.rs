use std::collections::BTreeMap;

/// Group `items` by the key `key_fn` extracts from each one.
///
/// Groups are ordered by key; items inside a group keep their input order.
pub fn group_by<T, K, F>(items: impl IntoIterator<Item = T>, key_fn: F) -> BTreeMap<K, Vec<T>>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key_fn(&item)).or_default().push(item);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexItem;

    #[test]
    fn test_group_by_keeps_input_order() {
        let items = vec![
            IndexItem::new("rules", "rule", "a", "{}"),
            IndexItem::new("rules", "param", "b", "{}"),
            IndexItem::new("rules", "rule", "c", "{}"),
        ];

        let groups = group_by(&items, |item| item.type_key());

        assert_eq!(groups.len(), 2);
        let rules: Vec<&str> = groups
            .values()
            .last()
            .unwrap()
            .iter()
            .map(|item| item.key.id.as_str())
            .collect();
        assert_eq!(rules, vec!["a", "c"]);
    }

    #[test]
    fn test_group_by_empty() {
        let groups = group_by(Vec::<u32>::new(), |n| *n % 2);
        assert!(groups.is_empty());
    }
}
