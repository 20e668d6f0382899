//! End-to-end scenarios exercising the public API the way a caller would.

use bedrock_collections::{
    CollectionError, List, SmallVec, StableVec, TreeMap, TreeMultiSet, TreeSet, UnorderedMap,
    UnorderedMultiMap,
};

#[test]
fn test_tree_set_erase_middle_key() {
    let mut set = TreeSet::new();
    for k in [1, 2, 3] {
        assert!(set.insert(k));
    }
    assert!(set.remove(&2));
    let keys: Vec<i32> = set.iter().copied().collect();
    assert_eq!(keys, vec![1, 3]);
}

#[test]
fn test_unordered_map_rehash_keeps_every_key() {
    let mut map: UnorderedMap<u32, String> = UnorderedMap::new();
    assert_eq!(map.bucket_count(), 16);
    assert_eq!(map.max_load_factor(), 1.0);
    for k in 0..17 {
        map.insert(k, format!("v{k}"));
    }
    assert!(map.bucket_count() > 16);
    for k in 0..17 {
        assert_eq!(map.get(&k).map(String::as_str), Some(format!("v{k}").as_str()));
    }
}

#[test]
fn test_small_vec_promotes_on_fifth_push() {
    let mut v: SmallVec<i32, 4> = SmallVec::new();
    for i in 0..4 {
        v.push(i);
    }
    assert!(v.using_inline_storage());
    assert_eq!(v.capacity(), 4);

    v.push(4);
    assert!(!v.using_inline_storage());
    assert!(v.capacity() >= 5);

    v.truncate(2);
    assert!(!v.using_inline_storage());
}

#[test]
fn test_stable_vec_front_insert_keeps_address() {
    let mut v = StableVec::new();
    v.push(10);
    v.push(20);
    let captured: *const i32 = &v[0];
    v.insert(0, 5).unwrap();
    let values: Vec<i32> = v.iter().copied().collect();
    assert_eq!(values, vec![5, 10, 20]);
    assert_eq!(&v[1] as *const i32, captured);
}

#[test]
fn test_tree_multiset_equal_range_and_remove_all() {
    let mut bag: TreeMultiSet<i32> = [1, 1, 2].into_iter().collect();
    assert_eq!(bag.equal_range(&1).count(), 2);
    assert_eq!(bag.remove_all(&1), 2);
    assert_eq!(bag.len(), 1);
}

#[test]
fn test_clones_are_independent() {
    let original: TreeMap<u8, &str> = [(1, "a"), (2, "b")].into();
    let mut copy = original.clone();
    assert_eq!(copy, original);
    copy.insert(3, "c");
    *copy.get_mut(&1).unwrap() = "z";
    assert_eq!(original.len(), 2);
    assert_eq!(original.get(&1), Some(&"a"));

    let mut words: UnorderedMultiMap<&str, u32> = UnorderedMultiMap::new();
    words.insert("x", 1);
    words.insert("x", 2);
    let mut other = words.clone();
    other.remove_all("x");
    assert_eq!(words.count("x"), 2);
    assert!(other.is_empty());
}

#[test]
fn test_get_or_insert_after_growth_points_into_table() {
    let mut map: UnorderedMap<u32, u32> = UnorderedMap::new();
    for k in 0..16 {
        map.insert(k, k);
    }
    let buckets = map.bucket_count();
    *map.get_or_insert_with(99, || 0) += 7;
    assert!(map.bucket_count() > buckets);
    assert_eq!(map.at(&99), Ok(&7));
}

#[test]
fn test_list_handle_goes_stale_after_removal() {
    let mut list = List::new();
    let a = list.push_back("a");
    let b = list.push_back("b");
    assert_eq!(list.remove(a), Ok("a"));
    assert_eq!(list.remove(a), Err(CollectionError::NotFound));
    assert_eq!(list.get(b), Some(&"b"));
}

#[cfg(feature = "lru")]
#[test]
fn test_lru_cache_evicts_least_recent() {
    use bedrock_collections::LruCache;
    use std::num::NonZeroUsize;

    let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
    for (k, v) in [("a", 1), ("b", 2), ("c", 3)] {
        cache.put(k, v);
    }
    assert_eq!(cache.get("a"), Some(&1));
    cache.put("d", 4);
    assert!(!cache.contains("b"));
    let recency: Vec<&str> = cache.iter().map(|(k, _)| *k).collect();
    assert_eq!(recency, vec!["d", "a", "c"]);
}
