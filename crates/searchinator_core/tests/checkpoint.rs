use searchinator_core::CheckpointSet;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

#[test]
fn serializes_sorted_and_deduplicated() {
    init_logging();
    let mut set = CheckpointSet::new();
    assert!(set.insert("zebra crossings"));
    assert!(set.insert("apple orchards"));
    assert!(!set.insert("zebra crossings"));

    let json = serde_json::to_string(&set).unwrap();
    assert_eq!(json, r#"["apple orchards","zebra crossings"]"#);
}

#[test]
fn deserializes_unsorted_input() {
    let set: CheckpointSet = serde_json::from_str(r#"["b","a","b"]"#).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    assert!(set.contains("a"));
    assert!(!set.contains("c"));
}
