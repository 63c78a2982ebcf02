use super::*;

fn sample() -> Catalog {
    let mut c = Catalog::new();
    c.insert("topicA", "file1.src", ["SceneX", "SceneY"]);
    c.insert("topicA", "file2.src", ["SceneZ"]);
    c.insert("topicB", "file1.src", ["SceneQ"]);
    c
}

fn criteria(topic: Option<&str>, file: Option<&str>, entry: Option<&str>) -> SelectionCriteria {
    SelectionCriteria {
        topic: topic.map(str::to_string),
        file: file.map(str::to_string),
        entry: entry.map(str::to_string),
    }
}

#[test]
fn no_selectors_returns_catalog_unchanged() {
    let c = sample();
    let sel = SelectionCriteria::default().apply(&c);
    assert_eq!(sel, Selection::All(c.clone()));
    assert!(sel.unresolved().is_empty());
    assert!(!sel.is_filtered_to_nothing());
}

#[test]
fn unknown_topic_resolves_to_nothing_and_is_reported() {
    let sel = criteria(Some("nope"), None, None).apply(&sample());
    assert!(sel.catalog().is_empty());
    assert!(sel.is_filtered_to_nothing());
    assert_eq!(
        sel.unresolved(),
        &[Unresolved::Topic {
            topic: "nope".to_string()
        }]
    );
}

#[test]
fn unknown_topic_suppresses_lower_level_reports() {
    let sel = criteria(Some("nope"), Some("file1.src"), Some("SceneX")).apply(&sample());
    assert_eq!(sel.unresolved().len(), 1);
    assert!(matches!(sel.unresolved()[0], Unresolved::Topic { .. }));
}

#[test]
fn entry_only_filter_narrows_to_that_entry() {
    let mut c = Catalog::new();
    c.insert("topicA", "file1.src", ["SceneX", "SceneY"]);

    let sel = criteria(None, None, Some("SceneY")).apply(&c);

    let mut want = Catalog::new();
    want.insert("topicA", "file1.src", ["SceneY"]);
    assert_eq!(sel.catalog(), &want);
    assert!(sel.unresolved().is_empty());
}

#[test]
fn file_filter_spans_topics_when_topic_is_omitted() {
    let sel = criteria(None, Some("file1.src"), None).apply(&sample());
    let seen: Vec<(&str, &str, &str)> = sel
        .catalog()
        .entries()
        .map(|e| (e.topic, e.file, e.entry))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("topicA", "file1.src", "SceneX"),
            ("topicA", "file1.src", "SceneY"),
            ("topicB", "file1.src", "SceneQ"),
        ]
    );
    assert!(sel.unresolved().is_empty());
}

#[test]
fn missing_file_in_topic_is_reported_with_scope() {
    let sel = criteria(Some("topicB"), Some("file2.src"), None).apply(&sample());
    assert!(sel.is_filtered_to_nothing());
    assert_eq!(
        sel.unresolved(),
        &[Unresolved::File {
            topic: Some("topicB".to_string()),
            file: "file2.src".to_string(),
        }]
    );
    assert_eq!(
        sel.unresolved()[0].to_string(),
        "file 'file2.src' not found in topic 'topicB'"
    );
}

#[test]
fn missing_entry_in_file_is_reported() {
    let sel = criteria(Some("topicA"), Some("file2.src"), Some("SceneX")).apply(&sample());
    assert!(sel.is_filtered_to_nothing());
    assert_eq!(
        sel.unresolved()[0].to_string(),
        "entry 'SceneX' not found in topicA/file2.src"
    );
}

#[test]
fn entry_found_in_one_topic_is_not_reported_for_others() {
    let sel = criteria(None, None, Some("SceneQ")).apply(&sample());
    assert_eq!(sel.catalog().entry_count(), 1);
    assert!(sel.unresolved().is_empty());
    assert!(sel.catalog().topic("topicA").is_none());
}
