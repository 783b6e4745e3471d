//! Prompt → sanitize → parse on realistic model output.


use topicgraph::{build_prompt, parse, sanitize, ExplorerError};

#[test]
fn prompt_contains_query_without_newlines() {
    for query in ["Linear algebra", "Solve a+b=120, for b", "  padded  "] {
        for n in [0u32, 1, 10] {
            let p = build_prompt(query, n).unwrap();
            assert!(p.contains(query), "{:?} not in {}", query, p);
            assert!(!p.contains('\n'));
        }
    }
    assert!(matches!(build_prompt("", 3), Err(ExplorerError::InvalidInput(_))));
    assert!(matches!(build_prompt("   ", 3), Err(ExplorerError::InvalidInput(_))));
}

#[test]
fn sanitize_is_idempotent_on_valid_json() {
    for x in [
        r#"{"a":1}"#,
        r#"{"title":"T","children":[{"title":"C","children":[]}],"prompts":["p"]}"#,
        "[1,2,3]",
        "null",
        "\"text\"",
    ] {
        let once = sanitize(x);
        assert_eq!(sanitize(&once), once);
    }
}

#[test]
fn sanitize_extracts_object_from_prose() {
    let out = sanitize(r#"prefix {"a":1} suffix"#);
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v, serde_json::json!({"a": 1}));
}

#[test]
fn parse_builds_tree_with_distinct_ids() {
    let root = parse(r#"{"title":"A","children":[{"title":"B"}]}"#).unwrap();
    assert_eq!(root.title, "A");
    assert_eq!(root.children.len(), 1);
    let b = &root.children[0];
    assert_eq!(b.title, "B");
    assert!(root.visible && b.visible);
    assert!(!root.loading && !b.loading);
    assert!(!root.id.as_str().is_empty() && !b.id.as_str().is_empty());
    assert_ne!(root.id, b.id);
}

#[test]
fn parse_rejects_non_json() {
    assert!(matches!(
        parse("not json"),
        Err(ExplorerError::MalformedResponse(_))
    ));
}

#[test]
fn messy_completion_is_salvaged() {
    let raw = r#"Certainly! Here is the JSON you asked for:

```json
{
  title: 'Photosynthesis',
  "description": "Plants turn **light** into chemical energy.
It happens in chloroplasts.",
  "url": "https://en.wikipedia.org/wiki/Photosynthesis"
  "children": [
    {"title": "Light reactions", "children": []},
    {"title": "Calvin cycle", "children": "n/a"},
  ],
  "prompts": ["How do chloroplasts capture light?"],
}
```
Let me know if you need more."#;
    let root = parse(&sanitize(raw)).unwrap();
    assert_eq!(root.title, "Photosynthesis");
    assert!(root.description.contains("chloroplasts"));
    assert_eq!(root.link(), Some("https://en.wikipedia.org/wiki/Photosynthesis"));
    let titles: Vec<&str> = root.children.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Light reactions", "Calvin cycle"]);
    assert!(root.children[1].children.is_empty());
    assert_eq!(root.prompts.len(), 1);
}

#[test]
fn truncated_completion_is_closed() {
    // Cut off mid-array; the last `}` belongs to the first child.
    let raw = r#"{"title":"Volcanoes","children":[{"title":"Magma"},{"title":"Lava"}"#;
    let root = parse(&sanitize(raw)).unwrap();
    assert_eq!(root.title, "Volcanoes");
    assert_eq!(root.children.len(), 2);
}
