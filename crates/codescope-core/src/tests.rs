//! Unit tests for codescope-core

use crate::test_utils::{facts, facts_with};
use crate::*;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_cross_file_call_graph_composition() {
    // a.py: f() calls g(); b.py: defines g()
    let a = facts(&["f"], &[("f", "g")]);
    let b = facts(&["g"], &[]);

    let mut aggregator = ResultAggregator::new();
    aggregator.add_file("a.py", &a);
    aggregator.add_file("b.py", &b);

    let calls = aggregator.call_graph();
    assert_eq!(calls.node_count(), 2);
    assert!(calls.contains_node("f"));
    assert!(calls.contains_node("g"));
    assert!(calls.has_edge("f", "g", EdgeKind::Calls));
    assert!(!calls.has_edge("g", "f", EdgeKind::Calls));
}

#[test]
fn test_composition_is_union_without_duplicates() {
    let mut left = CodeGraph::calls_of(&facts(&["f"], &[("f", "g"), ("f", "h")]));
    let right = CodeGraph::calls_of(&facts(&["f"], &[("f", "g")]));

    left.compose(&right);
    assert_eq!(left.node_count(), 3);
    assert_eq!(left.edge_count(), 2);

    // composing again changes nothing
    let before = left.snapshot();
    left.compose(&right);
    assert_eq!(left.snapshot(), before);
}

#[test]
fn test_class_kind_wins_over_inferred_function() {
    let caller = CodeGraph::calls_of(&facts(&["main"], &[("main", "Widget")]));
    let declarer = CodeGraph::calls_of(&facts_with(&[], &[], &["Widget"], &[]));

    let mut graph = CodeGraph::new();
    graph.compose(&caller);
    assert_eq!(graph.node("Widget").map(|n| n.kind), Some(NodeKind::Function));

    graph.compose(&declarer);
    assert_eq!(graph.node("Widget").map(|n| n.kind), Some(NodeKind::Class));
}

#[test]
fn test_structure_graph_qualifies_declarations() {
    let f = facts_with(&["os", "json"], &["load"], &["Loader"], &[]);
    let graph = CodeGraph::structure_of("pkg/io.py", &f);

    assert_eq!(graph.node("pkg/io.py").map(|n| n.kind), Some(NodeKind::File));
    assert_eq!(graph.node("pkg/io.py::load").map(|n| n.kind), Some(NodeKind::Function));
    assert_eq!(graph.node("pkg/io.py::Loader").map(|n| n.kind), Some(NodeKind::Class));
    assert_eq!(graph.node("os").map(|n| n.kind), Some(NodeKind::Import));
    assert!(graph.has_edge("pkg/io.py", "os", EdgeKind::Imports));
    assert!(graph.has_edge("pkg/io.py", "pkg/io.py::load", EdgeKind::Contains));
    assert_eq!(graph.degree("pkg/io.py"), 4);
}

#[test]
fn test_metrics_rank_imports_by_files() {
    let mut aggregator = ResultAggregator::new();
    aggregator.add_file("a.py", &facts_with(&["os", "sys"], &["a"], &[], &[]));
    aggregator.add_file("b.py", &facts_with(&["os"], &["b"], &[], &[("b", "a")]));
    aggregator.add_file("c.py", &facts_with(&["os", "sys"], &[], &["C"], &[]));

    let metrics = aggregator.metrics(10);
    assert_eq!(metrics.node_counts.get(&NodeKind::File), Some(&3));
    assert_eq!(metrics.node_counts.get(&NodeKind::Import), Some(&2));
    assert_eq!(metrics.node_counts.get(&NodeKind::Function), Some(&2));
    assert_eq!(metrics.node_counts.get(&NodeKind::Class), Some(&1));

    assert_eq!(metrics.top_imports[0], RankedEntry { name: "os".into(), count: 3 });
    assert_eq!(metrics.top_imports[1], RankedEntry { name: "sys".into(), count: 2 });

    // a.py and c.py both have three edges; ties are broken by name
    assert_eq!(metrics.most_connected_files[0].name, "a.py");
    assert_eq!(metrics.most_connected_files[0].count, 3);
    assert_eq!(metrics.most_called, vec![RankedEntry { name: "a".into(), count: 1 }]);

    let truncated = aggregator.metrics(1);
    assert_eq!(truncated.top_imports.len(), 1);
}

#[test]
fn test_bundle_serialization_shape() {
    let mut aggregator = ResultAggregator::new();
    aggregator.add_file("b.py", &facts(&["g"], &[]));
    aggregator.add_file("a.py", &facts(&["f"], &[("f", "g")]));

    let results = vec![
        AnalysisResult::new("b.py", "Python", "B"),
        AnalysisResult::new("a.py", "Python", "A"),
    ];
    let bundle = aggregator.into_bundle("global".into(), "calls".into(), results, 10);
    let value: serde_json::Value = serde_json::from_str(&bundle.to_json().unwrap()).unwrap();

    assert_eq!(value["global_analysis"], "global");
    assert_eq!(value["call_graph_analysis"], "calls");
    assert_eq!(value["file_analyses"][0]["file_path"], "a.py");
    assert_eq!(value["file_analyses"][1]["analysis"], "B");
    assert!(value["file_analyses"][0].get("failed_chunks").is_none());
    assert_eq!(value["call_graph"]["directed"], true);
    assert_eq!(value["call_graph"]["links"][0]["source"], "f");
    assert_eq!(value["call_graph"]["links"][0]["target"], "g");
    assert_eq!(value["call_graph"]["links"][0]["kind"], "calls");
    assert_eq!(value["metrics"]["node_counts"]["file"], 2);
}

#[test]
fn test_content_hash_is_stable() {
    let a = content_hash("def f():\n    g()\n");
    assert_eq!(a, content_hash("def f():\n    g()\n"));
    assert_ne!(a, content_hash("def f():\n    h()\n"));
    assert_eq!(a.len(), 64);
    assert_eq!(
        content_hash(""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_cache_hit_requires_matching_hash() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    let mut cache = ContentCache::new(&path);

    let h1 = content_hash("v1");
    let h2 = content_hash("v2");
    cache
        .put("a.py", &h1, &AnalysisResult::new("a.py", "Python", "first"))
        .unwrap();

    assert_eq!(cache.get("a.py", &h1).map(|r| r.analysis), Some("first".to_string()));
    assert!(cache.get("a.py", &h2).is_none());
    assert!(cache.get("b.py", &h1).is_none());

    cache
        .put("a.py", &h2, &AnalysisResult::new("a.py", "Python", "second"))
        .unwrap();
    assert!(cache.get("a.py", &h1).is_none());
    assert_eq!(cache.get("a.py", &h2).map(|r| r.analysis), Some("second".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_put_is_write_through() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("cache.json");
    let mut cache = ContentCache::new(&path);

    cache
        .put("a.py", "abc", &AnalysisResult::new("a.py", "Python", "text"))
        .unwrap();
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reloaded = ContentCache::load(&path);
    assert_eq!(reloaded.len(), 1);
    let entry = &reloaded.entries()["a.py"];
    assert_eq!(entry.hash, "abc");
    assert_eq!(entry.analysis.file_type, "Python");
    assert_eq!(entry.analysis.analysis, "text");
}

#[test]
fn test_cache_load_drops_incomplete_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(
        &path,
        r#"{
            "good.py": {"hash": "h", "analysis": {"file_type": "Python", "analysis": "ok", "file_path": "good.py"}},
            "no_hash.py": {"analysis": {"file_type": "Python", "analysis": "x"}},
            "no_payload.py": {"hash": "h"},
            "half_payload.py": {"hash": "h", "analysis": {"file_type": "Python"}},
            "not_an_object.py": "garbage"
        }"#,
    )
    .unwrap();

    let cache = ContentCache::load(&path);
    assert_eq!(cache.len(), 1);
    assert!(cache.get("good.py", "h").is_some());
    assert!(cache.get("no_hash.py", "h").is_none());
}

#[test]
fn test_cache_load_tolerates_corruption_and_absence() {
    let dir = TempDir::new().unwrap();

    let missing = ContentCache::load(dir.path().join("missing.json"));
    assert!(missing.is_empty());

    let corrupted_path = dir.path().join("corrupted.json");
    std::fs::write(&corrupted_path, "{ not json").unwrap();
    assert!(ContentCache::load(&corrupted_path).is_empty());

    let array_path = dir.path().join("array.json");
    std::fs::write(&array_path, "[1, 2, 3]").unwrap();
    assert!(ContentCache::load(&array_path).is_empty());
}

#[test]
fn test_clear_cache_removes_directory() {
    let dir = TempDir::new().unwrap();
    let mut cache = ContentCache::new(default_cache_path(dir.path()));
    cache
        .put("a.py", "h", &AnalysisResult::new("a.py", "Python", "x"))
        .unwrap();
    assert!(cache_dir(dir.path()).exists());

    clear_cache(dir.path()).unwrap();
    assert!(!cache_dir(dir.path()).exists());
    // clearing twice is fine
    clear_cache(dir.path()).unwrap();
}

#[test]
fn test_settings_defaults_and_partial_file() {
    let defaults = Settings::default();
    assert_eq!(defaults.limits.max_concurrent_calls, 5);
    assert_eq!(defaults.limits.calls_per_window, 5);
    assert_eq!(defaults.limits.window_secs, 60);
    assert_eq!(defaults.inference.max_chunk_chars, 70_000);
    assert_eq!(defaults.summary.batch_size, 50);
    assert_eq!(defaults.scan.decodings, vec![Decoding::Utf8, Decoding::Latin1]);
    assert!(defaults.validate().is_ok());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codescope.toml");
    std::fs::write(
        &path,
        r#"
[limits]
max_concurrent_calls = 2

[scan]
decodings = ["utf8"]
extensions = ["py"]
"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.limits.max_concurrent_calls, 2);
    assert_eq!(settings.limits.calls_per_window, 5);
    assert_eq!(settings.scan.decodings, vec![Decoding::Utf8]);
    assert_eq!(settings.inference.model, "mistralai/mistral-nemo");
    assert_eq!(
        settings.cache_path_for(Path::new("/repo")),
        Path::new("/repo").join(".codescope").join("analysis_cache.json")
    );
}

#[test]
fn test_settings_reject_bad_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[scan]\ndecodings = [\"utf-16\"]\n").unwrap();
    assert!(matches!(Settings::load(&path), Err(ConfigError::Parse { .. })));

    let mut settings = Settings::default();
    settings.limits.calls_per_window = 0;
    assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));

    let mut settings = Settings::default();
    settings.summary.batch_size = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn test_settings_reject_limits_above_caps() {
    let mut settings = Settings::default();
    settings.limits.window_secs = u64::MAX;
    assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    settings.limits.window_secs = MAX_WINDOW_SECS;
    assert!(settings.validate().is_ok());

    let mut settings = Settings::default();
    settings.limits.max_concurrent_calls = MAX_CONCURRENT_CALLS + 1;
    assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    settings.limits.max_concurrent_calls = MAX_CONCURRENT_CALLS;
    assert!(settings.validate().is_ok());
}

#[test]
fn test_file_type_labels() {
    assert_eq!(file_type_label(Path::new("a/b.py")), "Python");
    assert_eq!(file_type_label(Path::new("x.HPP")), "C++ Header");
    assert_eq!(file_type_label(Path::new("Makefile")), "Unknown");
}

#[test]
fn test_summary_cache_sits_next_to_analysis_cache() {
    let root = Path::new("/work/project");
    let cache = default_cache_path(root);

    assert_eq!(cache, root.join(".codescope").join("analysis_cache.json"));
    assert_eq!(summary_cache_path(&cache), root.join(".codescope").join("summary_cache.json"));
    assert_eq!(
        summary_cache_path(Path::new("custom.json")),
        Path::new("summary_cache.json")
    );
}
