use std::fs;
use std::path::Path;
use tempfile::TempDir;

use docsite_core::error::Error;
use docsite_core::order::OrderTables;
use docsite_core::sources::SourceTree;
use docsite_core::tree::build_tree;
use docsite_core::types::DocTreeNode;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn paths(nodes: &[DocTreeNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.path.as_str()).collect()
}

fn children(node: &DocTreeNode) -> &[DocTreeNode] {
    node.children.as_deref().expect("category node")
}

#[test]
fn three_file_scenario() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "a.md", "# Alpha\n\nFirst para.");
    write(root, "guide/b.md", "---\ntitle: Beta\norder: 1\n---\nBeta body.");
    write(root, "guide/c.md", "---\ntitle: Gamma\norder: 2\n---\nGamma body.");

    let tree = build_tree(&SourceTree::new(root), &OrderTables::default()).expect("tree");
    assert_eq!(paths(&tree), vec!["a", "guide"]);
    assert_eq!(tree[0].name, "Alpha");
    assert!(tree[0].children.is_none());
    let guide = children(&tree[1]);
    assert_eq!(paths(guide), vec!["guide/b", "guide/c"]);
    assert_eq!(guide[0].name, "Beta");
    assert_eq!(guide[1].name, "Gamma");
    assert_eq!(tree[1].name, "Guide");
}

#[test]
fn curated_category_order_beats_front_matter() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "guide/README.md", "---\ntitle: The Guide\norder: 500\n---\n");
    write(root, "guide/x.md", "x");
    write(root, "aaa/README.md", "---\norder: 1\n---\n");
    write(root, "aaa/y.md", "y");
    write(root, "zzz/z.md", "z");

    let order = OrderTables::default().with_category("guide", 2).with_category("aaa", 10);
    let tree = build_tree(&SourceTree::new(root), &order).expect("tree");
    assert_eq!(paths(&tree), vec!["guide", "aaa", "zzz"]);
    assert_eq!(tree[0].name, "The Guide");
    assert_eq!(tree[0].meta.order, 2);
    assert_eq!(tree[2].meta.order, 999);
}

#[test]
fn index_document_overrides_synthesized_category() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(
        root,
        "setup/README.md",
        "---\ntitle: Setting Up\ndescription: Install things\norder: 4\n---\nIntro.",
    );
    write(root, "setup/linux.md", "# Linux");
    write(root, "other-stuff/page.md", "# Page");
    write(root, "notitle/README.md", "Just an intro paragraph.");

    let tree = build_tree(&SourceTree::new(root), &OrderTables::default()).expect("tree");
    let setup = tree.iter().find(|n| n.path == "setup").expect("setup");
    assert_eq!(setup.name, "Setting Up");
    assert_eq!(setup.meta.description.as_deref(), Some("Install things"));
    assert_eq!(setup.meta.order, 4);
    assert_eq!(paths(children(setup)), vec!["setup/linux"], "index is not a child entry");

    let other = tree.iter().find(|n| n.path == "other-stuff").expect("other");
    assert_eq!(other.name, "Other stuff");
    let notitle = tree.iter().find(|n| n.path == "notitle").expect("notitle");
    assert_eq!(notitle.name, "Notitle");
    assert!(children(notitle).is_empty());
}

#[test]
fn root_index_is_not_a_tree_entry() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "README.md", "# Welcome");
    write(root, "intro.md", "# Intro");

    let tree = build_tree(&SourceTree::new(root), &OrderTables::default()).expect("tree");
    assert_eq!(paths(&tree), vec!["intro"]);
}

#[test]
fn curated_document_order_then_front_matter_then_default() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "start/quick-start.md", "---\norder: 1\n---\n");
    write(root, "start/installation.md", "---\norder: 50\n---\n");
    write(root, "start/extra.md", "---\norder: 3\n---\n");
    write(root, "start/appendix.md", "no order");

    let order = OrderTables::default()
        .with_document("start", "installation", 0)
        .with_document("start", "quick-start", 5);
    let tree = build_tree(&SourceTree::new(root), &order).expect("tree");
    assert_eq!(
        paths(children(&tree[0])),
        vec!["start/installation", "start/extra", "start/quick-start", "start/appendix"]
    );
}

#[test]
fn equal_orders_keep_lexicographic_order() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    for name in ["delta", "alpha", "charlie", "bravo"] {
        write(root, &format!("docs/{name}.md"), "---\norder: 7\n---\n");
        write(root, &format!("{name}.md"), "same default order");
    }

    let tree = build_tree(&SourceTree::new(root), &OrderTables::default()).expect("tree");
    assert_eq!(paths(&tree), vec!["alpha", "bravo", "charlie", "delta", "docs"]);
    assert_eq!(
        paths(children(&tree[4])),
        vec!["docs/alpha", "docs/bravo", "docs/charlie", "docs/delta"]
    );
}

#[test]
fn malformed_document_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "good.md", "# Good");
    write(root, "bad.md", "---\ntitle: [broken\n---\n");
    write(root, "guide/worse.md", "---\nnever closed\n");
    write(root, "guide/fine.md", "# Fine");

    let tree = build_tree(&SourceTree::new(root), &OrderTables::default()).expect("tree");
    assert_eq!(paths(&tree), vec!["good", "guide"]);
    assert_eq!(paths(children(&tree[1])), vec!["guide/fine"]);
}

#[test]
fn deep_files_and_other_extensions_are_left_out() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "guide/a.md", "# A");
    write(root, "guide/nested/deep.md", "# Deep");
    write(root, "guide/notes.txt", "ignored");
    write(root, ".hidden/secret.md", "# Secret");

    let tree = build_tree(&SourceTree::new(root), &OrderTables::default()).expect("tree");
    assert_eq!(paths(&tree), vec!["guide"]);
    assert_eq!(paths(children(&tree[0])), vec!["guide/a"]);
}

#[test]
fn unreadable_root_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("does-not-exist");
    let err = build_tree(&SourceTree::new(&missing), &OrderTables::default())
        .expect_err("should fail");
    assert!(matches!(err, Error::Io { .. }), "got {err:?}");
}

#[test]
fn resolve_handles_categories_and_rejects_traversal() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "README.md", "# Home");
    write(root, "guide/README.md", "# Guide");
    write(root, "guide/b.md", "# B");
    write(root, "empty/x.md", "# X");
    let sources = SourceTree::new(root);

    assert_eq!(sources.resolve("").expect("root").rel_path, Path::new("README.md"));
    assert_eq!(sources.resolve("guide").expect("category").rel_path, Path::new("guide/README.md"));
    assert_eq!(sources.resolve("/guide/b/").expect("doc").rel_path, Path::new("guide/b.md"));
    assert!(sources.resolve("empty").expect_err("no index").is_not_found());
    assert!(sources.resolve("guide/missing").expect_err("missing").is_not_found());
    assert!(sources.resolve("../etc/passwd").expect_err("traversal").is_not_found());
}

#[test]
fn listing_assigns_path_ids() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "a.md", "a");
    write(root, "guide/b.md", "b");
    write(root, "guide/v1.2/notes.md", "n");

    let ids: Vec<String> = SourceTree::new(root)
        .list()
        .expect("list")
        .iter()
        .map(|f| f.id())
        .collect();
    assert_eq!(ids, vec!["a", "guide/b", "guide/v1.2/notes"]);
}

#[test]
fn explicit_index_title_is_kept() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "guide/README.md", "---\ntitle: README\n---\nAbout this guide.");
    write(root, "guide/x.md", "# X");

    let tree = build_tree(&SourceTree::new(root), &OrderTables::default()).expect("tree");
    assert_eq!(tree[0].name, "README");
}

#[test]
fn root_document_named_like_category_with_index_is_omitted() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "guide.md", "# Guide page");
    write(root, "guide/README.md", "# The Guide");
    write(root, "guide/x.md", "# X");
    let sources = SourceTree::new(root);

    let tree = build_tree(&sources, &OrderTables::default()).expect("tree");
    assert_eq!(paths(&tree), vec!["guide"]);
    assert!(tree[0].is_category());
    assert_eq!(tree[0].name, "The Guide");
    let resolved = sources.resolve(&tree[0].path).expect("category path");
    assert_eq!(resolved.rel_path, Path::new("guide/README.md"));
}

#[test]
fn root_document_named_like_category_stands_in_as_index() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "guide.md", "---\ntitle: Guide Home\norder: 2\n---\nOverview.");
    write(root, "guide/x.md", "# X");
    write(root, "intro.md", "# Intro");
    let sources = SourceTree::new(root);

    let tree = build_tree(&sources, &OrderTables::default()).expect("tree");
    assert_eq!(paths(&tree), vec!["guide", "intro"]);
    assert!(tree[0].is_category());
    assert!(!tree[1].is_category());
    assert_eq!(tree[0].name, "Guide Home");
    assert_eq!(tree[0].meta.category, "guide");
    assert_eq!(paths(children(&tree[0])), vec!["guide/x"]);
    let resolved = sources.resolve(&tree[0].path).expect("category path");
    assert_eq!(resolved.rel_path, Path::new("guide.md"));
}

#[test]
fn directories_without_documents_are_left_out() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write(root, "assets/logo.png", "png");
    write(root, "old/nested/deep.md", "# Deep");
    write(root, "guide/a.md", "# A");

    let tree = build_tree(&SourceTree::new(root), &OrderTables::default()).expect("tree");
    assert_eq!(paths(&tree), vec!["guide"]);
}
