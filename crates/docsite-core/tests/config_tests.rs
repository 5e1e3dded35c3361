use std::path::Path;

use figment::providers::{Format, Serialized, Toml};
use figment::Figment;

use docsite_core::config::{resolve_with_base, Config, DocsConfig};
use docsite_core::error::Error;
use docsite_core::order::OrderTables;

fn layered(toml: &str) -> Config {
    let figment =
        Figment::from(Serialized::defaults(DocsConfig::default())).merge(Toml::string(toml));
    Config::from_figment(figment)
}

#[test]
fn defaults_are_valid() {
    let docs = DocsConfig::default();
    docs.validate().expect("defaults validate");
    assert_eq!(docs.root_dir, "docs");
    assert_eq!(docs.search.default_limit, 10);
    assert_eq!(docs.search.snippet_radius, 80);
    assert_eq!(docs.order, OrderTables::curated());
    assert_eq!(docs.order.category("getting-started"), Some(1));
    assert_eq!(docs.order.document("getting-started", "quick-start"), Some(2));
}

#[test]
fn toml_layer_overrides_nested_keys() {
    let config = layered(
        r#"
root_dir = "site/content"
[search]
max_limit = 25
[search.boosts]
title = 20.0
[order.categories]
guide = 1
"#,
    );
    let docs = config.docs().expect("extract");
    assert_eq!(docs.root_dir, "site/content");
    assert_eq!(docs.search.max_limit, 25);
    assert_eq!(docs.search.default_limit, 10, "unset keys keep their defaults");
    assert!((docs.search.boosts.title - 20.0).abs() < f32::EPSILON);
    assert!((docs.search.boosts.headings - 3.0).abs() < f32::EPSILON);
    assert_eq!(docs.order.category("guide"), Some(1));
    assert_eq!(config.get::<usize>("search.max_limit").expect("inner"), 25);
}

#[test]
fn validation_rejects_inconsistent_settings() {
    let mut docs = DocsConfig::default();
    docs.search.default_limit = 500;
    assert!(matches!(docs.validate(), Err(Error::InvalidConfig(_))));

    let mut docs = DocsConfig::default();
    docs.extensions = vec![" ".to_string()];
    assert!(matches!(docs.validate(), Err(Error::InvalidConfig(_))));

    let mut docs = DocsConfig::default();
    docs.search.boosts.content = 0.0;
    assert!(matches!(docs.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn root_path_resolves_against_base() {
    let base = Path::new("/srv/app");
    let docs = DocsConfig::default();
    assert_eq!(docs.root_path(base), Path::new("/srv/app/docs"));
    assert_eq!(resolve_with_base(base, "/abs/docs"), Path::new("/abs/docs"));

    let sources = docs.source_tree(base);
    assert_eq!(sources.root(), Path::new("/srv/app/docs"));
    assert_eq!(sources.index_stem(), "README");
}
