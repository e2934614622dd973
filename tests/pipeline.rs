use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use flate2::{write::GzEncoder, Compression};
use tempfile::TempDir;

use wikilinks::config::{ContextConfig, GraphConfig, GraphStorage, MentionConfig, WriteMode};
use wikilinks::error::Error;
use wikilinks::graph::{Neighbors, PageHash};
use wikilinks::pipelines::{ContextPipeline, LinkGraphPipeline, MentionPipeline, Pipeline};
use wikilinks::store::Database;

const DUMP: &str = r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">
  <page>
    <title>Germany</title>
    <ns>0</ns>
    <revision>
      <text xml:space="preserve">'''Germany''' is a country in [[Europe]]. About 80 million people live in Germany. Its capital is [[Berlin]]. Berlin is large. In the west Germany borders on [[France]].</text>
    </revision>
  </page>
  <page>
    <title>Berlin</title>
    <ns>0</ns>
    <revision>
      <text xml:space="preserve">'''Berlin''' is the capital of [[Germany]]. Berlin has many museums.</text>
    </revision>
  </page>
  <page>
    <title>Cooking</title>
    <ns>0</ns>
    <revision>
      <text xml:space="preserve">Berlin is a sauce in this recipe.</text>
    </revision>
  </page>
  <page>
    <title>Deutschland</title>
    <ns>0</ns>
    <redirect title="Germany" />
    <revision>
      <text xml:space="preserve">#REDIRECT [[Germany]]</text>
    </revision>
  </page>
  <page>
    <title>Talk:Germany</title>
    <ns>1</ns>
    <revision>
      <text xml:space="preserve">Berlin or Bonn?</text>
    </revision>
  </page>
</mediawiki>"#;

const CATALOG: &str = r#"{"id": "Q64", "label": "Berlin", "target": "Berlin"}
{"id": "Q183", "label": "Germany", "target": "Deutschland", "aliases": ["Federal Republic of Germany"]}
{"id": "Q308", "label": "Mercury", "target": "Mercury (planet)"}
not json

{"id": "Q1", "label": "Nowhere", "target": null}
"#;

const REDIRECT_DUMP: &str = r#"<mediawiki>
  <page>
    <title>Germany</title>
    <ns>0</ns>
    <revision>
      <text xml:space="preserve">Germany is in Europe.</text>
    </revision>
  </page>
  <page>
    <title>Deutschland</title>
    <ns>0</ns>
    <redirect title="Germany" />
    <revision>
      <text xml:space="preserve">#REDIRECT [[Germany]]</text>
    </revision>
  </page>
  <page>
    <title>France</title>
    <ns>0</ns>
    <revision>
      <text xml:space="preserve">France borders [[Deutschland|Germany]]. Germany is east.</text>
    </revision>
  </page>
  <page>
    <title>Cooking</title>
    <ns>0</ns>
    <revision>
      <text xml:space="preserve">Germany has sausages.</text>
    </revision>
  </page>
</mediawiki>"#;

const REDIRECT_CATALOG: &str = r#"{"id": "Q183", "label": "Germany", "target": "Germany"}
"#;

struct Fixture {
    _dir: TempDir,
    dump: PathBuf,
    catalog: PathBuf,
    db: PathBuf,
}

fn write_file(path: &Path, content: &str) {
    let mut f = File::create(path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
}

fn fixture() -> Fixture {
    fixture_with(DUMP, CATALOG)
}

fn fixture_with(dump_content: &str, catalog_content: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("dump.xml");
    let catalog = dir.path().join("entities.jsonl");
    let db = dir.path().join("links.db");
    write_file(&dump, dump_content);
    write_file(&catalog, catalog_content);
    Fixture {
        _dir: dir,
        dump,
        catalog,
        db,
    }
}

fn mention_config() -> MentionConfig {
    MentionConfig {
        workers: Some(2),
        write_mode: WriteMode::Incremental { commit_every: 2 },
        ..Default::default()
    }
}

fn build_graph(f: &Fixture) {
    LinkGraphPipeline::new(f.dump.clone(), f.db.clone(), GraphConfig::default())
        .run()
        .unwrap();
}

fn extract_mentions(f: &Fixture) -> wikilinks::pipelines::MentionReport {
    MentionPipeline::new(
        f.dump.clone(),
        f.catalog.clone(),
        f.db.clone(),
        mention_config(),
    )
    .run()
    .unwrap()
}

#[test]
fn link_graph() {
    let f = fixture();
    let report = LinkGraphPipeline::new(f.dump.clone(), f.db.clone(), GraphConfig::default())
        .run()
        .unwrap();

    assert_eq!(report.read.pages_read, 5);
    assert_eq!(report.read.namespace_skipped, 1);
    assert_eq!(report.graph.articles, 3);
    assert_eq!(report.graph.redirects, 1);
    assert_eq!(report.graph.edges, 4);

    let db = Database::open_existing(&f.db).unwrap();
    assert_eq!(db.edge_count().unwrap(), 4);
    assert_eq!(db.page_count().unwrap(), 3);
    assert_eq!(
        db.resolve_title("Deutschland").unwrap().as_deref(),
        Some("Germany")
    );
    assert!(db
        .linked_to(PageHash::of("Germany"))
        .unwrap()
        .contains(&PageHash::of("Berlin")));
    assert!(db.linked_from(PageHash::of("Cooking")).unwrap().is_empty());
}

#[test]
fn compressed_dump_and_bulk_mode() {
    let f = fixture();
    let gz = f.dump.with_extension("xml.gz");
    let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
    encoder.write_all(DUMP.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let config = GraphConfig {
        write_mode: WriteMode::Bulk,
        ..Default::default()
    };
    let report = LinkGraphPipeline::new(gz, f.db.clone(), config)
        .run()
        .unwrap();
    assert_eq!(report.graph.edges, 4);

    let db = Database::open_existing(&f.db).unwrap();
    assert_eq!(db.edge_count().unwrap(), 4);
    assert_eq!(db.redirect_count().unwrap(), 1);
}

#[test]
fn max_pages() {
    let f = fixture();
    let config = GraphConfig {
        max_pages: Some(1),
        ..Default::default()
    };
    let report = LinkGraphPipeline::new(f.dump.clone(), f.db.clone(), config)
        .run()
        .unwrap();
    assert_eq!(report.read.yielded, 1);
    assert_eq!(report.graph.articles, 1);
}

#[test]
fn mentions_are_filtered_by_neighborhood() {
    let f = fixture();
    build_graph(&f);
    let report = extract_mentions(&f);

    assert_eq!(report.catalog.entities, 2);
    assert_eq!(report.catalog.missing, 2);
    assert_eq!(report.catalog.invalid_lines, 1);

    let stats = &report.mentions;
    assert_eq!(stats.pages, 4);
    assert_eq!(stats.redirects, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.pages_with_matches, 2);
    assert_eq!(stats.accepted_matches, 8);
    assert_eq!(stats.rejected_matches, 1);
    assert_eq!(stats.inserted_matches, 8);
    assert_eq!(stats.per_entity.get("Q64"), Some(&4));
    assert_eq!(stats.per_entity.get("Q183"), Some(&4));

    let db = Database::open_existing(&f.db).unwrap();
    let berlin = db.matches_for_entity("Q64").unwrap();
    assert_eq!(berlin.len(), 4);
    assert!(berlin.iter().all(|m| m.page_title != "Cooking"));

    let in_germany: Vec<(usize, usize)> = berlin
        .iter()
        .filter(|m| m.page_title == "Germany")
        .map(|m| (m.start_char, m.end_char))
        .collect();
    assert_eq!(in_germany, vec![(88, 94), (96, 102)]);

    let text = db.page_text("Germany").unwrap().unwrap();
    assert_eq!(&text[88..94], "Berlin");
    assert!(db.page_text("Cooking").unwrap().is_none());
}

#[test]
fn links_through_redirects() {
    let f = fixture_with(REDIRECT_DUMP, REDIRECT_CATALOG);
    build_graph(&f);

    for storage in [GraphStorage::Memory, GraphStorage::Database] {
        let config = MentionConfig {
            graph_storage: storage,
            ..mention_config()
        };
        let report = MentionPipeline::new(f.dump.clone(), f.catalog.clone(), f.db.clone(), config)
            .run()
            .unwrap();

        let stats = &report.mentions;
        assert_eq!(stats.redirects, 1, "{:?}", storage);
        assert_eq!(stats.accepted_matches, 3, "{:?}", storage);
        assert_eq!(stats.rejected_matches, 1, "{:?}", storage);
    }

    let db = Database::open_existing(&f.db).unwrap();
    let in_france: Vec<(usize, usize)> = db
        .matches_for_entity("Q183")
        .unwrap()
        .iter()
        .filter(|m| m.page_title == "France")
        .map(|m| (m.start_char, m.end_char))
        .collect();
    assert_eq!(in_france, vec![(15, 22), (24, 31)]);
    assert!(db
        .linked_from(PageHash::of("Germany"))
        .unwrap()
        .contains(&PageHash::of("France")));
}

#[test]
fn graph_queried_from_the_store() {
    let f = fixture();
    build_graph(&f);
    let config = MentionConfig {
        graph_storage: GraphStorage::Database,
        ..mention_config()
    };
    let report = MentionPipeline::new(f.dump.clone(), f.catalog.clone(), f.db.clone(), config)
        .run()
        .unwrap();

    assert_eq!(report.mentions.failed, 0);
    assert_eq!(report.mentions.accepted_matches, 8);
    assert_eq!(report.mentions.rejected_matches, 1);
    assert_eq!(report.mentions.inserted_matches, 8);
}

#[test]
fn rerun_is_idempotent() {
    let f = fixture();
    build_graph(&f);
    extract_mentions(&f);
    let report = extract_mentions(&f);

    assert_eq!(report.mentions.accepted_matches, 8);
    assert_eq!(report.mentions.inserted_matches, 0);
    let db = Database::open_existing(&f.db).unwrap();
    assert_eq!(db.match_count().unwrap(), 8);
}

#[test]
fn missing_inputs() {
    let f = fixture();
    let r = MentionPipeline::new(
        f.dump.clone(),
        f.catalog.clone(),
        f.db.clone(),
        mention_config(),
    )
    .run();
    assert!(matches!(r, Err(Error::MissingInput(p)) if p == f.db));

    build_graph(&f);
    let r = MentionPipeline::new(
        f.dump.with_extension("bz2"),
        f.catalog.clone(),
        f.db.clone(),
        mention_config(),
    )
    .run();
    assert!(matches!(r, Err(Error::MissingInput(_))));
}

#[test]
fn contexts() {
    let f = fixture();
    build_graph(&f);
    extract_mentions(&f);

    let tsv = f.db.with_extension("tsv");
    let config = ContextConfig {
        radius: 30,
        ..Default::default()
    };
    let stats = ContextPipeline::new(f.catalog.clone(), f.db.clone(), config)
        .with_export(Some(tsv.clone()))
        .run()
        .unwrap();

    assert_eq!(stats.entities, 2);
    assert_eq!(stats.matches_seen, 8);
    assert!(stats.contexts > 0);

    let db = Database::open_existing(&f.db).unwrap();
    assert_eq!(db.context_count().unwrap(), stats.inserted);

    let mut rows = Vec::new();
    db.for_each_context(|row| {
        rows.push(row);
        Ok(())
    })
    .unwrap();
    for row in &rows {
        assert_eq!(
            row.masked_context.chars().count(),
            row.unmasked_context.chars().count()
        );
        assert!(row.masked_context.contains('#'));
        assert!(!row.masked_context.contains(row.surface_form.as_str()));
    }

    let exported = std::fs::read_to_string(&tsv).unwrap();
    let mut lines = exported.lines();
    assert_eq!(
        lines.next(),
        Some("entity_id\tsurface_form\tpage_title\tunmasked_context\tmasked_context")
    );
    assert_eq!(lines.count(), rows.len());
}

#[test]
fn sampled_contexts() {
    let f = fixture();
    build_graph(&f);
    extract_mentions(&f);

    let config = ContextConfig {
        contexts_per_entity: Some(1),
        write_mode: WriteMode::Bulk,
        ..Default::default()
    };
    let stats = ContextPipeline::new(f.catalog.clone(), f.db.clone(), config)
        .run()
        .unwrap();
    assert_eq!(stats.matches_seen, 2);

    let db = Database::open_existing(&f.db).unwrap();
    assert!(db.context_count().unwrap() <= 2);
}
