//! End-to-end scenarios: source text in, answers out.

use engine::Engine;
use inference::MergeStrategy;
use lsp_types::{Position, TextDocumentContentChangeEvent, TextDocumentItem, Url};
use store::EngineEvent;
use symbols::{Modifiers, SymbolKind};
use tokio_util::sync::CancellationToken;

fn item(uri: &str, text: &str) -> TextDocumentItem {
    TextDocumentItem {
        uri: Url::parse(uri).unwrap(),
        language_id: "php".into(),
        version: 1,
        text: text.into(),
    }
}

fn open(engine: &mut Engine, uri: &str, text: &str) {
    engine.open_document(&item(uri, text)).unwrap();
}

/// Line/character of the first occurrence of `needle` (ASCII fixtures).
fn pos_of(text: &str, needle: &str) -> Position {
    let offset = text.find(needle).expect("needle in fixture");
    let line = text[..offset].matches('\n').count() as u32;
    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    Position {
        line,
        character: (offset - line_start) as u32,
    }
}

#[test]
fn alias_resolved_extends_lands_in_store() {
    let mut engine = Engine::new();
    open(
        &mut engine,
        "file:///f.php",
        "<?php\nnamespace A\\B;\nuse C\\D as E;\nclass F extends E\\G {}\n",
    );
    let found = engine.store().find("A\\B\\F");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].associated[0], "C\\D\\G");
}

#[test]
fn aggregate_override_carries_inherited_member() {
    let mut engine = Engine::new();
    open(
        &mut engine,
        "file:///f.php",
        "<?php\nclass Base { public function m(): int {} }\nclass Sub extends Base {}\n",
    );
    let aggregate = engine.aggregate("Sub").unwrap();
    let members = aggregate.members(MergeStrategy::Override);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "m");
    assert_eq!(members[0].type_string.to_string(), "int");
}

#[test]
fn magic_property_from_docblock() {
    let mut engine = Engine::new();
    open(
        &mut engine,
        "file:///f.php",
        "<?php\n/** @property string $x */\nclass C {}\n",
    );
    let class = engine.store().class_like("C").unwrap();
    let magic = class
        .children
        .iter()
        .find(|c| c.name == "x")
        .expect("magic property");
    assert_eq!(magic.kind, SymbolKind::Property);
    assert!(magic.modifiers.contains(Modifiers::MAGIC | Modifiers::PUBLIC));
    assert_eq!(magic.type_string.to_string(), "string");
}

#[test]
fn assignment_then_member_completion() {
    let source = "<?php\nclass Foo { public function bar(): int {} public $baz; }\nfunction go() {\n  $a = new Foo();\n  $a->\n}\n";
    let mut engine = Engine::new();
    open(&mut engine, "file:///f.php", source);
    let uri = Url::parse("file:///f.php").unwrap();

    // The resolver reports the receiver's type.
    let ty = engine.resolve_type(&uri, pos_of(source, "$a->"));
    assert_eq!(ty.to_string(), "Foo");

    // And completion pulls Foo's members.
    let caret = {
        let mut p = pos_of(source, "$a->");
        p.character += 4;
        p
    };
    let items = engine.provide_completions(&uri, caret, &CancellationToken::new());
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert!(labels.contains(&"bar"), "labels: {labels:?}");
    assert!(labels.contains(&"baz"), "labels: {labels:?}");
}

#[test]
fn instanceof_branches_refine_and_merge() {
    let source = "<?php\nclass Bar {}\nclass Baz {}\nfunction go(Baz $x) {\n  if ($x instanceof Bar) {\n    $x; // then\n  } else {\n    $x; // else\n  }\n  $x; // after\n}\n";
    let mut engine = Engine::new();
    open(&mut engine, "file:///f.php", source);
    let uri = Url::parse("file:///f.php").unwrap();

    assert_eq!(
        engine.resolve_type(&uri, pos_of(source, "$x; // then")).to_string(),
        "Bar"
    );
    assert_eq!(
        engine.resolve_type(&uri, pos_of(source, "$x; // else")).to_string(),
        "Baz"
    );
    let after = engine.resolve_type(&uri, pos_of(source, "$x; // after"));
    let mut atoms: Vec<&str> = after.atoms().collect();
    atoms.sort();
    assert_eq!(atoms, vec!["Bar", "Baz"]);
}

#[test]
fn duplicate_fqns_across_documents() {
    let mut engine = Engine::new();
    open(&mut engine, "file:///a.php", "<?php\nnamespace X;\nclass Y {}\n");
    open(&mut engine, "file:///b.php", "<?php\nnamespace X;\nclass Y {}\n");
    assert_eq!(engine.store().find("X\\Y").len(), 2);

    let removed = engine.forget(&Url::parse("file:///a.php").unwrap());
    assert_eq!(removed, 1);
    let left = engine.store().find("X\\Y");
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].location.uri, "file:///b.php");
}

#[test]
fn document_and_workspace_symbols() {
    let mut engine = Engine::new();
    open(
        &mut engine,
        "file:///f.php",
        "<?php\nnamespace App;\nclass UserRepo { public function find() {} }\nfunction helper() {}\n",
    );
    let uri = Url::parse("file:///f.php").unwrap();

    let symbols = engine.document_symbols(&uri);
    let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["App", "App\\UserRepo", "App\\helper"]);
    let class = symbols.iter().find(|s| s.name == "App\\UserRepo").unwrap();
    assert_eq!(class.children[0].name, "find");

    let hits = engine.workspace_symbols("userrepo");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "App\\UserRepo");
    assert!(engine.workspace_symbols("nothere").is_empty());
}

#[test]
fn edits_flush_before_queries() {
    let source = "<?php\nclass Old {}\n";
    let mut engine = Engine::new();
    open(&mut engine, "file:///f.php", source);
    let uri = Url::parse("file:///f.php").unwrap();

    let change = TextDocumentContentChangeEvent {
        range: None,
        range_length: None,
        text: "<?php\nclass Fresh {}\n".into(),
    };
    engine.edit_document(&uri, 2, &[change]).unwrap();

    // The store still holds the old view until something flushes.
    assert_eq!(engine.store().find("Old").len(), 1);

    let symbols = engine.document_symbols(&uri);
    assert_eq!(symbols[0].name, "Fresh");
    assert!(engine.store().find("Old").is_empty());
    assert_eq!(engine.store().find("Fresh").len(), 1);
}

#[test]
fn debounced_reparse_fires_on_tick() {
    let mut engine = Engine::new();
    open(&mut engine, "file:///f.php", "<?php\nclass Old {}\n");
    let uri = Url::parse("file:///f.php").unwrap();
    let change = TextDocumentContentChangeEvent {
        range: None,
        range_length: None,
        text: "<?php\nclass Fresh {}\n".into(),
    };
    engine.edit_document(&uri, 2, &[change]).unwrap();

    std::thread::sleep(store::DEBOUNCE_WINDOW + std::time::Duration::from_millis(50));
    engine.tick();
    assert!(engine.store().find("Old").is_empty());
    assert_eq!(engine.store().find("Fresh").len(), 1);
}

#[test]
fn change_events_reach_subscribers() {
    let mut engine = Engine::new();
    let mut events = engine.subscribe();
    open(&mut engine, "file:///f.php", "<?php\nclass A {}\n");
    match events.try_recv().expect("parsed event") {
        EngineEvent::DocumentParsed(change) => {
            assert_eq!(change.uri, "file:///f.php");
            assert_eq!(change.table.symbol_count(), 1);
        }
        other => panic!("unexpected event {other:?}"),
    }

    engine.close_document(&Url::parse("file:///f.php").unwrap());
    match events.try_recv().expect("removed event") {
        EngineEvent::DocumentRemoved { uri } => assert_eq!(uri, "file:///f.php"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn discover_indexes_without_opening() {
    let mut engine = Engine::new();
    let count = engine
        .discover(&item("file:///w.php", "<?php\nnamespace W;\nclass Tool {}\n"))
        .unwrap();
    assert_eq!(count, 1);
    assert!(engine.store().class_like("W\\Tool").is_some());

    // Cross-document resolution sees discovered symbols.
    let source = "<?php\nnamespace App;\nuse W\\Tool;\nfunction go() {\n  $t = new Tool();\n  $t;\n}\n";
    open(&mut engine, "file:///f.php", source);
    let uri = Url::parse("file:///f.php").unwrap();
    assert_eq!(
        engine.resolve_type(&uri, pos_of(source, "$t;")).to_string(),
        "W\\Tool"
    );

    let removed = engine.forget(&Url::parse("file:///w.php").unwrap());
    assert_eq!(removed, 1);
}

#[test]
fn signature_help_tracks_active_parameter() {
    let source = "<?php\n/** Adds numbers. */\nfunction add(int $a, int $b): int {}\nfunction go() {\n  add(1, 2);\n}\n";
    let mut engine = Engine::new();
    open(&mut engine, "file:///f.php", source);
    let uri = Url::parse("file:///f.php").unwrap();

    let help = engine
        .provide_signature_help(&uri, pos_of(source, "2);"), &CancellationToken::new())
        .expect("signature help");
    assert_eq!(help.signatures.len(), 1);
    assert_eq!(help.signatures[0].label, "add(int $a, int $b): int");
    assert_eq!(help.active_parameter, Some(1));

    let help = engine
        .provide_signature_help(&uri, pos_of(source, "1, 2);"), &CancellationToken::new())
        .expect("signature help");
    assert_eq!(help.active_parameter, Some(0));
}

#[test]
fn definition_of_class_and_member() {
    let source = "<?php\nclass Widget { public int $size; }\nfunction go(Widget $w) {\n  $n = new Widget();\n  $w->size;\n}\n";
    let mut engine = Engine::new();
    open(&mut engine, "file:///f.php", source);
    let uri = Url::parse("file:///f.php").unwrap();

    let defs = engine.provide_definition(
        &uri,
        pos_of(source, "Widget();"),
        &CancellationToken::new(),
    );
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].range.start.line, 1);

    let member = {
        let mut p = pos_of(source, "->size;");
        p.character += 2;
        p
    };
    let defs = engine.provide_definition(&uri, member, &CancellationToken::new());
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].range.start.line, 1);
}

#[test]
fn cancelled_queries_return_empty() {
    let source = "<?php\nclass Foo { public $bar; }\nfunction go() {\n  $a = new Foo();\n  $a->\n}\n";
    let mut engine = Engine::new();
    open(&mut engine, "file:///f.php", source);
    let uri = Url::parse("file:///f.php").unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let caret = {
        let mut p = pos_of(source, "$a->");
        p.character += 4;
        p
    };
    assert!(engine.provide_completions(&uri, caret, &cancel).is_empty());
    assert!(engine.provide_definition(&uri, caret, &cancel).is_empty());
}

#[test]
fn scoped_completion_lists_statics_and_constants() {
    let source = "<?php\nclass Cfg {\n  const MODE = 'fast';\n  public static function load(): Cfg {}\n  public function instanceOnly() {}\n  public static $shared;\n}\nfunction go() {\n  Cfg::\n}\n";
    let mut engine = Engine::new();
    open(&mut engine, "file:///f.php", source);
    let uri = Url::parse("file:///f.php").unwrap();

    let caret = {
        let mut p = pos_of(source, "Cfg::");
        p.character += 5;
        p
    };
    let items = engine.provide_completions(&uri, caret, &CancellationToken::new());
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert!(labels.contains(&"MODE"), "labels: {labels:?}");
    assert!(labels.contains(&"load"), "labels: {labels:?}");
    assert!(labels.contains(&"$shared"), "labels: {labels:?}");
    assert!(!labels.contains(&"instanceOnly"), "labels: {labels:?}");
}

#[test]
fn private_members_hidden_outside_their_class() {
    let source = "<?php\nclass Box {\n  private $secret;\n  public $open;\n  public function peek() {\n    $this->\n  }\n}\nfunction go(Box $b) {\n  $b->\n}\n";
    let mut engine = Engine::new();
    open(&mut engine, "file:///f.php", source);
    let uri = Url::parse("file:///f.php").unwrap();

    // Inside the class both members complete.
    let inside = {
        let mut p = pos_of(source, "$this->");
        p.character += 7;
        p
    };
    let labels: Vec<String> = engine
        .provide_completions(&uri, inside, &CancellationToken::new())
        .iter()
        .map(|i| i.label.clone())
        .collect();
    assert!(labels.contains(&"secret".to_string()), "labels: {labels:?}");

    // Outside, the private one is filtered.
    let outside = {
        let mut p = pos_of(source, "$b->");
        p.character += 4;
        p
    };
    let labels: Vec<String> = engine
        .provide_completions(&uri, outside, &CancellationToken::new())
        .iter()
        .map(|i| i.label.clone())
        .collect();
    assert!(labels.contains(&"open".to_string()), "labels: {labels:?}");
    assert!(!labels.contains(&"secret".to_string()), "labels: {labels:?}");
}
