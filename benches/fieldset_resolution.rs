//! Performance benchmarks for fieldset resolution
//!
//! These benchmarks measure:
//! - Resolving a fieldset against large dependency collections
//! - Multi-reference select/deselect round trips through the object data context
//! - Locating one fieldset among many rendered instances
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relbind_core::{
    binding::{ObjectDataContext, ObjectDataEntry, ObjectDataProps},
    dependencies::DependencyCollections,
    fieldset::{FieldsetResolver, ResolveOptions},
    locate::{InstanceDisambiguator, RenderAddress, RenderedFieldset, Screen},
    properties::{FieldType, ObjectKey, ReferenceMetadata},
    reconcile::ReferenceFieldReconciler,
    schema::{FieldDefinition, ObjectSchema},
};
use serde_json::{json, Map, Value};

const RECORDS: usize = 5_000;

fn character_schema() -> ObjectSchema {
    ObjectSchema::new("character")
        .with_object_type("Character")
        .with_field(FieldDefinition::new("name", FieldType::Text).required())
        .with_field(FieldDefinition::relation(
            "worldId",
            ReferenceMetadata::single("world", "World"),
        ))
        .with_field(FieldDefinition::relation(
            "itemIds",
            ReferenceMetadata::multi("items", "Item"),
        ))
}

fn large_dependencies() -> DependencyCollections {
    let worlds = (0..RECORDS)
        .map(|i| json!({ "id": format!("w{i}"), "name": format!("World {i}") }))
        .collect();
    let items = (0..RECORDS)
        .map(|i| json!({ "_id": format!("i{i}"), "name": format!("Item {i}") }))
        .collect();
    DependencyCollections::new()
        .with_collection("world", worlds)
        .with_collection("items", items)
}

fn entry() -> ObjectDataEntry {
    let item_ids: Vec<Value> = (0..50).map(|i| json!(format!("i{}", i * 97))).collect();
    let mut data = Map::new();
    data.insert("name".to_string(), json!("Ann"));
    data.insert("worldId".to_string(), json!("w4321"));
    data.insert("itemIds".to_string(), Value::Array(item_ids));
    ObjectDataEntry::new(data, Some("c-1".to_string()))
}

// Benchmark: Resolve all fields of one object against large collections
fn bench_resolve_large_collections(c: &mut Criterion) {
    let schema = character_schema();
    let dependencies = large_dependencies();
    let entry = entry();
    let resolver = FieldsetResolver::default();
    let options = ResolveOptions::new();

    c.bench_function("resolve_large_collections", |b| {
        b.iter(|| {
            let fields = resolver.resolve(
                black_box(&schema),
                black_box(&entry),
                black_box(&dependencies),
                &options,
            );
            black_box(fields);
        });
    });
}

// Benchmark: Select then deselect one id on a multi-reference field
fn bench_select_deselect(c: &mut Criterion) {
    let context = ObjectDataContext::new(ObjectDataProps::new().with_data(entry().data));
    let reconciler = ReferenceFieldReconciler::new(&context, ObjectKey::main());

    c.bench_function("select_deselect", |b| {
        b.iter(|| {
            let selected = reconciler.select("itemIds", black_box("i1")).unwrap_or(false);
            let deselected = reconciler.deselect("itemIds", black_box("i1")).unwrap_or(false);
            black_box((selected, deselected));
        });
    });
}

// Benchmark: Locate by index among many same-typed fieldsets
fn bench_locate_instance(c: &mut Criterion) {
    let mut screen = Screen::new();
    for i in 0..500 {
        screen.mount(RenderedFieldset {
            address: RenderAddress::new("User", format!("user-{i}")).with_external_id("shared"),
            fields: Vec::new(),
        });
    }
    let disambiguator = InstanceDisambiguator::default();

    c.bench_function("locate_instance", |b| {
        b.iter(|| {
            let found = disambiguator.locate(&screen, "User", Some("shared"), Some(black_box(417)));
            black_box(found.is_ok());
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets =
        bench_resolve_large_collections,
        bench_select_deselect,
        bench_locate_instance
}

criterion_main!(benches);
