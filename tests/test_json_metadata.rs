//! Round-trip a tree sequence whose individual and mutation
//! tables carry JSON metadata through a file, and decode the
//! payloads both with typed decoders and as raw JSON.

use coalrustts::{
    IndexTablesFlags, NodeFlags, TableCollection, TableSortingFlags, TreeSequence,
};

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
struct MutationMetadata {
    effect_size: f64,
    dominance: f64,
}

coalrustts_metadata::serde_json_metadata!(MutationMetadata);

impl coalrustts_metadata::MutationMetadata for MutationMetadata {}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
struct IndividualMetadata {
    name: String,
    phenotypes: Vec<i32>,
}

coalrustts_metadata::serde_json_metadata!(IndividualMetadata);

impl coalrustts_metadata::IndividualMetadata for IndividualMetadata {}

fn make_tables() -> TableCollection {
    let mut tables = TableCollection::new(100).unwrap();
    let pop0 = tables.add_population().unwrap();
    let ind0 = tables
        .add_individual_with_metadata(
            0,
            &[],
            &IndividualMetadata {
                name: "Jerome".to_string(),
                phenotypes: vec![0, 1, 2, 0],
            },
        )
        .unwrap();
    let node0 = tables
        .add_node_with_flags(0.0, pop0, ind0, NodeFlags::IS_SAMPLE.bits())
        .unwrap();
    let ancestor = tables.add_node(-1.0, pop0).unwrap();
    tables.add_edge(0, 100, ancestor, node0).unwrap();
    let site0 = tables.add_site(50, Some(b"A".to_vec())).unwrap();
    tables
        .add_mutation_with_metadata(
            site0,
            node0,
            -0.5,
            Some(b"G".to_vec()),
            &MutationMetadata {
                effect_size: -1e-3,
                dominance: 0.1,
            },
        )
        .unwrap();
    tables.sort_tables(TableSortingFlags::empty());
    tables.build_indexes(IndexTablesFlags::default()).unwrap();
    tables
}

fn dump_and_load(stem: &str) -> TreeSequence {
    let path = std::env::temp_dir().join(format!("{}_{}.trees", stem, std::process::id()));
    make_tables().dump(&path).unwrap();
    let ts = TreeSequence::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    ts
}

#[test]
fn test_individual_metadata() {
    let ts = dump_and_load("with_json_metadata_individual");
    let md = ts
        .individual_metadata::<IndividualMetadata, _>(0)
        .unwrap()
        .unwrap();
    assert_eq!(md.name, "Jerome");
    assert_eq!(md.phenotypes, vec![0, 1, 2, 0]);
}

#[test]
fn test_individual_metadata_without_schema() {
    // JSON payloads are self-describing: any JSON-aware
    // reader can inspect them without the Rust type.
    let ts = dump_and_load("with_json_metadata_individual_raw");
    let raw = ts.individuals()[0].metadata.as_ref().unwrap().clone();
    let md: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(md["name"], "Jerome");
    assert_eq!(md["phenotypes"], serde_json::json!([0, 1, 2, 0]));
}

#[test]
fn test_mutation_metadata() {
    let ts = dump_and_load("with_json_metadata_mutation");
    let md = ts
        .mutation_metadata::<MutationMetadata, _>(0)
        .unwrap()
        .unwrap();
    assert!((md.effect_size - (-1e-3)).abs() < 1e-9);
    assert!((md.dominance - 0.1).abs() < 1e-9);
}

#[test]
fn test_mutation_metadata_without_schema() {
    let ts = dump_and_load("with_json_metadata_mutation_raw");
    let raw = ts.mutations()[0].metadata.as_ref().unwrap().clone();
    let md: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert!((md["effect_size"].as_f64().unwrap() - (-1e-3)).abs() < 1e-9);
    assert!((md["dominance"].as_f64().unwrap() - 0.1).abs() < 1e-9);
}

#[test]
fn test_site_and_mutation_states_survive_round_trip() {
    let ts = dump_and_load("with_json_metadata_states");
    let tables = ts.tables();
    assert_eq!(tables.site(0).position, 50);
    assert_eq!(tables.site(0).ancestral_state, Some(b"A".to_vec()));
    assert_eq!(tables.mutation(0).derived_state, Some(b"G".to_vec()));
}
