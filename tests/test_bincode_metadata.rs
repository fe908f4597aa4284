//! Round-trip binary (`bincode`) metadata through a tables file.
//!
//! Unlike JSON, `bincode` payloads are not self-describing.
//! Decoding does not require the original type, though: any
//! type with the same field layout round-trips the payload,
//! which is how separate tooling reads these files.

use coalrustts::{
    IndexTablesFlags, NodeFlags, TableCollection, TableSortingFlags, TreeSequence,
};

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
struct MutationMetadata {
    effect_size: f64,
    dominance: f64,
}

coalrustts_metadata::serde_bincode_metadata!(MutationMetadata);

impl coalrustts_metadata::MutationMetadata for MutationMetadata {}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
struct IndividualMetadata {
    name: String,
    phenotypes: Vec<i32>,
}

coalrustts_metadata::serde_bincode_metadata!(IndividualMetadata);

impl coalrustts_metadata::IndividualMetadata for IndividualMetadata {}

// Mirror types with the same field layout, as separate
// tooling would declare them.

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
struct MutationMetadataMirror {
    effect_size: f64,
    dominance: f64,
}

coalrustts_metadata::serde_bincode_metadata!(MutationMetadataMirror);

impl coalrustts_metadata::MutationMetadata for MutationMetadataMirror {}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
struct IndividualMetadataMirror {
    name: String,
    phenotypes: Vec<i32>,
}

coalrustts_metadata::serde_bincode_metadata!(IndividualMetadataMirror);

impl coalrustts_metadata::IndividualMetadata for IndividualMetadataMirror {}

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
    let ts = dump_and_load("with_bincode_metadata_individual");
    let md = ts
        .individual_metadata::<IndividualMetadataMirror, _>(0)
        .unwrap()
        .unwrap();
    assert_eq!(md.name, "Jerome");
    assert_eq!(md.phenotypes, vec![0, 1, 2, 0]);
}

#[test]
fn test_mutation_metadata() {
    let ts = dump_and_load("with_bincode_metadata_mutation");
    let md = ts
        .mutation_metadata::<MutationMetadataMirror, _>(0)
        .unwrap()
        .unwrap();
    assert!((md.effect_size - (-1e-3)).abs() < 1e-9);
    assert!((md.dominance - 0.1).abs() < 1e-9);
}

#[test]
fn test_raw_payload_decodes_with_bincode() {
    let ts = dump_and_load("with_bincode_metadata_raw");
    let raw = ts.mutations()[0].metadata.as_ref().unwrap().clone();
    let md: MutationMetadataMirror = bincode::deserialize(&raw).unwrap();
    assert!((md.effect_size - (-1e-3)).abs() < 1e-9);
}

#[test]
fn test_wrong_layout_fails_to_decode() {
    #[derive(serde::Serialize, serde::Deserialize, Debug)]
    struct WrongLayout {
        name: String,
        phenotypes: Vec<i32>,
    }

    coalrustts_metadata::serde_bincode_metadata!(WrongLayout);

    impl coalrustts_metadata::MutationMetadata for WrongLayout {}

    let ts = dump_and_load("with_bincode_metadata_wrong_layout");
    assert!(ts.mutation_metadata::<WrongLayout, _>(0).is_err());
}
