//! Integration tests of the coalescent simulator
//! and the resulting files.

use coalrustts::{sim_ancestry, AncestryParams, TableCollection, TreeSequence};

fn small_params(seed: u64) -> AncestryParams {
    AncestryParams {
        num_samples: 4,
        sequence_length: 1_000,
        recombination_rate: 1e-4,
        population_size: 10,
        seed,
    }
}

#[test]
fn test_output_tables_are_valid() {
    for seed in [42, 51251, 987654321] {
        let ts = sim_ancestry(&small_params(seed)).unwrap();
        let tables = ts.tables();
        tables
            .validate(coalrustts::TableValidationFlags::default())
            .unwrap();
    }
}

#[test]
fn test_num_trees_matches_file_round_trip() {
    let ts = sim_ancestry(&small_params(666)).unwrap();
    let num_trees = ts.num_trees();
    let path = std::env::temp_dir().join(format!(
        "coalrustts_sim_round_trip_{}.trees",
        std::process::id()
    ));
    ts.dump(&path).unwrap();
    let reloaded = TreeSequence::load(&path).unwrap();
    assert_eq!(reloaded.num_trees(), num_trees);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_loaded_tables_population_printable() {
    // what the read_tablesfile binary does
    let ts = sim_ancestry(&small_params(13)).unwrap();
    let path = std::env::temp_dir().join(format!(
        "coalrustts_sim_populations_{}.trees",
        std::process::id()
    ));
    ts.dump(&path).unwrap();
    let tables = TableCollection::load(&path).unwrap();
    assert_eq!(tables.populations().len(), 1);
    for (_, pop) in tables.enumerate_populations() {
        let _ = format!("{}", pop);
    }
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_provenance_survives_round_trip() {
    let mut ts = sim_ancestry(&small_params(7)).unwrap();
    let record = serde_json::json!({"parameters": {"seed": 7}}).to_string();
    ts.add_provenance(&record).unwrap();
    let path = std::env::temp_dir().join(format!(
        "coalrustts_sim_provenance_{}.trees",
        std::process::id()
    ));
    ts.dump(&path).unwrap();
    let tables = TableCollection::load(&path).unwrap();
    assert_eq!(tables.provenances().len(), 1);
    let row = tables.provenance(0).unwrap();
    assert_eq!(row.record, record);
    assert!(!row.timestamp.is_empty());
    std::fs::remove_file(&path).unwrap();
}

mod test_simulation_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]
        #[test]
        fn test_all_seeds_fully_coalesce(seed in 0..u64::MAX) {
            let ts = sim_ancestry(&small_params(seed)).unwrap();
            prop_assert_eq!(ts.sample_nodes().len(), 8);
            prop_assert!(ts.num_trees() >= 1);
            // every tree has a root older than the samples
            let tables = ts.tables();
            prop_assert!(tables.num_edges() > 0);
            prop_assert!(tables
                .validate(coalrustts::TableValidationFlags::default())
                .is_ok());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]
        #[test]
        fn test_no_recombination_is_one_tree(seed in 0..u64::MAX) {
            let mut params = small_params(seed);
            params.recombination_rate = 0.0;
            let ts = sim_ancestry(&params).unwrap();
            prop_assert_eq!(ts.num_trees(), 1);
        }
    }
}
