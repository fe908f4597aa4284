use crate::newtypes::{IndividualId, MutationId, NodeId, PopulationId, Position, ProvenanceId};
use crate::tables::{
    IndividualRecord, MutationRecord, Node, PopulationRecord, ProvenanceRecord, TablesError,
};
use bitflags::bitflags;
use coalrustts_metadata::{
    IndividualMetadata, MetadataError, MutationMetadata, PopulationMetadata,
};
use thiserror::Error;

/// Error type related to [``TreeSequence``]
#[derive(Error, Debug, PartialEq)]
pub enum TreesError {
    /// Returned by [``TreeSequence::new``].
    #[error("Tables not indexed.")]
    TablesNotIndexed,
    /// Returned when a [`NodeId`] is not
    /// present in a [`TreeSequence`].
    #[error("Node ID out of range")]
    NodeIdOutOfRange,
    /// Returned if a tree sequence is
    /// initialized with no samples.
    #[error("No samples found.")]
    NoSamples,
    /// Returned when there are problems with sample lists.
    #[error("Invalid samples.")]
    InvalidSamples,
    /// Returned if sample lists contain duplicate [`NodeId`].
    #[error("Duplicate samples.")]
    DuplicateSamples,
}

/// Result type for operations on tree sequences.
pub type TreesResult<T> = Result<T, TreesError>;

bitflags! {
    /// Bit flags modifying the behavior of [`TreeSequence`]
    /// initialization.
    pub struct TreeSequenceFlags: u32 {
        /// Do not validate tables when creating a [`TreeSequence`]
        const NO_TABLE_VALIDATION = 1 << 0;
    }
}

/// A tree sequence.
///
/// This is an indexed, immutable view over a
/// [`TableCollection`](crate::TableCollection).
pub struct TreeSequence {
    tables: crate::TableCollection,
    samples: Vec<NodeId>,
    num_trees: u32,
}

impl TreeSequence {
    fn new_from_tables(tables: crate::TableCollection) -> Result<Self, Box<dyn std::error::Error>> {
        if !tables.is_indexed() {
            return Err(Box::new(TablesError::TablesNotIndexed));
        }
        let mut samples = vec![];
        for (i, n) in tables.nodes_.iter().enumerate() {
            if n.flags & crate::NodeFlags::IS_SAMPLE.bits() > 0 {
                samples.push(NodeId::from(i));
            }
        }
        if samples.is_empty() {
            Err(Box::new(TreesError::NoSamples))
        } else {
            let num_trees = tables.count_trees()?;
            Ok(Self {
                tables,
                samples,
                num_trees,
            })
        }
    }

    /// Create a new tree sequence from a [`TableCollection`](crate::TableCollection).
    ///
    /// The input tables are consumed, owned by the tree sequence.
    ///
    /// By default, the tables will be validated.
    ///
    /// To disable validation, `flags` should contain
    /// [`TreeSequenceFlags::NO_TABLE_VALIDATION`].
    ///
    /// The list of samples will be populated from the [`node flags`](crate::Node::flags).
    /// Any `flag` containing [`IS_SAMPLE`](crate::NodeFlags::IS_SAMPLE) will be
    /// in the list.
    ///
    /// # Errors
    ///
    /// [`TablesNotIndexed`](crate::TablesError::TablesNotIndexed) if
    /// [`build_indexes`](crate::TableCollection::build_indexes) has not been called.
    ///
    /// [`TablesError`](crate::TablesError) if table validation fails.
    pub fn new(
        tables: crate::TableCollection,
        flags: TreeSequenceFlags,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if !tables.is_indexed() {
            return Err(Box::new(TablesError::TablesNotIndexed));
        }
        if !flags.contains(TreeSequenceFlags::NO_TABLE_VALIDATION) {
            tables.validate(crate::TableValidationFlags::default())?;
        }
        Self::new_from_tables(tables)
    }

    /// Create a new tree sequence from a table collection
    /// and a list of samples.
    ///
    /// Unlike [`TreeSequence::new`], this function ignores node
    /// flags and uses the samples list instead.
    ///
    /// # Errors
    ///
    /// [`TreesError`] if the samples list is invalid.
    pub fn new_with_samples(
        tables: crate::TableCollection,
        samples: &[NodeId],
        flags: TreeSequenceFlags,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if !tables.is_indexed() {
            return Err(Box::new(TablesError::TablesNotIndexed));
        }
        if !flags.contains(TreeSequenceFlags::NO_TABLE_VALIDATION) {
            tables.validate(crate::TableValidationFlags::default())?;
        }
        if samples.is_empty() {
            return Err(Box::new(TreesError::NoSamples));
        }
        let mut nodes = vec![0; tables.nodes_.len()];
        for s in samples {
            if *s == NodeId::NULL || s.0 as usize >= nodes.len() {
                return Err(Box::new(TreesError::InvalidSamples));
            }
            if nodes[s.0 as usize] != 0 {
                return Err(Box::new(TreesError::DuplicateSamples));
            }
            nodes[s.0 as usize] = 1;
        }
        let num_trees = tables.count_trees()?;
        Ok(Self {
            tables,
            samples: samples.to_vec(),
            num_trees,
        })
    }

    /// Move the underlying [`TableCollection`](crate::TableCollection),
    /// consuming `self`.
    pub fn tables(self) -> crate::TableCollection {
        self.tables
    }

    /// Get a clone of the underlying [`TableCollection`](crate::TableCollection).
    pub fn tables_copy(&self) -> crate::TableCollection {
        self.tables.clone()
    }

    /// The sample nodes
    pub fn sample_nodes(&self) -> &[NodeId] {
        &self.samples
    }

    /// The number of trees in the tree sequence
    pub fn num_trees(&self) -> u32 {
        self.num_trees
    }

    /// Get genome length
    pub fn genome_length(&self) -> Position {
        self.tables.genome_length()
    }

    /// Return immutable reference to the node table
    pub fn nodes(&self) -> &[Node] {
        self.tables.nodes()
    }

    /// Return immutable reference to the mutation table
    pub fn mutations(&self) -> &[MutationRecord] {
        self.tables.mutations()
    }

    /// Return immutable reference to the population table
    pub fn populations(&self) -> &[PopulationRecord] {
        self.tables.populations()
    }

    /// Return immutable reference to the individual table
    pub fn individuals(&self) -> &[IndividualRecord] {
        self.tables.individuals()
    }

    /// Return immutable reference to the provenance table
    pub fn provenances(&self) -> &[ProvenanceRecord] {
        self.tables.provenances()
    }

    /// Decode the metadata for the i-th mutation row.
    ///
    /// See [`TableCollection::mutation_metadata`](crate::TableCollection::mutation_metadata).
    pub fn mutation_metadata<M: MutationMetadata, I: Into<MutationId>>(
        &self,
        row: I,
    ) -> Result<Option<M>, MetadataError> {
        self.tables.mutation_metadata::<M, I>(row)
    }

    /// Decode the metadata for the i-th individual row.
    ///
    /// See [`TableCollection::individual_metadata`](crate::TableCollection::individual_metadata).
    pub fn individual_metadata<M: IndividualMetadata, I: Into<IndividualId>>(
        &self,
        row: I,
    ) -> Result<Option<M>, MetadataError> {
        self.tables.individual_metadata::<M, I>(row)
    }

    /// Decode the metadata for the i-th population row.
    ///
    /// See [`TableCollection::population_metadata`](crate::TableCollection::population_metadata).
    pub fn population_metadata<M: PopulationMetadata, I: Into<PopulationId>>(
        &self,
        row: I,
    ) -> Result<Option<M>, MetadataError> {
        self.tables.population_metadata::<M, I>(row)
    }

    /// Add a row to the provenance table.
    ///
    /// See [`TableCollection::add_provenance`](crate::TableCollection::add_provenance).
    pub fn add_provenance(&mut self, record: &str) -> Result<ProvenanceId, TablesError> {
        self.tables.add_provenance(record)
    }
}

#[cfg(test)]
mod test_trees {
    use super::*;
    use crate::tables::{IndexTablesFlags, NodeFlags, TableCollection, TableSortingFlags};
    use crate::newtypes::IndividualId;

    fn indexed_tables() -> TableCollection {
        let mut tables = TableCollection::new(1000).unwrap();
        let p = tables.add_node(0., 0).unwrap();
        let c0 = tables
            .add_node_with_flags(1., 0, IndividualId::NULL, NodeFlags::IS_SAMPLE.bits())
            .unwrap();
        let c1 = tables
            .add_node_with_flags(1., 0, IndividualId::NULL, NodeFlags::IS_SAMPLE.bits())
            .unwrap();
        tables.add_edge(0, 1000, p, c0).unwrap();
        tables.add_edge(0, 1000, p, c1).unwrap();
        tables.sort_tables(TableSortingFlags::empty());
        tables.build_indexes(IndexTablesFlags::default()).unwrap();
        tables
    }

    #[test]
    fn test_create_treeseq_new_from_tables() {
        let tables = indexed_tables();
        let treeseq = TreeSequence::new(tables, TreeSequenceFlags::empty()).unwrap();
        let samples = treeseq.sample_nodes();
        assert_eq!(samples.len(), 2);
        for (i, s) in samples.iter().enumerate() {
            assert_eq!(*s, (i + 1) as i32);
        }
        assert_eq!(treeseq.num_trees(), 1);
    }

    #[test]
    fn test_create_treeseq_unindexed_tables() {
        let tables = TableCollection::new(1000).unwrap();
        match TreeSequence::new(tables, TreeSequenceFlags::empty()) {
            Err(_) => (),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_create_treeseq_with_samples() {
        let tables = indexed_tables();
        let samples = vec![NodeId::from(1), NodeId::from(2)];
        let treeseq =
            TreeSequence::new_with_samples(tables, &samples, TreeSequenceFlags::empty()).unwrap();
        assert_eq!(treeseq.sample_nodes(), samples.as_slice());
    }

    #[test]
    fn test_duplicate_samples() {
        let tables = indexed_tables();
        let samples = vec![NodeId::from(1), NodeId::from(1)];
        match TreeSequence::new_with_samples(tables, &samples, TreeSequenceFlags::empty()) {
            Err(_) => (),
            Ok(_) => panic!("expected an error"),
        }
    }
}
