use crate::newtypes::{
    EdgeId, IndividualId, MutationId, NodeId, PopulationId, Position, ProvenanceId, SiteId,
    TablesIdInteger, Time,
};
use bitflags::bitflags;
use coalrustts_metadata::{
    IndividualMetadata, MetadataError, MetadataRoundtrip, MutationMetadata, PopulationMetadata,
};
use std::cmp::Ordering;
use thiserror::Error;

/// Error type related to [``TableCollection``]
#[derive(Error, Debug, PartialEq)]
pub enum TablesError {
    /// Returned by [``TableCollection::new``].
    #[error("Invalid genome length")]
    InvalidGenomeLength,
    /// Returned when invalid node `ID`s are encountered.
    #[error("Invalid node: {found:?}")]
    InvalidNodeValue {
        /// The invalid `ID`
        found: NodeId,
    },
    /// Returned when invalid positions are encountered.
    #[error("Invalid value for position: {found:?}")]
    InvalidPosition {
        /// The invalid position
        found: Position,
    },
    /// Returned when table validation detects duplicate positions
    /// in a site table.
    #[error("Duplicated site positions found")]
    DuplicatedSitePosition,
    /// Returned when site tables are not properly sorted
    #[error("Site positions are unsorted")]
    UnsortedSitePosition,
    #[error("Site ID out of bounds")]
    /// Returned when a [``MutationRecord``]'s [`SiteId`] is out of bounds.
    SiteOutofBounds,
    /// Returned when mutation tables are not sorted by site position.
    #[error("Mutations not sorted by increasing position")]
    UnsortedMutationPositions,
    /// Returned when mutations at the same site are not sorted
    /// correctly by time.
    #[error("Mutations within same site are not sorted by time")]
    UnsortedMutationsWithinSite,
    /// Returned when a [``MutationRecord``]'s time field is not finite
    #[error("Invalid Mutation time.")]
    InvalidMutationTime,
    /// Returned when a [``Node``]'s time field is not finite,
    /// including the node field of [``MutationRecord``].
    #[error("Invalid Node time.")]
    InvalidNodeTime,
    /// Returned when an [``Edge``]'s left/right
    /// values are invalid.
    #[error("Invalid position range: {found:?}")]
    InvalidLeftRight {
        /// The invalid `(left, right)`.
        found: (Position, Position),
    },
    /// Returned when invalid times are encountered.
    #[error("Invalid value for time: {found:?}")]
    InvalidTime {
        /// The invalid time
        found: Time,
    },
    #[error("Invalid value for population: {found:?}")]
    /// Returned when a population `ID` is invalid.
    InvalidPopulation {
        /// The invalid population `ID`
        found: PopulationId,
    },
    #[error("Invalid value for individual: {found:?}")]
    /// Returned when an individual `ID` is invalid.
    InvalidIndividual {
        /// The invalid individual `ID`
        found: IndividualId,
    },
    #[error("Parent is NULL_ID")]
    /// Can be returned by [``validate_edge_table``]
    NullParent,
    #[error("Child is NULL_ID")]
    /// Can be returned by [``validate_edge_table``]
    NullChild,
    #[error("Node is out of bounds")]
    /// Can be returned by [``validate_edge_table``]
    NodeOutOfBounds,
    #[error("Node time order violation")]
    /// Can be returned by [``validate_edge_table``]
    NodeTimesUnordered,
    #[error("Parents not sorted by time")]
    /// Can be returned by [``validate_edge_table``]
    ParentTimesUnsorted,
    #[error("Parents not contiguous")]
    /// Can be returned by [``validate_edge_table``]
    ParentsNotContiguous,
    #[error("Edges not sorted by child")]
    /// Can be returned by [``validate_edge_table``]
    EdgesNotSortedByChild,
    #[error("Edges not sorted by left")]
    /// Can be returned by [``validate_edge_table``]
    EdgesNotSortedByLeft,
    #[error("Duplicate edges")]
    /// Can be returned by [``validate_edge_table``]
    DuplicateEdges,
    /// Returned by [`crate::TreeSequence::new`]
    /// when tables are not indexed.
    #[error("Tables not indexed")]
    TablesNotIndexed,
    /// Returned by [`TableCollection::add_provenance`].
    #[error("Provenance record is empty")]
    EmptyProvenanceRecord,
    /// Redirection of a metadata codec failure.
    #[error("{value:?}")]
    MetadataError {
        /// The error message
        value: String,
    },
}

impl From<MetadataError> for TablesError {
    fn from(value: MetadataError) -> Self {
        TablesError::MetadataError {
            value: value.to_string(),
        }
    }
}

/// Result type for operations on tables
pub type TablesResult<T> = std::result::Result<T, TablesError>;

/// A Node of a tree sequence
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    /// Birth time
    pub time: Time,
    /// Population of the node
    pub population: PopulationId,
    /// The individual the node belongs to.
    /// May be [``IndividualId::NULL``].
    pub individual: IndividualId,
    /// Bit flags
    pub flags: u32,
}

/// An Edge is a transmission event
///
/// An edge is a record of transmission of
/// a half-open chunk of genome `[left, right)`
/// from `parent` to `child`.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Edge {
    /// Left end
    pub left: Position,
    /// Right end
    pub right: Position,
    /// Index of parent in a [NodeTable](type.NodeTable.html)
    pub parent: NodeId,
    /// Index of child in a [NodeTable](type.NodeTable.html)
    pub child: NodeId,
}

/// A Site is the location and
/// ancestral state of a [``MutationRecord``]
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Site {
    /// Position of the mutation
    pub position: Position,
    /// The ancestral state.
    /// [``None``] implies client code
    /// will apply a default.
    pub ancestral_state: Option<Vec<u8>>,
}

/// A MutationRecord is the minimal information
/// needed about a mutation to track it
/// on a tree sequence.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MutationRecord {
    /// The node where the mutation maps
    pub node: NodeId,
    /// The index of the corresponding [``Site``].
    pub site: SiteId,
    /// The origin time of the mutation
    pub time: Time,
    /// The derived state.
    /// [``None``] implies client code
    /// will apply a default.
    pub derived_state: Option<Vec<u8>>,
    /// Encoded metadata payload.
    /// See [`coalrustts_metadata::MetadataRoundtrip`].
    pub metadata: Option<Vec<u8>>,
}

/// A row of the population table.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PopulationRecord {
    /// Encoded metadata payload.
    pub metadata: Option<Vec<u8>>,
}

impl std::fmt::Display for PopulationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.metadata {
            Some(md) => write!(f, "metadata: {}", String::from_utf8_lossy(md)),
            None => write!(f, "metadata: None"),
        }
    }
}

/// A row of the individual table.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndividualRecord {
    /// Bit flags
    pub flags: u32,
    /// Parent individuals, if known.
    pub parents: Vec<IndividualId>,
    /// Encoded metadata payload.
    pub metadata: Option<Vec<u8>>,
}

/// A row of the provenance table.
///
/// Records how the data were generated.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProvenanceRecord {
    /// RFC 3339 time stamp
    pub timestamp: String,
    /// The provenance record.
    /// By convention, a JSON document.
    pub record: String,
}

impl std::fmt::Display for ProvenanceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timestamp: {}, record: {}", self.timestamp, self.record)
    }
}

/// A node table
pub type NodeTable = Vec<Node>;
/// An edge table
pub type EdgeTable = Vec<Edge>;
/// A site table
pub type SiteTable = Vec<Site>;
/// A Mutation table
pub type MutationTable = Vec<MutationRecord>;
/// A population table
pub type PopulationTable = Vec<PopulationRecord>;
/// An individual table
pub type IndividualTable = Vec<IndividualRecord>;
/// A provenance table
pub type ProvenanceTable = Vec<ProvenanceRecord>;

fn position_non_negative(x: Position) -> TablesResult<()> {
    if x.0 < 0 {
        Err(TablesError::InvalidPosition { found: x })
    } else {
        Ok(())
    }
}

fn node_non_negative(x: NodeId) -> TablesResult<()> {
    if x < 0 {
        Err(TablesError::InvalidNodeValue { found: x })
    } else {
        Ok(())
    }
}

fn edge_table_add_row(
    edges: &mut EdgeTable,
    left: Position,
    right: Position,
    parent: NodeId,
    child: NodeId,
) -> TablesResult<EdgeId> {
    if right <= left {
        return Err(TablesError::InvalidLeftRight {
            found: (left, right),
        });
    }
    position_non_negative(left)?;
    position_non_negative(right)?;
    node_non_negative(parent)?;
    node_non_negative(child)?;

    edges.push(Edge {
        left,
        right,
        parent,
        child,
    });

    Ok(EdgeId::from(edges.len() - 1))
}

// NOTE: we allow negative times, so that backwards-in-time
// simulations can record node ages directly.
fn node_table_add_row(
    nodes: &mut NodeTable,
    time: Time,
    population: PopulationId,
    individual: IndividualId,
    flags: u32,
) -> TablesResult<NodeId> {
    if population < 0 {
        return Err(TablesError::InvalidPopulation { found: population });
    }
    nodes.push(Node {
        time,
        population,
        individual,
        flags,
    });

    Ok(NodeId::from(nodes.len() - 1))
}

fn site_table_add_row(
    sites: &mut SiteTable,
    position: Position,
    ancestral_state: Option<Vec<u8>>,
) -> TablesResult<SiteId> {
    position_non_negative(position)?;
    sites.push(Site {
        position,
        ancestral_state,
    });

    Ok(SiteId::from(sites.len() - 1))
}

fn mutation_table_add_row(
    mutations: &mut MutationTable,
    node: NodeId,
    site: SiteId,
    time: Time,
    derived_state: Option<Vec<u8>>,
    metadata: Option<Vec<u8>>,
) -> TablesResult<MutationId> {
    node_non_negative(node)?;
    mutations.push(MutationRecord {
        node,
        site,
        time,
        derived_state,
        metadata,
    });

    Ok(MutationId::from(mutations.len() - 1))
}

fn sort_edges(nodes: &[Node], edges: &mut [Edge]) {
    edges.sort_by(|a, b| {
        let aindex = a.parent.0 as usize;
        let bindex = b.parent.0 as usize;
        let ta = nodes[aindex].time;
        let tb = nodes[bindex].time;
        match ta.partial_cmp(&tb) {
            Some(std::cmp::Ordering::Equal) => {
                if a.parent == b.parent {
                    if a.child == b.child {
                        return a.left.cmp(&b.left);
                    }
                    a.child.cmp(&b.child)
                } else {
                    a.parent.cmp(&b.parent)
                }
            }
            Some(x) => x.reverse(),
            None => panic!("invalid parent times"),
        }
    });
}

fn record_site(sites: &[Site], mutation: &mut MutationRecord, new_site_table: &mut SiteTable) {
    let position = sites[mutation.site.0 as usize].position;
    if new_site_table.is_empty() || new_site_table[new_site_table.len() - 1].position != position {
        new_site_table.push(sites[mutation.site.0 as usize].clone());
    }

    mutation.site = SiteId((new_site_table.len() - 1) as TablesIdInteger);
}

fn sort_mutation_table(sites: &[Site], mutations: &mut [MutationRecord]) {
    mutations.sort_by(|a, b| {
        let pa = sites[a.site.0 as usize].position;
        let pb = sites[b.site.0 as usize].position;
        match pa.cmp(&pb) {
            std::cmp::Ordering::Equal => match a.time.partial_cmp(&b.time) {
                Some(x) => x,
                None => panic!("bad mutation times {} {}", a.time.0, b.time.0),
            },
            std::cmp::Ordering::Greater => std::cmp::Ordering::Greater,
            std::cmp::Ordering::Less => std::cmp::Ordering::Less,
        }
    });
}

bitflags! {
    /// Set properties of a [`Node`].
    ///
    /// The first 16 bits are reserved for internal use.
    /// Client code is free to use the remaining bits
    /// as needed.
    #[derive(Default)]
    pub struct NodeFlags: u32 {
        /// Default
        const NONE = 0;
        /// The node is a sample node.
        const IS_SAMPLE = 1 << 0;
    }
}

bitflags! {
    /// Set properties of an [`IndividualRecord`].
    #[derive(Default)]
    pub struct IndividualFlags: u32 {
        /// Default
        const NONE = 0;
    }
}

bitflags! {
    /// Modifies behavior of
    /// [``TableCollection::validate``]
    ///
    /// ```
    /// let f = coalrustts_tables_trees::TableValidationFlags::default();
    /// assert_eq!(f.contains(coalrustts_tables_trees::TableValidationFlags::VALIDATE_ALL), true);
    /// ```
    pub struct TableValidationFlags: u32 {
        /// Validate the edge table
        const VALIDATE_EDGES = 1<<0;
        /// Validate the site table
        const VALIDATE_SITES = 1<<1;
        /// Validate the mutation table
        const VALIDATE_MUTATIONS = 1<<2;
        /// Validate the node table
        const VALIDATE_NODES = 1<<3;
        /// Validate all tables.
        /// This is also the "default" value.
        const VALIDATE_ALL = Self::VALIDATE_EDGES.bits|Self::VALIDATE_MUTATIONS.bits|Self::VALIDATE_SITES.bits|Self::VALIDATE_NODES.bits;
    }
}

impl Default for TableValidationFlags {
    fn default() -> Self {
        TableValidationFlags::VALIDATE_ALL
    }
}

bitflags! {
    /// Modifies behavior of
    /// [``TableCollection::sort_tables``]
    ///
    /// ```
    /// let f = coalrustts_tables_trees::TableSortingFlags::empty();
    /// assert_eq!(f.contains(coalrustts_tables_trees::TableSortingFlags::SORT_ALL), true);
    /// ```
    #[derive(Default)]
    pub struct TableSortingFlags: u32 {
        /// Sort all tables.
        /// This is also the "default"/empty.
        const SORT_ALL = 0;
        /// Do not sort the edge table.
        const SKIP_EDGE_TABLE = 1 << 0;
    }
}

bitflags! {
    /// Modifies behavior of
    /// [``TableCollection::build_indexes``]
    #[derive(Default)]
    pub struct IndexTablesFlags: u32 {
        /// Default behavior
        const NONE = 0;
        /// Do not validate edge table
        const NO_VALIDATION = 1<<0;
    }
}

/// Perform a data integrity check on an [``EdgeTable``].
///
/// This checks, amongst other things, the sorting order
/// of the edges.
///
/// # Parameters
///
/// * `len`, the genome length of the tables.
///          Best obtained via [``TableCollection::genome_length``].
/// * `edges`, the [``EdgeTable``]
/// * `nodes`, the [``NodeTable``]
///
/// # Return
///
/// Returns ``Ok(true)`` if the tables pass all tests.
/// This return value allows this function to be used in
/// things like [``debug_assert``].
///
/// # Errors
///
/// Will return [``TablesError``] if the tables are not valid.
pub fn validate_edge_table(len: Position, edges: &[Edge], nodes: &[Node]) -> TablesResult<bool> {
    if edges.is_empty() {
        return Ok(true);
    }
    let mut parent_seen = vec![0; nodes.len()];
    let mut last_parent: usize = edges[0].parent.0 as usize;
    let mut last_child: usize = edges[0].child.0 as usize;
    let mut last_left: Position = edges[0].left;

    for (i, edge) in edges.iter().enumerate() {
        if edge.parent == NodeId::NULL {
            return Err(TablesError::NullParent);
        }
        if edge.child == NodeId::NULL {
            return Err(TablesError::NullChild);
        }
        if edge.parent < 0 || edge.parent.0 as usize >= nodes.len() {
            return Err(TablesError::NodeOutOfBounds);
        }
        if edge.child < 0 || edge.child.0 as usize >= nodes.len() {
            return Err(TablesError::NodeOutOfBounds);
        }
        if edge.left.0 < 0 || edge.left > len {
            return Err(TablesError::InvalidPosition { found: edge.left });
        }
        if edge.right.0 < 0 || edge.right > len {
            return Err(TablesError::InvalidPosition { found: edge.right });
        }
        if edge.left >= edge.right {
            return Err(TablesError::InvalidLeftRight {
                found: (edge.left, edge.right),
            });
        }

        // child time must be > parent time b/c time goes forwards
        if nodes[edge.child.0 as usize].time <= nodes[edge.parent.0 as usize].time {
            return Err(TablesError::NodeTimesUnordered);
        }

        if parent_seen[edge.parent.0 as usize] == 1 {
            return Err(TablesError::ParentsNotContiguous);
        }

        if i > 0 {
            match nodes[edge.parent.0 as usize]
                .time
                .partial_cmp(&nodes[last_parent].time)
            {
                Some(std::cmp::Ordering::Greater) => {
                    return Err(TablesError::ParentTimesUnsorted);
                }
                Some(std::cmp::Ordering::Equal) => {
                    if edge.parent.0 as usize == last_parent {
                        if (edge.child.0 as usize) < last_child {
                            return Err(TablesError::EdgesNotSortedByChild);
                        }
                        if edge.child.0 as usize == last_child {
                            match edge.left.cmp(&last_left) {
                                Ordering::Greater => (),
                                Ordering::Equal => return Err(TablesError::DuplicateEdges),
                                Ordering::Less => return Err(TablesError::EdgesNotSortedByLeft),
                            }
                        }
                    } else {
                        parent_seen[last_parent] = 1;
                    }
                }
                Some(_) => (),
                None => panic!("invalid node times"),
            }
        }
        last_parent = edge.parent.0 as usize;
        last_child = edge.child.0 as usize;
        last_left = edge.left;
    }

    Ok(true)
}

/// Perform a data integrity check on a [``NodeTable``].
///
/// Node times must be finite and individual `ID`s must be
/// [`IndividualId::NULL`] or refer to a row of the
/// [``IndividualTable``].
pub fn validate_node_table(nodes: &[Node], num_individuals: usize) -> TablesResult<()> {
    for n in nodes {
        if !n.time.0.is_finite() {
            return Err(TablesError::InvalidNodeTime);
        }
        if n.individual != IndividualId::NULL && (n.individual.0 as usize) >= num_individuals {
            return Err(TablesError::InvalidIndividual {
                found: n.individual,
            });
        }
    }
    Ok(())
}

/// Perform a data integrity check on a [``SiteTable``].
///
/// Positions must be in range, sorted, and free of duplicates.
pub fn validate_site_table(len: Position, sites: &[Site]) -> TablesResult<()> {
    for (i, site) in sites.iter().enumerate() {
        if site.position < 0 || site.position >= len {
            return Err(TablesError::InvalidPosition {
                found: site.position,
            });
        }
        if i > 0 {
            if sites[i - 1].position == site.position {
                return Err(TablesError::DuplicatedSitePosition);
            }
            if sites[i - 1].position > site.position {
                return Err(TablesError::UnsortedSitePosition);
            }
        }
    }
    Ok(())
}

/// Perform a data integrity check on a [``MutationTable``].
///
/// Mutations must refer to valid sites and nodes, be sorted
/// by site, and be sorted by time within a site.
pub fn validate_mutation_table(
    mutations: &[MutationRecord],
    sites: &[Site],
    nodes: &[Node],
) -> TablesResult<()> {
    let mut last_site: Option<SiteId> = None;
    let mut last_time = Time::MIN;
    for (i, mutation) in mutations.iter().enumerate() {
        if !mutation.time.0.is_finite() {
            return Err(TablesError::InvalidMutationTime);
        }
        if mutation.site < 0 || (mutation.site.0 as usize) >= sites.len() {
            return Err(TablesError::SiteOutofBounds);
        }
        if mutation.node < 0 || (mutation.node.0 as usize) >= nodes.len() {
            return Err(TablesError::NodeOutOfBounds);
        }
        if !nodes[mutation.node.0 as usize].time.0.is_finite() {
            return Err(TablesError::InvalidNodeTime);
        }
        if i > 0 {
            if mutations[i - 1].site > mutation.site {
                return Err(TablesError::UnsortedMutationPositions);
            }
            if last_site.is_some() && Some(mutation.site) == last_site && mutation.time < last_time
            {
                return Err(TablesError::UnsortedMutationsWithinSite);
            }
        }
        last_site = Some(mutation.site);
        last_time = mutation.time;
    }
    Ok(())
}

/// A collection of node, edge, site, mutation,
/// population, individual, and provenance tables.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct TableCollection {
    length_: Position, // Not visible outside of this module

    pub(crate) nodes_: NodeTable,
    pub(crate) edges_: EdgeTable,
    pub(crate) sites_: SiteTable,
    pub(crate) mutations_: MutationTable,
    pub(crate) populations_: PopulationTable,
    pub(crate) individuals_: IndividualTable,
    pub(crate) provenances_: ProvenanceTable,
    pub(crate) edge_input_order: Vec<usize>,
    pub(crate) edge_output_order: Vec<usize>,
    pub(crate) is_indexed: bool,
}

impl TableCollection {
    /// Create a new instance.
    ///
    /// # Parameters
    ///
    /// * `genome_length`: the total genome length for the tables.
    ///
    /// # Errors
    ///
    /// Will return [``TablesError``] if `genome_length < 1`.
    pub fn new<P: Into<Position>>(genome_length: P) -> TablesResult<TableCollection> {
        let p = genome_length.into();
        if p.0 < 1 {
            return Err(TablesError::InvalidGenomeLength);
        }

        Ok(TableCollection {
            length_: p,
            nodes_: NodeTable::new(),
            edges_: EdgeTable::new(),
            sites_: SiteTable::new(),
            mutations_: MutationTable::new(),
            populations_: PopulationTable::new(),
            individuals_: IndividualTable::new(),
            provenances_: ProvenanceTable::new(),
            edge_input_order: vec![],
            edge_output_order: vec![],
            is_indexed: false,
        })
    }

    /// Add a [``Node``] to the [``NodeTable``]
    ///
    /// # Parameters
    ///
    /// * `time`, the birth time.
    /// * `population`, the population where the node is found.
    ///
    /// The node is not associated with an individual.
    /// See [`TableCollection::add_node_with_flags`] for that.
    ///
    /// # Example
    ///
    /// ```
    /// let mut tables = coalrustts_tables_trees::TableCollection::new(100).unwrap();
    /// let id = tables.add_node(1., 0).unwrap();
    /// assert_eq!(id, 0);
    /// ```
    pub fn add_node<T: Into<Time>, P: Into<PopulationId> + Copy>(
        &mut self,
        time: T,
        population: P,
    ) -> TablesResult<NodeId> {
        self.add_node_with_flags(
            time,
            population,
            IndividualId::NULL,
            NodeFlags::default().bits(),
        )
    }

    /// Add a [``Node``] to the [``NodeTable``] with
    /// an individual and flags set.
    ///
    /// # Parameters
    ///
    /// * `time`: the birth time.
    /// * `population`: the population where the node is found.
    /// * `individual`: the individual the node belongs to,
    ///   or [`IndividualId::NULL`].
    /// * `flags`: node flags.  See [`NodeFlags`].
    ///
    /// # Side effects
    ///
    /// Adding a node invalidates current table indexes.
    pub fn add_node_with_flags<T: Into<Time>, P: Into<PopulationId> + Copy>(
        &mut self,
        time: T,
        population: P,
        individual: IndividualId,
        flags: u32,
    ) -> TablesResult<NodeId> {
        self.is_indexed = false;
        node_table_add_row(
            &mut self.nodes_,
            time.into(),
            population.into(),
            individual,
            flags,
        )
    }

    /// Add an [``Edge``] to the [``EdgeTable``].
    ///
    /// # Parameters
    ///
    /// * `left`, the left end of the edge
    /// * `right`, the right end of the edge
    /// * `parent`, the parent of the edge
    /// * `child`, the child of the edge
    ///
    /// # Side effects
    ///
    /// Adding an edge invalidates current table indexes.
    ///
    /// # Errors
    ///
    /// Will return [``TablesError``] if any of the input
    /// are invalid.
    ///
    /// # Example
    ///
    /// ```
    /// let mut tables = coalrustts_tables_trees::TableCollection::new(100).unwrap();
    /// let id = tables.add_edge(0, 3, 5, 9).unwrap();
    /// assert_eq!(id, 0);
    /// ```
    pub fn add_edge<L: Into<Position>, R: Into<Position>, P: Into<NodeId>, C: Into<NodeId>>(
        &mut self,
        left: L,
        right: R,
        parent: P,
        child: C,
    ) -> TablesResult<EdgeId> {
        self.is_indexed = false;
        edge_table_add_row(
            &mut self.edges_,
            left.into(),
            right.into(),
            parent.into(),
            child.into(),
        )
    }

    /// Add a [``Site``] to the [``SiteTable``];
    ///
    /// # Parameters
    ///
    /// * `position`, the mutation position.
    /// * `ancestral_state`, the ancestral state at this site.
    ///
    /// # Notes
    ///
    /// If no `ancestral_state` is provided ([``None``]), then
    /// client code is assumed to have some default in mind.
    ///
    /// # Errors
    ///
    /// Will return [``TablesError``] if the position is out
    /// of range.
    pub fn add_site<P: Into<Position>, A: Into<Option<Vec<u8>>>>(
        &mut self,
        position: P,
        ancestral_state: A,
    ) -> TablesResult<SiteId> {
        let p = position.into();
        if p >= self.length_ || p.0 < 0 {
            return Err(TablesError::InvalidPosition { found: p });
        }
        site_table_add_row(&mut self.sites_, p, ancestral_state.into())
    }

    /// Add a [``MutationRecord``] to the [``MutationTable``]
    /// without metadata.
    ///
    /// # Parameters
    ///
    /// * `site`, the id of the mutation's [``Site``].
    /// * `node`, the node where the mutation maps.
    /// * `time`, the origin time of the mutation.
    /// * `derived_state`, the derived state of the variant.
    ///
    /// # Example
    ///
    /// ```
    /// let mut tables = coalrustts_tables_trees::TableCollection::new(100).unwrap();
    /// let site = tables.add_site(3, None).unwrap();
    /// let id = tables.add_mutation(site, 0, 0.5, Some(b"G".to_vec())).unwrap();
    /// assert_eq!(id, 0);
    /// ```
    pub fn add_mutation<S: Into<SiteId>, N: Into<NodeId>, T: Into<Time>, D: Into<Option<Vec<u8>>>>(
        &mut self,
        site: S,
        node: N,
        time: T,
        derived_state: D,
    ) -> TablesResult<MutationId> {
        mutation_table_add_row(
            &mut self.mutations_,
            node.into(),
            site.into(),
            time.into(),
            derived_state.into(),
            None,
        )
    }

    /// Add a [``MutationRecord``] with metadata.
    ///
    /// The metadata is encoded via
    /// [`coalrustts_metadata::MetadataRoundtrip`]
    /// and stored as an opaque payload.
    pub fn add_mutation_with_metadata<
        S: Into<SiteId>,
        N: Into<NodeId>,
        T: Into<Time>,
        D: Into<Option<Vec<u8>>>,
        M: MutationMetadata,
    >(
        &mut self,
        site: S,
        node: N,
        time: T,
        derived_state: D,
        metadata: &M,
    ) -> TablesResult<MutationId> {
        let md = metadata.encode()?;
        mutation_table_add_row(
            &mut self.mutations_,
            node.into(),
            site.into(),
            time.into(),
            derived_state.into(),
            Some(md),
        )
    }

    /// Add a row to the [``PopulationTable``].
    pub fn add_population(&mut self) -> TablesResult<PopulationId> {
        self.populations_.push(PopulationRecord { metadata: None });
        Ok(PopulationId::from(self.populations_.len() - 1))
    }

    /// Add a row with metadata to the [``PopulationTable``].
    pub fn add_population_with_metadata<M: PopulationMetadata>(
        &mut self,
        metadata: &M,
    ) -> TablesResult<PopulationId> {
        let md = metadata.encode()?;
        self.populations_.push(PopulationRecord { metadata: Some(md) });
        Ok(PopulationId::from(self.populations_.len() - 1))
    }

    /// Add a row to the [``IndividualTable``].
    ///
    /// # Parameters
    ///
    /// * `flags`, see [`IndividualFlags`].
    /// * `parents`, parent individuals, if known.
    pub fn add_individual(&mut self, flags: u32, parents: &[IndividualId]) -> TablesResult<IndividualId> {
        self.individuals_.push(IndividualRecord {
            flags,
            parents: parents.to_vec(),
            metadata: None,
        });
        Ok(IndividualId::from(self.individuals_.len() - 1))
    }

    /// Add a row with metadata to the [``IndividualTable``].
    pub fn add_individual_with_metadata<M: IndividualMetadata>(
        &mut self,
        flags: u32,
        parents: &[IndividualId],
        metadata: &M,
    ) -> TablesResult<IndividualId> {
        let md = metadata.encode()?;
        self.individuals_.push(IndividualRecord {
            flags,
            parents: parents.to_vec(),
            metadata: Some(md),
        });
        Ok(IndividualId::from(self.individuals_.len() - 1))
    }

    /// Add a row to the [``ProvenanceTable``].
    ///
    /// The time stamp is generated here, in RFC 3339 format.
    ///
    /// By convention, `record` is a JSON document describing
    /// the provenance of the data.
    ///
    /// # Errors
    ///
    /// [`TablesError::EmptyProvenanceRecord`] if `record` is empty.
    pub fn add_provenance(&mut self, record: &str) -> TablesResult<ProvenanceId> {
        if record.is_empty() {
            return Err(TablesError::EmptyProvenanceRecord);
        }
        let timestamp = humantime::format_rfc3339(std::time::SystemTime::now()).to_string();
        self.provenances_.push(ProvenanceRecord {
            timestamp,
            record: record.to_string(),
        });
        Ok(ProvenanceId::from(self.provenances_.len() - 1))
    }

    /// Decode the metadata for the i-th [``MutationRecord``].
    ///
    /// Returns `Ok(None)` if the row does not exist or carries
    /// no metadata.
    ///
    /// # Errors
    ///
    /// [`MetadataError`] if the payload cannot be decoded as `M`.
    pub fn mutation_metadata<M: MutationMetadata, I: Into<MutationId>>(
        &self,
        row: I,
    ) -> Result<Option<M>, MetadataError> {
        decode_row_metadata::<M>(
            self.mutations_
                .get(usize::from(row.into()))
                .and_then(|r| r.metadata.as_deref()),
        )
    }

    /// Decode the metadata for the i-th [``IndividualRecord``].
    ///
    /// Returns `Ok(None)` if the row does not exist or carries
    /// no metadata.
    pub fn individual_metadata<M: IndividualMetadata, I: Into<IndividualId>>(
        &self,
        row: I,
    ) -> Result<Option<M>, MetadataError> {
        decode_row_metadata::<M>(
            self.individuals_
                .get(usize::from(row.into()))
                .and_then(|r| r.metadata.as_deref()),
        )
    }

    /// Decode the metadata for the i-th [``PopulationRecord``].
    ///
    /// Returns `Ok(None)` if the row does not exist or carries
    /// no metadata.
    pub fn population_metadata<M: PopulationMetadata, I: Into<PopulationId>>(
        &self,
        row: I,
    ) -> Result<Option<M>, MetadataError> {
        decode_row_metadata::<M>(
            self.populations_
                .get(usize::from(row.into()))
                .and_then(|r| r.metadata.as_deref()),
        )
    }

    /// Get genome length
    pub fn genome_length(&self) -> Position {
        self.length_
    }

    /// Return immutable reference to the [mutation table](type.MutationTable.html)
    pub fn mutations(&self) -> &[MutationRecord] {
        &self.mutations_
    }

    /// Return immutable reference to the [edge table](type.EdgeTable.html)
    pub fn edges(&self) -> &[Edge] {
        &self.edges_
    }

    /// Return number of edges
    pub fn num_edges(&self) -> usize {
        self.edges_.len()
    }

    /// Return number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes_.len()
    }

    /// Return immutable reference to [node table](type.NodeTable.html)
    pub fn nodes(&self) -> &[Node] {
        &self.nodes_
    }

    /// Return the i-th [``Node``].
    pub fn node<N: Into<NodeId>>(&self, i: N) -> &Node {
        &self.nodes_[i.into().0 as usize]
    }

    /// Return the i-th [``Edge``].
    pub fn edge<E: Into<EdgeId>>(&self, i: E) -> &Edge {
        &self.edges_[i.into().0 as usize]
    }

    /// Return the i-th [``Site``].
    pub fn site<S: Into<SiteId>>(&self, i: S) -> &Site {
        &self.sites_[i.into().0 as usize]
    }

    /// Return the i-th [``MutationRecord``].
    pub fn mutation<M: Into<MutationId>>(&self, i: M) -> &MutationRecord {
        &self.mutations_[i.into().0 as usize]
    }

    /// Return the i-th [``PopulationRecord``],
    /// or `None` if out of range.
    pub fn population<P: Into<PopulationId>>(&self, i: P) -> Option<&PopulationRecord> {
        self.populations_.get(usize::from(i.into()))
    }

    /// Return the i-th [``IndividualRecord``],
    /// or `None` if out of range.
    pub fn individual<I: Into<IndividualId>>(&self, i: I) -> Option<&IndividualRecord> {
        self.individuals_.get(usize::from(i.into()))
    }

    /// Return the i-th [``ProvenanceRecord``],
    /// or `None` if out of range.
    pub fn provenance<P: Into<ProvenanceId>>(&self, i: P) -> Option<&ProvenanceRecord> {
        self.provenances_.get(usize::from(i.into()))
    }

    /// Return immutable reference to [site table](type.SiteTable.html)
    pub fn sites(&self) -> &[Site] {
        &self.sites_
    }

    /// Return immutable reference to the [population table](type.PopulationTable.html)
    pub fn populations(&self) -> &[PopulationRecord] {
        &self.populations_
    }

    /// Return immutable reference to the [individual table](type.IndividualTable.html)
    pub fn individuals(&self) -> &[IndividualRecord] {
        &self.individuals_
    }

    /// Return immutable reference to the [provenance table](type.ProvenanceTable.html)
    pub fn provenances(&self) -> &[ProvenanceRecord] {
        &self.provenances_
    }

    /// Provide an enumeration over the [node table](type.NodeTable.html)
    pub fn enumerate_nodes(&self) -> std::iter::Enumerate<std::slice::Iter<Node>> {
        self.nodes_.iter().enumerate()
    }

    /// Provide an enumeration over the [edge table](type.EdgeTable.html)
    pub fn enumerate_edges(&self) -> std::iter::Enumerate<std::slice::Iter<Edge>> {
        self.edges_.iter().enumerate()
    }

    /// Provide an enumeration over the [mutation table](type.MutationTable.html)
    pub fn enumerate_mutations(&self) -> std::iter::Enumerate<std::slice::Iter<MutationRecord>> {
        self.mutations_.iter().enumerate()
    }

    /// Provide an enumeration over the [site table](type.SiteTable.html)
    pub fn enumerate_sites(&self) -> std::iter::Enumerate<std::slice::Iter<Site>> {
        self.sites_.iter().enumerate()
    }

    /// Provide an enumeration over the [population table](type.PopulationTable.html)
    pub fn enumerate_populations(
        &self,
    ) -> std::iter::Enumerate<std::slice::Iter<PopulationRecord>> {
        self.populations_.iter().enumerate()
    }

    /// Provide an enumeration over the [individual table](type.IndividualTable.html)
    pub fn enumerate_individuals(
        &self,
    ) -> std::iter::Enumerate<std::slice::Iter<IndividualRecord>> {
        self.individuals_.iter().enumerate()
    }

    /// Sort all tables for indexing/tree building.
    pub fn sort_tables(&mut self, flags: TableSortingFlags) {
        if !flags.contains(TableSortingFlags::SKIP_EDGE_TABLE) {
            sort_edges(&self.nodes_, &mut self.edges_);
        }
        sort_mutation_table(&self.sites_, &mut self.mutations_);
        let mut sites: SiteTable = vec![];
        for m in self.mutations_.iter_mut() {
            record_site(&self.sites_, m, &mut sites);
        }
        std::mem::swap(&mut self.sites_, &mut sites);
    }

    /// Run a validation check on the tables.
    pub fn validate(&self, flags: TableValidationFlags) -> TablesResult<bool> {
        if flags.contains(TableValidationFlags::VALIDATE_EDGES) {
            validate_edge_table(self.genome_length(), &self.edges_, &self.nodes_)?;
        }
        if flags.contains(TableValidationFlags::VALIDATE_NODES) {
            validate_node_table(self.nodes(), self.individuals_.len())?;
        }
        if flags.contains(TableValidationFlags::VALIDATE_SITES) {
            validate_site_table(self.genome_length(), self.sites())?;
        }
        if flags.contains(TableValidationFlags::VALIDATE_MUTATIONS) {
            validate_mutation_table(self.mutations(), self.sites(), self.nodes())?;
        }
        Ok(true)
    }

    // SAFETY: the bounds are guaranteed by build_indexes
    fn sort_edge_output_order(edges: &[Edge], nodes: &[Node], edge_output_order: &mut Vec<usize>) {
        edge_output_order.sort_by(|a, b| {
            let ea = unsafe { edges.get_unchecked(*a) };
            let eb = unsafe { edges.get_unchecked(*b) };
            if ea.right == eb.right {
                let ta = unsafe { *nodes.get_unchecked(ea.parent.0 as usize) }.time;
                let tb = unsafe { *nodes.get_unchecked(eb.parent.0 as usize) }.time;
                match ta.partial_cmp(&tb) {
                    Some(x) => match x {
                        std::cmp::Ordering::Greater => std::cmp::Ordering::Greater,
                        std::cmp::Ordering::Less => std::cmp::Ordering::Less,
                        std::cmp::Ordering::Equal => match ea.parent.cmp(&eb.parent).reverse() {
                            std::cmp::Ordering::Equal => ea.child.cmp(&eb.child).reverse(),
                            std::cmp::Ordering::Greater => std::cmp::Ordering::Greater,
                            std::cmp::Ordering::Less => std::cmp::Ordering::Less,
                        },
                    },
                    None => panic!("invalid parent times"),
                }
            } else {
                ea.right.cmp(&eb.right)
            }
        });
    }

    // SAFETY: the bounds are guaranteed by build_indexes
    fn sort_edge_input_order(edges: &[Edge], nodes: &[Node], edge_input_order: &mut Vec<usize>) {
        edge_input_order.sort_by(|a, b| {
            let ea = unsafe { edges.get_unchecked(*a) };
            let eb = unsafe { edges.get_unchecked(*b) };
            if ea.left == eb.left {
                let ta = unsafe { *nodes.get_unchecked(ea.parent.0 as usize) }.time;
                let tb = unsafe { *nodes.get_unchecked(eb.parent.0 as usize) }.time;
                match ta.partial_cmp(&tb) {
                    Some(x) => match x.reverse() {
                        std::cmp::Ordering::Greater => std::cmp::Ordering::Greater,
                        std::cmp::Ordering::Less => std::cmp::Ordering::Less,
                        std::cmp::Ordering::Equal => match ea.parent.cmp(&eb.parent) {
                            std::cmp::Ordering::Equal => ea.child.cmp(&eb.child),
                            std::cmp::Ordering::Greater => std::cmp::Ordering::Greater,
                            std::cmp::Ordering::Less => std::cmp::Ordering::Less,
                        },
                    },
                    None => panic!("invalid parent times"),
                }
            } else {
                ea.left.cmp(&eb.left)
            }
        });
    }

    /// Build table indexes
    ///
    /// # Parameters
    ///
    /// * `flags`, see [`IndexTablesFlags`].
    ///
    /// # Errors
    ///
    /// [`TablesError`] if the input data are invalid.
    pub fn build_indexes(&mut self, flags: IndexTablesFlags) -> TablesResult<()> {
        if self.edges_.is_empty() {
            self.is_indexed = false;
            return Ok(());
        }
        if !flags.contains(IndexTablesFlags::NO_VALIDATION) {
            validate_edge_table(self.genome_length(), &self.edges_, &self.nodes_)?;
        }
        self.edge_input_order.clear();
        self.edge_output_order.clear();
        for (i, e) in self.edges_.iter().enumerate() {
            if e.parent == NodeId::NULL {
                return Err(TablesError::NullParent);
            }
            if e.child == NodeId::NULL {
                return Err(TablesError::NullChild);
            }
            if e.parent >= self.nodes_.len() as TablesIdInteger {
                return Err(TablesError::NodeOutOfBounds);
            }
            if e.child >= self.nodes_.len() as TablesIdInteger {
                return Err(TablesError::NodeOutOfBounds);
            }
            self.edge_input_order.push(i);
            self.edge_output_order.push(i);
        }
        Self::sort_edge_input_order(&self.edges_, &self.nodes_, &mut self.edge_input_order);
        Self::sort_edge_output_order(&self.edges_, &self.nodes_, &mut self.edge_output_order);
        self.is_indexed = true;
        Ok(())
    }

    /// Get the edge input order.
    ///
    /// The input order is generated by [`TableCollection::build_indexes`].
    ///
    /// Returns `None` if `self.is_indexed() == false`.
    pub fn edge_input_order(&self) -> Option<&[usize]> {
        if self.is_indexed {
            Some(&self.edge_input_order)
        } else {
            None
        }
    }

    /// Get the edge output order.
    ///
    /// The output order is generated by [`TableCollection::build_indexes`].
    ///
    /// Returns `None` if `self.is_indexed() == false`.
    pub fn edge_output_order(&self) -> Option<&[usize]> {
        if self.is_indexed {
            Some(&self.edge_output_order)
        } else {
            None
        }
    }

    /// Return `true` if tables are indexed, `false` otherwise.
    pub fn is_indexed(&self) -> bool {
        self.is_indexed
    }

    /// Count number of trees in O(E) time, where E
    /// is length of edge table.
    ///
    /// # Errors
    ///
    /// [`TablesError::TablesNotIndexed`] if tables are not indexed
    ///
    /// # Panics
    ///
    /// If the edge table is invalid in any way, a `panic!` may occur.
    /// To check table validity, call [`TableCollection::validate`].
    pub fn count_trees(&self) -> TablesResult<u32> {
        if !self.is_indexed() {
            Err(TablesError::TablesNotIndexed)
        } else {
            let mut num_trees = 0;
            let mut input_index: usize = 0;
            let mut output_index: usize = 0;
            let input = self.edge_input_order.as_slice();
            let output = self.edge_output_order.as_slice();
            let edges = self.edges_.as_slice();

            let mut tree_left = Position(0);
            while input_index < input.len() || tree_left < self.genome_length() {
                for idx in output[output_index..].iter() {
                    if edges[*idx].right != tree_left {
                        break;
                    }
                    output_index += 1;
                }
                for idx in input[input_index..].iter() {
                    if edges[*idx].left != tree_left {
                        break;
                    }
                    input_index += 1;
                }
                let mut tree_right = self.genome_length();
                if input_index < input.len() {
                    tree_right = std::cmp::min(tree_right, edges[input[input_index]].left);
                }
                if output_index < output.len() {
                    tree_right = std::cmp::min(tree_right, edges[output[output_index]].right);
                }
                tree_left = tree_right;
                num_trees += 1;
            }
            Ok(num_trees)
        }
    }
}

fn decode_row_metadata<M: MetadataRoundtrip>(md: Option<&[u8]>) -> Result<Option<M>, MetadataError> {
    match md {
        Some(bytes) => Ok(Some(M::decode(bytes)?)),
        None => Ok(None),
    }
}


#[cfg(test)]
mod test_metadata_columns {
    use super::*;

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct MutationData {
        effect_size: f64,
        dominance: f64,
    }

    coalrustts_metadata::serde_bincode_metadata!(MutationData);

    impl MutationMetadata for MutationData {}

    #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
    struct PopulationName {
        name: String,
    }

    coalrustts_metadata::serde_json_metadata!(PopulationName);

    impl PopulationMetadata for PopulationName {}

    #[test]
    fn test_mutation_metadata_round_trip() {
        let mut tables = TableCollection::new(1000).unwrap();
        let m = MutationData {
            effect_size: -0.235423,
            dominance: 0.5,
        };
        let site = tables.add_site(0, None).unwrap();
        tables
            .add_mutation_with_metadata(site, 0, 0.0, None, &m)
            .unwrap();

        let decoded = tables
            .mutation_metadata::<MutationData, _>(0)
            .unwrap()
            .unwrap();
        assert!((m.effect_size - decoded.effect_size).abs() < f64::EPSILON);
        assert!((m.dominance - decoded.dominance).abs() < f64::EPSILON);
    }

    #[test]
    fn test_population_metadata_round_trip() {
        let mut tables = TableCollection::new(10).unwrap();
        let pop = tables
            .add_population_with_metadata(&PopulationName {
                name: "YRB".to_string(),
            })
            .unwrap();
        let decoded = tables
            .population_metadata::<PopulationName, _>(pop)
            .unwrap()
            .unwrap();
        assert_eq!(decoded.name, "YRB");
    }

    #[test]
    fn test_population_display_renders_metadata() {
        let mut tables = TableCollection::new(10).unwrap();
        let pop = tables
            .add_population_with_metadata(&PopulationName {
                name: "CEU".to_string(),
            })
            .unwrap();
        let printed = format!("{}", tables.population(pop).unwrap());
        assert!(printed.contains("CEU"));
    }

    #[test]
    fn test_metadata_missing_row_is_none() {
        let tables = TableCollection::new(10).unwrap();
        assert!(tables
            .mutation_metadata::<MutationData, _>(17)
            .unwrap()
            .is_none());
    }
}
