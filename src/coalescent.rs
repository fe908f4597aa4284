//! Backwards-in-time simulation of ancestral histories.
//!
//! [`sim_ancestry`] implements the Hudson coalescent with
//! recombination for a single population of constant size,
//! recording the output as a
//! [`TreeSequence`](coalrustts_tables_trees::TreeSequence).
//!
//! Times are recorded following the library convention that time
//! moves from the past to the present: sampled nodes are at time 0
//! and their ancestors have negative times.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Exp;

use coalrustts_tables_trees::{
    IndexTablesFlags, NodeFlags, NodeId, PopulationId, PositionLLType, TableCollection,
    TableSortingFlags, TableValidationFlags, Time, TreeSequence, TreeSequenceFlags,
};

use crate::error::CoalrusttsError;

/// Parameters for [`sim_ancestry`].
#[derive(Copy, Clone, Debug)]
pub struct AncestryParams {
    /// Number of diploid individuals to sample.
    /// Each individual contributes two sample nodes.
    pub num_samples: u32,
    /// Genome length.
    pub sequence_length: PositionLLType,
    /// Recombination rate per link per generation.
    pub recombination_rate: f64,
    /// The diploid population size.
    pub population_size: u32,
    /// Random number seed.
    pub seed: u64,
}

impl AncestryParams {
    fn validate(&self) -> Result<(), CoalrusttsError> {
        if self.num_samples < 1 {
            return Err(CoalrusttsError::InvalidParameter {
                value: format!("num_samples = {} must be > 0", self.num_samples),
            });
        }
        if self.sequence_length < 1 {
            return Err(CoalrusttsError::InvalidParameter {
                value: format!("sequence_length = {} must be > 0", self.sequence_length),
            });
        }
        if !self.recombination_rate.is_finite() || self.recombination_rate < 0.0 {
            return Err(CoalrusttsError::InvalidParameter {
                value: format!(
                    "recombination_rate = {} must be non-negative",
                    self.recombination_rate
                ),
            });
        }
        if self.population_size < 1 {
            return Err(CoalrusttsError::InvalidParameter {
                value: format!("population_size = {} must be > 0", self.population_size),
            });
        }
        Ok(())
    }
}

/// A chunk of genome `[left, right)` that is ancestral
/// to `num_samples` of the sampled nodes, currently
/// mapping to `node`.
#[derive(Copy, Clone, Debug)]
struct AncestrySegment {
    left: PositionLLType,
    right: PositionLLType,
    node: NodeId,
    num_samples: u32,
}

/// An extant lineage: a non-empty list of
/// [`AncestrySegment`], sorted by position and
/// non-overlapping.
#[derive(Debug)]
struct Lineage {
    segments: VecDeque<AncestrySegment>,
}

impl Lineage {
    fn new_sample(node: NodeId, sequence_length: PositionLLType) -> Self {
        let mut segments = VecDeque::new();
        segments.push_back(AncestrySegment {
            left: 0,
            right: sequence_length,
            node,
            num_samples: 1,
        });
        Self { segments }
    }

    /// Number of positions at which a recombination
    /// event would split this lineage.
    fn num_links(&self) -> i64 {
        match (self.segments.front(), self.segments.back()) {
            (Some(head), Some(tail)) => tail.right - head.left - 1,
            _ => 0,
        }
    }

    /// Split at `breakpoint`, leaving material to the left
    /// in `self` and returning the material to the right.
    ///
    /// The breakpoint must satisfy
    /// `head.left < breakpoint < tail.right`, so both
    /// halves are non-empty.
    fn split(&mut self, breakpoint: PositionLLType) -> Lineage {
        let mut right_segments = VecDeque::new();
        while let Some(seg) = self.segments.back_mut() {
            if seg.right <= breakpoint {
                break;
            }
            if seg.left >= breakpoint {
                let seg = *seg;
                self.segments.pop_back();
                right_segments.push_front(seg);
            } else {
                // straddler
                right_segments.push_front(AncestrySegment {
                    left: breakpoint,
                    ..*seg
                });
                seg.right = breakpoint;
                break;
            }
        }
        Lineage {
            segments: right_segments,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct BufferedEdge {
    left: PositionLLType,
    right: PositionLLType,
    parent: NodeId,
    child: NodeId,
}

/// Merge two lineages at time `time` (an age, in generations
/// before the present).
///
/// Overlapping intervals coalesce into a new node, recording
/// edges for both children.  Intervals ancestral to all samples
/// are dropped.  Returns `None` if no ancestral material remains.
fn merge_lineages(
    mut x: Lineage,
    mut y: Lineage,
    time: f64,
    total_samples: u32,
    population: PopulationId,
    tables: &mut TableCollection,
    edges: &mut Vec<BufferedEdge>,
) -> Result<Option<Lineage>, CoalrusttsError> {
    let mut merged = VecDeque::new();
    let mut parent: Option<NodeId> = None;

    loop {
        let (a, b) = match (x.segments.front_mut(), y.segments.front_mut()) {
            (Some(a), Some(b)) => (a, b),
            (Some(_), None) => {
                merged.append(&mut x.segments);
                break;
            }
            (None, Some(_)) => {
                merged.append(&mut y.segments);
                break;
            }
            (None, None) => break,
        };
        if a.right <= b.left {
            let a = *a;
            x.segments.pop_front();
            merged.push_back(a);
        } else if b.right <= a.left {
            let b = *b;
            y.segments.pop_front();
            merged.push_back(b);
        } else if a.left < b.left {
            merged.push_back(AncestrySegment { right: b.left, ..*a });
            a.left = b.left;
        } else if b.left < a.left {
            merged.push_back(AncestrySegment { right: a.left, ..*b });
            b.left = a.left;
        } else {
            // a.left == b.left: coalescence over [left, right)
            let left = a.left;
            let right = std::cmp::min(a.right, b.right);
            let p = match parent {
                Some(p) => p,
                None => {
                    let p = tables.add_node(Time::from(-time), population)?;
                    parent = Some(p);
                    p
                }
            };
            edges.push(BufferedEdge {
                left,
                right,
                parent: p,
                child: a.node,
            });
            edges.push(BufferedEdge {
                left,
                right,
                parent: p,
                child: b.node,
            });
            let num_samples = a.num_samples + b.num_samples;
            if num_samples < total_samples {
                merged.push_back(AncestrySegment {
                    left,
                    right,
                    node: p,
                    num_samples,
                });
            }
            if a.right == right {
                x.segments.pop_front();
            } else {
                a.left = right;
            }
            if b.right == right {
                y.segments.pop_front();
            } else {
                b.left = right;
            }
        }
    }

    if merged.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Lineage { segments: merged }))
    }
}

/// Collapse runs of adjacent recorded edges with the same
/// parent and child into single edges, then add them to
/// the tables.
fn squash_and_record_edges(
    mut edges: Vec<BufferedEdge>,
    tables: &mut TableCollection,
) -> Result<(), CoalrusttsError> {
    edges.sort_by_key(|e| (e.parent, e.child, e.left));
    let mut squashed: Vec<BufferedEdge> = vec![];
    for e in edges {
        match squashed.last_mut() {
            Some(last) if last.parent == e.parent && last.child == e.child && last.right == e.left => {
                last.right = e.right;
            }
            _ => squashed.push(e),
        }
    }
    for e in squashed {
        tables.add_edge(e.left, e.right, e.parent, e.child)?;
    }
    Ok(())
}

fn exponential_deviate(rng: &mut StdRng, rate: f64) -> Result<f64, CoalrusttsError> {
    let exp = Exp::new(rate).map_err(|e| CoalrusttsError::SimulationError {
        value: format!("invalid exponential rate {}: {}", rate, e),
    })?;
    Ok(rng.sample(exp))
}

/// Simulate the ancestral history of a sample under the
/// Hudson coalescent with recombination.
///
/// A single population of constant diploid size
/// [`population_size`](AncestryParams::population_size)
/// is simulated backwards in time until all sampled genomes
/// have fully coalesced.
///
/// The output tables contain:
///
/// * one population,
/// * one individual per sampled diploid,
/// * two sample nodes per individual, at time 0,
/// * one node per common ancestor event, at negative times,
/// * the corresponding edges, squashed, sorted, and indexed.
///
/// # Errors
///
/// [`CoalrusttsError::InvalidParameter`] if `params` fails
/// validation.
///
/// # Example
///
/// ```
/// let params = coalrustts::AncestryParams {
///     num_samples: 10,
///     sequence_length: 1_000_000,
///     recombination_rate: 0.0,
///     population_size: 100,
///     seed: 54321,
/// };
/// let ts = coalrustts::sim_ancestry(&params).unwrap();
/// assert_eq!(ts.num_trees(), 1);
/// assert_eq!(ts.sample_nodes().len(), 20);
/// ```
pub fn sim_ancestry(params: &AncestryParams) -> Result<TreeSequence, CoalrusttsError> {
    params.validate()?;

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut tables = TableCollection::new(params.sequence_length)?;
    let population = tables.add_population()?;

    let total_samples = 2 * params.num_samples;
    let mut lineages: Vec<Lineage> = vec![];
    for _ in 0..params.num_samples {
        let individual = tables.add_individual(0, &[])?;
        for _ in 0..2 {
            let node = tables.add_node_with_flags(
                0.,
                population,
                individual,
                NodeFlags::IS_SAMPLE.bits(),
            )?;
            lineages.push(Lineage::new_sample(node, params.sequence_length));
        }
    }

    let mut edges: Vec<BufferedEdge> = vec![];
    let mut time = 0.0_f64;
    let four_n = 4.0 * f64::from(params.population_size);

    while lineages.len() > 1 {
        let k = lineages.len() as f64;
        let coalescence_rate = k * (k - 1.0) / four_n;
        let total_links: i64 = lineages.iter().map(Lineage::num_links).sum();
        let recombination_rate = params.recombination_rate * total_links as f64;

        let dt_coalescence = exponential_deviate(&mut rng, coalescence_rate)?;
        let dt_recombination = if recombination_rate > 0.0 {
            exponential_deviate(&mut rng, recombination_rate)?
        } else {
            f64::INFINITY
        };

        if dt_coalescence <= dt_recombination {
            time += dt_coalescence;
            let i = rng.gen_range(0..lineages.len());
            let mut j = rng.gen_range(0..lineages.len() - 1);
            if j >= i {
                j += 1;
            }
            let (first, second) = if i < j { (i, j) } else { (j, i) };
            let y = lineages.swap_remove(second);
            let x = lineages.swap_remove(first);
            if let Some(merged) = merge_lineages(
                x,
                y,
                time,
                total_samples,
                population,
                &mut tables,
                &mut edges,
            )? {
                lineages.push(merged);
            }
        } else {
            time += dt_recombination;
            // choose a lineage weighted by its number of links
            let mut u = rng.gen_range(0..total_links);
            let mut chosen: Option<usize> = None;
            for (idx, lineage) in lineages.iter().enumerate() {
                let links = lineage.num_links();
                if u < links {
                    chosen = Some(idx);
                    break;
                }
                u -= links;
            }
            let idx = match chosen {
                Some(idx) => idx,
                None => {
                    return Err(CoalrusttsError::SimulationError {
                        value: "failed to sample a recombining lineage".to_string(),
                    })
                }
            };
            let breakpoint = match lineages[idx].segments.front() {
                Some(head) => head.left + 1 + u,
                None => {
                    return Err(CoalrusttsError::SimulationError {
                        value: "empty lineage".to_string(),
                    })
                }
            };
            let right_half = lineages[idx].split(breakpoint);
            lineages.push(right_half);
        }
    }

    squash_and_record_edges(edges, &mut tables)?;
    tables.sort_tables(TableSortingFlags::empty());
    tables.validate(TableValidationFlags::default())?;
    tables.build_indexes(IndexTablesFlags::default())?;
    // tables were just validated
    TreeSequence::new(tables, TreeSequenceFlags::NO_TABLE_VALIDATION).map_err(|e| {
        CoalrusttsError::SimulationError {
            value: e.to_string(),
        }
    })
}

#[cfg(test)]
mod test_lineage {
    use super::*;

    fn make_lineage(intervals: &[(i64, i64)]) -> Lineage {
        let mut segments = VecDeque::new();
        for (i, (left, right)) in intervals.iter().enumerate() {
            segments.push_back(AncestrySegment {
                left: *left,
                right: *right,
                node: NodeId::from(i),
                num_samples: 1,
            });
        }
        Lineage { segments }
    }

    #[test]
    fn test_num_links() {
        let lineage = make_lineage(&[(0, 100)]);
        assert_eq!(lineage.num_links(), 99);
        let lineage = make_lineage(&[(0, 10), (90, 100)]);
        assert_eq!(lineage.num_links(), 99);
        let lineage = make_lineage(&[(5, 6)]);
        assert_eq!(lineage.num_links(), 0);
    }

    #[test]
    fn test_split_within_segment() {
        let mut lineage = make_lineage(&[(0, 100)]);
        let right = lineage.split(40);
        assert_eq!(lineage.segments.len(), 1);
        assert_eq!(right.segments.len(), 1);
        assert_eq!(lineage.segments[0].right, 40);
        assert_eq!(right.segments[0].left, 40);
        assert_eq!(right.segments[0].right, 100);
    }

    #[test]
    fn test_split_in_gap() {
        let mut lineage = make_lineage(&[(0, 10), (90, 100)]);
        let right = lineage.split(50);
        assert_eq!(lineage.segments.len(), 1);
        assert_eq!(right.segments.len(), 1);
        assert_eq!(lineage.segments[0].right, 10);
        assert_eq!(right.segments[0].left, 90);
    }

    #[test]
    fn test_split_at_segment_boundary() {
        let mut lineage = make_lineage(&[(0, 10), (10, 100)]);
        let right = lineage.split(10);
        assert_eq!(lineage.segments.len(), 1);
        assert_eq!(right.segments.len(), 1);
        assert_eq!(lineage.segments[0].right, 10);
        assert_eq!(right.segments[0].left, 10);
    }
}

#[cfg(test)]
mod test_merge {
    use super::*;

    fn sample_lineage(tables: &mut TableCollection, length: i64) -> Lineage {
        let node = tables
            .add_node_with_flags(
                0.,
                0,
                coalrustts_tables_trees::IndividualId::NULL,
                NodeFlags::IS_SAMPLE.bits(),
            )
            .unwrap();
        Lineage::new_sample(node, length)
    }

    #[test]
    fn test_merge_two_samples_fully_coalesces() {
        let mut tables = TableCollection::new(100).unwrap();
        tables.add_population().unwrap();
        let x = sample_lineage(&mut tables, 100);
        let y = sample_lineage(&mut tables, 100);
        let mut edges = vec![];
        let result = merge_lineages(
            x,
            y,
            1.0,
            2,
            PopulationId::from(0),
            &mut tables,
            &mut edges,
        )
        .unwrap();
        // both samples coalesced everywhere: MRCA reached
        assert!(result.is_none());
        assert_eq!(edges.len(), 2);
        assert_eq!(tables.num_nodes(), 3);
        assert_eq!(f64::from(tables.node(2).time), -1.0);
    }

    #[test]
    fn test_merge_disjoint_material_creates_no_node() {
        let mut tables = TableCollection::new(100).unwrap();
        tables.add_population().unwrap();
        let mut x = sample_lineage(&mut tables, 100);
        let mut y = sample_lineage(&mut tables, 100);
        let y_right = y.split(50);
        drop(y);
        let _ = x.split(50);
        // x holds [0, 50), y_right holds [50, 100)
        let mut edges = vec![];
        let result = merge_lineages(
            x,
            y_right,
            1.0,
            4,
            PopulationId::from(0),
            &mut tables,
            &mut edges,
        )
        .unwrap();
        let merged = result.unwrap();
        assert_eq!(merged.segments.len(), 2);
        assert!(edges.is_empty());
        // no common ancestor node was needed
        assert_eq!(tables.num_nodes(), 2);
    }

    #[test]
    fn test_merge_partial_overlap() {
        let mut tables = TableCollection::new(100).unwrap();
        tables.add_population().unwrap();
        let mut x = sample_lineage(&mut tables, 100);
        let y = sample_lineage(&mut tables, 100);
        let _ = x.split(50);
        // x holds [0, 50), y holds [0, 100)
        let mut edges = vec![];
        let merged = merge_lineages(
            x,
            y,
            2.5,
            4,
            PopulationId::from(0),
            &mut tables,
            &mut edges,
        )
        .unwrap()
        .unwrap();
        // [0, 50) coalesced into a new node, [50, 100) passed through
        assert_eq!(edges.len(), 2);
        assert_eq!(merged.segments.len(), 2);
        assert_eq!(merged.segments[0].num_samples, 2);
        assert_eq!(merged.segments[1].num_samples, 1);
        assert_eq!(tables.num_nodes(), 3);
    }
}
