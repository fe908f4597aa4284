/// The low-level representation
/// of a [``TableId``](crate::traits::TableId)
pub type TablesIdInteger = i32;

/// The low-level representation
/// of a [``Position``].
pub type PositionLLType = i64;

/// The low-level representation
/// of a [``Time``].
pub type TimeLLType = f64;

/// A [``TableId``](crate::traits::TableId) for a node.
///
/// ```
/// use coalrustts_tables_trees::prelude::*;
///
/// let n = NodeId::from(-1);
/// assert_eq!(n, -1);
/// let r = n.into_raw();
/// assert_eq!(r, -1);
/// ```
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    std::hash::Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub(crate) TablesIdInteger);

/// A [``TableId``](crate::traits::TableId) for an edge.
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    std::hash::Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct EdgeId(pub(crate) TablesIdInteger);

/// A [``TableId``](crate::traits::TableId) for a site.
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    std::hash::Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct SiteId(pub(crate) TablesIdInteger);

/// A [``TableId``](crate::traits::TableId) for a mutation.
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    std::hash::Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct MutationId(pub(crate) TablesIdInteger);

/// A [``TableId``](crate::traits::TableId) for a population.
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    std::hash::Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct PopulationId(pub(crate) TablesIdInteger);

/// A [``TableId``](crate::traits::TableId) for an individual.
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    std::hash::Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct IndividualId(pub(crate) TablesIdInteger);

/// A [``TableId``](crate::traits::TableId) for a provenance record.
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    std::hash::Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct ProvenanceId(pub(crate) TablesIdInteger);

impl_table_id!(NodeId);
impl_table_id!(EdgeId);
impl_table_id!(SiteId);
impl_table_id!(MutationId);
impl_table_id!(PopulationId);
impl_table_id!(IndividualId);
impl_table_id!(ProvenanceId);

/// A position/coordinate within a genome
#[repr(transparent)]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    std::hash::Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Position(pub(crate) PositionLLType);

/// A time value.
///
/// Time moves from the past to the present:
/// children have time values *greater than*
/// those of their parents.  Times recorded by a
/// backwards-in-time simulation are therefore
/// negative ages, with samples at time 0.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Time(pub(crate) TimeLLType);

impl Position {
    /// Minimum value
    pub const MIN: Position = Position(PositionLLType::MIN);
    /// Maximum value
    pub const MAX: Position = Position(PositionLLType::MAX);
}

impl Time {
    /// Minimum value
    pub const MIN: Time = Time(TimeLLType::MIN);
    /// Maximum value
    pub const MAX: Time = Time(TimeLLType::MAX);
}

impl crate::traits::TableTypeIntoRaw for Position {
    type RawType = PositionLLType;
    fn into_raw(self) -> Self::RawType {
        self.0
    }
}

impl crate::traits::TableTypeIntoRaw for Time {
    type RawType = TimeLLType;
    fn into_raw(self) -> Self::RawType {
        self.0
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position({})", self.0)
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Time({})", self.0)
    }
}

impl PartialEq<PositionLLType> for Position {
    fn eq(&self, other: &PositionLLType) -> bool {
        self.0 == *other
    }
}

impl PartialEq<Position> for PositionLLType {
    fn eq(&self, other: &Position) -> bool {
        *self == other.0
    }
}

impl PartialOrd<PositionLLType> for Position {
    fn partial_cmp(&self, other: &PositionLLType) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl PartialOrd<Position> for PositionLLType {
    fn partial_cmp(&self, other: &Position) -> Option<std::cmp::Ordering> {
        self.partial_cmp(&other.0)
    }
}

impl From<PositionLLType> for Position {
    fn from(value: PositionLLType) -> Self {
        Self(value)
    }
}

impl From<Position> for PositionLLType {
    fn from(value: Position) -> Self {
        value.0
    }
}

impl From<TimeLLType> for Time {
    fn from(value: TimeLLType) -> Self {
        Self(value)
    }
}

impl From<i64> for Time {
    fn from(value: i64) -> Self {
        Self(value as TimeLLType)
    }
}

impl From<i32> for Time {
    fn from(value: i32) -> Self {
        Self(value as TimeLLType)
    }
}

impl From<Time> for f64 {
    fn from(value: Time) -> Self {
        value.0
    }
}

impl From<Time> for i64 {
    fn from(value: Time) -> Self {
        value.0 as Self
    }
}

impl PartialOrd<Time> for Time {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match self.0.partial_cmp(&other.0) {
            None => panic!("fatal: partial_cmp for Time received non-finite values"),
            Some(x) => Some(x),
        }
    }
}

#[cfg(test)]
mod test_newtypes {
    use super::*;
    use crate::traits::TableId;

    #[test]
    fn test_null_conversions() {
        let n = NodeId::from(-10);
        assert_eq!(n, NodeId::NULL);
        assert!(n.is_null());
        let n = NodeId::from(10_usize);
        assert!(!n.is_null());
        assert_eq!(usize::from(n), 10);
    }

    #[test]
    fn test_position_comparisons() {
        let p = Position::from(11);
        assert_eq!(p, 11);
        assert!(p > 10);
        assert!(10 < p);
        assert_eq!(p + Position::from(1), 12);
        assert_eq!(p - Position::from(1), 10);
    }

    #[test]
    #[should_panic]
    fn test_non_finite_time_comparison() {
        let t = Time::from(f64::NAN);
        let _ = t.partial_cmp(&Time::from(1.0));
    }
}
