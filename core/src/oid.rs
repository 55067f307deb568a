//! Object identifier types.

use itertools::Itertools;
use smallvec::SmallVec;
use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::fmt;
use std::str::FromStr;

/// Inline storage for the node sequence of an identifier.
type Nodes = SmallVec<[u64; 8]>;

/// An error which may occur when constructing an object identifier.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// An object identifier needs at least a root and a second node.
    #[snafu(display("object identifier must have at least 2 nodes, got {}", got))]
    TooShort {
        /// The number of nodes provided.
        got: usize,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// The root node is restricted to the three registration authorities.
    #[snafu(display("first node must be 0, 1 or 2, got {}", got))]
    FirstNodeRange {
        /// The offending node value.
        got: u64,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// Under roots 0 and 1 the second node is restricted to 0 through 39.
    #[snafu(display("second node must be below 40 when the first is {}, got {}", first, got))]
    SecondNodeRange {
        /// The root node value.
        first: u64,
        /// The offending node value.
        got: u64,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A relative object identifier needs at least one node.
    #[snafu(display("relative object identifier must have at least 1 node"))]
    Empty {
        /// The generated backtrace.
        backtrace: Backtrace,
    },
    /// A textual node could not be read as a non-negative integer.
    #[snafu(display("could not parse node #{}", position))]
    ParseNode {
        /// The zero-based position of the offending node.
        position: usize,
        /// The underlying parser error.
        source: std::num::ParseIntError,
        /// The generated backtrace.
        backtrace: Backtrace,
    },
}

/// Type alias for a result with an identifier construction error.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An object identifier: an ordered sequence of at least two nodes,
/// where the first node is 0, 1 or 2
/// and the second is below 40 unless the first is 2.
///
/// # Example
///
/// ```
/// # use x690_core::oid::Oid;
/// let oid: Oid = "1.3.6.4.1".parse().unwrap();
/// assert_eq!(oid.nodes(), &[1, 3, 6, 4, 1]);
/// assert_eq!(oid.to_string(), "1.3.6.4.1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid {
    nodes: Nodes,
}

impl Oid {
    /// Create an object identifier from a node sequence,
    /// validating the constraints on the first two nodes.
    pub fn new<I>(nodes: I) -> Result<Oid>
    where
        I: IntoIterator<Item = u64>,
    {
        let nodes: Nodes = nodes.into_iter().collect();
        ensure!(nodes.len() >= 2, TooShortSnafu { got: nodes.len() });
        ensure!(nodes[0] <= 2, FirstNodeRangeSnafu { got: nodes[0] });
        ensure!(
            nodes[0] == 2 || nodes[1] < 40,
            SecondNodeRangeSnafu {
                first: nodes[0],
                got: nodes[1],
            }
        );
        Ok(Oid { nodes })
    }

    /// Retrieve the node sequence.
    pub fn nodes(&self) -> &[u64] {
        &self.nodes
    }

    /// The number of nodes in the identifier. Always at least 2.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true, kept for interface completeness.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.nodes.iter().join("."))
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Oid> {
        let nodes = s
            .split('.')
            .enumerate()
            .map(|(position, part)| part.parse::<u64>().context(ParseNodeSnafu { position }))
            .collect::<Result<Nodes>>()?;
        Oid::new(nodes)
    }
}

/// A relative object identifier: a node sequence interpreted against some
/// base identifier known from context. At least one node, no constraints
/// on node values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativeOid {
    nodes: Nodes,
}

impl RelativeOid {
    /// Create a relative object identifier from a non-empty node sequence.
    pub fn new<I>(nodes: I) -> Result<RelativeOid>
    where
        I: IntoIterator<Item = u64>,
    {
        let nodes: Nodes = nodes.into_iter().collect();
        ensure!(!nodes.is_empty(), EmptySnafu);
        Ok(RelativeOid { nodes })
    }

    /// Retrieve the node sequence.
    pub fn nodes(&self) -> &[u64] {
        &self.nodes
    }

    /// The number of nodes in the identifier. Always at least 1.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true, kept for interface completeness.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for RelativeOid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.nodes.iter().join("."))
    }
}

impl FromStr for RelativeOid {
    type Err = Error;

    fn from_str(s: &str) -> Result<RelativeOid> {
        let nodes = s
            .split('.')
            .enumerate()
            .map(|(position, part)| part.parse::<u64>().context(ParseNodeSnafu { position }))
            .collect::<Result<Nodes>>()?;
        RelativeOid::new(nodes)
    }
}
