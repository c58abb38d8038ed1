use core::fmt;
use serde::{Deserialize, Serialize};

/// Identifier of an electric bus node.
///
/// Topology files expose plain numeric ids, so these are thin newtypes
/// rather than arena indices.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SwitchboardId(pub u32);

/// Identifier of a mechanical shaft line node.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShaftLineId(pub u32);

impl fmt::Display for SwitchboardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "switchboard {}", self.0)
    }
}

impl fmt::Display for ShaftLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shaft line {}", self.0)
    }
}

/// Either kind of bus node, used in error reporting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NodeId {
    Switchboard(SwitchboardId),
    ShaftLine(ShaftLineId),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Switchboard(id) => id.fmt(f),
            NodeId::ShaftLine(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_nodes() {
        assert_eq!(format!("{}", SwitchboardId(1)), "switchboard 1");
        assert_eq!(
            format!("{}", NodeId::ShaftLine(ShaftLineId(2))),
            "shaft line 2"
        );
    }
}
