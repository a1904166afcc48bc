use smallvec::SmallVec;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

/// One assignment of 0/1 outcomes, ordered like the measurements of the value it belongs to.
pub type Branch = SmallVec<[u8; 8]>;

/// The wires (qubit indices) an operation acts on.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct Wires {
    indices: SmallVec<[usize; 1]>,
}

impl Wires {
    /// Make a wire specifier from an iterator of qubit indices.
    pub fn new<It>(indices: It) -> Self
    where
        It: IntoIterator<Item = usize>,
    {
        Self {
            indices: indices.into_iter().collect(),
        }
    }

    /// Number of wires.
    pub fn n(&self) -> usize {
        self.indices.len()
    }

    /// The wire indices.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The wire if exactly one is given.
    pub fn single(&self) -> Option<usize> {
        match self.indices.as_slice() {
            [w] => Some(*w),
            _ => None,
        }
    }
}

impl Deref for Wires {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        self.indices()
    }
}

impl From<usize> for Wires {
    fn from(w: usize) -> Self {
        Self::new(Some(w))
    }
}

impl From<&[usize]> for Wires {
    fn from(ws: &[usize]) -> Self {
        Self::new(ws.iter().cloned())
    }
}

impl<const N: usize> From<[usize; N]> for Wires {
    fn from(ws: [usize; N]) -> Self {
        Self::new(ws)
    }
}

impl From<Vec<usize>> for Wires {
    fn from(ws: Vec<usize>) -> Self {
        Self::new(ws)
    }
}

impl From<&Wires> for Wires {
    fn from(ws: &Wires) -> Self {
        ws.clone()
    }
}

impl Display for Wires {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, w) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", w)?;
        }
        write!(f, "]")
    }
}

/// Kind of result a measurement process produces.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ReturnType {
    /// A measurement taken partway through the circuit whose outcome feeds later logic.
    MidMeasure,
}

/// Where a recorded object is queued in a circuit program.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum QueueCategory {
    /// Queued alongside gates, in circuit order.
    Operation,
    /// Queued as a terminal output of the circuit.
    Measurement,
}
