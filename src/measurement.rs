use crate::errors::{MeasurementError, MeasurementResult};
use crate::types::{QueueCategory, ReturnType, Wires};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(0);

/// Common interface of objects recorded as measurements on a circuit.
pub trait MeasurementProcess {
    /// Wires measured by the process.
    fn wires(&self) -> Wires;
    /// Label of this measurement instance.
    fn id(&self) -> &str;
    /// The kind of result produced.
    fn return_type(&self) -> ReturnType;
    /// Where the process is queued when recorded.
    fn queue_category(&self) -> QueueCategory;
    /// Whether results are sampled from the computational basis at the end of the circuit.
    fn samples_computational_basis(&self) -> bool;
    /// Integer uniquely representing the process, usable as a cache key.
    fn hash(&self) -> u64;
}

#[derive(Debug)]
struct MidMeasureInner {
    wire: usize,
    id: String,
    serial: u64,
}

/// A pending single-qubit measurement in the computational basis, taken mid-circuit.
///
/// Clones share the same request: equality is by allocation, so two requests on the same wire are
/// always distinct.
#[derive(Clone, Debug)]
pub struct MidMeasure {
    inner: Arc<MidMeasureInner>,
}

impl MidMeasure {
    /// Allocate a new request on a single wire.
    ///
    /// # Example
    /// ```
    /// use qip_midmeasure::prelude::*;
    ///
    /// let m = MidMeasure::new(3).unwrap();
    /// assert_eq!(m.wire(), 3);
    /// assert_eq!(m.id().len(), 8);
    /// assert!(MidMeasure::new([0, 1]).is_err());
    /// ```
    pub fn new<W: Into<Wires>>(wires: W) -> MeasurementResult<Self> {
        let wires = wires.into();
        let wire = wires.single().ok_or_else(|| {
            MeasurementError::invalid(format!(
                "only a single qubit can be measured in the middle of the circuit, got wires {}",
                wires
            ))
        })?;
        let id = format!("{:08x}", rand::thread_rng().gen::<u32>());
        let serial = NEXT_SERIAL.fetch_add(1, AtomicOrdering::Relaxed);
        tracing::debug!(wire, id = %id, serial, "allocated mid-circuit measurement");
        Ok(Self {
            inner: Arc::new(MidMeasureInner { wire, id, serial }),
        })
    }

    /// The measured wire.
    pub fn wire(&self) -> usize {
        self.inner.wire
    }

    /// The identity token of the request.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Content fingerprint of (kind, wire, id).
    pub fn hash(&self) -> u64 {
        let mut state = DefaultHasher::new();
        Hash::hash(self, &mut state);
        state.finish()
    }

    /// Order requests by id, falling back to allocation order when ids collide.
    pub(crate) fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.id()
            .cmp(other.id())
            .then(self.inner.serial.cmp(&other.inner.serial))
    }
}

impl PartialEq for MidMeasure {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for MidMeasure {}

impl Hash for MidMeasure {
    fn hash<H: Hasher>(&self, state: &mut H) {
        "MidMeasure".hash(state);
        self.inner.wire.hash(state);
        self.inner.id.hash(state);
    }
}

impl Display for MidMeasure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MidMeasure(wire={}, id={})", self.inner.wire, self.inner.id)
    }
}

impl MeasurementProcess for MidMeasure {
    fn wires(&self) -> Wires {
        Wires::from(self.wire())
    }

    fn id(&self) -> &str {
        MidMeasure::id(self)
    }

    fn return_type(&self) -> ReturnType {
        ReturnType::MidMeasure
    }

    fn queue_category(&self) -> QueueCategory {
        QueueCategory::Operation
    }

    fn samples_computational_basis(&self) -> bool {
        false
    }

    fn hash(&self) -> u64 {
        MidMeasure::hash(self)
    }
}
