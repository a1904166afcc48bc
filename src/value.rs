#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::errors::{MeasurementError, MeasurementResult};
use crate::measurement::MidMeasure;
use crate::operators::Outcome;
use crate::rayon_helper::into_iter;
use crate::types::{Branch, Wires};
use crate::utils::{branch_bits, check_bits, checked_branch_bits, num_branches};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// A pure function of measurement outcomes, called with one bit per measurement.
pub type ProcessingFn<T> = Arc<dyn Fn(&[u8]) -> T + Send + Sync>;

/// Perform a mid-circuit measurement in the computational basis on a single qubit.
///
/// The returned value stands for the (unknown) outcome and can be combined with other values and
/// scalars before the circuit is executed.
///
/// # Example
/// ```
/// use qip_midmeasure::prelude::*;
///
/// # fn main() -> MeasurementResult<()> {
/// let m0 = measure(0)?;
/// let m1 = measure(1)?;
/// let both = &m0 & &m1;
/// assert_eq!(both.measurements().len(), 2);
/// assert_eq!(both.branch(0b11)?, Outcome::Bool(true));
/// assert_eq!(both.branch(0b10)?, Outcome::Bool(false));
///
/// assert!(measure([0, 1]).is_err());
/// # Ok(())
/// # }
/// ```
pub fn measure<W: Into<Wires>>(wires: W) -> MeasurementResult<MeasurementValue<Outcome>> {
    let m = MidMeasure::new(wires)?;
    Ok(MeasurementValue::from_parts(
        vec![m],
        Arc::new(|bits: &[u8]| Outcome::Int(bits[0] as i64)),
    ))
}

/// A lazily evaluated function of the outcomes of one or more mid-circuit measurements.
///
/// The order of `measurements` is the argument order of the processing function. Values are
/// immutable; every transformation produces a new value sharing the same measurements.
pub struct MeasurementValue<T> {
    measurements: Vec<MidMeasure>,
    processing_fn: ProcessingFn<T>,
}

impl<T> Clone for MeasurementValue<T> {
    fn clone(&self) -> Self {
        Self {
            measurements: self.measurements.clone(),
            processing_fn: self.processing_fn.clone(),
        }
    }
}

impl<T> Debug for MeasurementValue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementValue")
            .field("measurements", &self.measurements)
            .finish_non_exhaustive()
    }
}

impl<T> MeasurementValue<T> {
    /// Construct a value from measurements and a function taking one bit per measurement.
    /// Fails if a measurement is listed twice.
    ///
    /// # Panics
    /// The arity of `f` is not checked here. A function which reads more bits than there are
    /// measurements panics when a branch is evaluated.
    pub fn new<F>(measurements: Vec<MidMeasure>, f: F) -> MeasurementResult<Self>
    where
        F: Fn(&[u8]) -> T + Send + Sync + 'static,
    {
        let repeated = measurements
            .iter()
            .enumerate()
            .find(|(i, m)| measurements[..*i].contains(*m));
        if let Some((_, m)) = repeated {
            return Err(MeasurementError::invalid(format!(
                "{} appears more than once",
                m
            )));
        }
        Ok(Self::from_parts(measurements, Arc::new(f)))
    }

    /// Caller guarantees `measurements` has no repeats.
    pub(crate) fn from_parts(measurements: Vec<MidMeasure>, processing_fn: ProcessingFn<T>) -> Self {
        Self {
            measurements,
            processing_fn,
        }
    }

    /// A value which depends on no measurements.
    pub fn constant(value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self::from_parts(vec![], Arc::new(move |_: &[u8]| value.clone()))
    }

    /// The measurements this value depends on, in argument order.
    pub fn measurements(&self) -> &[MidMeasure] {
        &self.measurements
    }

    /// The underlying processing function.
    /// Panics if called with fewer bits than there are measurements.
    pub fn processing_fn(&self) -> &ProcessingFn<T> {
        &self.processing_fn
    }

    /// Number of measurements.
    pub fn n(&self) -> usize {
        self.measurements.len()
    }

    /// Evaluate directly with one outcome per measurement.
    pub fn evaluate(&self, bits: &[u8]) -> MeasurementResult<T> {
        check_bits(bits, self.n())?;
        Ok((self.processing_fn)(bits))
    }

    /// Post-process the value with `f`.
    pub fn apply<U, F>(&self, f: F) -> MeasurementValue<U>
    where
        T: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = self.processing_fn.clone();
        MeasurementValue::from_parts(
            self.measurements.clone(),
            Arc::new(move |bits: &[u8]| f(inner(bits))),
        )
    }

    /// Combine two values over the union of their measurements.
    ///
    /// Shared measurements appear once, and the union is ordered by measurement id so values built
    /// in different orders over the same measurements agree on argument order.
    pub fn merge<U>(&self, other: &MeasurementValue<U>) -> MeasurementValue<(T, U)>
    where
        T: 'static,
        U: 'static,
    {
        let mut merged = self.measurements.clone();
        other
            .measurements
            .iter()
            .filter(|m| !self.measurements.contains(m))
            .for_each(|m| merged.push(m.clone()));
        merged.sort_by(MidMeasure::canonical_cmp);

        let positions = |ms: &[MidMeasure]| -> Vec<usize> {
            ms.iter()
                .filter_map(|m| merged.iter().position(|o| o == m))
                .collect()
        };
        let indices_a = positions(&self.measurements);
        let indices_b = positions(&other.measurements);
        debug_assert_eq!(indices_a.len(), self.n());
        debug_assert_eq!(indices_b.len(), other.n());
        tracing::trace!(
            lhs = self.n(),
            rhs = other.n(),
            merged = merged.len(),
            "merged measurement values"
        );

        let fa = self.processing_fn.clone();
        let fb = other.processing_fn.clone();
        MeasurementValue::from_parts(
            merged,
            Arc::new(move |bits: &[u8]| {
                let sub_a = indices_a.iter().map(|i| bits[*i]).collect::<Branch>();
                let sub_b = indices_b.iter().map(|i| bits[*i]).collect::<Branch>();
                (fa(&sub_a), fb(&sub_b))
            }),
        )
    }

    /// Evaluate a single branch. Bits of `index` are read big-endian: the most significant bit is
    /// the outcome of the first measurement.
    ///
    /// # Example
    /// ```
    /// use qip_midmeasure::prelude::*;
    ///
    /// # fn main() -> MeasurementResult<()> {
    /// let m = measure(0)?;
    /// let e = m.equals(1);
    /// assert_eq!(e.branch(1)?, Outcome::Bool(true));
    /// assert!(e.branch(2).is_err());
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Panics
    /// If the processing function reads more bits than there are measurements, see [Self::new].
    pub fn branch(&self, index: usize) -> MeasurementResult<T> {
        let bits = checked_branch_bits(index, self.n())?;
        Ok((self.processing_fn)(&bits))
    }

    /// Lazily iterate over every branch in counting order. Fails with
    /// [OutOfRange](MeasurementError::OutOfRange) if `2^n` branches do not fit in a usize.
    pub fn items(&self) -> MeasurementResult<impl Iterator<Item = (Branch, T)> + '_> {
        let n = self.n();
        let branches = self.num_branches()?;
        Ok((0..branches).map(move |i| {
            let bits = branch_bits(i, n);
            let v = (self.processing_fn)(&bits);
            (bits, v)
        }))
    }

    /// Evaluate every branch. Keys iterate in counting order.
    pub fn branches(&self) -> MeasurementResult<BTreeMap<Branch, T>>
    where
        T: Send,
    {
        let n = self.n();
        let branches = self.num_branches()?;
        tracing::trace!(measurements = n, branches, "enumerating branches");
        Ok(into_iter!(0..branches)
            .map(|i| {
                let bits = branch_bits(i, n);
                let v = (self.processing_fn)(&bits);
                (bits, v)
            })
            .collect())
    }

    /// The value, if it depends on no measurements.
    pub fn concrete(&self) -> MeasurementResult<T> {
        if self.measurements.is_empty() {
            Ok((self.processing_fn)(&[]))
        } else {
            let ids = self
                .measurements
                .iter()
                .map(|m| m.id())
                .collect::<Vec<_>>()
                .join(",");
            Err(MeasurementError::unknown(format!(
                "value depends on unresolved measurements {}",
                ids
            )))
        }
    }

    /// Evaluate with concrete outcomes, for instance those produced by executing the circuit.
    pub fn resolve(&self, outcomes: &HashMap<MidMeasure, u8>) -> MeasurementResult<T> {
        let bits = self
            .measurements
            .iter()
            .map(|m| {
                outcomes
                    .get(m)
                    .copied()
                    .ok_or_else(|| MeasurementError::unknown(format!("no outcome for {}", m)))
            })
            .collect::<MeasurementResult<Branch>>()?;
        self.evaluate(&bits)
    }

    fn num_branches(&self) -> MeasurementResult<usize> {
        num_branches(self.n()).ok_or(MeasurementError::OutOfRange {
            index: 0,
            branches: None,
        })
    }
}

/// One line per branch. A value whose branches cannot be enumerated (see [MeasurementValue::items])
/// returns [std::fmt::Error], so `to_string()` panics on it.
impl<T: Display> Display for MeasurementValue<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let items = self.items().map_err(|_| std::fmt::Error)?;
        for (i, (bits, v)) in items.enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "if ")?;
            for (j, (m, b)) in self.measurements.iter().zip(bits.iter()).enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}={}", m.id(), b)?;
            }
            write!(f, " => {}", v)?;
        }
        Ok(())
    }
}
