use crate::builder_traits::{ConditionalBuilder, MidMeasureBuilder};
use crate::errors::{MeasurementError, MeasurementResult};
use crate::measurement::{MeasurementProcess, MidMeasure};
use crate::operators::Outcome;
use crate::types::{Branch, QueueCategory, Wires};
use crate::value::MeasurementValue;
use std::collections::HashMap;

/// A local builder which records mid-circuit measurements and the operations conditioned on them.
///
/// # Example
/// ```
/// use qip_midmeasure::prelude::*;
///
/// # fn main() -> MeasurementResult<()> {
/// let mut b = LocalRecorder::default();
/// let m = b.measure(1)?;
/// b.cond(&m, "RY", 0)?;
/// assert_eq!(b.pipeline_depth(), 2);
///
/// let unrecorded = measure(2)?;
/// assert!(b.cond(&unrecorded, "X", 0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct LocalRecorder {
    pipeline: Vec<RecordedObject>,
}

impl LocalRecorder {
    /// Mid-circuit measurements in the order they were recorded.
    pub fn mid_measurements(&self) -> impl Iterator<Item = &MidMeasure> {
        self.pipeline.iter().filter_map(|obj| match obj {
            RecordedObject::MidMeasure(m) => Some(m),
            RecordedObject::Conditional(_) => None,
        })
    }

    fn is_recorded(&self, m: &MidMeasure) -> bool {
        self.mid_measurements().any(|o| o == m)
    }
}

/// A pipeline object for the LocalRecorder.
#[derive(Debug, Clone)]
pub enum RecordedObject {
    /// A measurement taken partway through the circuit.
    MidMeasure(MidMeasure),
    /// A gate applied only in some measurement branches.
    Conditional(Conditional),
}

impl RecordedObject {
    /// Where the object sits in the circuit program.
    pub fn queue_category(&self) -> QueueCategory {
        match self {
            RecordedObject::MidMeasure(m) => m.queue_category(),
            RecordedObject::Conditional(_) => QueueCategory::Operation,
        }
    }
}

/// A gate guarded by a deferred measurement value.
#[derive(Debug, Clone)]
pub struct Conditional {
    condition: MeasurementValue<Outcome>,
    gate: String,
    wires: Wires,
}

impl Conditional {
    /// The guarding value.
    pub fn condition(&self) -> &MeasurementValue<Outcome> {
        &self.condition
    }

    /// Name of the guarded gate.
    pub fn gate(&self) -> &str {
        &self.gate
    }

    /// Wires of the guarded gate.
    pub fn wires(&self) -> &Wires {
        &self.wires
    }

    /// Branches of the condition in which the gate is applied, in counting order.
    pub fn active_branches(&self) -> MeasurementResult<Vec<Branch>> {
        Ok(self
            .condition
            .items()?
            .filter(|(_, v)| v.truthy())
            .map(|(bits, _)| bits)
            .collect())
    }

    /// Whether the gate is applied given concrete outcomes.
    pub fn fires(&self, outcomes: &HashMap<MidMeasure, u8>) -> MeasurementResult<bool> {
        self.condition.resolve(outcomes).map(Outcome::truthy)
    }
}

impl MidMeasureBuilder for LocalRecorder {
    type CircuitObject = RecordedObject;

    fn pipeline(&self) -> &[RecordedObject] {
        &self.pipeline
    }

    fn record_mid_measure(&mut self, m: MidMeasure) -> MeasurementResult<()> {
        if self.is_recorded(&m) {
            return Err(MeasurementError::invalid(format!(
                "{} is already recorded on this circuit",
                m
            )));
        }
        tracing::debug!(wire = m.wire(), id = m.id(), "recorded mid-circuit measurement");
        self.pipeline.push(RecordedObject::MidMeasure(m));
        Ok(())
    }
}

impl ConditionalBuilder for LocalRecorder {
    fn cond<W: Into<Wires>>(
        &mut self,
        condition: &MeasurementValue<Outcome>,
        gate: &str,
        wires: W,
    ) -> MeasurementResult<()> {
        if let Some(m) = condition
            .measurements()
            .iter()
            .find(|m| !self.is_recorded(m))
        {
            return Err(MeasurementError::invalid(format!(
                "condition depends on {} which is not recorded on this circuit",
                m
            )));
        }
        let wires = wires.into();
        tracing::debug!(gate, wires = %wires, "recorded conditional operation");
        self.pipeline.push(RecordedObject::Conditional(Conditional {
            condition: condition.clone(),
            gate: gate.to_string(),
            wires,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::measure;

    #[test]
    fn test_records_in_order() -> MeasurementResult<()> {
        let mut b = LocalRecorder::default();
        let m0 = b.measure(0)?;
        let m1 = b.measure(0)?;
        b.cond(&(&m0 & &m1), "X", 1)?;
        assert_eq!(b.pipeline_depth(), 3);
        let recorded = b.mid_measurements().cloned().collect::<Vec<_>>();
        assert_eq!(
            recorded,
            vec![m0.measurements()[0].clone(), m1.measurements()[0].clone()]
        );
        assert!(b
            .pipeline()
            .iter()
            .all(|o| o.queue_category() == QueueCategory::Operation));
        Ok(())
    }

    #[test]
    fn test_rejects_double_record() -> MeasurementResult<()> {
        let mut b = LocalRecorder::default();
        let m = b.measure(0)?;
        let res = b.record_mid_measure(m.measurements()[0].clone());
        assert!(matches!(res, Err(MeasurementError::InvalidArgument(_))));
        assert!(b.measure([0, 1]).is_err());
        assert_eq!(b.pipeline_depth(), 1);
        Ok(())
    }

    #[test]
    fn test_active_branches() -> MeasurementResult<()> {
        let mut b = LocalRecorder::default();
        let m0 = b.measure(0)?;
        let m1 = b.measure(1)?;
        b.cond(&(&m0 | &m1), "H", 2)?;
        let c = match &b.pipeline()[2] {
            RecordedObject::Conditional(c) => c.clone(),
            RecordedObject::MidMeasure(_) => panic!("expected a conditional"),
        };
        assert_eq!(c.gate(), "H");
        assert_eq!(c.wires().indices(), &[2]);
        let active = c
            .active_branches()?
            .into_iter()
            .map(|bits| bits.to_vec())
            .collect::<Vec<_>>();
        assert_eq!(active, vec![vec![0, 1], vec![1, 0], vec![1, 1]]);

        let mut outcomes = HashMap::new();
        outcomes.insert(m0.measurements()[0].clone(), 0);
        outcomes.insert(m1.measurements()[0].clone(), 0);
        assert!(!c.fires(&outcomes)?);
        Ok(())
    }

    #[test]
    fn test_cond_requires_recorded() -> MeasurementResult<()> {
        let mut b = LocalRecorder::default();
        let m = measure(0)?;
        assert!(matches!(
            b.cond(&m, "X", 1),
            Err(MeasurementError::InvalidArgument(_))
        ));
        assert_eq!(b.pipeline_depth(), 0);
        Ok(())
    }
}
