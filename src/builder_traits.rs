use crate::errors::MeasurementResult;
use crate::measurement::MidMeasure;
use crate::operators::Outcome;
use crate::types::Wires;
use crate::value::{measure, MeasurementValue};

/// A circuit builder which can record mid-circuit measurements.
pub trait MidMeasureBuilder {
    /// The struct used to represent recorded circuit objects.
    type CircuitObject;

    /// The recorded circuit objects in circuit order.
    fn pipeline(&self) -> &[Self::CircuitObject];

    /// Number of recorded circuit objects.
    fn pipeline_depth(&self) -> usize {
        self.pipeline().len()
    }

    /// Record a measurement request in circuit order.
    fn record_mid_measure(&mut self, m: MidMeasure) -> MeasurementResult<()>;

    /// Take a mid-circuit measurement of a single wire, record it, and return the deferred
    /// outcome for use by later operations.
    fn measure<W: Into<Wires>>(&mut self, wires: W) -> MeasurementResult<MeasurementValue<Outcome>> {
        let value = measure(wires)?;
        value
            .measurements()
            .iter()
            .try_for_each(|m| self.record_mid_measure(m.clone()))?;
        Ok(value)
    }
}

/// A builder which can condition operations on mid-circuit measurement outcomes.
pub trait ConditionalBuilder: MidMeasureBuilder {
    /// Record `gate` on `wires`, applied only in branches where `condition` is truthy.
    /// Every measurement the condition depends on must already be recorded on this builder.
    fn cond<W: Into<Wires>>(
        &mut self,
        condition: &MeasurementValue<Outcome>,
        gate: &str,
        wires: W,
    ) -> MeasurementResult<()>;
}
