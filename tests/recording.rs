use qip_midmeasure::prelude::*;
use std::collections::HashMap;

#[test]
fn test_feed_forward_circuit() -> Result<(), MeasurementError> {
    let mut b = LocalRecorder::default();
    let m0 = b.measure(0)?;
    let m1 = b.measure(1)?;
    // Apply a correction only when exactly one of the two outcomes is set.
    let odd = (&m0 + &m1).equals(1);
    b.cond(&odd, "Z", 2)?;
    assert_eq!(b.pipeline_depth(), 3);
    assert_eq!(b.mid_measurements().count(), 2);

    let conditional = b
        .pipeline()
        .iter()
        .find_map(|o| match o {
            qip_midmeasure::builder::RecordedObject::Conditional(c) => Some(c.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(conditional.active_branches()?.len(), 2);

    let mut outcomes = HashMap::new();
    outcomes.insert(m0.measurements()[0].clone(), 1);
    outcomes.insert(m1.measurements()[0].clone(), 0);
    assert!(conditional.fires(&outcomes)?);
    outcomes.insert(m1.measurements()[0].clone(), 1);
    assert!(!conditional.fires(&outcomes)?);
    Ok(())
}

#[test]
fn test_recorded_requests_are_operations() -> Result<(), MeasurementError> {
    let mut b = LocalRecorder::default();
    let m = b.measure(4)?;
    let request = &m.measurements()[0];
    assert_eq!(request.wire(), 4);
    assert_eq!(request.queue_category(), QueueCategory::Operation);
    assert_eq!(request.return_type(), ReturnType::MidMeasure);
    assert_eq!(MeasurementProcess::hash(request), request.hash());
    Ok(())
}

#[test]
fn test_unresolved_value() -> Result<(), MeasurementError> {
    let m = measure(0)?;
    let err = m.concrete().unwrap_err();
    assert!(matches!(err, MeasurementError::UnknownValue(_)));
    assert!(err.to_string().contains(m.measurements()[0].id()));
    Ok(())
}
