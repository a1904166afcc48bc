use crate::errors::{MeasurementError, MeasurementResult};
use crate::types::Branch;

/// Number of branches for `n` binary measurements, `None` if `2^n` does not fit in a usize.
///
/// # Example
/// ```
/// use qip_midmeasure::utils::num_branches;
///
/// assert_eq!(num_branches(0), Some(1));
/// assert_eq!(num_branches(3), Some(8));
/// assert_eq!(num_branches(usize::BITS as usize), None);
/// ```
pub fn num_branches(n: usize) -> Option<usize> {
    u32::try_from(n).ok().and_then(|n| 1usize.checked_shl(n))
}

/// Decode `index` as an `n` bit big-endian branch: the first entry is the most significant bit.
///
/// # Example
/// ```
/// use qip_midmeasure::utils::branch_bits;
///
/// assert_eq!(branch_bits(0b011, 3).as_slice(), &[0, 1, 1]);
/// assert_eq!(branch_bits(0, 0).as_slice(), &[] as &[u8]);
/// ```
pub fn branch_bits(index: usize, n: usize) -> Branch {
    (0..n)
        .rev()
        .map(|shift| {
            if shift < usize::BITS as usize {
                ((index >> shift) & 1) as u8
            } else {
                0
            }
        })
        .collect()
}

/// Inverse of [branch_bits].
///
/// # Example
/// ```
/// use qip_midmeasure::utils::branch_index;
///
/// assert_eq!(branch_index(&[1, 0, 1]), 0b101);
/// ```
pub fn branch_index(bits: &[u8]) -> usize {
    bits.iter()
        .fold(0, |acc, bit| (acc << 1) | (*bit as usize & 1))
}

/// Decode `index` for a value with `n` measurements, failing if it is not a valid branch.
pub(crate) fn checked_branch_bits(index: usize, n: usize) -> MeasurementResult<Branch> {
    match num_branches(n) {
        Some(branches) if index < branches => Ok(branch_bits(index, n)),
        branches => Err(MeasurementError::OutOfRange { index, branches }),
    }
}

/// Validate that `bits` has `n` entries which are all 0 or 1.
pub(crate) fn check_bits(bits: &[u8], n: usize) -> MeasurementResult<()> {
    if bits.len() != n {
        return Err(MeasurementError::invalid(format!(
            "expected {} outcomes but {} were given",
            n,
            bits.len()
        )));
    }
    match bits.iter().find(|b| **b > 1) {
        Some(b) => Err(MeasurementError::invalid(format!(
            "measurement outcomes must be 0 or 1, found {}",
            b
        ))),
        None => Ok(()),
    }
}
