use crate::domain::model::{Batch, PackageName};
use crate::utils::error::{PinError, Result};

/// Split `names` into exactly `workers` contiguous batches.
///
/// Sizes differ by at most one and the first `len % workers` batches carry the
/// extra name. With more workers than names the trailing batches are empty.
pub fn partition(names: Vec<PackageName>, workers: usize) -> Result<Vec<Batch>> {
    if workers == 0 {
        return Err(PinError::InvalidConfigValueError {
            field: "workers".to_string(),
            value: "0".to_string(),
            reason: "Value must be at least 1".to_string(),
        });
    }

    let base = names.len() / workers;
    let extra = names.len() % workers;

    let mut remaining = names.into_iter();
    let batches = (0..workers)
        .map(|index| {
            let size = base + usize::from(index < extra);
            remaining.by_ref().take(size).collect::<Batch>()
        })
        .collect();

    Ok(batches)
}
