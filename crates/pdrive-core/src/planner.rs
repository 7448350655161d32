//! Part planning for multipart uploads

use crate::error::{Error, Result};
use crate::types::PartJob;

/// Number of parts needed to cover `file_size` bytes
pub fn part_count(file_size: u64, part_size: u64) -> u64 {
    if part_size == 0 {
        return 0;
    }
    file_size.div_ceil(part_size)
}

/// Split `file_size` bytes into 1-indexed parts of at most `part_size` bytes.
///
/// The parts are contiguous and cover `[0, file_size)` exactly; only the last
/// part may be shorter than `part_size`. An empty file yields an empty plan.
pub fn plan_parts(file_size: u64, part_size: u64) -> Result<Vec<PartJob>> {
    if part_size == 0 {
        return Err(Error::InvalidArgument(
            "part size must be greater than zero".into(),
        ));
    }

    let count = part_count(file_size, part_size);
    if count > u64::from(u32::MAX) {
        return Err(Error::InvalidArgument(format!(
            "file of {} bytes needs {} parts, more than the supported maximum",
            file_size, count
        )));
    }

    let mut parts = Vec::with_capacity(count as usize);
    let mut offset = 0;
    let mut part_number = 1;

    while offset < file_size {
        // Leftover bytes form the last, shorter part
        let length = (file_size - offset).min(part_size);
        parts.push(PartJob {
            part_number,
            offset,
            length,
        });
        offset += length;
        part_number += 1;
    }

    Ok(parts)
}
