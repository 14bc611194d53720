use crate::approximation::{Approximation, BucketContext, Buffer};
use crate::data_types::{GroupSpan, GroupedResult, RawSeries};

/// Groups parallel `x`/value arrays into the buckets starting at `positions`.
///
/// Bucket `k` is the half-open interval `[positions[k], positions[k + 1])`;
/// the last bucket is open ended. Points before `positions[0]` are skipped.
/// Runs one forward pass over the data, emitting only buckets whose reduction
/// yields a value.
///
/// A span's `length` is the number of values buffered for the first column,
/// so nulls and non-numeric values do not count. Spans tile the grouped range
/// only when every value is a number.
pub fn group_data(
    x: &[f64],
    columns: &[&[Option<f64>]],
    positions: &[f64],
    approximation: &Approximation,
) -> GroupedResult {
    let Some(&first_position) = positions.first() else {
        return GroupedResult::default();
    };

    let n = x.len();
    let mut buffers = vec![Buffer::new(); columns.len().max(1)];
    let mut output = GroupedResult::with_capacity(positions.len().min(n));

    // First point inside the grouped range.
    let first = x.partition_point(|&t| t < first_position);
    let mut start = first;
    let mut pos = 0;

    for i in first..=n {
        let flush = i == n;

        while flush || positions.get(pos + 1).is_some_and(|&next| x[i] >= next) {
            let bucket = BucketContext {
                start,
                length: buffers[0].len(),
            };
            if let Some(value) = approximation.reduce(&buffers, bucket) {
                output.push(
                    positions[pos],
                    value,
                    GroupSpan {
                        start: bucket.start,
                        length: bucket.length,
                    },
                );
            }

            start = i;
            for buffer in buffers.iter_mut() {
                buffer.clear();
            }
            pos += 1;

            if flush {
                break;
            }
        }

        if flush {
            break;
        }

        for (buffer, column) in buffers.iter_mut().zip(columns) {
            buffer.push(column.get(i).copied().unwrap_or(Some(f64::NAN)));
        }
    }

    output
}

/// [`group_data`] over all columns of a raw series.
pub fn group_series(
    series: &RawSeries,
    positions: &[f64],
    approximation: &Approximation,
) -> GroupedResult {
    let columns: Vec<&[Option<f64>]> = series
        .columns
        .iter()
        .map(|c| c.values.as_slice())
        .collect();
    group_data(&series.x, &columns, positions, approximation)
}
