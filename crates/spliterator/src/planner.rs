//! Delimiter-aligned partitioning of a seekable source for parallel scans.

use crate::error::SplitError;
use crate::needle::Needle;
use crate::options::SplitOptions;
use crate::range_queue::ByteRange;
use crate::source::SeekableSource;
use crate::stream::{AsyncSpliterator, Seekable};

/// Partitions `source` into at most `desired` byte ranges whose interior
/// boundaries sit immediately after a delimiter occurrence.
///
/// The ranges are pairwise disjoint, cover `[0, size)` minus the boundary
/// delimiters themselves, and concatenating per-range scans in plan order
/// reproduces a single whole-source scan. Each interior boundary is found by
/// searching an expanding window around its target offset (one chunk's width
/// past the previous boundary); among the occurrences seen, the one closest
/// to the target wins, ties going to the preceding occurrence.
///
/// # Errors
///
/// [`SplitError::Io`] if a window read fails, [`SplitError::PlanWindow`] if
/// a boundary's widest window contains no delimiter at all.
pub async fn plan_chunks<R: SeekableSource + Send>(
    source: &mut R,
    needle: &Needle,
    desired: usize,
) -> Result<Vec<ByteRange>, SplitError> {
    let size = source.size();
    if size == 0 {
        return Ok(Vec::new());
    }
    let d = needle.len();
    let count = desired.clamp(1, (size / d).max(1).min(size));
    if count == 1 || size <= d {
        return Ok(vec![ByteRange::new(0, size)]);
    }

    let chunk = size / count;
    let mut ranges = Vec::with_capacity(count);
    let mut range_start = 0usize; // first byte of the range being built
    let mut prev_match = 0usize; // anchor for successive targets

    for _ in 1..count {
        let target = prev_match + chunk;
        if target + d > size {
            break;
        }
        let found = locate_boundary(source, needle, target, range_start, size, chunk).await?;
        ranges.push(ByteRange::new(range_start, found));
        range_start = found + d;
        prev_match = found;
    }
    ranges.push(ByteRange::new(range_start, size));
    Ok(ranges)
}

/// Plans `desired` chunks and opens one independent spliterator per range,
/// in plan order.
///
/// This is the parallel-launch primitive: every returned spliterator owns
/// its own buffer, queue, and source handle, so callers may drive them from
/// separate tasks. Per-instance `drop`/`take`/`skip_empty` from `options`
/// apply within each chunk; `position` is ignored.
///
/// # Errors
///
/// Anything [`plan_chunks`] raises.
pub async fn split_many<R>(
    source: &mut R,
    needle: &Needle,
    desired: usize,
    options: &SplitOptions,
) -> Result<Vec<AsyncSpliterator<Seekable<R>>>, SplitError>
where
    R: SeekableSource + Clone + Send,
{
    let plan = plan_chunks(source, needle, desired).await?;
    Ok(plan
        .into_iter()
        .map(|range| {
            AsyncSpliterator::over_seekable_range(
                source.clone(),
                needle.clone(),
                range,
                options.clone(),
            )
        })
        .collect())
}

/// Finds the delimiter occurrence closest to `target` within
/// `[floor, size)`, widening the window geometrically from `±2·len` up to
/// `±max_extent`.
async fn locate_boundary<R: SeekableSource + Send>(
    source: &mut R,
    needle: &Needle,
    target: usize,
    floor: usize,
    size: usize,
    max_extent: usize,
) -> Result<usize, SplitError> {
    let d = needle.len();
    let mut extent = 2 * d;
    loop {
        let lo = target.saturating_sub(extent).max(floor);
        // A match starting at the window's upper edge still needs its full
        // `d` bytes readable.
        let hi = (target + extent + d).min(size);
        let window = read_window(source, lo, hi).await?;

        let mut best: Option<usize> = None;
        for hit in needle.occurrences(&window, 0, window.len()) {
            let at = lo + hit;
            let better = match best {
                None => true,
                Some(b) => at.abs_diff(target) < b.abs_diff(target),
            };
            if better {
                best = Some(at);
            }
        }
        if let Some(found) = best {
            return Ok(found);
        }

        let widest = lo == floor && hi == size;
        if extent >= max_extent || widest {
            return Err(SplitError::PlanWindow {
                target,
                window_lo: lo,
                window_hi: hi,
            });
        }
        extent = (extent * 2).min(max_extent);
    }
}

async fn read_window<R: SeekableSource + Send>(
    source: &mut R,
    lo: usize,
    hi: usize,
) -> Result<Vec<u8>, SplitError> {
    let mut window = vec![0u8; hi - lo];
    let mut filled = 0;
    while filled < window.len() {
        let n = source
            .read_at(lo + filled, &mut window[filled..])
            .await
            .map_err(|source| SplitError::Io {
                position: lo + filled,
                source,
            })?;
        if n == 0 {
            return Err(SplitError::Io {
                position: lo + filled,
                source: std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "window read ended early",
                ),
            });
        }
        filled += n;
    }
    Ok(window)
}
