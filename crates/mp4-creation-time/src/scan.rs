//! Backward, chunked search for a marker in a byte source.
//!
//! The source is examined from its tail towards its head in windows of
//! `chunk_size` bytes. Every window is extended by `marker.len() - 1` bytes
//! past its nominal end (never beyond the end of the source) so that a marker
//! straddling two windows is still seen in full. The scan stops at the first
//! window that contains the marker, which means that the occurrence closest
//! to the tail wins over earlier ones. Within that window the leftmost
//! occurrence is reported.

use crate::error::{Error, Result};
use crate::options::ScanOptions;
use crate::source::{AsyncByteRangeSource, ByteRangeSource};
use memchr::memmem;
use std::ops::Range;
use tracing::{debug, trace};

/// A single step of a backward scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Zero-based step number, counted from the tail.
    pub iteration: u64,
    /// First byte of the window.
    pub start: u64,
    /// Nominal end of the window (exclusive).
    pub end: u64,
    /// The range to read: `start..end` plus the overlap for straddling markers.
    pub read: Range<u64>,
}

/// The I/O-free plan of a backward scan.
///
/// `ReverseScan` yields the windows to read, in order, and locates the marker
/// in the bytes read for each of them. [`scan`] and [`scan_async`] drive it
/// against blocking and async sources respectively.
pub struct ReverseScan<'m> {
    finder: memmem::Finder<'m>,
    overlap: u64,
    len: u64,
    chunk_size: u64,
    max_bytes: u64,
    iteration: u64,
}

impl<'m> ReverseScan<'m> {
    pub fn new(marker: &'m [u8], len: u64, options: &ScanOptions) -> Result<Self> {
        if marker.is_empty() {
            return Err(Error::EmptyMarker);
        }
        if options.chunk_size == 0 {
            return Err(Error::ZeroChunkSize);
        }

        Ok(Self {
            finder: memmem::Finder::new(marker),
            overlap: marker.len() as u64 - 1,
            len,
            chunk_size: options.chunk_size.min(len),
            max_bytes: options.max_bytes,
            iteration: 0,
        })
    }

    /// Effective chunk size, i.e. the requested one capped to the source length.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Returns the next window to examine, or `None` once the head of the
    /// source has been reached or the byte budget is spent.
    pub fn next_window(&mut self) -> Option<Window> {
        let examined = self.chunk_size.checked_mul(self.iteration)?;
        if examined >= self.max_bytes {
            return None;
        }

        let end = self.len.checked_sub(examined).filter(|end| *end > 0)?;
        let start = end.saturating_sub(self.chunk_size);
        let read_end = end.saturating_add(self.overlap).min(self.len);

        let window = Window {
            iteration: self.iteration,
            start,
            end,
            read: start..read_end,
        };
        self.iteration += 1;

        Some(window)
    }

    /// Searches the bytes read for `window` and returns the absolute offset
    /// of the leftmost marker occurrence.
    pub fn locate(&self, window: &Window, bytes: &[u8]) -> Option<u64> {
        self.finder
            .find(bytes)
            .map(|index| window.start + index as u64)
    }
}

/// Returns the absolute offset at which `marker` begins, searching `source`
/// backwards, or `None` if it was not found within the budget.
pub fn scan<S>(source: &S, marker: &[u8], options: &ScanOptions) -> Result<Option<u64>>
where
    S: ByteRangeSource + ?Sized,
{
    let mut plan = ReverseScan::new(marker, source.len(), options)?;

    while let Some(window) = plan.next_window() {
        trace!(
            "scanning window #{} [{}, {}) of {} bytes",
            window.iteration, window.read.start, window.read.end, source.len()
        );

        let bytes = source.read_range(window.read.clone())?;
        if let Some(offset) = plan.locate(&window, &bytes) {
            debug!("found marker at offset {} after {} windows", offset, window.iteration + 1);
            return Ok(Some(offset));
        }
    }

    debug!("marker not found in {} bytes", source.len());
    Ok(None)
}

/// Async counterpart of [`scan`]. Reads are awaited one at a time.
pub async fn scan_async<S>(source: &S, marker: &[u8], options: &ScanOptions) -> Result<Option<u64>>
where
    S: AsyncByteRangeSource + ?Sized,
{
    let mut plan = ReverseScan::new(marker, source.len(), options)?;

    while let Some(window) = plan.next_window() {
        trace!(
            "scanning window #{} [{}, {}) of {} bytes",
            window.iteration, window.read.start, window.read.end, source.len()
        );

        let bytes = source.read_range(window.read.clone()).await?;
        if let Some(offset) = plan.locate(&window, &bytes) {
            debug!("found marker at offset {} after {} windows", offset, window.iteration + 1);
            return Ok(Some(offset));
        }
    }

    debug!("marker not found in {} bytes", source.len());
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::cell::RefCell;

    const MARKER: &[u8] = b"mvhd";

    fn buffer(len: usize, markers: &[usize]) -> Vec<u8> {
        let mut data = vec![b'.'; len];
        for &offset in markers {
            data[offset..offset + MARKER.len()].copy_from_slice(MARKER);
        }
        data
    }

    fn options(chunk_size: u64, max_bytes: u64) -> ScanOptions {
        ScanOptions::default()
            .with_chunk_size(chunk_size)
            .with_max_bytes(max_bytes)
    }

    /// Records every range read from the wrapped bytes.
    struct Recording {
        data: Vec<u8>,
        reads: RefCell<Vec<Range<u64>>>,
    }

    impl ByteRangeSource for Recording {
        fn len(&self) -> u64 {
            self.data.len() as u64
        }

        fn read_range(&self, range: Range<u64>) -> Result<Cow<'_, [u8]>> {
            self.reads.borrow_mut().push(range.clone());
            ByteRangeSource::read_range(&self.data, range)
        }
    }

    struct Failing(u64);

    impl ByteRangeSource for Failing {
        fn len(&self) -> u64 {
            self.0
        }

        fn read_range(&self, _range: Range<u64>) -> Result<Cow<'_, [u8]>> {
            Err(std::io::Error::other("device went away").into())
        }
    }

    #[test]
    fn windows_walk_from_tail_to_head() {
        let mut plan = ReverseScan::new(MARKER, 25, &options(10, u64::MAX)).unwrap();
        let windows: Vec<_> = std::iter::from_fn(|| plan.next_window()).collect();

        assert_eq!(
            windows,
            vec![
                Window { iteration: 0, start: 15, end: 25, read: 15..25 },
                Window { iteration: 1, start: 5, end: 15, read: 5..18 },
                Window { iteration: 2, start: 0, end: 5, read: 0..8 },
            ]
        );
    }

    #[test]
    fn chunk_size_is_capped_to_source_length() {
        let mut plan = ReverseScan::new(MARKER, 12, &options(100_000, u64::MAX)).unwrap();
        assert_eq!(plan.chunk_size(), 12);
        assert_eq!(plan.next_window().map(|w| w.read), Some(0..12));
        assert_eq!(plan.next_window(), None);
    }

    #[test]
    fn empty_source() {
        let data: &[u8] = &[];
        assert_eq!(scan(data, MARKER, &ScanOptions::default()).unwrap(), None);
    }

    #[test]
    fn invalid_arguments() {
        let data = buffer(16, &[4]);
        assert!(matches!(
            scan(&data, b"", &ScanOptions::default()),
            Err(Error::EmptyMarker)
        ));
        assert!(matches!(
            scan(&data, MARKER, &options(0, 100)),
            Err(Error::ZeroChunkSize)
        ));
    }

    #[test]
    fn single_window() {
        let data = buffer(24, &[12]);
        assert_eq!(scan(&data, MARKER, &options(20, 20)).unwrap(), Some(12));
        assert_eq!(scan(&data, MARKER, &options(100, 100)).unwrap(), Some(12));
    }

    #[test]
    fn marker_at_head_and_tail() {
        let data = buffer(40, &[0]);
        assert_eq!(scan(&data, MARKER, &options(7, u64::MAX)).unwrap(), Some(0));

        let data = buffer(40, &[36]);
        assert_eq!(scan(&data, MARKER, &options(7, u64::MAX)).unwrap(), Some(36));
    }

    #[test]
    fn marker_straddling_windows() {
        // Windows of 10 bytes split the marker at 8..12 in half.
        let data = buffer(20, &[8]);
        assert_eq!(scan(&data, MARKER, &options(10, u64::MAX)).unwrap(), Some(8));

        // Every possible split point.
        for chunk_size in 1..=20 {
            let data = buffer(30, &[13]);
            assert_eq!(
                scan(&data, MARKER, &options(chunk_size, u64::MAX)).unwrap(),
                Some(13),
                "chunk_size={chunk_size}"
            );
        }
    }

    #[test]
    fn clamped_head_window_reports_true_offset() {
        // 25 bytes in windows of 10: the last window is [0, 5).
        let data = buffer(25, &[1]);
        assert_eq!(scan(&data, MARKER, &options(10, u64::MAX)).unwrap(), Some(1));
    }

    #[test]
    fn tail_most_window_wins() {
        let data = buffer(40, &[2, 30]);
        assert_eq!(scan(&data, MARKER, &options(10, u64::MAX)).unwrap(), Some(30));
    }

    #[test]
    fn leftmost_occurrence_within_a_window_wins() {
        let data = buffer(40, &[2, 30]);
        assert_eq!(scan(&data, MARKER, &options(40, u64::MAX)).unwrap(), Some(2));

        let data = buffer(40, &[31, 35]);
        assert_eq!(scan(&data, MARKER, &options(10, u64::MAX)).unwrap(), Some(31));
    }

    #[test]
    fn byte_budget_limits_the_scan() {
        let data = buffer(100, &[2]);
        assert_eq!(scan(&data, MARKER, &options(10, 50)).unwrap(), None);
        assert_eq!(scan(&data, MARKER, &options(10, 100)).unwrap(), Some(2));
        assert_eq!(scan(&data, MARKER, &options(10, 91)).unwrap(), Some(2));
        assert_eq!(scan(&data, MARKER, &options(10, 90)).unwrap(), None);
    }

    #[test]
    fn zero_budget_reads_nothing() {
        let source = Recording {
            data: buffer(20, &[16]),
            reads: RefCell::default(),
        };
        assert_eq!(scan(&source, MARKER, &options(10, 0)).unwrap(), None);
        assert!(source.reads.borrow().is_empty());
    }

    #[test]
    fn budget_smaller_than_a_chunk_still_reads_the_tail() {
        let data = buffer(100, &[95]);
        assert_eq!(scan(&data, MARKER, &options(10, 1)).unwrap(), Some(95));

        let data = buffer(100, &[50]);
        assert_eq!(scan(&data, MARKER, &options(10, 1)).unwrap(), None);
    }

    #[test]
    fn reads_stay_within_the_source() {
        let source = Recording {
            data: buffer(23, &[]),
            reads: RefCell::default(),
        };
        assert_eq!(scan(&source, MARKER, &options(5, u64::MAX)).unwrap(), None);

        let reads = source.reads.borrow();
        assert_eq!(reads.len(), 5);
        assert_eq!(reads[0], 18..23);
        assert_eq!(reads[4], 0..6);
        assert!(reads.iter().all(|r| r.start <= r.end && r.end <= 23));
    }

    #[test]
    fn io_errors_propagate() {
        let err = scan(&Failing(64), MARKER, &ScanOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn async_scan_matches_blocking_scan() {
        let data = buffer(97, &[3, 41, 80]);
        for chunk_size in [1, 4, 9, 33, 97, 1000] {
            let options = options(chunk_size, u64::MAX);
            assert_eq!(
                scan_async(&data, MARKER, &options).await.unwrap(),
                scan(&data, MARKER, &options).unwrap(),
                "chunk_size={chunk_size}"
            );
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Filler bytes never contain a lowercase letter, so they cannot form
        /// the marker on their own.
        fn arb_filler(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
            proptest::collection::vec(0u8..0x60, 0..=max_len)
        }

        fn arb_single_marker() -> impl Strategy<Value = (Vec<u8>, usize, u64)> {
            arb_filler(256).prop_flat_map(|filler| {
                let len = filler.len() + MARKER.len();
                (Just(filler), 0..=len - MARKER.len(), 1..=len as u64)
            })
            .prop_map(|(filler, offset, chunk_size)| {
                let mut data = filler;
                data.splice(offset..offset, MARKER.iter().copied());
                (data, offset, chunk_size)
            })
        }

        proptest! {
            #[test]
            fn absent_marker_is_never_found(
                data in arb_filler(512),
                chunk_size in 1u64..600,
            ) {
                let options = options(chunk_size, data.len() as u64);
                prop_assert_eq!(scan(&data, MARKER, &options).unwrap(), None);
            }

            #[test]
            fn single_marker_is_found_for_any_chunk_size(
                (data, offset, chunk_size) in arb_single_marker(),
            ) {
                let options = options(chunk_size, data.len() as u64);
                prop_assert_eq!(scan(&data, MARKER, &options).unwrap(), Some(offset as u64));
            }

            #[test]
            fn found_offset_points_at_the_marker(
                data in proptest::collection::vec(prop_oneof![Just(b'm'), Just(b'v'), Just(b'h'), Just(b'd')], 0..300),
                chunk_size in 1u64..64,
            ) {
                if let Some(offset) = scan(&data, MARKER, &options(chunk_size, u64::MAX)).unwrap() {
                    let offset = offset as usize;
                    prop_assert_eq!(&data[offset..offset + MARKER.len()], MARKER);
                } else {
                    prop_assert!(!data.windows(MARKER.len()).any(|w| w == MARKER));
                }
            }
        }
    }
}
