//! Streaming sentinel detection
//!
//! The interpreter's output is forwarded byte-for-byte except for the
//! termination sentinel, which may arrive split over any number of reads.
//! The scanner holds back a trailing partial match until the following
//! bytes confirm or rule it out.

use crate::transport::subprocess::config::SENTINEL;

/// Result of feeding one chunk to the scanner
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Scan {
    /// Bytes safe to forward, with sentinels removed
    pub output: Vec<u8>,
    /// Whether at least one sentinel was removed from this chunk
    pub found: bool,
}

/// Incremental sentinel scanner
#[derive(Debug, Clone)]
pub struct SentinelScanner {
    marker: &'static [u8],
    pending: Vec<u8>,
}

impl Default for SentinelScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SentinelScanner {
    /// Scanner for the standard esoplay sentinel
    #[must_use]
    pub fn new() -> Self {
        Self::with_marker(SENTINEL.as_bytes())
    }

    /// Scanner for an arbitrary non-empty marker
    ///
    /// # Panics
    /// Panics if `marker` is empty
    #[must_use]
    pub fn with_marker(marker: &'static [u8]) -> Self {
        assert!(!marker.is_empty(), "sentinel marker must not be empty");
        Self {
            marker,
            pending: Vec::new(),
        }
    }

    /// Number of bytes currently held back as a possible partial marker
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Feed a chunk of output
    pub fn feed(&mut self, chunk: &[u8]) -> Scan {
        self.pending.extend_from_slice(chunk);

        let mut scan = Scan::default();
        while let Some(pos) = find(&self.pending, self.marker) {
            scan.output.extend_from_slice(&self.pending[..pos]);
            self.pending.drain(..pos + self.marker.len());
            scan.found = true;
        }

        let hold = self.partial_suffix_len();
        let emit = self.pending.len() - hold;
        scan.output.extend(self.pending.drain(..emit));
        scan
    }

    /// Release everything still held back; no further bytes will arrive
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }

    /// Length of the longest suffix of `pending` that is a proper prefix of the marker
    fn partial_suffix_len(&self) -> usize {
        let longest = self.pending.len().min(self.marker.len() - 1);
        (1..=longest)
            .rev()
            .find(|&k| self.pending.ends_with(&self.marker[..k]))
            .unwrap_or(0)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_output_passes_through() {
        let mut scanner = SentinelScanner::new();
        let scan = scanner.feed(b"hello world\n");
        assert_eq!(scan.output, b"hello world\n");
        assert!(!scan.found);
        assert_eq!(scanner.pending_len(), 0);
    }

    #[test]
    fn test_sentinel_is_stripped() {
        let mut scanner = SentinelScanner::new();
        let scan = scanner.feed(b"OUT:K=T=0\n>>ESOPLAY.TERMINATE<<");
        assert_eq!(scan.output, b"OUT:K=T=0\n");
        assert!(scan.found);
    }

    #[test]
    fn test_sentinel_in_the_middle() {
        let mut scanner = SentinelScanner::new();
        let scan = scanner.feed(b"ab>>ESOPLAY.TERMINATE<<cd");
        assert_eq!(scan.output, b"abcd");
        assert!(scan.found);
    }

    #[test]
    fn test_sentinel_split_across_reads() {
        let mut scanner = SentinelScanner::new();
        let first = scanner.feed(b"frame>>ESOPLAY.TER");
        assert_eq!(first.output, b"frame");
        assert!(!first.found);
        assert_eq!(scanner.pending_len(), ">>ESOPLAY.TER".len());

        let second = scanner.feed(b"MINATE<<tail");
        assert_eq!(second.output, b"tail");
        assert!(second.found);
    }

    #[test]
    fn test_sentinel_split_byte_by_byte() {
        let mut scanner = SentinelScanner::new();
        let mut forwarded = Vec::new();
        let mut found = false;
        for byte in b"x>>ESOPLAY.TERMINATE<<y" {
            let scan = scanner.feed(std::slice::from_ref(byte));
            forwarded.extend(scan.output);
            found |= scan.found;
        }
        forwarded.extend(scanner.finish());
        assert_eq!(forwarded, b"xy");
        assert!(found);
    }

    #[test]
    fn test_false_prefix_is_released() {
        let mut scanner = SentinelScanner::new();
        let first = scanner.feed(b"a >>ESO");
        assert_eq!(first.output, b"a ");
        let second = scanner.feed(b"TERIC");
        assert_eq!(second.output, b">>ESOTERIC");
        assert!(!second.found);
    }

    #[test]
    fn test_overlapping_prefix_restarts_match() {
        let mut scanner = SentinelScanner::new();
        let scan = scanner.feed(b">>>ESOPLAY.TERMINATE<<");
        assert_eq!(scan.output, b">");
        assert!(scan.found);
    }

    #[test]
    fn test_every_occurrence_is_stripped() {
        let mut scanner = SentinelScanner::new();
        let scan = scanner.feed(b"1>>ESOPLAY.TERMINATE<<2>>ESOPLAY.TERMINATE<<3");
        assert_eq!(scan.output, b"123");
        assert!(scan.found);
    }

    #[test]
    fn test_finish_releases_partial_marker() {
        let mut scanner = SentinelScanner::new();
        let scan = scanner.feed(b"end>>");
        assert_eq!(scan.output, b"end");
        assert_eq!(scanner.finish(), b">>");
        assert_eq!(scanner.pending_len(), 0);
    }

    #[test]
    fn test_custom_marker() {
        let mut scanner = SentinelScanner::with_marker(b"<<EOF>>");
        let scan = scanner.feed(b"data<<EOF>>");
        assert_eq!(scan.output, b"data");
        assert!(scan.found);
    }
}
