/// Messages sent from the scan thread to the consumer via a crossbeam
/// channel.
///
/// Exactly one terminal message (`Completed` or `Cancelled`) ends every
/// scan. The result travels inside `Completed`, so nothing is shared
/// between the worker and the consumer besides the channel and the
/// cancellation flag.
use crate::model::ScanResult;

#[derive(Debug)]
pub enum ScanMessage {
    /// Periodic, coalesced count of directories visited so far.
    Progress { dirs_visited: u64 },
    /// Traversal and aggregation finished; the result is now published.
    Completed(Box<ScanResult>),
    /// The scan stopped on request; no result exists.
    Cancelled,
}

/// Terminal state of a scan, as seen by the consumer.
#[derive(Debug)]
pub enum ScanOutcome {
    Completed(ScanResult),
    Cancelled,
}

impl ScanOutcome {
    pub fn into_result(self) -> Option<ScanResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
