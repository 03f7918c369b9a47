use serde::{Deserialize, Serialize};

/// One named stream record extracted from an M3U playlist.
///
/// `raw_header` keeps the original `#EXTINF:` line verbatim so the entry can
/// be written back out unchanged (round-trip contract for result fragments).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub name: String,
    pub raw_header: String,
    pub address: String,
}

/// The classification produced by probing one entry's address.
/// `diagnostic` is empty when the entry is reachable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub entry: StreamEntry,
    pub reachable: bool,
    pub diagnostic: String,
}

/// An unreachable entry paired with the diagnostic from its probe.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnreachableEntry {
    pub entry: StreamEntry,
    pub diagnostic: String,
}

/// Aggregate scan results and counters.
///
/// Built incrementally: feed outcomes through [`ScanSummary::record`] as
/// they arrive. Duplicate addresses are kept as separate items; the playlist
/// may legitimately list the same stream under two names.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanSummary {
    pub total: u64,
    pub reachable_count: u64,
    pub unreachable_count: u64,
    pub reachable: Vec<StreamEntry>,
    pub unreachable: Vec<UnreachableEntry>,
}

impl ScanSummary {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Partition one outcome into the reachable or unreachable set.
    pub fn record(&mut self, outcome: ProbeOutcome) {
        if outcome.reachable {
            self.reachable_count += 1;
            self.reachable.push(outcome.entry);
        } else {
            self.unreachable_count += 1;
            self.unreachable.push(UnreachableEntry {
                entry: outcome.entry,
                diagnostic: outcome.diagnostic,
            });
        }
    }

    /// True once every entry has an outcome (never true after an early cancel).
    pub fn is_complete(&self) -> bool {
        self.reachable_count + self.unreachable_count == self.total
    }
}
