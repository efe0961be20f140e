// Classification buckets accumulated over one evaluation run.
//
// An explicit aggregator object rather than process-global counters: every
// bucket is a monotonically incremented u64, and two aggregates can be
// merged with an associative per-field sum, so a future sharded run could
// combine per-shard snapshots.

use serde::Serialize;

use crate::dissect::DropReason;

/// One bucket per protocol/encapsulation layer seen while walking a header
/// chain, plus the terminal per-frame outcomes and the evaluation tallies.
///
/// Terminal buckets are write-once-per-frame: each processed frame increments
/// exactly one of `payloaded`, `empty_payload`, or a drop-reason bucket, so
/// `payloaded + empty_payload + drops() == total` always holds.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Frames handed to the evaluator.
    pub total: u64,

    // Layer tallies, incremented once per header encountered. These are
    // diagnostic: a frame dropped inside a truncated IPv4 header still
    // counts one `ipv4`.
    pub vlan: u64,
    pub ipv4: u64,
    pub ipv6: u64,
    pub tcp: u64,
    pub udp: u64,
    pub ipip: u64,
    pub esp: u64,
    pub icmp: u64,
    pub gre: u64,
    pub icmpv6: u64,
    pub v6_fragment: u64,
    pub ip6_in_ip4: u64,
    pub pim: u64,
    pub other_l3: u64,
    pub other_l4: u64,

    // Terminal outcomes.
    pub payloaded: u64,
    pub empty_payload: u64,
    pub unknown_l3: u64,
    pub unsupported_tunnel: u64,
    pub unknown_l4: u64,
    pub malformed_encapsulation: u64,
    pub truncated: u64,

    // Evaluation tallies, updated only for payloaded frames.
    pub accepted_aut1: u64,
    pub accepted_aut2: u64,
    pub inconsistent: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the drop-reason bucket matching `reason`.
    pub fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::UnknownL3 => self.unknown_l3 += 1,
            DropReason::UnsupportedTunnel => self.unsupported_tunnel += 1,
            DropReason::UnknownL4 => self.unknown_l4 += 1,
            DropReason::MalformedEncapsulation => self.malformed_encapsulation += 1,
            DropReason::Truncated => self.truncated += 1,
        }
    }

    /// Sum of all drop-reason buckets.
    pub fn drops(&self) -> u64 {
        self.unknown_l3
            + self.unsupported_tunnel
            + self.unknown_l4
            + self.malformed_encapsulation
            + self.truncated
    }

    /// Fold another aggregate into this one (per-field sum).
    /// Associative and commutative, so shard aggregates merge in any order.
    pub fn merge(&mut self, other: &Counters) {
        self.total += other.total;
        self.vlan += other.vlan;
        self.ipv4 += other.ipv4;
        self.ipv6 += other.ipv6;
        self.tcp += other.tcp;
        self.udp += other.udp;
        self.ipip += other.ipip;
        self.esp += other.esp;
        self.icmp += other.icmp;
        self.gre += other.gre;
        self.icmpv6 += other.icmpv6;
        self.v6_fragment += other.v6_fragment;
        self.ip6_in_ip4 += other.ip6_in_ip4;
        self.pim += other.pim;
        self.other_l3 += other.other_l3;
        self.other_l4 += other.other_l4;
        self.payloaded += other.payloaded;
        self.empty_payload += other.empty_payload;
        self.unknown_l3 += other.unknown_l3;
        self.unsupported_tunnel += other.unsupported_tunnel;
        self.unknown_l4 += other.unknown_l4;
        self.malformed_encapsulation += other.malformed_encapsulation;
        self.truncated += other.truncated;
        self.accepted_aut1 += other.accepted_aut1;
        self.accepted_aut2 += other.accepted_aut2;
        self.inconsistent += other.inconsistent;
    }
}
