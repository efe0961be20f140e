// Differential evaluator.
//
// Drives the dissector over each frame in source order and, when a
// non-empty payload comes out, queries both automata and tallies
// agreement/disagreement. Per-frame conditions are never errors: any
// dissection problem lands in a counter bucket and processing continues.

use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

use crate::counters::Counters;
use crate::dissect::{dissect, DissectOpts, DissectionOutcome, Frame};
use crate::nfa::Nfa;

/// The automaton oracle seam: "does this byte sequence belong to the
/// accepted language." Implemented by [`Nfa`]; tests instrument a fake.
pub trait Acceptor {
    fn accepts(&self, word: &[u8]) -> bool;
}

impl Acceptor for Nfa {
    fn accepts(&self, word: &[u8]) -> bool {
        Nfa::accepts(self, word)
    }
}

impl<T: Acceptor + ?Sized> Acceptor for &T {
    fn accepts(&self, word: &[u8]) -> bool {
        (**self).accepts(word)
    }
}

/// Aggregated result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub counters: Counters,
    /// Wall time from evaluator construction to [`Evaluator::finish`].
    #[serde(serialize_with = "serialize_secs", rename = "elapsed_seconds")]
    pub elapsed: Duration,
}

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Sequential per-frame evaluator; strictly single-threaded, no re-entrancy.
pub struct Evaluator<A> {
    aut1: A,
    aut2: A,
    opts: DissectOpts,
    counters: Counters,
    started: Instant,
}

impl<A: Acceptor> Evaluator<A> {
    pub fn new(aut1: A, aut2: A, opts: DissectOpts) -> Self {
        Self {
            aut1,
            aut2,
            opts,
            counters: Counters::new(),
            started: Instant::now(),
        }
    }

    /// Process one frame: dissect, then (non-empty payload only) query both
    /// automata. Each frame increments exactly one terminal bucket.
    pub fn process(&mut self, frame: &Frame<'_>) {
        self.counters.total += 1;

        match dissect(frame, &self.opts, &mut self.counters) {
            DissectionOutcome::Dropped(reason) => self.counters.record_drop(reason),
            DissectionOutcome::Payload(payload) if payload.is_empty() => {
                // Truncated at or before the payload start; the oracle is
                // never asked about the empty word.
                self.counters.empty_payload += 1;
            }
            DissectionOutcome::Payload(payload) => {
                self.counters.payloaded += 1;
                let in_aut1 = self.aut1.accepts(payload);
                let in_aut2 = self.aut2.accepts(payload);
                if in_aut1 {
                    self.counters.accepted_aut1 += 1;
                }
                if in_aut2 {
                    self.counters.accepted_aut2 += 1;
                }
                if in_aut1 != in_aut2 {
                    self.counters.inconsistent += 1;
                }
            }
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn finish(self) -> RunReport {
        RunReport {
            counters: self.counters,
            elapsed: self.started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    // -----------------------------------------------------------------------
    // Instrumented fake oracle
    // -----------------------------------------------------------------------

    /// Accepts words starting with `prefix`; counts every query.
    struct PrefixAcceptor {
        prefix: u8,
        calls: Cell<u64>,
    }

    impl PrefixAcceptor {
        fn new(prefix: u8) -> Self {
            Self {
                prefix,
                calls: Cell::new(0),
            }
        }
    }

    impl Acceptor for PrefixAcceptor {
        fn accepts(&self, word: &[u8]) -> bool {
            self.calls.set(self.calls.get() + 1);
            word.first() == Some(&self.prefix)
        }
    }

    // -----------------------------------------------------------------------
    // Frame construction (Ethernet/IPv4/UDP wrapping a given payload)
    // -----------------------------------------------------------------------

    fn udp_frame(payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&[0u8; 12]); // MACs
        bytes.extend_from_slice(&0x0800u16.to_be_bytes());
        bytes.push(0x45); // version 4, IHL 5
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.push(17); // UDP
        bytes.extend_from_slice(&[0u8; 10]);
        bytes.extend_from_slice(&[0u8; 8]); // UDP header
        bytes.extend_from_slice(payload);
        bytes
    }

    fn gre_frame() -> Vec<u8> {
        let mut bytes = udp_frame(&[]);
        bytes[14 + 9] = 47; // protocol = GRE
        bytes
    }

    #[test]
    fn dropped_frames_never_reach_the_oracle() {
        let a1 = PrefixAcceptor::new(b'a');
        let a2 = PrefixAcceptor::new(b'b');
        let mut eval = Evaluator::new(&a1, &a2, DissectOpts::default());

        let frame_bytes = gre_frame();
        eval.process(&Frame::new(&frame_bytes, frame_bytes.len() as u32));

        assert_eq!(a1.calls.get(), 0);
        assert_eq!(a2.calls.get(), 0);
        assert_eq!(eval.counters().unsupported_tunnel, 1);
        assert_eq!(eval.counters().payloaded, 0);
    }

    #[test]
    fn empty_payload_never_reaches_the_oracle() {
        let a1 = PrefixAcceptor::new(b'a');
        let a2 = PrefixAcceptor::new(b'b');
        let mut eval = Evaluator::new(&a1, &a2, DissectOpts::default());

        let frame_bytes = udp_frame(&[]);
        eval.process(&Frame::new(&frame_bytes, frame_bytes.len() as u32));

        assert_eq!(a1.calls.get(), 0);
        assert_eq!(a2.calls.get(), 0);
        assert_eq!(eval.counters().empty_payload, 1);
    }

    #[test]
    fn payloaded_frame_queries_both_oracles_once() {
        let a1 = PrefixAcceptor::new(b'a');
        let a2 = PrefixAcceptor::new(b'b');
        let mut eval = Evaluator::new(&a1, &a2, DissectOpts::default());

        let frame_bytes = udp_frame(b"abc");
        eval.process(&Frame::new(&frame_bytes, frame_bytes.len() as u32));

        assert_eq!(a1.calls.get(), 1);
        assert_eq!(a2.calls.get(), 1);
        assert_eq!(eval.counters().payloaded, 1);
        assert_eq!(eval.counters().accepted_aut1, 1);
        assert_eq!(eval.counters().accepted_aut2, 0);
        assert_eq!(eval.counters().inconsistent, 1);
    }

    #[test]
    fn symmetric_difference_matches_ground_truth() {
        // Disjoint single-byte-prefix languages over 100 synthetic payloads:
        // 40 start with 'a' (only aut1 accepts), 35 with 'b' (only aut2),
        // 25 with 'c' (neither). Ground-truth disagreement: 75.
        let a1 = PrefixAcceptor::new(b'a');
        let a2 = PrefixAcceptor::new(b'b');
        let mut eval = Evaluator::new(&a1, &a2, DissectOpts::default());

        let mut expected_inconsistent = 0u64;
        for i in 0..100u32 {
            let lead = match i % 20 {
                0..=7 => b'a',  // 40 frames
                8..=14 => b'b', // 35 frames
                _ => b'c',      // 25 frames
            };
            if lead != b'c' {
                expected_inconsistent += 1;
            }
            let payload = [lead, (i % 256) as u8, b'x'];
            let frame_bytes = udp_frame(&payload);
            eval.process(&Frame::new(&frame_bytes, frame_bytes.len() as u32));
        }

        let c = eval.counters();
        assert_eq!(c.total, 100);
        assert_eq!(c.payloaded, 100);
        assert_eq!(c.accepted_aut1, 40);
        assert_eq!(c.accepted_aut2, 35);
        assert_eq!(c.inconsistent, expected_inconsistent);
        assert_eq!(c.inconsistent, 75);
    }

    #[test]
    fn terminal_buckets_partition_the_frames() {
        let a1 = PrefixAcceptor::new(b'a');
        let a2 = PrefixAcceptor::new(b'b');
        let mut eval = Evaluator::new(&a1, &a2, DissectOpts::default());

        let frames: Vec<Vec<u8>> = vec![
            udp_frame(b"abc"),
            udp_frame(b""),
            gre_frame(),
            vec![0u8; 6],        // truncated link header
            {
                let mut f = udp_frame(b"x");
                f[12] = 0x08;
                f[13] = 0x06; // ARP: unknown L3
                f
            },
        ];
        for bytes in &frames {
            eval.process(&Frame::new(bytes, bytes.len() as u32));
        }

        let c = eval.counters();
        assert_eq!(c.total, frames.len() as u64);
        assert_eq!(c.payloaded + c.empty_payload + c.drops(), c.total);
    }
}
