// Header-chain dissector.
//
// Walks an a-priori-unknown stack of nested protocol headers (Ethernet,
// optional 802.1Q tag, IPv4/IPv6, then an open-ended chain of tunnel and
// extension headers down to a transport header) using only length and type
// fields found inside the frame, and returns the application payload slice.
//
// Every field read is bounds-checked against the captured length; a header
// that would straddle the captured range classifies the frame as truncated
// instead of reading out of range. The dispatch is an explicit state
// machine: each protocol case yields a `Step` that either consumes bytes
// and continues with a new protocol number, consumes bytes and terminates,
// or rejects the frame with a drop reason.

use crate::counters::Counters;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

// Ethernet
const ETH_HLEN: usize = 14;
const VLAN_ETH_HLEN: usize = 18;
const ETH_TYPE_OFFSET: usize = 12;
const VLAN_INNER_TYPE_OFFSET: usize = 16;
const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_VLAN: u16 = 0x8100;
const ETHERTYPE_IPV6: u16 = 0x86DD;

// IPv4
const IPV4_MIN_HLEN: usize = 20;
const IPV4_PROTO_OFFSET: usize = 9;

// IPv6
const IPV6_HLEN: usize = 40;
const IPV6_NEXT_HDR_OFFSET: usize = 6;

// Fixed transport/extension header sizes
const UDP_HLEN: usize = 8;
const ICMP_HLEN: usize = 8;
const ESP_PREFIX_LEN: usize = 8; // SPI + sequence number
const FRAG_HLEN: usize = 8;
const TCP_DOFF_OFFSET: usize = 12;

// IP protocol numbers
const PROTO_ICMP: u8 = 1;
const PROTO_IPIP: u8 = 4;
const PROTO_TCP: u8 = 6;
const PROTO_UDP: u8 = 17;
const PROTO_IPV6: u8 = 41;
const PROTO_FRAGMENT: u8 = 44;
const PROTO_GRE: u8 = 47;
const PROTO_ESP: u8 = 50;
const PROTO_ICMPV6: u8 = 58;
const PROTO_PIM: u8 = 103;

// ---------------------------------------------------------------------------
// Frame and outcome types
// ---------------------------------------------------------------------------

/// Immutable view over the raw bytes of one captured packet.
///
/// `data` holds the captured bytes; `orig_len` is the length on the wire,
/// which may exceed `data.len()` when the capture was truncated.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    data: &'a [u8],
    orig_len: u32,
}

impl<'a> Frame<'a> {
    pub fn new(data: &'a [u8], orig_len: u32) -> Self {
        Self { data, orig_len }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn captured_len(&self) -> usize {
        self.data.len()
    }

    pub fn orig_len(&self) -> u32 {
        self.orig_len
    }
}

/// Why no payload could be extracted from a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// EtherType other than IPv4/IPv6.
    UnknownL3,
    /// GRE or PIM encapsulation; not parsed further.
    UnsupportedTunnel,
    /// Unrecognized IP protocol number.
    UnknownL4,
    /// Second nested IPv4-in-IPv4 encapsulation.
    MalformedEncapsulation,
    /// A header needed for dispatch is cut off by the captured length, or
    /// carries an impossible length field (IPv4 IHL < 5).
    Truncated,
}

/// Result of dissecting one frame: the payload slice (possibly empty when
/// the capture ends at or before the payload start) or a drop reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DissectionOutcome<'a> {
    Payload(&'a [u8]),
    Dropped(DropReason),
}

/// Dissector configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct DissectOpts {
    /// Consume IPv4 headers as a fixed 20 bytes, ignoring the IHL field.
    /// Legacy mode; desynchronizes the cursor when IPv4 options are present.
    pub fixed_ipv4_header: bool,
}

/// One transition of the header-chain state machine.
enum Step {
    /// Consume `consumed` bytes and dispatch on `next` (an IP protocol number).
    Continue { consumed: usize, next: u8 },
    /// Consume `consumed` bytes; the payload starts after them.
    Terminal { consumed: usize },
    /// Stop with a drop reason.
    Reject(DropReason),
}

// ---------------------------------------------------------------------------
// Bounds-checked field reads
// ---------------------------------------------------------------------------

fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

fn read_u16_be(data: &[u8], offset: usize) -> Option<u16> {
    let hi = data.get(offset)?;
    let lo = data.get(offset + 1)?;
    Some(u16::from_be_bytes([*hi, *lo]))
}

// ---------------------------------------------------------------------------
// Per-protocol steps
// ---------------------------------------------------------------------------

/// Consume an IPv4 header starting at `offset`, returning (header length,
/// protocol number). Header length comes from the IHL field unless
/// `fixed_ipv4_header` is set.
fn ipv4_header(data: &[u8], offset: usize, opts: &DissectOpts) -> Result<(usize, u8), DropReason> {
    let hlen = if opts.fixed_ipv4_header {
        IPV4_MIN_HLEN
    } else {
        let b = read_u8(data, offset).ok_or(DropReason::Truncated)?;
        ((b & 0x0F) as usize) * 4
    };
    if hlen < IPV4_MIN_HLEN || offset + hlen > data.len() {
        return Err(DropReason::Truncated);
    }
    let proto = read_u8(data, offset + IPV4_PROTO_OFFSET).ok_or(DropReason::Truncated)?;
    Ok((hlen, proto))
}

/// Consume the fixed 40-byte IPv6 header, returning (40, next-header).
fn ipv6_header(data: &[u8], offset: usize) -> Result<(usize, u8), DropReason> {
    if offset + IPV6_HLEN > data.len() {
        return Err(DropReason::Truncated);
    }
    Ok((IPV6_HLEN, data[offset + IPV6_NEXT_HDR_OFFSET]))
}

/// TCP: header length is the data-offset field times four. Terminal.
fn tcp_step(data: &[u8], offset: usize) -> Step {
    match read_u8(data, offset + TCP_DOFF_OFFSET) {
        Some(b) => Step::Terminal {
            consumed: ((b >> 4) as usize) * 4,
        },
        None => Step::Reject(DropReason::Truncated),
    }
}

/// IPv6 Fragment extension header: fixed 8 bytes, chains to its next-header
/// field. No reassembly; only the first fragment's bytes are ever visible.
fn fragment_step(data: &[u8], offset: usize) -> Step {
    if offset + FRAG_HLEN > data.len() {
        return Step::Reject(DropReason::Truncated);
    }
    Step::Continue {
        consumed: FRAG_HLEN,
        next: data[offset],
    }
}

// ---------------------------------------------------------------------------
// Dissection
// ---------------------------------------------------------------------------

/// Dissect one frame into a payload slice or a drop reason.
///
/// Deterministic in the frame bytes and `opts`; the only side effect is the
/// diagnostic layer tallies recorded into `counters` (one bucket per header
/// type encountered while walking the chain).
pub fn dissect<'a>(
    frame: &Frame<'a>,
    opts: &DissectOpts,
    counters: &mut Counters,
) -> DissectionOutcome<'a> {
    let data = frame.data;
    let captured = data.len();

    // Link layer: base Ethernet header, re-read through the 802.1Q header
    // when the EtherType is the VLAN tag marker.
    let mut offset = ETH_HLEN;
    let mut ether_type = match read_u16_be(data, ETH_TYPE_OFFSET) {
        Some(t) => t,
        None => return DissectionOutcome::Dropped(DropReason::Truncated),
    };
    if ether_type == ETHERTYPE_VLAN {
        counters.vlan += 1;
        offset = VLAN_ETH_HLEN;
        ether_type = match read_u16_be(data, VLAN_INNER_TYPE_OFFSET) {
            Some(t) => t,
            None => return DissectionOutcome::Dropped(DropReason::Truncated),
        };
    }

    // Network layer dispatch.
    let header = match ether_type {
        ETHERTYPE_IPV4 => {
            counters.ipv4 += 1;
            ipv4_header(data, offset, opts)
        }
        ETHERTYPE_IPV6 => {
            counters.ipv6 += 1;
            ipv6_header(data, offset)
        }
        _ => {
            counters.other_l3 += 1;
            return DissectionOutcome::Dropped(DropReason::UnknownL3);
        }
    };
    let mut next = match header {
        Ok((consumed, next)) => {
            offset += consumed;
            next
        }
        Err(reason) => return DissectionOutcome::Dropped(reason),
    };

    // Transport/extension-header loop. `ipip_depth` rejects a second nested
    // IPv4-in-IPv4 tunnel as a classified outcome, so one adversarial packet
    // cannot halt a whole run.
    let mut ipip_depth: u8 = 0;
    loop {
        let step = match next {
            PROTO_TCP => {
                counters.tcp += 1;
                tcp_step(data, offset)
            }
            PROTO_UDP => {
                counters.udp += 1;
                Step::Terminal { consumed: UDP_HLEN }
            }
            PROTO_IPIP => {
                counters.ipip += 1;
                if ipip_depth >= 1 {
                    Step::Reject(DropReason::MalformedEncapsulation)
                } else {
                    ipip_depth += 1;
                    match ipv4_header(data, offset, opts) {
                        Ok((consumed, next)) => Step::Continue { consumed, next },
                        Err(reason) => Step::Reject(reason),
                    }
                }
            }
            PROTO_ESP => {
                counters.esp += 1;
                // SPI + sequence prefix only; the body is encrypted.
                Step::Terminal {
                    consumed: ESP_PREFIX_LEN,
                }
            }
            PROTO_ICMP => {
                counters.icmp += 1;
                Step::Terminal {
                    consumed: ICMP_HLEN,
                }
            }
            PROTO_GRE => {
                counters.gre += 1;
                Step::Reject(DropReason::UnsupportedTunnel)
            }
            PROTO_ICMPV6 => {
                counters.icmpv6 += 1;
                Step::Terminal {
                    consumed: ICMP_HLEN,
                }
            }
            PROTO_FRAGMENT => {
                counters.v6_fragment += 1;
                fragment_step(data, offset)
            }
            PROTO_IPV6 => {
                // IPv6-in-IPv4: the inner IPv6 header is consumed and the
                // payload starts right after it. Terminal, and no depth
                // limit in this direction (intentional asymmetry vs. IPIP).
                counters.ip6_in_ip4 += 1;
                Step::Terminal {
                    consumed: IPV6_HLEN,
                }
            }
            PROTO_PIM => {
                counters.pim += 1;
                Step::Reject(DropReason::UnsupportedTunnel)
            }
            other => {
                log::debug!("unknown L4 protocol {other}");
                counters.other_l4 += 1;
                Step::Reject(DropReason::UnknownL4)
            }
        };

        match step {
            Step::Continue { consumed, next: n } => {
                offset += consumed;
                next = n;
            }
            Step::Terminal { consumed } => {
                offset += consumed;
                break;
            }
            Step::Reject(reason) => return DissectionOutcome::Dropped(reason),
        }
    }

    // A terminal header's declared length may run past the captured range
    // (truncated capture); the payload is then empty, never out of range.
    DissectionOutcome::Payload(&data[offset.min(captured)..captured])
}

// ===========================================================================
// Unit tests
// ===========================================================================
