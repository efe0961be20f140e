use std::io::Write;

use crate::error::DiffError;
use crate::eval::RunReport;

/// Write the run summary in a human-readable form: one line per
/// protocol/encapsulation bucket, the terminal outcome counts, the accept
/// counts for each automaton, the disagreement count, and elapsed time.
pub fn write_pretty(report: &RunReport, writer: &mut impl Write) -> Result<(), DiffError> {
    write_pretty_inner(report, writer).map_err(DiffError::Report)
}

fn write_pretty_inner(report: &RunReport, w: &mut impl Write) -> Result<(), std::io::Error> {
    let c = &report.counters;

    writeln!(w, "Total packets: {}", c.total)?;
    writeln!(w, "Packets with VLAN: {}", c.vlan)?;
    writeln!(w, "Packets with IPv4: {}", c.ipv4)?;
    writeln!(w, "Packets with IPv6: {}", c.ipv6)?;
    writeln!(w, "Packets with other L3 (not processed): {}", c.other_l3)?;
    writeln!(w, "Packets with TCP: {}", c.tcp)?;
    writeln!(w, "Packets with UDP: {}", c.udp)?;
    writeln!(w, "Packets with IPv4-in-IPv4: {}", c.ipip)?;
    writeln!(w, "Packets with ESP: {}", c.esp)?;
    writeln!(w, "Packets with ICMP: {}", c.icmp)?;
    writeln!(w, "Packets with GRE (not processed): {}", c.gre)?;
    writeln!(w, "Packets with ICMPv6: {}", c.icmpv6)?;
    writeln!(w, "Packets with IPv6 fragment: {}", c.v6_fragment)?;
    writeln!(w, "Packets with IPv6-in-IPv4: {}", c.ip6_in_ip4)?;
    writeln!(w, "Packets with PIM (not processed): {}", c.pim)?;
    writeln!(w, "Packets with other L4 (not processed): {}", c.other_l4)?;
    writeln!(w, "Packets truncated: {}", c.truncated)?;
    writeln!(w, "Packets with malformed encapsulation: {}", c.malformed_encapsulation)?;
    writeln!(w, "Packets with empty payload: {}", c.empty_payload)?;
    writeln!(w, "Packets with payload: {}", c.payloaded)?;
    writeln!(w, "Accepted in Aut1: {}", c.accepted_aut1)?;
    writeln!(w, "Accepted in Aut2: {}", c.accepted_aut2)?;
    writeln!(w, "Inconsistent packets: {}", c.inconsistent)?;
    writeln!(w, "Time: {}", report.elapsed.as_secs_f64())?;

    Ok(())
}
