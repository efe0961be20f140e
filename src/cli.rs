use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "nfadiff",
    version,
    about = "Tests how many packets of a capture lie in the symmetric \
             difference of the languages of two NFAs"
)]
pub struct Cli {
    /// Path to the first automaton definition (.vtf)
    pub aut1: PathBuf,

    /// Path to the second automaton definition (.vtf)
    pub aut2: PathBuf,

    /// Path to the packet capture (.pcap)
    pub capture: PathBuf,

    /// Output format for the final report
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Print both loaded automata before processing
    #[arg(long)]
    pub dump_automata: bool,

    /// Suppress the progress ticks on stderr
    #[arg(long)]
    pub quiet: bool,

    /// Consume IPv4 headers as a fixed 20 bytes, ignoring the IHL field
    /// (legacy behavior; breaks on packets carrying IPv4 options)
    #[arg(long)]
    pub fixed_ipv4_header: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_three_positional_paths() {
        let cli = parse(&["nfadiff", "a1.vtf", "a2.vtf", "traffic.pcap"]).unwrap();
        assert_eq!(cli.aut1, PathBuf::from("a1.vtf"));
        assert_eq!(cli.aut2, PathBuf::from("a2.vtf"));
        assert_eq!(cli.capture, PathBuf::from("traffic.pcap"));
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(!cli.dump_automata);
        assert!(!cli.quiet);
        assert!(!cli.fixed_ipv4_header);
    }

    #[test]
    fn test_missing_argument_rejected() {
        assert!(parse(&["nfadiff", "a1.vtf", "a2.vtf"]).is_err());
    }

    #[test]
    fn test_extra_argument_rejected() {
        assert!(parse(&["nfadiff", "a", "b", "c", "d"]).is_err());
    }

    #[test]
    fn test_format_json() {
        let cli = parse(&["nfadiff", "a", "b", "c", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(parse(&["nfadiff", "a", "b", "c", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_dump_automata_flag() {
        let cli = parse(&["nfadiff", "a", "b", "c", "--dump-automata"]).unwrap();
        assert!(cli.dump_automata);
    }

    #[test]
    fn test_quiet_flag() {
        let cli = parse(&["nfadiff", "a", "b", "c", "--quiet"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_fixed_ipv4_header_flag() {
        let cli = parse(&["nfadiff", "a", "b", "c", "--fixed-ipv4-header"]).unwrap();
        assert!(cli.fixed_ipv4_header);
    }
}
