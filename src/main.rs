use std::io::{self, Write};

use clap::Parser;

use nfadiff::capture::PacketSource;
use nfadiff::cli::Cli;
use nfadiff::dissect::{DissectOpts, Frame};
use nfadiff::error::DiffError;
use nfadiff::eval::Evaluator;
use nfadiff::nfa::Nfa;
use nfadiff::output;

/// Progress tick cadence: one `#` per this many frames.
const PROGRESS_EVERY: u64 = 1000;

fn exit_code(err: &DiffError) -> i32 {
    match err {
        DiffError::Automaton { .. } | DiffError::Vtf { .. } => 1,
        DiffError::Capture { .. } => 2,
        DiffError::Report(_) => 3,
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code(&e));
        }
    }
}

fn run(cli: Cli) -> Result<(), DiffError> {
    // 1. Load both automata; any failure here aborts before the run starts.
    let aut1 = Nfa::load(&cli.aut1)?;
    let aut2 = Nfa::load(&cli.aut2)?;
    log::info!(
        "aut1: {} states, {} transitions; aut2: {} states, {} transitions",
        aut1.state_count(),
        aut1.transition_count(),
        aut2.state_count(),
        aut2.transition_count()
    );

    if cli.dump_automata {
        println!("aut1:\n{aut1}===================================");
        println!("aut2:\n{aut2}===================================");
    }

    // 2. Open the capture.
    let mut source = PacketSource::open(&cli.capture)?;

    // 3. Stream every frame through the evaluator, in file order.
    let opts = DissectOpts {
        fixed_ipv4_header: cli.fixed_ipv4_header,
    };
    let mut evaluator = Evaluator::new(&aut1, &aut2, opts);
    while let Some(packet) = source.next_packet() {
        let packet = packet?;
        let frame = Frame::new(&packet.data, packet.orig_len);
        evaluator.process(&frame);

        if !cli.quiet && evaluator.counters().total % PROGRESS_EVERY == 0 {
            eprint!("#");
            let _ = io::stderr().flush();
        }
    }
    if !cli.quiet && evaluator.counters().total >= PROGRESS_EVERY {
        eprintln!();
    }

    // 4. Report.
    let report = evaluator.finish();
    log::info!(
        "processed {} frames in {:.3}s",
        report.counters.total,
        report.elapsed.as_secs_f64()
    );
    output::write_report(&report, cli.format, &mut io::stdout().lock())
}
