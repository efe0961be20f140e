// nfadiff — measures how many packets of a capture lie in the symmetric
// difference of the languages of two NFAs.
//
// Pipeline: capture source -> header-chain dissector -> differential
// evaluator -> report.

pub mod capture;
pub mod cli;
pub mod counters;
pub mod dissect;
pub mod error;
pub mod eval;
pub mod nfa;
pub mod output;
