//! Interactive reviewer over stdin.

use std::io::{self, BufRead, Write};

use concept_match_core::review::CandidateOrigin;
use concept_match_core::{Candidate, Decision, DecisionProvider, SourceRecord};

/// Presents each slate on the terminal and reads a numbered choice.
///
/// Invalid input re-prompts; `0` and end-of-input both mean "none of these".
pub struct ConsoleProvider;

impl ConsoleProvider {
    fn print_slate(record: &SourceRecord, candidates: &[Candidate]) {
        println!();
        println!("{}", record.raw_label);
        println!("  0) none of these");
        for (index, candidate) in candidates.iter().enumerate() {
            match candidate.origin {
                CandidateOrigin::Hum => println!(
                    "  {}) {} ({}) [{}]  e.g. {}",
                    index + 1,
                    candidate.label,
                    candidate.concept_code,
                    candidate.score,
                    candidate.full_label,
                ),
                CandidateOrigin::CielBest | CandidateOrigin::Ciel => println!(
                    "  {}) {} ({}) [{}]",
                    index + 1,
                    candidate.label,
                    candidate.concept_code,
                    candidate.score,
                ),
            }
        }
    }

    fn read_choice(limit: usize) -> Decision {
        let stdin = io::stdin();
        loop {
            print!("choice [0-{limit}]: ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return Decision::NoMatch,
                Ok(_) => {}
            }
            match line.trim().parse::<usize>() {
                Ok(0) => return Decision::NoMatch,
                Ok(choice) if choice <= limit => return Decision::Chosen(choice - 1),
                _ => println!("enter a number between 0 and {limit}"),
            }
        }
    }
}

impl DecisionProvider for ConsoleProvider {
    fn choose(&mut self, record: &SourceRecord, candidates: &[Candidate]) -> Decision {
        Self::print_slate(record, candidates);
        Self::read_choice(candidates.len())
    }
}
