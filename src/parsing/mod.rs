//! Text grammars of the generator's bookkeeping: interconnection references,
//! composite `block/port` tokens and numeric ids embedded in parameter names.

pub mod interconnection;
pub mod port;

pub use interconnection::*;
pub use port::*;

/// Iterates over the maximal runs of ASCII digits in `text`, left to right.
pub fn digit_runs(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
}

/// The first maximal run of ASCII digits, e.g. `"12"` for `"PARAM12"`.
pub fn first_digit_run(text: &str) -> Option<&str> {
    digit_runs(text).next()
}
