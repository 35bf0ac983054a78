//! Race commentary lines
//!
//! Stateless: the same participant, opponent and elapsed time always yield the
//! same line.

use super::state::Participant;

/// Upper bounds of the elapsed-time bands
const EARLY_MS: f64 = 2_000.0;
const MID_MS: f64 = 5_000.0;
const LATE_MS: f64 = 8_000.0;

pub fn commentary_line(participant: &Participant, opponent: &Participant, elapsed_ms: f64) -> String {
    let gap = participant.position - opponent.position;
    let name = &participant.name;

    if elapsed_ms < EARLY_MS {
        "The race begins! Both networks are accelerating...".to_string()
    } else if elapsed_ms < MID_MS {
        if gap > 5.0 {
            format!("{name} is performing well and keeping the lead!")
        } else if gap < -5.0 {
            format!("{name} is falling behind and needs a boost!")
        } else {
            "Both sides are neck and neck. The competition is intense!".to_string()
        }
    } else if elapsed_ms < LATE_MS {
        if gap > 10.0 {
            format!("{name} has a clear advantage and a stable connection.")
        } else if gap < -10.0 {
            format!("{name} is struggling with network stability...")
        } else {
            "The race is entering its heated phase!".to_string()
        }
    } else if gap > 5.0 {
        format!("{name} is about to win!")
    } else if gap < -5.0 {
        format!("{name} can still catch up!")
    } else {
        "Final sprint! The outcome is still uncertain.".to_string()
    }
}
