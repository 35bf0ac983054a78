//! Frame-loop driver
//!
//! Feeds wall-clock frame deltas into the step, holding the simulation to the
//! wall clock with a per-frame cap, and turns the finished race into a result
//! and analysis. A broken state ends the race with a fallback outcome instead
//! of propagating an error.

use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, Analyst, RuleAnalyst};
use crate::cards::Card;
use crate::consts::{CLOSE_FINISH_GAP, FRAME_MS};
use crate::settings::RaceSettings;
use crate::sim::{CardModel, Participant, RaceModel, RaceState, advance};

pub const USER_ID: &str = "user";
pub const OPPONENT_ID: &str = "opponent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    User,
    Opponent,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub winner: Winner,
    /// Absolute finishing gap in track percent
    pub difference: f64,
    pub user_position: f64,
    pub opponent_position: f64,
}

impl RaceResult {
    /// Gaps under two points are called close
    pub fn from_positions(user_position: f64, opponent_position: f64) -> Self {
        let difference = (user_position - opponent_position).abs();
        let winner = if difference < CLOSE_FINISH_GAP {
            Winner::Close
        } else if user_position > opponent_position {
            Winner::User
        } else {
            Winner::Opponent
        };
        Self {
            winner,
            difference,
            user_position,
            opponent_position,
        }
    }

    fn aborted() -> Self {
        Self {
            winner: Winner::Close,
            difference: 0.0,
            user_position: 0.0,
            opponent_position: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceOutcome {
    pub result: RaceResult,
    pub analysis: Analysis,
}

impl RaceOutcome {
    /// Terminal outcome when the race could not run to completion
    pub fn engine_failure() -> Self {
        Self {
            result: RaceResult::aborted(),
            analysis: Analysis::engine_failure(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RacePhase {
    Racing,
    Finished(RaceOutcome),
}

/// Settings that cannot finish a race are swapped for the stock ones
fn checked(settings: RaceSettings) -> RaceSettings {
    match settings.validate() {
        Ok(()) => settings,
        Err(err) => {
            log::warn!("{err}, falling back to default settings");
            RaceSettings::default()
        }
    }
}

/// Owns one race from start line to outcome
#[derive(Debug)]
pub struct RaceDriver<A: Analyst = RuleAnalyst, M: RaceModel = CardModel> {
    state: RaceState,
    user_cards: Vec<Card>,
    settings: RaceSettings,
    phase: RacePhase,
    /// Wall-clock time fed in so far, the simulation never runs ahead of it
    wall_ms: f64,
    analyst: A,
    model: M,
}

impl RaceDriver {
    /// Line up "Your Network" against "Opponent Network"
    pub fn start(
        user_cards: Vec<Card>,
        opponent_cards: Vec<Card>,
        run_id: u64,
        settings: RaceSettings,
    ) -> Self {
        Self::with_parts(user_cards, opponent_cards, run_id, settings, RuleAnalyst, CardModel)
    }
}

impl<A: Analyst, M: RaceModel> RaceDriver<A, M> {
    pub fn with_parts(
        user_cards: Vec<Card>,
        opponent_cards: Vec<Card>,
        run_id: u64,
        settings: RaceSettings,
        analyst: A,
        model: M,
    ) -> Self {
        let settings = checked(settings);
        let participants = vec![
            Participant::new(USER_ID, "Your Network", user_cards.clone()),
            Participant::new(OPPONENT_ID, "Opponent Network", opponent_cards),
        ];
        let state = RaceState::new(participants, settings.duration_ms, run_id);
        log::info!(
            "Race started (run {}, {}ms, seed {:#010x})",
            run_id,
            state.duration,
            state.rng.state()
        );
        Self {
            state,
            user_cards,
            settings,
            phase: RacePhase::Racing,
            wall_ms: 0.0,
            analyst,
            model,
        }
    }

    /// Resume from an existing state, e.g. one loaded from JSON
    ///
    /// A state whose clock cannot reach its duration is ended straight away.
    pub fn resume(state: RaceState, user_cards: Vec<Card>, settings: RaceSettings, analyst: A, model: M) -> Self {
        let mut driver = Self {
            wall_ms: state.elapsed_time,
            state,
            user_cards,
            settings: checked(settings),
            phase: RacePhase::Racing,
            analyst,
            model,
        };
        if !(driver.state.duration.is_finite() && driver.state.elapsed_time.is_finite()) {
            log::warn!(
                "Resumed race has an unreachable finish ({}ms of {}ms), ending race",
                driver.state.elapsed_time,
                driver.state.duration
            );
            driver.finish(RaceOutcome::engine_failure());
        }
        driver
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn phase(&self) -> &RacePhase {
        &self.phase
    }

    pub fn settings(&self) -> &RaceSettings {
        &self.settings
    }

    pub fn outcome(&self) -> Option<&RaceOutcome> {
        match &self.phase {
            RacePhase::Finished(outcome) => Some(outcome),
            RacePhase::Racing => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, RacePhase::Finished(_))
    }

    /// Feed one frame of wall-clock time. Returns the outcome once the race ends.
    pub fn advance(&mut self, frame_ms: f64) -> Option<&RaceOutcome> {
        if self.is_finished() {
            return self.outcome();
        }
        if !frame_ms.is_finite() {
            log::warn!("Non-finite frame delta {frame_ms}, ending race");
            return self.finish(RaceOutcome::engine_failure());
        }

        let raw = frame_ms.max(0.0);
        self.wall_ms += raw;
        let desired = self.wall_ms.min(self.state.duration);
        let behind = (desired - self.state.elapsed_time).max(0.0);
        let delta = raw.min(self.settings.max_frame_ms).min(behind);

        advance(&self.model, &mut self.state, delta);

        if self.state.is_finished() {
            let outcome = self.conclude();
            return self.finish(outcome);
        }
        None
    }

    /// Drive fixed frames until the race ends
    pub fn run_to_completion(&mut self, frame_ms: f64) -> RaceOutcome {
        let frame_ms = if frame_ms.is_finite() && frame_ms > 0.0 {
            frame_ms
        } else {
            FRAME_MS
        };
        loop {
            if let Some(outcome) = self.advance(frame_ms) {
                return outcome.clone();
            }
        }
    }

    fn conclude(&self) -> RaceOutcome {
        let (Some(user), Some(opponent)) = (
            self.state.participant(USER_ID),
            self.state.participant(OPPONENT_ID),
        ) else {
            log::warn!("Finished race is missing the user or opponent, using fallback outcome");
            return RaceOutcome::engine_failure();
        };

        let cards = if user.cards.is_empty() {
            &self.user_cards
        } else {
            &user.cards
        };
        let analysis = match self.analyst.analyze(cards, user.position, opponent.position) {
            Ok(analysis) => analysis,
            Err(err) => {
                log::warn!("Analysis failed: {err}");
                Analysis::fallback()
            }
        };

        RaceOutcome {
            result: RaceResult::from_positions(user.position, opponent.position),
            analysis,
        }
    }

    fn finish(&mut self, outcome: RaceOutcome) -> Option<&RaceOutcome> {
        log::info!(
            "Race over: {:?} by {:.2}",
            outcome.result.winner,
            outcome.result.difference
        );
        self.phase = RacePhase::Finished(outcome);
        self.outcome()
    }
}
