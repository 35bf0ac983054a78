//! Run-panel telemetry
//!
//! Turns the event log into per-segment smoothness scores and short "now" and
//! "trend" sentences. Read-only over the race state.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Stat, average_stat};
use crate::clamp;
use crate::sim::{ActiveEffect, EventKind, Lcg, RaceEvent, RaceState};

/// Window the summary looks back over
pub const RECENT_WINDOW_MS: f64 = 5_000.0;
/// Events shown in the panel feed
pub const FEED_LEN: usize = 8;

const RHYTHM_BASE: f64 = 0.74;
const BASELINE_CENTER: f64 = 0.86;

/// One time slice of a smoothness chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RhythmSegment {
    pub index: usize,
    pub start_ms: f64,
    pub end_ms: f64,
    /// 0-1, higher is smoother
    pub smoothness: f64,
}

fn empty_segments(duration: f64, segments: usize, mut score: impl FnMut() -> f64) -> Vec<RhythmSegment> {
    let slice = duration / segments.max(1) as f64;
    (0..segments)
        .map(|index| RhythmSegment {
            index,
            start_ms: (index as f64 * slice).round(),
            end_ms: ((index + 1) as f64 * slice).round(),
            smoothness: score(),
        })
        .collect()
}

/// Reference rhythm for comparison, reproducible from the run id
pub fn global_baseline(duration: f64, segments: usize, run_id: u64) -> Vec<RhythmSegment> {
    let seed = match run_id as u32 {
        0 => 1,
        seed => seed,
    };
    let mut rng = Lcg::new(seed);
    empty_segments(duration, segments, || {
        let wobble = (rng.next_f64() - 0.5) * 0.08;
        clamp(BASELINE_CENTER + wobble, 0.7, 0.98)
    })
}

impl EventKind {
    /// Smoothness change a single event applies to its segment
    pub fn rhythm_impact(&self) -> f64 {
        match self {
            EventKind::Jitter => -0.2,
            EventKind::Stall => -0.32,
            EventKind::Drop => -0.4,
            EventKind::Surge => 0.18,
        }
    }
}

/// Smoothness chart for a set of events.
///
/// Each event hits its own segment in full and spills 40% into the next one.
pub fn rhythm_segments<'a>(
    duration: f64,
    segments: usize,
    events: impl IntoIterator<Item = &'a RaceEvent>,
) -> Vec<RhythmSegment> {
    let mut buckets = empty_segments(duration, segments, || RHYTHM_BASE);
    if buckets.is_empty() {
        return buckets;
    }
    let slice = duration / segments as f64;
    let last = segments - 1;

    for event in events {
        let idx = if slice > 0.0 {
            clamp((event.time_ms / slice).floor(), 0.0, last as f64) as usize
        } else {
            0
        };
        let impact = event.kind.rhythm_impact();
        let hit = &mut buckets[idx].smoothness;
        *hit = clamp(*hit + impact, 0.1, 0.98);
        if idx < last {
            let spill = &mut buckets[idx + 1].smoothness;
            *spill = clamp(*spill + impact * 0.4, 0.1, 0.98);
        }
    }
    buckets
}

/// Up to two short hints about what the deck does for rhythm
pub fn card_narrative(cards: &[Card]) -> String {
    if cards.is_empty() {
        return String::new();
    }
    let hints = [
        (average_stat(cards, Stat::Stability) >= 80.0, "Steady cards dampen hiccups."),
        (
            average_stat(cards, Stat::Predictability) >= 80.0,
            "Predictable cards keep rhythm calmer.",
        ),
        (average_stat(cards, Stat::Delay) <= 25.0, "Fast-response cards shorten pauses."),
        (average_stat(cards, Stat::Burst) >= 80.0, "Burst cards unlock brief surges."),
    ];
    hints
        .iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, line)| *line)
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySummary {
    pub now_text: String,
    pub trend_text: String,
}

/// Describe the current moment and recent trend
pub fn summarize<'a>(
    events: impl IntoIterator<Item = &'a RaceEvent>,
    elapsed_ms: f64,
    cards: &[Card],
) -> TelemetrySummary {
    let recent: Vec<&RaceEvent> = events
        .into_iter()
        .filter(|e| elapsed_ms - e.time_ms <= RECENT_WINDOW_MS)
        .collect();

    let now_text = match recent.last().map(|e| e.kind) {
        None => "Running steady.",
        Some(EventKind::Surge) => "A short boost just kicked in.",
        Some(EventKind::Jitter) => "Rhythm wobble is visible right now.",
        Some(EventKind::Stall) => "Response feels delayed at the moment.",
        Some(EventKind::Drop) => "A brief dip slowed the pace.",
    };

    let hiccups = recent.iter().filter(|e| e.kind.is_disruptive()).count();
    let trend = if hiccups >= 2 {
        "Recent moments show uneven pacing and small hiccups."
    } else {
        "Overall pace stays readable and consistent."
    };

    let hint = card_narrative(cards);
    let trend_text = if hint.is_empty() {
        trend.to_string()
    } else {
        format!("{trend} {hint}")
    };

    TelemetrySummary {
        now_text: now_text.to_string(),
        trend_text,
    }
}

/// Single-word mood for the panel badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feel {
    Smooth,
    Pause,
    Jitter,
    Surge,
}

impl Feel {
    /// Pauses outrank wobble, which outranks a boost
    pub fn from_effects(effects: &[ActiveEffect]) -> Self {
        let has = |kind| effects.iter().any(|e| e.kind == kind);
        if has(EventKind::Stall) || has(EventKind::Drop) {
            Feel::Pause
        } else if has(EventKind::Jitter) {
            Feel::Jitter
        } else if has(EventKind::Surge) {
            Feel::Surge
        } else {
            Feel::Smooth
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feel::Smooth => "smooth",
            Feel::Pause => "pause",
            Feel::Jitter => "jitter",
            Feel::Surge => "surge",
        }
    }
}

/// Everything the run panel renders for one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub baseline: Vec<RhythmSegment>,
    pub rhythm: Vec<RhythmSegment>,
    pub summary: TelemetrySummary,
    pub feel: Feel,
    /// Newest first
    pub feed: Vec<RaceEvent>,
}

/// Which log entries a snapshot reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventScope {
    /// The whole race log, as the run panel shows it
    #[default]
    Race,
    /// Only events fired for the snapshot's participant
    Participant,
}

impl TelemetrySnapshot {
    /// Panel view over the whole race log. `None` when the participant is not in the race.
    pub fn capture(state: &RaceState, participant_id: &str, segments: usize) -> Option<Self> {
        Self::capture_scoped(state, participant_id, segments, EventScope::Race)
    }

    /// Feel and card hints always come from the participant; `scope` picks the events
    /// behind the rhythm, summary and feed.
    pub fn capture_scoped(
        state: &RaceState,
        participant_id: &str,
        segments: usize,
        scope: EventScope,
    ) -> Option<Self> {
        let participant = state.participant(participant_id)?;
        let events: Vec<&RaceEvent> = match scope {
            EventScope::Race => state.events.iter().collect(),
            EventScope::Participant => state.events_for(participant_id).collect(),
        };

        Some(Self {
            baseline: global_baseline(state.duration, segments, state.run_id),
            rhythm: rhythm_segments(state.duration, segments, events.iter().copied()),
            summary: summarize(events.iter().copied(), state.elapsed_time, &participant.cards),
            feel: Feel::from_effects(state.effects_for(participant_id)),
            feed: events.iter().rev().take(FEED_LEN).map(|e| (*e).clone()).collect(),
        })
    }
}
