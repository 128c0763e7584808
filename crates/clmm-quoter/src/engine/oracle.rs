//! Time-weighted price oracle over a circular buffer of cumulative-tick observations.
//!
//! The on-chain program appends observations and advances `newest_index`; this module only
//! reads a snapshot of that buffer.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::math::constants::{MAX_TICK, MIN_TICK, OBSERVATION_CAPACITY};
use crate::types::{QuoterError, Result, TickIndex};

/// One oracle sample. A zero timestamp marks an uninitialized slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: u32,
    pub tick_cumulative: i64,
}

impl Observation {
    pub fn new(timestamp: u32, tick_cumulative: i64) -> Self {
        Self { timestamp, tick_cumulative }
    }

    pub fn is_initialized(&self) -> bool {
        self.timestamp != 0
    }
}

/// Fixed-capacity ring of observations plus the slot written last.
///
/// Deserialization goes through [`ObservationBuffer::new`], so a decoded buffer always has
/// at least one slot and an in-range `newest_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawObservationBuffer")]
pub struct ObservationBuffer {
    observations: Vec<Observation>,
    newest_index: u16,
}

#[derive(Deserialize)]
struct RawObservationBuffer {
    observations: Vec<Observation>,
    newest_index: u16,
}

impl TryFrom<RawObservationBuffer> for ObservationBuffer {
    type Error = QuoterError;

    fn try_from(raw: RawObservationBuffer) -> Result<Self> {
        Self::new(raw.observations, raw.newest_index)
    }
}

impl ObservationBuffer {
    pub fn new(observations: Vec<Observation>, newest_index: u16) -> Result<Self> {
        if observations.is_empty() {
            return Err(QuoterError::InvalidRange("observation buffer has no slots".into()));
        }
        if usize::from(newest_index) >= observations.len() {
            return Err(QuoterError::InvalidRange(format!(
                "newest index {newest_index} outside buffer of {} slots",
                observations.len()
            )));
        }
        Ok(Self { observations, newest_index })
    }

    /// An all-uninitialized buffer with the protocol capacity.
    pub fn empty() -> Self {
        Self {
            observations: vec![Observation::default(); OBSERVATION_CAPACITY],
            newest_index: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.observations.len()
    }

    pub fn newest_index(&self) -> usize {
        usize::from(self.newest_index)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn newest(&self) -> Observation {
        self.observations[self.newest_index()]
    }

    /// The slot after the newest if it has been written (the ring has wrapped), else slot 0.
    pub fn oldest_index(&self) -> usize {
        let next = (self.newest_index() + 1) % self.capacity();
        if self.observations[next].is_initialized() {
            next
        } else {
            0
        }
    }

    pub fn oldest(&self) -> Observation {
        self.observations[self.oldest_index()]
    }
}

/// Division rounding toward negative infinity.
pub fn floor_div(numerator: i128, denominator: i128) -> Result<i128> {
    if denominator == 0 {
        return Err(QuoterError::DivisionByZero("floor_div"));
    }
    let quotient = numerator / denominator;
    if numerator % denominator != 0 && ((numerator < 0) != (denominator < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn resolve_now(now: Option<i64>) -> i64 {
    now.unwrap_or_else(|| Utc::now().timestamp())
}

/// Tick cumulative at `now - seconds_ago`.
///
/// Past the newest sample the value is extrapolated with `current_tick`; between samples it
/// is linearly interpolated. `current_tick` is used as supplied.
pub fn query_tick_at(
    buffer: &ObservationBuffer,
    seconds_ago: i64,
    current_tick: TickIndex,
    now: Option<i64>,
) -> Result<i64> {
    if seconds_ago < 0 {
        return Err(QuoterError::InvalidRange(format!(
            "seconds_ago must be non-negative, got {seconds_ago}"
        )));
    }
    let target = resolve_now(now)
        .checked_sub(seconds_ago)
        .ok_or(QuoterError::Overflow("query_tick_at target"))?;

    let newest = buffer.newest();
    if !newest.is_initialized() {
        return Err(QuoterError::InsufficientHistory { target, oldest: 0 });
    }
    let newest_ts = i64::from(newest.timestamp);

    if target == newest_ts {
        return Ok(newest.tick_cumulative);
    }
    if target > newest_ts {
        debug!(target, newest_ts, current_tick, "extrapolating tick cumulative");
        return i64::from(current_tick)
            .checked_mul(target - newest_ts)
            .and_then(|delta| newest.tick_cumulative.checked_add(delta))
            .ok_or(QuoterError::Overflow("query_tick_at extrapolation"));
    }

    let oldest_index = buffer.oldest_index();
    let oldest = buffer.observations[oldest_index];
    let oldest_ts = i64::from(oldest.timestamp);
    if target < oldest_ts {
        return Err(QuoterError::InsufficientHistory { target, oldest: oldest_ts });
    }
    if target == oldest_ts {
        return Ok(oldest.tick_cumulative);
    }

    let capacity = buffer.capacity();
    let mut index = oldest_index;
    for _ in 0..capacity {
        let next_index = (index + 1) % capacity;
        let obs = buffer.observations[index];
        let next = buffer.observations[next_index];
        if !next.is_initialized() {
            break;
        }
        let (obs_ts, next_ts) = (i64::from(obs.timestamp), i64::from(next.timestamp));
        if obs_ts <= target && target < next_ts {
            return interpolate(obs, next, target);
        }
        if next_index == buffer.newest_index() {
            break;
        }
        index = next_index;
    }

    Err(QuoterError::OutOfBounds(format!(
        "no observations bracket timestamp {target}; buffer is not monotonic"
    )))
}

fn interpolate(obs: Observation, next: Observation, target: i64) -> Result<i64> {
    let elapsed = i128::from(target - i64::from(obs.timestamp));
    let span = i128::from(next.timestamp) - i128::from(obs.timestamp);
    let delta = i128::from(next.tick_cumulative) - i128::from(obs.tick_cumulative);
    let step = floor_div(delta * elapsed, span)?;
    i64::try_from(i128::from(obs.tick_cumulative) + step)
        .map_err(|_| QuoterError::Overflow("interpolate"))
}

/// Mean tick over the last `window_seconds`, floored toward negative infinity.
///
/// A result outside the protocol tick bounds means the buffer or `current_tick` is corrupt and
/// is reported as `OutOfBounds`.
pub fn mean_tick(
    buffer: &ObservationBuffer,
    window_seconds: i64,
    current_tick: TickIndex,
    now: Option<i64>,
) -> Result<TickIndex> {
    if window_seconds <= 0 {
        return Err(QuoterError::InvalidRange(format!(
            "window must be positive, got {window_seconds}"
        )));
    }
    let now = resolve_now(now);
    let end = query_tick_at(buffer, 0, current_tick, Some(now))?;
    let start = query_tick_at(buffer, window_seconds, current_tick, Some(now))?;
    let mean = floor_div(
        i128::from(end) - i128::from(start),
        i128::from(window_seconds),
    )?;
    if mean < i128::from(MIN_TICK) || mean > i128::from(MAX_TICK) {
        return Err(QuoterError::OutOfBounds(format!(
            "mean tick {mean} outside [{MIN_TICK}, {MAX_TICK}]"
        )));
    }
    // bounds checked above
    Ok(mean as TickIndex)
}
