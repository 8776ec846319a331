//! Outage detection for a single probe result.
//!
//! Each device is either up (last probe succeeded) or down (probe failing).
//! While down, the `notified` latch may be set once the downtime strictly
//! exceeds the threshold; it only clears when the device answers again.

use std::time::Duration;
use tokio::time::Instant;

use super::state::DeviceState;

/// What a probe result means for the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing worth reporting
    None,
    /// Unreachable, still within the grace period
    StillDown { downtime: Duration },
    /// Unreachable past the threshold for the first time this outage
    Notify {
        address: String,
        identifier: String,
        downtime: Duration,
    },
    /// Reachable again after being down longer than the threshold
    Recovered { downtime: Duration },
}

/// Decide the new state of a device and whether anything happened.
pub fn evaluate(
    state: &DeviceState,
    probe_ok: bool,
    now: Instant,
    threshold: Duration,
) -> (DeviceState, Transition) {
    let downtime = state.unseen_for(now);
    let mut next = state.clone();

    if probe_ok {
        next.last_seen = now.max(state.last_seen);
        next.notified = false;

        let transition = if downtime > threshold {
            Transition::Recovered { downtime }
        } else {
            Transition::None
        };
        return (next, transition);
    }

    if downtime <= threshold {
        return (next, Transition::StillDown { downtime });
    }

    if state.notified {
        return (next, Transition::None);
    }

    next.notified = true;
    (
        next,
        Transition::Notify {
            address: state.address.clone(),
            identifier: state.identifier.clone(),
            downtime,
        },
    )
}
