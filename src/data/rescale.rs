use super::model::Observation;

const THOUSAND: f64 = 1e3;
const MILLION: f64 = 1e6;
const BILLION: f64 = 1e9;

/// Resolve a unit-less magnitude to absolute units.
///
/// Values below a million are taken to be thousands, values below a billion
/// to be millions; anything larger is already absolute.
pub fn rescale(raw: f64) -> f64 {
    if raw < MILLION {
        raw * THOUSAND
    } else if raw < BILLION {
        raw * MILLION
    } else {
        raw
    }
}

/// Whether a metric goes through [`rescale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescalePolicy {
    Heuristic,
    Bypass,
}

impl RescalePolicy {
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            RescalePolicy::Heuristic
        } else {
            RescalePolicy::Bypass
        }
    }
}

/// Rescale every present, unit-less value; returns how many changed.
///
/// Values parsed from a `k`/`M`/`B` suffix already carry their scale and are
/// left alone.
pub fn apply(observations: &mut [Observation<'_>], policy: RescalePolicy) -> usize {
    if policy == RescalePolicy::Bypass {
        return 0;
    }
    let mut rescaled = 0;
    for obs in observations.iter_mut().filter(|o| !o.explicit_unit) {
        if let Some(v) = obs.value.as_mut() {
            *v = rescale(*v);
            rescaled += 1;
        }
    }
    rescaled
}
