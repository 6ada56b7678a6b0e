//! Routing policies.

use std::{fmt, str::FromStr};

use crate::DispatchError;

/// Grouping key for ciphertexts that may be shuffled together.
///
/// Mirrors the (metric, day) pair a client tags each observation with.
/// Ciphertexts with different policies are never placed in the same batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoutingPolicy {
    /// Metric the observation belongs to
    pub metric_id: u32,
    /// Day index the observation was recorded on
    pub day_index: u32,
}

impl RoutingPolicy {
    /// Create a routing policy.
    pub fn new(metric_id: u32, day_index: u32) -> Self {
        Self { metric_id, day_index }
    }
}

impl fmt::Display for RoutingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.metric_id, self.day_index)
    }
}

/// Parses the `METRIC:DAY` form produced by `Display`.
impl FromStr for RoutingPolicy {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DispatchError::InvalidPolicy(s.to_string());
        let (metric, day) = s.split_once(':').ok_or_else(invalid)?;
        let metric_id = metric.trim().parse().map_err(|_| invalid())?;
        let day_index = day.trim().parse().map_err(|_| invalid())?;
        Ok(Self { metric_id, day_index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_from_str() {
        let policy = RoutingPolicy::new(17, 19_876);
        assert_eq!(policy.to_string(), "17:19876");
        assert_eq!(policy.to_string().parse::<RoutingPolicy>().unwrap(), policy);
    }

    #[test]
    fn from_str_rejects_garbage() {
        for input in ["", "17", "17:", ":3", "a:b", "1:2:3", "-1:2"] {
            assert!(
                matches!(input.parse::<RoutingPolicy>(), Err(DispatchError::InvalidPolicy(_))),
                "{input:?} parsed"
            );
        }
    }
}
