use crate::store::PressureAdjustment;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Where the derived footprint sits relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Above,
    At,
    Below,
}

impl TargetState {
    pub fn classify(total_bytes: i64, target_bytes: i64) -> Self {
        match total_bytes.cmp(&target_bytes) {
            Ordering::Greater => TargetState::Above,
            Ordering::Equal => TargetState::At,
            Ordering::Less => TargetState::Below,
        }
    }

    /// The single-step correction that moves the footprint toward target.
    pub fn adjustment(self) -> Option<PressureAdjustment> {
        match self {
            TargetState::Above => Some(PressureAdjustment::More),
            TargetState::At => None,
            TargetState::Below => Some(PressureAdjustment::Less),
        }
    }
}
