//! Physics tuning
//!
//! Data-driven engine constants. Loaded from JSON (every field optional,
//! missing fields fall back to `crate::consts`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How node-node impulses reach the sibling node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImpulseOrdering {
    /// Resolve every pair against a snapshot, then apply all deltas at once
    #[default]
    Staged,
    /// Mutate the sibling's velocity in place; later nodes see the change
    Sequential,
}

impl ImpulseOrdering {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpulseOrdering::Staged => "staged",
            ImpulseOrdering::Sequential => "sequential",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "staged" => Some(ImpulseOrdering::Staged),
            "sequential" | "seq" => Some(ImpulseOrdering::Sequential),
            _ => None,
        }
    }
}

/// Rejected tuning input
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{name} = {value} is out of range ({expected})")]
    OutOfRange {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },
    #[error("{name} = {value} ticks exceeds the maximum of {max}")]
    DelayTooLong {
        name: &'static str,
        value: u64,
        max: u64,
    },
}

/// Collision pipeline constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub node_radius: f32,
    pub restitution: f32,
    pub air_resistance: f32,
    pub wall_bounce_loss: f32,
    pub rest_speed: f32,
    /// Bounce off the bottom-centre controls strip
    pub controls_strip: bool,
    pub impulse_ordering: ImpulseOrdering,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            node_radius: NODE_RADIUS,
            restitution: RESTITUTION,
            air_resistance: AIR_RESISTANCE,
            wall_bounce_loss: WALL_BOUNCE_LOSS,
            rest_speed: REST_SPEED,
            controls_strip: false,
            impulse_ordering: ImpulseOrdering::Staged,
        }
    }
}

/// Portal geometry, forces and deferred-work timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuctionTuning {
    pub portal_margin: f32,
    pub portal_width: f32,
    pub portal_half_height: f32,
    pub entrance_inset: f32,
    pub entrance_gap: f32,
    pub entrance_depth: f32,
    pub arrival_max_x: f32,
    pub base_force: f32,
    pub head_boost: f32,
    pub gentle_pull: f32,
    pub pull_dead_zone: f32,
    pub chain_stagger_ticks: u64,
    pub absorb_delay_ticks: u64,
    pub submit_delay_ticks: u64,
    pub head_open_stagger_ticks: u64,
    pub isolated_open_stagger_ticks: u64,
}

impl Default for SuctionTuning {
    fn default() -> Self {
        Self {
            portal_margin: PORTAL_MARGIN,
            portal_width: PORTAL_CANVAS_WIDTH,
            portal_half_height: PORTAL_HALF_HEIGHT,
            entrance_inset: ENTRANCE_INSET,
            entrance_gap: ENTRANCE_GAP,
            entrance_depth: ENTRANCE_DEPTH,
            arrival_max_x: ARRIVAL_MAX_X,
            base_force: SUCTION_BASE_FORCE,
            head_boost: SUCTION_HEAD_BOOST,
            gentle_pull: GENTLE_PULL,
            pull_dead_zone: PULL_DEAD_ZONE,
            chain_stagger_ticks: CHAIN_STAGGER_TICKS,
            absorb_delay_ticks: ABSORB_DELAY_TICKS,
            submit_delay_ticks: SUBMIT_DELAY_TICKS,
            head_open_stagger_ticks: HEAD_OPEN_STAGGER_TICKS,
            isolated_open_stagger_ticks: ISOLATED_OPEN_STAGGER_TICKS,
        }
    }
}

/// Pointer drag release
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DragTuning {
    pub max_release_speed: f32,
    pub history_ms: f64,
    pub frame_ms: f32,
}

impl Default for DragTuning {
    fn default() -> Self {
        Self {
            max_release_speed: MAX_RELEASE_SPEED,
            history_ms: POINTER_HISTORY_MS,
            frame_ms: RELEASE_FRAME_MS,
        }
    }
}

/// All engine tuning
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub suction: SuctionTuning,
    pub drag: DragTuning,
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning (radius {}, ordering {})",
            tuning.physics.node_radius,
            tuning.physics.impulse_ordering.as_str()
        );
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break the engine's invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.physics;
        check("physics.node_radius", p.node_radius, p.node_radius > 0.0, "> 0")?;
        check("physics.restitution", p.restitution, (0.0..=1.0).contains(&p.restitution), "0..=1")?;
        check(
            "physics.air_resistance",
            p.air_resistance,
            p.air_resistance > 0.0 && p.air_resistance <= 1.0,
            "0 < x <= 1",
        )?;
        check(
            "physics.wall_bounce_loss",
            p.wall_bounce_loss,
            (0.0..=1.0).contains(&p.wall_bounce_loss),
            "0..=1",
        )?;
        check("physics.rest_speed", p.rest_speed, p.rest_speed >= 0.0, ">= 0")?;

        let s = &self.suction;
        check("suction.portal_width", s.portal_width, s.portal_width > 0.0, "> 0")?;
        check(
            "suction.portal_half_height",
            s.portal_half_height,
            s.portal_half_height > s.entrance_inset,
            "> entrance_inset",
        )?;
        check("suction.base_force", s.base_force, s.base_force > 0.0, "> 0")?;
        check("suction.head_boost", s.head_boost, s.head_boost >= 0.0, ">= 0")?;
        check("suction.gentle_pull", s.gentle_pull, s.gentle_pull >= 0.0, ">= 0")?;
        check_ticks("suction.chain_stagger_ticks", s.chain_stagger_ticks)?;
        check_ticks("suction.absorb_delay_ticks", s.absorb_delay_ticks)?;
        check_ticks("suction.submit_delay_ticks", s.submit_delay_ticks)?;
        check_ticks("suction.head_open_stagger_ticks", s.head_open_stagger_ticks)?;
        check_ticks("suction.isolated_open_stagger_ticks", s.isolated_open_stagger_ticks)?;

        let d = &self.drag;
        check(
            "drag.max_release_speed",
            d.max_release_speed,
            d.max_release_speed >= 0.0,
            ">= 0",
        )?;
        check("drag.history_ms", d.history_ms as f32, d.history_ms > 0.0, "> 0")?;
        Ok(())
    }
}

fn check(
    name: &'static str,
    value: f32,
    ok: bool,
    expected: &'static str,
) -> Result<(), TuningError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::OutOfRange {
            name,
            value,
            expected,
        })
    }
}

fn check_ticks(name: &'static str, value: u64) -> Result<(), TuningError> {
    if value <= MAX_DELAY_TICKS {
        Ok(())
    } else {
        Err(TuningError::DelayTooLong {
            name,
            value,
            max: MAX_DELAY_TICKS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let tuning = Tuning::from_json(r#"{ "physics": { "restitution": 0.5 } }"#).unwrap();
        assert_eq!(tuning.physics.restitution, 0.5);
        assert_eq!(tuning.physics.node_radius, NODE_RADIUS);
        assert_eq!(tuning.suction.chain_stagger_ticks, CHAIN_STAGGER_TICKS);
        assert_eq!(tuning.physics.impulse_ordering, ImpulseOrdering::Staged);
    }

    #[test]
    fn test_ordering_from_json() {
        let tuning =
            Tuning::from_json(r#"{ "physics": { "impulse_ordering": "sequential" } }"#).unwrap();
        assert_eq!(tuning.physics.impulse_ordering, ImpulseOrdering::Sequential);
        assert_eq!(ImpulseOrdering::from_str("SEQ"), Some(ImpulseOrdering::Sequential));
        assert_eq!(ImpulseOrdering::from_str("nope"), None);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = Tuning::from_json(r#"{ "physics": { "restitution": 1.5 } }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                name: "physics.restitution",
                ..
            }
        ));
    }

    #[test]
    fn test_huge_delay_rejected() {
        let json = r#"{ "suction": { "chain_stagger_ticks": 18446744073709551615 } }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            TuningError::DelayTooLong {
                name: "suction.chain_stagger_ticks",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_round_trip_preserves_ordering() {
        let mut tuning = Tuning::default();
        tuning.physics.impulse_ordering = ImpulseOrdering::Sequential;
        let json = tuning.to_json().unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(back.physics.impulse_ordering, ImpulseOrdering::Sequential);
    }
}
