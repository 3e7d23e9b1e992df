//! Event-label refinement applied while cleaning.
//!
//! The raw exports only say `strikeout` and `field_out`; the pitch
//! `description` and the batted-ball `bb_type` tell which kind it was.
//! Both refinements are pure functions of a single row.

use std::borrow::Cow;

const STRIKEOUT: &str = "strikeout";
const FIELD_OUT: &str = "field_out";

/// Batted-ball categories that identify a specific out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattedBall {
    FlyBall,
    GroundBall,
    LineDrive,
    Popup,
}

impl BattedBall {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "fly_ball" => Some(BattedBall::FlyBall),
            "ground_ball" => Some(BattedBall::GroundBall),
            "line_drive" => Some(BattedBall::LineDrive),
            "popup" => Some(BattedBall::Popup),
            _ => None,
        }
    }

    pub fn out_label(self) -> &'static str {
        match self {
            BattedBall::FlyBall => "fly_out",
            BattedBall::GroundBall => "ground_out",
            BattedBall::LineDrive => "line_out",
            BattedBall::Popup => "pop_out",
        }
    }
}

/// Split `strikeout` / `strikeout_double_play` into looking and swinging.
///
/// A strikeout whose description matches neither a called nor a swinging
/// strike keeps its generic label; the cleaning summary counts those rows.
pub fn refine_strikeout<'a>(events: &'a str, description: Option<&str>) -> Cow<'a, str> {
    if !matches!(events, "strikeout" | "strikeout_double_play") {
        return Cow::Borrowed(events);
    }
    let Some(description) = description else {
        return Cow::Borrowed(events);
    };

    if description.contains("called_strike") {
        Cow::Owned(events.replace(STRIKEOUT, "strikeout_looking"))
    } else if description.contains("swinging_strike") || description.contains("foul_tip") {
        Cow::Owned(events.replace(STRIKEOUT, "strikeout_swinging"))
    } else {
        Cow::Borrowed(events)
    }
}

/// Split `field_out` into fly / ground / line / pop outs by batted-ball type.
pub fn refine_field_out<'a>(events: &'a str, bb_type: Option<&str>) -> Cow<'a, str> {
    if events != FIELD_OUT {
        return Cow::Borrowed(events);
    }
    match bb_type.and_then(BattedBall::from_label) {
        Some(batted) => Cow::Borrowed(batted.out_label()),
        None => Cow::Borrowed(events),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn called_strike_becomes_looking() {
        assert_eq!(
            refine_strikeout("strikeout", Some("called_strike")),
            "strikeout_looking"
        );
        assert_eq!(
            refine_strikeout("strikeout_double_play", Some("called_strike")),
            "strikeout_looking_double_play"
        );
    }

    #[test]
    fn swinging_and_foul_tip_become_swinging() {
        assert_eq!(
            refine_strikeout("strikeout", Some("swinging_strike_blocked")),
            "strikeout_swinging"
        );
        assert_eq!(
            refine_strikeout("strikeout", Some("foul_tip")),
            "strikeout_swinging"
        );
        assert_eq!(
            refine_strikeout("strikeout_double_play", Some("swinging_strike")),
            "strikeout_swinging_double_play"
        );
    }

    #[test]
    fn unmatched_description_keeps_generic_strikeout() {
        assert_eq!(refine_strikeout("strikeout", None), "strikeout");
        assert_eq!(refine_strikeout("strikeout", Some("ball")), "strikeout");
        assert_eq!(refine_strikeout("strikeout", Some("")), "strikeout");
    }

    #[test]
    fn other_events_ignore_description() {
        assert_eq!(refine_strikeout("single", Some("called_strike")), "single");
        assert_eq!(refine_strikeout("field_out", Some("foul_tip")), "field_out");
    }

    #[test]
    fn field_out_maps_each_batted_ball_type() {
        assert_eq!(refine_field_out("field_out", Some("fly_ball")), "fly_out");
        assert_eq!(refine_field_out("field_out", Some("ground_ball")), "ground_out");
        assert_eq!(refine_field_out("field_out", Some("line_drive")), "line_out");
        assert_eq!(refine_field_out("field_out", Some("popup")), "pop_out");
    }

    #[test]
    fn field_out_without_known_batted_ball_is_kept() {
        assert_eq!(refine_field_out("field_out", None), "field_out");
        assert_eq!(refine_field_out("field_out", Some("bunt")), "field_out");
        assert_eq!(refine_field_out("double", Some("line_drive")), "double");
        assert_eq!(refine_field_out("strikeout", Some("popup")), "strikeout");
    }
}
