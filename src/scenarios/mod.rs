pub mod cohesion;
pub mod go_to_position;
pub mod placement;

pub use cohesion::{CohesionConfig, CohesionScenario};
pub use go_to_position::{GoToPositionConfig, GoToPositionScenario};
pub use placement::Placement;

use crate::registry::{KwArgs, parse_kwarg};
use crate::world::Vec2;

/// Resolve a placement from kwargs, keeping `default` when no "placement"
/// key is present. Recognized values: "grid", "circle", "uniform", with
/// "placement_center_x/y", "placement_spacing", "placement_radius",
/// "placement_range" and "grid_size" refining them.
pub(crate) fn placement_from_kwargs(kwargs: &KwArgs, default: Placement) -> Placement {
    let center = Vec2::new(
        parse_kwarg(kwargs, "placement_center_x", 0.0),
        parse_kwarg(kwargs, "placement_center_y", 0.0),
    );
    match kwargs.get("placement").map(String::as_str) {
        Some("grid") => Placement::Grid {
            center,
            size: parse_kwarg(kwargs, "grid_size", 3),
            spacing: parse_kwarg(kwargs, "placement_spacing", 0.15),
        },
        Some("circle") => Placement::Circle {
            center,
            radius: parse_kwarg(kwargs, "placement_radius", 0.3),
        },
        Some("uniform") => Placement::Uniform {
            range: parse_kwarg(kwargs, "placement_range", 1.0),
        },
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_kwargs_select_variants() {
        let mut kwargs = KwArgs::new();
        assert!(matches!(
            placement_from_kwargs(&kwargs, Placement::Uniform { range: 1.0 }),
            Placement::Uniform { .. }
        ));

        kwargs.insert("placement".into(), "circle".into());
        kwargs.insert("placement_radius".into(), "0.4".into());
        match placement_from_kwargs(&kwargs, Placement::Uniform { range: 1.0 }) {
            Placement::Circle { radius, .. } => assert!((radius - 0.4).abs() < 1e-6),
            other => panic!("expected circle, got {other:?}"),
        }

        kwargs.insert("placement".into(), "grid".into());
        kwargs.insert("grid_size".into(), "4".into());
        match placement_from_kwargs(&kwargs, Placement::Uniform { range: 1.0 }) {
            Placement::Grid { size, .. } => assert_eq!(size, 4),
            other => panic!("expected grid, got {other:?}"),
        }
    }
}
