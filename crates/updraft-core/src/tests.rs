#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use glam::{DQuat, DVec3};

    use crate::config::*;
    use crate::curve::CoefficientCurve;
    use crate::enums::*;
    use crate::error::ConfigError;
    use crate::layers::LayerMask;
    use crate::state::{AeroSnapshot, SurfaceView};
    use crate::types::{Aabb, Pose, SimTime};

    /// Verify enums round-trip through serde_json.
    #[test]
    fn test_response_axis_serde() {
        for v in [ResponseAxis::Pitch, ResponseAxis::Roll, ResponseAxis::Yaw] {
            let json = serde_json::to_string(&v).unwrap();
            let back: ResponseAxis = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_force_type_serde() {
        for v in [ForceType::Lift, ForceType::Drag, ForceType::Moment] {
            let json = serde_json::to_string(&v).unwrap();
            let back: ForceType = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_response_axes_are_orthogonal_to_reference() {
        for axis in [ResponseAxis::Pitch, ResponseAxis::Roll, ResponseAxis::Yaw] {
            assert_eq!(axis.local_axis().dot(axis.local_reference()), 0.0);
        }
    }

    #[test]
    fn test_layer_mask_excludes_self_ui_player() {
        let mask = LayerMask::ground_effect();
        assert!(mask.contains(LayerMask::TERRAIN));
        assert!(!mask.intersects(LayerMask::SELF | LayerMask::UI | LayerMask::PLAYER));
        assert_eq!(LayerMask::default(), mask);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        time.advance(0.02);
        time.advance(0.02);
        assert_eq!(time.tick, 2);
        assert_abs_diff_eq!(time.elapsed_secs, 0.04);
    }

    // ---- Geometry ----

    #[test]
    fn test_pose_transforms() {
        let pose = Pose::new(
            DVec3::new(10.0, 0.0, 0.0),
            DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2),
        );
        let p = pose.transform_point(DVec3::Z);
        assert!(p.abs_diff_eq(DVec3::new(11.0, 0.0, 0.0), 1e-12), "got {p}");
        assert!(pose.forward().abs_diff_eq(DVec3::X, 1e-12));
        let local = pose.inverse_transform_vector(DVec3::X);
        assert!(local.abs_diff_eq(DVec3::Z, 1e-12));
    }

    #[test]
    fn test_pose_compose() {
        let body = Pose::new(
            DVec3::new(0.0, 5.0, 0.0),
            DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2),
        );
        let mount = Pose::from_position(DVec3::new(0.0, 0.0, 2.0));
        let world = body.compose(&mount);
        assert!(world.position.abs_diff_eq(DVec3::new(2.0, 5.0, 0.0), 1e-12));
        assert!(world.forward().abs_diff_eq(DVec3::X, 1e-12));
    }

    #[test]
    fn test_aabb_intersection_and_enclosure() {
        let a = Aabb::from_center_half_extents(DVec3::ZERO, DVec3::splat(1.0));
        let b = Aabb::from_sphere(DVec3::new(1.5, 0.0, 0.0), 0.5);
        let c = Aabb::from_point(DVec3::new(3.0, 0.0, 0.0));
        assert!(a.intersects(&b), "touching boxes intersect");
        assert!(!a.intersects(&c));
        assert!(a.expanded(2.0).encloses(&c));
        assert!(!a.encloses(&b));
        assert!(a.contains_point(DVec3::new(1.0, -1.0, 0.5)));
    }

    #[test]
    fn test_aabb_enclosing_points() {
        assert!(Aabb::enclosing(&[]).is_none());
        let aabb = Aabb::enclosing(&[
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(-1.0, 5.0, 0.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, DVec3::new(-1.0, 2.0, 0.0));
        assert_eq!(aabb.max, DVec3::new(1.0, 5.0, 3.0));
        assert_eq!(aabb.center(), DVec3::new(0.0, 3.5, 1.5));
    }

    #[test]
    fn test_aabb_new_orders_corners() {
        let aabb = Aabb::new(DVec3::splat(2.0), DVec3::splat(-2.0));
        assert_eq!(aabb.min, DVec3::splat(-2.0));
        assert_eq!(aabb.size(), DVec3::splat(4.0));
    }

    // ---- Configuration ----

    #[test]
    fn test_default_configs_validate() {
        WindConfig::default().validate().unwrap();
        WindConfig::calm().validate().unwrap();
        EngineConfig::default().validate().unwrap();
        BorderConfig::new(Aabb::from_center_half_extents(DVec3::ZERO, DVec3::splat(2_000.0)))
            .validate()
            .unwrap();
    }

    #[test]
    fn test_border_band_wider_than_world_rejected() {
        let mut border =
            BorderConfig::new(Aabb::from_center_half_extents(DVec3::ZERO, DVec3::splat(100.0)));
        border.size = 150.0;
        assert!(matches!(
            border.validate(),
            Err(ConfigError::OutOfRange { name: "border size", .. })
        ));
    }

    #[test]
    fn test_wind_config_from_json() {
        let json = r#"{
            "base_wind": [2.0, 0.0, -1.0],
            "air_density": { "type": "Constant", "density": 1.225 },
            "turbulence": { "seed": 7, "octaves": [] }
        }"#;
        let config = WindConfig::from_json(json).unwrap();
        assert_eq!(config.base_wind, DVec3::new(2.0, 0.0, -1.0));
        assert_eq!(config.turbulence.seed, 7);
        assert!(config.turbulence.octaves.is_empty());
        assert_eq!(config.octree, OctreeConfig::default());
        assert_abs_diff_eq!(config.air_density.density_at(1_000.0), 1.225);
    }

    #[test]
    fn test_wind_config_rejects_bad_density() {
        let json = r#"{ "air_density": { "type": "Constant", "density": -1.0 } }"#;
        assert!(matches!(
            WindConfig::from_json(json),
            Err(ConfigError::NonPositive { .. })
        ));
        assert!(matches!(
            WindConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_wind_config_round_trip() {
        let mut config = WindConfig::default();
        config.border = Some(BorderConfig::new(Aabb::from_center_half_extents(
            DVec3::ZERO,
            DVec3::splat(5_000.0),
        )));
        let json = serde_json::to_string(&config).unwrap();
        let back = WindConfig::from_json(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_exponential_density_falls_with_altitude() {
        let model = AirDensityModel::Exponential {
            sea_level: 1.225,
            scale_height: 8_500.0,
            reference_altitude: 0.0,
        };
        assert_abs_diff_eq!(model.density_at(-50.0), 1.225);
        assert!(model.density_at(100.0) > model.density_at(2_000.0));
        assert_abs_diff_eq!(model.density_at(8_500.0), 1.225 / std::f64::consts::E, epsilon = 1e-12);

        let standard = AirDensityModel::standard_exponential();
        assert!(standard.validate().is_ok());
        assert_abs_diff_eq!(standard.density_at(0.0), 1.293);
    }

    #[test]
    fn test_curve_serde_is_plain_key_list() {
        let curve = CoefficientCurve::from_points(&[(0.0, 0.1), (10.0, 1.0)]).unwrap();
        let json = serde_json::to_string(&curve).unwrap();
        assert_eq!(json, r#"[{"angle":0.0,"value":0.1},{"angle":10.0,"value":1.0}]"#);
        let back: CoefficientCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(curve, back);
    }

    /// Verify AeroSnapshot can be serialized to JSON.
    #[test]
    fn test_snapshot_serde() {
        let snapshot = AeroSnapshot {
            time: SimTime {
                tick: 3,
                elapsed_secs: 0.06,
            },
            wind_attached: true,
            active_effectors: 2,
            surfaces: vec![SurfaceView {
                id: 1,
                kind: SurfaceKind::BluffBody,
                area: 2.0,
                center: DVec3::ZERO,
                angle_of_attack: 0.0,
                air_speed: 10.0,
                relative_velocity: DVec3::X * 10.0,
                wind: DVec3::ZERO,
                lift: DVec3::ZERO,
                drag: DVec3::new(-64.65, 0.0, 0.0),
                moment: DVec3::ZERO,
                efficiency: 1.0,
            }],
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: AeroSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }
}
