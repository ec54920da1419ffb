//! The aerodynamic surface component and the pieces every variant shares.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use updraft_core::constants::MAX_AXIS_RESPONSES;
use updraft_core::curve::CoefficientCurve;
use updraft_core::enums::{ForceType, ResponseAxis, SurfaceKind};
use updraft_core::error::{ensure_finite, ConfigError, ConfigResult, NumericFault};
use updraft_core::math::{clamp01, signed_angle_deg};
use updraft_core::types::Pose;
use updraft_wind::WindField;

use crate::airfoil::SingleSectionAirfoil;
use crate::bluff::BluffBody;
use crate::canopy::ParachuteCanopy;
use crate::cylinder::CylindricalBody;
use crate::host::{BodyHandle, PhysicsHost};
use crate::wing::MultiSectionWing;

/// One coefficient curve bound to a body axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisResponse {
    pub axis: ResponseAxis,
    pub force_type: ForceType,
    pub curve: CoefficientCurve,
    #[serde(default = "one")]
    pub multiplier: f64,
    #[serde(default = "yes")]
    pub enabled: bool,
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

impl AxisResponse {
    pub fn new(axis: ResponseAxis, force_type: ForceType, curve: CoefficientCurve) -> Self {
        Self {
            axis,
            force_type,
            curve,
            multiplier: 1.0,
            enabled: true,
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.curve.validate()?;
        ensure_finite("response multiplier", self.multiplier)
    }
}

pub(crate) fn validate_responses(responses: &[AxisResponse]) -> ConfigResult<()> {
    if responses.len() > MAX_AXIS_RESPONSES {
        return Err(ConfigError::TooManyResponses {
            count: responses.len(),
            max: MAX_AXIS_RESPONSES,
        });
    }
    responses.iter().try_for_each(AxisResponse::validate)
}

/// Forces from a set of responses at one evaluation point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ResponseForces {
    pub lift: DVec3,
    pub drag: DVec3,
    pub moment: DVec3,
    /// Angle of attack of the first enabled response (degrees).
    pub angle_of_attack: f64,
}

/// Evaluate `responses` for one point.
///
/// `velocity` is the world-space motion through the air, `pressure` is
/// dynamic pressure already multiplied by area and ground effect.
pub(crate) fn evaluate_responses(
    responses: &[AxisResponse],
    pose: &Pose,
    velocity: DVec3,
    pressure: f64,
    deflection: f64,
    efficiency: f64,
) -> ResponseForces {
    let direction = velocity.normalize_or_zero();
    let mut out = ResponseForces::default();
    let mut primary = None;

    for response in responses.iter().filter(|r| r.enabled) {
        let axis = pose.transform_vector(response.axis.local_axis());
        let reference = pose.transform_vector(response.axis.local_reference());
        let aoa = signed_angle_deg(reference, velocity, axis);
        primary.get_or_insert(aoa);

        let magnitude = response.curve.evaluate(aoa + deflection) * response.multiplier * pressure;
        match response.force_type {
            // Quadratic efficiency on lift is a tuning heuristic; keep it.
            ForceType::Lift => {
                out.lift += direction.cross(axis).normalize_or_zero()
                    * (magnitude * efficiency * efficiency)
            }
            ForceType::Drag => out.drag -= direction * (magnitude * efficiency),
            ForceType::Moment => out.moment += axis * (magnitude * efficiency),
        }
    }

    out.angle_of_attack = primary.unwrap_or(0.0);
    out
}

/// `0.5 * rho * v²`.
pub(crate) fn dynamic_pressure(air_density: f64, air_speed: f64) -> f64 {
    0.5 * air_density * air_speed * air_speed
}

/// A force/torque pair to hand to the host at one world position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AppliedLoad {
    pub force: DVec3,
    pub torque: DVec3,
    pub position: DVec3,
}

/// Quantities common to every variant, refreshed each physics step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceState {
    pub area: f64,
    /// Center of pressure in surface-local space.
    pub center_local: DVec3,
    /// Center of pressure in world space as of the last update.
    pub center_world: DVec3,
    pub relative_velocity: DVec3,
    pub air_speed: f64,
    /// Degrees.
    pub angle_of_attack: f64,
    pub wind: DVec3,
    pub lift: DVec3,
    pub drag: DVec3,
    pub moment: DVec3,
    efficiency: f64,
}

impl SurfaceState {
    pub fn new(area: f64, center_local: DVec3) -> Self {
        Self {
            area,
            center_local,
            center_world: center_local,
            relative_velocity: DVec3::ZERO,
            air_speed: 0.0,
            angle_of_attack: 0.0,
            wind: DVec3::ZERO,
            lift: DVec3::ZERO,
            drag: DVec3::ZERO,
            moment: DVec3::ZERO,
            efficiency: 1.0,
        }
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// Clamped to [0, 1].
    pub fn set_efficiency(&mut self, efficiency: f64) {
        self.efficiency = if efficiency.is_nan() {
            0.0
        } else {
            clamp01(efficiency)
        };
    }

    fn reset_outputs(&mut self) {
        self.lift = DVec3::ZERO;
        self.drag = DVec3::ZERO;
        self.moment = DVec3::ZERO;
    }

    fn reset_motion(&mut self) {
        self.relative_velocity = DVec3::ZERO;
        self.air_speed = 0.0;
        self.angle_of_attack = 0.0;
        self.wind = DVec3::ZERO;
        self.reset_outputs();
    }
}

/// Everything a variant needs for one step.
pub(crate) struct StepContext<'a> {
    pub wind: &'a WindField,
    pub host: &'a dyn PhysicsHost,
    pub body: BodyHandle,
    /// Surface pose in world space (body pose composed with the mount).
    pub pose: Pose,
    pub dt: f64,
}

impl StepContext<'_> {
    /// Host velocity at `point`, zero if the body vanished mid-step.
    pub fn point_velocity(&self, point: DVec3) -> DVec3 {
        self.host
            .point_velocity(self.body, point)
            .unwrap_or(DVec3::ZERO)
    }
}

/// Variant-specific models.
#[derive(Debug, Clone)]
pub enum SurfaceModel {
    MultiSectionWing(MultiSectionWing),
    SingleSectionAirfoil(SingleSectionAirfoil),
    BluffBody(BluffBody),
    CylindricalBody(CylindricalBody),
    ParachuteCanopy(ParachuteCanopy),
}

impl SurfaceModel {
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Self::MultiSectionWing(_) => SurfaceKind::MultiSectionWing,
            Self::SingleSectionAirfoil(_) => SurfaceKind::SingleSectionAirfoil,
            Self::BluffBody(_) => SurfaceKind::BluffBody,
            Self::CylindricalBody(_) => SurfaceKind::CylindricalBody,
            Self::ParachuteCanopy(_) => SurfaceKind::ParachuteCanopy,
        }
    }

    fn area_and_center(&self) -> (f64, DVec3) {
        match self {
            Self::MultiSectionWing(w) => (w.area(), w.centroid()),
            Self::SingleSectionAirfoil(a) => (a.area(), DVec3::ZERO),
            Self::BluffBody(b) => (b.reference_area(), DVec3::ZERO),
            Self::CylindricalBody(c) => (c.area(), DVec3::ZERO),
            Self::ParachuteCanopy(c) => (c.area(), DVec3::ZERO),
        }
    }
}

/// ECS component: a surface attached to one host body.
#[derive(Debug, Clone)]
pub struct AerodynamicSurface {
    body: BodyHandle,
    /// Surface frame relative to the body.
    mount: Pose,
    state: SurfaceState,
    model: SurfaceModel,
    loads: Vec<AppliedLoad>,
    /// False when a force applicator distributes the loads instead.
    pub(crate) applies_forces: bool,
}

impl AerodynamicSurface {
    pub fn new(body: BodyHandle, mount: Pose, model: SurfaceModel) -> Self {
        let (area, center) = model.area_and_center();
        Self {
            body,
            mount,
            state: SurfaceState::new(area, center),
            model,
            loads: Vec::new(),
            applies_forces: true,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn mount(&self) -> Pose {
        self.mount
    }

    pub fn kind(&self) -> SurfaceKind {
        self.model.kind()
    }

    pub fn model(&self) -> &SurfaceModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut SurfaceModel {
        &mut self.model
    }

    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    pub fn area(&self) -> f64 {
        self.state.area
    }

    /// World-space center of pressure.
    pub fn center(&self) -> DVec3 {
        self.state.center_world
    }

    pub fn angle_of_attack(&self) -> f64 {
        self.state.angle_of_attack
    }

    pub fn relative_velocity(&self) -> DVec3 {
        self.state.relative_velocity
    }

    pub fn air_speed(&self) -> f64 {
        self.state.air_speed
    }

    pub fn lift_force(&self) -> DVec3 {
        self.state.lift
    }

    pub fn drag_force(&self) -> DVec3 {
        self.state.drag
    }

    pub fn moment_force(&self) -> DVec3 {
        self.state.moment
    }

    pub fn efficiency(&self) -> f64 {
        self.state.efficiency()
    }

    pub fn set_efficiency(&mut self, efficiency: f64) {
        self.state.set_efficiency(efficiency);
    }

    /// Loads produced by the last step, in world space.
    pub fn loads(&self) -> &[AppliedLoad] {
        &self.loads
    }

    pub fn applies_forces(&self) -> bool {
        self.applies_forces
    }

    /// Drop velocity history and outputs, e.g. after a teleport.
    pub fn clear(&mut self) {
        self.state.reset_motion();
        self.loads.clear();
        if let SurfaceModel::MultiSectionWing(wing) = &mut self.model {
            wing.clear();
        }
    }

    /// Output for a step without a wind field: nothing is applied.
    pub(crate) fn skip(&mut self) {
        self.state.reset_outputs();
        self.loads.clear();
    }

    /// Refresh the world center from the body pose without computing forces.
    pub(crate) fn refresh_center(&mut self, host: &dyn PhysicsHost) {
        if let Some(body_pose) = host.body_pose(self.body) {
            let pose = body_pose.compose(&self.mount);
            self.state.center_world = pose.transform_point(self.state.center_local);
        }
    }

    /// Compute this step's forces. Loads are left in [`Self::loads`].
    pub(crate) fn step(
        &mut self,
        wind: &WindField,
        host: &dyn PhysicsHost,
        dt: f64,
    ) -> Result<(), NumericFault> {
        self.loads.clear();
        self.state.reset_outputs();

        let Some(body_pose) = host.body_pose(self.body) else {
            log::warn!("{} on missing body {:?}, skipped", self.kind(), self.body);
            return Ok(());
        };
        let ctx = StepContext {
            wind,
            host,
            body: self.body,
            pose: body_pose.compose(&self.mount),
            dt,
        };

        match &mut self.model {
            SurfaceModel::MultiSectionWing(m) => m.compute(&ctx, &mut self.state, &mut self.loads),
            SurfaceModel::SingleSectionAirfoil(m) => {
                m.compute(&ctx, &mut self.state, &mut self.loads)?
            }
            SurfaceModel::BluffBody(m) => m.compute(&ctx, &mut self.state, &mut self.loads),
            SurfaceModel::CylindricalBody(m) => m.compute(&ctx, &mut self.state, &mut self.loads),
            SurfaceModel::ParachuteCanopy(m) => m.compute(&ctx, &mut self.state, &mut self.loads),
        }
        self.state.center_world = ctx.pose.transform_point(self.state.center_local);
        self.check_finite()
    }

    fn check_finite(&self) -> Result<(), NumericFault> {
        let kind = self.kind();
        let force = self.state.lift + self.state.drag;
        let loads_ok = self
            .loads
            .iter()
            .all(|l| l.force.is_finite() && l.torque.is_finite() && l.position.is_finite());
        if !force.is_finite() || !loads_ok {
            return Err(NumericFault::Force {
                kind,
                x: force.x,
                y: force.y,
                z: force.z,
            });
        }
        let moment = self.state.moment;
        if !moment.is_finite() {
            return Err(NumericFault::Torque {
                kind,
                x: moment.x,
                y: moment.y,
                z: moment.z,
            });
        }
        let relative = self.state.relative_velocity;
        if !relative.is_finite() || !self.state.air_speed.is_finite() {
            return Err(NumericFault::Velocity {
                kind,
                x: relative.x,
                y: relative.y,
                z: relative.z,
            });
        }
        Ok(())
    }
}
