//! Swerve drive kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use nalgebra::{DMatrix, DVector, Vector3};
use serde::{Deserialize, Serialize};

// Internal
use super::{ChassisSpeeds, KinematicsError};
use crate::geom::{Rotation2d, Translation2d};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The state of a single swerve module: a wheel speed and a steering angle.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct SwerveModuleState {
    /// Speed of the wheel
    pub speed_ms: f64,

    /// Steering angle of the module
    pub angle: Rotation2d,
}

/// Kinematics for a swerve drivetrain with an arbitrary number of modules.
///
/// Each module independently resolves the chassis velocity at its own offset
/// from the centre of rotation into a (speed, angle) pair. The forward
/// direction uses the precomputed pseudo-inverse of the module matrix.
#[derive(Debug, Clone)]
pub struct SwerveDriveKinematics {
    /// Module positions in the robot frame
    modules: Vec<Translation2d>,

    /// Maps a chassis velocity onto per-module (vx, vy) pairs, 2N x 3
    inverse_kinematics: DMatrix<f64>,

    /// Pseudo-inverse of `inverse_kinematics`, 3 x 2N
    forward_kinematics: DMatrix<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveModuleState {
    /// Create a new module state.
    pub fn new(speed_ms: f64, angle: Rotation2d) -> Self {
        Self { speed_ms, angle }
    }

    /// Minimise the steering rotation needed to reach a desired state.
    ///
    /// If the desired angle differs from the current module angle by more
    /// than 90 degrees, steering to the opposite angle and reversing the
    /// wheel speed reaches the same velocity with less rotation. At exactly
    /// 90 degrees both options rotate equally far and the unflipped state is
    /// kept.
    pub fn optimize(desired: &SwerveModuleState, current_angle: &Rotation2d) -> Self {
        let delta = desired.angle - *current_angle;

        if delta.radians().abs() > std::f64::consts::FRAC_PI_2 {
            Self {
                speed_ms: -desired.speed_ms,
                angle: desired.angle + Rotation2d::new(std::f64::consts::PI),
            }
        } else {
            *desired
        }
    }
}

impl SwerveDriveKinematics {
    /// Create kinematics from the module positions, given in the robot frame
    /// relative to the centre of rotation.
    ///
    /// At least two modules are required, and their placement must resolve
    /// all three chassis degrees of freedom; anything else (for instance two
    /// modules on the same point) is rejected here rather than producing a
    /// singular conversion at call time.
    pub fn new(modules: Vec<Translation2d>) -> Result<Self, KinematicsError> {
        if modules.len() < 2 {
            return Err(KinematicsError::DegenerateGeometry(format!(
                "a swerve drivetrain needs at least 2 modules, got {}",
                modules.len()
            )));
        }

        let mut inverse_kinematics = DMatrix::zeros(modules.len() * 2, 3);
        for (i, module) in modules.iter().enumerate() {
            inverse_kinematics[(i * 2, 0)] = 1.0;
            inverse_kinematics[(i * 2, 2)] = -module.y_m;
            inverse_kinematics[(i * 2 + 1, 1)] = 1.0;
            inverse_kinematics[(i * 2 + 1, 2)] = module.x_m;
        }

        if inverse_kinematics.clone().rank(1e-9) < 3 {
            return Err(KinematicsError::DegenerateGeometry(
                "swerve module positions do not span all chassis degrees of freedom".to_string(),
            ));
        }

        let forward_kinematics = inverse_kinematics
            .clone()
            .pseudo_inverse(1e-9)
            .map_err(|e| KinematicsError::DegenerateGeometry(e.to_string()))?;

        Ok(Self {
            modules,
            inverse_kinematics,
            forward_kinematics,
        })
    }

    /// Get the number of modules.
    pub fn num_modules(&self) -> usize {
        self.modules.len()
    }

    /// Convert a chassis velocity into per-module states.
    pub fn to_module_states(&self, speeds: &ChassisSpeeds) -> Vec<SwerveModuleState> {
        let chassis = Vector3::new(speeds.vx_ms, speeds.vy_ms, speeds.omega_rads);
        let module_vels = &self.inverse_kinematics * chassis;

        (0..self.modules.len())
            .map(|i| {
                let vx = module_vels[i * 2];
                let vy = module_vels[i * 2 + 1];

                SwerveModuleState {
                    speed_ms: vx.hypot(vy),
                    angle: Rotation2d::from_components(vx, vy),
                }
            })
            .collect()
    }

    /// Convert per-module states into the chassis velocity.
    ///
    /// The number of states must match the number of modules the kinematics
    /// were built with. On a mismatch the neutral chassis velocity is
    /// returned and a warning logged.
    pub fn to_chassis_speeds(&self, states: &[SwerveModuleState]) -> ChassisSpeeds {
        if states.len() != self.modules.len() {
            warn!(
                "Got {} module states for {} modules, returning zero chassis speeds",
                states.len(),
                self.modules.len()
            );
            return ChassisSpeeds::default();
        }

        let mut module_vels = DVector::zeros(self.modules.len() * 2);
        for (i, state) in states.iter().enumerate() {
            module_vels[i * 2] = state.speed_ms * state.angle.cos();
            module_vels[i * 2 + 1] = state.speed_ms * state.angle.sin();
        }

        let chassis = &self.forward_kinematics * module_vels;

        ChassisSpeeds {
            vx_ms: chassis[0],
            vy_ms: chassis[1],
            omega_rads: chassis[2],
        }
    }

    /// Scale all module speeds down so none exceeds the attainable maximum,
    /// preserving their ratios and leaving the angles untouched. Never
    /// scales up.
    pub fn desaturate_wheel_speeds(states: &mut [SwerveModuleState], attainable_max_speed_ms: f64) {
        let real_max = states
            .iter()
            .map(|s| s.speed_ms.abs())
            .fold(0.0f64, f64::max);

        if real_max > attainable_max_speed_ms {
            let scale = attainable_max_speed_ms / real_max;
            for state in states.iter_mut() {
                state.speed_ms *= scale;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use util::maths::epsilon_eq;

    fn test_kinematics() -> SwerveDriveKinematics {
        SwerveDriveKinematics::new(vec![
            Translation2d::new(0.3, 0.3),
            Translation2d::new(0.3, -0.3),
            Translation2d::new(-0.3, 0.3),
            Translation2d::new(-0.3, -0.3),
        ])
        .unwrap()
    }

    #[test]
    fn test_straight_drive() {
        let kin = test_kinematics();
        let states = kin.to_module_states(&ChassisSpeeds::new(3.0, 0.0, 0.0));

        for state in &states {
            assert!(epsilon_eq(state.speed_ms, 3.0, 1e-9));
            assert!(epsilon_eq(state.angle.radians(), 0.0, 1e-9));
        }
    }

    #[test]
    fn test_turn_in_place() {
        let kin = test_kinematics();
        let states = kin.to_module_states(&ChassisSpeeds::new(0.0, 0.0, 1.0));

        // Every module moves tangentially at r * omega
        let radius = (0.3f64).hypot(0.3);
        for state in &states {
            assert!(epsilon_eq(state.speed_ms, radius, 1e-9));
        }

        // Front left module, at (+0.3, +0.3), moves towards (-y, +x)
        assert!(epsilon_eq(states[0].angle.degrees(), 135.0, 1e-9));
    }

    #[test]
    fn test_roundtrip() {
        let kin = test_kinematics();
        let speeds = ChassisSpeeds::new(1.0, 0.5, -0.8);
        let back = kin.to_chassis_speeds(&kin.to_module_states(&speeds));

        assert!(epsilon_eq(back.vx_ms, speeds.vx_ms, 1e-9));
        assert!(epsilon_eq(back.vy_ms, speeds.vy_ms, 1e-9));
        assert!(epsilon_eq(back.omega_rads, speeds.omega_rads, 1e-9));
    }

    #[test]
    fn test_optimize_flips_past_90_deg() {
        let desired = SwerveModuleState::new(2.0, Rotation2d::new(170f64.to_radians()));
        let current = Rotation2d::new(0.0);

        let optimized = SwerveModuleState::optimize(&desired, &current);
        assert!(epsilon_eq(optimized.speed_ms, -2.0, 1e-9));
        assert!(epsilon_eq(optimized.angle.degrees(), -10.0, 1e-9));
    }

    #[test]
    fn test_optimize_keeps_within_90_deg() {
        let desired = SwerveModuleState::new(2.0, Rotation2d::new(45f64.to_radians()));
        let current = Rotation2d::new(0.0);

        let optimized = SwerveModuleState::optimize(&desired, &current);
        assert!(epsilon_eq(optimized.speed_ms, 2.0, 1e-9));
        assert!(epsilon_eq(optimized.angle.degrees(), 45.0, 1e-9));
    }

    #[test]
    fn test_optimize_exactly_90_deg_keeps_unflipped() {
        let desired = SwerveModuleState::new(1.0, Rotation2d::new(90f64.to_radians()));
        let current = Rotation2d::new(0.0);

        let optimized = SwerveModuleState::optimize(&desired, &current);
        assert!(epsilon_eq(optimized.speed_ms, 1.0, 1e-9));
        assert!(epsilon_eq(optimized.angle.degrees(), 90.0, 1e-9));
    }

    #[test]
    fn test_desaturate() {
        let kin = test_kinematics();
        let mut states = kin.to_module_states(&ChassisSpeeds::new(5.0, 0.0, 2.0));
        SwerveDriveKinematics::desaturate_wheel_speeds(&mut states, 4.0);

        let max = states
            .iter()
            .map(|s| s.speed_ms.abs())
            .fold(0.0f64, f64::max);
        assert!(epsilon_eq(max, 4.0, 1e-9));

        // Ratios are preserved against a fresh conversion
        let fresh = kin.to_module_states(&ChassisSpeeds::new(5.0, 0.0, 2.0));
        let scale = states[0].speed_ms / fresh[0].speed_ms;
        for (a, b) in states.iter().zip(fresh.iter()) {
            assert!(epsilon_eq(a.speed_ms, b.speed_ms * scale, 1e-9));
        }
    }

    #[test]
    fn test_desaturate_never_scales_up_and_is_idempotent() {
        let kin = test_kinematics();
        let mut states = kin.to_module_states(&ChassisSpeeds::new(1.0, 0.0, 0.5));
        let original: Vec<f64> = states.iter().map(|s| s.speed_ms).collect();

        // Already within the limit, nothing changes
        SwerveDriveKinematics::desaturate_wheel_speeds(&mut states, 10.0);
        for (state, speed_ms) in states.iter().zip(original.iter()) {
            assert_eq!(state.speed_ms, *speed_ms);
        }

        // A second pass after an actual desaturation changes nothing
        SwerveDriveKinematics::desaturate_wheel_speeds(&mut states, 1.0);
        let once: Vec<f64> = states.iter().map(|s| s.speed_ms).collect();
        SwerveDriveKinematics::desaturate_wheel_speeds(&mut states, 1.0);
        for (state, speed_ms) in states.iter().zip(once.iter()) {
            assert_eq!(state.speed_ms, *speed_ms);
        }
    }

    #[test]
    fn test_mismatched_state_count_returns_zero() {
        let kin = test_kinematics();
        let states = vec![SwerveModuleState::default(); 2];

        let speeds = kin.to_chassis_speeds(&states);
        assert_eq!(speeds.vx_ms, 0.0);
        assert_eq!(speeds.vy_ms, 0.0);
        assert_eq!(speeds.omega_rads, 0.0);
    }

    #[test]
    fn test_degenerate_geometry_rejected() {
        // A single module cannot resolve rotation and translation
        assert!(SwerveDriveKinematics::new(vec![Translation2d::new(0.3, 0.3)]).is_err());

        // Two modules stacked on the same point cannot either
        assert!(SwerveDriveKinematics::new(vec![
            Translation2d::new(0.1, 0.1),
            Translation2d::new(0.1, 0.1),
        ])
        .is_err());
    }
}
