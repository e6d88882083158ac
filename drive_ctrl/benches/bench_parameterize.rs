//! # Trajectory Parameterization Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use drive_ctrl::ctrl::SimpleMotorFeedforward;
use drive_ctrl::geom::{Pose2d, Rotation2d};
use drive_ctrl::kinematics::DifferentialDriveKinematics;
use drive_ctrl::traj::constraint::{
    CentripetalAccelerationConstraint, DifferentialDriveVoltageConstraint, TrajectoryConstraint,
};
use drive_ctrl::traj::{straight_path, time_parameterize, ParameterizeConfig, PathPoint};

/// S-curve path with smoothly varying curvature, sampled every 2 cm.
fn winding_path() -> Vec<PathPoint> {
    let straight = straight_path(
        &Pose2d::new(0.0, 0.0, Rotation2d::new(0.0)),
        &Pose2d::new(10.0, 0.0, Rotation2d::new(0.0)),
        0.02,
    );

    straight
        .into_iter()
        .map(|point| PathPoint {
            curvature_radpm: (point.pose.x_m() * 0.8).sin(),
            ..point
        })
        .collect()
}

fn parameterize_benchmark(c: &mut Criterion) {
    let path = winding_path();

    let centripetal = CentripetalAccelerationConstraint::new(3.0);
    let voltage = DifferentialDriveVoltageConstraint::new(
        SimpleMotorFeedforward::new(0.5, 2.0, 0.4),
        DifferentialDriveKinematics::new(0.6).unwrap(),
        10.0,
    );
    let constraints: Vec<&dyn TrajectoryConstraint> = vec![&centripetal, &voltage];

    let config = ParameterizeConfig {
        max_velocity_ms: 3.0,
        max_acceleration_mss: 2.0,
        ..Default::default()
    };

    c.bench_function("parameterize_winding_10m", |b| {
        b.iter(|| time_parameterize(&path, &constraints, &config).unwrap())
    });

    let unconstrained_path = straight_path(
        &Pose2d::new(0.0, 0.0, Rotation2d::new(0.0)),
        &Pose2d::new(10.0, 0.0, Rotation2d::new(0.0)),
        0.02,
    );

    c.bench_function("parameterize_straight_10m", |b| {
        b.iter(|| time_parameterize(&unconstrained_path, &[], &config).unwrap())
    });
}

criterion_group!(benches, parameterize_benchmark);
criterion_main!(benches);
