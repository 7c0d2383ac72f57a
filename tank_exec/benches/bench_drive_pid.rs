//! # Drive PID Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use tank_lib::{
    drive_ctrl::{DriveCtrl, OutputMode, Params, PidController},
    motor::{Gearset, GroupParams},
    sim::{SimBackend, SimParams},
};

fn drive_pid_benchmark(c: &mut Criterion) {
    // ---- Build a drive on an ideal simulated plant ----

    let params = Params {
        left: GroupParams {
            ports: vec![13, 11],
            reversed: vec![false, false],
            gearset: Gearset::Green,
        },
        right: GroupParams {
            ports: vec![10, 3],
            reversed: vec![true, true],
            gearset: Gearset::Green,
        },
        wheel_diameter_in: 4.0,
        base_width_in: 12.75,
        k_p: 60.0,
        k_i: 0.05,
        k_d: 55.0,
        settle_threshold_deg: 5.0,
        windup_threshold_deg: 10.0,
        output_mode: OutputMode::Voltage,
        // No sleeping, only the control maths and motor writes are measured
        ctrl_period_ms: 0,
        max_iterations: Some(2000),
    };

    let mut backend = SimBackend::new(SimParams {
        time_const_s: 0.0,
        ..Default::default()
    });
    let mut drive = DriveCtrl::new(params, &mut backend).unwrap();

    // Bench a single controller update
    let mut pid = PidController::new(60.0, 0.05, 55.0, 10.0, 12000.0);
    let mut error = 400.0;
    c.bench_function("PidController::get", |b| {
        b.iter(|| {
            error = -error * 0.99;
            pid.get(error)
        })
    });

    // Bench complete motions
    c.bench_function("DriveCtrl::move_straight", |b| {
        b.iter(|| drive.move_straight(15.0, None))
    });

    c.bench_function("DriveCtrl::turn_angle", |b| {
        b.iter(|| drive.turn_angle(90.0, None))
    });
}

criterion_group!(benches, drive_pid_benchmark);
criterion_main!(benches);
