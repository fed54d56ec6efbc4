use overwatch_algo::{
    build_reference_tables, compute_fault_amperes, compute_relay_measurement, locate,
    locate_by_impedance, run_trials, simulate_sensor_frame, summarize, Classification,
    FaultReport, FaultStatus, ImpedancePolicy, NoiseModel, ReferenceTables, Severity,
    TableLocator, TrialScenario,
};
use overwatch_core::{
    FaultSpec, FaultType, FeederConfig, OverwatchError, Phase, PhaseCurrents, SensorFrame,
};

const STEP_KM: f64 = 0.01;

fn feeder() -> FeederConfig {
    FeederConfig::default()
}

fn tables(config: &FeederConfig) -> ReferenceTables {
    build_reference_tables(config, config.length.value(), STEP_KM).unwrap()
}

#[test]
fn test_current_is_non_increasing_with_distance() {
    let config = feeder();
    for fault_type in FaultType::ALL {
        let at_source = compute_fault_amperes(&config, &FaultSpec::bolted(0.0, fault_type))
            .unwrap()
            .peak();
        let mut previous = at_source;
        for i in 1..=200 {
            let d = i as f64 * 0.05;
            let peak = compute_fault_amperes(&config, &FaultSpec::bolted(d, fault_type))
                .unwrap()
                .peak();
            assert!(peak <= previous + 1e-9, "{fault_type} rose at {d} km");
            assert!(peak <= at_source);
            previous = peak;
        }
    }
}

#[test]
fn test_exact_table_values_round_trip() {
    let config = feeder();
    let tables = tables(&config);
    for table in tables.iter() {
        let phase = match table.fault_type() {
            FaultType::LineToLine => Phase::B,
            _ => Phase::A,
        };
        for row in table.rows() {
            let found = table.nearest(0.0, phase, row.currents.get(phase)).unwrap();
            assert_eq!(found.distance_km, row.distance_km);
        }
    }
}

#[test]
fn test_quiet_frame_is_no_fault() {
    let config = feeder();
    let tables = tables(&config);
    let frame = SensorFrame::new(vec![PhaseCurrents::new(12.0, 9.0, 49.9); 3]);
    let result = locate(&frame, &tables, &config).unwrap();
    assert_eq!(result.status, FaultStatus::NoFault);
    assert_eq!(result.classification, None);
    assert_eq!(result.unit_index, None);
    assert_eq!(result.distance_km, 0.0);
}

#[test]
fn test_unit_at_feeder_end_exhausts_zone() {
    let config = FeederConfig {
        unit_distances_km: vec![0.0, 3.0, 10.0],
        ..feeder()
    };
    let tables = tables(&config);
    let frame = simulate_sensor_frame(&config, &FaultSpec::bolted(10.0, FaultType::ThreePhase))
        .unwrap();
    let err = locate(&frame, &tables, &config).unwrap_err();
    match err {
        OverwatchError::ZoneExhausted { unit_index, .. } => assert_eq!(unit_index, 2),
        other => panic!("expected ZoneExhausted, got {other:?}"),
    }
}

#[test]
fn test_short_table_exhausts_zone() {
    let config = feeder();
    let short = build_reference_tables(&config, 5.0, STEP_KM).unwrap();
    let frame = simulate_sensor_frame(&config, &FaultSpec::bolted(9.0, FaultType::LineToLine))
        .unwrap();
    let err = locate(&frame, &short, &config).unwrap_err();
    assert!(matches!(err, OverwatchError::ZoneExhausted { unit_index: 2, .. }));
}

#[test]
fn test_slg_at_five_km_noise_free() {
    let config = feeder();
    let tables = tables(&config);
    let frame =
        simulate_sensor_frame(&config, &FaultSpec::bolted(5.0, FaultType::SingleLineToGround))
            .unwrap();

    let result = locate(&frame, &tables, &config).unwrap();
    assert_eq!(result.status, FaultStatus::FaultConfirmed);
    assert_eq!(result.classification, Some(Classification::SingleLineToGround));
    assert_eq!(result.unit_index, Some(1));
    assert!((result.distance_km - 5.0).abs() <= STEP_KM, "got {}", result.distance_km);
    assert!((result.measured_current_a - result.matched_current_a).abs() < 1.0);
}

#[test]
fn test_line_to_line_with_one_percent_noise() {
    let config = feeder();
    let tables = tables(&config);
    let scenario = TrialScenario::new(FaultSpec::bolted(3.0, FaultType::LineToLine))
        .with_noise(NoiseModel::relative(0.01));

    let outcomes = run_trials(&config, &tables, &scenario, 1000, 2024).unwrap();
    let summary = summarize(&outcomes);

    assert_eq!(summary.trials, 1000);
    assert!(summary.classification_accuracy >= 0.95);
    assert_eq!(summary.located, 1000);
    // 1% current error is worth roughly 50 m at 3 km on this feeder
    assert!(summary.table_max_error_km < 0.1, "{summary:?}");
}

#[test]
fn test_impedance_three_phase_at_four_km() {
    let config = feeder();
    let policy = ImpedancePolicy::bus_measured();
    let fault = FaultSpec::bolted(4.0, FaultType::ThreePhase);
    let relay = compute_relay_measurement(&config, &fault, &policy).unwrap();
    let d = locate_by_impedance(relay.voltage, relay.current, FaultType::ThreePhase, &config, &policy);
    assert!((d - 4.0).abs() < 1e-9);
}

#[test]
fn test_every_type_located_from_each_zone() {
    let config = feeder();
    let tables = tables(&config);
    let locator = TableLocator::new(&tables, &config).unwrap();
    for fault_type in FaultType::ALL {
        for distance in [1.25, 4.5, 9.1] {
            let frame =
                simulate_sensor_frame(&config, &FaultSpec::bolted(distance, fault_type)).unwrap();
            let result = locator.locate(&frame).unwrap();
            assert_eq!(
                result.classification.and_then(Classification::fault_type),
                Some(fault_type)
            );
            assert!((result.distance_km - distance).abs() <= STEP_KM);
        }
    }
}

#[test]
fn test_frame_shape_mismatch_rejected() {
    let config = feeder();
    let tables = tables(&config);
    let frame = SensorFrame::new(vec![PhaseCurrents::new(500.0, 0.0, 0.0)]);
    let err = locate(&frame, &tables, &config).unwrap_err();
    assert!(matches!(err, OverwatchError::InvalidArgument(_)));
}

#[test]
fn test_raised_threshold_hides_distant_fault() {
    let config = feeder();
    let tables = tables(&config);
    let frame =
        simulate_sensor_frame(&config, &FaultSpec::bolted(9.0, FaultType::SingleLineToGround))
            .unwrap();
    let locator = TableLocator::new(&tables, &config)
        .unwrap()
        .with_trip_threshold(1e6);
    assert!(!locator.locate(&frame).unwrap().is_fault());
}

#[test]
fn test_exhausted_zone_keeps_classification() {
    let config = FeederConfig {
        unit_distances_km: vec![0.0, 3.0, 10.0],
        ..feeder()
    };
    let tables = tables(&config);
    let scenario = TrialScenario::new(FaultSpec::bolted(10.0, FaultType::ThreePhase))
        .with_noise(NoiseModel::relative(0.01));

    let outcomes = run_trials(&config, &tables, &scenario, 20, 7).unwrap();
    for outcome in &outcomes {
        assert_eq!(outcome.status, FaultStatus::FaultConfirmed);
        assert_eq!(outcome.classification, Some(Classification::ThreePhase));
        assert_eq!(outcome.unit_index, Some(2));
        assert_eq!(outcome.table_estimate_km, None);
        assert!(outcome.report.is_none());
    }

    let summary = summarize(&outcomes);
    assert_eq!(summary.detected, 20);
    assert_eq!(summary.located, 0);
    assert_eq!(summary.classification_accuracy, 1.0);
}

#[test]
fn test_unrecognised_pattern_searched_as_slg() {
    let config = feeder();
    let tables = tables(&config);
    let reading = PhaseCurrents::new(600.0, 1000.0, 300.0);
    let frame = SensorFrame::new(vec![reading, reading, PhaseCurrents::default()]);

    let result = locate(&frame, &tables, &config).unwrap();
    assert_eq!(result.status, FaultStatus::FaultConfirmed);
    assert_eq!(result.classification, Some(Classification::Uncertain));
    assert_eq!(result.label(), "Uncertain (Assumed SLG)");
    assert_eq!(result.unit_index, Some(1));
    assert_eq!(result.measured_current_a, 1000.0);

    let slg = tables.get(FaultType::SingleLineToGround);
    let expected = slg.nearest(3.0, Phase::A, 1000.0).unwrap();
    assert_eq!(result.distance_km, expected.distance_km);
    assert!(result.distance_km >= 3.0);
}

#[test]
fn test_fault_report_severity() {
    let config = feeder();
    let tables = tables(&config);
    let locator = TableLocator::new(&tables, &config).unwrap();

    let near = simulate_sensor_frame(&config, &FaultSpec::bolted(0.2, FaultType::ThreePhase))
        .unwrap();
    let report = FaultReport::from_result(&locator.locate(&near).unwrap(), &config).unwrap();
    assert_eq!(report.severity, Severity::Critical);
    assert_eq!(report.unit_index, 0);
    assert_eq!(report.unit_distance_km, 0.0);

    let far = simulate_sensor_frame(&config, &FaultSpec::bolted(5.0, FaultType::SingleLineToGround))
        .unwrap();
    let report = FaultReport::from_result(&locator.locate(&far).unwrap(), &config).unwrap();
    assert_eq!(report.severity, Severity::Warning);
    assert_eq!(report.unit_index, 1);
    assert!((report.distance_m - 5000.0).abs() <= STEP_KM * 1000.0 + 1e-6);
}
