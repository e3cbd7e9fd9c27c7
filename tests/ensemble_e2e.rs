use batchsim::{
    run_ensemble, CompletedRun, EnsembleConfig, MemorySink, PhysicalParameters, ResultSink,
    RunConfig, SeededSource, SimulationDriver,
};

fn short_driver() -> SimulationDriver {
    let mut config = RunConfig::default();
    config.stop_policy.max_time = 600.0;
    SimulationDriver::new(PhysicalParameters::default(), config).unwrap()
}

#[test]
fn ensemble_matches_sequential_runs() {
    let driver = short_driver();
    let config = EnsembleConfig {
        runs: 8,
        workers: 4,
        base_seed: 1_000,
        queue_capacity: 2,
    };

    let members = run_ensemble(&driver, &config).unwrap();
    assert_eq!(members.len(), 8);

    for (i, member) in members.iter().enumerate() {
        assert_eq!(member.index, i);
        let sequential = driver.run(&mut SeededSource::seeded(config.seed_for(i)));
        // Debug output compares NaN tails too.
        assert_eq!(format!("{:?}", member.outcome), format!("{sequential:?}"));
    }
}

#[test]
fn worker_count_does_not_change_results() {
    let driver = short_driver();
    let base = EnsembleConfig {
        runs: 5,
        workers: 1,
        base_seed: 77,
        queue_capacity: 1,
    };
    let single = run_ensemble(&driver, &base).unwrap();
    let many = run_ensemble(
        &driver,
        &EnsembleConfig {
            workers: 8,
            queue_capacity: 16,
            ..base
        },
    )
    .unwrap();

    let a: Vec<String> = single.iter().map(|m| format!("{:?}", m.outcome)).collect();
    let b: Vec<String> = many.iter().map(|m| format!("{:?}", m.outcome)).collect();
    assert_eq!(a, b);
}

#[test]
fn ensemble_members_can_be_persisted() {
    let driver = short_driver();
    let config = EnsembleConfig {
        runs: 3,
        ..EnsembleConfig::default()
    };
    let sink = MemorySink::new();
    for member in run_ensemble(&driver, &config).unwrap() {
        sink.persist(&CompletedRun::new(member.outcome)).unwrap();
    }
    assert_eq!(sink.len().unwrap(), 3);
}

#[test]
fn invalid_ensemble_is_rejected() {
    let config = EnsembleConfig {
        queue_capacity: 0,
        ..EnsembleConfig::default()
    };
    let err = run_ensemble(&short_driver(), &config).unwrap_err();
    assert!(err.is_validation());
}
