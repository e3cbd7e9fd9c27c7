use std::fs;

use batchsim::{
    CompletedRun, FileSink, InitialConditions, MemorySink, PersistenceError, PhysicalParameters,
    ResultSink, RunConfig, SamplingConfig, SeededSource, SimulationConfig, SimulationDriver,
    SimulationMetadata, TimeSeriesRow,
};

fn driver() -> SimulationDriver {
    let config = RunConfig {
        initial_conditions: InitialConditions::Fixed {
            ca0: 1000.0,
            cb0: 1000.0,
            t0: 298.15,
        },
        sampling: SamplingConfig {
            catalysis_probability: 0.0,
            ..SamplingConfig::default()
        },
        ..RunConfig::default()
    };
    SimulationDriver::new(PhysicalParameters::default(), config).unwrap()
}

#[test]
fn file_sink_writes_csv_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FileSink::new(dir.path());
    let run = CompletedRun::new(driver().run(&mut SeededSource::seeded(1)));

    let persisted = sink.persist(&run).unwrap();
    assert_eq!(persisted.run_id, run.id());

    let results_path = persisted.results_path.unwrap();
    let metadata_path = persisted.metadata_path.unwrap();
    assert_eq!(
        results_path.file_name().unwrap().to_str().unwrap(),
        format!("results_{}.csv", run.id())
    );
    // <base>/incoming/<YYYY-MM-DD>/
    let day_dir = results_path.parent().unwrap();
    assert_eq!(day_dir.parent().unwrap(), dir.path().join("incoming"));
    assert_eq!(day_dir.file_name().unwrap().len(), "2024-01-01".len());
    assert_eq!(metadata_path.parent().unwrap(), day_dir);

    for name in ["incoming", "processed", "archive", "failed"] {
        assert!(dir.path().join(name).is_dir());
    }

    let mut reader = csv::Reader::from_path(&results_path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(
        headers,
        [
            "CA (mol/m^3)",
            "CB (mol/m^3)",
            "CC (mol/m^3)",
            "CD (mol/m^3)",
            "T (K)",
            "Tsensor (K)",
            "t (sec)",
            "SimulationID",
        ]
    );
    let rows: Vec<TimeSeriesRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), run.history().len());
    assert_eq!(rows[0].ca, 1000.0);
    assert_eq!(rows[0].elapsed, 0.0);
    assert!(rows.iter().all(|r| r.simulation_id == run.id()));

    let text = fs::read_to_string(&metadata_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["simulation_id"], run.id().to_string());
    assert_eq!(json["reaction_name"], "ethyl_acetate_saponification");
    assert!(json["activation_energy (J/mol)"].is_string());
    assert_eq!(json["T0_(K)"], 298.15);
    assert_eq!(json["stop_reason"], run.metadata().stop_reason.as_str());

    let metadata: SimulationMetadata = serde_json::from_str(&text).unwrap();
    assert_eq!(&metadata, run.metadata());
}

#[test]
fn run_and_persist_reports_sink_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, b"not a directory").unwrap();

    let err = driver()
        .run_and_persist(&mut SeededSource::seeded(2), &FileSink::new(&blocker))
        .unwrap_err();
    assert!(err.is_persistence());
    assert!(matches!(
        err,
        batchsim::BatchSimError::Persistence(PersistenceError::Io { .. })
    ));
}

#[test]
fn memory_sink_accepts_many_runs() {
    let sink = MemorySink::new();
    let d = driver();
    let mut rng = SeededSource::seeded(3);
    let ids: Vec<_> = (0..3)
        .map(|_| d.run_and_persist(&mut rng, &sink).unwrap().id())
        .collect();
    assert_eq!(sink.len().unwrap(), 3);
    let stored: Vec<_> = sink.runs().unwrap().iter().map(CompletedRun::id).collect();
    assert_eq!(stored, ids);
}

#[test]
fn config_driven_run_lands_in_configured_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = SimulationConfig::from_json_str(r#"{"run": {"stop_policy": {"max_time": 30.0}}}"#)
        .unwrap()
        .with_base_dir(dir.path());
    let run = config
        .driver()
        .unwrap()
        .run_and_persist(&mut SeededSource::seeded(4), &config.sink())
        .unwrap();

    let day_dirs: Vec<_> = fs::read_dir(dir.path().join("incoming"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(day_dirs.len(), 1);
    assert!(day_dirs[0].join(run.results_file_name()).is_file());
    assert!(day_dirs[0].join(run.metadata_file_name()).is_file());
    assert!(run.metadata().stop_time <= 30.0);
}
