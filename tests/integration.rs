//! End-to-end tests against the public engine API

use chrono::{TimeZone, Utc};
use disaster_risk::config::{load_config, BoostingSettings, EngineConfig, ForestSettings};
use disaster_risk::prelude::*;
use disaster_risk::risk::round3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::sync::{Arc, OnceLock};

fn trained_engine() -> &'static HazardEngine {
    static ENGINE: OnceLock<HazardEngine> = OnceLock::new();
    ENGINE.get_or_init(|| HazardEngine::from_config(&EngineConfig::default()).unwrap())
}

fn small_config(seed: u64) -> EngineConfig {
    EngineConfig {
        seed,
        earthquake: ForestSettings {
            n_samples: 400,
            n_trees: 10,
            max_depth: 6,
        },
        flood: BoostingSettings {
            n_samples: 400,
            n_estimators: 15,
            max_depth: 3,
            learning_rate: 0.1,
        },
        cyclone: ForestSettings {
            n_samples: 300,
            n_trees: 10,
            max_depth: 5,
        },
        ..Default::default()
    }
}

fn untrainable_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.earthquake.n_samples = 0;
    config.flood.n_samples = 0;
    config.cyclone.n_samples = 0;
    config
}

fn clock_at(month: u32) -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2024, month, 15, 12, 0, 0).unwrap(),
    ))
}

#[test]
fn test_pacific_ring_of_fire_example() {
    let engine = trained_engine();
    let location = Location::new(35.0, 139.0);
    let features = Features::new()
        .with("depth", 30.0)
        .with("historical_frequency", 3.0)
        .with("recent_magnitude", 2.5);

    let result = engine.predict("earthquake", &location, &features).unwrap();
    assert_eq!(result.disaster_type, DisasterType::Earthquake);
    assert!(result.risk_factors[0].contains("Pacific Ring of Fire"));
    assert_eq!(result.risk_factors[0], "Distance to Pacific Ring of Fire: 0.0°");

    let prediction = engine.earthquake().classify(&location, &features);
    assert_eq!(result.severity, Severity::from_class(prediction.class));
    // the reported class is the most probable one
    assert_eq!(result.probability, result.confidence);
    assert_eq!(result.model_used, "seismic-random-forest");
    assert_eq!(result.model_version, "2.0");
}

#[test]
fn test_trained_engine_is_ready() {
    let health = trained_engine().health();
    assert!(health.models.values().all(|ready| *ready));
}

#[test]
fn test_outputs_stay_in_range() {
    let engine = trained_engine();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let locations = [
        Location::new(35.0, 139.0),
        Location::new(-33.9, 151.2),
        Location::new(200.0, -500.0),
        Location::default(),
    ];
    let types = [
        DisasterType::Earthquake,
        DisasterType::Flood,
        DisasterType::Cyclone,
        DisasterType::Storm,
        DisasterType::Heatwave,
        DisasterType::ExtremeWeather,
    ];

    for location in &locations {
        for disaster_type in types {
            let result = engine.predict_with_rng(disaster_type, location, &Features::new(), &mut rng);
            assert!((0.0..=1.0).contains(&result.probability));
            assert!((0.0..=1.0).contains(&result.confidence));
            assert!(!result.risk_factors.is_empty());
        }
    }
}

#[test]
fn test_same_seed_same_classification() {
    let a = HazardEngine::from_config(&small_config(42)).unwrap();
    let b = HazardEngine::from_config(&small_config(42)).unwrap();
    assert_eq!(a.health().models, b.health().models);

    let features = Features::new()
        .with("rainfall", 65.0)
        .with("water_level", 4.0)
        .with("pressure", 975.0);
    for location in [
        Location::new(35.0, 139.0),
        Location::new(10.0, 106.0),
        Location::new(-15.0, 70.0),
    ] {
        assert_eq!(
            a.earthquake().classify(&location, &features),
            b.earthquake().classify(&location, &features)
        );
        assert_eq!(a.flood().classify(&features), b.flood().classify(&features));
        assert_eq!(
            a.weather().classify_cyclone(&location, &features),
            b.weather().classify_cyclone(&location, &features)
        );
    }
}

#[test]
fn test_failed_fit_serves_fallback() {
    let engine = HazardEngine::from_config(&untrainable_config()).unwrap();
    assert!(engine.health().models.values().all(|ready| !ready));

    for name in ["earthquake", "flood", "cyclone", "storm"] {
        let result = engine
            .predict(name, &Location::new(12.0, 80.0), &Features::new())
            .unwrap();
        assert_eq!(result.severity, Severity::Medium, "{}", name);
        assert_eq!(result.probability, 0.4, "{}", name);
        assert_eq!(result.confidence, 0.4, "{}", name);
    }

    // heatwave and ensemble need no fitted model
    let heat = engine
        .predict("heatwave", &Location::default(), &Features::new())
        .unwrap();
    assert_eq!(heat.probability, 0.15);
}

#[test]
fn test_flood_monsoon_adjustment() {
    let july = HazardEngine::with_clock(&untrainable_config(), clock_at(7)).unwrap();
    let january = HazardEngine::with_clock(&untrainable_config(), clock_at(1)).unwrap();

    // 12 degrees north of the Mississippi Basin
    let location = Location::new(42.0, -90.0);
    let wet = july.flood().assess_risk(&location);
    let dry = january.flood().assess_risk(&location);
    let wet = &wet[&HazardKind::Flood];
    let dry = &dry[&HazardKind::Flood];

    assert!(wet
        .factors
        .iter()
        .any(|f| f.eq_ignore_ascii_case("monsoon season active")));
    assert!(!dry
        .factors
        .iter()
        .any(|f| f.eq_ignore_ascii_case("monsoon season active")));
    assert_eq!(wet.score, round3((dry.score + 0.1).min(1.0)));
}

#[test]
fn test_aggregate_is_mean_of_hazards() {
    let engine = HazardEngine::with_clock(&untrainable_config(), clock_at(3)).unwrap();

    for point in [
        DEFAULT_LOCATION,
        GeoPoint::new(35.0, 139.0),
        GeoPoint::new(-60.0, -150.0),
    ] {
        let risk = engine.assess_risk(point);
        assert_eq!(risk.risk_levels.len(), 4);

        let scores: Vec<f64> = risk.risk_levels.values().map(|l| l.score).collect();
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        assert_eq!(risk.overall_score, round3(mean));
        assert_eq!(risk.overall_risk, Severity::from_aggregate_score(mean));
        assert_eq!(risk.last_updated, Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());

        // stable for a fixed clock
        assert_eq!(engine.assess_risk(point), risk);
    }
}

#[test]
fn test_remote_point_is_low_risk() {
    let engine = HazardEngine::with_clock(&untrainable_config(), clock_at(3)).unwrap();
    let risk = engine.assess_risk(GeoPoint::new(-80.0, -170.0));
    assert!(risk.risk_levels.values().all(|l| l.score == 0.0));
    assert_eq!(risk.overall_score, 0.0);
    assert_eq!(risk.overall_risk, Severity::Low);
}

#[test]
fn test_unknown_disaster_type() {
    let engine = HazardEngine::from_config(&untrainable_config()).unwrap();
    let err = engine
        .predict("tsunami", &Location::default(), &Features::new())
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownDisasterType(ref t) if t == "tsunami"));
    assert_eq!(err.to_string(), "Unknown disaster type: tsunami");
}

#[test]
fn test_concurrent_predictions() {
    let engine = trained_engine();
    let location = Location::new(23.5, 89.0);
    let features = Features::new().with("rainfall", 90.0);
    let expected = engine.flood().classify(&features);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    assert_eq!(engine.flood().classify(&features), expected);
                    engine.assess_risk(GeoPoint::new(23.5, 89.0));
                    engine.predict_type(DisasterType::Flood, &location, &features);
                }
            });
        }
    });
}

#[test]
fn test_engine_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "seed = 7\n\n[earthquake]\nn_samples = 0\n\n[flood]\nn_samples = 0\n\n[cyclone]\nn_samples = 0\nn_trees = 5"
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.earthquake.n_trees, 100);
    assert_eq!(config.cyclone.n_trees, 5);
    assert_eq!(config.cyclone.max_depth, 8);

    let engine = HazardEngine::from_config(&config).unwrap();
    assert!(!engine.earthquake().is_ready());
    assert_eq!(engine.model_info().len(), 3);
}
