use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use concrete_strength::api::predict_json;
use concrete_strength::dataset::{service as stats, CsvDatasetRepo};
use concrete_strength::grading::classify;
use concrete_strength::prediction::Pool;
use concrete_strength::{
    Category, ErrorCode, MixInput, MixValues, ModelAdapter, ModelSource, PredictionService,
    RawMix,
};
use proptest::prelude::*;

fn artifact(name: &str) -> ModelSource {
    ModelSource::Path(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("models")
            .join(name),
    )
}

const BUNDLED: [&str; 2] = ["illustrative-linear.json", "gbr-demo.json"];

fn adapter(name: &str) -> Arc<ModelAdapter> {
    Arc::new(ModelAdapter::load(&artifact(name)).expect("bundled artifact loads"))
}

fn service(name: &str) -> Arc<PredictionService> {
    Arc::new(PredictionService::new(adapter(name)))
}

fn mix(cement: f64, slag: f64, water: f64, sp: f64, age: f64) -> RawMix {
    MixValues {
        cement,
        blast_furnace_slag: slag,
        fly_ash: 50.0,
        water,
        superplasticizer: sp,
        coarse_aggregate: 1000.0,
        fine_aggregate: 800.0,
        age,
    }
    .to_raw()
}

fn reference() -> RawMix {
    mix(300.0, 100.0, 180.0, 10.0, 28.0)
}

#[test]
fn linear_artifact_end_to_end() {
    let service = service("illustrative-linear.json");
    let result = service.predict(&reference()).unwrap();

    assert!((result.strength_mpa - 56.1).abs() < 1e-9);
    assert_eq!(result.category, Category::High);
    assert_eq!(result.gauge.marker.label, "56.1");
    assert_eq!(
        result.gauge.band_at_marker().map(|b| b.category),
        Some(Category::High)
    );
    assert_eq!(service.predict(&reference()).unwrap(), result);
    assert_eq!(service.model().name, "illustrative-linear");
    assert_eq!(service.model().fingerprint.as_deref().map(str::len), Some(16));
}

#[test]
fn tree_artifact_spans_every_category() {
    let service = service("gbr-demo.json");

    let cases = [
        (mix(300.0, 100.0, 180.0, 10.0, 3.0), 14.6, Category::Low),
        (reference(), 37.6, Category::Moderate),
        (mix(500.0, 100.0, 160.0, 8.0, 90.0), 60.1, Category::High),
    ];
    for (raw, expected, category) in cases {
        let result = service.predict(&raw).unwrap();
        assert!(
            (result.strength_mpa - expected).abs() < 1e-9,
            "expected {expected}, got {}",
            result.strength_mpa
        );
        assert_eq!(result.category, category);
        assert_eq!(classify(result.strength_mpa).0, category);
    }
}

#[test]
fn invalid_requests_are_rejected_before_prediction() {
    let service = service("illustrative-linear.json");

    let mut too_old = reference();
    too_old.insert("age".into(), serde_json::json!(400));
    let err = service.predict(&too_old).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidInput);

    let mut missing = reference();
    missing.remove("water");
    assert_eq!(
        service.predict(&missing).unwrap_err().code(),
        ErrorCode::InvalidInput
    );
}

#[test]
fn json_envelope_and_parallel_batch() {
    let service = service("illustrative-linear.json");

    let out: serde_json::Value =
        serde_json::from_str(&predict_json(&service, r#"{"cement":"lots"}"#)).unwrap();
    assert_eq!(out["ok"], false);
    assert!(out["error"].as_str().unwrap().contains("cement"));

    let pool = Pool::new(2);
    let ages = [3.0, 7.0, 28.0, 90.0];
    let raws: Vec<RawMix> = ages
        .iter()
        .map(|age| mix(300.0, 100.0, 180.0, 10.0, *age))
        .collect();
    let results = service.predict_batch_parallel(&pool, raws);
    let strengths: Vec<f64> = results
        .into_iter()
        .map(|r| r.unwrap().strength_mpa)
        .collect();
    assert!(strengths.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn bad_artifact_reports_model_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"name":"x","features":["Cement"],"model":{{"kind":"linear","intercept":0,"coefficients":[1]}}}}"#).unwrap();

    let err = ModelAdapter::load(&ModelSource::Path(file.path().to_path_buf())).unwrap_err();
    assert_eq!(
        concrete_strength::Error::from(err).code(),
        ErrorCode::ModelLoad
    );
}

#[test]
fn dataset_statistics_from_csv() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Cement,Blast_Furnace_Slag,Fly_Ash,Water,Superplasticizer,Coarse_Aggregate,Fine_Aggregate,Age,Strength"
    )
    .unwrap();
    writeln!(file, "540,0,0,162,2.5,1040,676,28,79.99").unwrap();
    writeln!(file, "332.5,142.5,0,228,0,932,594,270,40.27").unwrap();
    writeln!(file, "198.6,132.4,0,192,0,978.4,825.5,90,38.07").unwrap();

    let dataset = CsvDatasetRepo::load(file.path()).unwrap();
    let dist = stats::strength_distribution(&dataset, 3).unwrap();
    assert_eq!(dist.count, 3);
    assert_eq!(dist.bins.iter().map(|b| b.count).sum::<usize>(), 3);
    assert_eq!(stats::strength_by_age(&dataset).len(), 3);
}

#[test]
fn validated_mix_skips_raw_parsing() {
    let service = service("gbr-demo.json");
    let mix = MixInput::new(MixValues {
        cement: 300.0,
        blast_furnace_slag: 100.0,
        fly_ash: 50.0,
        water: 180.0,
        superplasticizer: 10.0,
        coarse_aggregate: 1000.0,
        fine_aggregate: 800.0,
        age: 28.0,
    })
    .unwrap();
    assert_eq!(
        service.predict_mix(&mix).unwrap(),
        service.predict(&reference()).unwrap()
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn any_valid_mix_gives_a_finite_strength(
        cement in 0.0f64..=1000.0,
        slag in 0.0f64..=400.0,
        fly_ash in 0.0f64..=300.0,
        water in 100.0f64..=300.0,
        sp in 0.0f64..=30.0,
        coarse in 500.0f64..=1200.0,
        fine in 500.0f64..=1000.0,
        age in 1u32..=365,
    ) {
        let mix = MixInput::new(MixValues {
            cement,
            blast_furnace_slag: slag,
            fly_ash,
            water,
            superplasticizer: sp,
            coarse_aggregate: coarse,
            fine_aggregate: fine,
            age: f64::from(age),
        })
        .unwrap();

        for name in BUNDLED {
            let model = adapter(name);
            let strength = model.predict(&mix).unwrap();
            prop_assert!(strength.is_finite(), "{name}: {strength}");

            let result = PredictionService::new(model).predict_mix(&mix).unwrap();
            prop_assert_eq!(result.strength_mpa, strength);
            prop_assert_eq!(result.category, classify(strength).0);
        }
    }
}
