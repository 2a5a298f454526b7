//! C-compatible API for a UI host.
//!
//! The host calls `cs_init` once, then `cs_predict`, `cs_predict_batch` or
//! `cs_dataset_stats` per request. Every string returned by this module must
//! be released with `cs_free_str`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde_json::{json, Value};

use crate::common::config::AppCfg;
use crate::common::error::{Error, ErrorCode, Result};
use crate::common::log;
use crate::dataset::service::{summarise, DEFAULT_BINS};
use crate::dataset::CsvDatasetRepo;
use crate::mix::domain::RawMix;
use crate::model::ModelAdapter;
use crate::prediction::{Pool, PredictionResult, PredictionService};

/// Everything `cs_init` sets up. Lives until the process exits.
struct Runtime {
    service: Arc<PredictionService>,
    pool: Pool,
    dataset_path: Option<PathBuf>,
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// ABI version to coordinate with the host.
#[no_mangle]
pub extern "C" fn cs_api_version() -> u32 {
    2
}

/// Load configuration, install logging and load the model.
///
/// `config_path` may be null, in which case configuration comes from the
/// environment. Returns an [`ErrorCode`]. Calling again after a successful
/// init is a no-op.
#[no_mangle]
pub extern "C" fn cs_init(config_path: *const c_char) -> u32 {
    if RUNTIME.get().is_some() {
        return ErrorCode::Ok as u32;
    }

    let cfg = if config_path.is_null() {
        AppCfg::load()
    } else {
        let path = unsafe { CStr::from_ptr(config_path) }
            .to_string_lossy()
            .into_owned();
        AppCfg::from_file(Path::new(&path))
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(err) => {
            // Nothing is installed yet; fall back to the default subscriber.
            log::init(&AppCfg::default());
            tracing::error!(error = %err, "configuration rejected");
            return err.code() as u32;
        }
    };

    match init_runtime(&cfg) {
        Ok(runtime) => {
            let _ = RUNTIME.set(runtime);
            ErrorCode::Ok as u32
        }
        Err(err) => {
            tracing::error!(error = %err, "initialisation failed");
            err.code() as u32
        }
    }
}

fn init_runtime(cfg: &AppCfg) -> Result<Runtime> {
    log::init(cfg);
    let adapter = ModelAdapter::load(&cfg.model_path.clone().into())?;
    Ok(Runtime {
        service: Arc::new(PredictionService::new(Arc::new(adapter))),
        pool: Pool::from_cfg(cfg),
        dataset_path: cfg.dataset_path.clone(),
    })
}

/// Predict from a JSON object of mix fields. Returns a JSON envelope.
#[no_mangle]
pub extern "C" fn cs_predict(input: *const c_char) -> *const c_char {
    with_input(input, |runtime, input| predict_json(&runtime.service, input))
}

/// Predict a JSON array of mixes on the worker pool. Returns
/// `{"ok":true,"results":[...]}` with one envelope per mix, in input order.
#[no_mangle]
pub extern "C" fn cs_predict_batch(input: *const c_char) -> *const c_char {
    with_input(input, |runtime, input| {
        predict_batch_json(&runtime.service, &runtime.pool, input)
    })
}

/// Descriptive statistics of the configured dataset. `bins` of 0 picks the
/// default histogram resolution.
#[no_mangle]
pub extern "C" fn cs_dataset_stats(bins: u32) -> *const c_char {
    let out = match RUNTIME.get() {
        Some(runtime) => dataset_stats_json(runtime.dataset_path.as_deref(), bins as usize),
        None => not_initialised(),
    };
    string_to_raw(out)
}

/// Free strings allocated by Rust.
#[no_mangle]
pub extern "C" fn cs_free_str(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(ptr as *mut c_char);
    }
}

fn with_input<F>(input: *const c_char, call: F) -> *const c_char
where
    F: FnOnce(&Runtime, &str) -> String,
{
    if input.is_null() {
        return string_to_raw(error_json(ErrorCode::InvalidInput, "null input"));
    }
    let input = unsafe { CStr::from_ptr(input) }.to_string_lossy();

    let out = match RUNTIME.get() {
        Some(runtime) => call(runtime, &input),
        None => not_initialised(),
    };
    string_to_raw(out)
}

/// `{"ok":true,"result":...}` or `{"ok":false,"code":n,"error":"..."}`.
pub fn predict_json(service: &PredictionService, input: &str) -> String {
    match serde_json::from_str::<RawMix>(input) {
        Ok(raw) => envelope(service.predict(&raw)).to_string(),
        Err(err) => error_json(
            ErrorCode::InvalidInput,
            &format!("request is not a JSON object: {err}"),
        ),
    }
}

/// Batch form of [`predict_json`]. A malformed array fails as a whole; a bad
/// mix only fails its own slot.
pub fn predict_batch_json(service: &Arc<PredictionService>, pool: &Pool, input: &str) -> String {
    let raws: Vec<RawMix> = match serde_json::from_str(input) {
        Ok(raws) => raws,
        Err(err) => {
            return error_json(
                ErrorCode::InvalidInput,
                &format!("request is not a JSON array of objects: {err}"),
            )
        }
    };

    let results: Vec<Value> = service
        .predict_batch_parallel(pool, raws)
        .into_iter()
        .map(envelope)
        .collect();
    json!({ "ok": true, "results": results }).to_string()
}

/// `{"ok":true,"stats":...}` for the dataset at `path`.
pub fn dataset_stats_json(path: Option<&Path>, bins: usize) -> String {
    let Some(path) = path else {
        return error_json(ErrorCode::Config, "dataset_path is not configured");
    };
    match CsvDatasetRepo::load(path) {
        Ok(dataset) => {
            let bins = if bins == 0 { DEFAULT_BINS } else { bins };
            json!({ "ok": true, "stats": summarise(&dataset, bins) }).to_string()
        }
        Err(err) => {
            let err = Error::from(err);
            tracing::warn!(error = %err, path = %path.display(), "dataset unavailable");
            error_json(err.code(), &err.to_string())
        }
    }
}

fn envelope(result: Result<PredictionResult>) -> Value {
    match result {
        Ok(result) => json!({ "ok": true, "result": result }),
        Err(err) => error_value(err.code(), &err.to_string()),
    }
}

fn not_initialised() -> String {
    error_json(ErrorCode::ModelLoad, "cs_init has not succeeded")
}

fn error_value(code: ErrorCode, msg: &str) -> Value {
    json!({ "ok": false, "code": code as u32, "error": msg })
}

fn error_json(code: ErrorCode, msg: &str) -> String {
    error_value(code, msg).to_string()
}

fn string_to_raw(s: String) -> *const c_char {
    match CString::new(s) {
        Ok(cstring) => cstring.into_raw(),
        Err(_) => fallback_json_raw(),
    }
}

fn fallback_json_raw() -> *const c_char {
    let fallback = format!(r#"{{"ok":false,"code":{}}}"#, ErrorCode::Internal as u32);
    CString::new(fallback).map_or(std::ptr::null(), |s| s.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::PredictionError;
    use crate::mix::domain::FeatureVector;
    use crate::model::Regressor;

    struct WaterCement;

    impl Regressor for WaterCement {
        fn predict(&self, x: &FeatureVector) -> std::result::Result<f64, PredictionError> {
            Ok(10.0 * x.0[0] / x.0[3])
        }
    }

    fn service() -> PredictionService {
        PredictionService::new(Arc::new(ModelAdapter::from_regressor(
            "w/c",
            Box::new(WaterCement),
        )))
    }

    const REQUEST: &str = r#"{"cement":360,"slag":0,"fly_ash":0,"water":180,
        "superplasticizer":0,"coarse":1000,"fine":800,"age":28}"#;

    #[test]
    fn success_envelope() {
        let out: serde_json::Value = serde_json::from_str(&predict_json(&service(), REQUEST)).unwrap();
        assert_eq!(out["ok"], true);
        assert_eq!(out["result"]["strength_mpa"], 20.0);
        assert_eq!(out["result"]["category"], "MODERATE");
        assert_eq!(out["result"]["gauge"]["marker"]["position"], 20.0);
    }

    #[test]
    fn validation_error_envelope() {
        let request = REQUEST.replace("\"age\":28", "\"age\":400");
        let out: serde_json::Value = serde_json::from_str(&predict_json(&service(), &request)).unwrap();
        assert_eq!(out["ok"], false);
        assert_eq!(out["code"], ErrorCode::InvalidInput as u32);
        assert!(out["error"].as_str().unwrap().contains("age"));
    }

    #[test]
    fn malformed_request_is_invalid_input() {
        let out: serde_json::Value = serde_json::from_str(&predict_json(&service(), "[1,2]")).unwrap();
        assert_eq!(out["ok"], false);
        assert_eq!(out["code"], ErrorCode::InvalidInput as u32);
    }

    #[test]
    fn strings_round_trip_through_the_abi() {
        let raw = string_to_raw(error_json(ErrorCode::Prediction, "boom"));
        let text = unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned();
        cs_free_str(raw);
        assert!(text.contains("\"code\":3"));
        assert_eq!(cs_api_version(), 2);
    }

    #[test]
    fn null_input_is_rejected() {
        let raw = cs_predict(std::ptr::null());
        let text = unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned();
        cs_free_str(raw);
        assert!(text.contains("null input"));
    }

    #[test]
    fn repeated_json_key_is_rejected() {
        let request = REQUEST.replace("\"age\":28", "\"age\":0,\"age\":28");
        let out: serde_json::Value = serde_json::from_str(&predict_json(&service(), &request)).unwrap();
        assert_eq!(out["ok"], false);
        assert_eq!(out["code"], ErrorCode::InvalidInput as u32);
        assert!(out["error"].as_str().unwrap().contains("more than once"));
    }

    #[test]
    fn batch_envelope_keeps_order_and_isolates_failures() {
        let service = Arc::new(service());
        let pool = Pool::new(2);
        let bad = REQUEST.replace("\"age\":28", "\"age\":400");
        let request = format!("[{REQUEST},{bad},{REQUEST}]");

        let out: serde_json::Value =
            serde_json::from_str(&predict_batch_json(&service, &pool, &request)).unwrap();
        assert_eq!(out["ok"], true);
        let results = out["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["result"]["category"], "MODERATE");
        assert_eq!(results[1]["code"], ErrorCode::InvalidInput as u32);
        assert_eq!(results[2]["ok"], true);

        let out: serde_json::Value =
            serde_json::from_str(&predict_batch_json(&service, &pool, REQUEST)).unwrap();
        assert_eq!(out["code"], ErrorCode::InvalidInput as u32);
    }

    #[test]
    fn dataset_stats_from_configured_csv() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "Cement,Blast_Furnace_Slag,Fly_Ash,Water,Superplasticizer,Coarse_Aggregate,Fine_Aggregate,Age,Strength"
        )
        .expect("write header");
        writeln!(file, "540,0,0,162,2.5,1040,676,28,79.99").expect("write row");
        writeln!(file, "332.5,142.5,0,228,0,932,594,270,40.27").expect("write row");

        let out: serde_json::Value =
            serde_json::from_str(&dataset_stats_json(Some(file.path()), 0)).unwrap();
        assert_eq!(out["ok"], true);
        assert_eq!(out["stats"]["rows"], 2);
        assert_eq!(
            out["stats"]["strength"]["bins"].as_array().map(Vec::len),
            Some(DEFAULT_BINS)
        );
        assert_eq!(out["stats"]["scatter"][0]["points"][0][0], 540.0);
    }

    #[test]
    fn dataset_stats_report_config_and_dataset_errors() {
        let out: serde_json::Value = serde_json::from_str(&dataset_stats_json(None, 10)).unwrap();
        assert_eq!(out["code"], ErrorCode::Config as u32);

        let missing = Path::new("/no/such/Concrete_Data.csv");
        let out: serde_json::Value =
            serde_json::from_str(&dataset_stats_json(Some(missing), 10)).unwrap();
        assert_eq!(out["code"], ErrorCode::Dataset as u32);
    }

    #[test]
    fn init_with_unreadable_config_is_a_config_error() {
        let path = CString::new("/no/such/cstrength.json").unwrap();
        assert_eq!(cs_init(path.as_ptr()), ErrorCode::Config as u32);
    }
}
