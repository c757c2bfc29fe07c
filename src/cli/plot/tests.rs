// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs::File, io::Write, path::Path};

use clap::Parser;
use indoc::indoc;
use tempfile::TempDir;

use super::*;

const INPUTS_JSON: &str = indoc! {r#"
    {
        "wave_low": [1.0, 2.0],
        "wave_hi": [2.0, 3.0],
        "time": [59000.25, 59000.5, 59000.75],
        "data": [[10.0, 12.0, 11.0], [1.0, null, 1.0]],
        "err": [[1.0, 1.0, 1.0], [0.1, 0.1, 0.1]],
        "drift1d": [0.1, 0.2, 0.3],
        "driftmask": [false, true, false]
    }
"#};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_cli_args_override_toml_arg_file() {
    let tmp = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = write_file(
        tmp.path(),
        "args.toml",
        indoc! {r#"
            inputs = "from_file.json"
            output_dir = "file_out"
            drift_range = 4
            hide_plots = true
        "#},
    );
    let arg_file = arg_file.display().to_string();
    #[rustfmt::skip]
    let args = PlotArgs::parse_from([
        "plot",
        &arg_file,
        "--output-dir", "cli_out",
        "--skip-cross-correlation",
    ]);
    let merged = args.merge().unwrap();

    assert!(merged.args_file.is_none());
    assert_eq!(merged.inputs, Some(PathBuf::from("from_file.json")));
    assert_eq!(merged.output_dir, Some(PathBuf::from("cli_out")));
    assert_eq!(merged.drift_range, Some(4));
    assert!(merged.hide_plots);
    assert!(merged.skip_cross_correlation);
    assert!(merged.dpi.is_none());
}

#[test]
fn test_json_arg_file() {
    let tmp = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = write_file(
        tmp.path(),
        "args.JSON",
        r#"{"inputs": "in.toml", "nspecchan": 3, "n_int": 100}"#,
    );
    let merged = PlotArgs::parse_from(["plot", &arg_file.display().to_string()])
        .merge()
        .unwrap();
    assert_eq!(merged.inputs, Some(PathBuf::from("in.toml")));
    assert_eq!(merged.nspecchan, Some(3));
    assert_eq!(merged.n_int, Some(100));
    assert!(!merged.hide_plots);
}

#[test]
fn test_unrecognised_arg_file_extension() {
    let tmp = TempDir::new().expect("couldn't make tmp dir");
    let arg_file = write_file(tmp.path(), "args.yaml", "inputs: in.json");
    let result = PlotArgs::parse_from(["plot", &arg_file.display().to_string()]).merge();
    assert!(matches!(result, Err(LcDiagnosticsError::ArgFile(_))));
}

#[test]
fn test_no_inputs() {
    let result = PlotArgs::parse_from(["plot"]).parse();
    assert!(matches!(result, Err(PlotArgsError::NoInputs)));
}

#[test]
fn test_parse_derives_counts_from_inputs() {
    let tmp = TempDir::new().expect("couldn't make tmp dir");
    let inputs = write_file(tmp.path(), "inputs.json", INPUTS_JSON);
    let inputs = inputs.display().to_string();

    let params = PlotArgs::parse_from(["plot", "-i", &inputs, "--nspecchan", "2"])
        .parse()
        .unwrap();
    assert_eq!(params.ctx.nspecchan(), 2);
    assert_eq!(params.ctx.n_int(), 3);
    assert_eq!(params.ctx.drift_range(), DEFAULT_DRIFT_RANGE);
    assert_eq!(params.ctx.output_dir(), Path::new("."));
    assert_eq!(params.dpi, DEFAULT_DPI);

    let result = PlotArgs::parse_from(["plot", "-i", &inputs, "--n-int", "4"]).parse();
    assert!(matches!(
        result,
        Err(PlotArgsError::CountMismatch {
            what: "n_int",
            expected: 4,
            found: 3
        })
    ));

    let result = PlotArgs::parse_from(["plot", "-i", &inputs, "--dpi", "0"]).parse();
    assert!(matches!(result, Err(PlotArgsError::ZeroDpi)));
}

#[test]
fn test_dry_run_writes_nothing() {
    let tmp = TempDir::new().expect("couldn't make tmp dir");
    let inputs = write_file(tmp.path(), "inputs.json", INPUTS_JSON);
    let out = tmp.path().join("out");
    let inputs = inputs.display().to_string();
    let out_str = out.display().to_string();

    let args = PlotArgs::parse_from(["plot", "-i", &inputs, "-o", &out_str]);
    assert!(args.run(true).is_ok());
    assert!(!out.exists());
}

#[test]
fn test_run_fails_only_if_everything_failed() {
    let tmp = TempDir::new().expect("couldn't make tmp dir");
    // wave_hi doesn't match wave_low, and there's nothing else to plot.
    let inputs = write_file(
        tmp.path(),
        "inputs.json",
        indoc! {r#"
            {
                "wave_low": [1.0, 2.0],
                "wave_hi": [2.0],
                "time": [0.0, 1.0],
                "data": [[1.0, 1.0], [1.0, 1.0]],
                "err": [[0.1, 0.1], [0.1, 0.1]]
            }
        "#},
    );
    let inputs = inputs.display().to_string();
    let result = PlotArgs::parse_from(["plot", "-i", &inputs]).run(true);
    assert!(matches!(result, Err(LcDiagnosticsError::Plot(_))));

    let mut report = DiagnosticsReport::default();
    assert!(check_report(&report).is_ok());
    report.written.push(PathBuf::from("figs/Fig410-Drift.png"));
    report.failures.push(crate::diagnostics::DiagnosticFailure {
        category: crate::artifact::Category::LightCurve1D,
        index: 0,
        error: crate::inputs::InputError::NoValidWavelengths.into(),
    });
    assert!(check_report(&report).is_ok());
}
