use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use mpc2ades::errors::Mpc2AdesError;
use mpc2ades::obs_context::SiteConfig;
use mpc2ades::psv::{convert_mpcreport_to_psv, find_astrometrica_log, read_mpcreport_file};

const EXPECTED_PLAIN: &str = "\
# version=2022
# observatory
! mpcCode W85
# submitter
! name T. Lister
# observers
! name T. Lister
# measurers
! name T. Lister
# telescope
! aperture 1.0
! design Ritchey-Chretien
! detector CCD
! fRatio 8.0
# comment
! line Converted to PSV with mpc2ades V0.1.0
 permID|provID     |  trkSub|mode|stn |prog|obsTime                |         ra|        dec|  astCat|  mag|  band| photCat|notes|remarks
       |2017 BT121 |        | CCD|W85 |    |2018-02-16T04:45:22.06Z|  171.72571|   -4.41242|   Gaia2|20.2 |     G|   Gaia2|K    |
";

const EXPECTED_RMS: &str = "\
# version=2022
# observatory
! mpcCode W85
# submitter
! name T. Lister
# observers
! name T. Lister
# measurers
! name T. Lister
# telescope
! aperture 1.0
! design Ritchey-Chretien
! detector CCD
! fRatio 8.0
# software
! astrometry Astrometrica 4.10.0.431
! photometry Astrometrica 4.10.0.431
! objectDetection Astrometrica 4.10.0.431
# comment
! line Converted to PSV with mpc2ades V0.1.0
 permID|provID     |  trkSub|mode|stn |prog|obsTime                |         ra|        dec|rmsRA|rmsDec|  astCat|  mag|rmsMag|band| photCat|photAp|logSNR|seeing|notes|remarks
       |2017 BT121 |        | CCD|W85 |    |2018-02-16T04:45:22.06Z|  171.72571|   -4.41242| 0.16|  0.10|   Gaia2|20.2 |  0.02|   G|   Gaia2|  1.56|1.2765|1.1000|K    |
";

fn out_path(dir: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join("out.psv")).unwrap()
}

#[test]
fn report_files_split_into_header_and_body() {
    let report = Utf8Path::new("tests/data/MPCReport.txt");
    let (header, body) = read_mpcreport_file(report).unwrap();

    assert_eq!(header.len(), 8);
    assert_eq!(header[0], "COD W85");
    assert_eq!(header[7], "NET Gaia DR2");
    assert_eq!(body.len(), 2);
    assert!(body[0].starts_with("     K17BC1T"));
    assert!(body[1].starts_with("     P10GvKl"));
    assert!(!body.iter().any(|line| line.contains("----- end -----")));
}

#[test]
fn logs_are_found_next_to_the_report() {
    let report = Utf8Path::new("tests/data/MPCReport.txt");
    assert_eq!(
        find_astrometrica_log(report),
        Some(Utf8PathBuf::from("tests/data/Astrometrica.log"))
    );

    let dir = tempfile::TempDir::new().unwrap();
    let lonely = out_path(&dir);
    assert_eq!(find_astrometrica_log(&lonely), None);
}

#[test]
fn plain_conversion_writes_the_basic_layout() {
    let dir = tempfile::TempDir::new().unwrap();
    let out_file = out_path(&dir);
    let config = SiteConfig::builtin().unwrap();

    let num_objects = convert_mpcreport_to_psv(
        Utf8Path::new("tests/data/MPCReport.txt"),
        &out_file,
        false,
        None,
        &config,
    )
    .unwrap();

    assert_eq!(num_objects, 1);
    assert_eq!(fs::read_to_string(&out_file).unwrap(), EXPECTED_PLAIN);
}

#[test]
fn rms_conversion_joins_the_log_uncertainties() {
    let dir = tempfile::TempDir::new().unwrap();
    let out_file = out_path(&dir);
    let config = SiteConfig::builtin().unwrap();

    let num_objects = convert_mpcreport_to_psv(
        Utf8Path::new("tests/data/MPCReport.txt"),
        &out_file,
        true,
        Some(Utf8Path::new("tests/data/Astrometrica.log")),
        &config,
    )
    .unwrap();

    assert_eq!(num_objects, 1);
    assert_eq!(fs::read_to_string(&out_file).unwrap(), EXPECTED_RMS);
}

#[test]
fn a_log_without_measurements_falls_back_to_plain() {
    let dir = tempfile::TempDir::new().unwrap();
    let out_file = out_path(&dir);
    let config = SiteConfig::builtin().unwrap();

    let num_objects = convert_mpcreport_to_psv(
        Utf8Path::new("tests/data/MPCReport.txt"),
        &out_file,
        true,
        Some(Utf8Path::new("tests/data/Astrometrica_noasts.log")),
        &config,
    )
    .unwrap();

    assert_eq!(num_objects, 1);
    assert_eq!(fs::read_to_string(&out_file).unwrap(), EXPECTED_PLAIN);
}

#[test]
fn missing_report_files_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let out_file = out_path(&dir);
    let config = SiteConfig::builtin().unwrap();

    let result = convert_mpcreport_to_psv(
        Utf8Path::new("tests/data/NoSuchReport.txt"),
        &out_file,
        false,
        None,
        &config,
    );

    assert!(matches!(result, Err(Mpc2AdesError::IoError(_))));
}

#[test]
fn reports_without_data_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let report = Utf8PathBuf::from_path_buf(dir.path().join("MPCReport.txt")).unwrap();
    fs::write(&report, "COD W85\n----- end -----\n").unwrap();
    let out_file = out_path(&dir);
    let config = SiteConfig::builtin().unwrap();

    let result = convert_mpcreport_to_psv(&report, &out_file, false, None, &config);

    assert_eq!(
        result,
        Err(Mpc2AdesError::EmptyReport(report.to_string()))
    );
}
