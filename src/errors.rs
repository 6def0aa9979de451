use thiserror::Error;

/// Crate-wide error type.
///
/// The decode and encode variants keep the historical message texts that
/// downstream submission tooling greps for, so the wording is part of the
/// contract even where it is terse.
#[derive(Error, Debug)]
pub enum Mpc2AdesError {
    #[error("Invalid MPC80COL line ({reason}) in line:\n{line}")]
    InvalidRecordLine { reason: String, line: String },

    #[error("Invalid Sexagesimal string (sexagesimal date must be \"HH MM SS.ss\" not ) in string \n{0}")]
    InvalidSexagesimal(String),

    #[error("Invalid date ({reason}) in date:\n{date}")]
    InvalidDate { reason: String, date: String },

    #[error("Can't unpack because minor planet number for {0} is zero")]
    UnpackMinorPlanetZero(String),

    #[error("Can't unpack because comet number for {0} is zero")]
    UnpackCometZero(String),

    #[error("Can't unpack because comet type for {0} must be P or D")]
    UnpackCometType(String),

    #[error("Can't unpack because satellite number for {0} is zero")]
    UnpackSatelliteZero(String),

    #[error("Can't unpack because satellite order for {0} is zero")]
    UnpackSatelliteOrderZero(String),

    #[error("Can't unpack {0:?} because this does not match a valid packed ID")]
    UnpackNoMatch(String),

    #[error("Can't pack permID {0} because it is not in range 1-619999")]
    PackMinorPlanetRange(String),

    #[error("Can't pack because comet number for {0} is too large")]
    PackCometNumberTooLarge(String),

    #[error("Can't pack because comet number for {0} is zero")]
    PackCometNumberZero(String),

    #[error("Can't pack because satellite number for {0} is too large")]
    PackSatelliteNumberTooLarge(String),

    #[error("Can't pack because satellite number for {0} is zero")]
    PackSatelliteNumberZero(String),

    #[error("Can't pack satellites of asteroids: {0}")]
    PackAsteroidSatellite(String),

    #[error("invalid permID {0}")]
    InvalidPermId(String),

    #[error("Can't pack because minor planet year for {0} is invalid")]
    PackMinorPlanetYear(String),

    #[error("Can't pack because year for {0} is not encodable")]
    PackYearUnencodable(String),

    #[error("Can't pack because number for {0} is too big")]
    PackOrderTooBig(String),

    #[error("Can't pack because number for {0} is zero")]
    PackOrderZero(String),

    #[error("invalid provID {0}")]
    InvalidProvId(String),

    #[error("invalid trkSub {0}")]
    InvalidTrkSub(String),

    #[error("Can't pack {0} because provID and permID types don't match")]
    PackTypeMismatch(String),

    #[error("Can't pack {0} because provID and permID fragments don't match")]
    PackFragmentMismatch(String),

    #[error("Can't pack {0} because it has both provID and trksub")]
    PackProvAndTrkSub(String),

    #[error("Can't pack {0}")]
    PackEmpty(String),

    #[error("invalid program code {0}")]
    InvalidProgramCode(String),

    #[error("Can't parse telescope description: {0}")]
    InvalidTelescopeLine(String),

    #[error("No valid data in file {0}")]
    EmptyReport(String),

    #[error("no log measurement for {total_id} at {obs_time}")]
    LogMeasurementNotFound { total_id: String, obs_time: String },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid site configuration: {0}")]
    ConfigError(#[from] toml::de::Error),
}

impl PartialEq for Mpc2AdesError {
    fn eq(&self, other: &Self) -> bool {
        use Mpc2AdesError::*;
        match (self, other) {
            (
                InvalidRecordLine { reason: a, line: b },
                InvalidRecordLine { reason: c, line: d },
            ) => a == c && b == d,
            (InvalidSexagesimal(a), InvalidSexagesimal(b)) => a == b,
            (InvalidDate { reason: a, date: b }, InvalidDate { reason: c, date: d }) => {
                a == c && b == d
            }
            (UnpackMinorPlanetZero(a), UnpackMinorPlanetZero(b)) => a == b,
            (UnpackCometZero(a), UnpackCometZero(b)) => a == b,
            (UnpackCometType(a), UnpackCometType(b)) => a == b,
            (UnpackSatelliteZero(a), UnpackSatelliteZero(b)) => a == b,
            (UnpackSatelliteOrderZero(a), UnpackSatelliteOrderZero(b)) => a == b,
            (UnpackNoMatch(a), UnpackNoMatch(b)) => a == b,
            (PackMinorPlanetRange(a), PackMinorPlanetRange(b)) => a == b,
            (PackCometNumberTooLarge(a), PackCometNumberTooLarge(b)) => a == b,
            (PackCometNumberZero(a), PackCometNumberZero(b)) => a == b,
            (PackSatelliteNumberTooLarge(a), PackSatelliteNumberTooLarge(b)) => a == b,
            (PackSatelliteNumberZero(a), PackSatelliteNumberZero(b)) => a == b,
            (PackAsteroidSatellite(a), PackAsteroidSatellite(b)) => a == b,
            (InvalidPermId(a), InvalidPermId(b)) => a == b,
            (PackMinorPlanetYear(a), PackMinorPlanetYear(b)) => a == b,
            (PackYearUnencodable(a), PackYearUnencodable(b)) => a == b,
            (PackOrderTooBig(a), PackOrderTooBig(b)) => a == b,
            (PackOrderZero(a), PackOrderZero(b)) => a == b,
            (InvalidProvId(a), InvalidProvId(b)) => a == b,
            (InvalidTrkSub(a), InvalidTrkSub(b)) => a == b,
            (PackTypeMismatch(a), PackTypeMismatch(b)) => a == b,
            (PackFragmentMismatch(a), PackFragmentMismatch(b)) => a == b,
            (PackProvAndTrkSub(a), PackProvAndTrkSub(b)) => a == b,
            (PackEmpty(a), PackEmpty(b)) => a == b,
            (InvalidProgramCode(a), InvalidProgramCode(b)) => a == b,
            (InvalidTelescopeLine(a), InvalidTelescopeLine(b)) => a == b,
            (EmptyReport(a), EmptyReport(b)) => a == b,
            (
                LogMeasurementNotFound { total_id: a, obs_time: b },
                LogMeasurementNotFound { total_id: c, obs_time: d },
            ) => a == c && b == d,

            // Not comparable: equal if same variant
            (IoError(_), IoError(_)) => true,
            (ConfigError(_), ConfigError(_)) => true,

            _ => false,
        }
    }
}
