use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Sample identifier '{}' is malformed{}. Expected at least {} characters with the forward index at positions 2-3 and the reverse index at positions 5-6 (e.g. S01-11)",
        sample_id,
        Error::format_msg_as_detail(msg),
        crate::jump::MIN_SAMPLE_ID_LEN
    )]
    MalformedIdentifier {
        sample_id: String,
        msg: Option<String>,
    },

    #[error(
        "Calibrator tag pair {} cannot be used{}. Pairs are given as FWD,REV with each tag a 2 character zero padded index (e.g. 01,11)",
        pair,
        Error::format_msg_as_detail(msg)
    )]
    InvalidCalibrationPair { pair: String, msg: Option<String> },

    #[error("Cannot compute {}: total read count is zero", context)]
    DivisionByZero { context: String },

    #[error(
        "Samples '{}' and '{}' share the same forward/reverse index combination ({}, {})",
        first,
        second,
        forward,
        reverse
    )]
    DuplicateCompositeKey {
        first: String,
        second: String,
        forward: String,
        reverse: String,
    },

    #[error("No samples to analyse")]
    EmptyTable,

    #[error("File at {:?} not found.", path)]
    FileNotFound { path: std::path::PathBuf },

    #[error("File at {:?} is invalid{}.", path, Error::format_msg_as_detail(msg))]
    FileNotValid {
        path: std::path::PathBuf,
        msg: Option<String>,
    },

    #[error("Failed parsing {}{}", context, Error::format_msg_as_detail(msg))]
    ParseError {
        context: String,
        msg: Option<String>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    #[cold]
    pub fn malformed_identifier<S: Into<String>, M: Into<String>>(
        sample_id: S,
        msg: Option<M>,
    ) -> Self {
        Error::MalformedIdentifier {
            sample_id: sample_id.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn invalid_calibration_pair<P: Into<String>, M: Into<String>>(
        pair: P,
        msg: Option<M>,
    ) -> Self {
        Error::InvalidCalibrationPair {
            pair: pair.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn division_by_zero<C: Into<String>>(context: C) -> Self {
        Error::DivisionByZero {
            context: context.into(),
        }
    }

    #[cold]
    pub fn file_not_found<P: AsRef<std::path::Path>>(path: P) -> Self {
        Error::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[cold]
    pub fn file_not_valid<P: AsRef<std::path::Path>, M: Into<String>>(
        path: P,
        msg: Option<M>,
    ) -> Self {
        Error::FileNotValid {
            path: path.as_ref().to_path_buf(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn parse_error<C: Into<String>, M: Into<String>>(context: C, msg: Option<M>) -> Self {
        Error::ParseError {
            context: context.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    pub fn format_msg_as_detail(msg: &Option<String>) -> String {
        match msg {
            Some(m) => format!(" ({})", m),
            None => String::new(),
        }
    }
}
