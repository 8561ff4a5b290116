use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no dance pad with serial number \"{serial}\" was found")]
    DeviceNotFound { serial: String },

    #[error("device reports product \"{found}\", expected \"{expected}\"")]
    ProductMismatch {
        found: String,
        expected: &'static str,
    },

    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("short write to the pad: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("input report has {len} bytes, expected {expected}")]
    MalformedReport { len: usize, expected: usize },

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("failed to load LED source from '{}'", .path.display())]
    LedSource {
        path: PathBuf,
        #[source]
        source: LedSourceError,
    },

    #[error("virtual keyboard error")]
    Keyboard(#[source] std::io::Error),

    #[error("failed to spawn the control loop thread")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("control loop thread has stopped")]
    WorkerGone,

    #[error("control loop thread panicked")]
    WorkerPanicked,
}

#[derive(Debug, thiserror::Error)]
pub enum LedSourceError {
    #[error("reading file")]
    Io(#[from] std::io::Error),

    #[error("parsing file")]
    Parse(#[from] serde_yaml::Error),

    #[error("file has {found} segments, expected {expected}")]
    SegmentCount { found: usize, expected: usize },

    #[error("rotation of {0} degrees is not a multiple of 90")]
    Rotation(u16),
}
