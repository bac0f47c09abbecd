use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("couldn't read notes from {path:?}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("line {line_number} has {fields} tab-separated fields, expected 4: {line:?}")]
    Parse {
        line_number: usize,
        fields: usize,
        line: String,
    },

    #[error("line {line_number} isn't valid UTF-8")]
    Encoding { line_number: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
