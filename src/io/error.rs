use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported contract file extension: {path}; pass --from json|yaml")]
    UnsupportedPathExtension { path: String },

    #[error("json parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("yaml parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
