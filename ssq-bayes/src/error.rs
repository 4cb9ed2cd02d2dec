use ssq_db::models::RecordDefect;

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Paramètre invalide : {0}")]
    Configuration(String),

    #[error("Tirage {sequence_index} invalide : {defect}")]
    Data {
        sequence_index: i64,
        #[source]
        defect: RecordDefect,
    },

    #[error("Candidat #{index} invalide : {defect}")]
    Candidate {
        index: usize,
        #[source]
        defect: RecordDefect,
    },
}

impl PredictError {
    pub fn config(message: impl Into<String>) -> Self {
        PredictError::Configuration(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, PredictError::Configuration(_))
    }

    pub fn is_data(&self) -> bool {
        matches!(self, PredictError::Data { .. })
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
