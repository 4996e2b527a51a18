use crate::model::UserRole;

#[derive(Debug, thiserror::Error)]
pub enum HospitalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("missing mandatory field: {0}")]
    MissingField(&'static str),
    #[error("malformed patient id: {0}")]
    MalformedPatientId(#[from] fih_ids::IdError),
    #[error("patient id already in use: {0}")]
    PatientIdTaken(String),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("access denied for role {0}")]
    AccessDenied(UserRole),

    #[error("failed to read snapshot slot: {0}")]
    SlotRead(std::io::Error),
    #[error("failed to write snapshot slot: {0}")]
    SlotWrite(std::io::Error),
    #[error("failed to serialize snapshot: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize snapshot: {0}")]
    Deserialization(serde_json::Error),
    #[error("record store task is no longer running")]
    StoreClosed,
}

impl HospitalError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        HospitalError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for failures raised while persisting, as opposed to rejected input.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            HospitalError::SlotRead(_)
                | HospitalError::SlotWrite(_)
                | HospitalError::Serialization(_)
                | HospitalError::Deserialization(_)
                | HospitalError::StoreClosed
        )
    }
}

pub type HospitalResult<T> = std::result::Result<T, HospitalError>;
