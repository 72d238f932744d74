use nicu_uuid::PatientId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("failed to read store file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to replace store file: {0}")]
    FilePersist(#[from] tempfile::PersistError),
    #[error("failed to serialize store data: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize store data: {0}")]
    Deserialization(serde_json::Error),
    #[error("invalid import data at {path}: {source}")]
    Import {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("patient {0} not found")]
    PatientNotFound(PatientId),
    #[error("patient {0} is already archived")]
    AlreadyArchived(PatientId),
    #[error("patient {0} is archived; rounds can no longer be added")]
    PatientArchived(PatientId),
    #[error("write lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
