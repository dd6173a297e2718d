//! Error types for storage operations

use thiserror::Error;

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("Item not found: {id}")]
	NotFound { id: String },
	#[error("Live record already exists for user {user_id} with fingerprint {fingerprint}")]
	Conflict { user_id: String, fingerprint: String },
	#[error("Connection error: {message}")]
	Connection { message: String },
	#[error("Storage operation failed: {message}")]
	Operation { message: String },
}
