/// Names under which the client persists values in a [`crate::SecureStorage`].
pub struct StorageKeys;

impl StorageKeys {
    pub const SESSION_TOKEN: &'static str = "session_token";
}
