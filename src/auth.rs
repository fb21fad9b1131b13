//! Shared-secret gate for the presigned upload path.

/// Outcome of [`UploadGate::authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Allow,
    Deny,
}

/// Checks a client-provided key against the optional configured secret.
///
/// With no secret configured the deployment is open and every request is
/// allowed.
#[derive(Debug, Clone, Default)]
pub struct UploadGate {
    secret: Option<String>,
}

impl UploadGate {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    pub fn open() -> Self {
        Self { secret: None }
    }

    pub fn is_enforced(&self) -> bool {
        self.secret.is_some()
    }

    pub fn authorize(&self, provided: Option<&str>) -> Authorization {
        match (&self.secret, provided) {
            (None, _) => Authorization::Allow,
            (Some(secret), Some(provided)) if provided == secret.as_str() => Authorization::Allow,
            _ => Authorization::Deny,
        }
    }
}
