//! Permission providers for hosts without an interactive prompt.

use crate::collaborators::{BoxFuture, PermissionProvider};

/// Answers every permission request the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedPermission {
    granted: bool,
}

impl FixedPermission {
    pub fn grant() -> Self {
        Self { granted: true }
    }

    pub fn deny() -> Self {
        Self { granted: false }
    }
}

impl PermissionProvider for FixedPermission {
    fn request_location_permission(&self) -> BoxFuture<'_, bool> {
        let granted = self.granted;
        Box::pin(async move { granted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_permission() {
        assert!(FixedPermission::grant().request_location_permission().await);
        assert!(!FixedPermission::deny().request_location_permission().await);
    }
}
