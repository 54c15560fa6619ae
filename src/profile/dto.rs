use serde::{Deserialize, Serialize};

use crate::auth::{dto::PublicUser, repo_types::User};

/// Partial profile update; absent fields keep their stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub fullname: Option<String>,
    pub birthdate: Option<String>,
    pub location: Option<String>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.fullname.is_none()
            && self.birthdate.is_none()
            && self.location.is_none()
            && self.gender.is_none()
            && self.height.is_none()
            && self.weight.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: PublicUser,
}

impl ProfileResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            success: true,
            user: PublicUser::from(user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_detected() {
        let req: UpdateProfileRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());

        let req: UpdateProfileRequest = serde_json::from_str(r#"{"height":175.5}"#).unwrap();
        assert!(!req.is_empty());
    }
}
