//! Single administrator credential check.

use validator::Validate;

use crate::forms::auth::LoginForm;
use crate::models::config::ServerConfig;
use crate::services::{ServiceError, ServiceResult};

/// Returns the normalized admin e-mail when the credentials match.
pub fn check_credentials(config: &ServerConfig, form: &LoginForm) -> ServiceResult<String> {
    form.validate()
        .map_err(|_| ServiceError::Form("Invalid credentials".to_string()))?;

    let email = form.email.trim().to_lowercase();
    if email == config.admin_email.trim().to_lowercase() && form.password == config.admin_password
    {
        Ok(email)
    } else {
        log::warn!("Rejected sign-in attempt for {email}");
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::tests::sample_config;

    fn form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_is_case_insensitive() {
        let config = sample_config();
        assert_eq!(
            check_credentials(&config, &form(" Admin@Example.com ", "changeme")).unwrap(),
            "admin@example.com"
        );
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let config = sample_config();
        assert!(matches!(
            check_credentials(&config, &form("admin@example.com", "nope")),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn empty_form_is_rejected() {
        let config = sample_config();
        assert!(matches!(
            check_credentials(&config, &form("", "")),
            Err(ServiceError::Form(_))
        ));
    }
}
