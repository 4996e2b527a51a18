//! Desk sign-in with static per-role passphrases.
//!
//! This is a demonstration gate, not authentication in any security sense.

use crate::model::UserRole;
use crate::{HospitalError, HospitalResult};

impl UserRole {
    pub fn passphrase(self) -> &'static str {
        match self {
            UserRole::Admin => "12345",
            UserRole::LabTech => "123456",
            UserRole::Cashier => "1234567",
            UserRole::Doctor => "1234567",
            UserRole::Matron => "12345",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            UserRole::Cashier => "Cashier",
            UserRole::Doctor => "Doctor",
            UserRole::LabTech => "Lab Technician",
            UserRole::Matron => "Matron",
            UserRole::Admin => "Administrator",
        }
    }
}

/// Signs a desk in as `role` when `passphrase` matches.
pub fn authenticate(role: UserRole, passphrase: &str) -> HospitalResult<UserRole> {
    if passphrase == role.passphrase() {
        tracing::info!("{} signed in", role.display_name());
        return Ok(role);
    }
    tracing::warn!("rejected sign-in attempt for {}", role);
    Err(HospitalError::AccessDenied(role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_role_accepts_its_passphrase() {
        for (role, pass) in [
            (UserRole::Admin, "12345"),
            (UserRole::LabTech, "123456"),
            (UserRole::Cashier, "1234567"),
            (UserRole::Doctor, "1234567"),
            (UserRole::Matron, "12345"),
        ] {
            assert_eq!(authenticate(role, pass).expect("valid passphrase"), role);
        }
    }

    #[test]
    fn test_wrong_passphrase_is_denied() {
        assert!(matches!(
            authenticate(UserRole::LabTech, "12345"),
            Err(HospitalError::AccessDenied(UserRole::LabTech))
        ));
        assert!(authenticate(UserRole::Admin, "").is_err());
    }
}
