//! Mock authentication against a fixed account directory.
//!
//! Demo accounts only. Passwords are compared in plain text; there is no
//! hashing, lockout, or rate limiting.

use std::fmt;

use tracing::{debug, info};

use kmportal_shared::{PortalError, Result, User};

/// A demo account: the user record plus its password.
#[derive(Clone)]
pub struct Account {
    pub user: User,
    password: String,
}

impl Account {
    pub fn new(user: User, password: impl Into<String>) -> Self {
        Self {
            user,
            password: password.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The set of accounts that may sign in.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
}

impl AccountDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.accounts.iter().map(|a| &a.user)
    }

    /// Sign in with a case-insensitive email and an exact password.
    ///
    /// The returned user carries no password.
    pub fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim();
        let found = self
            .accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email) && a.password == password);

        match found {
            Some(account) => {
                info!(user = %account.user.id, role = %account.user.role, "signed in");
                Ok(account.user.clone())
            }
            None => {
                debug!(email, "sign-in refused");
                Err(PortalError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use kmportal_shared::Role;

    #[test]
    fn login_is_case_insensitive_on_email() {
        let dir = seed::accounts();
        let user = dir.login("  SME2@km.local ", "Sme123!").expect("login");
        assert_eq!(user.name, "Dr. Linda Martinez");
        assert_eq!(user.role, Role::Sme);
        assert_eq!(user.department.as_deref(), Some("Safety"));
    }

    #[test]
    fn debug_output_hides_the_password() {
        let user = seed::accounts().users().next().expect("seeded").clone();
        let account = Account::new(user, "Hunter2!");
        let shown = format!("{account:?}");
        assert!(!shown.contains("Hunter2!"));
        assert!(shown.contains("<redacted>"));

        let dir = format!("{:?}", seed::accounts());
        assert!(!dir.contains("Admin123!"));
    }

    #[test]
    fn wrong_password_is_refused() {
        let dir = seed::accounts();
        let err = dir.login("admin1@km.local", "admin123!").unwrap_err();
        assert!(matches!(err, PortalError::InvalidCredentials));
        assert!(dir.login("ghost@km.local", "Admin123!").is_err());
    }

    #[test]
    fn three_accounts_per_role() {
        let dir = seed::accounts();
        for role in [Role::Admin, Role::Sme, Role::User] {
            assert_eq!(dir.users().filter(|u| u.role == role).count(), 3);
        }
    }

    #[test]
    fn signed_in_user_serializes_without_password() {
        let dir = seed::accounts();
        let user = dir.login("user1@km.local", "User123!").expect("login");
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(!json.contains("User123!"));
        assert!(!json.contains("password"));
    }
}
