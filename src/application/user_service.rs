use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{Credentials, UserRepository};
use crate::domain::records::{AuthClaims, NewUser, SignUp, User};

const BAD_LOGIN: &str = "login or password is incorrect";

/// Accounts, sign-in and token checks. Hashing and token signing go through
/// the injected [`Credentials`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserRepository>,
    credentials: Arc<dyn Credentials>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserRepository>, credentials: Arc<dyn Credentials>) -> Self {
        Self { store, credentials }
    }

    pub fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.store.list_users()
    }

    pub fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.store.find_user(id)?.ok_or(DomainError::NotFound("User"))
    }

    /// Create an account and hand back its first pair of tokens.
    pub fn sign_up(&self, form: SignUp) -> Result<User, DomainError> {
        validate_sign_up(&form)?;
        if self.store.user_exists(&form.email, &form.phone)? {
            return Err(DomainError::Conflict(
                "This email or phone number already exists".to_string(),
            ));
        }

        let password_hash = self.credentials.hash_password(&form.password)?;
        let user = self.store.insert_user(NewUser {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone: form.phone,
            avatar: form.avatar,
            password_hash,
        })?;
        log::info!("user {} signed up", user.id);
        self.refresh_tokens(&user)
    }

    /// Check the password and rotate the account's tokens. Unknown email and
    /// wrong password fail the same way.
    pub fn login(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .store
            .find_user_by_email(email)?
            .ok_or_else(|| DomainError::Unauthorized(BAD_LOGIN.to_string()))?;
        if !self.credentials.verify_password(password, &user.password_hash)? {
            log::warn!("failed login for user {}", user.id);
            return Err(DomainError::Unauthorized(BAD_LOGIN.to_string()));
        }
        self.refresh_tokens(&user)
    }

    pub fn authenticate(&self, token: &str) -> Result<AuthClaims, DomainError> {
        self.credentials.verify_token(token)
    }

    fn refresh_tokens(&self, user: &User) -> Result<User, DomainError> {
        let tokens = self.credentials.issue_tokens(user)?;
        self.store
            .store_tokens(user.id, &tokens)?
            .ok_or(DomainError::NotFound("User"))
    }
}

fn validate_sign_up(form: &SignUp) -> Result<(), DomainError> {
    for (field, value) in [("first_name", &form.first_name), ("last_name", &form.last_name)] {
        let len = value.trim().chars().count();
        if !(2..=100).contains(&len) {
            return Err(DomainError::InvalidInput(format!(
                "{field} must be between 2 and 100 characters"
            )));
        }
    }
    if !form.email.contains('@') {
        return Err(DomainError::InvalidInput("email is invalid".to_string()));
    }
    if form.phone.trim().is_empty() {
        return Err(DomainError::InvalidInput("phone is required".to_string()));
    }
    if form.password.chars().count() < 6 {
        return Err(DomainError::InvalidInput(
            "password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{MemoryStore, PlainCredentials};

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::default()), Arc::new(PlainCredentials))
    }

    fn form(email: &str, phone: &str) -> SignUp {
        SignUp {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            avatar: None,
            password: "cobol-rules".to_string(),
        }
    }

    #[test]
    fn sign_up_hashes_the_password_and_issues_tokens() {
        let svc = service();
        let user = svc.sign_up(form("grace@example.com", "555-0101")).expect("sign up");

        assert_ne!(user.password_hash, "cobol-rules");
        let token = user.token.expect("token issued");
        assert!(user.refresh_token.is_some());
        assert_eq!(svc.authenticate(&token).expect("valid").user_id, user.id);
    }

    #[test]
    fn duplicate_email_or_phone_is_a_conflict() {
        let svc = service();
        svc.sign_up(form("grace@example.com", "555-0101")).expect("sign up");

        assert!(matches!(
            svc.sign_up(form("grace@example.com", "555-0199")),
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            svc.sign_up(form("other@example.com", "555-0101")),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn sign_up_validates_fields() {
        let svc = service();
        let mut short = form("grace@example.com", "555-0101");
        short.password = "abc".to_string();
        assert!(matches!(svc.sign_up(short), Err(DomainError::InvalidInput(_))));

        let mut nameless = form("grace@example.com", "555-0101");
        nameless.first_name = "G".to_string();
        assert!(matches!(svc.sign_up(nameless), Err(DomainError::InvalidInput(_))));

        assert!(matches!(
            svc.sign_up(form("not-an-email", "555-0101")),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(svc.list_users().expect("list").is_empty());
    }

    #[test]
    fn login_checks_the_password() {
        let svc = service();
        let created = svc.sign_up(form("grace@example.com", "555-0101")).expect("sign up");

        let logged_in = svc.login("grace@example.com", "cobol-rules").expect("login");
        assert_eq!(logged_in.id, created.id);
        assert!(logged_in.token.is_some());

        let wrong = svc.login("grace@example.com", "fortran").expect_err("wrong password");
        let unknown = svc.login("nobody@example.com", "cobol-rules").expect_err("no user");
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, DomainError::Unauthorized(_)));
    }

    #[test]
    fn missing_user_is_not_found() {
        assert!(matches!(
            service().get_user(Uuid::new_v4()),
            Err(DomainError::NotFound("User"))
        ));
    }
}
