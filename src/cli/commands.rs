use crate::auth::password;
use crate::db::{self, models::NewUser, DbPool};
use crate::error::{Error, Result};

/// Create (or promote) a superuser account from the command line
pub async fn create_superuser(
    pool: &DbPool,
    email: &str,
    raw_password: &str,
    full_name: Option<String>,
) -> Result<()> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(Error::Validation("Invalid email address".to_string()));
    }
    if raw_password.len() < 8 {
        return Err(Error::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if let Some(existing) = db::users::get_user_by_email(pool, &email).await? {
        return Err(Error::Validation(format!(
            "A user with email {} already exists (id {})",
            existing.email, existing.id
        )));
    }

    let hashed_password = password::hash_password(raw_password)?;

    let user = db::users::create_user(
        pool,
        &NewUser {
            email,
            hashed_password,
            full_name,
            is_superuser: true,
            is_verified: true,
            google_id: None,
        },
    )
    .await?;

    println!("\u{2713} Superuser created: {} ({})", user.email, user.id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_superuser() {
        let pool = test_pool().await;

        create_superuser(&pool, "admin@example.com", "supersecret", None)
            .await
            .unwrap();

        let user = db::users::get_user_by_email(&pool, "admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_superuser);
        assert!(user.is_verified);

        // second attempt with the same email fails
        let err = create_superuser(&pool, "admin@example.com", "supersecret", None).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_create_superuser_validates_input() {
        let pool = test_pool().await;

        assert!(create_superuser(&pool, "not-an-email", "supersecret", None)
            .await
            .is_err());
        assert!(create_superuser(&pool, "a@example.com", "short", None)
            .await
            .is_err());
    }
}
