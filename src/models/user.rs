use sqlx::FromRow;

// Пользователи заводятся внешним сервисом авторизации, тут только чтение
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_active: bool,
}

impl User {
    // Найти активного пользователя по email
    pub async fn find_active_by_email(
        email: &str,
        db: &crate::database::Database,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, is_staff, is_active
             FROM users
             WHERE email = $1 AND is_active = true"
        )
        .bind(email)
        .fetch_optional(&db.pool)
        .await
    }

    // Проверить пароль по bcrypt-хешу; битый хеш считается неверным паролем
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_hash(password_hash: String) -> User {
        User {
            id: 1,
            email: "user@example.com".into(),
            password_hash,
            is_staff: false,
            is_active: true,
        }
    }

    #[test]
    fn verifies_bcrypt_password() {
        let hash = bcrypt::hash("testpass", 4).unwrap();
        let user = user_with_hash(hash);
        assert!(user.verify_password("testpass"));
        assert!(!user.verify_password("wrong"));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let user = user_with_hash("not-a-bcrypt-hash".into());
        assert!(!user.verify_password("anything"));
    }
}
