//! Password 值对象
//!
//! 密码策略：8-128 个字符，至少包含小写、大写、数字、特殊字符中的三类，且不在常见密码列表中

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use ryze_errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 128;
const MIN_COMPLEXITY_TYPES: usize = 3;

/// 常见弱密码列表
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "passw0rd",
    "123456",
    "12345678",
    "123456789",
    "qwerty",
    "qwerty123",
    "abc123",
    "letmein",
    "trustno1",
    "iloveyou",
    "welcome",
    "welcome1",
    "admin",
    "admin123",
    "changeme",
    "sunshine",
    "football",
];

/// 哈希后的密码
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// 校验明文密码策略后使用 Argon2 哈希
    pub fn from_plain(plain_password: &str) -> Result<Self, PasswordError> {
        Password::validate(plain_password)?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(plain_password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
            .to_string();

        Ok(Self(password_hash))
    }

    /// 验证明文密码是否匹配
    pub fn verify(&self, plain_password: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(&self.0).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(plain_password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// 从已有的哈希字符串创建
    pub fn from_hash(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([REDACTED])")
    }
}

impl fmt::Display for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// 明文密码校验
pub struct Password;

impl Password {
    pub fn validate(password: &str) -> Result<(), PasswordError> {
        let length = password.chars().count();
        if length < MIN_LENGTH {
            return Err(PasswordError::TooShort(MIN_LENGTH));
        }

        if length > MAX_LENGTH {
            return Err(PasswordError::TooLong(MAX_LENGTH));
        }

        if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
            return Err(PasswordError::TooCommon);
        }

        let classes = Self::complexity_types(password);
        if classes < MIN_COMPLEXITY_TYPES {
            return Err(PasswordError::InsufficientComplexity {
                required: MIN_COMPLEXITY_TYPES,
                actual: classes,
            });
        }

        Ok(())
    }

    /// 统计出现的字符类别数量
    fn complexity_types(password: &str) -> usize {
        let has_lower = password.chars().any(|c| c.is_lowercase());
        let has_upper = password.chars().any(|c| c.is_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

        [has_lower, has_upper, has_digit, has_symbol]
            .iter()
            .filter(|present| **present)
            .count()
    }
}

/// 密码错误
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password is too short (minimum {0} characters)")]
    TooShort(usize),

    #[error("Password is too long (maximum {0} characters)")]
    TooLong(usize),

    #[error("Password is too common")]
    TooCommon,

    #[error(
        "Password must contain at least {required} of: lowercase, uppercase, digits, symbols (found {actual})"
    )]
    InsufficientComplexity { required: usize, actual: usize },

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is invalid: {0}")]
    InvalidHash(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::HashingFailed(_) | PasswordError::InvalidHash(_) => {
                AppError::internal(err.to_string())
            }
            _ => AppError::validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = HashedPassword::from_plain("Str0ng!Pass").unwrap();
        assert!(hashed.verify("Str0ng!Pass").unwrap());
        assert!(!hashed.verify("wrong-password").unwrap());
    }

    #[test]
    fn test_salted_hashes_differ() {
        let a = HashedPassword::from_plain("Str0ng!Pass").unwrap();
        let b = HashedPassword::from_plain("Str0ng!Pass").unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_policy_rejections() {
        assert!(matches!(Password::validate("Ab1!"), Err(PasswordError::TooShort(8))));
        assert!(matches!(
            Password::validate(&"Ab1!".repeat(40)),
            Err(PasswordError::TooLong(128))
        ));
        assert!(matches!(Password::validate("Password1"), Err(PasswordError::TooCommon)));
        assert!(matches!(
            Password::validate("alllowercase"),
            Err(PasswordError::InsufficientComplexity { actual: 1, .. })
        ));
        assert!(Password::validate("lower1234UP").is_ok());
    }

    #[test]
    fn test_debug_is_redacted() {
        let hashed = HashedPassword::from_hash("$argon2id$secret".to_string());
        assert!(!format!("{:?}", hashed).contains("secret"));
    }

    #[test]
    fn test_policy_errors_map_to_validation() {
        let err: AppError = PasswordError::TooCommon.into();
        assert_eq!(err.status_code(), 400);
        let err: AppError = PasswordError::InvalidHash("x".into()).into();
        assert_eq!(err.status_code(), 500);
    }
}
