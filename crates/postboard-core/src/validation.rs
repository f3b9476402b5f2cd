//! Input checks that run before any request is sent.
//!
//! Each failure carries the message shown to the user; nothing that fails
//! here reaches the server.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{ImageFile, PostDraft, SignupForm};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Special characters accepted in passwords
const PASSWORD_SPECIALS: &str = "@$!%*#?&";
const PASSWORD_MIN_LENGTH: usize = 8;

const NICKNAME_MIN_LENGTH: usize = 2;
const NICKNAME_MAX_LENGTH: usize = 10;

pub const TITLE_MAX_LENGTH: usize = 26;

/// Largest image accepted for upload (5 MiB)
pub const IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your email.")]
    EmptyEmail,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please enter your password.")]
    EmptyPassword,

    #[error("Password must be at least 8 characters with a letter, a number and a special character (@$!%*#?&).")]
    WeakPassword,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Please enter a nickname.")]
    EmptyNickname,

    #[error("Nickname must be between 2 and 10 characters.")]
    NicknameLength,

    #[error("Please enter a title.")]
    EmptyTitle,

    #[error("Title can be at most {max} characters.")]
    TitleTooLong { max: usize },

    #[error("Please enter some content.")]
    EmptyContent,

    #[error("Please enter a comment.")]
    EmptyComment,

    #[error("Please choose a profile image.")]
    ImageRequired,

    #[error("Only image files can be uploaded.")]
    NotAnImage,

    #[error("Images must be 5MB or smaller.")]
    ImageTooLarge,
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    Ok(())
}

/// Signup password rule: 8+ characters drawn from letters, digits and
/// `@$!%*#?&`, with at least one of each kind.
pub fn validate_password_format(password: &str) -> Result<(), ValidationError> {
    validate_password(password)?;

    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if password.chars().count() < PASSWORD_MIN_LENGTH
        || !allowed
        || !has_letter
        || !has_digit
        || !has_special
    {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

pub fn validate_password_match(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(ValidationError::EmptyNickname);
    }
    let len = nickname.chars().count();
    if !(NICKNAME_MIN_LENGTH..=NICKNAME_MAX_LENGTH).contains(&len) {
        return Err(ValidationError::NicknameLength);
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)
}

/// Checks in form order, stopping at the first problem
pub fn validate_signup(form: &SignupForm, image: Option<&ImageFile>) -> Result<(), ValidationError> {
    let image = image.ok_or(ValidationError::ImageRequired)?;
    validate_email(&form.email)?;
    validate_password_format(&form.password)?;
    validate_password_match(&form.password, &form.password_confirm)?;
    validate_nickname(&form.nickname)?;
    validate_image(image)
}

pub fn validate_post(draft: &PostDraft) -> Result<(), ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        return Err(ValidationError::TitleTooLong {
            max: TITLE_MAX_LENGTH,
        });
    }
    if draft.content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(())
}

pub fn validate_comment(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(())
}

pub fn validate_image(image: &ImageFile) -> Result<(), ValidationError> {
    if !image.is_image() {
        return Err(ValidationError::NotAnImage);
    }
    if image.size() > IMAGE_MAX_BYTES {
        return Err(ValidationError::ImageTooLarge);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(size: usize) -> ImageFile {
        ImageFile::new("a.png", "image/png", vec![0; size])
    }

    #[test]
    fn test_email() {
        assert_eq!(validate_email(""), Err(ValidationError::EmptyEmail));
        assert_eq!(validate_email("   "), Err(ValidationError::EmptyEmail));
        assert_eq!(validate_email("user"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("user@host"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("us er@host.com"), Err(ValidationError::InvalidEmail));
        assert!(validate_email("user@host.com").is_ok());
    }

    #[test]
    fn test_password_format() {
        assert_eq!(validate_password_format(""), Err(ValidationError::EmptyPassword));
        assert_eq!(validate_password_format("abc1!"), Err(ValidationError::WeakPassword));
        assert_eq!(validate_password_format("abcdefgh1"), Err(ValidationError::WeakPassword));
        assert_eq!(validate_password_format("abcdefg!!"), Err(ValidationError::WeakPassword));
        assert_eq!(validate_password_format("12345678!"), Err(ValidationError::WeakPassword));
        // Characters outside the allowed set
        assert_eq!(validate_password_format("abcd123!^"), Err(ValidationError::WeakPassword));
        assert!(validate_password_format("abcd123!").is_ok());
        assert!(validate_password_format("Passw0rd#&").is_ok());
    }

    #[test]
    fn test_nickname_bounds() {
        assert_eq!(validate_nickname(" "), Err(ValidationError::EmptyNickname));
        assert_eq!(validate_nickname("a"), Err(ValidationError::NicknameLength));
        assert_eq!(validate_nickname("abcdefghijk"), Err(ValidationError::NicknameLength));
        assert!(validate_nickname("ab").is_ok());
        assert!(validate_nickname("abcdefghij").is_ok());
        // Counted in characters, not bytes
        assert!(validate_nickname("김철수").is_ok());
    }

    #[test]
    fn test_login_inputs() {
        assert_eq!(validate_login("", "pw"), Err(ValidationError::EmptyEmail));
        assert_eq!(validate_login("a@b.co", ""), Err(ValidationError::EmptyPassword));
        assert!(validate_login("a@b.co", "pw").is_ok());
    }

    #[test]
    fn test_signup_order() {
        let form = SignupForm::new("a@b.co", "abcd123!", "abcd123?", "nick");
        assert_eq!(validate_signup(&form, None), Err(ValidationError::ImageRequired));
        assert_eq!(
            validate_signup(&form, Some(&png(10))),
            Err(ValidationError::PasswordMismatch)
        );

        let form = SignupForm::new("a@b.co", "abcd123!", "abcd123!", "nick");
        assert!(validate_signup(&form, Some(&png(10))).is_ok());
        assert_eq!(
            validate_signup(&form, Some(&png(IMAGE_MAX_BYTES + 1))),
            Err(ValidationError::ImageTooLarge)
        );
    }

    #[test]
    fn test_post_draft() {
        assert_eq!(validate_post(&PostDraft::new("", "body")), Err(ValidationError::EmptyTitle));
        assert_eq!(validate_post(&PostDraft::new("title", "  ")), Err(ValidationError::EmptyContent));
        assert_eq!(
            validate_post(&PostDraft::new("x".repeat(27), "body")),
            Err(ValidationError::TitleTooLong { max: 26 })
        );
        assert!(validate_post(&PostDraft::new("x".repeat(26), "body")).is_ok());
    }

    #[test]
    fn test_image_rules() {
        assert!(validate_image(&png(IMAGE_MAX_BYTES)).is_ok());
        let text = ImageFile::new("a.txt", "text/plain", vec![1]);
        assert_eq!(validate_image(&text), Err(ValidationError::NotAnImage));
    }

    #[test]
    fn test_comment() {
        assert_eq!(validate_comment(" \n"), Err(ValidationError::EmptyComment));
        assert!(validate_comment("hello").is_ok());
    }
}
