pub mod admin;
pub mod auth;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod reviews;
pub mod wishlist;

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}
