/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2 password hashing and verification
///
/// Login here is deliberately minimal: it verifies credentials and returns
/// the user record. No sessions or tokens are issued.
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod password;
