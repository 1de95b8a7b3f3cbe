use chrono::Duration;
use village_portal::{
    AppConfig, CredentialHasher, TokenIssuer,
    auth::TokenError,
    models::Role,
};
use uuid::Uuid;

// --- Token Issuance ---

#[test]
fn test_issue_and_verify_round_trip() {
    let issuer = TokenIssuer::from_config(&AppConfig::default()).expect("default config is valid");
    let user_id = Uuid::new_v4();

    let token = issuer.issue(user_id, Role::Admin).expect("signing should succeed");
    let claims = issuer.verify(&token).expect("freshly issued token should verify");

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.exp - claims.iat, 24 * 3600);
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let issuer = TokenIssuer::new("secret-one", Duration::hours(1)).unwrap();
    let other = TokenIssuer::new("secret-two", Duration::hours(1)).unwrap();

    let token = issuer.issue(Uuid::new_v4(), Role::Admin).unwrap();

    assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
}

#[test]
fn test_tampered_token_is_rejected() {
    let issuer = TokenIssuer::new("secret-one", Duration::hours(1)).unwrap();
    let token = issuer.issue(Uuid::new_v4(), Role::Admin).unwrap();

    let mut tampered = token.clone();
    tampered.push('x');

    assert!(issuer.verify(&tampered).is_err());
}

#[test]
fn test_empty_secret_is_refused() {
    assert!(matches!(
        TokenIssuer::new("", Duration::hours(1)),
        Err(TokenError::MissingSigningKey)
    ));
}

#[test]
fn test_non_positive_lifetime_is_refused() {
    assert!(matches!(
        TokenIssuer::new("secret", Duration::zero()),
        Err(TokenError::InvalidLifetime(0))
    ));

    let config = AppConfig {
        jwt_ttl_hours: i64::MAX,
        ..AppConfig::default()
    };
    assert!(TokenIssuer::from_config(&config).is_err());
}

// --- Credential Hashing ---

#[tokio::test]
async fn test_hash_is_argon2id_and_salted() {
    let hasher = CredentialHasher::from_config(&AppConfig::default()).unwrap();

    let first = hasher.hash("Str0ngPassword".to_string()).await.unwrap();
    let second = hasher.hash("Str0ngPassword".to_string()).await.unwrap();

    assert!(first.starts_with("$argon2id$"));
    assert_ne!(first, "Str0ngPassword");
    assert_ne!(first, second, "each hash must use a fresh salt");
}

#[tokio::test]
async fn test_hash_verifies_against_plaintext() {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let hasher = CredentialHasher::from_config(&AppConfig::default()).unwrap();
    let hash = hasher.hash("Str0ngPassword".to_string()).await.unwrap();

    let parsed = PasswordHash::new(&hash).unwrap();
    assert!(
        Argon2::default()
            .verify_password(b"Str0ngPassword", &parsed)
            .is_ok()
    );
    assert!(
        Argon2::default()
            .verify_password(b"WrongPassword1", &parsed)
            .is_err()
    );
}
