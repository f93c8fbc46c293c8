//! Sign-in, token refresh and sign-out against a live storefront.

use shopzify_client::AuthState;
use shopzify_integration_tests::TestServer;

#[tokio::test]
async fn test_rejected_token_is_refreshed_from_session_cookie() {
    let server = TestServer::spawn().await;
    let client = server.signed_in("refresh@example.com").await;

    // Simulate an expired access token; the session cookie is still valid
    client.session().set_token("not-a-jwt").await;

    let cart = client.cart().await.unwrap();
    assert!(cart.cart.products.is_empty());

    match client.session().state().await {
        AuthState::Authenticated { access_token } => assert_ne!(access_token, "not-a-jwt"),
        AuthState::Anonymous => panic!("refresh should keep the client signed in"),
    }
}

#[tokio::test]
async fn test_logout_ends_the_refresh_session() {
    let server = TestServer::spawn().await;
    let client = server.signed_in("logout@example.com").await;

    let response = client.logout().await.unwrap();
    assert_eq!(response.message, "Logged out successfully");
    assert_eq!(client.session().state().await, AuthState::Anonymous);

    let err = client.cart().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(client.session().state().await, AuthState::Anonymous);
}

#[tokio::test]
async fn test_explicit_refresh_without_session_signs_out() {
    let server = TestServer::spawn().await;
    let client = server.client();
    client.session().set_token("left-over").await;

    let err = client.refresh().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let server = TestServer::spawn().await;
    let client = server.signed_in("wrong@example.com").await;
    client.logout().await.unwrap();

    let err = client
        .login("wrong@example.com", "not-the-password")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message().0, "Invalid email or password");
}
