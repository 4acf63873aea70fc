mod common;

use common::{app_state, spawn_backend, ALICE_PASSWORD, ALICE_TOKEN};
use forum_client::guards::outcome::Navigation;
use forum_client::models::user::LoginRequest;
use forum_client::navigation::navigator::NavigationEnd;
use forum_client::navigation::route::Route;
use forum_client::stores::token_store::MemoryTokenStore;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_cached_user_allows_without_request() {
    let server = spawn_backend().await;
    let state = app_state(&server.base_url, Arc::new(MemoryTokenStore::new()));
    state
        .auth
        .login(&LoginRequest {
            email_or_username: "a@x.com".to_string(),
            password: ALICE_PASSWORD.to_string(),
        })
        .await
        .unwrap();
    let before = server.backend.requests();

    let outcome = state.navigator.guard(&Route::Profile);
    assert_eq!(outcome.immediate(), Some(&Navigation::Allow));
    assert_eq!(
        state.navigator.navigate(Route::Themes).await,
        NavigationEnd::Arrived(Route::Themes)
    );
    assert_eq!(server.backend.requests(), before);
}

#[tokio::test]
async fn test_no_token_redirects_synchronously_to_login() {
    let server = spawn_backend().await;
    let state = app_state(&server.base_url, Arc::new(MemoryTokenStore::new()));

    for route in [Route::Articles, Route::ArticleDetail(1), Route::CreateArticle, Route::Themes, Route::Profile] {
        let outcome = state.navigator.guard(&route);
        assert_eq!(outcome.immediate(), Some(&Navigation::Redirect(Route::Login)));
    }
    assert_eq!(server.backend.requests(), 0);
}

#[tokio::test]
async fn test_invalid_token_denied_and_session_cleared() {
    let server = spawn_backend().await;
    let state = app_state(
        &server.base_url,
        Arc::new(MemoryTokenStore::with_token("expired-token")),
    );

    let end = state.navigator.navigate(Route::Articles).await;

    assert_eq!(end, NavigationEnd::Arrived(Route::Login));
    assert_eq!(state.session.get_token(), None);
    assert_eq!(state.session.current_user(), None);
    assert_eq!(server.backend.me_calls(), 1);
}

#[tokio::test]
async fn test_guard_joins_running_bootstrap() {
    let server = spawn_backend().await;
    server.backend.tokens.insert(ALICE_TOKEN.to_string(), 1);
    server.backend.set_me_delay(Duration::from_millis(100));
    let state = app_state(&server.base_url, Arc::new(MemoryTokenStore::with_token(ALICE_TOKEN)));

    let (_, end) = tokio::join!(
        state.bootstrap.initialize(),
        state.navigator.navigate(Route::Profile)
    );

    assert_eq!(end, NavigationEnd::Arrived(Route::Profile));
    assert_eq!(server.backend.me_calls(), 1);
}

#[tokio::test]
async fn test_guest_guard_sends_token_holder_to_articles() {
    let server = spawn_backend().await;
    server.backend.tokens.insert(ALICE_TOKEN.to_string(), 1);
    let state = app_state(&server.base_url, Arc::new(MemoryTokenStore::with_token(ALICE_TOKEN)));
    state.bootstrap.initialize().await;

    for route in [Route::Login, Route::Register] {
        assert_eq!(
            state.navigator.guard(&route).immediate(),
            Some(&Navigation::Redirect(Route::Articles))
        );
    }
    assert_eq!(
        state.navigator.navigate(Route::Register).await,
        NavigationEnd::Arrived(Route::Articles)
    );
}

#[tokio::test]
async fn test_logout_then_protected_route() {
    let server = spawn_backend().await;
    server.backend.tokens.insert(ALICE_TOKEN.to_string(), 1);
    let state = app_state(&server.base_url, Arc::new(MemoryTokenStore::with_token(ALICE_TOKEN)));

    assert_eq!(
        state.navigator.navigate(Route::Articles).await,
        NavigationEnd::Arrived(Route::Articles)
    );

    state.auth.logout();

    assert_eq!(
        state.navigator.navigate(Route::Articles).await,
        NavigationEnd::Arrived(Route::Login)
    );
    assert_eq!(
        state.navigator.navigate(Route::Login).await,
        NavigationEnd::Arrived(Route::Login)
    );
}

#[tokio::test]
async fn test_logout_during_guard_verification_redirects_to_login() {
    let server = spawn_backend().await;
    server.backend.tokens.insert(ALICE_TOKEN.to_string(), 1);
    server.backend.set_me_delay(Duration::from_millis(200));
    let state = app_state(&server.base_url, Arc::new(MemoryTokenStore::with_token(ALICE_TOKEN)));

    let navigator = state.navigator.clone();
    let pending = tokio::spawn(async move { navigator.navigate(Route::Profile).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    state.auth.logout();

    assert_eq!(pending.await.unwrap(), NavigationEnd::Arrived(Route::Login));
    assert_eq!(state.session.current_user(), None);
    assert_eq!(server.backend.me_calls(), 1);
}
