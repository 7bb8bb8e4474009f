mod common;

use std::sync::Arc;

use chrono::Duration;
use common::access_codec;
use common::auth_flow_with_clock;
use common::refresh_codec;
use common::ManualClock;
use futures::future::join_all;
use identity_service::credential::errors::AuthFlowError;
use identity_service::credential::models::CreateUserCommand;
use identity_service::credential::models::IssueTokenCommand;
use identity_service::credential::models::RefreshTokenCommand;
use identity_service::credential::models::Username;
use identity_service::credential::ports::AuthFlowPort;
use identity_service::credential::ports::Clock;

fn create(username: &str, password: &str) -> CreateUserCommand {
    CreateUserCommand::new(Username::new(username).unwrap(), password.to_string())
}

fn login(username: &str, password: &str) -> IssueTokenCommand {
    IssueTokenCommand::new(Username::new(username).unwrap(), password.to_string())
}

#[tokio::test]
async fn test_alice_scenario() {
    let clock = Arc::new(ManualClock::starting_epoch());
    let flow = auth_flow_with_clock(clock.clone());

    flow.create_user(create("alice", "s3cr3t")).await.unwrap();

    let first = flow.issue_token(login("alice", "s3cr3t")).await.unwrap();
    assert_eq!(first.expires_in, 900);

    clock.advance(Duration::seconds(1));

    let second = flow
        .refresh_token(RefreshTokenCommand::new(
            first.access_token.clone(),
            first.refresh_token.clone(),
        ))
        .await
        .unwrap();

    assert_eq!(second.expires_in, 900);
    assert_ne!(second.access_token, first.access_token);
    assert_ne!(second.refresh_token, first.refresh_token);
}

#[tokio::test]
async fn test_round_trip_subject() {
    let clock = Arc::new(ManualClock::starting_epoch());
    let flow = auth_flow_with_clock(clock.clone());

    let users = [("alice", "s3cr3t"), ("bob_42", ""), ("c-h-a-r-l-i-e", "ünïcødé")];

    for (username, password) in users {
        flow.create_user(create(username, password)).await.unwrap();
        let token_set = flow.issue_token(login(username, password)).await.unwrap();

        let subject = access_codec()
            .verify(&token_set.access_token, clock.now())
            .unwrap();
        assert_eq!(subject, username);

        let subject = refresh_codec()
            .verify(&token_set.refresh_token, clock.now())
            .unwrap();
        assert_eq!(subject, username);
    }
}

#[tokio::test]
async fn test_wrong_password_does_not_mutate_store() {
    let clock = Arc::new(ManualClock::starting_epoch());
    let flow = auth_flow_with_clock(clock);

    flow.create_user(create("alice", "s3cr3t")).await.unwrap();

    for _ in 0..3 {
        let result = flow.issue_token(login("alice", "wrong")).await;
        assert!(matches!(result, Err(AuthFlowError::UserUnauthorized(_))));
    }

    assert!(flow.issue_token(login("alice", "s3cr3t")).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_create_keeps_first_credential() {
    let clock = Arc::new(ManualClock::starting_epoch());
    let flow = auth_flow_with_clock(clock);

    flow.create_user(create("alice", "first")).await.unwrap();
    let result = flow.create_user(create("alice", "second")).await;

    assert!(matches!(result, Err(AuthFlowError::UserAlreadyExists(_))));
    assert!(flow.issue_token(login("alice", "first")).await.is_ok());
    assert!(matches!(
        flow.issue_token(login("alice", "second")).await,
        Err(AuthFlowError::UserUnauthorized(_))
    ));
}

#[tokio::test]
async fn test_refresh_available_until_refresh_expiry() {
    let clock = Arc::new(ManualClock::starting_epoch());
    let flow = auth_flow_with_clock(clock.clone());
    let refresh_ttl = flow.policy().refresh_token_ttl();

    flow.create_user(create("alice", "s3cr3t")).await.unwrap();
    let token_set = flow.issue_token(login("alice", "s3cr3t")).await.unwrap();
    let command = RefreshTokenCommand::new(token_set.access_token, token_set.refresh_token);

    clock.advance(refresh_ttl - Duration::seconds(1));
    let rotated = flow.refresh_token(command.clone()).await.unwrap();
    assert_ne!(rotated.access_token, command.access_token);

    clock.advance(Duration::seconds(1));
    let result = flow.refresh_token(command).await;
    assert_eq!(result, Err(AuthFlowError::TokenInvalid));
}

#[tokio::test]
async fn test_access_expired_refresh_alive() {
    let clock = Arc::new(ManualClock::starting_epoch());
    let flow = auth_flow_with_clock(clock.clone());
    let access_ttl = flow.policy().access_token_ttl();

    flow.create_user(create("alice", "s3cr3t")).await.unwrap();
    let token_set = flow.issue_token(login("alice", "s3cr3t")).await.unwrap();

    clock.advance(access_ttl);

    assert!(access_codec()
        .verify(&token_set.access_token, clock.now())
        .is_err());

    // Access token expired at this instant; it cannot be used to delete
    let result = flow.delete_user(&token_set.access_token).await;
    assert_eq!(result, Err(AuthFlowError::TokenInvalid));

    let rotated = flow
        .refresh_token(RefreshTokenCommand::new(
            token_set.access_token,
            token_set.refresh_token,
        ))
        .await
        .unwrap();

    let subject = access_codec()
        .verify(&rotated.access_token, clock.now())
        .unwrap();
    assert_eq!(subject, "alice");
}

#[tokio::test]
async fn test_delete_frees_username() {
    let clock = Arc::new(ManualClock::starting_epoch());
    let flow = auth_flow_with_clock(clock);

    flow.create_user(create("alice", "old")).await.unwrap();
    let token_set = flow.issue_token(login("alice", "old")).await.unwrap();

    flow.delete_user(&format!("Bearer {}", token_set.access_token))
        .await
        .unwrap();

    let result = flow.issue_token(login("alice", "old")).await;
    assert!(matches!(result, Err(AuthFlowError::UserNotFound(_))));
    assert!(result.unwrap_err().is_unauthorized());

    flow.create_user(create("alice", "new")).await.unwrap();
    assert!(flow.issue_token(login("alice", "new")).await.is_ok());
    assert!(flow.issue_token(login("alice", "old")).await.is_err());
}

#[tokio::test]
async fn test_refresh_after_delete_is_rejected() {
    let clock = Arc::new(ManualClock::starting_epoch());
    let flow = auth_flow_with_clock(clock);

    flow.create_user(create("alice", "s3cr3t")).await.unwrap();
    let token_set = flow.issue_token(login("alice", "s3cr3t")).await.unwrap();
    flow.delete_user(&token_set.access_token).await.unwrap();

    let result = flow
        .refresh_token(RefreshTokenCommand::new(
            token_set.access_token,
            token_set.refresh_token,
        ))
        .await;

    assert!(matches!(result, Err(AuthFlowError::UserNotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_create_race() {
    let clock = Arc::new(ManualClock::starting_epoch());
    let flow = Arc::new(auth_flow_with_clock(clock));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let flow = Arc::clone(&flow);
            tokio::spawn(async move { flow.create_user(create("bob", &format!("pw-{}", i))).await })
        })
        .collect();

    let results = join_all(handles).await;

    let mut created = Vec::new();
    let mut conflicts = 0;
    for (i, result) in results.into_iter().enumerate() {
        match result.unwrap() {
            Ok(()) => created.push(i),
            Err(AuthFlowError::UserAlreadyExists(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(created.len(), 1);
    assert_eq!(conflicts, 7);

    // Only the winner's password works
    let winner = created[0];
    for i in 0..8 {
        let result = flow.issue_token(login("bob", &format!("pw-{}", i))).await;
        assert_eq!(result.is_ok(), i == winner);
    }
}
