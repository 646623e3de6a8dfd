use std::sync::Arc;

use quiz_core::model::{AccountError, Gender, ProfileDraft, RegistrationDraft};
use services::{AccountService, AccountServiceError, UsernameStatus};
use storage::Storage;
use storage::repository::AccountRepository;

fn service() -> AccountService {
    AccountService::new(Arc::clone(&Storage::in_memory().accounts))
}

fn draft(username: &str) -> RegistrationDraft {
    RegistrationDraft {
        username: username.into(),
        password: "pass123".into(),
        name: "Murad".into(),
        age: "31".into(),
        gender: Some(Gender::Male),
    }
}

#[tokio::test]
async fn two_char_username_rejected_three_char_accepted() {
    let accounts = service();

    let err = accounts.register(draft("ab")).await.unwrap_err();
    assert!(matches!(
        err,
        AccountServiceError::Validation(AccountError::UsernameTooShort)
    ));

    let account = accounts.register(draft("abc")).await.unwrap();
    assert_eq!(account.username(), "abc");
    assert_eq!(account.total_points(), 0);
    assert!(account.seen_questions().is_empty());
}

#[tokio::test]
async fn taken_username_is_reported_before_password() {
    let accounts = service();
    accounts.register(draft("murad")).await.unwrap();

    let mut again = draft("murad");
    again.password = "x".into();
    let err = accounts.register(again).await.unwrap_err();
    assert!(matches!(err, AccountServiceError::UsernameTaken));
    assert_eq!(err.to_string(), "Bu istifadəçi adı artıq mövcuddur.");
}

#[tokio::test]
async fn validation_runs_in_form_order() {
    let accounts = service();

    let mut d = draft("nigar");
    d.password = "123456789012".into();
    d.name = String::new();
    let err = accounts.register(d).await.unwrap_err();
    assert!(matches!(
        err,
        AccountServiceError::Validation(AccountError::PasswordLength)
    ));

    let mut d = draft("nigar");
    d.name = "  ".into();
    d.age = String::new();
    let err = accounts.register(d).await.unwrap_err();
    assert!(matches!(
        err,
        AccountServiceError::Validation(AccountError::MissingName)
    ));

    let mut d = draft("nigar");
    d.age = String::new();
    let err = accounts.register(d).await.unwrap_err();
    assert!(matches!(
        err,
        AccountServiceError::Validation(AccountError::MissingAge)
    ));

    let mut d = draft("nigar");
    d.gender = None;
    let err = accounts.register(d).await.unwrap_err();
    assert!(matches!(
        err,
        AccountServiceError::Validation(AccountError::MissingGender)
    ));
}

#[tokio::test]
async fn username_status_tracks_input() {
    let accounts = service();
    accounts.register(draft("elvin")).await.unwrap();

    assert_eq!(
        accounts.username_status("").await.unwrap(),
        UsernameStatus::Idle
    );
    assert_eq!(
        accounts.username_status("el").await.unwrap(),
        UsernameStatus::Idle
    );
    assert_eq!(
        accounts.username_status("elvin").await.unwrap(),
        UsernameStatus::Taken
    );
    assert_eq!(
        accounts.username_status("elvira").await.unwrap(),
        UsernameStatus::Valid
    );
}

#[tokio::test]
async fn login_failure_does_not_reveal_which_field_was_wrong() {
    let accounts = service();
    accounts.register(draft("sevda")).await.unwrap();

    let unknown = accounts.login("nobody", "pass123").await.unwrap_err();
    let wrong = accounts.login("sevda", "wrong").await.unwrap_err();
    assert!(matches!(unknown, AccountServiceError::AuthFailed));
    assert!(matches!(wrong, AccountServiceError::AuthFailed));
    assert_eq!(unknown.to_string(), wrong.to_string());

    let account = accounts.login("sevda", "pass123").await.unwrap();
    assert_eq!(account.name(), "Murad");
}

#[tokio::test]
async fn profile_update_keeps_stats() {
    let accounts = service();
    accounts.register(draft("kamal")).await.unwrap();

    let updated = accounts
        .update_profile(
            "kamal",
            ProfileDraft {
                name: "Kamal Əliyev".into(),
                age: "40".into(),
                gender: Some(Gender::Male),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name(), "Kamal Əliyev");
    assert_eq!(updated.profile().age, Some(40));

    let reloaded = accounts.login("kamal", "pass123").await.unwrap();
    assert_eq!(reloaded.profile(), updated.profile());

    let err = accounts
        .update_profile(
            "kamal",
            ProfileDraft {
                name: "Kamal".into(),
                age: "qırx".into(),
                gender: Some(Gender::Male),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AccountServiceError::Validation(AccountError::InvalidAge)
    ));

    let err = accounts
        .update_profile(
            "ghost",
            ProfileDraft {
                name: "Ghost".into(),
                age: "1".into(),
                gender: Some(Gender::Female),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AccountServiceError::NotFound));
}

#[tokio::test]
async fn leaderboard_is_sorted_and_limited() {
    use quiz_core::model::{GameOutcome, LossReason, Topic};

    let storage = Storage::in_memory();
    let accounts = AccountService::new(Arc::clone(&storage.accounts));

    for i in 0..12_usize {
        let mut account = accounts.register(draft(&format!("user{i:02}"))).await.unwrap();
        // user00 scores 0, user11 scores 550.
        account.apply_outcome(&GameOutcome::lost(Topic::Tarix, i, LossReason::Wrong));
        storage.accounts.update(&account).await.unwrap();
    }

    let board = accounts.leaderboard(10).await.unwrap();
    assert_eq!(board.len(), 10);
    assert_eq!(board[0].username, "user11");
    assert_eq!(board[0].rank, 1);
    assert_eq!(board[0].total_points, 550);
    assert!(board.windows(2).all(|w| w[0].total_points >= w[1].total_points));
    assert!(board.iter().all(|row| row.username != "user00"));
}
