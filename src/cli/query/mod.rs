//! Read commands - one repository call each, printed as JSON

use clap::Args;

use crate::config::AppConfig;
use crate::domain::{DomainError, UserId};
use crate::AppState;

/// A user id argument
#[derive(Args, Clone, Debug)]
pub struct UserIdArgs {
    /// User id (UUID)
    pub id: String,
}

/// A user name argument
#[derive(Args, Clone, Debug)]
pub struct NameArgs {
    pub name: String,
}

/// Builds the state, runs one read and closes the store whatever the outcome
async fn with_state<T, F, Fut>(config: &AppConfig, read: F) -> anyhow::Result<()>
where
    T: serde::Serialize,
    F: FnOnce(AppState) -> Fut,
    Fut: std::future::Future<Output = Result<T, DomainError>>,
{
    let state = crate::create_app_state(config).await?;
    let stores = state.stores.clone();

    let result = read(state).await;
    stores.close().await;

    result.map_err(failed_request).and_then(|value| super::print_json(&value))
}

fn failed_request(e: DomainError) -> anyhow::Error {
    let status = e.status_code();
    anyhow::Error::new(e).context(format!("request failed with status {}", status))
}

fn parse_id(raw: &str) -> anyhow::Result<UserId> {
    UserId::parse(raw).map_err(failed_request)
}

pub async fn get_user(config: &AppConfig, args: UserIdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    with_state(config, |state| async move { state.users.get_user(&id).await }).await
}

pub async fn users_by_name(config: &AppConfig, args: NameArgs) -> anyhow::Result<()> {
    with_state(config, |state| async move {
        state.users.get_users_by_name(&args.name).await
    })
    .await
}

pub async fn user_articles(config: &AppConfig, args: UserIdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id)?;
    with_state(config, |state| async move {
        state.users.get_user_articles(&id).await
    })
    .await
}

pub async fn list_users(config: &AppConfig) -> anyhow::Result<()> {
    with_state(config, |state| async move { state.users.list_users().await }).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::StorageType;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.backend = StorageType::Memory;
        config
    }

    #[tokio::test]
    async fn test_list_users_on_empty_store() {
        assert!(list_users(&memory_config()).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_user_unknown_id_reports_not_found() {
        let args = UserIdArgs {
            id: uuid::Uuid::new_v4().to_string(),
        };

        let err = get_user(&memory_config(), args).await.unwrap_err();

        assert!(err.to_string().contains("404"));
        assert!(err.downcast_ref::<DomainError>().is_some_and(|e| e.is_not_found()));
    }

    #[tokio::test]
    async fn test_get_user_malformed_id() {
        let args = UserIdArgs {
            id: "42".to_string(),
        };

        let err = get_user(&memory_config(), args).await.unwrap_err();
        assert!(err.to_string().contains("400"));
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::InvalidArgument { .. })
        ));
    }
}
