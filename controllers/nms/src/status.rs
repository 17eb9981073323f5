//! Unit status aggregation
//!
//! Conditions are checked in a fixed priority order and the first unmet one
//! decides the status. Checks that need I/O go through `StatusChecks` so that a
//! condition is only checked once every higher-priority condition holds.
//! Evaluation has no side effects.

use crate::certificates::CertificateStore;
use crate::config_file::NMS_CONFIG_PATH;
use crate::state::{AUTH_DATABASE_RELATION, COMMON_DATABASE_RELATION, MANDATORY_RELATIONS, ObservedState};
use crate::workload::{Workload, storage_attached};
use nms_client::NmsClientTrait;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "message", rename_all = "lowercase")]
pub enum UnitStatus {
    Active,
    Blocked(String),
    Waiting(String),
}

impl UnitStatus {
    fn blocked(message: impl Into<String>) -> Self {
        let message = message.into();
        info!("{}", message);
        Self::Blocked(message)
    }

    fn waiting(message: impl Into<String>) -> Self {
        let message = message.into();
        info!("{}", message);
        Self::Waiting(message)
    }
}

/// Read-only checks against the workload and the NMS
#[async_trait::async_trait]
pub trait StatusChecks: Send + Sync {
    async fn container_reachable(&self) -> bool;
    async fn storage_attached(&self) -> bool;
    async fn config_file_present(&self) -> bool;
    async fn service_running(&self) -> bool;
    async fn api_available(&self) -> bool;
    async fn initialized(&self) -> bool;
}

/// Checks backed by the real workload and NMS client
pub struct LiveStatusChecks<'a> {
    pub workload: &'a dyn Workload,
    /// `None` when no client could be built; the API then counts as unreachable
    pub nms: Option<&'a dyn NmsClientTrait>,
}

#[async_trait::async_trait]
impl StatusChecks for LiveStatusChecks<'_> {
    async fn container_reachable(&self) -> bool {
        self.workload.can_connect().await
    }

    async fn storage_attached(&self) -> bool {
        storage_attached(self.workload).await
    }

    async fn config_file_present(&self) -> bool {
        self.workload.exists(NMS_CONFIG_PATH).await
    }

    async fn service_running(&self) -> bool {
        self.workload.can_connect().await && self.workload.service_running().await
    }

    async fn api_available(&self) -> bool {
        match self.nms {
            Some(nms) => nms.is_api_available().await,
            None => false,
        }
    }

    async fn initialized(&self) -> bool {
        match self.nms {
            Some(nms) => nms.is_initialized().await,
            None => false,
        }
    }
}

pub struct StatusAggregator;

impl StatusAggregator {
    pub async fn evaluate(state: &ObservedState, checks: &dyn StatusChecks) -> UnitStatus {
        if !state.leader {
            return UnitStatus::blocked("Scaling is not implemented for this charm");
        }
        let invalid_configs = state.config.invalid_configs();
        if !invalid_configs.is_empty() {
            return UnitStatus::blocked(format!(
                "The following configurations are not valid: [{}]",
                invalid_configs.join(", ")
            ));
        }
        if let Some(missing) = MANDATORY_RELATIONS.iter().find(|r| !state.relation_created(r)) {
            return UnitStatus::blocked(format!("Waiting for {} relation to be created", missing));
        }
        if !checks.container_reachable().await {
            return UnitStatus::waiting("Waiting for container to be ready");
        }
        if !checks.storage_attached().await {
            return UnitStatus::waiting("Waiting for storage to be attached");
        }
        if state.database(COMMON_DATABASE_RELATION).is_none() {
            return UnitStatus::waiting("Waiting for the common database to be available");
        }
        if state.database(AUTH_DATABASE_RELATION).is_none() {
            return UnitStatus::waiting("Waiting for the auth database to be available");
        }
        if !checks.config_file_present().await {
            return UnitStatus::waiting("Waiting for NMS config file to be stored");
        }
        if !CertificateStore::is_available(state.certificate.as_ref()) {
            return UnitStatus::waiting("Waiting for certificates to be available");
        }
        if !checks.service_running().await {
            return UnitStatus::waiting("Waiting for NMS service to start");
        }
        if !checks.api_available().await {
            return UnitStatus::waiting("NMS API not yet available");
        }
        if !checks.initialized().await {
            return UnitStatus::waiting("NMS not yet initialized");
        }
        UnitStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CERTIFICATES_RELATION;
    use crate::test_utils::StateBuilder;
    use std::sync::Mutex;

    /// Fixed answers, recording which checks were made
    struct FakeChecks {
        container: bool,
        storage: bool,
        config_file: bool,
        service: bool,
        api: bool,
        initialized: bool,
        checked: Mutex<Vec<&'static str>>,
    }

    impl FakeChecks {
        fn healthy() -> Self {
            Self {
                container: true,
                storage: true,
                config_file: true,
                service: true,
                api: true,
                initialized: true,
                checked: Mutex::new(Vec::new()),
            }
        }

        fn checked(&self) -> Vec<&'static str> {
            self.checked.lock().unwrap().clone()
        }

        fn answer(&self, check: &'static str, value: bool) -> bool {
            self.checked.lock().unwrap().push(check);
            value
        }
    }

    #[async_trait::async_trait]
    impl StatusChecks for FakeChecks {
        async fn container_reachable(&self) -> bool {
            self.answer("container", self.container)
        }
        async fn storage_attached(&self) -> bool {
            self.answer("storage", self.storage)
        }
        async fn config_file_present(&self) -> bool {
            self.answer("config_file", self.config_file)
        }
        async fn service_running(&self) -> bool {
            self.answer("service", self.service)
        }
        async fn api_available(&self) -> bool {
            self.answer("api", self.api)
        }
        async fn initialized(&self) -> bool {
            self.answer("initialized", self.initialized)
        }
    }

    fn complete_state() -> StateBuilder {
        StateBuilder::new()
            .leader(true)
            .common_database()
            .auth_database()
            .certificates()
    }

    #[tokio::test]
    async fn test_non_leader_is_blocked_regardless_of_anything_else() {
        let state = complete_state().leader(false).build();
        let checks = FakeChecks::healthy();
        assert_eq!(
            StatusAggregator::evaluate(&state, &checks).await,
            UnitStatus::Blocked("Scaling is not implemented for this charm".to_string())
        );
        assert!(checks.checked().is_empty());

        let broken = StateBuilder::new().leader(false).log_level("nonsense").build();
        assert_eq!(
            StatusAggregator::evaluate(&broken, &FakeChecks { container: false, ..FakeChecks::healthy() }).await,
            UnitStatus::Blocked("Scaling is not implemented for this charm".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_config_is_blocked() {
        let state = complete_state().log_level("verbose").build();
        assert_eq!(
            StatusAggregator::evaluate(&state, &FakeChecks::healthy()).await,
            UnitStatus::Blocked("The following configurations are not valid: [log-level]".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_relations_in_order() {
        let checks = FakeChecks::healthy();
        let state = StateBuilder::new().leader(true).build();
        assert_eq!(
            StatusAggregator::evaluate(&state, &checks).await,
            UnitStatus::Blocked("Waiting for common_database relation to be created".to_string())
        );

        let state = StateBuilder::new().leader(true).common_database().build();
        assert_eq!(
            StatusAggregator::evaluate(&state, &checks).await,
            UnitStatus::Blocked("Waiting for auth_database relation to be created".to_string())
        );

        let state = StateBuilder::new().leader(true).common_database().auth_database().build();
        assert_eq!(
            StatusAggregator::evaluate(&state, &checks).await,
            UnitStatus::Blocked(format!("Waiting for {} relation to be created", CERTIFICATES_RELATION))
        );
        assert!(checks.checked().is_empty());
    }

    #[tokio::test]
    async fn test_waiting_conditions_in_priority_order() {
        let state = complete_state().build();
        let cases = [
            (FakeChecks { container: false, ..FakeChecks::healthy() }, "Waiting for container to be ready"),
            (FakeChecks { storage: false, ..FakeChecks::healthy() }, "Waiting for storage to be attached"),
            (FakeChecks { config_file: false, ..FakeChecks::healthy() }, "Waiting for NMS config file to be stored"),
            (FakeChecks { service: false, ..FakeChecks::healthy() }, "Waiting for NMS service to start"),
            (FakeChecks { api: false, ..FakeChecks::healthy() }, "NMS API not yet available"),
            (FakeChecks { initialized: false, ..FakeChecks::healthy() }, "NMS not yet initialized"),
        ];
        for (checks, message) in cases {
            assert_eq!(
                StatusAggregator::evaluate(&state, &checks).await,
                UnitStatus::Waiting(message.to_string())
            );
        }
    }

    #[tokio::test]
    async fn test_unmet_condition_stops_evaluation() {
        let state = complete_state().build();
        let checks = FakeChecks { storage: false, service: false, ..FakeChecks::healthy() };
        StatusAggregator::evaluate(&state, &checks).await;
        assert_eq!(checks.checked(), vec!["container", "storage"]);
    }

    #[tokio::test]
    async fn test_unpopulated_databases() {
        let checks = FakeChecks::healthy();
        let state = StateBuilder::new()
            .leader(true)
            .relation(COMMON_DATABASE_RELATION, 1, "mongodb", &[])
            .auth_database()
            .certificates()
            .build();
        assert_eq!(
            StatusAggregator::evaluate(&state, &checks).await,
            UnitStatus::Waiting("Waiting for the common database to be available".to_string())
        );

        let state = StateBuilder::new()
            .leader(true)
            .common_database()
            .relation(AUTH_DATABASE_RELATION, 2, "mongodb", &[("username", "u")])
            .certificates()
            .build();
        assert_eq!(
            StatusAggregator::evaluate(&state, &checks).await,
            UnitStatus::Waiting("Waiting for the auth database to be available".to_string())
        );
    }

    #[tokio::test]
    async fn test_certificate_not_assigned() {
        let state = StateBuilder::new()
            .leader(true)
            .common_database()
            .auth_database()
            .relation(CERTIFICATES_RELATION, 3, "self-signed-certificates", &[])
            .build();
        assert_eq!(
            StatusAggregator::evaluate(&state, &FakeChecks::healthy()).await,
            UnitStatus::Waiting("Waiting for certificates to be available".to_string())
        );
    }

    #[tokio::test]
    async fn test_everything_ready_is_active() {
        let state = complete_state().build();
        assert_eq!(StatusAggregator::evaluate(&state, &FakeChecks::healthy()).await, UnitStatus::Active);
    }
}
