//! Test utilities for unit testing reconcilers
//!
//! In-memory stand-ins for the workload, the secret store and the outward sink,
//! plus a builder for state snapshots.

use crate::error::ControllerError;
use crate::events::{Trigger, TriggerKind};
use crate::reconciler::Reconciler;
use crate::secrets::{LoginSecret, NMS_LOGIN_SECRET_LABEL, SecretContent, SecretStore};
use crate::sink::{EventSink, OutwardRecord};
use crate::state::{
    AUTH_DATABASE_RELATION, CERTIFICATES_RELATION, CertificateBundle, COMMON_DATABASE_RELATION,
    FIVEG_CORE_GNB_RELATION, FIVEG_GNB_IDENTITY_RELATION, FIVEG_N4_RELATION, ObservedState,
    RelationInstance, SDCORE_CONFIG_RELATION,
};
use crate::status::UnitStatus;
use crate::workload::{BASE_CONFIG_PATH, CERTS_MOUNT_PATH, ServicePlan, Workload};
use nms_client::{MockNmsClient, NmsClientTrait};
use relations::Databag;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// Workload keeping files in memory and recording every write
#[derive(Default)]
pub struct MemoryWorkload {
    connected: Mutex<bool>,
    files: Mutex<BTreeMap<String, String>>,
    dirs: Mutex<BTreeSet<String>>,
    writes: Mutex<Vec<String>>,
    plan: Mutex<Option<ServicePlan>>,
    running: Mutex<bool>,
    restarts: Mutex<u32>,
    plan_applies: Mutex<u32>,
}

impl MemoryWorkload {
    /// Reachable container with both storage mounts attached
    pub fn ready() -> Self {
        let workload = Self::default();
        workload.set_connected(true);
        workload.add_dir(BASE_CONFIG_PATH);
        workload.add_dir(CERTS_MOUNT_PATH);
        workload
    }

    pub fn set_connected(&self, connected: bool) {
        *self.connected.lock().unwrap() = connected;
    }

    pub fn set_running(&self, running: bool) {
        *self.running.lock().unwrap() = running;
    }

    pub fn add_dir(&self, path: &str) {
        self.dirs.lock().unwrap().insert(path.to_string());
    }

    pub fn remove_dir(&self, path: &str) {
        self.dirs.lock().unwrap().remove(path);
    }

    /// Seed a file without recording a write
    pub fn put(&self, path: &str, content: &str) {
        self.files.lock().unwrap().insert(path.to_string(), content.to_string());
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    /// Paths pushed so far, in order
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }

    pub fn current_plan(&self) -> Option<ServicePlan> {
        self.plan.lock().unwrap().clone()
    }

    pub fn restarts(&self) -> u32 {
        *self.restarts.lock().unwrap()
    }

    pub fn plan_applies(&self) -> u32 {
        *self.plan_applies.lock().unwrap()
    }

    fn check_connected(&self) -> Result<(), ControllerError> {
        if *self.connected.lock().unwrap() {
            Ok(())
        } else {
            Err(ControllerError::Workload("container not reachable".to_string()))
        }
    }
}

#[async_trait::async_trait]
impl Workload for MemoryWorkload {
    async fn can_connect(&self) -> bool {
        *self.connected.lock().unwrap()
    }

    async fn exists(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path) || self.dirs.lock().unwrap().contains(path)
    }

    async fn pull(&self, path: &str) -> Result<String, ControllerError> {
        self.check_connected()?;
        self.file(path)
            .ok_or_else(|| ControllerError::Workload(format!("{}: not found", path)))
    }

    async fn push(&self, path: &str, content: &str) -> Result<(), ControllerError> {
        self.check_connected()?;
        self.put(path, content);
        self.writes.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn make_dir(&self, path: &str) -> Result<(), ControllerError> {
        self.check_connected()?;
        self.add_dir(path);
        Ok(())
    }

    async fn remove_path(&self, path: &str) -> Result<(), ControllerError> {
        self.check_connected()?;
        self.files.lock().unwrap().remove(path);
        self.remove_dir(path);
        Ok(())
    }

    async fn plan(&self) -> Option<ServicePlan> {
        self.current_plan()
    }

    async fn apply_plan(&self, plan: ServicePlan) -> Result<(), ControllerError> {
        self.check_connected()?;
        *self.plan.lock().unwrap() = Some(plan);
        *self.plan_applies.lock().unwrap() += 1;
        self.set_running(true);
        Ok(())
    }

    async fn restart(&self) -> Result<(), ControllerError> {
        self.check_connected()?;
        *self.restarts.lock().unwrap() += 1;
        self.set_running(true);
        Ok(())
    }

    async fn service_running(&self) -> bool {
        *self.running.lock().unwrap()
    }
}

/// Secret store keeping content in memory
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<BTreeMap<String, SecretContent>>,
    fail: Mutex<bool>,
}

impl MemorySecretStore {
    pub fn insert(&self, label: &str, content: SecretContent) {
        self.secrets.lock().unwrap().insert(label.to_string(), content);
    }

    pub fn content(&self, label: &str) -> Option<SecretContent> {
        self.secrets.lock().unwrap().get(label).cloned()
    }

    /// Make every operation fail
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn check(&self) -> Result<(), ControllerError> {
        if *self.fail.lock().unwrap() {
            Err(ControllerError::Secret("secret backend unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, label: &str) -> Result<Option<SecretContent>, ControllerError> {
        self.check()?;
        Ok(self.content(label))
    }

    async fn create(&self, label: &str, content: SecretContent) -> Result<(), ControllerError> {
        self.check()?;
        self.insert(label, content);
        Ok(())
    }

    async fn set_content(&self, label: &str, content: SecretContent) -> Result<(), ControllerError> {
        self.check()?;
        self.insert(label, content);
        Ok(())
    }
}

/// Sink recording every outward record
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<OutwardRecord>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<OutwardRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }

    /// Relation data writes as `(relation, relation_id, data)`
    pub fn relation_writes(&self) -> Vec<(String, u64, Databag)> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                OutwardRecord::RelationData {
                    relation,
                    relation_id,
                    data,
                } => Some((relation, relation_id, data)),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<UnitStatus> {
        self.records().into_iter().rev().find_map(|record| match record {
            OutwardRecord::UnitStatus { status } => Some(status),
            _ => None,
        })
    }

    pub fn workload_versions(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                OutwardRecord::WorkloadVersion { version } => Some(version),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, record: OutwardRecord) -> Result<(), ControllerError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

fn databag(pairs: &[(&str, &str)]) -> Databag {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Builder for state snapshots
#[derive(Default)]
pub struct StateBuilder {
    state: ObservedState,
}

impl StateBuilder {
    pub fn new() -> Self {
        let mut state = ObservedState::default();
        state.app_name = "nms".to_string();
        state.pod_ip = Some("10.0.0.5".to_string());
        Self { state }
    }

    pub fn leader(mut self, leader: bool) -> Self {
        self.state.leader = leader;
        self
    }

    pub fn app_name(mut self, name: &str) -> Self {
        self.state.app_name = name.to_string();
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.state.config.log_level = level.to_string();
        self
    }

    pub fn ingress_url(mut self, url: &str) -> Self {
        self.state.ingress_url = Some(url.to_string());
        self
    }

    /// Add a relation instance with the given remote application data
    pub fn relation(mut self, name: &str, id: u64, app: &str, remote: &[(&str, &str)]) -> Self {
        self.state
            .relations
            .entry(name.to_string())
            .or_default()
            .push(RelationInstance {
                id,
                app: Some(app.to_string()),
                remote_app_data: databag(remote),
                local_app_data: Databag::new(),
            });
        self
    }

    /// Add a relation instance whose remote application is departing
    pub fn departing_relation(mut self, name: &str, id: u64) -> Self {
        self.state
            .relations
            .entry(name.to_string())
            .or_default()
            .push(RelationInstance {
                id,
                ..Default::default()
            });
        self
    }

    /// Set what this application already published on a relation instance
    pub fn local_data(mut self, name: &str, id: u64, local: &[(&str, &str)]) -> Self {
        if let Some(instance) = self
            .state
            .relations
            .get_mut(name)
            .and_then(|list| list.iter_mut().find(|r| r.id == id))
        {
            instance.local_app_data = databag(local);
        }
        self
    }

    pub fn common_database(self) -> Self {
        self.relation(
            COMMON_DATABASE_RELATION,
            1,
            "mongodb",
            &[
                ("username", "banana"),
                ("password", "pizza"),
                ("uris", "1.9.11.4:1234,5.6.7.8:1111"),
            ],
        )
    }

    pub fn auth_database(self) -> Self {
        self.relation(
            AUTH_DATABASE_RELATION,
            2,
            "mongodb",
            &[
                ("username", "apple"),
                ("password", "hamburger"),
                ("uris", "2.8.10.3:4321,9.9.9.9:2222"),
            ],
        )
    }

    /// Certificates relation with an assigned certificate
    pub fn certificates(self) -> Self {
        self.relation(CERTIFICATES_RELATION, 3, "self-signed-certificates", &[])
            .certificate("whatever certificate", "whatever CA", "whatever key")
    }

    pub fn certificate(mut self, certificate: &str, ca: &str, private_key: &str) -> Self {
        self.state.certificate = Some(CertificateBundle {
            certificate: certificate.to_string(),
            ca: ca.to_string(),
            private_key: private_key.to_string(),
        });
        self
    }

    pub fn n4(self, id: u64, hostname: &str, port: &str) -> Self {
        self.relation(
            FIVEG_N4_RELATION,
            id,
            "upf",
            &[("upf_hostname", hostname), ("upf_port", port)],
        )
    }

    pub fn gnb_identity(self, id: u64, gnb_name: &str, tac: &str) -> Self {
        self.relation(
            FIVEG_GNB_IDENTITY_RELATION,
            id,
            "gnbsim",
            &[("gnb_name", gnb_name), ("tac", tac)],
        )
    }

    pub fn core_gnb(self, id: u64, gnb_name: &str) -> Self {
        self.relation(FIVEG_CORE_GNB_RELATION, id, "cu", &[("gnb-name", gnb_name)])
    }

    pub fn sdcore_config(self, id: u64) -> Self {
        self.relation(SDCORE_CONFIG_RELATION, id, "amf", &[])
    }

    pub fn build(self) -> ObservedState {
        self.state
    }
}

pub fn trigger(kind: TriggerKind, relation: Option<&str>, state: ObservedState) -> Trigger {
    Trigger {
        kind,
        relation: relation.map(str::to_string),
        state,
    }
}

/// Reconciler wired to in-memory collaborators and a mock NMS
pub struct Harness {
    pub workload: Arc<MemoryWorkload>,
    pub secrets: Arc<MemorySecretStore>,
    pub sink: Arc<RecordingSink>,
    pub nms: MockNmsClient,
    pub reconciler: Reconciler,
    ca_seen: Arc<Mutex<Vec<Option<String>>>>,
}

impl Harness {
    pub fn new() -> Self {
        let workload = Arc::new(MemoryWorkload::ready());
        let secrets = Arc::new(MemorySecretStore::default());
        let sink = Arc::new(RecordingSink::default());
        let nms = MockNmsClient::new("https://10.0.0.5:5000");
        let ca_seen = Arc::new(Mutex::new(Vec::new()));

        let factory_nms = nms.clone();
        let factory_seen = ca_seen.clone();
        let reconciler = Reconciler::new(
            workload.clone(),
            secrets.clone(),
            sink.clone(),
            Box::new(move |ca: Option<&str>| {
                factory_seen.lock().unwrap().push(ca.map(str::to_string));
                Ok(Arc::new(factory_nms.clone()) as Arc<dyn NmsClientTrait>)
            }),
        );

        Self {
            workload,
            secrets,
            sink,
            nms,
            reconciler,
            ca_seen,
        }
    }

    /// CA certificates the client factory was called with
    pub fn ca_seen(&self) -> Vec<Option<String>> {
        self.ca_seen.lock().unwrap().clone()
    }

    /// Stored admin account known to the NMS, with a valid session token
    pub fn login_ready(&self) -> LoginSecret {
        let secret = LoginSecret {
            username: "admin".to_string(),
            password: "Secret123".to_string(),
            token: "seeded-token".to_string(),
        };
        self.secrets.insert(NMS_LOGIN_SECRET_LABEL, secret.to_content());
        self.nms.add_user(&secret.username, &secret.password);
        self.nms.add_token(&secret.token);
        secret
    }

    pub fn stored_login(&self) -> Option<LoginSecret> {
        self.secrets
            .content(NMS_LOGIN_SECRET_LABEL)
            .map(|content| LoginSecret::from_content(&content))
    }

    /// Snapshot with every prerequisite of the config phase met
    pub fn ready_state(&self) -> StateBuilder {
        StateBuilder::new()
            .leader(true)
            .common_database()
            .auth_database()
            .certificates()
    }
}
