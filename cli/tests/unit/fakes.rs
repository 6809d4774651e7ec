//! In-memory platform implementing every port, with per-operation failure
//! injection and a journal of every mutating call.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use demoenv_cli::application::ports::{
    ArtifactStore, CloneSpec, ComputePlatform, DnsRecordInfo, DnsRecordSpec, DnsZone,
    ProgressReporter, ReadinessProbe, Removal, TunnelBroker, TunnelInfo,
};
use demoenv_cli::domain::{IngressRule, ProvisionerConfig};

pub const DOMAIN: &str = "example.com";

/// Operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListInstances,
    Clone,
    Start,
    Stop,
    DeleteInstance,
    ListTunnels,
    CreateTunnel,
    TunnelToken,
    UpdateIngress,
    DeleteTunnel,
    ListRecords,
    CreateRecord,
    DeleteRecord,
    PutArtifact,
    DeleteArtifact,
    Probe,
}

#[derive(Default)]
struct State {
    instances: BTreeSet<u32>,
    tunnels: Vec<TunnelInfo>,
    records: Vec<DnsRecordInfo>,
    artifacts: BTreeMap<String, Vec<u8>>,
    ingress: BTreeMap<String, Vec<IngressRule>>,
    next_id: u32,
    journal: Vec<String>,
}

impl State {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

pub struct FakePlatform {
    state: Mutex<State>,
    failing: Mutex<HashSet<Op>>,
    put_status: Mutex<u16>,
    probe_status: Mutex<u16>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
            failing: Mutex::new(HashSet::new()),
            put_status: Mutex::new(201),
            probe_status: Mutex::new(200),
        }
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(self, op: Op) -> Self {
        self.failing.lock().unwrap().insert(op);
        self
    }

    pub fn put_status(self, status: u16) -> Self {
        *self.put_status.lock().unwrap() = status;
        self
    }

    pub fn probe_status(self, status: u16) -> Self {
        *self.probe_status.lock().unwrap() = status;
        self
    }

    pub fn with_instances(self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.state.lock().unwrap().instances.extend(ids);
        self
    }

    pub fn with_tunnel(self, name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.fresh_id("old-t");
            state.tunnels.push(TunnelInfo {
                id,
                name: name.to_string(),
            });
        }
        self
    }

    pub fn with_record(self, fqdn: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.fresh_id("old-r");
            state.records.push(DnsRecordInfo {
                id,
                name: fqdn.to_string(),
            });
        }
        self
    }

    pub fn instances(&self) -> Vec<u32> {
        self.state.lock().unwrap().instances.iter().copied().collect()
    }

    pub fn tunnels(&self) -> Vec<TunnelInfo> {
        self.state.lock().unwrap().tunnels.clone()
    }

    pub fn records(&self) -> Vec<DnsRecordInfo> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn artifact(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().artifacts.get(path).cloned()
    }

    pub fn ingress(&self, tunnel_id: &str) -> Option<Vec<IngressRule>> {
        self.state.lock().unwrap().ingress.get(tunnel_id).cloned()
    }

    /// True when nothing the fake can hold is left.
    pub fn is_empty(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.instances.is_empty()
            && state.tunnels.is_empty()
            && state.records.is_empty()
            && state.artifacts.is_empty()
    }

    pub fn journal(&self) -> Vec<String> {
        self.state.lock().unwrap().journal.clone()
    }

    /// Journal entries for removals only, in call order.
    pub fn removals(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter(|e| e.starts_with("delete") || e.starts_with("stop"))
            .collect()
    }

    fn enter(&self, op: Op, entry: Option<String>) -> Result<()> {
        if let Some(entry) = entry {
            self.state.lock().unwrap().journal.push(entry);
        }
        if self.failing.lock().unwrap().contains(&op) {
            anyhow::bail!("injected failure: {op:?}");
        }
        Ok(())
    }
}

impl ComputePlatform for FakePlatform {
    async fn list_instances(&self) -> Result<Vec<u32>> {
        self.enter(Op::ListInstances, None)?;
        Ok(self.instances())
    }

    async fn clone_template(&self, spec: &CloneSpec<'_>) -> Result<()> {
        self.enter(
            Op::Clone,
            Some(format!("clone {} {}", spec.template_id, spec.new_id)),
        )?;
        let mut state = self.state.lock().unwrap();
        anyhow::ensure!(state.instances.insert(spec.new_id), "id {} in use", spec.new_id);
        Ok(())
    }

    async fn start_instance(&self, id: u32) -> Result<()> {
        self.enter(Op::Start, Some(format!("start {id}")))
    }

    async fn stop_instance(&self, id: u32) -> Result<()> {
        self.enter(Op::Stop, Some(format!("stop {id}")))?;
        anyhow::ensure!(self.instances().contains(&id), "no such instance {id}");
        Ok(())
    }

    async fn delete_instance(&self, id: u32) -> Result<Removal> {
        self.enter(Op::DeleteInstance, Some(format!("delete_instance {id}")))?;
        Ok(removal(self.state.lock().unwrap().instances.remove(&id)))
    }
}

impl TunnelBroker for FakePlatform {
    /// Matches loosely on purpose; callers must filter exact names.
    async fn list_tunnels(&self, name: &str) -> Result<Vec<TunnelInfo>> {
        self.enter(Op::ListTunnels, None)?;
        Ok(self
            .tunnels()
            .into_iter()
            .filter(|t| t.name.contains(name) || name.contains(&t.name))
            .collect())
    }

    async fn create_tunnel(&self, name: &str, secret: &str) -> Result<TunnelInfo> {
        self.enter(Op::CreateTunnel, Some(format!("create_tunnel {name}")))?;
        anyhow::ensure!(!secret.is_empty(), "empty secret");
        let mut state = self.state.lock().unwrap();
        let tunnel = TunnelInfo {
            id: state.fresh_id("t"),
            name: name.to_string(),
        };
        state.tunnels.push(tunnel.clone());
        Ok(tunnel)
    }

    async fn tunnel_token(&self, tunnel_id: &str) -> Result<String> {
        self.enter(Op::TunnelToken, None)?;
        Ok(format!("token-{tunnel_id}"))
    }

    async fn update_ingress(&self, tunnel_id: &str, rules: &[IngressRule]) -> Result<()> {
        self.enter(Op::UpdateIngress, Some(format!("update_ingress {tunnel_id}")))?;
        self.state
            .lock()
            .unwrap()
            .ingress
            .insert(tunnel_id.to_string(), rules.to_vec());
        Ok(())
    }

    async fn delete_tunnel(&self, tunnel_id: &str) -> Result<Removal> {
        self.enter(Op::DeleteTunnel, Some(format!("delete_tunnel {tunnel_id}")))?;
        let mut state = self.state.lock().unwrap();
        let before = state.tunnels.len();
        state.tunnels.retain(|t| t.id != tunnel_id);
        Ok(removal(state.tunnels.len() < before))
    }
}

impl DnsZone for FakePlatform {
    async fn list_records(&self, fqdn: &str) -> Result<Vec<DnsRecordInfo>> {
        self.enter(Op::ListRecords, None)?;
        Ok(self
            .records()
            .into_iter()
            .filter(|r| r.name == fqdn)
            .collect())
    }

    async fn create_record(&self, spec: &DnsRecordSpec<'_>) -> Result<DnsRecordInfo> {
        self.enter(
            Op::CreateRecord,
            Some(format!("create_record {} -> {}", spec.name, spec.target)),
        )?;
        let mut state = self.state.lock().unwrap();
        let record = DnsRecordInfo {
            id: state.fresh_id("r"),
            name: spec.name.to_string(),
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn delete_record(&self, record_id: &str) -> Result<Removal> {
        self.enter(Op::DeleteRecord, Some(format!("delete_record {record_id}")))?;
        let mut state = self.state.lock().unwrap();
        let before = state.records.len();
        state.records.retain(|r| r.id != record_id);
        Ok(removal(state.records.len() < before))
    }
}

impl ArtifactStore for FakePlatform {
    async fn put(&self, path: &str, body: &[u8]) -> Result<u16> {
        self.enter(Op::PutArtifact, Some(format!("put {path}")))?;
        let status = *self.put_status.lock().unwrap();
        if (200..300).contains(&status) {
            self.state
                .lock()
                .unwrap()
                .artifacts
                .insert(path.to_string(), body.to_vec());
        }
        Ok(status)
    }

    async fn delete(&self, path: &str) -> Result<u16> {
        self.enter(Op::DeleteArtifact, Some(format!("delete_artifact {path}")))?;
        let existed = self.state.lock().unwrap().artifacts.remove(path).is_some();
        Ok(if existed { 204 } else { 404 })
    }
}

impl ReadinessProbe for FakePlatform {
    async fn probe(&self, _: &str, _: Duration) -> Result<u16> {
        self.enter(Op::Probe, None)?;
        Ok(*self.probe_status.lock().unwrap())
    }
}

fn removal(existed: bool) -> Removal {
    if existed {
        Removal::Removed
    } else {
        Removal::NotFound
    }
}

/// Collects reporter messages instead of printing them.
#[derive(Default)]
pub struct RecordingReporter {
    pub messages: Mutex<Vec<String>>,
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("warn: {message}"));
    }
}

/// Default config for `DOMAIN`; settle delays are irrelevant under paused time.
pub fn config() -> ProvisionerConfig {
    ProvisionerConfig::for_domain(DOMAIN)
}
