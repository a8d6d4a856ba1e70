//! In-memory engine for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex, MutexGuard};

use crate::container::{Container, ContainerSpec};
use crate::error::{EngineError, Result};
use crate::ContainerEngine;

#[derive(Debug, Clone)]
struct MockContainer {
    id: String,
    running: bool,
    host_port: Option<u16>,
    internal_port: u16,
    spec: Option<ContainerSpec>,
}

#[derive(Debug, Default)]
struct MockState {
    containers: HashMap<String, MockContainer>,
    next_id: usize,
    create_failure: Option<EngineError>,
    start_failure: Option<EngineError>,
    find_failure: Option<EngineError>,
    port_inspection: PortInspection,
    lookup_gate: Option<(Arc<Barrier>, usize)>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum PortInspection {
    #[default]
    Report,
    Missing,
    Fail,
}

/// Engine double that keeps containers in a map and counts every call.
#[derive(Debug, Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
    find_calls: AtomicUsize,
    create_calls: AtomicUsize,
    start_calls: AtomicUsize,
    inspect_calls: AtomicUsize,
    containers_created: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seeds an existing container with `host_port` bound to `internal_port`.
    pub fn with_container(self, name: &str, running: bool, internal_port: u16, host_port: u16) -> Self {
        {
            let mut state = self.state();
            state.next_id += 1;
            let id = format!("mock-{}", state.next_id);
            state.containers.insert(
                name.to_string(),
                MockContainer {
                    id,
                    running,
                    host_port: Some(host_port),
                    internal_port,
                    spec: None,
                },
            );
        }
        self
    }

    /// Every `create` fails with `err`.
    pub fn fail_create(self, err: EngineError) -> Self {
        self.state().create_failure = Some(err);
        self
    }

    pub fn fail_start(self, err: EngineError) -> Self {
        self.state().start_failure = Some(err);
        self
    }

    pub fn fail_find(self, err: EngineError) -> Self {
        self.state().find_failure = Some(err);
        self
    }

    /// `inspect_port_binding` reports no binding.
    pub fn without_port_bindings(self) -> Self {
        self.state().port_inspection = PortInspection::Missing;
        self
    }

    /// `inspect_port_binding` fails outright.
    pub fn failing_port_inspection(self) -> Self {
        self.state().port_inspection = PortInspection::Fail;
        self
    }

    /// Holds the first `parties` lookups until all of them have arrived, so
    /// concurrent callers observe the same engine state.
    pub fn gate_lookups(self, parties: usize) -> Self {
        self.state().lookup_gate = Some((Arc::new(Barrier::new(parties)), parties));
        self
    }

    /// Drops every injected failure; later calls behave normally.
    pub fn clear_failures(&self) {
        let mut state = self.state();
        state.create_failure = None;
        state.start_failure = None;
        state.find_failure = None;
        state.port_inspection = PortInspection::Report;
    }

    pub fn stop(&self, name: &str) {
        if let Some(c) = self.state().containers.get_mut(name) {
            c.running = false;
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.state().containers.contains_key(name)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.state()
            .containers
            .get(name)
            .is_some_and(|c| c.running)
    }

    pub fn spec_of(&self, name: &str) -> Option<ContainerSpec> {
        self.state()
            .containers
            .get(name)
            .and_then(|c| c.spec.clone())
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn inspect_calls(&self) -> usize {
        self.inspect_calls.load(Ordering::SeqCst)
    }

    /// Number of successful creates.
    pub fn containers_created(&self) -> usize {
        self.containers_created.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.find_calls() + self.create_calls() + self.start_calls() + self.inspect_calls()
    }

    fn take_gate(&self) -> Option<Arc<Barrier>> {
        let mut state = self.state();
        let (barrier, remaining) = state.lookup_gate.as_mut()?;
        let barrier = barrier.clone();
        *remaining -= 1;
        if *remaining == 0 {
            state.lookup_gate = None;
        }
        Some(barrier)
    }
}

impl ContainerEngine for MockEngine {
    fn find(&self, name: &str) -> Result<Option<Container>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(barrier) = self.take_gate() {
            barrier.wait();
        }

        let state = self.state();
        if let Some(err) = &state.find_failure {
            return Err(err.clone());
        }

        Ok(state.containers.get(name).map(|c| Container {
            id: c.id.clone(),
            name: name.to_string(),
            running: c.running,
        }))
    }

    fn create(&self, spec: &ContainerSpec) -> Result<Container> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state();
        if let Some(err) = &state.create_failure {
            return Err(err.clone());
        }
        if state.containers.contains_key(&spec.name) {
            return Err(EngineError::NameConflict(spec.name.clone()));
        }

        state.next_id += 1;
        let id = format!("mock-{}", state.next_id);
        state.containers.insert(
            spec.name.clone(),
            MockContainer {
                id: id.clone(),
                running: false,
                host_port: Some(spec.host_port),
                internal_port: spec.internal_port,
                spec: Some(spec.clone()),
            },
        );
        self.containers_created.fetch_add(1, Ordering::SeqCst);

        Ok(Container {
            id,
            name: spec.name.clone(),
            running: false,
        })
    }

    fn start(&self, container: &Container) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state();
        if let Some(err) = &state.start_failure {
            return Err(err.clone());
        }

        let entry = state
            .containers
            .get_mut(&container.name)
            .ok_or_else(|| EngineError::NotFound(container.name.clone()))?;
        entry.running = true;
        Ok(())
    }

    fn inspect_port_binding(
        &self,
        container: &Container,
        internal_port: u16,
    ) -> Result<Option<u16>> {
        self.inspect_calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state();
        match state.port_inspection {
            PortInspection::Fail => Err(EngineError::Unknown(
                "port inspection unavailable".to_string(),
            )),
            PortInspection::Missing => Ok(None),
            PortInspection::Report => {
                let entry = state
                    .containers
                    .get(&container.name)
                    .ok_or_else(|| EngineError::NotFound(container.name.clone()))?;
                Ok(entry
                    .host_port
                    .filter(|_| entry.internal_port == internal_port))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{BindMount, RestartPolicy};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn spec(name: &str, host_port: u16) -> ContainerSpec {
        ContainerSpec {
            name: name.to_string(),
            image: "img".to_string(),
            internal_port: 8080,
            host_port,
            env: BTreeMap::new(),
            mount: BindMount {
                host_path: PathBuf::from("/tmp/x"),
                container_path: "/data".to_string(),
            },
            network: "net".to_string(),
            restart_policy: RestartPolicy::UnlessStopped,
        }
    }

    #[test]
    fn test_create_rejects_duplicate_names() {
        let engine = MockEngine::new();
        engine.create(&spec("workspace_1", 40000)).unwrap();

        let err = engine.create(&spec("workspace_1", 40001)).unwrap_err();
        assert_eq!(err, EngineError::NameConflict("workspace_1".to_string()));
        assert_eq!(engine.create_calls(), 2);
        assert_eq!(engine.containers_created(), 1);
    }

    #[test]
    fn test_start_and_inspect() {
        let engine = MockEngine::new();
        let container = engine.create(&spec("workspace_1", 40000)).unwrap();
        assert!(!engine.is_running("workspace_1"));

        engine.start(&container).unwrap();
        assert!(engine.is_running("workspace_1"));
        assert_eq!(
            engine.inspect_port_binding(&container, 8080).unwrap(),
            Some(40000)
        );
        assert_eq!(engine.inspect_port_binding(&container, 9090).unwrap(), None);
    }

    #[test]
    fn test_cleared_failures_stop_firing() {
        let engine = MockEngine::new()
            .fail_create(EngineError::Unknown("disk full".to_string()))
            .failing_port_inspection();
        assert!(engine.create(&spec("workspace_1", 40000)).is_err());

        engine.clear_failures();
        let container = engine.create(&spec("workspace_1", 40000)).unwrap();
        assert_eq!(
            engine.inspect_port_binding(&container, 8080).unwrap(),
            Some(40000)
        );
    }

    #[test]
    fn test_find_missing_is_none() {
        let engine = MockEngine::new().with_container("workspace_2", true, 8080, 41000);
        assert!(engine.find("workspace_1").unwrap().is_none());
        assert!(engine.find("workspace_2").unwrap().unwrap().running);
        assert_eq!(engine.find_calls(), 2);
    }
}
