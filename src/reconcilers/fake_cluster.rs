// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory cluster for reconciler tests.
//!
//! Behaves like the API server where the reconciler cares: `generateName` gets a
//! unique suffix, lists honour the label selector, and stored Triggers carry a spec
//! generation the desired ones lack. Every call is counted and each operation can
//! be made to fail.

use crate::addressable::Addressable;
use crate::crd::Trigger;
use crate::errors::AutoTriggerError;
use crate::reconcilers::client::{parent_name, ParentSource, TriggerClient};
use crate::selector::labels_match;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub(crate) struct FakeState {
    pub(crate) parents: Mutex<BTreeMap<String, Addressable>>,
    pub(crate) triggers: Mutex<Vec<Trigger>>,
    pub(crate) next_suffix: Mutex<usize>,
    pub(crate) list_calls: Mutex<usize>,
    pub(crate) create_calls: Mutex<usize>,
    pub(crate) delete_calls: Mutex<usize>,
    /// 1-based create call number that fails, with the status code to report
    pub(crate) fail_create_on: Mutex<Option<(usize, u16)>>,
    pub(crate) fail_deletes: Mutex<bool>,
    pub(crate) list_error: Mutex<Option<u16>>,
    pub(crate) get_parent_error: Mutex<Option<u16>>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeCluster {
    pub(crate) state: Arc<FakeState>,
}

impl FakeCluster {
    pub(crate) fn put_parent(&self, parent: Addressable) {
        self.state
            .parents
            .lock()
            .unwrap()
            .insert(parent.key(), parent);
    }

    pub(crate) fn put_trigger(&self, trigger: Trigger) {
        self.state.triggers.lock().unwrap().push(trigger);
    }

    pub(crate) fn triggers(&self) -> Vec<Trigger> {
        self.state.triggers.lock().unwrap().clone()
    }

    pub(crate) fn counts(&self) -> (usize, usize, usize) {
        (
            *self.state.list_calls.lock().unwrap(),
            *self.state.create_calls.lock().unwrap(),
            *self.state.delete_calls.lock().unwrap(),
        )
    }

    pub(crate) fn fail_create_on(&self, call: usize, code: u16) {
        *self.state.fail_create_on.lock().unwrap() = Some((call, code));
    }

    pub(crate) fn fail_deletes(&self) {
        *self.state.fail_deletes.lock().unwrap() = true;
    }

    pub(crate) fn fail_list(&self, code: u16) {
        *self.state.list_error.lock().unwrap() = Some(code);
    }

    pub(crate) fn fail_get_parent(&self, code: u16) {
        *self.state.get_parent_error.lock().unwrap() = Some(code);
    }

    pub(crate) fn heal(&self) {
        *self.state.fail_create_on.lock().unwrap() = None;
        *self.state.fail_deletes.lock().unwrap() = false;
        *self.state.list_error.lock().unwrap() = None;
        *self.state.get_parent_error.lock().unwrap() = None;
    }
}

#[async_trait::async_trait]
impl ParentSource for FakeCluster {
    async fn get_parent(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Addressable, AutoTriggerError> {
        if let Some(code) = *self.state.get_parent_error.lock().unwrap() {
            return Err(AutoTriggerError::GetParent {
                namespace: namespace.to_string(),
                name: name.to_string(),
                code: Some(code),
                reason: "injected".into(),
            });
        }
        self.state
            .parents
            .lock()
            .unwrap()
            .get(&format!("{namespace}/{name}"))
            .cloned()
            .ok_or_else(|| AutoTriggerError::ParentNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl TriggerClient for FakeCluster {
    async fn list_triggers(
        &self,
        namespace: &str,
        selector: &BTreeMap<String, String>,
    ) -> Result<Vec<Trigger>, AutoTriggerError> {
        *self.state.list_calls.lock().unwrap() += 1;
        if let Some(code) = *self.state.list_error.lock().unwrap() {
            return Err(AutoTriggerError::ListTriggers {
                namespace: namespace.to_string(),
                code: Some(code),
                reason: "injected".into(),
            });
        }
        Ok(self
            .triggers()
            .into_iter()
            .filter(|t| t.metadata.namespace.as_deref() == Some(namespace))
            .filter(|t| labels_match(selector, &t.metadata.labels.clone().unwrap_or_default()))
            .collect())
    }

    async fn create_trigger(
        &self,
        namespace: &str,
        trigger: &Trigger,
    ) -> Result<Trigger, AutoTriggerError> {
        let call = {
            let mut calls = self.state.create_calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if let Some((failing_call, code)) = *self.state.fail_create_on.lock().unwrap() {
            if failing_call == call {
                return Err(AutoTriggerError::CreateTrigger {
                    namespace: namespace.to_string(),
                    parent: parent_name(trigger),
                    code: Some(code),
                    reason: "injected".into(),
                });
            }
        }

        let suffix = {
            let mut next = self.state.next_suffix.lock().unwrap();
            *next += 1;
            *next
        };
        let mut stored = trigger.clone();
        stored.metadata.name = Some(format!(
            "{}{suffix:05}",
            trigger.metadata.generate_name.clone().unwrap_or_default()
        ));
        stored.metadata.uid = Some(format!("trigger-uid-{suffix}"));
        stored.spec.deprecated_generation = Some(1);
        self.put_trigger(stored.clone());
        Ok(stored)
    }

    async fn delete_trigger(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<(), AutoTriggerError> {
        *self.state.delete_calls.lock().unwrap() += 1;
        if *self.state.fail_deletes.lock().unwrap() {
            return Err(AutoTriggerError::DeleteTrigger {
                namespace: namespace.to_string(),
                name: name.to_string(),
                code: Some(500),
                reason: "injected".into(),
            });
        }
        self.state
            .triggers
            .lock()
            .unwrap()
            .retain(|t| t.metadata.name.as_deref() != Some(name));
        Ok(())
    }
}
