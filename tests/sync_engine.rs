// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the device manager against in-memory appliances.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use midea_lan::event::EventKind;
use midea_lan::protocol::{DeviceIdentity, Gateway, Host};
use midea_lan::state::{StateDelta, WatchedField};
use midea_lan::types::{Characteristic, CharacteristicValue, DeviceKind};
use midea_lan::{
    CapabilityViolation, DeviceContext, DeviceId, DeviceManager, Error, GatewayError, SyncSettings,
};

// ============================================================================
// Test doubles
// ============================================================================

/// Appliances kept in memory. Sent deltas are merged into their state.
#[derive(Default)]
struct MockGateway {
    states: Mutex<HashMap<String, Map<String, Value>>>,
    scripted: Mutex<HashMap<String, VecDeque<Result<String, GatewayError>>>>,
    delay: Mutex<Duration>,
    fail_sends: AtomicBool,
    fetches: AtomicUsize,
    sent: Mutex<Vec<(String, StateDelta)>>,
    in_flight: Mutex<HashMap<String, usize>>,
    max_per_device: AtomicUsize,
    max_total: AtomicUsize,
}

impl MockGateway {
    fn with_device(self, id: &str, state: Value) -> Self {
        let map = state.as_object().cloned().unwrap();
        self.states.lock().insert(id.to_string(), map);
        self
    }

    fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    fn set_attr(&self, id: &str, key: &str, value: Value) {
        self.states
            .lock()
            .get_mut(id)
            .unwrap()
            .insert(key.to_string(), value);
    }

    fn script(&self, id: &str, reply: Result<String, GatewayError>) {
        self.scripted
            .lock()
            .entry(id.to_string())
            .or_default()
            .push_back(reply);
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn sent(&self) -> Vec<(String, StateDelta)> {
        self.sent.lock().clone()
    }

    fn enter(&self, id: &str) {
        let mut in_flight = self.in_flight.lock();
        let count = in_flight.entry(id.to_string()).or_default();
        *count += 1;
        self.max_per_device.fetch_max(*count, Ordering::SeqCst);
        let total = in_flight.values().sum();
        self.max_total.fetch_max(total, Ordering::SeqCst);
    }

    fn leave(&self, id: &str) {
        if let Some(count) = self.in_flight.lock().get_mut(id) {
            *count -= 1;
        }
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Gateway for MockGateway {
    async fn fetch_state(&self, identity: &DeviceIdentity) -> Result<String, GatewayError> {
        let id = identity.id.as_str();
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.enter(id);

        // The reply reflects the appliance when the request was made.
        let scripted = self
            .scripted
            .lock()
            .get_mut(id)
            .and_then(VecDeque::pop_front);
        let reply = scripted.unwrap_or_else(|| {
            self.states
                .lock()
                .get(id)
                .map(|state| serde_json::to_string(state).unwrap())
                .ok_or_else(|| GatewayError::ConnectionFailed(format!("{id} unreachable")))
        });

        self.pause().await;
        self.leave(id);
        reply
    }

    async fn send_state(
        &self,
        identity: &DeviceIdentity,
        delta: &StateDelta,
    ) -> Result<(), GatewayError> {
        let id = identity.id.as_str();
        self.enter(id);
        self.pause().await;
        self.leave(id);

        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(GatewayError::Timeout(5000));
        }
        if let Some(state) = self.states.lock().get_mut(id) {
            for (key, value) in delta.iter() {
                state.insert(key.clone(), value.clone());
            }
        }
        self.sent.lock().push((id.to_string(), delta.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingHost {
    updates: Mutex<Vec<(DeviceId, Characteristic, CharacteristicValue)>>,
}

impl RecordingHost {
    fn take(&self) -> Vec<(DeviceId, Characteristic, CharacteristicValue)> {
        std::mem::take(&mut *self.updates.lock())
    }
}

impl Host for RecordingHost {
    fn update_characteristic(
        &self,
        device_id: &DeviceId,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) {
        self.updates
            .lock()
            .push((device_id.clone(), characteristic, value));
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn dehumidifier_state() -> Value {
    json!({
        "running": true,
        "mode": 3,
        "fan_speed": 60,
        "vertical_swing": false,
        "current_humidity": 62,
        "target_humidity": 50,
        "tank_level": 10,
        "tank_full": false
    })
}

fn air_conditioner_state() -> Value {
    json!({
        "running": false,
        "mode": 2,
        "fan_speed": 60,
        "vertical_swing": false,
        "indoor_temperature": 23.5,
        "outdoor_temperature": 12.0,
        "target_temperature": 24.0,
        "fahrenheit": false
    })
}

fn dehumidifier(id: &str) -> DeviceContext {
    DeviceContext::new(id, DeviceKind::Dehumidifier, "10.0.0.2").with_name(format!("DH {id}"))
}

fn air_conditioner(id: &str) -> DeviceContext {
    DeviceContext::new(id, DeviceKind::AirConditioner, "10.0.0.3").with_name(format!("AC {id}"))
}

type Manager = DeviceManager<MockGateway, RecordingHost>;

fn setup(gateway: MockGateway, settings: SyncSettings) -> (Manager, Arc<MockGateway>, Arc<RecordingHost>) {
    let gateway = Arc::new(gateway);
    let host = Arc::new(RecordingHost::default());
    let manager =
        DeviceManager::with_shared(Arc::clone(&gateway), Arc::clone(&host), settings).unwrap();
    (manager, gateway, host)
}

// ============================================================================
// Registration
// ============================================================================

mod registration {
    use super::*;

    #[tokio::test]
    async fn pushes_full_value_set_to_host() {
        let (manager, _, host) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        manager.add_device(dehumidifier("1")).await.unwrap();

        let updates = host.take();
        let threshold = updates
            .iter()
            .find(|(_, c, _)| *c == Characteristic::RelativeHumidityDehumidifierThreshold)
            .map(|(_, _, v)| v.as_f64());
        assert_eq!(threshold, Some(Some(50.0)));
        assert!(
            updates
                .iter()
                .any(|(_, c, v)| *c == Characteristic::Active && *v == CharacteristicValue::Int(1))
        );

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn logs_every_watched_field_from_unknown() {
        let (manager, _, _) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        let mut events = manager.subscribe();
        manager.add_device(dehumidifier("1")).await.unwrap();

        let mut fields = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let EventKind::AttributeChanged { transition } = event.kind {
                assert!(transition.previous.is_none());
                fields.push(transition.field);
            }
        }
        for field in [
            WatchedField::Power,
            WatchedField::Mode,
            WatchedField::TargetHumidity,
            WatchedField::TankFull,
        ] {
            assert!(fields.contains(&field), "missing {field}");
        }

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn batch_isolates_failing_device() {
        let gateway = MockGateway::default()
            .with_device("1", dehumidifier_state())
            .with_device("3", air_conditioner_state());
        gateway.script("2", Ok("{'running': True".into()));
        let (manager, _, _) = setup(gateway, SyncSettings::default());

        let results = manager
            .add_devices([dehumidifier("1"), dehumidifier("2"), air_conditioner("3")])
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(matches!(
            &results[1].1,
            Err(Error::Initialization { device_id, .. }) if device_id.as_str() == "2"
        ));
        assert!(results[2].1.is_ok());
        assert_eq!(manager.device_count().await, 2);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn unreachable_device_is_not_registered() {
        let (manager, _, host) = setup(MockGateway::default(), SyncSettings::default());

        let result = manager.add_device(dehumidifier("9")).await;

        assert!(matches!(result, Err(Error::Initialization { .. })));
        assert!(host.take().is_empty());
        assert_eq!(manager.device_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_duplicate_makes_no_gateway_call() {
        let gateway = MockGateway::default().with_device("1", dehumidifier_state());
        gateway.set_delay(Duration::from_millis(100));
        let (manager, gateway, host) = setup(gateway, SyncSettings::default());
        let mut events = manager.subscribe();

        let (first, second) = tokio::join!(
            manager.add_device(dehumidifier("1")),
            manager.add_device(dehumidifier("1"))
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(Error::DuplicateDevice(id)) if id.as_str() == "1"));
        assert_eq!(gateway.fetch_count(), 1);
        assert_eq!(manager.device_count().await, 1);

        let threshold_pushes = host
            .take()
            .iter()
            .filter(|(_, c, _)| *c == Characteristic::RelativeHumidityDehumidifierThreshold)
            .count();
        assert_eq!(threshold_pushes, 1);

        let mut added = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event.kind, EventKind::DeviceAdded { .. }) {
                added += 1;
            }
        }
        assert_eq!(added, 1);

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn failed_registration_can_be_retried() {
        let (manager, gateway, _) = setup(MockGateway::default(), SyncSettings::default());

        assert!(manager.add_device(dehumidifier("1")).await.is_err());
        gateway
            .states
            .lock()
            .insert("1".into(), dehumidifier_state().as_object().cloned().unwrap());

        manager.add_device(dehumidifier("1")).await.unwrap();
        assert_eq!(gateway.fetch_count(), 2);

        manager.shutdown().await;
    }
}

// ============================================================================
// Synchronization loop
// ============================================================================

mod sync_loop {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn polls_once_per_interval() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default().with_interval(Duration::from_secs(10)),
        );
        manager.add_device(dehumidifier("1")).await.unwrap();
        assert_eq!(gateway.fetch_count(), 1);

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(gateway.fetch_count(), 4);

        manager.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn picks_up_external_changes() {
        let (manager, gateway, host) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default().with_interval(Duration::from_secs(10)),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();
        let mut events = manager.subscribe();
        host.take();

        gateway.set_attr("1", "tank_full", json!(true));
        tokio::time::sleep(Duration::from_secs(11)).await;

        assert!(manager.raw_state(&id).await.unwrap().tank_full());
        assert!(
            host.take()
                .iter()
                .any(|(_, c, v)| *c == Characteristic::TankFull && v.is_on())
        );

        let event = events.recv().await.unwrap();
        let EventKind::AttributeChanged { transition } = event.kind.clone() else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(transition.field, WatchedField::TankFull);
        assert_eq!(transition.previous, Some(json!(false)));
        assert_eq!(transition.current, Some(json!(true)));

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn failed_poll_keeps_state_and_pushes_nothing() {
        let (manager, gateway, host) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();
        let before = manager.raw_state(&id).await.unwrap();
        let mut events = manager.subscribe();
        host.take();

        gateway.script("1", Err(GatewayError::Timeout(3000)));
        let result = manager.refresh(&id).await;

        assert!(matches!(result, Err(Error::Gateway(GatewayError::Timeout(3000)))));
        assert_eq!(manager.raw_state(&id).await.unwrap(), before);
        assert!(host.take().is_empty());
        assert!(matches!(
            events.recv().await.unwrap().kind,
            EventKind::PollFailed { .. }
        ));

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_text_is_skipped() {
        let (manager, gateway, host) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();
        let before = manager.raw_state(&id).await.unwrap();
        host.take();

        gateway.script("1", Ok("[1, 2, 3]".into()));
        gateway.script("1", Ok("{}".into()));

        assert!(matches!(manager.refresh(&id).await, Err(Error::Decode(_))));
        assert!(matches!(manager.refresh(&id).await, Err(Error::Decode(_))));
        assert_eq!(manager.raw_state(&id).await.unwrap(), before);
        assert!(host.take().is_empty());

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn decodes_python_style_text() {
        let gateway = MockGateway::default().with_device("1", dehumidifier_state());
        gateway.script(
            "1",
            Ok("{'running': False, 'mode': 1, 'target_humidity': 45, \
                'current_humidity': None, 'id': b'\\x01', 'protocol': <ProtocolVersion.V3: 3>}"
                .into()),
        );
        let (manager, _, _) = setup(gateway, SyncSettings::default());

        let id = manager.add_device(dehumidifier("1")).await.unwrap();
        let raw = manager.raw_state(&id).await.unwrap();

        assert!(!raw.running());
        assert_eq!(raw.mode(), Some(1));
        assert_eq!(raw.target_humidity(), Some(45.0));
        assert_eq!(raw.current_humidity(), None);

        manager.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn removed_device_stops_polling() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default().with_interval(Duration::from_secs(10)),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();

        assert!(manager.remove_device(&id).await);
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(gateway.fetch_count(), 1);
    }
}

// ============================================================================
// Access serialization
// ============================================================================

mod serialization {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn calls_for_one_device_never_overlap() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();
        gateway.set_delay(Duration::from_millis(100));

        let mut handles = Vec::new();
        for i in 0..4u8 {
            let manager = manager.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    manager.refresh(&id).await
                } else {
                    manager
                        .on_set_confirmed(&id, Characteristic::RotationSpeed, (i * 20).into())
                        .await
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(gateway.max_per_device.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.sent().len(), 2);

        manager.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn different_devices_run_concurrently() {
        let (manager, gateway, _) = setup(
            MockGateway::default()
                .with_device("1", dehumidifier_state())
                .with_device("2", air_conditioner_state()),
            SyncSettings::default(),
        );
        let first = manager.add_device(dehumidifier("1")).await.unwrap();
        let second = manager.add_device(air_conditioner("2")).await.unwrap();
        gateway.set_delay(Duration::from_millis(100));

        let (a, b) = tokio::join!(manager.refresh(&first), manager.refresh(&second));
        a.unwrap();
        b.unwrap();

        assert_eq!(gateway.max_per_device.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.max_total.load(Ordering::SeqCst), 2);

        manager.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_poll_does_not_undo_write() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();
        gateway.set_delay(Duration::from_millis(100));

        let poll = {
            let manager = manager.clone();
            let id = id.clone();
            tokio::spawn(async move { manager.refresh(&id).await })
        };
        tokio::task::yield_now().await;

        manager
            .on_set(
                &id,
                Characteristic::RelativeHumidityDehumidifierThreshold,
                70.0f64.into(),
            )
            .await
            .unwrap();
        assert_eq!(
            manager.raw_state(&id).await.unwrap().target_humidity(),
            Some(70.0)
        );

        poll.await.unwrap().unwrap();
        assert_eq!(
            manager.raw_state(&id).await.unwrap().target_humidity(),
            Some(70.0)
        );

        tokio::time::sleep(Duration::from_millis(500)).await;
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.get("target_humidity"), Some(&json!(70)));

        manager.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn writes_reach_gateway_in_call_order() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();
        gateway.set_delay(Duration::from_millis(20));

        for round in 0..5 {
            let before = gateway.sent().len();

            // A poll holds the device while both writes are queued.
            let poll = {
                let manager = manager.clone();
                let id = id.clone();
                tokio::spawn(async move { manager.refresh(&id).await })
            };
            tokio::time::sleep(Duration::from_millis(5)).await;

            let writes = {
                let manager = manager.clone();
                let id = id.clone();
                tokio::spawn(async move {
                    manager
                        .on_set(&id, Characteristic::RotationSpeed, CharacteristicValue::Int(10))
                        .await?;
                    manager
                        .on_set(&id, Characteristic::RotationSpeed, CharacteristicValue::Int(100))
                        .await
                })
            };
            writes.await.unwrap().unwrap();
            poll.await.unwrap().unwrap();

            tokio::time::timeout(Duration::from_secs(2), async {
                while gateway.sent().len() < before + 2 {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            })
            .await
            .unwrap();

            let speeds: Vec<_> = gateway.sent()[before..]
                .iter()
                .map(|(_, delta)| delta.get("fan_speed").cloned())
                .collect();
            assert_eq!(speeds, vec![Some(json!(40)), Some(json!(80))], "round {round}");
            assert_eq!(manager.raw_state(&id).await.unwrap().fan_speed(), Some(80));
        }

        manager.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn queued_writes_are_dropped_on_removal() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", air_conditioner_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(air_conditioner("1")).await.unwrap();
        gateway.set_delay(Duration::from_millis(100));

        let confirmed = {
            let manager = manager.clone();
            let id = id.clone();
            tokio::spawn(async move {
                manager
                    .on_set_confirmed(&id, Characteristic::Active, CharacteristicValue::Int(1))
                    .await
            })
        };
        // The first write is now at the gateway.
        tokio::time::sleep(Duration::from_millis(10)).await;
        manager
            .on_set(&id, Characteristic::RotationSpeed, CharacteristicValue::Int(100))
            .await
            .unwrap();

        assert!(manager.remove_device(&id).await);
        assert!(confirmed.await.unwrap().is_ok());

        tokio::time::sleep(Duration::from_secs(1)).await;
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.get("running"), Some(&json!(true)));
    }
}

// ============================================================================
// Host writes
// ============================================================================

mod writes {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn clamped_humidity_is_republished_after_delay() {
        let (manager, gateway, host) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();
        host.take();

        manager
            .on_set(
                &id,
                Characteristic::RelativeHumidityDehumidifierThreshold,
                95.0f64.into(),
            )
            .await
            .unwrap();

        assert_eq!(
            manager.raw_state(&id).await.unwrap().target_humidity(),
            Some(85.0)
        );
        assert!(host.take().is_empty());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(
            host.take(),
            vec![(
                id.clone(),
                Characteristic::RelativeHumidityDehumidifierThreshold,
                CharacteristicValue::Float(85.0)
            )]
        );
        assert_eq!(gateway.sent()[0].1.get("target_humidity"), Some(&json!(85)));

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_dehumidifier_target_makes_no_call() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();

        let result = manager
            .on_set_confirmed(
                &id,
                Characteristic::TargetHumidifierDehumidifierState,
                CharacteristicValue::Int(1),
            )
            .await;

        assert!(matches!(
            result,
            Err(Error::Capability(CapabilityViolation::InvalidValue { .. }))
        ));
        assert!(gateway.sent().is_empty());

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn read_only_characteristic_is_rejected() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", dehumidifier_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(dehumidifier("1")).await.unwrap();

        let result = manager
            .on_set(&id, Characteristic::WaterLevel, CharacteristicValue::Int(0))
            .await;

        assert!(matches!(
            result,
            Err(Error::Capability(CapabilityViolation::ReadOnly(
                Characteristic::WaterLevel
            )))
        ));
        assert!(gateway.sent().is_empty());

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn failed_send_keeps_local_value() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", air_conditioner_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(air_conditioner("1")).await.unwrap();
        let mut events = manager.subscribe();
        gateway.fail_sends.store(true, Ordering::SeqCst);

        let result = manager
            .on_set_confirmed(&id, Characteristic::Active, CharacteristicValue::Int(1))
            .await;

        assert!(matches!(result, Err(Error::Gateway(GatewayError::Timeout(_)))));
        assert!(manager.raw_state(&id).await.unwrap().running());
        assert!(matches!(
            events.recv().await.unwrap().kind,
            EventKind::CommandFailed { .. }
        ));

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn fan_only_switch_forces_mode() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", air_conditioner_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(air_conditioner("1")).await.unwrap();

        manager
            .on_set_confirmed(&id, Characteristic::FanActive, CharacteristicValue::Int(1))
            .await
            .unwrap();

        let sent = gateway.sent();
        assert_eq!(sent[0].1.get("running"), Some(&json!(true)));
        assert_eq!(sent[0].1.get("mode"), Some(&json!(5)));
        assert_eq!(
            manager
                .on_get(&id, Characteristic::FanActive)
                .await
                .unwrap(),
            Some(CharacteristicValue::Int(1))
        );

        manager.shutdown().await;
    }

    #[tokio::test]
    async fn unchanged_threshold_sends_nothing() {
        let (manager, gateway, _) = setup(
            MockGateway::default().with_device("1", air_conditioner_state()),
            SyncSettings::default(),
        );
        let id = manager.add_device(air_conditioner("1")).await.unwrap();

        manager
            .on_set_confirmed(
                &id,
                Characteristic::CoolingThresholdTemperature,
                24.0f64.into(),
            )
            .await
            .unwrap();

        assert!(gateway.sent().is_empty());

        manager.shutdown().await;
    }
}
