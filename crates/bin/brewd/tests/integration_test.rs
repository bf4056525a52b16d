//! End-to-end smoke tests for the full brewd stack.
//!
//! Each test wires the real scheduler, sequencer, event bus, virtual
//! actuator bank and axum router, and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot`, no TCP port is bound. Time is paused so
//! a full brew completes instantly; the clock follows tokio's virtual time
//! starting at 10:00:00.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use tokio::time::Instant;
use tower::ServiceExt;

use brewhub_adapter_http_axum::router;
use brewhub_adapter_http_axum::state::AppState;
use brewhub_adapter_virtual::VirtualActuatorBank;
use brewhub_app::event_bus::InProcessEventBus;
use brewhub_app::ports::Clock;
use brewhub_app::scheduler::{AlarmScheduler, SchedulerConfig};
use brewhub_app::sequencer::Sequencer;
use brewhub_domain::actuator::{ActuatorId, ActuatorLevel, Sequence};
use brewhub_domain::error::BrewError;
use brewhub_domain::event::EventType;
use brewhub_domain::time::ClockTime;

const TEN_O_CLOCK: u64 = 10 * 3600;

struct VirtualTimeClock {
    origin: Instant,
}

impl Clock for VirtualTimeClock {
    fn now(&self) -> Result<ClockTime, BrewError> {
        Ok(ClockTime::from_seconds_of_day(
            TEN_O_CLOCK + self.origin.elapsed().as_secs(),
        ))
    }
}

type Scheduler =
    AlarmScheduler<VirtualTimeClock, Arc<VirtualActuatorBank>, Arc<InProcessEventBus>>;

struct Harness {
    app: axum::Router,
    scheduler: Scheduler,
    bank: Arc<VirtualActuatorBank>,
    event_bus: Arc<InProcessEventBus>,
}

impl Harness {
    fn new() -> Self {
        let sequence = Sequence::default_brew();
        let bank = Arc::new(VirtualActuatorBank::for_sequence(&sequence, true));
        let event_bus = Arc::new(InProcessEventBus::new(256));

        let sequencer = Arc::new(Sequencer::new(
            sequence,
            Arc::clone(&bank),
            Arc::clone(&event_bus),
        ));
        let scheduler = AlarmScheduler::new(
            VirtualTimeClock {
                origin: Instant::now(),
            },
            Arc::clone(&sequencer),
            SchedulerConfig::default(),
        );
        let state = AppState::new(scheduler.clone(), sequencer, Arc::clone(&event_bus));

        Self {
            app: router::build(state),
            scheduler,
            bank,
            event_bus,
        }
    }

    async fn send(&self, method: Method, uri: &str) -> (StatusCode, String) {
        let response = self
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn status(&self) -> String {
        self.send(Method::GET, "/status").await.1
    }

    fn commands(&self) -> Vec<(String, ActuatorLevel)> {
        self.bank
            .history()
            .into_iter()
            .map(|command| (command.actuator.to_string(), command.level))
            .collect()
    }
}

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let harness = Harness::new();

    let (status, body) = harness.send(Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

// ---------------------------------------------------------------------------
// Alarm lifecycle
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_brew_when_alarm_fires() {
    let harness = Harness::new();

    let (status, _) = harness.send(Method::POST, "/alarm?hour=10&minutes=1").await;
    assert_eq!(status, StatusCode::CREATED);

    advance(30).await;
    assert_eq!(harness.status().await, "10:01");
    assert!(harness.commands().is_empty());

    advance(40).await;
    assert_eq!(harness.status().await, "in progress");
    assert_eq!(
        harness.commands(),
        vec![
            ("heater".to_string(), ActuatorLevel::Pressed),
            ("heater".to_string(), ActuatorLevel::Released),
        ]
    );
    assert_eq!(harness.bank.history()[0].pin_value, 0);

    let (status, _) = harness.send(Method::POST, "/coffee").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = harness.send(Method::DELETE, "/alarm").await;
    assert_eq!(status, StatusCode::CONFLICT);

    advance(200).await;
    assert_eq!(harness.status().await, "--:--");
    assert_eq!(harness.commands().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn should_not_brew_when_alarm_cancelled() {
    let harness = Harness::new();

    harness.send(Method::POST, "/alarm?hour=10&minutes=1").await;
    advance(30).await;
    let (status, _) = harness.send(Method::DELETE, "/alarm").await;
    assert_eq!(status, StatusCode::OK);

    advance(300).await;
    assert!(harness.commands().is_empty());
    assert_eq!(harness.status().await, "--:--");
}

#[tokio::test(start_paused = true)]
async fn should_fire_only_the_last_rescheduled_alarm() {
    let harness = Harness::new();

    harness.send(Method::POST, "/alarm?hour=10&minutes=5").await;
    harness.send(Method::PATCH, "/alarm?hour=10&minutes=2").await;
    let (status, _) = harness.send(Method::PATCH, "/alarm?hour=10&minutes=3").await;
    assert_eq!(status, StatusCode::OK);

    advance(150).await;
    assert!(harness.commands().is_empty());
    assert_eq!(harness.status().await, "10:03");

    advance(40).await;
    assert_eq!(harness.status().await, "in progress");

    advance(600).await;
    assert_eq!(harness.commands().len(), 6);
    assert_eq!(harness.status().await, "--:--");
}

// ---------------------------------------------------------------------------
// Immediate brew
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_run_full_sequence_on_coffee_command() {
    let harness = Harness::new();

    let (status, body) = harness.send(Method::POST, "/coffee").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["run_id"].is_string());

    advance(200).await;
    let heater = ActuatorId::HEATER.to_string();
    let pump = ActuatorId::PUMP.to_string();
    assert_eq!(
        harness.commands(),
        vec![
            (heater.clone(), ActuatorLevel::Pressed),
            (heater.clone(), ActuatorLevel::Released),
            (pump.clone(), ActuatorLevel::Pressed),
            (pump, ActuatorLevel::Released),
            (heater.clone(), ActuatorLevel::Pressed),
            (heater, ActuatorLevel::Released),
        ]
    );

    let (status, _) = harness.send(Method::POST, "/coffee").await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[tokio::test(start_paused = true)]
async fn should_skip_alarm_firing_during_immediate_brew() {
    let harness = Harness::new();
    let mut events = harness.event_bus.subscribe();

    harness.send(Method::POST, "/coffee").await;
    harness.send(Method::POST, "/alarm?hour=10&minutes=1").await;

    advance(70).await;
    assert_eq!(harness.status().await, "--:--");

    advance(200).await;
    assert_eq!(harness.commands().len(), 6);

    let mut types = Vec::new();
    while let Ok(event) = events.try_recv() {
        types.push(event.event_type);
    }
    assert!(types.contains(&EventType::AlarmSkipped));
    assert!(!types.contains(&EventType::AlarmFired));
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn should_release_every_button_before_shutdown_completes() {
    let harness = Harness::new();

    harness.send(Method::POST, "/coffee").await;
    advance(130).await;
    let pump = ActuatorId::new(ActuatorId::PUMP).unwrap();
    assert_eq!(harness.bank.level(&pump), Some(ActuatorLevel::Pressed));

    harness.scheduler.shutdown().await;

    assert_eq!(harness.commands().len(), 6);
    for actuator in [ActuatorId::HEATER, ActuatorId::PUMP] {
        let id = ActuatorId::new(actuator).unwrap();
        assert_eq!(harness.bank.level(&id), Some(ActuatorLevel::Released));
    }
}

#[tokio::test(start_paused = true)]
async fn should_not_fire_pending_alarm_after_shutdown() {
    let harness = Harness::new();

    harness.send(Method::POST, "/alarm?hour=10&minutes=1").await;
    harness.scheduler.shutdown().await;

    advance(300).await;
    assert!(harness.commands().is_empty());
    assert_eq!(harness.status().await, "--:--");
}
