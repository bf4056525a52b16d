//! Alarm commands and snapshot.
//!
//! `hour` and `minutes` travel in the query string. They are extracted as
//! raw strings and validated here so that a missing or garbled attribute is
//! reported as a malformed command instead of silently defaulting.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use brewhub_app::ports::{Actuator, Clock, EventPublisher};
use brewhub_domain::alarm::AlarmState;
use brewhub_domain::error::ValidationError;
use brewhub_domain::time::AlarmTime;

use crate::error::ApiError;
use crate::state::AppState;

/// Query attributes of `POST /alarm` and `PATCH /alarm`.
#[derive(Debug, Default, Deserialize)]
pub struct AlarmQuery {
    pub hour: Option<String>,
    pub minutes: Option<String>,
}

impl AlarmQuery {
    /// Parse and range-check both attributes.
    pub fn alarm_time(&self) -> Result<AlarmTime, ValidationError> {
        let hour = parse_attribute("hour", self.hour.as_deref())?;
        let minute = parse_attribute("minutes", self.minutes.as_deref())?;
        AlarmTime::new(hour, minute)
    }
}

fn parse_attribute(name: &'static str, raw: Option<&str>) -> Result<u32, ValidationError> {
    let raw = raw.ok_or(ValidationError::MissingAttribute(name))?;
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidAttribute {
            name,
            value: raw.to_string(),
        })
}

/// Alarm snapshot with its display label.
#[derive(Debug, Serialize)]
pub struct AlarmView {
    #[serde(flatten)]
    pub state: AlarmState,
    pub label: String,
}

impl From<AlarmState> for AlarmView {
    fn from(state: AlarmState) -> Self {
        Self {
            label: state.display_label(),
            state,
        }
    }
}

/// Possible responses from the alarm endpoints.
pub enum AlarmResponse {
    Ok(Json<AlarmView>),
    Created(Json<AlarmView>),
}

impl IntoResponse for AlarmResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /alarm`
pub async fn get<C, A, P>(State(state): State<AppState<C, A, P>>) -> AlarmResponse
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    AlarmResponse::Ok(Json(state.scheduler.state().into()))
}

/// `POST /alarm?hour=H&minutes=M`
pub async fn create<C, A, P>(
    State(state): State<AppState<C, A, P>>,
    Query(query): Query<AlarmQuery>,
) -> Result<AlarmResponse, ApiError>
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let at = query.alarm_time()?;
    let alarm = state.scheduler.schedule(at).await?;
    Ok(AlarmResponse::Created(Json(alarm.into())))
}

/// `PATCH /alarm?hour=H&minutes=M`
pub async fn update<C, A, P>(
    State(state): State<AppState<C, A, P>>,
    Query(query): Query<AlarmQuery>,
) -> Result<AlarmResponse, ApiError>
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let at = query.alarm_time()?;
    let alarm = state.scheduler.reschedule(at).await?;
    Ok(AlarmResponse::Ok(Json(alarm.into())))
}

/// `DELETE /alarm`
pub async fn delete<C, A, P>(
    State(state): State<AppState<C, A, P>>,
) -> Result<AlarmResponse, ApiError>
where
    C: Clock + Send + Sync + 'static,
    A: Actuator + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let alarm = state.scheduler.cancel().await?;
    Ok(AlarmResponse::Ok(Json(alarm.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(hour: Option<&str>, minutes: Option<&str>) -> AlarmQuery {
        AlarmQuery {
            hour: hour.map(String::from),
            minutes: minutes.map(String::from),
        }
    }

    #[test]
    fn should_parse_valid_attributes() {
        let at = query(Some("7"), Some("05")).alarm_time().unwrap();
        assert_eq!((at.hour(), at.minute()), (7, 5));
    }

    #[test]
    fn should_reject_missing_hour() {
        let err = query(None, Some("30")).alarm_time().unwrap_err();
        assert_eq!(err, ValidationError::MissingAttribute("hour"));
    }

    #[test]
    fn should_reject_missing_minutes() {
        let err = query(Some("7"), None).alarm_time().unwrap_err();
        assert_eq!(err, ValidationError::MissingAttribute("minutes"));
    }

    #[test]
    fn should_reject_non_numeric_attribute() {
        let err = query(Some("seven"), Some("0")).alarm_time().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidAttribute {
                name: "hour",
                value: "seven".to_string(),
            }
        );
    }

    #[test]
    fn should_reject_negative_and_empty_values() {
        assert!(matches!(
            query(Some("-1"), Some("0")).alarm_time(),
            Err(ValidationError::InvalidAttribute { name: "hour", .. })
        ));
        assert!(matches!(
            query(Some("7"), Some("")).alarm_time(),
            Err(ValidationError::InvalidAttribute { name: "minutes", .. })
        ));
    }

    #[test]
    fn should_reject_out_of_range_values() {
        assert_eq!(
            query(Some("24"), Some("0")).alarm_time(),
            Err(ValidationError::HourOutOfRange(24))
        );
        assert_eq!(
            query(Some("23"), Some("60")).alarm_time(),
            Err(ValidationError::MinuteOutOfRange(60))
        );
    }

    #[test]
    fn should_flatten_state_and_label_in_view() {
        let view = AlarmView::from(AlarmState::scheduled(AlarmTime::new(6, 45).unwrap()));
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["status"], "scheduled");
        assert_eq!(json["target"]["minute"], 45);
        assert_eq!(json["label"], "06:45");
    }
}
