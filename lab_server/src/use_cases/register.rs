use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::{RegistrationMode, SessionMarker, SessionRecord, SessionStatus};
use crate::domain::errors::{LabError, ValidationError};
use crate::domain::ports::{Clock, MarkerStore, SessionStore};
use crate::interface_adapters::protocol::RegisterRequest;

// Client clocks are allowed to run slightly ahead of the server.
const MAX_CHECK_IN_SKEW_MINUTES: i64 = 5;
const MIN_NAME_LEN: usize = 2;

// Response returned by the register use case.
pub struct RegisterResponse {
    pub session_id: String,
    pub name: String,
    pub checked_in_at: NaiveDateTime,
}

// Check-in use case with injected dependencies.
pub struct RegisterUseCase<C, S, M> {
    pub clock: C,
    pub store: S,
    pub marker: M,
    pub mode: RegistrationMode,
}

// Validated, normalized check-in fields.
struct CheckIn {
    register_no: String,
    name: String,
    department: String,
    system_no: String,
    checked_in_at: NaiveDateTime,
}

impl<C, S, M> RegisterUseCase<C, S, M>
where
    C: Clock,
    S: SessionStore,
    M: MarkerStore,
{
    pub async fn execute(&self, payload: RegisterRequest) -> Result<RegisterResponse, LabError> {
        let check_in = validate(payload, self.mode, self.clock.now())?;

        let session_id = Uuid::new_v4().to_string();
        let record = SessionRecord {
            session_id: session_id.clone(),
            register_no: check_in.register_no.clone(),
            name: check_in.name.clone(),
            department: check_in.department,
            system_no: check_in.system_no,
            checked_in_at: check_in.checked_in_at,
            checked_out_at: None,
            status: SessionStatus::Active,
        };
        if self.mode.rejects_duplicate_active() {
            if !self.store.insert_unless_active(record).await? {
                return Err(LabError::Conflict);
            }
        } else {
            self.store.insert(record).await?;
        }

        // The record is already durable; a stale marker only weakens auto-logout.
        let marker = SessionMarker {
            session_id: session_id.clone(),
            register_no: Some(check_in.register_no),
            name: Some(check_in.name.clone()),
        };
        if let Err(err) = self
            .marker
            .write(marker.encode(self.mode.marker_format()))
            .await
        {
            warn!(error = %err, %session_id, "failed to write session marker");
        }

        Ok(RegisterResponse {
            session_id,
            name: check_in.name,
            checked_in_at: check_in.checked_in_at,
        })
    }
}

fn validate(
    payload: RegisterRequest,
    mode: RegistrationMode,
    now: NaiveDateTime,
) -> Result<CheckIn, ValidationError> {
    let format = mode.identity_format();
    let register_no = format
        .normalize(&payload.register_no)
        .ok_or(ValidationError::RegisterNo(format))?;

    let name = payload.name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::Name);
    }

    let department = payload.department.trim();
    if department.is_empty() {
        return Err(ValidationError::Department);
    }

    let system_no = payload.system_no.trim();
    if system_no.is_empty() {
        return Err(ValidationError::SystemNo);
    }

    let checked_in_at = parse_check_in(payload.in_date.as_deref(), payload.in_time.as_deref())?
        .unwrap_or(now);
    if checked_in_at > now + Duration::minutes(MAX_CHECK_IN_SKEW_MINUTES) {
        return Err(ValidationError::CheckInInFuture);
    }

    Ok(CheckIn {
        register_no,
        name: name.to_string(),
        department: department.to_string(),
        system_no: system_no.to_string(),
        checked_in_at,
    })
}

// Both parts or neither; blank strings count as absent.
fn parse_check_in(
    date: Option<&str>,
    time: Option<&str>,
) -> Result<Option<NaiveDateTime>, ValidationError> {
    let date = date.map(str::trim).filter(|value| !value.is_empty());
    let time = time.map(str::trim).filter(|value| !value.is_empty());

    match (date, time) {
        (None, None) => Ok(None),
        (Some(date), Some(time)) => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| ValidationError::CheckInTime)?;
            let time = NaiveTime::parse_from_str(time, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
                .map_err(|_| ValidationError::CheckInTime)?;
            Ok(Some(date.and_time(time)))
        }
        _ => Err(ValidationError::CheckInTime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::IdentityFormat;
    use std::sync::Arc;
    use crate::use_cases::test_support::{
        FailureFlags, FixedClock, MemoryMarker, RecordingStore, active_record, at,
    };

    fn use_case(
        mode: RegistrationMode,
        store: RecordingStore,
        marker: MemoryMarker,
    ) -> RegisterUseCase<FixedClock, RecordingStore, MemoryMarker> {
        RegisterUseCase {
            clock: FixedClock(at(2025, 3, 10, 9, 30, 0)),
            store,
            marker,
            mode,
        }
    }

    fn request(register_no: &str) -> RegisterRequest {
        RegisterRequest {
            register_no: register_no.to_string(),
            name: "Test User".to_string(),
            department: "CS".to_string(),
            system_no: "Lab1".to_string(),
            in_date: None,
            in_time: None,
        }
    }

    #[tokio::test]
    async fn when_payload_is_valid_then_active_record_and_marker_are_stored() {
        let store = RecordingStore::new();
        let marker = MemoryMarker::new();
        let use_case = use_case(RegistrationMode::Alphanumeric12, store.clone(), marker.clone());

        let result = use_case
            .execute(request("AB12CD34EF56"))
            .await
            .expect("expected registration to succeed");

        assert_eq!(result.name, "Test User");
        let saved = store
            .get_test_record(&result.session_id)
            .expect("expected record to be stored");
        assert_eq!(saved.status, SessionStatus::Active);
        assert_eq!(saved.checked_out_at, None);
        assert_eq!(saved.checked_in_at, at(2025, 3, 10, 9, 30, 0));
        assert_eq!(
            marker.raw().as_deref(),
            Some(format!("{}|AB12CD34EF56|Test User", result.session_id).as_str())
        );
    }

    #[tokio::test]
    async fn when_register_no_is_lowercase_then_it_is_stored_uppercased() {
        let store = RecordingStore::new();
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            store.clone(),
            MemoryMarker::new(),
        );

        let result = use_case
            .execute(request("ab12cd34ef56"))
            .await
            .expect("expected registration to succeed");

        let saved = store.get_test_record(&result.session_id).expect("record");
        assert_eq!(saved.register_no, "AB12CD34EF56");
    }

    #[tokio::test]
    async fn when_register_no_has_wrong_shape_then_nothing_is_stored() {
        let store = RecordingStore::new();
        let marker = MemoryMarker::new();
        let use_case = use_case(RegistrationMode::Alphanumeric12, store.clone(), marker.clone());

        for bad in ["", "AB12CD34EF5", "AB12CD34EF567", "AB12CD34EF5!", "12345678"] {
            let result = use_case.execute(request(bad)).await;
            assert!(
                matches!(
                    result,
                    Err(LabError::Validation(ValidationError::RegisterNo(
                        IdentityFormat::Alphanumeric12
                    )))
                ),
                "expected {bad:?} to be rejected"
            );
        }

        assert!(store.records().is_empty());
        assert_eq!(marker.raw(), None);
    }

    #[tokio::test]
    async fn when_numeric_mode_gets_seven_digits_then_returns_validation_error_without_marker() {
        let store = RecordingStore::new();
        let marker = MemoryMarker::new();
        let use_case = use_case(RegistrationMode::Numeric8, store.clone(), marker.clone());

        let result = use_case.execute(request("1234567")).await;

        assert!(matches!(
            result,
            Err(LabError::Validation(ValidationError::RegisterNo(IdentityFormat::Numeric8)))
        ));
        assert!(store.records().is_empty());
        assert_eq!(marker.raw(), None);
    }

    #[tokio::test]
    async fn when_numeric_mode_registers_then_marker_holds_only_session_id() {
        let marker = MemoryMarker::new();
        let use_case = use_case(RegistrationMode::Numeric8, RecordingStore::new(), marker.clone());

        let result = use_case
            .execute(request("12345678"))
            .await
            .expect("expected registration to succeed");

        assert_eq!(marker.raw(), Some(result.session_id));
    }

    #[tokio::test]
    async fn when_name_is_one_character_then_returns_invalid_name() {
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            RecordingStore::new(),
            MemoryMarker::new(),
        );
        let mut payload = request("AB12CD34EF56");
        payload.name = " A ".to_string();

        let result = use_case.execute(payload).await;

        assert!(matches!(result, Err(LabError::Validation(ValidationError::Name))));
    }

    #[tokio::test]
    async fn when_several_fields_are_invalid_then_first_rule_is_reported() {
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            RecordingStore::new(),
            MemoryMarker::new(),
        );
        let payload = RegisterRequest {
            register_no: "AB12CD34EF56".to_string(),
            name: "Test User".to_string(),
            department: "  ".to_string(),
            system_no: String::new(),
            in_date: None,
            in_time: None,
        };

        let result = use_case.execute(payload).await;

        assert!(matches!(
            result,
            Err(LabError::Validation(ValidationError::Department))
        ));
    }

    #[tokio::test]
    async fn when_system_no_is_blank_then_returns_invalid_system_no() {
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            RecordingStore::new(),
            MemoryMarker::new(),
        );
        let mut payload = request("AB12CD34EF56");
        payload.system_no = "   ".to_string();

        let result = use_case.execute(payload).await;

        assert!(matches!(result, Err(LabError::Validation(ValidationError::SystemNo))));
    }

    #[tokio::test]
    async fn when_check_in_is_supplied_then_it_is_used_as_given() {
        let store = RecordingStore::new();
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            store.clone(),
            MemoryMarker::new(),
        );
        let mut payload = request("AB12CD34EF56");
        payload.in_date = Some("2025-03-10".to_string());
        payload.in_time = Some("09:15".to_string());

        let result = use_case
            .execute(payload)
            .await
            .expect("expected registration to succeed");

        assert_eq!(result.checked_in_at, at(2025, 3, 10, 9, 15, 0));
    }

    #[tokio::test]
    async fn when_only_check_in_date_is_supplied_then_returns_invalid_check_in() {
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            RecordingStore::new(),
            MemoryMarker::new(),
        );
        let mut payload = request("AB12CD34EF56");
        payload.in_date = Some("2025-03-10".to_string());

        let result = use_case.execute(payload).await;

        assert!(matches!(
            result,
            Err(LabError::Validation(ValidationError::CheckInTime))
        ));
    }

    #[tokio::test]
    async fn when_check_in_is_far_in_the_future_then_returns_check_in_in_future() {
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            RecordingStore::new(),
            MemoryMarker::new(),
        );
        let mut payload = request("AB12CD34EF56");
        payload.in_date = Some("2025-03-10".to_string());
        payload.in_time = Some("10:00:00".to_string());

        let result = use_case.execute(payload).await;

        assert!(matches!(
            result,
            Err(LabError::Validation(ValidationError::CheckInInFuture))
        ));
    }

    #[tokio::test]
    async fn when_strict_mode_sees_active_session_then_returns_conflict() {
        let store = RecordingStore::new();
        store.insert_test_record(active_record(
            "existing",
            "AB12CD34EF56",
            at(2025, 3, 10, 8, 0, 0),
        ));
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            store.clone(),
            MemoryMarker::new(),
        );

        let result = use_case.execute(request("AB12CD34EF56")).await;

        assert!(matches!(result, Err(LabError::Conflict)));
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn when_numeric_mode_sees_active_session_then_second_record_is_created() {
        let store = RecordingStore::new();
        store.insert_test_record(active_record("existing", "12345678", at(2025, 3, 10, 8, 0, 0)));
        let use_case = use_case(RegistrationMode::Numeric8, store.clone(), MemoryMarker::new());

        let result = use_case
            .execute(request("12345678"))
            .await
            .expect("expected duplicate registration to be allowed");

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_ne!(result.session_id, "existing");
        assert!(records.iter().all(SessionRecord::is_active));
    }

    #[tokio::test]
    async fn when_store_insert_fails_then_returns_persistence_error() {
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            RecordingStore::new().with_failures(FailureFlags {
                insert: true,
                ..Default::default()
            }),
            MemoryMarker::new(),
        );

        let result = use_case.execute(request("AB12CD34EF56")).await;

        assert!(matches!(result, Err(LabError::Persistence(_))));
    }

    #[tokio::test]
    async fn when_active_lookup_fails_then_nothing_is_stored() {
        let store = RecordingStore::new().with_failures(FailureFlags {
            find: true,
            ..Default::default()
        });
        let marker = MemoryMarker::new();
        let use_case = use_case(RegistrationMode::Alphanumeric12, store.clone(), marker.clone());

        let result = use_case.execute(request("AB12CD34EF56")).await;

        assert!(matches!(result, Err(LabError::Persistence(_))));
        assert!(store.records().is_empty());
        assert_eq!(marker.raw(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn when_same_identity_registers_concurrently_then_only_one_is_admitted() {
        let store = RecordingStore::new();
        let use_case = Arc::new(use_case(
            RegistrationMode::Alphanumeric12,
            store.clone(),
            MemoryMarker::new(),
        ));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let use_case = use_case.clone();
            tasks.spawn(async move { use_case.execute(request("AB12CD34EF56")).await });
        }
        let (mut admitted, mut conflicts) = (0, 0);
        while let Some(joined) = tasks.join_next().await {
            match joined.expect("task") {
                Ok(_) => admitted += 1,
                Err(LabError::Conflict) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!((admitted, conflicts), (1, 7));
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn when_marker_write_fails_then_registration_still_succeeds() {
        let store = RecordingStore::new();
        let use_case = use_case(
            RegistrationMode::Alphanumeric12,
            store.clone(),
            MemoryMarker::failing(),
        );

        let result = use_case
            .execute(request("AB12CD34EF56"))
            .await
            .expect("expected registration to succeed without a marker");

        assert!(store.get_test_record(&result.session_id).is_some());
    }

    #[tokio::test]
    async fn when_two_sessions_register_then_identifiers_differ() {
        let use_case = use_case(
            RegistrationMode::Numeric8,
            RecordingStore::new(),
            MemoryMarker::new(),
        );

        let first = use_case.execute(request("12345678")).await.expect("first");
        let second = use_case.execute(request("87654321")).await.expect("second");

        assert_ne!(first.session_id, second.session_id);
    }
}
