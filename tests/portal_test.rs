//! Portal client integration tests using wiremock
//!
//! These run the real client end to end against a mock portal: login,
//! schedule fetch, and the two-phase booking transaction.

use chrono::{NaiveDate, NaiveDateTime};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use poolbook::config::PortalConfig;
use poolbook::error::BookingError;
use poolbook::models::{Credentials, ScheduleSnapshot};
use poolbook::portal::PortalClient;

const LOGIN_PATH: &str = "/webexe88/owa/sso.asp";
const SCHEDULE_PATH: &str = "/pls/webexe88/srce_smain_s.srce$sel31_o";
const INITIATE_PATH: &str = "/pls/webexe88/srce_sub1.srceb$sel32";
const CONFIRM_PATH: &str = "/pls/webexe88/srce_sub1.srceb$sel33";

fn test_client(server: &MockServer) -> PortalClient {
    let config = PortalConfig {
        base_url: server.uri(),
        sso_url: server.uri(),
        login_domain: String::from("STUDENT"),
        facility_code: String::from("2SP225"),
        user_agent: String::from("poolbook-test"),
        request_timeout_secs: 5,
    };
    let credentials = Credentials::new("student", "secret-pin", "u1234567b");
    PortalClient::new(config, credentials).unwrap()
}

fn target(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// Login response carries the marker and a cookie set; the session token
/// must equal exactly that cookie set.
#[tokio::test]
async fn test_authenticate_success_captures_cookies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_string_contains("Domain=STUDENT"))
        .and(body_string_contains("UserName=student"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Generation completed</body></html>")
                .append_header("set-cookie", "A=1; Path=/; HttpOnly")
                .append_header("set-cookie", "B=2; Path=/"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let session = client.authenticate().await.unwrap();

    assert_eq!(session.len(), 2);
    assert_eq!(session.get("A"), Some("1"));
    assert_eq!(session.get("B"), Some("2"));
    assert_eq!(session.cookie_header(), "A=1;B=2");
}

/// A response without the marker means the login was rejected, even with
/// a 200 status.
#[tokio::test]
async fn test_authenticate_missing_marker_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Invalid login</body></html>"),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.authenticate().await.unwrap_err();

    assert!(matches!(err, BookingError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn test_authenticate_unreachable_fails() {
    let mock_server = MockServer::start().await;
    let client = test_client(&mock_server);
    drop(mock_server);

    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, BookingError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn test_fetch_schedule_sends_account_and_facility() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SCHEDULE_PATH))
        .and(query_param("p1", "U1234567B"))
        .and(query_param("p_info", "2SP225"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let session = sample_session();
    let page = client.fetch_schedule(&session).await.unwrap();

    assert_eq!(page, "<html></html>");
}

#[tokio::test]
async fn test_fetch_schedule_non_success_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SCHEDULE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.fetch_schedule(&sample_session()).await.unwrap_err();

    assert!(matches!(err, BookingError::ScheduleUnavailable { .. }));
}

/// A full slot must fail locally; the portal must not see any request.
#[tokio::test]
async fn test_book_unavailable_slot_sends_nothing() {
    let mock_server = MockServer::start().await;
    let client = test_client(&mock_server);

    let mut schedule = ScheduleSnapshot::new();
    schedule.record(target(6, 8), None);

    let err = client
        .book(&sample_session(), target(6, 8), &schedule)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::SlotUnavailable));

    // An instant the snapshot never saw behaves the same way.
    let err = client
        .book(&sample_session(), target(6, 12), &schedule)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::SlotUnavailable));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "no request may be issued for a full slot");
}

/// Happy path: initiate echoes the form key and info token, confirm grants
/// the permit, and the derived fields reach the portal intact.
#[tokio::test]
async fn test_book_two_phase_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INITIATE_PATH))
        .and(body_string_contains("p_rec=030810012026"))
        .and(body_string_contains("p1=U1234567B"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><form>
                <input type="hidden" name="frmk" value="KEY123">
                <input type="hidden" name="P_info" value="INFO456">
            </form></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(CONFIRM_PATH))
        .and(body_string_contains("frmk=KEY123"))
        .and(body_string_contains("P_info=INFO456"))
        .and(body_string_contains("fdate=03-Aug-2026"))
        .and(body_string_contains("floc=SP01"))
        .and(body_string_contains("fcourt=1"))
        .and(body_string_contains("sno=1"))
        .and(body_string_contains("bOption=Confirm"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Official Permit No. 42</body></html>"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut schedule = ScheduleSnapshot::new();
    schedule.record(target(3, 8), Some(String::from("030810012026")));

    client
        .book(&sample_session(), target(3, 8), &schedule)
        .await
        .unwrap();
}

/// Confirm without the permit marker fails, and no extra requests are
/// retried within the attempt.
#[tokio::test]
async fn test_book_confirmation_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INITIATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><form>
                <input type="hidden" name="frmk" value="KEY123">
                <input type="hidden" name="P_info" value="INFO456">
            </form></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(CONFIRM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("Invalid access."))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut schedule = ScheduleSnapshot::new();
    schedule.record(target(3, 8), Some(String::from("030810012026")));

    let err = client
        .book(&sample_session(), target(3, 8), &schedule)
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::ConfirmationFailed));
}

/// Initiate response missing the echoed fields stops the transaction
/// before the confirm step.
#[tokio::test]
async fn test_book_initiation_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(INITIATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Rejected</body></html>"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let mut schedule = ScheduleSnapshot::new();
    schedule.record(target(3, 8), Some(String::from("030810012026")));

    let err = client
        .book(&sample_session(), target(3, 8), &schedule)
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::BookingRequestFailed { .. }));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "confirm must not run after a rejected initiate");
}

fn sample_session() -> poolbook::models::SessionToken {
    let mut session = poolbook::models::SessionToken::new();
    session.insert("WISSESSION", "deadbeef");
    session
}
