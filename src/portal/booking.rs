//! Two-phase slot reservation
//!
//! The portal's own workflow is two-phase: an initiation POST that echoes
//! back a form key and an info token, then a confirmation POST that must
//! carry the echoed values plus parameters derived from the reservable
//! token. The remote server validates these structurally, so the field
//! derivation here follows the portal's encoding exactly.

use chrono::{NaiveDateTime, Timelike};
use lazy_static::lazy_static;
use scraper::{Html, Selector};

use super::{headers, PortalClient};
use crate::error::BookingError;
use crate::models::{ScheduleSnapshot, SessionToken};

/// Literal marker the portal embeds when the booking permit is granted
const CONFIRM_SUCCESS_MARKER: &str = "Official Permit";

/// Byte range of the reservable token that encodes the lane/court number
const COURT_RANGE: std::ops::Range<usize> = 6..8;

lazy_static! {
    static ref FRMK_INPUT: Selector =
        Selector::parse(r#"input[name="frmk"]"#).expect("invalid frmk selector");
    static ref P_INFO_INPUT: Selector =
        Selector::parse(r#"input[name="P_info"]"#).expect("invalid P_info selector");
}

/// Fields echoed by the initiation response, required by the confirm step
#[derive(Debug)]
struct EchoedFields {
    frmk: String,
    p_info: String,
}

impl PortalClient {
    /// Book a lane at the target instant using the given schedule snapshot
    ///
    /// Looks up the reservable token first; when the snapshot has no entry
    /// or no free lane for the instant, fails with `SlotUnavailable`
    /// without issuing any request. Otherwise runs the initiate/confirm
    /// transaction. No retry happens within the attempt.
    ///
    /// # Errors
    ///
    /// * `SlotUnavailable` - no reservable token for the target
    /// * `BookingRequestFailed` - initiation rejected or malformed token
    /// * `ConfirmationFailed` - permit not granted
    pub async fn book(
        &self,
        session: &SessionToken,
        target: NaiveDateTime,
        schedule: &ScheduleSnapshot,
    ) -> Result<(), BookingError> {
        let lane = schedule
            .token_for(target)
            .ok_or(BookingError::SlotUnavailable)?;
        let court = court_digits(lane)?;

        let echoed = self.initiate(session, lane).await?;
        self.confirm(session, target, lane, &court, &echoed).await
    }

    /// Step one: submit the reservable token to open the reservation
    async fn initiate(
        &self,
        session: &SessionToken,
        lane: &str,
    ) -> Result<EchoedFields, BookingError> {
        let form = [
            ("p_rec", lane),
            ("p1", self.credentials().matric()),
            ("p2", ""),
            ("p_info", self.config().facility_code.as_str()),
        ];

        let url = format!("{}/pls/webexe88/srce_sub1.srceb$sel32", self.config().base_url);
        let response = self
            .http()
            .post(&url)
            .headers(headers::browser_headers(&self.config().user_agent, session))
            .form(&form)
            .send()
            .await
            .map_err(|e| BookingError::request_failed(e.to_string()))?;

        tracing::debug!(status = response.status().as_u16(), "initiation response received");

        let body = response
            .text()
            .await
            .map_err(|e| BookingError::request_failed(e.to_string()))?;

        extract_echoed_fields(&body)
    }

    /// Step two: confirm with the echoed fields and derived parameters
    async fn confirm(
        &self,
        session: &SessionToken,
        target: NaiveDateTime,
        lane: &str,
        court: &str,
        echoed: &EchoedFields,
    ) -> Result<(), BookingError> {
        let fdate = target.format("%d-%b-%Y").to_string();
        let floc = format!("SP{court}");
        // Slot indices start at 1 for the 08:00 slot.
        let sno = (target.hour() as i64 - 7).to_string();
        let fcourt = court
            .parse::<u32>()
            .map_err(|_| {
                BookingError::request_failed(format!(
                    "lane token '{lane}' carries non-numeric court digits"
                ))
            })?
            .to_string();

        let form = [
            ("noaguest", "0"),
            ("frmfrom", "selfbook"),
            ("p1", self.credentials().matric()),
            ("p2", ""),
            ("fdate", fdate.as_str()),
            ("fcode", "SP"),
            ("floc", floc.as_str()),
            ("sno", sno.as_str()),
            ("stype", "D"),
            ("paytype", "CC"),
            ("fcourt", fcourt.as_str()),
            ("ftype", "2"),
            ("rptype", "2"),
            ("P_info", echoed.p_info.as_str()),
            ("opmode", "1"),
            ("frmk", echoed.frmk.as_str()),
            ("bOption", "Confirm"),
        ];

        let url = format!("{}/pls/webexe88/srce_sub1.srceb$sel33", self.config().base_url);
        let response = self
            .http()
            .post(&url)
            .headers(headers::browser_headers(&self.config().user_agent, session))
            .form(&form)
            .send()
            .await
            .map_err(|_| BookingError::ConfirmationFailed)?;

        tracing::debug!(status = response.status().as_u16(), "confirmation response received");

        let body = response
            .text()
            .await
            .map_err(|_| BookingError::ConfirmationFailed)?;

        if !body.contains(CONFIRM_SUCCESS_MARKER) {
            return Err(BookingError::ConfirmationFailed);
        }

        tracing::debug!(court = court, date = %fdate, "permit granted");
        Ok(())
    }
}

/// Pull the `frmk` and `P_info` input values out of the initiation response
fn extract_echoed_fields(body: &str) -> Result<EchoedFields, BookingError> {
    let document = Html::parse_document(body);

    let value_of = |selector: &Selector, name: &str| {
        document
            .select(selector)
            .next()
            .and_then(|input| input.value().attr("value"))
            .map(str::to_string)
            .ok_or_else(|| {
                BookingError::request_failed(format!("response is missing the {name} field"))
            })
    };

    Ok(EchoedFields {
        frmk: value_of(&FRMK_INPUT, "frmk")?,
        p_info: value_of(&P_INFO_INPUT, "P_info")?,
    })
}

/// Extract the two court digits embedded at a fixed offset of the token
fn court_digits(lane: &str) -> Result<String, BookingError> {
    lane.get(COURT_RANGE)
        .map(str::to_string)
        .ok_or_else(|| {
            BookingError::request_failed(format!(
                "lane token '{lane}' is too short to carry a court number"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_court_digits_fixed_offset() {
        assert_eq!(court_digits("060810042026").unwrap(), "04");
        assert_eq!(court_digits("12345678").unwrap(), "78");
    }

    #[test]
    fn test_court_digits_short_token() {
        let err = court_digits("1234").unwrap_err();
        assert!(matches!(err, BookingError::BookingRequestFailed { .. }));
    }

    #[test]
    fn test_extract_echoed_fields() {
        let body = r#"<html><body><form>
            <input type="hidden" name="frmk" value="KEY123">
            <input type="hidden" name="P_info" value="INFO456">
        </form></body></html>"#;
        let echoed = extract_echoed_fields(body).unwrap();
        assert_eq!(echoed.frmk, "KEY123");
        assert_eq!(echoed.p_info, "INFO456");
    }

    #[test]
    fn test_extract_echoed_fields_missing_frmk() {
        let body = r#"<html><body>Request rejected</body></html>"#;
        let err = extract_echoed_fields(body).unwrap_err();
        assert!(matches!(err, BookingError::BookingRequestFailed { .. }));
        assert!(err.to_string().contains("frmk"));
    }
}
