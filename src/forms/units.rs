//! Unit feed updates and CSV import.

use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;

use crate::domain::types::IcalUrl;
use crate::domain::unit::NewUnit;
use crate::forms::FormError;

/// JSON body of `POST /api/unit/{id}/ical`.
#[derive(Debug, Default, Deserialize)]
pub struct IcalUrlPayload {
    #[serde(default)]
    pub ical_url: String,
}

impl TryFrom<IcalUrlPayload> for IcalUrl {
    type Error = FormError;

    fn try_from(payload: IcalUrlPayload) -> Result<Self, Self::Error> {
        IcalUrl::new(payload.ical_url).map_err(|_| FormError::InvalidUrl)
    }
}

#[derive(MultipartForm)]
pub struct UploadUnitsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

#[derive(Debug, Deserialize)]
struct UnitCsvRecord {
    #[serde(rename = "OTA Name")]
    ota: String,
    #[serde(rename = "Property ID / Room ID")]
    property_id: String,
    #[serde(rename = "iCal URL", default)]
    ical_url: String,
}

/// Read one unit per CSV row. Rows without an OTA name are rejected.
pub fn parse_units_csv<R: Read>(reader: R) -> Result<Vec<NewUnit>, FormError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    rdr.deserialize::<UnitCsvRecord>()
        .enumerate()
        .map(|(index, record)| {
            let record = record.map_err(|e| FormError::Csv(e.to_string()))?;
            if record.ota.trim().is_empty() {
                // header is line 1
                return Err(FormError::Csv(format!("line {}: OTA Name required", index + 2)));
            }
            Ok(NewUnit::new(
                record.ota,
                record.property_id,
                Some(record.ical_url),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_drops_blank_urls() {
        let raw = "OTA Name,Property ID / Room ID,iCal URL\n\
Airbnb,123,https://airbnb.example/ical/123.ics\n\
Agoda,A-9,\n";
        let units = parse_units_csv(raw.as_bytes()).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].ota, "Airbnb");
        assert_eq!(
            units[0].ical_url.as_deref(),
            Some("https://airbnb.example/ical/123.ics")
        );
        assert!(units[1].ical_url.is_none());
    }

    #[test]
    fn blank_ota_name_is_rejected() {
        let raw = "OTA Name,Property ID / Room ID,iCal URL\n\
Airbnb,1,\n\
 ,2,\n";
        match parse_units_csv(raw.as_bytes()) {
            Err(FormError::Csv(message)) => assert!(message.starts_with("line 3")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_an_error() {
        let raw = "OTA,Property\nAirbnb,1\n";
        assert!(matches!(
            parse_units_csv(raw.as_bytes()),
            Err(FormError::Csv(_))
        ));
    }

    #[test]
    fn ical_payload_requires_http() {
        assert!(
            IcalUrl::try_from(IcalUrlPayload {
                ical_url: "ftp://x".into()
            })
            .is_err()
        );
        assert!(
            IcalUrl::try_from(IcalUrlPayload {
                ical_url: " HTTPS://x/cal.ics ".into()
            })
            .is_ok()
        );
    }
}
