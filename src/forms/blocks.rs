//! Payloads for the admin block endpoints.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::block::{BlockSource, NewAvailabilityBlock};
use crate::domain::types::{BlockId, StayDates, UnitId, parse_date};
use crate::forms::FormError;

/// `GET /api/blocks` filter.
#[derive(Debug, Default, Deserialize)]
pub struct BlocksQuery {
    pub unit_id: Option<i32>,
}

/// `DELETE /api/blocks?id=` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteBlockQuery {
    pub id: Option<i32>,
}

impl TryFrom<DeleteBlockQuery> for BlockId {
    type Error = FormError;

    fn try_from(query: DeleteBlockQuery) -> Result<Self, Self::Error> {
        let id = query
            .id
            .filter(|id| *id != 0)
            .ok_or(FormError::Required("id"))?;
        BlockId::new(id).map_err(|_| FormError::Required("id"))
    }
}

/// JSON body of `POST /api/blocks`.
#[derive(Debug, Deserialize)]
pub struct CreateBlockPayload {
    pub unit_id: Option<i32>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub source: Option<String>,
    pub note: Option<String>,
}

impl TryFrom<CreateBlockPayload> for NewAvailabilityBlock {
    type Error = FormError;

    fn try_from(payload: CreateBlockPayload) -> Result<Self, Self::Error> {
        let unit_id = UnitId::new(payload.unit_id.ok_or(FormError::Required("unit_id"))?)?;
        let dates = StayDates::parse(&payload.start_date, &payload.end_date)?;
        let source = payload
            .source
            .map(BlockSource::from)
            .unwrap_or(BlockSource::Manual);
        Ok(NewAvailabilityBlock::new(
            unit_id,
            dates,
            source,
            payload.note.unwrap_or_default(),
        ))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleAction {
    Block,
    Unblock,
}

/// JSON body of `POST /api/admin/toggle_day/{slug}`.
#[derive(Debug, Deserialize)]
pub struct ToggleDayPayload {
    #[serde(default)]
    pub date: String,
    pub action: Option<String>,
}

#[derive(Debug)]
pub struct ToggleDay {
    pub date: NaiveDate,
    pub action: ToggleAction,
}

impl TryFrom<ToggleDayPayload> for ToggleDay {
    type Error = FormError;

    fn try_from(payload: ToggleDayPayload) -> Result<Self, Self::Error> {
        let date = parse_date(&payload.date)?;
        let action = match payload
            .action
            .as_deref()
            .map(|a| a.trim().to_lowercase())
            .as_deref()
        {
            None | Some("block") => ToggleAction::Block,
            Some("unblock") => ToggleAction::Unblock,
            Some(_) => return Err(FormError::UnknownAction),
        };
        Ok(Self { date, action })
    }
}
