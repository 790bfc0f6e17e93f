//! Administrative blocking of dates.

use crate::domain::block::{AvailabilityBlock, NewAvailabilityBlock};
use crate::domain::types::{BlockId, StayDates, UnitId};
use crate::forms::blocks::{
    BlocksQuery, CreateBlockPayload, DeleteBlockQuery, ToggleAction, ToggleDay, ToggleDayPayload,
};
use crate::repository::{BlockListQuery, BlockReader, BlockWriter, GroupReader};
use crate::services::notify::{Notifier, send_alert};
use crate::services::{ServiceError, ServiceResult};

/// Blocks ordered by start date, newest first, optionally for one unit.
pub fn list_blocks<R>(repo: &R, query: BlocksQuery) -> ServiceResult<Vec<AvailabilityBlock>>
where
    R: BlockReader + ?Sized,
{
    let mut list_query = BlockListQuery::new();
    if let Some(unit_id) = query.unit_id.and_then(|id| UnitId::new(id).ok()) {
        list_query = list_query.unit(unit_id);
    }
    Ok(repo.list_blocks(list_query)?)
}

/// Store a block and alert the operator.
pub async fn create_block<R, N>(
    repo: &R,
    notifier: &N,
    alert_to: &str,
    payload: CreateBlockPayload,
) -> ServiceResult<AvailabilityBlock>
where
    R: BlockWriter + ?Sized,
    N: Notifier + ?Sized,
{
    let new_block = NewAvailabilityBlock::try_from(payload)?;
    let block = repo.create_block(&new_block).map_err(|err| {
        log::error!("Failed to create block: {err}");
        err
    })?;

    let body = format!(
        "Unit {}: {}–{} ({}) {}",
        block.unit_id, block.start_date, block.end_date, block.source, block.note
    );
    send_alert(notifier, alert_to, "New Manual Block", &body).await;

    Ok(block)
}

/// Delete by id. Deleting an unknown id succeeds.
pub fn delete_block<R>(repo: &R, query: DeleteBlockQuery) -> ServiceResult<()>
where
    R: BlockWriter + ?Sized,
{
    let id = BlockId::try_from(query)?;
    repo.delete_block(id)?;
    Ok(())
}

/// Block or unblock one night on every unit of a property group.
pub fn toggle_day<R>(repo: &R, slug: &str, payload: ToggleDayPayload) -> ServiceResult<ToggleAction>
where
    R: GroupReader + BlockWriter + ?Sized,
{
    let group = repo.get_group(slug)?.ok_or(ServiceError::NotFound)?;
    if group.unit_ids.is_empty() {
        return Err(ServiceError::Form("no units linked".to_string()));
    }

    let toggle = ToggleDay::try_from(payload)?;
    let night = StayDates::single_night(toggle.date);

    match toggle.action {
        ToggleAction::Block => {
            let note = format!("admin calendar ({slug})");
            repo.block_day(&group.unit_ids, &night, &note)?;
        }
        ToggleAction::Unblock => {
            repo.unblock_day(&group.unit_ids, &night)?;
        }
    }

    Ok(toggle.action)
}
