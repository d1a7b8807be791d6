//! Business-related action handlers.

use log::{info, trace, warn};

use super::ActionContext;
use crate::{
    marshal::{
        ActionResponse, BusinessGetPayload, BusinessListPayload, BusinessPayload,
        BusinessUpdatePayload, CreatedResponse,
    },
    server::errors::ServerError,
    types::{CreateRequest, UpdateRequest},
};

/// Handler for all business-related actions.
pub struct BusinessActionHandler;

impl BusinessActionHandler {
    /// Lists the businesses in scope matching the optional filter.
    pub async fn list(
        ctx: &ActionContext,
        payload: BusinessListPayload,
    ) -> Result<ActionResponse, ServerError> {
        let scope = payload.scope()?;
        let filter = payload.filter()?;
        info!("listing businesses");
        trace!("scope: {:?}, filter: {:?}", scope, filter);

        let views = ctx.catalog.list(&scope, &filter).await?;

        Ok(ActionResponse::BusinessList(views))
    }

    pub async fn get(
        ctx: &ActionContext,
        payload: BusinessGetPayload,
    ) -> Result<ActionResponse, ServerError> {
        let id = payload.id()?;
        info!("requested business `{}`", id);

        let view = ctx.catalog.get(id).await?;

        Ok(ActionResponse::BusinessGet(Box::new(view)))
    }

    pub async fn create(
        ctx: &ActionContext,
        payload: BusinessPayload,
    ) -> Result<ActionResponse, ServerError> {
        let request = CreateRequest::try_from(payload)?;
        info!("requested business `{}` creation", request.root.name);

        let id = ctx.catalog.create(request).await?;

        Ok(ActionResponse::BusinessCreate(CreatedResponse { id }))
    }

    /// Updates a business.
    ///
    /// When a timeout is configured and elapses, the caller gets
    /// [`ServerError::Timeout`] while the already issued writes keep running.
    pub async fn update(
        ctx: &ActionContext,
        payload: BusinessUpdatePayload,
    ) -> Result<ActionResponse, ServerError> {
        let request = UpdateRequest::try_from(payload)?;
        let id = request.id;
        info!("requested business `{}` update", id);

        let update = ctx.catalog.apply_update(request);
        let report = match ctx.update_timeout {
            Some(timeout) => tokio::time::timeout(timeout, update).await.map_err(|_| {
                warn!("update of business `{}` timed out after {:?}", id, timeout);
                ServerError::Timeout {
                    id: id.to_string(),
                    timeout,
                }
            })??,
            None => update.await?,
        };

        trace!(
            "business `{}` updated: {:?} ({} storage calls)",
            id, report.sections, report.storage_calls
        );

        Ok(ActionResponse::BusinessUpdate(report))
    }
}
