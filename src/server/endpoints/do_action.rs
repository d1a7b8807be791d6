use log::debug;

use super::actions::{ActionContext, BusinessActionHandler};
use crate::{
    marshal::{ActionRequest, ActionResponse},
    server::errors::ServerError,
};

pub async fn do_action(
    ctx: &ActionContext,
    action: ActionRequest,
) -> Result<ActionResponse, ServerError> {
    debug!("dispatching action `{}`", action.name());

    match action {
        ActionRequest::BusinessList(data) => BusinessActionHandler::list(ctx, data).await,
        ActionRequest::BusinessGet(data) => BusinessActionHandler::get(ctx, data).await,
        ActionRequest::BusinessCreate(data) => BusinessActionHandler::create(ctx, *data).await,
        ActionRequest::BusinessUpdate(data) => BusinessActionHandler::update(ctx, *data).await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::repo::{self, Call, ChildKind, FacadeError, testing};
    use crate::types::Section;

    async fn call(
        ctx: &ActionContext,
        name: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, ServerError> {
        let raw = serde_json::to_vec(&body).unwrap();
        let action = ActionRequest::try_new(name, &raw)?;
        let response = do_action(ctx, action).await?;
        Ok(serde_json::to_value(&response).unwrap())
    }

    #[tokio::test]
    async fn cafe_azul_round_trip() {
        let store = testing::store();
        let ctx = ActionContext::new(store.clone()).with_update_timeout(None);

        let created = call(
            &ctx,
            "business_create",
            serde_json::json!({ "name": "Cafe Azul", "region": "Atlántida" }),
        )
        .await
        .unwrap();
        let id = created["id"].as_str().unwrap().to_owned();

        let report = call(
            &ctx,
            "business_update",
            serde_json::json!({
                "id": id,
                "name": "Cafe Azul",
                "amenities": ["wifi", "parking"],
                "coordinates": { "lat": 16.3, "lng": -86.5 }
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            report["sections"],
            serde_json::json!(["business", "coordinates", "amenities"])
        );
        assert_eq!(report["storage_calls"], 5);

        let view = call(&ctx, "business_get", serde_json::json!({ "id": id }))
            .await
            .unwrap();
        assert_eq!(view["name"], "Cafe Azul");
        assert_eq!(view["amenities"], serde_json::json!(["wifi", "parking"]));
        assert_eq!(view["coordinates"], serde_json::json!({ "lat": 16.3, "lng": -86.5 }));
        assert_eq!(view["schedule"].as_array().map(Vec::len), Some(7));
        assert_eq!(view["schedule"][0]["closed"], true);

        let listed = call(
            &ctx,
            "business_list",
            serde_json::json!({ "filter": { "text": "atlantida", "amenities": ["parking"] } }),
        )
        .await
        .unwrap();
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn invalid_requests_never_reach_storage() {
        let store = testing::store();
        let ctx = ActionContext::new(store.clone());

        let err = call(
            &ctx,
            "business_update",
            serde_json::json!({ "id": "not-a-uuid", "name": "Cafe Azul" }),
        )
        .await
        .unwrap_err();

        assert!(err.is_client_error());
        assert!(store.journal().is_empty());
    }

    #[tokio::test]
    async fn unknown_business() {
        let ctx = ActionContext::new(testing::store());

        let err = call(
            &ctx,
            "business_update",
            serde_json::json!({ "id": "0f8fad5b-d9cb-469f-a165-70867728950e", "name": "Nadie" }),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ServerError::FacadeError(FacadeError::BusinessNotFound(_))
        ));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn failed_update_reports_first_error() {
        let store = testing::store();
        let id = testing::seed(&store, "Cafe Azul").await;
        store.fail_on(Call::Delete(ChildKind::Gallery), "gallery offline");

        let ctx = ActionContext::new(store.clone());
        let err = call(
            &ctx,
            "business_update",
            serde_json::json!({ "id": id, "name": "Cafe Azul", "gallery": [] }),
        )
        .await
        .unwrap_err();

        match &err {
            ServerError::FacadeError(FacadeError::AggregateError(e)) => {
                assert_eq!(e.section, Section::Gallery);
                assert!(matches!(e.source, repo::Error::Unavailable(_)));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(err.message(), "storage unavailable :: gallery offline");
    }

    #[tokio::test]
    async fn slow_update_times_out_but_completes() {
        let store = testing::store();
        let id = testing::seed(&store, "Cafe Azul").await;
        let gate = store.hold(Call::Delete(ChildKind::Amenities));

        let ctx = ActionContext::new(store.clone())
            .with_update_timeout(Some(Duration::from_millis(20)));
        let err = call(
            &ctx,
            "business_update",
            serde_json::json!({ "id": id, "name": "Cafe Azul", "amenities": ["wifi"] }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServerError::Timeout { .. }));

        gate.release();
        testing::wait_for(|| store.snapshot().amenities.len() == 1).await;
    }
}
