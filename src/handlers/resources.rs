// Generic resource-collection handlers. One handler set serves every
// resource type; the collection handle is bound into router state at
// registration time, never copy-pasted per resource.
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::Gateway;
use crate::error::ApiError;

/// The portfolio site's resource types and which operations each exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Portfolios,
    Resume,
    Skills,
    Contact,
    Blogs,
    Stats,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Portfolios,
        ResourceKind::Resume,
        ResourceKind::Skills,
        ResourceKind::Contact,
        ResourceKind::Blogs,
        ResourceKind::Stats,
    ];

    /// Collection name, which doubles as the URL segment under /api.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Portfolios => "portfolios",
            ResourceKind::Resume => "resume",
            ResourceKind::Skills => "skills",
            ResourceKind::Contact => "contact",
            ResourceKind::Blogs => "blogs",
            ResourceKind::Stats => "stats",
        }
    }

    /// Singular label used in not-found messages.
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Portfolios => "portfolio",
            ResourceKind::Resume => "resume entry",
            ResourceKind::Skills => "skill",
            ResourceKind::Contact => "contact message",
            ResourceKind::Blogs => "blog post",
            ResourceKind::Stats => "stat",
        }
    }

    /// Stats are read-only; everything else accepts submissions.
    fn supports_create(self) -> bool {
        !matches!(self, ResourceKind::Stats)
    }

    /// Update/delete by identifier; contact, blogs and stats are
    /// append-or-read-only surfaces.
    fn supports_item_ops(self) -> bool {
        matches!(
            self,
            ResourceKind::Portfolios | ResourceKind::Resume | ResourceKind::Skills
        )
    }
}

/// Per-resource router state: the kind plus its bound collection handle.
#[derive(Clone)]
pub struct ResourceContext {
    kind: ResourceKind,
    collection: crate::db::Collection,
}

/// Register the routes one resource exposes, with its collection handle
/// bound as router state.
pub fn routes(gateway: &Gateway, kind: ResourceKind) -> Router {
    let ctx = ResourceContext {
        kind,
        collection: gateway.collection(kind.name()),
    };

    let base = format!("/api/{}", kind.name());

    let mut collection_routes = get(list);
    if kind.supports_create() {
        collection_routes = collection_routes.post(create);
    }

    let mut router = Router::new().route(&base, collection_routes);
    if kind.supports_item_ops() {
        router = router.route(&format!("{}/:id", base), put(update).delete(remove));
    }

    router.with_state(ctx)
}

/// GET /api/{resource} - the whole collection as a bare JSON array
async fn list(State(ctx): State<ResourceContext>) -> Result<Json<Vec<Value>>, ApiError> {
    let docs = ctx.collection.find_all().await?;
    Ok(Json(docs))
}

/// POST /api/{resource} - store the body verbatim as a new document
async fn create(
    State(ctx): State<ResourceContext>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = ctx.collection.insert_one(payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "insertedId": id }))))
}

/// PUT /api/{resource}/{id} - merge-update the matching document
async fn update(
    State(ctx): State<ResourceContext>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    // An unparseable identifier cannot match any document.
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::not_found(format!("{} not found", ctx.kind.label())))?;

    let outcome = ctx.collection.update_one(id, payload).await?;
    if outcome.matched == 0 {
        return Err(ApiError::not_found(format!("{} not found", ctx.kind.label())));
    }
    Ok(Json(json!({ "matched": outcome.matched })))
}

/// DELETE /api/{resource}/{id} - remove the match; reports the count
/// whether or not anything matched
async fn remove(
    State(ctx): State<ResourceContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(Json(json!({ "deletedCount": 0 })));
    };

    let outcome = ctx.collection.delete_one(id).await?;
    Ok(Json(json!({ "deletedCount": outcome.deleted })))
}
