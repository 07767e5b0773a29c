use hyper::{Body, Request, Response};
use serde_json::json;

use crate::api::error::Result;
use crate::api::response::ok;
use crate::global::ApiGlobal;
use common::http::ext::*;

pub async fn get<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;

	let database = sqlx::query("SELECT 1").execute(global.db().as_ref()).await.is_ok();

	Ok(ok(json!({
		"status": "ok",
		"database": database,
	})))
}
