use common::make_response;
use hyper::{Body, Response, StatusCode};
use serde::Serialize;
use serde_json::json;

pub fn ok<T: Serialize>(data: T) -> Response<Body> {
	make_response!(StatusCode::OK, json!({ "success": true, "data": data }))
}

pub fn created<T: Serialize>(data: T) -> Response<Body> {
	make_response!(StatusCode::CREATED, json!({ "success": true, "data": data }))
}

pub fn message(message: &str) -> Response<Body> {
	make_response!(StatusCode::OK, json!({ "success": true, "message": message }))
}
