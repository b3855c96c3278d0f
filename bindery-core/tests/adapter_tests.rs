//! End-to-end behavior of bound handlers: envelopes, trailing errors,
//! panics and explicit responses.

use bindery_core::{
    bind, Adapter, AdapterConfig, Bind, Context, Envelope, EnvelopeStyle, ErrorInfo, Handler,
    HttpRequest, HttpResponse, Json, RequestContext, Router, Status,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize, Deserialize)]
struct User {
    #[serde(rename = "Name")]
    name: String,
}

impl bindery_validation::Validate for User {}

fn body(response: &HttpResponse) -> Value {
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type(), Some("application/json"));
    serde_json::from_slice(&response.body).expect("envelope is JSON")
}

fn get(path: &str) -> HttpRequest {
    HttpRequest::new("GET", path)
}

#[tokio::test]
async fn zero_params_zero_returns_is_empty_success() {
    async fn noop() {}
    let response = bind(noop).unwrap().call(get("/")).await;
    assert_eq!(body(&response), json!({"success": true}));
}

#[tokio::test]
async fn context_returning_user_and_nil_error() {
    async fn show(_ctx: Context) -> Result<Json<User>, Status> {
        Ok(Json(User { name: "a".into() }))
    }
    let response = bind(show).unwrap().call(get("/")).await;
    assert_eq!(body(&response), json!({"success": true, "data": {"Name": "a"}}));
}

#[tokio::test]
async fn context_returning_business_error() {
    async fn fail(_ctx: Context) -> Status {
        Status::new("X1", "bad")
    }
    let response = bind(fail).unwrap().call(get("/")).await;
    assert_eq!(
        body(&response),
        json!({"success": false, "error": {"code": "X1", "message": "bad"}})
    );
}

#[tokio::test]
async fn result_unit_error_path() {
    async fn fail(_ctx: Context) -> Result<(), Status> {
        Err(Status::new("X1", "bad"))
    }
    let response = bind(fail).unwrap().call(get("/")).await;
    assert_eq!(
        body(&response),
        json!({"success": false, "error": {"code": "X1", "message": "bad"}})
    );
}

#[tokio::test]
async fn trailing_error_discards_preceding_values() {
    async fn pair() -> (Json<i32>, Json<&'static str>, Option<Status>) {
        (Json(1), Json("a"), Some(Status::new("E2", "second failed")))
    }
    let response = bind(pair).unwrap().call(get("/")).await;
    let body = body(&response);
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
    assert_eq!(body["error"]["code"], "E2");
}

#[tokio::test]
async fn trailing_nil_error_returns_ordered_values() {
    async fn pair() -> (Json<i32>, Json<&'static str>, Option<Status>) {
        (Json(1), Json("a"), None)
    }
    let response = bind(pair).unwrap().call(get("/")).await;
    assert_eq!(body(&response), json!({"success": true, "data": [1, "a"]}));
}

#[tokio::test]
async fn result_of_tuple_follows_trailing_error_convention() {
    async fn ok() -> Result<(i32, String), Status> {
        Ok((1, "a".into()))
    }
    async fn err() -> Result<(i32, String), Status> {
        Err(Status::new(40001, "nope"))
    }
    let response = bind(ok).unwrap().call(get("/")).await;
    assert_eq!(body(&response)["data"], json!([1, "a"]));

    let response = bind(err).unwrap().call(get("/")).await;
    assert_eq!(
        body(&response),
        json!({"success": false, "error": {"code": 40001, "message": "nope"}})
    );
}

#[tokio::test]
async fn returned_envelope_is_not_rewrapped() {
    fn custom() -> Envelope {
        Envelope {
            success: false,
            data: Some(json!({"partial": true})),
            error: Some(ErrorInfo::new("CUSTOM", "handled elsewhere")),
        }
    }
    let response = bind(|| async { custom() }).unwrap().call(get("/")).await;
    assert_eq!(body(&response), serde_json::to_value(custom()).unwrap());
}

#[tokio::test]
async fn envelope_inside_ok_is_not_rewrapped() {
    async fn wrapped() -> Result<Envelope, Status> {
        Ok(Envelope::success(json!({"x": 1})))
    }
    let response = bind(wrapped).unwrap().call(get("/")).await;
    assert_eq!(body(&response), json!({"success": true, "data": {"x": 1}}));
}

#[tokio::test]
async fn string_panic_yields_one_error_envelope() {
    async fn boom() -> String {
        panic!("kaboom")
    }
    let handler = bind(boom).unwrap();
    let response = handler.call(get("/")).await;
    assert_eq!(
        body(&response),
        json!({"success": false, "error": {"code": "PANIC", "message": "kaboom"}})
    );

    // The handler stays usable after a panic.
    let again = handler.call(get("/")).await;
    assert_eq!(body(&again)["error"]["message"], "kaboom");
}

#[tokio::test]
async fn formatted_panic_message_is_kept() {
    let handler = bind(|| async {
        let items: Vec<i32> = Vec::new();
        if items.is_empty() {
            panic!("index {} out of range", 3);
        }
        Json(items)
    })
    .unwrap();
    let response = handler.call(get("/")).await;
    assert_eq!(body(&response)["error"]["message"], "index 3 out of range");
}

#[tokio::test]
async fn explicit_response_is_not_wrapped() {
    async fn page(raw: RequestContext) {
        raw.respond(200, "text/html", "<p>hi</p>");
    }
    let response = bind(page).unwrap().call(get("/")).await;
    assert_eq!(response.content_type(), Some("text/html"));
    assert_eq!(response.body, b"<p>hi</p>");
}

#[tokio::test]
async fn explicit_response_is_replaced_by_error() {
    async fn page(raw: RequestContext) -> Result<(), Status> {
        raw.respond(200, "text/html", "<p>partial");
        Err(Status::new("RENDER", "template failed"))
    }
    let response = bind(page).unwrap().call(get("/")).await;
    assert_eq!(body(&response)["error"]["code"], "RENDER");
}

#[tokio::test]
async fn content_type_header_alone_still_gets_an_envelope() {
    async fn labelled(raw: RequestContext) -> &'static str {
        raw.set_header("Content-Type", "application/json");
        "payload"
    }
    let response = bind(labelled).unwrap().call(get("/")).await;
    assert_eq!(body(&response), json!({"success": true, "data": "payload"}));
}

#[tokio::test]
async fn handler_headers_are_kept_on_envelopes() {
    async fn tagged(raw: RequestContext) -> &'static str {
        raw.set_header("X-Trace", "abc");
        "ok"
    }
    let response = bind(tagged).unwrap().call(get("/")).await;
    assert_eq!(response.header("x-trace"), Some("abc"));
    assert_eq!(body(&response)["data"], "ok");
}

#[tokio::test]
async fn code_message_style_deployment() {
    let config = AdapterConfig::default().with_envelope(EnvelopeStyle::CodeMessage);
    let mut router = Router::with_adapter(Adapter::new(config));
    router
        .get("/users/:id", |raw: RequestContext| async move {
            match raw.param("id") {
                Some("1") => Ok(Json(User { name: "a".into() })),
                _ => Err(Status::new(40401, "user not found")),
            }
        })
        .unwrap();

    let found = router.route(get("/users/1")).await;
    assert_eq!(body(&found), json!({"code": 0, "data": {"Name": "a"}}));

    let missing = router.route(get("/users/2")).await;
    assert_eq!(body(&missing), json!({"code": 40401, "msg": "user not found"}));

    let unknown = router.route(get("/nowhere")).await;
    assert_eq!(body(&unknown)["code"], 1);
}

#[tokio::test]
async fn ambient_context_reaches_the_target() {
    let handler = bind(|ctx: Context| async move { ctx.is_cancelled() }).unwrap();
    let ctx = Context::new();
    ctx.cancel();
    let response = handler.call_with_context(ctx, get("/")).await;
    assert_eq!(body(&response)["data"], true);
}

#[test]
fn handlers_run_on_a_plain_executor() {
    let handler = bind(|Bind(user): Bind<User>| async move { user.name }).unwrap();
    let request = HttpRequest::new("POST", "/").with_json(r#"{"Name":"zed"}"#);
    let response = tokio_test::block_on(handler.call(request));
    assert_eq!(body(&response)["data"], "zed");
}
