use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::get,
};
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

use kitchen_command::config::Config;
use kitchen_command::routes::UNSAVED_HEADER;
use kitchen_command::session::Kitchen;
use kitchen_command::store::KvStore;
use kitchen_command::{AppState, build_app};

struct TestCtx {
    app: Router,
    store: KvStore,
}

async fn make_ctx_with(config: Config) -> anyhow::Result<TestCtx> {
    let store = KvStore::open_in_memory().await?;
    let kitchen = Kitchen::load(&store).await?;
    let state = AppState::new(store.clone(), kitchen, config)?;
    Ok(TestCtx {
        app: build_app(state),
        store,
    })
}

async fn make_ctx() -> anyhow::Result<TestCtx> {
    make_ctx_with(Config {
        import_timeout_secs: 5,
        ..Config::default()
    })
    .await
}

async fn json_req(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| json!({"_raw": String::from_utf8_lossy(&bytes)}))
    };
    (status, body)
}

fn get_req(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).unwrap()
}

fn send_json(method: &str, path: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json(path: &str, body: &serde_json::Value) -> Request<Body> {
    send_json("POST", path, body)
}

fn strings(v: &serde_json::Value) -> Vec<String> {
    v.as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().to_string())
        .collect()
}

async fn add_recipe(app: &Router, name: &str, ingredients: &str) -> serde_json::Value {
    let (st, body) = json_req(
        app,
        post_json(
            "/recipes",
            &json!({"name": name, "ingredients": ingredients, "prepTime": 20}),
        ),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED, "{body}");
    body
}

async fn stock_pantry(app: &Router, items: &str) {
    let (st, body) = json_req(app, post_json("/pantry", &json!({"items": items}))).await;
    assert_eq!(st, StatusCode::CREATED, "{body}");
}

/* ---------- Mock recipe site ---------- */

const LD_PAGE: &str = r#"<html><head><title>Turkey Chili - Mock Kitchen</title>
<script type="application/ld+json">
{"@context":"https://schema.org","@type":"Recipe","name":"Turkey Chili",
 "recipeIngredient":["1 lb ground turkey","1 can black beans","2 cloves garlic"],
 "recipeInstructions":[{"@type":"HowToStep","text":"Brown the turkey."},{"@type":"HowToStep","text":"Simmer."}],
 "totalTime":"PT45M"}
</script></head><body><h1>Turkey Chili</h1></body></html>"#;

const MARKUP_PAGE: &str = r#"<html><head><title>Oat Bars - Mock Kitchen</title></head><body>
<h1>Oat Bars</h1>
<ul class="ingredients"><li class="ingredient">2 cups oats</li><li class="ingredient">1 cup honey</li></ul>
</body></html>"#;

const BARE_PAGE: &str = "<html><head><title>About us</title></head><body><p>hello</p></body></html>";

/// Serves a handful of recipe pages on an ephemeral port.
async fn start_mock_site() -> String {
    let app = Router::new()
        .route("/ld", get(|| async { axum::response::Html(LD_PAGE) }))
        .route("/markup", get(|| async { axum::response::Html(MARKUP_PAGE) }))
        .route("/bare", get(|| async { axum::response::Html(BARE_PAGE) }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(1500)).await;
                axum::response::Html(LD_PAGE)
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock site");
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(axum::serve(listener, app).into_future());
    format!("http://127.0.0.1:{port}")
}

/* ---------- Tests ---------- */

#[tokio::test]
async fn healthz_ok() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    let (st, body) = json_req(&ctx.app, get_req("/healthz")).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(body, json!("ok"));
    Ok(())
}

#[tokio::test]
async fn pantry_add_list_remove() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;

    let (st, body) = json_req(
        &ctx.app,
        post_json("/pantry", &json!({"items": "Rice, Black Beans\nGarlic,, "})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);
    assert_eq!(strings(&body["added"]), vec!["Rice", "Black Beans", "Garlic"]);

    // list form works too, near-duplicates are kept
    let (st, _) = json_req(&ctx.app, post_json("/pantry", &json!({"items": ["rice"]}))).await;
    assert_eq!(st, StatusCode::CREATED);
    let (_, body) = json_req(&ctx.app, get_req("/pantry")).await;
    assert_eq!(strings(&body["items"]).len(), 4);

    let (st, body) = json_req(
        &ctx.app,
        Request::delete("/pantry/Black%20Beans")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(strings(&body["items"]), vec!["Rice", "Garlic", "rice"]);

    let (st, _) = json_req(
        &ctx.app,
        Request::delete("/pantry/Black%20Beans")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(st, StatusCode::NOT_FOUND);

    let (st, _) = json_req(&ctx.app, post_json("/pantry", &json!({"items": " , \n"}))).await;
    assert_eq!(st, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn pantry_photo_adds_detected_items_once() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    stock_pantry(&ctx.app, "Rice").await;

    let boundary = "XKITCHENX";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"shelf.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nnot really a jpeg\r\n--{boundary}--\r\n"
    );
    let detect = || {
        Request::post("/pantry/detect")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body.clone()))
            .unwrap()
    };

    let (st, first) = json_req(&ctx.app, detect()).await;
    assert_eq!(st, StatusCode::OK, "{first}");
    let added = strings(&first["added"]);
    assert!(!added.is_empty());
    assert!(!added.contains(&"Rice".to_string()));

    let (st, second) = json_req(&ctx.app, detect()).await;
    assert_eq!(st, StatusCode::OK);
    assert!(second.get("added").is_none());
    assert_eq!(
        strings(&first["items"]).len(),
        strings(&second["items"]).len()
    );
    Ok(())
}

#[tokio::test]
async fn recipe_validation() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;

    for bad in [
        json!({"ingredients": "Rice", "prepTime": 10}),
        json!({"name": "  ", "ingredients": "Rice", "prepTime": 10}),
        json!({"name": "Bowl", "ingredients": "", "prepTime": 10}),
        json!({"name": "Bowl", "ingredients": "Rice", "prepTime": 0}),
        json!({"name": "Bowl", "ingredients": "Rice"}),
    ] {
        let (st, body) = json_req(&ctx.app, post_json("/recipes", &bad)).await;
        assert_eq!(st, StatusCode::BAD_REQUEST, "{bad} -> {body}");
        assert!(body["error"].is_string());
    }

    let (_, list) = json_req(&ctx.app, get_req("/recipes")).await;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn recipe_create_cleans_and_defaults() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    let (st, r) = json_req(
        &ctx.app,
        post_json(
            "/recipes",
            &json!({
                "name": "Pancakes",
                "category": "brunch",
                "ingredients": "Ingredients ▢ 2 cups flour1 tsp salt, Salt",
                "instructions": "Mix\n\nFry",
                "prepTime": 15,
                "sourceURL": "https://www.example.com/pancakes"
            }),
        ),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED, "{r}");
    assert_eq!(r["category"], "dinner");
    assert_eq!(
        strings(&r["ingredients"]),
        vec!["2 cups flour", "1 tsp salt", "Salt"]
    );
    assert_eq!(strings(&r["instructions"]), vec!["Mix", "Fry"]);
    assert_eq!(r["approved"], true);
    assert_eq!(r["sourceName"], "example.com");
    assert!(r["id"].as_str().unwrap().starts_with("pancakes-"));

    let id = r["id"].as_str().unwrap();
    let (st, fetched) = json_req(&ctx.app, get_req(&format!("/recipes/{id}"))).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(fetched, r);

    let (st, _) = json_req(&ctx.app, get_req("/recipes/nope-1")).await;
    assert_eq!(st, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_is_all_or_nothing() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    let r = add_recipe(&ctx.app, "Soup", "Water, Salt").await;
    let path = format!("/recipes/{}", r["id"].as_str().unwrap());

    let (st, _) = json_req(
        &ctx.app,
        send_json("PATCH", &path, &json!({"name": "Broth", "prepTime": -5})),
    )
    .await;
    assert_eq!(st, StatusCode::BAD_REQUEST);
    let (_, unchanged) = json_req(&ctx.app, get_req(&path)).await;
    assert_eq!(unchanged["name"], "Soup");

    let (st, updated) = json_req(
        &ctx.app,
        send_json(
            "PATCH",
            &path,
            &json!({"name": "Broth", "prepTime": 45, "category": "lunch"}),
        ),
    )
    .await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(updated["name"], "Broth");
    assert_eq!(updated["prepTime"], 45);
    assert_eq!(updated["category"], "lunch");
    assert_eq!(updated["ingredients"], r["ingredients"]);
    Ok(())
}

#[tokio::test]
async fn category_filter() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    add_recipe(&ctx.app, "Stew", "Beef").await;
    let (st, _) = json_req(
        &ctx.app,
        post_json(
            "/recipes",
            &json!({"name": "Oats", "category": "breakfast", "ingredients": "Oats", "prepTime": 5}),
        ),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);

    let (_, all) = json_req(&ctx.app, get_req("/recipes?category=all")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    let (_, breakfast) = json_req(&ctx.app, get_req("/recipes?category=breakfast")).await;
    assert_eq!(breakfast.as_array().unwrap().len(), 1);
    assert_eq!(breakfast[0]["name"], "Oats");
    let (st, _) = json_req(&ctx.app, get_req("/recipes?category=brunch")).await;
    assert_eq!(st, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn suggestions_and_shopping_list() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    stock_pantry(&ctx.app, "Rice, Black Beans, Garlic").await;
    let bowl = add_recipe(&ctx.app, "Bowl", "Rice, Black Beans, Bell Peppers").await;
    add_recipe(&ctx.app, "Stew", "Beef, Carrots, Potatoes").await;

    let (st, s) = json_req(&ctx.app, get_req("/suggestions")).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(s["pantry_empty"], false);
    let suggestions = s["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["recipe"]["name"], "Bowl");
    assert_eq!(strings(&suggestions[0]["missing"]), vec!["Bell Peppers"]);
    let coverage = suggestions[0]["coverage"].as_f64().unwrap();
    assert!((coverage - 2.0 / 3.0).abs() < 1e-9);

    let (_, s) = json_req(&ctx.app, get_req("/suggestions?threshold=0")).await;
    assert_eq!(s["suggestions"].as_array().unwrap().len(), 2);
    let (st, _) = json_req(&ctx.app, get_req("/suggestions?threshold=1.5")).await;
    assert_eq!(st, StatusCode::BAD_REQUEST);

    let (_, shop) = json_req(&ctx.app, get_req("/shopping")).await;
    assert_eq!(
        strings(&shop["items"]),
        vec!["Bell Peppers", "Beef", "Carrots", "Potatoes"]
    );
    assert_eq!(shop["total"], 4);

    // unapproving hides the recipe from suggestions but not from shopping
    let approval = format!("/recipes/{}/approval", bowl["id"].as_str().unwrap());
    let (st, toggled) = json_req(&ctx.app, post_json(&approval, &json!({}))).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(toggled["approved"], false);
    let (_, s) = json_req(&ctx.app, get_req("/suggestions")).await;
    assert_eq!(s["suggestions"], json!([]));
    let (_, shop) = json_req(&ctx.app, get_req("/shopping")).await;
    assert_eq!(shop["total"], 4);
    Ok(())
}

#[tokio::test]
async fn empty_pantry_suggests_every_approved_recipe() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    add_recipe(&ctx.app, "Bowl", "Rice").await;
    add_recipe(&ctx.app, "Stew", "Beef").await;
    let (_, s) = json_req(&ctx.app, get_req("/suggestions")).await;
    assert_eq!(s["pantry_empty"], true);
    assert_eq!(s["suggestions"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn availability_per_recipe() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    stock_pantry(&ctx.app, "garlic").await;
    let r = add_recipe(&ctx.app, "Garlic Rice", "2 cloves garlic minced, Rice").await;
    let (st, a) = json_req(
        &ctx.app,
        get_req(&format!("/recipes/{}/availability", r["id"].as_str().unwrap())),
    )
    .await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(strings(&a["available"]), vec!["2 cloves garlic minced"]);
    assert_eq!(strings(&a["missing"]), vec!["Rice"]);
    Ok(())
}

#[tokio::test]
async fn quick_add_from_pasted_text() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    let (st, r) = json_req(
        &ctx.app,
        post_json(
            "/recipes/quick",
            &json!({"text": "Garlic Noodles\n\n• 8 oz noodles\n4 cloves garlic\nBoil everything."}),
        ),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED, "{r}");
    assert_eq!(r["name"], "Garlic Noodles");
    assert_eq!(strings(&r["ingredients"]), vec!["8 oz noodles", "4 cloves garlic"]);
    assert_eq!(r["prepTime"], 30);
    assert_eq!(r["notes"], "Quick-added recipe");

    let (st, _) = json_req(&ctx.app, post_json("/recipes/quick", &json!({"text": "  "}))).await;
    assert_eq!(st, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn shopping_export_is_plain_text() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    add_recipe(&ctx.app, "Stew", "Beef, Carrots").await;

    let res = ctx.app.clone().oneshot(get_req("/shopping/export")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let ct = res.headers()[header::CONTENT_TYPE].to_str()?.to_string();
    assert!(ct.starts_with("text/plain"), "{ct}");
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.starts_with("Fort Kitchen Command - Shopping List\n"));
    assert!(text.contains("□ Beef\n□ Carrots\n"));
    assert!(text.ends_with("Total items: 2"));
    Ok(())
}

#[tokio::test]
async fn delete_recipe_and_reset() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    stock_pantry(&ctx.app, "Rice").await;
    let r = add_recipe(&ctx.app, "Bowl", "Rice").await;
    add_recipe(&ctx.app, "Stew", "Beef").await;

    let path = format!("/recipes/{}", r["id"].as_str().unwrap());
    let (st, _) = json_req(&ctx.app, Request::delete(&path).body(Body::empty())?).await;
    assert_eq!(st, StatusCode::NO_CONTENT);
    let (st, _) = json_req(&ctx.app, Request::delete(&path).body(Body::empty())?).await;
    assert_eq!(st, StatusCode::NOT_FOUND);

    let (_, counts) = json_req(&ctx.app, get_req("/app-state")).await;
    assert_eq!(counts["pantry_items"], 1);
    assert_eq!(counts["recipes"], 1);

    let (st, _) = json_req(&ctx.app, Request::delete("/app-state").body(Body::empty())?).await;
    assert_eq!(st, StatusCode::OK);
    let (_, counts) = json_req(&ctx.app, get_req("/app-state")).await;
    assert_eq!(counts["pantry_items"], 0);
    assert_eq!(counts["recipes"], 0);

    let reloaded = Kitchen::load(&ctx.store).await?;
    assert!(reloaded.pantry.is_empty());
    assert!(reloaded.recipes.is_empty());
    Ok(())
}

#[tokio::test]
async fn mutations_are_persisted() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;
    stock_pantry(&ctx.app, "Rice, Beans").await;
    let r = add_recipe(&ctx.app, "Bowl", "Rice, Beans").await;

    let reloaded = Kitchen::load(&ctx.store).await?;
    assert_eq!(reloaded.pantry.items(), ["Rice", "Beans"]);
    let stored = reloaded.recipes.get(r["id"].as_str().unwrap()).unwrap();
    assert_eq!(stored.name, "Bowl");
    assert_eq!(stored.prep_time, 20);
    Ok(())
}

#[tokio::test]
async fn unsaved_mutations_carry_a_warning_header() -> anyhow::Result<()> {
    let ctx = make_ctx().await?;

    let res = ctx
        .app
        .clone()
        .oneshot(post_json("/pantry", &json!({"items": "Beans"})))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(!res.headers().contains_key(UNSAVED_HEADER));

    ctx.store.close().await;

    let res = ctx
        .app
        .clone()
        .oneshot(post_json("/pantry", &json!({"items": "Rice"})))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.headers().contains_key(UNSAVED_HEADER));

    let res = ctx
        .app
        .clone()
        .oneshot(post_json(
            "/recipes",
            &json!({"name": "Bowl", "ingredients": "Rice", "prepTime": 10}),
        ))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.headers().contains_key(UNSAVED_HEADER));

    // the change still stands in memory
    let (_, body) = json_req(&ctx.app, get_req("/pantry")).await;
    assert_eq!(strings(&body["items"]), vec!["Beans", "Rice"]);
    Ok(())
}

#[tokio::test]
async fn large_bodies_survive_debug_logging() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);
    let ctx = make_ctx().await?;

    let items: Vec<String> = (0..3000)
        .map(|i| format!("pantry staple number {i:04} from the bulk aisle"))
        .collect();
    let payload = json!({"items": items.join(", ")});
    assert!(payload.to_string().len() > 64 * 1024);
    let (st, body) = json_req(&ctx.app, post_json("/pantry", &payload)).await;
    assert_eq!(st, StatusCode::CREATED);
    assert_eq!(strings(&body["added"]).len(), 3000);

    let (st, body) = json_req(&ctx.app, get_req("/pantry")).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(strings(&body["items"]), items);

    let mut text = String::from("Big Batch Soup\n");
    while text.len() <= 120 * 1024 {
        text.push_str("2 cups water for the big batch soup pot\n");
    }
    let (st, r) = json_req(&ctx.app, post_json("/recipes/quick", &json!({"text": text}))).await;
    assert_eq!(st, StatusCode::CREATED, "{r}");
    assert_eq!(r["name"], "Big Batch Soup");
    Ok(())
}

#[tokio::test]
async fn import_from_structured_page() -> anyhow::Result<()> {
    let site = start_mock_site().await;
    let ctx = make_ctx().await?;

    let url = format!("{site}/ld");
    let (st, r) = json_req(
        &ctx.app,
        post_json("/recipes/import", &json!({"url": url, "category": "lunch"})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED, "{r}");
    assert_eq!(r["name"], "Turkey Chili");
    assert_eq!(r["category"], "lunch");
    assert_eq!(r["prepTime"], 45);
    assert_eq!(r["approved"], true);
    assert_eq!(r["sourceURL"], url);
    assert_eq!(r["sourceName"], "127.0.0.1");
    assert_eq!(r["notes"], "Imported from 127.0.0.1");
    assert_eq!(
        strings(&r["ingredients"]),
        vec!["1 lb ground turkey", "1 can black beans", "2 cloves garlic"]
    );
    assert_eq!(strings(&r["instructions"]), vec!["Brown the turkey.", "Simmer."]);

    let (_, list) = json_req(&ctx.app, get_req("/recipes")).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn import_from_markup_page_uses_defaults() -> anyhow::Result<()> {
    let site = start_mock_site().await;
    let ctx = make_ctx().await?;

    let (st, r) = json_req(
        &ctx.app,
        post_json("/recipes/import", &json!({"url": format!("{site}/markup")})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED, "{r}");
    assert_eq!(r["name"], "Oat Bars");
    assert_eq!(r["category"], "dinner");
    assert_eq!(r["prepTime"], 30);
    assert_eq!(strings(&r["ingredients"]), vec!["2 cups oats", "1 cup honey"]);
    assert_eq!(
        strings(&r["instructions"]),
        vec!["Visit the original recipe for detailed instructions"]
    );
    Ok(())
}

#[tokio::test]
async fn import_failures() -> anyhow::Result<()> {
    let site = start_mock_site().await;
    let ctx = make_ctx().await?;

    let (st, body) = json_req(
        &ctx.app,
        post_json("/recipes/import", &json!({"url": format!("{site}/bare")})),
    )
    .await;
    assert_eq!(st, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    let (st, _) = json_req(
        &ctx.app,
        post_json("/recipes/import", &json!({"url": format!("{site}/missing")})),
    )
    .await;
    assert_eq!(st, StatusCode::BAD_GATEWAY);

    let (st, _) = json_req(
        &ctx.app,
        post_json("/recipes/import", &json!({"url": "not a url"})),
    )
    .await;
    assert_eq!(st, StatusCode::BAD_GATEWAY);

    let (_, list) = json_req(&ctx.app, get_req("/recipes")).await;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn extract_preview_does_not_save() -> anyhow::Result<()> {
    let site = start_mock_site().await;
    let ctx = make_ctx().await?;

    let (st, x) = json_req(
        &ctx.app,
        post_json("/recipes/extract", &json!({"url": format!("{site}/ld")})),
    )
    .await;
    assert_eq!(st, StatusCode::OK, "{x}");
    assert_eq!(x["title"], "Turkey Chili");
    assert_eq!(x["prepTime"], 45);
    assert_eq!(x["ingredients"].as_array().unwrap().len(), 3);

    let (_, list) = json_req(&ctx.app, get_req("/recipes")).await;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn second_import_is_turned_away_while_one_runs() -> anyhow::Result<()> {
    let site = start_mock_site().await;
    let ctx = make_ctx().await?;

    let app = ctx.app.clone();
    let slow = format!("{site}/slow");
    let first = tokio::spawn(async move {
        json_req(&app, post_json("/recipes/import", &json!({"url": slow}))).await
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let (st, body) = json_req(
        &ctx.app,
        post_json("/recipes/import", &json!({"url": format!("{site}/ld")})),
    )
    .await;
    assert_eq!(st, StatusCode::CONFLICT, "{body}");

    let (st, _) = first.await?;
    assert_eq!(st, StatusCode::CREATED);

    // gate is released afterwards
    let (st, _) = json_req(
        &ctx.app,
        post_json("/recipes/import", &json!({"url": format!("{site}/ld")})),
    )
    .await;
    assert_eq!(st, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn slow_pages_time_out() -> anyhow::Result<()> {
    let site = start_mock_site().await;
    let ctx = make_ctx_with(Config {
        import_timeout_secs: 1,
        ..Config::default()
    })
    .await?;

    let (st, body) = json_req(
        &ctx.app,
        post_json("/recipes/import", &json!({"url": format!("{site}/slow")})),
    )
    .await;
    assert_eq!(st, StatusCode::BAD_GATEWAY, "{body}");
    Ok(())
}
