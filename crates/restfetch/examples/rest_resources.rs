//! Example: Exercise resource calls against httpbin
//!
//! Run with: cargo run -p restfetch --example rest_resources
//!
//! httpbin's `/anything` endpoint echoes method, URL and JSON body, which
//! makes the composed requests visible.

use restfetch::{Error, Reply, RequestOptions, RestClient};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("RestFetch Resource Examples");
    println!("===========================\n");

    let client = RestClient::builder()
        .base_url("https://httpbin.org")
        .prefix("anything")
        .try_header("X-Client", "restfetch-example")?
        .build()?;
    let users = client.create("users");

    let mut failed = 0;

    let calls = [
        (
            "GET collection with query",
            users.get(json!({"page": 2, "active": true})).await,
        ),
        (
            "GET by id with query",
            users
                .get_with_options(42, RequestOptions::new().data(json!({"expand": "roles"})))
                .await,
        ),
        ("POST JSON body", users.post(json!({"name": "ada"})).await),
        (
            "PUT by id",
            users.put_json(42, &json!({"name": "grace"})).await,
        ),
        ("DELETE by id", users.delete(42).await),
    ];

    for (i, (description, result)) in calls.into_iter().enumerate() {
        println!("{}. {}", i + 1, description);
        match result {
            Ok(reply) => print_echo(&reply),
            Err(e) => {
                println!("   Error: {}\n", e);
                failed += 1;
            }
        }
    }

    println!("6. Non-success status");
    let status = RestClient::builder()
        .base_url("https://httpbin.org")
        .build()?
        .create("status");
    match status.get(404).await {
        Err(e) => {
            let code = e.response().map(|r| r.status().as_u16());
            println!("   Rejected as expected: {} ({:?})\n", e, code);
        }
        Ok(_) => {
            println!("   ✗ Expected a rejection\n");
            failed += 1;
        }
    }

    println!("===========================");
    println!("Failures: {}", failed);

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_echo(reply: &Reply) {
    let Some(echo) = reply.as_json() else {
        println!("   Unexpected reply: {:?}\n", reply);
        return;
    };

    let field = |name: &str| echo.get(name).cloned().unwrap_or(Value::Null);
    println!("   Method: {}", field("method"));
    println!("   URL: {}", field("url"));
    if let Some(body) = echo.get("json").filter(|v| !v.is_null()) {
        println!("   Body: {}", body);
    }
    println!("   ✓ OK\n");
}
