mod common;

use common::*;
use notebox_web::configuration::CONFIGURATION;
use reqwest::{Client, StatusCode};
use serde_json::Value;

async fn only_note_id(client: &Client, address: &str) -> String {
    let notes: Vec<Value> = client
        .get(&format!("{}/api/v1/notes", address))
        .send()
        .await
        .expect("Failed to execute request.")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(notes.len(), 1);
    notes[0]["id"].as_str().unwrap().to_owned()
}

async fn get_page(client: &Client, url: String) -> String {
    let response = client
        .get(&url)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), StatusCode::OK);
    response.text().await.expect("Failed to read body")
}

#[tokio::test]
async fn add_note_form() {
    let app = spawn_app().await;
    let client = client();

    let response = client
        .post(&format!("{}/note", &app.address))
        .form(&[("title", "Groceries"), ("text", "<p>eggs</p>"), ("image", "")])
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");

    let page = get_page(&client, format!("{}/", &app.address)).await;
    assert!(page.contains("Groceries"));
    assert!(page.contains("<p>eggs</p>"));

    let id = only_note_id(&client, &app.address).await;
    assert!(page.contains(&format!("/note/{}/edit", id)));

    let expanded = get_page(&client, format!("{}/note/{}", &app.address, id)).await;
    assert!(expanded.contains("<title>Notes - Groceries</title>"));
}

#[tokio::test]
async fn invalid_form_shows_notice() {
    let app = spawn_app().await;
    let client = client();

    let response = client
        .post(&format!("{}/note", &app.address))
        .form(&[("title", "Groceries"), ("text", "<p><br></p>")])
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let page = response.text().await.expect("Failed to read body");
    assert!(page.contains(r#"class="notice""#));
    // The draft is kept in the form
    assert!(page.contains(r#"value="Groceries""#));

    let response = client
        .post(&format!("{}/note", &app.address))
        .form(&[("title", "Kept"), ("text", "typed"), ("image", "data:text/plain;base64,aGk=")])
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let page = response.text().await.expect("Failed to read body");
    assert!(page.contains(r#"value="Kept""#));
    assert!(page.contains("typed</textarea>"));

    let page = get_page(&client, format!("{}/", &app.address)).await;
    assert!(!page.contains(r#"class="note""#));
}

#[tokio::test]
async fn edit_note_form() {
    let app = spawn_app().await;
    let client = client();

    client
        .post(&format!("{}/note", &app.address))
        .form(&[("title", "Draft"), ("text", "<p>first</p>")])
        .send()
        .await
        .expect("Failed to execute request.");
    let id = only_note_id(&client, &app.address).await;

    let form = get_page(&client, format!("{}/note/{}/edit", &app.address, id)).await;
    assert!(form.contains(r#"value="Draft""#));
    assert!(form.contains(&format!(r#"action="/note/{}/edit""#, id)));

    let response = client
        .post(&format!("{}/note/{}/edit", &app.address, id))
        .form(&[("title", "Final"), ("text", "<p>second</p>")])
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert_eq!(only_note_id(&client, &app.address).await, id);
    let page = get_page(&client, format!("{}/", &app.address)).await;
    assert!(page.contains("Final"));
    assert!(!page.contains("Draft"));
}

#[tokio::test]
async fn delete_note_form() {
    let app = spawn_app().await;
    let client = client();

    client
        .post(&format!("{}/note", &app.address))
        .form(&[("title", "Doomed"), ("text", "<p>bye</p>")])
        .send()
        .await
        .expect("Failed to execute request.");
    let id = only_note_id(&client, &app.address).await;

    let confirm = get_page(&client, format!("{}/note/{}/delete", &app.address, id)).await;
    assert!(confirm.contains("Doomed"));

    let response = client
        .post(&format!("{}/note/{}/delete", &app.address, id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = get_page(&client, format!("{}/", &app.address)).await;
    assert!(!page.contains("Doomed"));

    let response = client
        .post(&format!("{}/note/{}/delete", &app.address, id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_image_in_form() {
    let mut settings = CONFIGURATION.clone();
    settings.maximagebytes = 64;
    let app = spawn_app_with(settings.get_note_store(), &settings).await;
    let client = client();

    let image = format!("data:image/gif;base64,R0lGODlh{}", "AAAA".repeat(40));
    let response = client
        .post(&format!("{}/note", &app.address))
        .form(&[("title", "Kept"), ("text", "typed"), ("image", image.as_str())])
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let page = response.text().await.expect("Failed to read body");
    assert!(page.contains(r#"class="notice""#));
    assert!(page.contains(r#"value="Kept""#));

    let page = get_page(&client, format!("{}/", &app.address)).await;
    assert!(!page.contains(r#"class="note""#));
}
