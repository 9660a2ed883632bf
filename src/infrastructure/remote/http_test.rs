use std::time::Duration;

use anyhow::Result;
use mockito::Matcher;

use super::HttpRemote;
use crate::domain::models::IdentityBinding;
use crate::domain::models::Remote;
use crate::domain::models::RemoteError;

fn remote_for(server: &mockito::Server) -> HttpRemote {
    return HttpRemote::new(&server.url(), Duration::from_millis(2000));
}

#[tokio::test]
async fn it_sends_chat_messages() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::Json(serde_json::json!({
            "year": 2020,
            "message": "hello"
        })))
        .with_status(200)
        .with_body(r#"{"response": "hey you"}"#)
        .create_async()
        .await;

    let remote = remote_for(&server);
    let res = remote.send_chat(2020, "hello").await?;

    assert_eq!(res.response, "hey you");
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_reads_error_bodies() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .with_status(400)
        .with_body(r#"{"error": "Chat session not started for year 2020."}"#)
        .create_async()
        .await;

    let remote = remote_for(&server);
    let err = remote.send_chat(2020, "hello").await.unwrap_err();

    assert_eq!(
        err,
        RemoteError::Rejected("Chat session not started for year 2020.".to_string())
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn it_falls_back_to_the_status_code() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/start_chat")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let remote = remote_for(&server);
    let err = remote.start_chat(2020).await.unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"status 502");
    mock.assert_async().await;
}

#[tokio::test]
async fn it_reports_unreachable_services_as_transport_errors() {
    let remote = HttpRemote::new("http://127.0.0.1:1", Duration::from_millis(2000));
    let err = remote.available_years().await.unwrap_err();

    assert!(matches!(err, RemoteError::Transport(_)));
}

#[tokio::test]
async fn it_sets_user_names() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/set_user_names")
        .match_body(Matcher::Json(serde_json::json!({
            "year": 2019,
            "selected_user_names": {"discord": "samwise", "whatsapp": "Sam"}
        })))
        .with_status(200)
        .with_body(r#"{"message": "User names set for year 2019."}"#)
        .create_async()
        .await;

    let mut binding = IdentityBinding::new();
    binding.insert("whatsapp".to_string(), "Sam".to_string());
    binding.insert("discord".to_string(), "samwise".to_string());

    let remote = remote_for(&server);
    let ack = remote.set_user_names(2019, &binding).await?;

    assert_eq!(ack.message, "User names set for year 2019.");
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_lists_years_and_participants() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let years = server
        .mock("GET", "/api/get_available_years")
        .with_status(200)
        .with_body("[2019, 2021]")
        .create_async()
        .await;
    let participants = server
        .mock("GET", "/api/get_participants/2021")
        .with_status(200)
        .with_body(
            r#"{"year": 2021, "participants_by_source": {"whatsapp": ["Alex", "Sam"], "instagram": []}}"#,
        )
        .create_async()
        .await;

    let remote = remote_for(&server);
    assert_eq!(remote.available_years().await?, vec![2019, 2021]);

    let res = remote.participants(2021).await?;
    assert_eq!(
        res.participants_by_source.get("whatsapp"),
        Some(&vec!["Alex".to_string(), "Sam".to_string()])
    );
    assert_eq!(res.participants_by_source.get("instagram"), Some(&vec![]));

    years.assert_async().await;
    participants.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_processes_data() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/process_data")
        .with_status(200)
        .with_body(
            r#"{"message": "Data processing complete.", "available_years": [2018, 2021], "unprocessed_files": ["notes.pdf"]}"#,
        )
        .create_async()
        .await;

    let remote = remote_for(&server);
    let report = remote.process_data().await?;

    assert_eq!(report.available_years, vec![2018, 2021]);
    assert_eq!(report.unprocessed_files, vec!["notes.pdf".to_string()]);
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_skips_messages_in_processed_files() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/get_processed_files")
        .with_status(200)
        .with_body(r#"{"message": "No processed files found."}"#)
        .create_async()
        .await;

    let remote = remote_for(&server);
    assert!(remote.processed_files().await?.is_empty());
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_lists_processed_files() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/get_processed_files")
        .with_status(200)
        .with_body(r#"{"whatsapp": ["chat_2019.txt"], "discord": ["dms.json"]}"#)
        .create_async()
        .await;

    let remote = remote_for(&server);
    let files = remote.processed_files().await?;

    assert_eq!(files.len(), 2);
    assert_eq!(files["whatsapp"], vec!["chat_2019.txt".to_string()]);
    mock.assert_async().await;

    return Ok(());
}
