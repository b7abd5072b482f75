use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("civicdesk-cli")?;
    cmd.env_remove("CIVICDESK_LOG");
    Ok(cmd)
}

#[test]
fn submit_persists_ticket_and_prints_mailto() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let ws = workspace.path().to_str().unwrap();

    cli()?
        .args([
            "--workspace",
            ws,
            "tickets",
            "submit",
            "--subject",
            "Login issue",
            "--email",
            "user@example.cv",
            "--message",
            "Cannot log in since yesterday",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("mailto:suporte@civicdesk.cv?subject=")
                .and(predicate::str::contains("Anexos%3A%0D%0ANenhum"))
                .and(predicate::str::contains("Created ticket TKT-")),
        );

    let stored = workspace
        .path()
        .join(".civicdesk")
        .join("data")
        .join("support_tickets.json");
    let tickets: serde_json::Value = serde_json::from_str(&fs::read_to_string(stored)?)?;
    let tickets = tickets.as_array().expect("array");
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["subject"], "Login issue");
    assert_eq!(tickets[0]["contactEmail"], "user@example.cv");
    assert_eq!(tickets[0]["attachments"], serde_json::json!([]));
    Ok(())
}

#[test]
fn invalid_email_is_rejected_without_persisting() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let ws = workspace.path().to_str().unwrap();

    cli()?
        .args([
            "--workspace",
            ws,
            "tickets",
            "submit",
            "--subject",
            "Login issue",
            "--email",
            "not-an-email",
            "--message",
            "Cannot log in",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Indique um email válido."));

    cli()?
        .args(["--workspace", ws, "tickets", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tickets."));
    Ok(())
}

#[test]
fn list_orders_newest_first_and_show_composes_message() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let ws = workspace.path().to_str().unwrap();
    let attachment = workspace.path().join("captura.png");
    fs::write(&attachment, vec![0u8; 1536])?;

    for subject in ["A", "B"] {
        cli()?
            .args([
                "--workspace",
                ws,
                "tickets",
                "submit",
                "--subject",
                subject,
                "--email",
                "user@example.cv",
                "--message",
                "body",
                "--attach",
                attachment.to_str().unwrap(),
            ])
            .assert()
            .success();
    }

    let output = cli()?
        .args(["--workspace", ws, "tickets", "list", "--json"])
        .output()?;
    assert!(output.status.success());
    let tickets: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let subjects: Vec<_> = tickets
        .as_array()
        .expect("array")
        .iter()
        .map(|ticket| ticket["subject"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(subjects, vec!["B", "A"]);

    let id = tickets[0]["id"].as_str().unwrap().to_string();
    cli()?
        .args(["--workspace", ws, "tickets", "show", &id])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Subject: [CivicDesk] Support Request: B")
                .and(predicate::str::contains(format!("ID do Pedido: {id}")))
                .and(predicate::str::contains("1. captura.png (1.50 KB)")),
        );
    Ok(())
}

#[test]
fn corrupt_store_lists_as_empty() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let data = workspace.path().join(".civicdesk").join("data");
    fs::create_dir_all(&data)?;
    fs::write(data.join("support_tickets.json"), "{ broken")?;

    cli()?
        .args([
            "--workspace",
            workspace.path().to_str().unwrap(),
            "tickets",
            "list",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tickets."));
    Ok(())
}

#[test]
fn overlays_follow_configured_locale() -> Result<(), Box<dyn Error>> {
    let workspace = tempdir()?;
    let ws = workspace.path().to_str().unwrap();

    cli()?
        .args(["--workspace", ws, "overlays"])
        .assert()
        .success()
        .stdout(predicate::str::contains("faq\tPerguntas Frequentes"));

    cli()?
        .args(["--workspace", ws, "config", "set", "--locale", "en-US"])
        .assert()
        .success();

    cli()?
        .args(["--workspace", ws, "overlays"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("faq\tFAQ")
                .and(predicate::str::contains("bulky-waste\tBulky Waste")),
        );

    cli()?
        .args(["--workspace", ws, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"locale\": \"en-US\""));
    Ok(())
}
