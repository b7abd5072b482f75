use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use civicdesk_overlay::OverlayKey;
use civicdesk_portal::PortalShell;
use civicdesk_settings::{
    validate_locale_code, ConfigStore, LocalizationManager, PortalConfig,
};
use civicdesk_support::{
    AttachmentMeta, DeliveryComposer, DeliveryTransport, FileStorage, MailtoTransport,
    SubmitOutcome, SystemMailTransport, TicketStore,
};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CIVICDESK_LOG";

#[derive(Parser)]
#[command(
    name = "civicdesk-cli",
    about = "Operator commands for the CivicDesk portal",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出所有面板識別與標題。 / List overlay identifiers with their titles.
    Overlays(OverlaysArgs),
    /// 支援工單。 / Support tickets.
    #[command(subcommand)]
    Tickets(TicketsCommand),
    /// 檢視或修改設定。 / Show or change the portal configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args)]
struct OverlaysArgs {
    /// 顯示標題所用的語系。 / Locale used for titles.
    #[arg(long, value_name = "CODE")]
    locale: Option<String>,
}

#[derive(Subcommand)]
enum TicketsCommand {
    /// 列出已保存的工單（最新在前）。 / List saved tickets, newest first.
    List(TicketsListArgs),
    /// 建立並交付新的支援工單。 / Create and hand off a new support ticket.
    Submit(TicketsSubmitArgs),
    /// 顯示工單的交付訊息。 / Print the delivery message composed for a ticket.
    Show(TicketsShowArgs),
}

#[derive(Args)]
struct TicketsListArgs {
    /// 以 JSON 輸出。 / Emit the stored JSON collection.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TicketsSubmitArgs {
    #[arg(long)]
    subject: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    message: String,
    /// 附加檔案（僅保存中繼資料）。 / Files to attach (metadata only).
    #[arg(long = "attach", value_name = "FILE")]
    attachments: Vec<PathBuf>,
    /// 以系統郵件程式開啟，而非輸出 mailto URI。 / Open the system mail client instead of printing the mailto URI.
    #[arg(long)]
    open: bool,
}

#[derive(Args)]
struct TicketsShowArgs {
    #[arg(value_name = "ID")]
    id: String,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// 顯示目前設定。 / Print the effective configuration.
    Show,
    /// 更新設定值。 / Update configuration values.
    Set(ConfigSetArgs),
}

#[derive(Args)]
struct ConfigSetArgs {
    #[arg(long, value_name = "CODE")]
    locale: Option<String>,
    #[arg(long, value_name = "NAME")]
    product: Option<String>,
    #[arg(long, value_name = "EMAIL")]
    recipient: Option<String>,
    #[arg(long, value_name = "MS")]
    close_delay_ms: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli { workspace, command } = Cli::parse();
    let workspace_root = resolve_workspace(workspace)?;
    tracing::debug!(workspace = %workspace_root.display(), "resolved workspace");
    match command {
        Commands::Overlays(args) => list_overlays(args, &workspace_root),
        Commands::Tickets(subcommand) => execute_tickets_command(subcommand, &workspace_root),
        Commands::Config(subcommand) => execute_config_command(subcommand, &workspace_root),
    }
}

fn list_overlays(args: OverlaysArgs, workspace_root: &Path) -> Result<()> {
    let config = load_config(workspace_root)?;
    let mut localization = load_localization(workspace_root)?;
    let locale = args.locale.unwrap_or(config.ui.locale);
    if !localization.set_active_by_code(&locale) {
        bail!("locale '{locale}' is not available");
    }
    for key in OverlayKey::ALL {
        println!("{}\t{}", key.as_str(), localization.text(&key.title_key()));
    }
    Ok(())
}

fn execute_tickets_command(command: TicketsCommand, workspace_root: &Path) -> Result<()> {
    match command {
        TicketsCommand::List(args) => list_tickets(args, workspace_root),
        TicketsCommand::Submit(args) => submit_ticket(args, workspace_root),
        TicketsCommand::Show(args) => show_ticket(args, workspace_root),
    }
}

fn list_tickets(args: TicketsListArgs, workspace_root: &Path) -> Result<()> {
    let config = load_config(workspace_root)?;
    let tickets = ticket_store(&config, workspace_root).load();
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tickets).context("serialize tickets")?
        );
        return Ok(());
    }
    if tickets.is_empty() {
        println!("No tickets.");
        return Ok(());
    }
    for ticket in tickets {
        println!(
            "{}\t{}\t{} attachment(s)\t{}",
            ticket.id,
            ticket.created_at.format("%Y-%m-%d %H:%M:%S"),
            ticket.attachments.len(),
            ticket.subject
        );
    }
    Ok(())
}

fn submit_ticket(args: TicketsSubmitArgs, workspace_root: &Path) -> Result<()> {
    let config = load_config(workspace_root)?;
    let localization = load_localization(workspace_root)?;
    let attachments = args
        .attachments
        .iter()
        .map(|path| {
            let path = resolve_input_path(path)?;
            AttachmentMeta::from_path(&path)
                .with_context(|| format!("failed to inspect {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let store = ticket_store(&config, workspace_root);
    if args.open {
        run_submission(&config, localization, store, SystemMailTransport, &args, attachments)
    } else {
        let transport = MailtoTransport::new(io::stdout());
        run_submission(&config, localization, store, transport, &args, attachments)
    }
}

fn run_submission<T: DeliveryTransport>(
    config: &PortalConfig,
    localization: LocalizationManager,
    store: TicketStore<FileStorage>,
    transport: T,
    args: &TicketsSubmitArgs,
    attachments: Vec<AttachmentMeta>,
) -> Result<()> {
    let mut shell = PortalShell::new(config, localization, store, transport);
    let now = Instant::now();
    shell.open(OverlayKey::Support, None);
    shell.frame(now);

    let report = shell.attach_files(attachments);
    for rejection in &report.rejected {
        eprintln!("Skipped attachment '{}': {}", rejection.name, rejection.reason);
    }

    let form = shell.form_mut();
    form.subject = args.subject.clone();
    form.contact_email = args.email.clone();
    form.message = args.message.clone();

    match shell.submit_support(now) {
        SubmitOutcome::Submitted { ticket, close_at } => {
            // No one is watching the overlay here, so run the auto-close frame right away.
            shell.frame(close_at);
            println!("Created ticket {}", ticket.id);
            Ok(())
        }
        SubmitOutcome::Rejected(_) | SubmitOutcome::SaveFailed => {
            shell.frame(now);
            let message = shell
                .screen()
                .line("support.status")
                .unwrap_or("submission failed")
                .to_string();
            bail!(message)
        }
    }
}

fn show_ticket(args: TicketsShowArgs, workspace_root: &Path) -> Result<()> {
    let config = load_config(workspace_root)?;
    let ticket = ticket_store(&config, workspace_root)
        .find(&args.id)
        .ok_or_else(|| anyhow!("ticket '{}' was not found", args.id))?;
    let message = DeliveryComposer::new(
        config.support.product_name.clone(),
        config.support.recipient.clone(),
    )
    .compose(&ticket);
    println!("To: {}", message.recipient);
    println!("Subject: {}", message.subject);
    println!();
    print!("{}", message.body);
    Ok(())
}

fn execute_config_command(command: ConfigCommand, workspace_root: &Path) -> Result<()> {
    let path = config_path(workspace_root);
    match command {
        ConfigCommand::Show => {
            let store = ConfigStore::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            println!(
                "{}",
                serde_json::to_string_pretty(store.config()).context("serialize config")?
            );
            Ok(())
        }
        ConfigCommand::Set(args) => {
            if let Some(locale) = &args.locale {
                validate_locale_code(locale)?;
            }
            let mut store = ConfigStore::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            store
                .update(|config| {
                    if let Some(locale) = args.locale {
                        config.ui.locale = locale;
                    }
                    if let Some(product) = args.product {
                        config.support.product_name = product;
                    }
                    if let Some(recipient) = args.recipient {
                        config.support.recipient = recipient;
                    }
                    if let Some(delay) = args.close_delay_ms {
                        config.support.close_delay_ms = delay;
                    }
                })
                .with_context(|| format!("failed to save {}", path.display()))?;
            println!("Updated {}", path.display());
            Ok(())
        }
    }
}

fn load_config(workspace_root: &Path) -> Result<PortalConfig> {
    let path = config_path(workspace_root);
    let store =
        ConfigStore::load(&path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(store.config().clone())
}

fn load_localization(workspace_root: &Path) -> Result<LocalizationManager> {
    let dir = localization_dir(workspace_root);
    LocalizationManager::load_from_dir(&dir)
        .with_context(|| format!("failed to load locales from {}", dir.display()))
}

fn ticket_store(config: &PortalConfig, workspace_root: &Path) -> TicketStore<FileStorage> {
    TicketStore::new(FileStorage::new(config.storage.resolve(workspace_root)))
}

fn config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".civicdesk").join("config.json")
}

fn localization_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".civicdesk").join("langs")
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
