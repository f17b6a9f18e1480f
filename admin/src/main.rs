//! Trash Clean command-line client

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trashclean_admin::{
    attachment_from_path, submit, AdminConfig, AdminView, FileSessionStore, ReqwestTransport,
};
use trashclean_core::{
    AdminSession, AdminState, ContactForm, ContactId, ContactsClient, Flash, Mode, NewContact,
    Status,
};

#[derive(Parser)]
#[command(name = "trashclean")]
#[command(about = "Submit and manage Trash Clean bin-cleaning requests")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API base URL (overrides TRASHCLEAN_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new cleaning request
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Photo or video of the bins
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Unlock the admin commands
    Login {
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the admin session
    Logout,

    #[command(flatten)]
    Admin(AdminCommand),
}

/// Commands that need a logged-in session.
#[derive(Subcommand)]
enum AdminCommand {
    /// List requests, newest first
    List {
        /// Only requests that are not DONE
        #[arg(long, conflicts_with_all = ["status", "phone"])]
        not_done: bool,

        /// Only requests with this status (OPEN, PENDING, DONE)
        #[arg(long, conflicts_with = "phone")]
        status: Option<Status>,

        /// Exact phone number lookup
        #[arg(long)]
        phone: Option<String>,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Show one request, including its media link
    Show { id: ContactId },

    /// Advance a request's status
    Toggle { id: ContactId },

    /// Delete a request
    Delete {
        id: ContactId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Attach a photo or video to an existing request
    Upload { id: ContactId, file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let mut config = AdminConfig::load().context("invalid TRASHCLEAN_* configuration")?;
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }
    tracing::debug!(api_base = %config.api_base, session_dir = %config.session_dir.display(), "configuration loaded");

    let client = ContactsClient::new(&config.api_base);
    let transport = ReqwestTransport::new(config.timeout());
    let mut session = AdminSession::restore(FileSessionStore::new(&config.session_dir));

    match cli.command {
        Commands::Submit { name, email, phone, address, description, file } => {
            let mut form = ContactForm::new();
            form.fields = NewContact {
                name,
                email,
                phone_number: phone,
                address,
                description,
            };
            if let Some(path) = file {
                let attachment = attachment_from_path(&path)
                    .await
                    .with_context(|| format!("cannot read {}", path.display()))?;
                form.attachment = Some(attachment);
            }
            report(&submit(&mut form, &client, &transport).await)
        }
        Commands::Login { password } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Admin password: ")?,
            };
            session.login(&password, &config.admin_password)?;
            println!("Logged in.");
            Ok(())
        }
        Commands::Logout => {
            session.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Admin(command) => {
            session
                .require()
                .context("admin commands need a session; run `trashclean login` first")?;
            let mut view = AdminView::new(client, config.page_size, transport);
            run_admin(&mut view, command).await
        }
    }
}

async fn run_admin(view: &mut AdminView<ReqwestTransport>, command: AdminCommand) -> Result<()> {
    match command {
        AdminCommand::List { not_done, status, phone, page } => {
            let (mode, status) = match (not_done, status, phone.as_deref()) {
                (true, _, _) => (Mode::NotDone, None),
                (_, Some(s), _) => (Mode::ByStatus, Some(s)),
                (_, _, Some(_)) => (Mode::ByPhone, None),
                _ => (Mode::All, None),
            };
            let filtered = view.apply_filter(mode, status, phone.as_deref());
            let paged = page > 1 && view.goto_page(page - 1);
            if !filtered && !paged {
                view.load();
            }
            view.settle().await;
            let state = view.snapshot();
            if let Some(flash) = state.flash() {
                report(flash)?;
            }
            print_listing(&state);
            Ok(())
        }
        AdminCommand::Show { id } => {
            view.view(id).await;
            let state = view.snapshot();
            if let Some(flash) = state.flash() {
                report(flash)?;
            }
            print_detail(&state);
            Ok(())
        }
        AdminCommand::Toggle { id } => {
            view.toggle(id).await;
            finish_mutation(view).await
        }
        AdminCommand::Delete { id, yes } => {
            let mut confirm = |text: &str| yes || confirm_on_stdin(text);
            if !view.delete(id, &mut confirm).await {
                println!("Cancelled.");
                return Ok(());
            }
            finish_mutation(view).await
        }
        AdminCommand::Upload { id, file } => {
            let attachment = attachment_from_path(&file)
                .await
                .with_context(|| format!("cannot read {}", file.display()))?;
            view.upload(id, &attachment).await;
            finish_mutation(view).await
        }
    }
}

/// Report the mutation's flash, then show the refreshed page.
async fn finish_mutation(view: &mut AdminView<ReqwestTransport>) -> Result<()> {
    view.settle().await;
    let state = view.snapshot();
    match state.flash() {
        Some(flash) => report(flash)?,
        None => bail!("no result recorded"),
    }
    print_listing(&state);
    Ok(())
}

fn report(flash: &Flash) -> Result<()> {
    if flash.is_error() {
        bail!("{}", flash.text);
    }
    println!("{}", flash.text);
    Ok(())
}

fn print_listing(state: &AdminState) {
    let listing = state.listing();
    let page = listing.data();
    if page.content.is_empty() {
        println!("No requests found.");
        return;
    }
    println!(
        "{:>6}  {:<8}  {:<20}  {:<16}  {:<16}  {}",
        "ID", "STATUS", "NAME", "PHONE", "CREATED", "ADDRESS"
    );
    for c in &page.content {
        let created = c
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:>6}  {:<8}  {:<20}  {:<16}  {:<16}  {}",
            c.id, c.status, truncate(&c.name, 20), c.phone_number, created, c.address
        );
    }
    let pager = listing.pagination();
    if pager.visible {
        let mut hints = Vec::new();
        if pager.prev_enabled {
            hints.push(format!("--page {} for previous", pager.current - 1));
        }
        if pager.next_enabled {
            hints.push(format!("--page {} for next", pager.current + 1));
        }
        if hints.is_empty() {
            println!("{}", pager.label());
        } else {
            println!("{} ({})", pager.label(), hints.join(", "));
        }
    }
}

fn print_detail(state: &AdminState) {
    let Some(c) = state.detail() else {
        return;
    };
    println!("Request #{}", c.id);
    println!("  Status:      {}", c.status);
    println!("  Name:        {}", c.name);
    println!("  Email:       {}", c.email);
    println!("  Phone:       {}", c.phone_number);
    println!("  Address:     {}", c.address);
    if let Some(description) = c.description.as_deref().filter(|d| !d.trim().is_empty()) {
        println!("  Description: {description}");
    }
    if let Some(created) = c.created_at {
        println!("  Created:     {}", created.format("%Y-%m-%d %H:%M:%S"));
    }
    match state.detail_media() {
        Some(media) => println!("  {:<12} {}", format!("{}:", capitalize(media.kind())), media.url()),
        None => println!("  Media:       none"),
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn prompt(text: &str) -> Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm_on_stdin(text: &str) -> bool {
    match prompt(&format!("{text} [y/N] ")) {
        Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(err) => {
            tracing::warn!(error = %err, "could not read confirmation");
            false
        }
    }
}
