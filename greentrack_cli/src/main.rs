use greentrack_core::*;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gtrack")]
#[command(about = "Personal environmental impact tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the backend API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Username or email (prompted when omitted)
        #[arg(long)]
        username: Option<String>,
    },

    /// Create a new account
    Register,

    /// Log out and clear the stored session
    Logout,

    /// Show account information
    Profile,

    /// Change the account password
    ChangePassword,

    /// Request a password reset email
    ForgotPassword { email: String },

    /// Finish a password reset with the uid and token from the email
    ResetPassword { uid: String, token: String },

    /// Send a verification email for the account address
    VerifyEmail,

    /// Manage impact entries
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Show the impact dashboard (default)
    Stats,

    /// Get AI suggestions based on recorded entries
    Suggest,

    /// Export all entries to CSV
    Export {
        /// Output path (defaults to entries.csv in the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Set the dashboard theme (dark or light)
    Theme { mode: String },
}

#[derive(Subcommand)]
enum EntryAction {
    /// Record a new impact entry
    Add {
        /// Metric type (carbon, water, energy, digital)
        #[arg(long)]
        metric: String,

        /// Measured value, in the metric's unit
        #[arg(long)]
        value: f64,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// List entries, optionally filtered by metric
    List {
        /// Metric type to filter by, or "all"
        #[arg(long, default_value = "all")]
        metric: String,
    },

    /// Delete an entry by id
    Delete { id: i64 },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    greentrack_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;
    tracing::debug!("Using backend at {}", config.api.base_url);

    let mut store = SessionStore::open(&data_dir);
    store.restore()?;

    let client =
        ApiClient::new(config.api.base_url.clone()).with_token(store.token().map(str::to_string));
    let api = Api::new(client);

    let result = match cli.command {
        Some(Commands::Login { username }) => cmd_login(&api, &mut store, username).await,
        Some(Commands::Register) => cmd_register(&api, &mut store).await,
        Some(Commands::Logout) => cmd_logout(&api, &mut store).await,
        Some(Commands::Profile) => cmd_profile(&api, &store).await,
        Some(Commands::ChangePassword) => cmd_change_password(&api, &store).await,
        Some(Commands::ForgotPassword { email }) => cmd_forgot_password(&api, email).await,
        Some(Commands::ResetPassword { uid, token }) => cmd_reset_password(&api, uid, token).await,
        Some(Commands::VerifyEmail) => cmd_verify_email(&api, &store).await,
        Some(Commands::Entry { action }) => match action {
            EntryAction::Add {
                metric,
                value,
                description,
            } => cmd_entry_add(&api, &store, metric, value, description).await,
            EntryAction::List { metric } => cmd_entry_list(&api, &store, metric).await,
            EntryAction::Delete { id } => cmd_entry_delete(&api, &store, id).await,
        },
        Some(Commands::Stats) | None => cmd_stats(&api, &store).await,
        Some(Commands::Suggest) => cmd_suggest(&api, &store).await,
        Some(Commands::Export { output }) => cmd_export(&api, &store, output, &data_dir).await,
        Some(Commands::Theme { mode }) => cmd_theme(&mut store, mode),
    };

    // A rejected token means the stored session is dead. Clear it so the
    // next invocation starts logged out instead of retrying the same token.
    if let Err(ref e) = result {
        if e.is_auth_expired() {
            eprintln!("Your session has expired. Run `gtrack login` to sign in again.");
            store.clear_local()?;
        }
    }

    result
}

fn require_login(store: &SessionStore) -> Result<()> {
    if store.current().authenticated {
        Ok(())
    } else {
        Err(Error::NotAuthenticated)
    }
}

async fn cmd_login(api: &Api, store: &mut SessionStore, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(name) => name,
        None => prompt_line("Username or email: ")?,
    };
    let password = prompt_line("Password: ")?;

    let response = api
        .auth()
        .login(&LoginRequest {
            username: username.clone(),
            password,
        })
        .await?;

    let access = response
        .access
        .ok_or_else(|| Error::Other("Login response did not include an access token".into()))?;
    store.login(access, response.refresh, response.user)?;

    println!("✓ Logged in as {}", username);
    Ok(())
}

async fn cmd_register(api: &Api, store: &mut SessionStore) -> Result<()> {
    let username = prompt_line("Username: ")?;
    let email = prompt_line("Email: ")?;
    let password = prompt_line("Password: ")?;
    let password_confirm = prompt_line("Confirm password: ")?;

    // Checked locally, before anything goes over the wire
    if password != password_confirm {
        return Err(Error::Validation("Passwords do not match".into()));
    }

    let response = api
        .auth()
        .register(&RegisterRequest {
            username: username.clone(),
            email,
            password,
            password_confirm,
        })
        .await?;

    match response.access {
        Some(access) => {
            store.login(access, response.refresh, response.user)?;
            println!("✓ Account created. You are logged in as {}", username);
        }
        None => {
            println!("✓ Account created. Run `gtrack login` to sign in.");
        }
    }
    Ok(())
}

async fn cmd_logout(api: &Api, store: &mut SessionStore) -> Result<()> {
    store.logout(api).await?;
    println!("✓ Logged out");
    Ok(())
}

async fn cmd_profile(api: &Api, store: &SessionStore) -> Result<()> {
    require_login(store)?;
    let profile = api.auth().profile().await?;
    display_profile(&profile);
    Ok(())
}

async fn cmd_change_password(api: &Api, store: &SessionStore) -> Result<()> {
    require_login(store)?;

    let current = prompt_line("Current password: ")?;
    let new_password = prompt_line("New password: ")?;
    let confirm = prompt_line("Confirm new password: ")?;
    if new_password != confirm {
        return Err(Error::Validation("New passwords do not match".into()));
    }

    let response = api
        .auth()
        .change_password(&ChangePasswordRequest {
            current_password: current,
            new_password,
        })
        .await?;

    println!("✓ {}", nonempty_or(&response.message, "Password changed"));
    Ok(())
}

async fn cmd_forgot_password(api: &Api, email: String) -> Result<()> {
    let response = api
        .auth()
        .request_password_reset(&PasswordResetRequest { email })
        .await?;
    println!("{}", nonempty_or(&response.message, "Reset email requested"));
    Ok(())
}

async fn cmd_reset_password(api: &Api, uid: String, token: String) -> Result<()> {
    let new_password = prompt_line("New password: ")?;
    let confirm = prompt_line("Confirm new password: ")?;
    if new_password != confirm {
        return Err(Error::Validation("New passwords do not match".into()));
    }

    let response = api
        .auth()
        .confirm_password_reset(&PasswordResetConfirmRequest {
            uid,
            token,
            new_password,
        })
        .await?;
    println!("✓ {}", nonempty_or(&response.message, "Password reset"));
    Ok(())
}

async fn cmd_verify_email(api: &Api, store: &SessionStore) -> Result<()> {
    require_login(store)?;
    let response = api.auth().send_email_verification().await?;
    println!(
        "✓ {}",
        nonempty_or(&response.message, "Verification email sent")
    );
    Ok(())
}

async fn cmd_entry_add(
    api: &Api,
    store: &SessionStore,
    metric: String,
    value: f64,
    description: String,
) -> Result<()> {
    require_login(store)?;
    let metric_type: MetricType = metric.parse()?;

    let created = api
        .entries()
        .create(&NewEntry {
            metric_type,
            value,
            description,
        })
        .await?;

    println!("✓ Entry recorded");
    display_entry(&created);

    // Totals are computed server-side; refetch rather than patching
    let stats = api.stats().impact_stats().await?;
    display_totals_line(&stats);
    Ok(())
}

async fn cmd_entry_list(api: &Api, store: &SessionStore, metric: String) -> Result<()> {
    require_login(store)?;
    let filter: MetricFilter = metric.parse()?;

    let entries = api.entries().get_all(filter).await?;
    if entries.is_empty() {
        println!("No entries yet. Record one with `gtrack entry add`.");
        return Ok(());
    }

    for entry in &entries {
        display_entry(entry);
    }
    println!("  {} entries", entries.len());
    Ok(())
}

async fn cmd_entry_delete(api: &Api, store: &SessionStore, id: i64) -> Result<()> {
    require_login(store)?;
    api.entries().delete(id).await?;
    println!("✓ Deleted entry #{}", id);

    let stats = api.stats().impact_stats().await?;
    display_totals_line(&stats);
    Ok(())
}

async fn cmd_stats(api: &Api, store: &SessionStore) -> Result<()> {
    require_login(store)?;

    // Fetch both halves of the dashboard concurrently and join before
    // rendering anything
    let entries_api = api.entries();
    let stats_api = api.stats();
    let (entries, stats) = tokio::try_join!(
        entries_api.get_all(MetricFilter::All),
        stats_api.impact_stats()
    )?;

    display_dashboard(&entries, &stats, store.dark_mode());
    Ok(())
}

async fn cmd_suggest(api: &Api, store: &SessionStore) -> Result<()> {
    require_login(store)?;
    let response = api.ai().suggestions().await?;

    if response.suggestions.is_empty() {
        println!("No suggestions yet. Add more entries and try again.");
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  CLIMATE SUGGESTIONS");
    println!("╰─────────────────────────────────────────╯");
    for suggestion in &response.suggestions {
        println!();
        println!("  {}", suggestion.title);
        if !suggestion.impact.is_empty() || !suggestion.effort.is_empty() {
            println!(
                "  [{} impact / {} effort]",
                nonempty_or(&suggestion.impact, "?"),
                nonempty_or(&suggestion.effort, "?")
            );
        }
        println!("  {}", suggestion.message);
    }
    if response.data_points_analyzed > 0 {
        println!();
        println!(
            "  Based on {} data points from your entries",
            response.data_points_analyzed
        );
    }
    Ok(())
}

async fn cmd_export(
    api: &Api,
    store: &SessionStore,
    output: Option<PathBuf>,
    data_dir: &std::path::Path,
) -> Result<()> {
    require_login(store)?;
    let entries = api.entries().get_all(MetricFilter::All).await?;
    let csv_path = output.unwrap_or_else(|| data_dir.join("entries.csv"));

    let count = entries_to_csv(&entries, &csv_path)?;
    println!("✓ Exported {} entries", count);
    println!("  CSV: {}", csv_path.display());
    Ok(())
}

fn cmd_theme(store: &mut SessionStore, mode: String) -> Result<()> {
    let dark_mode = match mode.to_lowercase().as_str() {
        "dark" => true,
        "light" => false,
        other => {
            return Err(Error::Validation(format!(
                "Unknown theme: {} (expected dark or light)",
                other
            )))
        }
    };
    store.set_dark_mode(dark_mode)?;
    println!("✓ Theme set to {}", mode.to_lowercase());
    Ok(())
}

fn display_profile(profile: &UserProfile) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  USER PROFILE");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Username:  {}", profile.username);
    print!("  Email:     {}", profile.email);
    match profile.email_verified {
        Some(true) => println!(" (verified)"),
        Some(false) => println!(" (not verified - run `gtrack verify-email`)"),
        None => println!(),
    }
    if let Some(name) = full_name(profile) {
        println!("  Name:      {}", name);
    }
    if let Some(joined) = profile.date_joined {
        println!("  Joined:    {}", joined.format("%Y-%m-%d"));
    }
    if let Some(last_login) = profile.last_login {
        println!("  Last login: {}", last_login.format("%Y-%m-%d"));
    }
    if let Some(active) = profile.is_active {
        println!("  Status:    {}", if active { "Active" } else { "Inactive" });
    }
    println!();
}

fn full_name(profile: &UserProfile) -> Option<String> {
    match (&profile.first_name, &profile.last_name) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (Some(first), None) => Some(first.clone()),
        (None, Some(last)) => Some(last.clone()),
        (None, None) => None,
    }
}

fn display_entry(entry: &ImpactEntry) {
    let info = metric_info(entry.metric_type);
    let description = if entry.description.is_empty() {
        "-"
    } else {
        entry.description.as_str()
    };
    println!(
        "  #{:<5} {} {:<8} {:>8.1} {:<7} {}  ({})",
        entry.id,
        info.icon,
        entry.metric_type,
        entry.value,
        info.unit,
        description,
        entry.created_at.format("%Y-%m-%d")
    );
}

fn display_totals_line(stats: &StatsSummary) {
    let parts: Vec<String> = MetricType::ALL
        .iter()
        .map(|&metric| {
            let info = metric_info(metric);
            format!("{} {:.1} {}", info.icon, stats.total_for(metric), info.unit)
        })
        .collect();
    println!("  Totals: {}", parts.join("  "));
}

fn display_dashboard(entries: &[ImpactEntry], stats: &StatsSummary, dark_mode: bool) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  YOUR ENVIRONMENTAL IMPACT");
    println!("╰─────────────────────────────────────────╯");
    println!();

    for &metric in &MetricType::ALL {
        let info = metric_info(metric);
        println!(
            "  {} {:<20} {:>10.1} {}",
            info.icon,
            info.label,
            stats.total_for(metric),
            info.unit
        );
    }
    println!();

    let total_entries = if stats.total_entries > 0 {
        stats.total_entries
    } else {
        entries.len() as u64
    };
    println!(
        "  Entries: {}   Active in the last 7 days: {}",
        total_entries, stats.recent_activity
    );

    if !stats.metric_breakdown.is_empty() {
        println!();
        display_breakdown_chart(&stats.metric_breakdown, dark_mode);
    }

    if !entries.is_empty() {
        println!();
        println!("  Recent entries:");
        for entry in entries.iter().take(5) {
            display_entry(entry);
        }
    }
    println!();
}

fn display_breakdown_chart(breakdown: &[MetricBreakdown], dark_mode: bool) {
    const BAR_WIDTH: usize = 28;
    let glyph = if dark_mode { '█' } else { '#' };

    let max = breakdown
        .iter()
        .map(|line| line.total_value)
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return;
    }

    for line in breakdown {
        let width = ((line.total_value / max) * BAR_WIDTH as f64).round() as usize;
        let bar: String = std::iter::repeat(glyph).take(width.max(1)).collect();
        println!(
            "  {:<8} {:<width$} {:.1} ({} entries)",
            line.metric_type.to_string(),
            bar,
            line.total_value,
            line.count,
            width = BAR_WIDTH
        );
    }
}

fn nonempty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
