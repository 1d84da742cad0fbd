use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::{AccountAddress, LedgerEntryId};
use storage::{LedgerEntry, Storage, DEFAULT_DATABASE_URL};
use tracing::info;

const DEFAULT_LOG_FILTER: &str = "info";

const SAMPLE_ENTRIES: [(usize, &str, &str); 5] = [
    (0, "Alice", "Hello World Chain! Excited to be here! 🌍"),
    (1, "Bob", "Building the future of decentralized identity! 🚀"),
    (2, "Charlie", "Amazing work on World Chain. Keep it up! 💫"),
    (0, "Diana", "Love the simplicity of this guestbook! ✨"),
    (1, "Eve", "World Chain is the future of blockchain! 🔮"),
];

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = DEFAULT_DATABASE_URL)]
    database_url: String,
    /// Print entries as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the ledger, append the sample entries and show the latest three.
    Deploy,
    /// Append one entry and walk through every read operation.
    Interact {
        #[arg(long, default_value_t = 1)]
        signer: usize,
    },
    Add {
        #[arg(long, default_value_t = 0)]
        signer: usize,
        name: String,
        message: String,
    },
    Show {
        id: i64,
    },
    Page {
        #[arg(default_value_t = 0)]
        offset: u32,
        #[arg(default_value_t = 10)]
        limit: u32,
    },
    Latest {
        #[arg(default_value_t = 5)]
        count: u32,
    },
    ByUser {
        address: String,
    },
    Count,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url)
        .await
        .with_context(|| format!("failed to open ledger at '{}'", cli.database_url))?;

    match cli.command {
        Command::Deploy => deploy(&storage, cli.json).await?,
        Command::Interact { signer } => interact(&storage, signer, cli.json).await?,
        Command::Add {
            signer,
            name,
            message,
        } => {
            let author = AccountAddress::dev_account(signer)?;
            let id = storage.add_entry(&author, &name, &message).await?;
            println!("added entry_id={} author={author}", id.0);
        }
        Command::Show { id } => match storage.get_entry(LedgerEntryId(id)).await? {
            Some(entry) => print_entries(&[entry], cli.json)?,
            None => anyhow::bail!("no entry with id {id}"),
        },
        Command::Page { offset, limit } => {
            print_entries(&storage.get_entries(offset, limit).await?, cli.json)?
        }
        Command::Latest { count } => {
            print_entries(&storage.get_latest_entries(count).await?, cli.json)?
        }
        Command::ByUser { address } => {
            let author = AccountAddress::parse(&address)?;
            print_entries(&storage.get_entries_by_user(&author).await?, cli.json)?
        }
        Command::Count => println!("{}", storage.get_total_entries().await?),
    }

    Ok(())
}

async fn deploy(storage: &Storage, json: bool) -> Result<()> {
    println!("Deploying guestbook ledger...");
    storage.health_check().await?;

    println!("Ledger details:");
    println!("- Entry count: {}", storage.entry_count().await?);
    println!("- Total entries: {}", storage.get_total_entries().await?);

    println!("\nAdding sample entries...");
    for (signer, name, message) in SAMPLE_ENTRIES {
        let author = AccountAddress::dev_account(signer)?;
        let id = storage
            .add_entry(&author, name, message)
            .await
            .with_context(|| format!("failed to add sample entry for {name}"))?;
        info!(entry_id = id.0, %author, "sample entry added");
    }
    println!(
        "Sample entries added. Total entries: {}",
        storage.get_total_entries().await?
    );

    println!("\nLatest 3 entries:");
    print_entries(&storage.get_latest_entries(3).await?, json)?;

    println!("\nDeployment completed successfully.");
    Ok(())
}

async fn interact(storage: &Storage, signer: usize, json: bool) -> Result<()> {
    let author = AccountAddress::dev_account(signer)?;

    println!("=== Ledger information ===");
    let total = storage.get_total_entries().await?;
    println!("Total entries: {total}");

    println!("\n=== Adding new entry ===");
    let id = storage
        .add_entry(
            &author,
            "Developer",
            "Testing the simplified guestbook! Much cleaner now! 🎉",
        )
        .await?;
    println!("Entry {} added successfully.", id.0);

    println!("\n=== Latest entries ===");
    let latest = storage.get_latest_entries(5).await?;
    println!("Showing {} latest entries:", latest.len());
    if json {
        print_entries(&latest, true)?;
    } else {
        for (index, entry) in latest.iter().enumerate() {
            println!("\nEntry {}:", index + 1);
            println!("- ID: {}", entry.id.0);
            println!("- Author: {}", entry.author);
            println!("- Name: {}", entry.name);
            println!("- Message: {}", entry.message);
            println!("- Timestamp: {}", entry.timestamp.to_rfc2822());
        }
    }

    println!("\n=== First 3 entries (paginated) ===");
    print_entries(&storage.get_entries(0, 3).await?, json)?;

    println!("\n=== Entries by user ===");
    let mine = storage.get_entries_by_user(&author).await?;
    println!("User {author} has {} entries:", mine.len());
    print_entries(&mine, json)?;

    println!("\n=== Specific entry ===");
    if total > 0 {
        if let Some(first) = storage.get_entry(LedgerEntryId(1)).await? {
            println!("First entry details:");
            println!("- Name: {}", first.name);
            println!("- Message: {}", first.message);
            println!("- Author: {}", first.author);
        }
    }

    println!("\nInteraction completed successfully.");
    Ok(())
}

fn print_entries(entries: &[LedgerEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "{}. [{}] {}: {} ({})",
            index + 1,
            entry.id.0,
            entry.name,
            entry.message,
            entry.author.short()
        );
    }
    Ok(())
}
