use std::path::{Path, PathBuf};

use avatargen::{
    error::{EDIT_FALLBACK_MESSAGE, FALLBACK_MESSAGE},
    ingest,
    logger::{self, LoggerConfig},
    Config, DataUri, GeminiClient, GenerationParams, ImageClient, Result,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "avatargen", version, about = "Generate forum avatars and edit images with Gemini")]
struct Cli {
    /// Debug-level logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Also append logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a batch of avatars
    Generate(GenerateArgs),
    /// Edit one image with a text instruction
    Edit(EditArgs),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value = "cheevh")]
    username: String,

    /// Colors / style
    #[arg(long, default_value = "dark, minimal")]
    style: String,

    /// Ideas, themes, imagery
    #[arg(long, default_value = "electronics, networking, reverse shells, #!")]
    ideas: String,

    /// Number of avatars
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    quantity: u32,

    /// Only generate the variant without the username
    #[arg(long)]
    no_username: bool,

    /// Text language for the username (repeatable)
    #[arg(long = "lang", default_value = "en")]
    languages: Vec<String>,

    /// Reference image (repeatable, up to 20)
    #[arg(long = "example")]
    examples: Vec<PathBuf>,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Args)]
struct EditArgs {
    /// Image to edit
    #[arg(long)]
    image: PathBuf,

    /// Editing instruction
    #[arg(long, default_value = "Add a retro filter")]
    instruction: String,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut log_config = if cli.verbose {
        LoggerConfig::development()
    } else {
        LoggerConfig::default()
    };
    if cli.json_logs {
        log_config = log_config.with_json_output(true).with_colors(false);
    }
    if let Some(path) = &cli.log_file {
        log_config = log_config.with_file_output(path);
    }
    if let Err(e) = logger::init_with_config(log_config) {
        eprintln!("{}", e);
    }

    if dotenv_loaded {
        log::debug!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using process environment");
    }

    let fallback = match cli.command {
        Command::Edit(_) => EDIT_FALLBACK_MESSAGE,
        Command::Generate(_) => FALLBACK_MESSAGE,
    };
    if let Err(e) = run(cli.command).await {
        log::error!("{}", e);
        eprintln!("Error: {}", e.user_message_or(fallback));
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    let config = Config::from_env();
    logger::log_config_info(&config);

    let client = GeminiClient::new(config)?;
    for (id, name, provider) in ImageClient::supported_models() {
        log::debug!("  {} - {} ({})", id, name, provider);
    }

    match command {
        Command::Generate(args) => generate(&client, args).await,
        Command::Edit(args) => edit(&client, args).await,
    }
}

async fn generate(client: &GeminiClient, args: GenerateArgs) -> Result<()> {
    let example_images = ingest::from_paths(&args.examples).await?;

    let params = GenerationParams {
        user_name: args.username,
        dark_light: args.style,
        ideas: args.ideas,
        example_images,
        quantity: args.quantity as usize,
        include_username: !args.no_username,
        text_languages: args.languages,
    };

    log::info!("🎨 Generation parameters:");
    log::info!("   Username: {}", params.user_name);
    log::info!("   Quantity: {}", params.quantity);
    log::info!(
        "   Include username: {}",
        if params.include_username { "Yes" } else { "No" }
    );
    log::info!(
        "   Languages: {}",
        params
            .text_languages
            .iter()
            .map(|l| l.to_uppercase())
            .collect::<Vec<_>>()
            .join(", ")
    );
    log::info!("   Style: {}", params.dark_light);
    log::info!("   Ideas: {}", params.ideas);
    log::info!("   Example images: {}", params.example_images.len());

    let avatars = client.generate_avatars(&params).await?;

    tokio::fs::create_dir_all(&args.out).await?;
    let timestamp = chrono::Utc::now().timestamp();
    for (index, avatar) in avatars.iter().enumerate() {
        let n = index + 1;
        if let Some(with_username) = &avatar.with_username {
            let path = save_image(
                &args.out,
                &format!("avatar_{}_with_username_{}", n, timestamp),
                with_username,
            )
            .await?;
            println!("{}", path.display());
        }
        let path = save_image(
            &args.out,
            &format!("avatar_{}_without_username_{}", n, timestamp),
            &avatar.without_username,
        )
        .await?;
        println!("{}", path.display());
    }

    log::info!("💾 Saved {} avatar(s) to {}", avatars.len(), args.out.display());
    Ok(())
}

async fn edit(client: &GeminiClient, args: EditArgs) -> Result<()> {
    let image = ingest::from_path(&args.image).await?;
    let edited = client.edit_image(Some(&image), &args.instruction).await?;

    tokio::fs::create_dir_all(&args.out).await?;
    let path = save_image(
        &args.out,
        &format!("edited_{}", chrono::Utc::now().timestamp()),
        &edited,
    )
    .await?;
    println!("{}", path.display());

    log::info!("💾 Edited image saved to {}", path.display());
    Ok(())
}

async fn save_image(dir: &Path, stem: &str, data_uri: &str) -> Result<PathBuf> {
    let uri = DataUri::parse(data_uri)?;
    let bytes = uri.decode()?;
    let path = dir.join(format!("{}.{}", stem, uri.extension()));

    tokio::fs::write(&path, &bytes).await?;
    log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
