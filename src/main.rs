use std::{
    fs,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use clap::{
    Parser,
    Subcommand,
};
use kosakata::{
    catalog::{
        write_indexes,
        CatalogBuilder,
        RemoteCatalog,
        VocabularyCatalog,
    },
    core::{
        http::http_client,
        AppConfig,
        KosakataError,
        VocabularyFolder,
        VocabularySet,
    },
    games::{
        FillBlanksExercise,
        GameRegistry,
        PracticeDeck,
    },
    llm::{
        Difficulty,
        FillInStoryConfig,
        MessagesClient,
        StoryConfig,
        StoryService,
    },
    persistence::save_json_to,
    server,
    SelectionManager,
};
use tracing::error;
use tracing_subscriber::{
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Indonesian-English vocabulary catalog, server and practice tools
#[derive(Parser, Debug)]
#[command(name = "kosakata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Vocabulary root directory (overrides config and KOSAKATA_VOCAB_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the vocabulary directory over HTTP
    Serve {
        /// Address to bind, e.g. 127.0.0.1:3001
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the folder tree with word counts
    Tree {
        /// Load from a running server instead of the local directory
        #[arg(long, value_name = "URL")]
        remote: Option<String>,
        /// Build from index.json files instead of listing directories
        #[arg(long, conflicts_with = "remote")]
        indexes: bool,
    },
    /// Write index.json into every directory of the vocabulary root
    Index,
    /// List the games playable with the selected words
    Games {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Generate a practice story from the selected words
    Story {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Number of paragraphs (or sentences with --fill-in)
        #[arg(long, default_value = "2")]
        paragraphs: usize,
        #[arg(long, value_enum, default_value = "medium")]
        difficulty: Difficulty,
        /// Extra context for the story
        #[arg(long)]
        prompt: Option<String>,
        /// Use at most this many words, picked at random
        #[arg(long)]
        limit: Option<usize>,
        /// Generate a fill-in-the-blank story instead
        #[arg(long)]
        fill_in: bool,
    },
    /// Parse a numbered fill-in-the-blank exercise and optionally score it
    Blanks {
        /// File with lines like "1. Saya [[tidak]] suka kopi."
        file: PathBuf,
        /// File with one line of answers per question, separated by '|'
        #[arg(long)]
        answers: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config {
        /// Save it to the config file
        #[arg(long)]
        write: bool,
    },
}

#[derive(clap::Args, Debug)]
struct SelectionArgs {
    /// Set id to select, e.g. week01/greetings.txt (repeatable)
    #[arg(long = "set", value_name = "ID")]
    sets: Vec<String>,
    /// Folder path to select, e.g. week01 (repeatable)
    #[arg(long = "folder", value_name = "PATH")]
    folders: Vec<String>,
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(root) = &cli.root {
        config.vocabulary_root = root.clone();
    }
    if cli.json_logs {
        config.log_json = true;
    }
    init_tracing(config.log_json);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, mut config: AppConfig) -> Result<(), KosakataError> {
    match command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            server::serve(&config).await
        }
        Command::Tree { remote, indexes } => {
            let root = match remote {
                Some(url) => {
                    let client = http_client(config.request_timeout())?;
                    RemoteCatalog::new(&url, client, config.retry_policy())?.load().await?
                }
                None if indexes => CatalogBuilder::from_indexes(&config.vocabulary_root)?,
                None => CatalogBuilder::scan(&config.vocabulary_root)?,
            };
            print_folder(&root, 0);
            println!("{} sets, {} words", root.count_sets(), root.count_words());
            Ok(())
        }
        Command::Index => {
            let written = write_indexes(&config.vocabulary_root)?;
            println!("Wrote {} index files under {}", written, config.vocabulary_root.display());
            Ok(())
        }
        Command::Games { selection } => {
            let catalog = VocabularyCatalog::load(&config.vocabulary_root)?;
            let deck = PracticeDeck::from_selection(&select(&catalog, &selection)?);
            let registry = GameRegistry::with_builtin_games();
            println!("{} words selected", deck.len());
            for game in registry.available_games(deck.len()) {
                let ai = if game.requires_ai { " (AI)" } else { "" };
                println!("  {:<22} {}{}", game.id, game.name, ai);
            }
            Ok(())
        }
        Command::Story { selection, paragraphs, difficulty, prompt, limit, fill_in } => {
            let catalog = VocabularyCatalog::load(&config.vocabulary_root)?;
            let mut deck = PracticeDeck::from_selection(&select(&catalog, &selection)?);
            if let Some(limit) = limit {
                deck = deck.shuffle(&mut rand::rng()).take(limit);
            }

            let service = StoryService::new(MessagesClient::from_config(&config)?, config.retry_policy());
            if fill_in {
                let story_config = FillInStoryConfig {
                    sentences: paragraphs,
                    blanks: limit.unwrap_or(deck.len()),
                    difficulty,
                    custom_prompt: prompt,
                };
                let story = service.generate_fill_in(deck.words(), &story_config).await?;
                if let Some(title) = &story.title {
                    println!("{}", title.indonesian);
                    if let Some(english) = &title.english {
                        println!("{}", english);
                    }
                    println!();
                }
                println!("{}\n\nAnswers: {}", story.story, story.answers.join(", "));
            } else {
                let story_config = StoryConfig { paragraphs, difficulty, custom_prompt: prompt };
                let story = service.generate_story(deck.words(), &story_config).await?;
                println!("{}", story.indonesian);
                if let Some(english) = &story.english {
                    println!("\n{}", english);
                }
                println!("\nUsed: {}", story.used_vocabulary.join(", "));
            }
            Ok(())
        }
        Command::Blanks { file, answers } => {
            let exercise = FillBlanksExercise::parse(&fs::read_to_string(&file)?)?;
            for question in &exercise.questions {
                println!("{}. {}", question.id, question.display_text);
            }

            if let Some(answers) = answers {
                let responses: Vec<Vec<String>> = fs::read_to_string(&answers)?
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| l.split('|').map(|a| a.trim().to_string()).collect())
                    .collect();
                let score = exercise.score(&responses);
                println!("\nScore: {}/{} ({}%)", score.correct, score.total, score.percentage);
            } else {
                println!("\n{} questions, {} blanks", exercise.questions.len(), exercise.total_blanks());
            }
            Ok(())
        }
        Command::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            println!("api key: {}", if config.api_key.is_some() { "set" } else { "not set" });
            if write {
                let path = AppConfig::path();
                save_json_to(&config, &path)?;
                println!("Saved to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Applies `--folder` and `--set` to a fresh selection. With neither, every
/// set in the catalog is selected.
fn select(catalog: &VocabularyCatalog, args: &SelectionArgs) -> Result<Vec<Arc<VocabularySet>>, KosakataError> {
    let mut manager = SelectionManager::for_catalog(catalog);

    if args.sets.is_empty() && args.folders.is_empty() {
        manager.toggle_folder(catalog.root());
        return Ok(manager.selected_sets());
    }

    for path in &args.folders {
        let folder = catalog
            .find_folder(path.trim_matches('/'))
            .ok_or_else(|| KosakataError::Custom(format!("No folder {:?} in the catalog", path)))?;
        if !manager.is_folder_selected(folder) {
            manager.toggle_folder(folder);
        }
    }
    for id in &args.sets {
        let set = catalog
            .find_set(id.trim_matches('/'))
            .ok_or_else(|| KosakataError::Custom(format!("No set {:?} in the catalog", id)))?;
        if !manager.is_selected(&set.id) {
            manager.toggle_set(set);
        }
    }

    Ok(manager.selected_sets())
}

fn print_folder(folder: &VocabularyFolder, depth: usize) {
    let indent = "  ".repeat(depth);
    match &folder.error {
        Some(e) => println!("{}{}/ [error: {}]", indent, folder.name, e),
        None => println!("{}{}/ ({} words)", indent, folder.name, folder.count_words()),
    }
    for set in &folder.sets {
        match &set.error {
            Some(e) => println!("{}  {} [error: {}]", indent, set.display_name(), e),
            None => println!("{}  {} ({})", indent, set.display_name(), set.word_count),
        }
    }
    for child in &folder.subfolders {
        print_folder(child, depth + 1);
    }
}
