use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use stageplan::config::{ConfigError, EditorConfig};
use stageplan::doc::{DocumentError, SceneData};
use stageplan::persist::{FileStore, NewLibraryItem, PersistError, Persistence, RecordId};
use stageplan::render::TracingRenderer;
use stageplan::script::{Replayer, ScriptError, parse_script};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("storage failed: {0}")]
    Persist(#[from] PersistError),
    #[error("script failed: {0}")]
    Script(#[from] ScriptError),
    #[error("invalid document: {0}")]
    Document(#[from] DocumentError),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("--save needs a loaded design; use --save-as NAME")]
    NoDesign,
}

#[derive(Parser, Debug)]
#[command(name = "stageplan", about = "Stage-plan scene editor: replay input scripts against stored designs")]
struct Cli {
    /// Directory holding designs, templates, and library items.
    #[arg(long, env = "STAGEPLAN_STORE", default_value = "stageplan-data")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay an input script and print or save the resulting document.
    Replay(ReplayArgs),
    Designs(DesignsCommand),
    Templates(TemplatesCommand),
    Library(LibraryCommand),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// JSON array of script events.
    #[arg(long)]
    script: PathBuf,

    /// Start from this stored design.
    #[arg(long, conflicts_with = "template")]
    design: Option<RecordId>,

    /// Start from this stored template.
    #[arg(long)]
    template: Option<RecordId>,

    /// Overwrite the loaded design with the result.
    #[arg(long, default_value_t = false, conflicts_with = "save_as")]
    save: bool,

    /// Save the result as a new design with this name.
    #[arg(long)]
    save_as: Option<String>,
}

#[derive(Args, Debug)]
struct DesignsCommand {
    #[command(subcommand)]
    command: DesignsSubcommand,
}

#[derive(Subcommand, Debug)]
enum DesignsSubcommand {
    List,
    Show {
        id: RecordId,
    },
    /// Store a scene document JSON file as a new design.
    Import {
        #[arg(long)]
        name: String,
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct TemplatesCommand {
    #[command(subcommand)]
    command: TemplatesSubcommand,
}

#[derive(Subcommand, Debug)]
enum TemplatesSubcommand {
    Show {
        id: RecordId,
    },
    Import {
        #[arg(long)]
        name: String,
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct LibraryCommand {
    #[command(subcommand)]
    command: LibrarySubcommand,
}

#[derive(Subcommand, Debug)]
enum LibrarySubcommand {
    List,
    Upload {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "general")]
        category: String,
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value_t = 80.0)]
        width: f64,
        #[arg(long, default_value_t = 60.0)]
        height: f64,
    },
    Delete {
        id: RecordId,
    },
}

#[derive(Serialize)]
struct ReplayReport {
    events: usize,
    commits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<RecordId>,
    document: SceneData,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let store = FileStore::open(&cli.store).await?;

    match cli.command {
        Command::Replay(args) => run_replay(&store, args).await,
        Command::Designs(designs) => run_designs(&store, designs).await,
        Command::Templates(templates) => run_templates(&store, templates).await,
        Command::Library(library) => run_library(&store, library).await,
    }
}

async fn run_replay(store: &FileStore, args: ReplayArgs) -> Result<(), CliError> {
    let config = EditorConfig::from_env()?;
    let library = store.list_library_items().await?;
    let mut replayer = Replayer::new(config, Box::new(TracingRenderer), library);

    if let Some(id) = args.design {
        replayer.session_mut().load_document(store.load_document(id).await?);
    } else if let Some(id) = args.template {
        replayer.session_mut().load_template(store.load_template(id).await?.elements);
    }

    let raw = tokio::fs::read_to_string(&args.script).await?;
    let events = parse_script(&raw)?;
    let outcome = replayer.run(&events)?;
    let session = replayer.into_session();
    let document = session.document();

    let saved = if args.save {
        let design = session.design().ok_or(CliError::NoDesign)?;
        Some(store.save_document(Some(design.id), &design.name, &document, None).await?)
    } else if let Some(name) = &args.save_as {
        Some(store.save_document(None, name, &document, None).await?)
    } else {
        None
    };

    print_json(&ReplayReport { events: outcome.events, commits: outcome.commits(), saved, document })
}

async fn run_designs(store: &FileStore, designs: DesignsCommand) -> Result<(), CliError> {
    match designs.command {
        DesignsSubcommand::List => print_json(&store.list_documents().await?),
        DesignsSubcommand::Show { id } => print_json(&store.load_document(id).await?),
        DesignsSubcommand::Import { name, file } => {
            let elements = read_scene(&file).await?;
            let id = store.save_document(None, &name, &elements, None).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
    }
}

async fn run_templates(store: &FileStore, templates: TemplatesCommand) -> Result<(), CliError> {
    match templates.command {
        TemplatesSubcommand::Show { id } => print_json(&store.load_template(id).await?),
        TemplatesSubcommand::Import { name, file } => {
            let elements = read_scene(&file).await?;
            let id = store.save_template(None, &name, &elements).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
    }
}

async fn run_library(store: &FileStore, library: LibraryCommand) -> Result<(), CliError> {
    match library.command {
        LibrarySubcommand::List => print_json(&store.list_library_items().await?),
        LibrarySubcommand::Upload { name, category, image, width, height } => {
            let image = tokio::fs::read(&image).await?;
            let item = store
                .upload_library_item(NewLibraryItem { name, category, image, default_width: width, default_height: height })
                .await?;
            print_json(&item)
        }
        LibrarySubcommand::Delete { id } => {
            store.delete_library_item(id).await?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
    }
}

async fn read_scene(path: &Path) -> Result<SceneData, CliError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(SceneData::from_json(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
