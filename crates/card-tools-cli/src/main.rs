use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use card_extract::{CornerPolicy, ExtractOptions, extract_batch, load_photo, save_card_png};
use card_impose::{
    CardPrintEntry, FlipEdge, ImposeError, ImpositionOptions, Page, PaperSize, PhysicalSize,
    calculate_statistics, generate_pdf, group_by_size, layout,
};
use card_store::CardLibrary;

#[derive(Parser)]
#[command(name = "cardt", about = "Card scanning and duplex print imposition", version)]
struct Cli {
    /// Card library root directory
    #[arg(long, default_value = "data", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage games in the card library
    Game {
        #[command(subcommand)]
        command: GameCommands,
    },

    /// Manage the decks (card types) of a game
    Deck {
        #[command(subcommand)]
        command: DeckCommands,
    },

    /// Manage stored cards
    Card {
        #[command(subcommand)]
        command: CardCommands,
    },

    /// Extract cards from photographs
    Scan(ScanArgs),

    /// Store a deck's shared back image (used as-is, no extraction)
    Back {
        #[arg(long)]
        game: String,
        #[arg(long)]
        deck: String,
        /// Image file holding the already-flat card back
        image: PathBuf,
    },

    /// Assemble a duplex print PDF from stored decks
    Export(ExportArgs),
}

#[derive(Subcommand)]
enum GameCommands {
    /// Create a new game
    Create { name: String },
    /// List existing games
    List,
}

#[derive(Subcommand)]
enum DeckCommands {
    /// Add a deck with its physical card size
    Add {
        #[arg(long)]
        game: String,
        name: String,
        /// Card width in mm
        #[arg(long)]
        width: f32,
        /// Card height in mm
        #[arg(long)]
        height: f32,
    },
    /// List a game's decks
    List {
        #[arg(long)]
        game: String,
    },
}

#[derive(Subcommand)]
enum CardCommands {
    /// List a deck's cards and copy counts
    List {
        #[arg(long)]
        game: String,
        #[arg(long)]
        deck: String,
    },
    /// Set a card's copy count
    Count {
        #[arg(long)]
        game: String,
        #[arg(long)]
        deck: String,
        name: String,
        count: u32,
    },
    /// Rename a card
    Rename {
        #[arg(long)]
        game: String,
        #[arg(long)]
        deck: String,
        name: String,
        new_name: String,
    },
    /// Move a card to another deck of the same game
    Move {
        #[arg(long)]
        game: String,
        #[arg(long)]
        deck: String,
        name: String,
        new_deck: String,
    },
    /// Delete a card
    Rm {
        #[arg(long)]
        game: String,
        #[arg(long)]
        deck: String,
        name: String,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Input photographs (PNG or JPEG), processed in the given order
    #[arg(required = true, num_args = 1..)]
    photos: Vec<PathBuf>,

    /// Save extracted cards into this game
    #[arg(long, requires = "deck")]
    game: Option<String>,

    /// Deck to save into; its configured size is the extraction target
    #[arg(long, requires = "game")]
    deck: Option<String>,

    /// Write extracted cards as PNGs into this directory instead of the
    /// library
    #[arg(long, conflicts_with_all = ["game", "deck"])]
    output: Option<PathBuf>,

    /// Card width in mm (standalone mode)
    #[arg(long)]
    width: Option<f32>,

    /// Card height in mm (standalone mode)
    #[arg(long)]
    height: Option<f32>,

    /// Base name for saved cards (numbered when scanning several photos)
    #[arg(long)]
    name: Option<String>,

    /// Copies of each card to print
    #[arg(long, default_value = "1")]
    count: u32,

    /// Output resolution in pixels per millimetre
    #[arg(long, default_value = "10.0")]
    ppmm: f32,

    /// Binarization threshold (0-255); lower it if the card is missed,
    /// raise it if the background bleeds in
    #[arg(long, default_value = "45")]
    threshold: u8,

    /// Reduce the detected boundary to its convex hull before corner
    /// recovery (more robust against boundary noise)
    #[arg(long)]
    convex_hull: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long)]
    game: String,

    /// Decks to include (all configured decks when omitted)
    #[arg(long = "deck")]
    decks: Vec<String>,

    /// Output PDF file
    #[arg(short, long, required_unless_present = "stats_only")]
    output: Option<PathBuf>,

    /// Output paper size
    #[arg(long, default_value = "a4", value_enum)]
    paper: PaperArg,

    /// Uniform page margin in mm
    #[arg(long, default_value = "10.0")]
    margin: f32,

    /// Duplex flip convention for back-page mirroring
    #[arg(long, default_value = "long-edge", value_enum)]
    flip: FlipArg,

    /// Skip the light-gray cutting frames
    #[arg(long)]
    no_cut_guides: bool,

    /// Show statistics only, don't generate the PDF
    #[arg(long)]
    stats_only: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

#[derive(Clone, Copy, ValueEnum)]
enum FlipArg {
    LongEdge,
    ShortEdge,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
        }
    }
}

impl From<FlipArg> for FlipEdge {
    fn from(arg: FlipArg) -> Self {
        match arg {
            FlipArg::LongEdge => Self::Long,
            FlipArg::ShortEdge => Self::Short,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let library = CardLibrary::new(&cli.root);

    match cli.command {
        Commands::Game { command } => run_game(&library, command).await,
        Commands::Deck { command } => run_deck(&library, command).await,
        Commands::Card { command } => run_card(&library, command).await,
        Commands::Scan(args) => run_scan(&library, args).await,
        Commands::Back { game, deck, image } => run_back(&library, &game, &deck, &image).await,
        Commands::Export(args) => run_export(&library, args).await,
    }
}

async fn run_game(library: &CardLibrary, command: GameCommands) -> Result<()> {
    match command {
        GameCommands::Create { name } => {
            let game = library.create_game(&name).await?;
            println!("created game {:?}", game);
        }
        GameCommands::List => {
            for game in library.games().await? {
                println!("{}", game);
            }
        }
    }
    Ok(())
}

async fn run_deck(library: &CardLibrary, command: DeckCommands) -> Result<()> {
    match command {
        DeckCommands::Add {
            game,
            name,
            width,
            height,
        } => {
            let deck = library.add_deck(&game, &name, width, height).await?;
            println!(
                "added deck {:?} ({}x{} mm)",
                deck.folder, deck.width_mm, deck.height_mm
            );
        }
        DeckCommands::List { game } => {
            for deck in library.decks(&game).await? {
                println!("{} ({}x{} mm)", deck.folder, deck.width_mm, deck.height_mm);
            }
        }
    }
    Ok(())
}

async fn run_card(library: &CardLibrary, command: CardCommands) -> Result<()> {
    match command {
        CardCommands::List { game, deck } => {
            for card in library.list_cards(&game, &deck).await? {
                println!("{} (x{})", card.name, card.count);
            }
        }
        CardCommands::Count {
            game,
            deck,
            name,
            count,
        } => {
            library.set_count(&game, &deck, &name, count).await?;
            println!("{}: x{}", name, count);
        }
        CardCommands::Rename {
            game,
            deck,
            name,
            new_name,
        } => {
            let stored = library.rename_card(&game, &deck, &name, &new_name).await?;
            println!("renamed {:?} to {:?}", name, stored);
        }
        CardCommands::Move {
            game,
            deck,
            name,
            new_deck,
        } => {
            library.move_card(&game, &deck, &name, &new_deck).await?;
            println!("moved {:?} to {}", name, new_deck);
        }
        CardCommands::Rm { game, deck, name } => {
            library.delete_card(&game, &deck, &name).await?;
            println!("deleted {:?}", name);
        }
    }
    Ok(())
}

enum ScanTarget {
    Library { game: String, deck: card_store::DeckConfig },
    Directory(PathBuf),
}

async fn run_scan(library: &CardLibrary, args: ScanArgs) -> Result<()> {
    // The target size comes from the deck configuration when scanning
    // into the library, from --width/--height otherwise.
    let (mut options, target) = match (&args.game, &args.deck) {
        (Some(game), Some(deck)) => {
            let deck = library.find_deck(game, deck).await?;
            let options = ExtractOptions::new(deck.width_mm, deck.height_mm);
            (
                options,
                ScanTarget::Library {
                    game: game.clone(),
                    deck,
                },
            )
        }
        _ => {
            let (Some(width), Some(height)) = (args.width, args.height) else {
                bail!("either --game/--deck or --width/--height is required");
            };
            let Some(output) = &args.output else {
                bail!("--output is required when scanning outside the library");
            };
            tokio::fs::create_dir_all(output).await?;
            (
                ExtractOptions::new(width, height),
                ScanTarget::Directory(output.clone()),
            )
        }
    };
    options.pixels_per_mm = args.ppmm;
    options.threshold = args.threshold;
    if args.convex_hull {
        options.corner_policy = CornerPolicy::ConvexHull;
    }

    let mut photos = Vec::with_capacity(args.photos.len());
    for path in &args.photos {
        photos.push(
            load_photo(path)
                .await
                .with_context(|| format!("failed to load {}", path.display()))?,
        );
    }

    let results = extract_batch(photos, &options).await;

    let mut extracted = 0usize;
    for (index, (path, result)) in args.photos.iter().zip(results).enumerate() {
        let card = match result {
            Ok(card) => card,
            Err(err) => {
                eprintln!("{}: {}", path.display(), err);
                continue;
            }
        };
        println!("{}: {}", path.display(), card.summary());

        let card_name = args.name.as_ref().map(|base| {
            if args.photos.len() > 1 {
                format!("{}_{}", base, index + 1)
            } else {
                base.clone()
            }
        });

        // A failed save is fatal to this card only; the rest of the
        // batch still goes through.
        let saved = match &target {
            ScanTarget::Library { game, deck } => library
                .save_card(
                    game,
                    &deck.folder,
                    card.image,
                    card_name.as_deref(),
                    args.count,
                )
                .await
                .map(|name| format!("  saved as {}/{} (x{})", deck.folder, name, args.count))
                .map_err(anyhow::Error::from),
            ScanTarget::Directory(output) => {
                let stem = card_name.unwrap_or_else(|| {
                    path.file_stem()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .into_owned()
                });
                let file = output.join(format!("{}.png", stem));
                save_card_png(card.image, &file)
                    .await
                    .map(|()| format!("  wrote {}", file.display()))
                    .map_err(anyhow::Error::from)
            }
        };
        match saved {
            Ok(message) => {
                println!("{}", message);
                extracted += 1;
            }
            Err(err) => eprintln!("{}: failed to save: {}", path.display(), err),
        }
    }

    println!("{}/{} photographs extracted", extracted, args.photos.len());
    if extracted == 0 {
        bail!("no cards extracted; retry with a different --threshold or cleaner photos");
    }
    Ok(())
}

async fn run_back(library: &CardLibrary, game: &str, deck: &str, image: &Path) -> Result<()> {
    let deck = library.find_deck(game, deck).await?;
    let bytes = tokio::fs::read(image).await?;
    let back = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map(|img| img.to_rgba8())
    })
    .await??;
    library.set_back(game, &deck.folder, back).await?;
    println!("stored back image for {}", deck.folder);
    Ok(())
}

async fn run_export(library: &CardLibrary, args: ExportArgs) -> Result<()> {
    let configured = library.decks(&args.game).await?;
    let selected = if args.decks.is_empty() {
        configured
    } else {
        let mut selected = Vec::new();
        for wanted in &args.decks {
            let deck = configured
                .iter()
                .find(|d| &d.folder == wanted || &d.name == wanted)
                .with_context(|| format!("unknown deck {:?}", wanted))?;
            selected.push(deck.clone());
        }
        selected
    };
    if selected.is_empty() {
        bail!("game {:?} has no decks to export", args.game);
    }

    // Assemble the print run: one raster per unique image, one entry per
    // physical copy.
    let mut rasters = Vec::new();
    let mut entries = Vec::new();
    for deck in &selected {
        let size = PhysicalSize::new(deck.width_mm, deck.height_mm);

        let back_id = match library.back_image(&args.game, &deck.folder).await? {
            Some(back) => {
                rasters.push(back);
                Some(rasters.len() - 1)
            }
            None => None,
        };

        for card in library.list_cards(&args.game, &deck.folder).await? {
            let front = library.retrieve(&args.game, &deck.folder, &card.name).await?;
            rasters.push(front);
            let front_id = rasters.len() - 1;
            for _ in 0..card.count {
                entries.push(CardPrintEntry {
                    front: front_id,
                    back: back_id,
                    size,
                });
            }
        }
    }

    let options = ImpositionOptions {
        paper_size: args.paper.into(),
        margin_mm: args.margin,
        flip_edge: args.flip.into(),
        cut_guides: !args.no_cut_guides,
    };

    let groups = group_by_size(entries);
    let stats = calculate_statistics(&groups, &options);
    println!(
        "{} cards in {} size groups: {} sheets ({} pages)",
        stats.cards, stats.groups, stats.sheets, stats.pages
    );
    if stats.ungroupable_cards > 0 {
        eprintln!(
            "warning: {} cards do not fit the page and will be skipped",
            stats.ungroupable_cards
        );
    }
    if args.stats_only {
        return Ok(());
    }

    let mut pages: Vec<Page> = Vec::new();
    for group in &groups {
        match layout(group, &options) {
            Ok(mut group_pages) => pages.append(&mut group_pages),
            Err(ImposeError::UngroupableLayout {
                width_mm,
                height_mm,
            }) => {
                eprintln!(
                    "warning: skipping {} cards of {}x{} mm: they cannot fit the page",
                    group.len(),
                    width_mm,
                    height_mm
                );
            }
            Err(err) => return Err(err.into()),
        }
    }
    if pages.is_empty() {
        bail!("no cards could be placed on the page");
    }

    let Some(output) = &args.output else {
        bail!("--output is required to generate the PDF");
    };
    generate_pdf(pages, rasters, &options, output).await?;
    println!("wrote {}", output.display());
    Ok(())
}
