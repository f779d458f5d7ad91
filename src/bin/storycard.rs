use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use storycard::assets::fonts::FontBook;
use storycard::assets::store::MediaStore;
use storycard::platform::{
    ActivitySource as _, CollectingShareSink, JsonFileActivitySource, JsonFileDraftStore,
    MemoryDraftStore, ShareSink, StaticEntitlements, SubjectExtractor,
};
use storycard::{
    Activity, BackgroundMedia, Collaborators, CpuSnapshotter, EditorConfig, EditorSession,
    FfmpegVideoCompositor, StoryResult,
};

#[derive(Parser, Debug)]
#[command(name = "storycard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a still story card (JPG over an image background, PNG with alpha otherwise).
    Render(SessionArgs),
    /// Composite the card onto a video background (requires `ffmpeg` on PATH).
    Video(SessionArgs),
    /// Sanitize a draft JSON file and print the result.
    Sanitize(SanitizeArgs),
    /// List stats templates.
    Templates,
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Activity JSON (one activity or an array).
    #[arg(long)]
    activity: PathBuf,

    /// Activity id to pick from the file; defaults to the first one.
    #[arg(long)]
    id: Option<String>,

    /// Draft JSON restored before exporting.
    #[arg(long)]
    draft: Option<PathBuf>,

    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Background media uri; `.mp4`, `.mov`, `.m4v` and `.webm` are treated as video.
    #[arg(long)]
    background: Option<String>,

    /// Pre-extracted subject cutout for the image background.
    #[arg(long)]
    cutout: Option<String>,

    /// Stats template id.
    #[arg(long)]
    template: Option<String>,

    /// Directory of .ttf/.otf/.ttc fonts.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Root for relative media uris; defaults to the activity file's directory.
    #[arg(long)]
    media_root: Option<PathBuf>,

    /// Output directory.
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// Unlock premium templates and font presets.
    #[arg(long)]
    premium: bool,
}

#[derive(Args, Debug)]
struct SanitizeArgs {
    /// Draft JSON to sanitize.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("storycard=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Video(args) => cmd_video(args),
        Command::Sanitize(args) => cmd_sanitize(args),
        Command::Templates => cmd_templates(),
    }
}

/// Hands back a cutout the caller produced ahead of time.
struct PrecomputedExtractor(String);

impl SubjectExtractor for PrecomputedExtractor {
    fn extract(&self, _image_uri: &str) -> StoryResult<String> {
        Ok(self.0.clone())
    }
}

/// Prints each shared file to stdout.
#[derive(Default)]
struct StdoutShareSink(CollectingShareSink);

impl ShareSink for StdoutShareSink {
    fn share(&mut self, path: &Path, mime: &str) -> StoryResult<()> {
        self.0.share(path, mime)?;
        println!("{}\t{mime}", path.display());
        Ok(())
    }
}

fn load_activity(path: &Path, id: Option<&str>) -> anyhow::Result<Activity> {
    let source = JsonFileActivitySource::new(path);
    let activity = match id {
        Some(id) => source.activity(id)?,
        None => source
            .all()?
            .into_iter()
            .next()
            .with_context(|| format!("no activities in '{}'", path.display()))?,
    };
    Ok(activity)
}

fn background_media(uri: &str) -> BackgroundMedia {
    let ext = Path::new(uri)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp4" | "mov" | "m4v" | "webm") => BackgroundMedia::video(uri),
        _ => BackgroundMedia::image(uri),
    }
}

fn open_session(args: &SessionArgs) -> anyhow::Result<EditorSession> {
    let activity = load_activity(&args.activity, args.id.as_deref())?;
    let config = match &args.config {
        Some(path) => EditorConfig::from_path(path)?,
        None => EditorConfig::from_env(),
    };
    let media_root = args.media_root.clone().unwrap_or_else(|| {
        args.activity
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let font_book = || match &args.fonts {
        Some(dir) => FontBook::from_dir(dir),
        None => FontBook::new(),
    };

    let drafts: Box<dyn storycard::platform::DraftStore> = match &args.draft {
        Some(path) => Box::new(JsonFileDraftStore::new(path)),
        None => Box::new(MemoryDraftStore::default()),
    };
    let collab = Collaborators {
        entitlements: Box::new(StaticEntitlements {
            premium: args.premium,
        }),
        drafts,
        share: Box::new(StdoutShareSink::default()),
        snapshotter: Box::new(CpuSnapshotter::new(font_book(), MediaStore::new(&media_root))),
        measure: Box::new(font_book()),
        compositor: Some(Box::new(FfmpegVideoCompositor::new(
            &media_root,
            &args.out_dir,
        ))),
        extractor: args
            .cutout
            .clone()
            .map(|uri| Box::new(PrecomputedExtractor(uri)) as Box<dyn SubjectExtractor>),
    };

    let mut session = EditorSession::new(activity, config, collab, &args.out_dir);
    if args.draft.is_some() && !session.restore_draft() {
        tracing::info!("no usable draft, starting fresh");
    }
    if let Some(uri) = &args.background {
        let _ = session.set_background(Some(background_media(uri)));
    }
    if let Some(id) = &args.template {
        let _ = session.select_template(id)?;
    }
    if args.cutout.is_some() && !session.extract_subject() {
        tracing::warn!("cutout ignored; it needs an image background");
    }
    Ok(session)
}

fn finish(session: &mut EditorSession, exported: bool) -> anyhow::Result<()> {
    if let Some(notice) = session.take_notice() {
        eprintln!("{}", notice.text());
    }
    if !exported {
        anyhow::bail!("export did not complete");
    }
    Ok(())
}

fn cmd_render(args: SessionArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args)?;
    let exported = session.export_still().is_some();
    finish(&mut session, exported)
}

fn cmd_video(args: SessionArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args)?;
    let exported = session.export_video().is_some();
    finish(&mut session, exported)
}

fn cmd_sanitize(args: SanitizeArgs) -> anyhow::Result<()> {
    let f = File::open(&args.in_path)
        .with_context(|| format!("open draft '{}'", args.in_path.display()))?;
    let value: serde_json::Value =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse draft JSON")?;
    let draft = storycard::sanitize(&value).context("not a version-1 draft")?;
    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}

fn cmd_templates() -> anyhow::Result<()> {
    for t in storycard::layout::template::all_templates() {
        println!(
            "{:<10} {:<7} width={:<5} {}",
            t.id,
            t.layout.as_str(),
            t.width,
            if t.premium { "premium" } else { "free" }
        );
    }
    Ok(())
}
